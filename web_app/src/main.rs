//! # Vet Clinic Web Application
//!
//! Main entry point. Configures logging, SSL, middleware, cryptographic keys
//! and route handling.

#![recursion_limit = "256"]

use csrf::AesGcmCsrfProtection;
use logfire::config::MetricsOptions;
use ntex::web;
use ntex_cors::Cors;
use ntex_identity::{CookieIdentityPolicy, IdentityService};
use ntex_session::CookieSession;
use openssl::ssl::{SslAcceptor, SslFiletype, SslMethod};
use vet_clinic::{config, consts, front, logger, repo, services, utils};

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    let app_config = &*config::APP_CONFIG;

    // Logfire in prod, plain stdout logger anywhere else
    let shutdown_handler = if app_config.is_prod() {
        Some(
            logfire::configure()
                .install_panic_handler()
                .with_metrics(Some(MetricsOptions::default()))
                .send_to_logfire(logfire::config::SendToLogfire::Yes)
                .with_token(&app_config.logfire_token)
                .finish()?,
        )
    } else {
        logger::setup_simple_logger(log::LevelFilter::Debug)?;
        None
    };

    let sqlite_repo = repo::sqlite::SqlxSqliteRepo {
        db_pool: utils::setup_sqlite_db_pool(app_config.is_prod()).await?,
    };

    // CSRF key is derived from the configured password and salt so tokens
    // survive restarts; cookie keys are random per process
    let csrf_key = utils::build_csrf_key(&app_config.csrf_pass, &app_config.csrf_salt)?;
    let session_key = utils::build_random_csrf_key()?;
    let identity_key = utils::build_random_csrf_key()?;

    log::info!(
        "starting vet clinic api on {} ({})",
        app_config.base_url(),
        app_config.env
    );

    configure_and_run_server(csrf_key, session_key, identity_key, sqlite_repo).await?;

    if let Some(shutdown_handler) = shutdown_handler {
        shutdown_handler.shutdown()?;
    }

    Ok(())
}

/// Configures SSL acceptor for production environments
fn setup_ssl_acceptor() -> anyhow::Result<openssl::ssl::SslAcceptorBuilder> {
    let mut ssl_acceptor = SslAcceptor::mozilla_intermediate(SslMethod::tls_server())
        .map_err(|e| anyhow::anyhow!("Failed to create SSL acceptor: {}", e))?;

    let app_config = &*config::APP_CONFIG;
    ssl_acceptor
        .set_private_key_file(&app_config.private_key_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load private key from {}: {}",
                app_config.private_key_path,
                e
            )
        })?;

    ssl_acceptor
        .set_certificate_file(&app_config.certificate_path, SslFiletype::PEM)
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to load certificate from {}: {}",
                app_config.certificate_path,
                e
            )
        })?;

    Ok(ssl_acceptor)
}

fn create_app_state(
    csrf_key: [u8; 32],
    sqlite_repo: repo::sqlite::SqlxSqliteRepo,
) -> front::AppState {
    front::AppState {
        csrf_protec: AesGcmCsrfProtection::from_key(csrf_key),
        repo: Box::new(sqlite_repo),
        metrics_estimator: Box::new(services::estimator::RandomMetricsEstimator),
    }
}

fn build_cors(origins: &[String]) -> Cors {
    let mut cors = Cors::new()
        .allowed_methods(vec!["GET", "HEAD", "POST", "OPTIONS", "PUT", "PATCH", "DELETE"])
        .allowed_header(consts::CSRF_TOKEN_HEADER_NAME)
        .allowed_header("content-type")
        .supports_credentials();

    for origin in origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}

/// Configures and starts the web server with appropriate SSL settings
async fn configure_and_run_server(
    csrf_key: [u8; 32],
    session_key: [u8; 32],
    identity_key: [u8; 32],
    sqlite_repo: repo::sqlite::SqlxSqliteRepo,
) -> anyhow::Result<()> {
    let app_config = &*config::APP_CONFIG;
    let server_addr = (
        "0.0.0.0",
        u16::try_from(app_config.wep_server_port).unwrap_or(8080),
    );
    let cors_origins = app_config.cors_origins();

    let server = web::server(move || {
        web::App::new()
            .wrap(build_cors(&cors_origins).finish())
            .wrap(
                CookieSession::private(&session_key)
                    .secure(app_config.is_prod())
                    .domain(app_config.wep_server_host.to_string())
                    .max_age(consts::MAX_AGE_COOKIES)
                    .name(consts::SESSION_COOKIE_NAME),
            )
            .wrap(IdentityService::new(
                CookieIdentityPolicy::new(&identity_key)
                    .name(consts::IDENTITY_COOKIE_NAME)
                    .domain(app_config.wep_server_host.to_string())
                    .max_age(consts::MAX_AGE_COOKIES)
                    .secure(app_config.is_prod()),
            ))
            .wrap(web::middleware::Logger::default())
            .wrap(web::middleware::Compress::default())
            .state(create_app_state(csrf_key, sqlite_repo.clone()))
            .configure(front::routes::auth)
            .configure(front::routes::appointments)
            .configure(front::routes::veterinarians)
            .configure(front::routes::clinics)
            .configure(front::routes::pets)
            .configure(front::routes::admin)
            .configure(front::routes::vet)
            .configure(front::routes::health)
            .default_service(web::route().to(front::server::serve_not_found))
    });

    let bound_server = if app_config.is_prod() {
        let ssl_acceptor = setup_ssl_acceptor()?;
        server.bind_openssl(server_addr, ssl_acceptor)?
    } else {
        server.bind(server_addr)?
    };

    bound_server
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
