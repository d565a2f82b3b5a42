//! Application configuration read from the environment.
//!
//! Sensitive fields are marked and must never be logged.

use envconfig::Envconfig;
use std::sync::LazyLock;

#[derive(Envconfig, Clone)]
pub struct AppConfig {
    /// Environment name to deploy the app (NON-SENSITIVE)
    /// Values: "local", "dev", "staging", "prod"
    #[envconfig(default = "local")]
    pub env: String,

    /// Database host value (NON-SENSITIVE)
    /// Example: "sqlite:data/vet_clinic.db"
    pub db_host: String,

    /// 🔒 SENSITIVE: Database password to encrypt SQLite data
    pub db_pass_encrypt: String,

    /// Host address for web server binding (NON-SENSITIVE)
    /// Example: "0.0.0.0", "localhost", "clinic.example.com"
    pub wep_server_host: String,

    /// Port for web server binding (NON-SENSITIVE)
    #[envconfig(default = "8080")]
    pub wep_server_port: u64,

    /// Path to SSL private key file (SENSITIVE PATH)
    #[envconfig(default = "server.key")]
    pub private_key_path: String,

    /// Path to SSL certificate file (NON-SENSITIVE)
    #[envconfig(default = "server.crt")]
    pub certificate_path: String,

    /// 🔒 SENSITIVE: CSRF protection password (UUID format)
    pub csrf_pass: String,

    /// 🔒 SENSITIVE: CSRF protection salt (UUID format)
    pub csrf_salt: String,

    /// 🔒 SENSITIVE: Logfire write token, only used in prod
    #[envconfig(default = "")]
    pub logfire_token: String,

    /// Comma separated origins allowed by CORS (NON-SENSITIVE)
    /// Example: "https://clinic.example.com,https://admin.clinic.example.com"
    pub cors_allowed_origin: Option<String>,

    /// Google OAuth client ID (SEMI-SENSITIVE)
    pub google_oauth_client_id: String,

    /// 🔒 SENSITIVE: Google OAuth client secret
    pub google_oauth_client_secret: String,

    /// Google OAuth authorization URI (NON-SENSITIVE)
    #[envconfig(default = "https://accounts.google.com/o/oauth2/auth")]
    pub google_oauth_auth_uri: String,

    /// Google OAuth token URI (NON-SENSITIVE)
    #[envconfig(default = "https://oauth2.googleapis.com/token")]
    pub google_oauth_token_uri: String,
}

impl AppConfig {
    /// Checks if running in production environment
    pub fn is_prod(&self) -> bool {
        self.env.to_lowercase() == "prod"
    }

    /// Gets the server URL host with port for non-production environments
    pub fn url_host(&self) -> String {
        if self.is_prod() {
            return self.wep_server_host.to_string();
        }

        format!(
            "{host}:{port}",
            host = self.wep_server_host,
            port = self.wep_server_port
        )
    }

    /// Gets the appropriate protocol (HTTP/HTTPS) based on environment
    pub fn wep_server_protocol(&self) -> String {
        if self.is_prod() {
            return "https".into();
        }
        "http".into()
    }

    /// Constructs the complete base URL for the application
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.wep_server_protocol(), self.url_host())
    }

    /// Configured CORS origins, or the local development ones.
    pub fn cors_origins(&self) -> Vec<String> {
        let configured = self
            .cors_allowed_origin
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect::<Vec<String>>();

        if configured.is_empty() {
            return crate::consts::DEFAULT_CORS_ORIGINS
                .iter()
                .map(|origin| origin.to_string())
                .collect();
        }

        configured
    }
}

/// Global application configuration, loaded on first access.
///
/// Panics with a descriptive message when a required variable is missing.
pub static APP_CONFIG: LazyLock<AppConfig> = LazyLock::new(|| {
    AppConfig::init_from_env()
        .expect("Failed to load application configuration. Check environment variables.")
});
