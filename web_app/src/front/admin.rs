//! Admin endpoints. Every handler re-checks the stored role of the caller.

use chrono::Local;
use ntex::web;
use serde::Deserialize;

use crate::{
    api,
    front::{
        AppState, errors, middleware::{self, payload::{ApiJson, ApiQuery, ApiPath}}, response, session,
    },
    models::user_app::{AccountRole, User},
};

#[derive(Deserialize, Debug)]
pub struct RoleRequest {
    role: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct StandardizeQuery {
    dry_run: Option<bool>,
}

async fn require_admin(
    app_state: &AppState,
    user_session: &session::WebAppSession,
    context: &str,
) -> Result<User, web::Error> {
    api::user::require_role(&app_state.repo, user_session.user_id, AccountRole::Admin)
        .await
        .map_err(|e| errors::api_error(context, e))
}

#[web::get("/stats")]
async fn get_stats(
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let context = "at GET /admin/stats";
    require_admin(&app_state, &user_session, context).await?;

    let dashboard = api::report::admin_dashboard(
        &app_state.repo,
        &app_state.metrics_estimator,
        Local::now().date_naive(),
    )
    .await
    .map_err(|e| errors::api_error(context, e))?;

    Ok(response::ok(dashboard))
}

#[web::get("/users")]
async fn list_users(
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let context = "at GET /admin/users";
    require_admin(&app_state, &user_session, context).await?;

    let users = api::user::list_users(&app_state.repo)
        .await
        .map_err(|e| errors::api_error(context, e))?;

    Ok(response::ok(users))
}

#[web::put("/users/{user_id}/role")]
async fn change_user_role(
    _: middleware::csrf_token::CsrfToken,
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    path: ApiPath<(i64,)>,
    body: ApiJson<RoleRequest>,
) -> Result<impl web::Responder, web::Error> {
    let context = "at PUT /admin/users/{id}/role";
    require_admin(&app_state, &user_session, context).await?;

    let user = api::user::change_user_role(&app_state.repo, path.0, &body.role)
        .await
        .map_err(|e| errors::api_error(context, e))?;

    Ok(response::ok_with_message(user, "role updated"))
}

#[web::post("/standardize-roles")]
async fn standardize_roles(
    _: middleware::csrf_token::CsrfToken,
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    query: ApiQuery<StandardizeQuery>,
) -> Result<impl web::Responder, web::Error> {
    let context = "at POST /admin/standardize-roles";
    require_admin(&app_state, &user_session, context).await?;

    let report = api::user::standardize_roles(&app_state.repo, query.dry_run.unwrap_or(false))
        .await
        .map_err(|e| errors::api_error(context, e))?;

    Ok(response::ok(report))
}

#[web::get("/appointments")]
async fn list_appointments(
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    query: ApiQuery<api::appointment::AppointmentQuery>,
) -> Result<impl web::Responder, web::Error> {
    let context = "at GET /admin/appointments";
    require_admin(&app_state, &user_session, context).await?;

    let appointments = api::appointment::list_all_appointments(&app_state.repo, query.into_inner())
        .await
        .map_err(|e| errors::api_error(context, e))?;

    Ok(response::ok(appointments))
}

#[web::post("/clinics")]
async fn create_clinic(
    _: middleware::csrf_token::CsrfToken,
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    body: ApiJson<api::clinic::CreateClinicRequest>,
) -> Result<impl web::Responder, web::Error> {
    let context = "at POST /admin/clinics";
    require_admin(&app_state, &user_session, context).await?;

    let clinic = api::clinic::create_clinic(&app_state.repo, body.into_inner())
        .await
        .map_err(|e| errors::api_error(context, e))?;

    Ok(response::created(clinic))
}

#[web::post("/veterinarians")]
async fn create_veterinarian(
    _: middleware::csrf_token::CsrfToken,
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    body: ApiJson<api::veterinarian::CreateVeterinarianRequest>,
) -> Result<impl web::Responder, web::Error> {
    let context = "at POST /admin/veterinarians";
    require_admin(&app_state, &user_session, context).await?;

    let profile = api::veterinarian::create_veterinarian_profile(&app_state.repo, body.into_inner())
        .await
        .map_err(|e| errors::api_error(context, e))?;

    Ok(response::created(profile))
}

#[web::post("/clinics/{clinic_id}/veterinarians/{vet_id}")]
async fn assign_veterinarian(
    _: middleware::csrf_token::CsrfToken,
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    path: ApiPath<(i64, i64)>,
) -> Result<impl web::Responder, web::Error> {
    let context = "at POST /admin/clinics/{id}/veterinarians/{vet_id}";
    require_admin(&app_state, &user_session, context).await?;

    let (clinic_id, vet_id) = path.into_inner();
    let clinic = api::clinic::assign_veterinarian(&app_state.repo, clinic_id, vet_id)
        .await
        .map_err(|e| errors::api_error(context, e))?;

    Ok(response::ok_with_message(clinic, "veterinarian assigned"))
}
