//! Endpoints for the logged in veterinarian: dashboard, schedule, patients
//! and profile.

use chrono::Local;
use ntex::web;
use serde::Deserialize;

use crate::{
    api,
    front::{
        AppState, errors, middleware::{self, payload::{ApiJson, ApiQuery, ApiPath}}, response, session,
    },
    models::{
        appointment::AppointmentStatus, user_app::AccountRole, veterinarian::DayAvailability,
        veterinarian::Veterinarian,
    },
};

#[derive(Deserialize, Debug, Default)]
pub struct ScheduleQuery {
    /// YYYY-MM-DD
    date: Option<String>,
    status: Option<AppointmentStatus>,
}

#[derive(Deserialize, Debug)]
pub struct AvailabilityRequest {
    availability: Vec<DayAvailability>,
}

/// Re-checks the Vet role and loads the profile attached to the account.
async fn require_vet(
    app_state: &AppState,
    user_session: &session::WebAppSession,
    context: &str,
) -> Result<Veterinarian, web::Error> {
    api::user::require_role(&app_state.repo, user_session.user_id, AccountRole::Vet)
        .await
        .map_err(|e| errors::api_error(context, e))?;

    api::veterinarian::get_veterinarian_for_user(&app_state.repo, user_session.user_id)
        .await
        .map_err(|e| errors::api_error(context, e))
}

#[web::get("/stats")]
async fn get_stats(
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let context = "at GET /vet/stats";
    let vet = require_vet(&app_state, &user_session, context).await?;

    let dashboard = api::report::vet_dashboard(
        &app_state.repo,
        &app_state.metrics_estimator,
        &vet,
        Local::now().date_naive(),
    )
    .await
    .map_err(|e| errors::api_error(context, e))?;

    Ok(response::ok(dashboard))
}

#[web::get("/appointments")]
async fn get_schedule(
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    query: ApiQuery<ScheduleQuery>,
) -> Result<impl web::Responder, web::Error> {
    let context = "at GET /vet/appointments";
    let vet = require_vet(&app_state, &user_session, context).await?;

    let date = query
        .date
        .as_deref()
        .map(api::availability::parse_date)
        .transpose()
        .map_err(|e| errors::api_error(context, e))?;

    let schedule = api::report::vet_schedule(&app_state.repo, &vet, date, query.status)
        .await
        .map_err(|e| errors::api_error(context, e))?;

    Ok(response::ok(schedule))
}

#[web::put("/appointments/{appointment_id}/status")]
async fn update_appointment_status(
    _: middleware::csrf_token::CsrfToken,
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    path: ApiPath<(i64,)>,
    body: ApiJson<api::appointment::VetStatusUpdate>,
) -> Result<impl web::Responder, web::Error> {
    let context = "at PUT /vet/appointments/{id}/status";
    let vet = require_vet(&app_state, &user_session, context).await?;

    let appointment =
        api::appointment::update_status_by_vet(&app_state.repo, &vet, path.0, body.into_inner())
            .await
            .map_err(|e| errors::api_error(context, e))?;

    Ok(response::ok_with_message(appointment, "status updated"))
}

#[web::get("/patients")]
async fn get_patients(
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let context = "at GET /vet/patients";
    let vet = require_vet(&app_state, &user_session, context).await?;

    let patients = api::report::vet_patients(&app_state.repo, &vet)
        .await
        .map_err(|e| errors::api_error(context, e))?;

    Ok(response::ok(patients))
}

#[web::get("/profile")]
async fn get_profile(
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let context = "at GET /vet/profile";
    require_vet(&app_state, &user_session, context).await?;

    let profile = api::veterinarian::get_own_profile(&app_state.repo, user_session.user_id)
        .await
        .map_err(|e| errors::api_error(context, e))?;

    Ok(response::ok(profile))
}

/// Replaces the weekly availability template.
#[web::put("/profile/availability")]
async fn update_availability(
    _: middleware::csrf_token::CsrfToken,
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    body: ApiJson<AvailabilityRequest>,
) -> Result<impl web::Responder, web::Error> {
    let context = "at PUT /vet/profile/availability";
    require_vet(&app_state, &user_session, context).await?;

    let vet = api::veterinarian::update_availability(
        &app_state.repo,
        user_session.user_id,
        body.into_inner().availability,
    )
    .await
    .map_err(|e| errors::api_error(context, e))?;

    Ok(response::ok_with_message(vet, "availability updated"))
}
