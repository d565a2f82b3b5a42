use ntex::web;
use serde::Deserialize;

use crate::{
    api,
    front::{
        AppState, errors, middleware::{self, payload::{ApiJson, ApiQuery, ApiPath}}, response, session,
    },
};

#[derive(Deserialize, Debug)]
pub struct AvailabilityQuery {
    /// YYYY-MM-DD
    date: String,
    veterinarian_id: Option<i64>,
}

#[web::get("")]
async fn list_appointments(
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    query: ApiQuery<api::appointment::AppointmentQuery>,
) -> Result<impl web::Responder, web::Error> {
    let appointments = api::appointment::list_own_appointments(
        &app_state.repo,
        user_session.user_id,
        query.into_inner(),
    )
    .await
    .map_err(|e| errors::api_error("at GET /appointments", e))?;

    Ok(response::ok(appointments))
}

#[web::post("")]
async fn create_appointment(
    _: middleware::csrf_token::CsrfToken,
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    body: ApiJson<api::appointment::CreateAppointmentRequest>,
) -> Result<impl web::Responder, web::Error> {
    let appointment = api::appointment::create_appointment(
        &app_state.repo,
        user_session.user_id,
        body.into_inner(),
    )
    .await
    .map_err(|e| errors::api_error("at POST /appointments", e))?;

    Ok(response::created(appointment))
}

/// Booked (active) slots of a day, optionally for a single vet.
#[web::get("/availability")]
async fn booked_slots(
    _: session::WebAppSession,
    app_state: web::types::State<AppState>,
    query: ApiQuery<AvailabilityQuery>,
) -> Result<impl web::Responder, web::Error> {
    let date = api::availability::parse_date(&query.date)
        .map_err(|e| errors::api_error("at GET /appointments/availability", e))?;

    let slots = api::appointment::get_booked_slots(&app_state.repo, date, query.veterinarian_id)
        .await
        .map_err(|e| errors::api_error("at GET /appointments/availability", e))?;

    Ok(response::ok(slots))
}

#[web::get("/{appointment_id}")]
async fn get_appointment(
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    path: ApiPath<(i64,)>,
) -> Result<impl web::Responder, web::Error> {
    let appointment =
        api::appointment::get_appointment(&app_state.repo, user_session.user_id, path.0)
            .await
            .map_err(|e| errors::api_error("at GET /appointments/{id}", e))?;

    Ok(response::ok(appointment))
}

#[web::put("/{appointment_id}")]
async fn update_appointment(
    _: middleware::csrf_token::CsrfToken,
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    path: ApiPath<(i64,)>,
    body: ApiJson<api::appointment::UpdateAppointmentRequest>,
) -> Result<impl web::Responder, web::Error> {
    let appointment = api::appointment::update_appointment(
        &app_state.repo,
        user_session.user_id,
        path.0,
        body.into_inner(),
    )
    .await
    .map_err(|e| errors::api_error("at PUT /appointments/{id}", e))?;

    Ok(response::ok_with_message(appointment, "appointment updated"))
}

/// Cancels, never deletes.
#[web::delete("/{appointment_id}")]
async fn cancel_appointment(
    _: middleware::csrf_token::CsrfToken,
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    path: ApiPath<(i64,)>,
) -> Result<impl web::Responder, web::Error> {
    let appointment =
        api::appointment::cancel_appointment(&app_state.repo, user_session.user_id, path.0)
            .await
            .map_err(|e| errors::api_error("at DELETE /appointments/{id}", e))?;

    Ok(response::ok_with_message(appointment, "appointment cancelled"))
}
