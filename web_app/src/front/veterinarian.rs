use chrono::NaiveDate;
use ntex::web;
use serde::Deserialize;

use crate::{
    api,
    front::{AppState, errors, middleware::payload::{ApiQuery, ApiPath}, response, session},
};

#[derive(Deserialize, Debug, Default)]
pub struct VeterinarianQuery {
    /// YYYY-MM-DD, adds the free slots of that day
    date: Option<String>,
    specialization: Option<String>,
}

fn parse_optional_date(date: Option<&str>, context: &str) -> Result<Option<NaiveDate>, web::Error> {
    date.map(api::availability::parse_date)
        .transpose()
        .map_err(|e| errors::api_error(context, e))
}

#[web::get("")]
async fn list_veterinarians(
    _: session::WebAppSession,
    app_state: web::types::State<AppState>,
    query: ApiQuery<VeterinarianQuery>,
) -> Result<impl web::Responder, web::Error> {
    let date = parse_optional_date(query.date.as_deref(), "at GET /veterinarians")?;

    let veterinarians = api::veterinarian::list_veterinarians(
        &app_state.repo,
        date,
        query.specialization.as_deref(),
    )
    .await
    .map_err(|e| errors::api_error("at GET /veterinarians", e))?;

    Ok(response::ok(veterinarians))
}

#[web::get("/{vet_id}")]
async fn get_veterinarian(
    _: session::WebAppSession,
    app_state: web::types::State<AppState>,
    path: ApiPath<(i64,)>,
    query: ApiQuery<VeterinarianQuery>,
) -> Result<impl web::Responder, web::Error> {
    let date = parse_optional_date(query.date.as_deref(), "at GET /veterinarians/{id}")?;

    let profile = api::veterinarian::get_veterinarian(&app_state.repo, path.0, date)
        .await
        .map_err(|e| errors::api_error("at GET /veterinarians/{id}", e))?;

    Ok(response::ok(profile))
}

#[web::get("/{vet_id}/slots")]
async fn get_veterinarian_slots(
    _: session::WebAppSession,
    app_state: web::types::State<AppState>,
    path: ApiPath<(i64,)>,
    query: ApiQuery<VeterinarianQuery>,
) -> Result<impl web::Responder, web::Error> {
    let date = parse_optional_date(query.date.as_deref(), "at GET /veterinarians/{id}/slots")?
        .ok_or_else(|| errors::UserError::InvalidInput("date is required".to_string()))?;

    let slots = api::veterinarian::get_veterinarian_slots(&app_state.repo, path.0, date)
        .await
        .map_err(|e| errors::api_error("at GET /veterinarians/{id}/slots", e))?;

    Ok(response::ok(slots))
}
