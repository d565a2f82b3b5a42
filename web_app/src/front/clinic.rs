//! Public clinic catalogue.

use ntex::web;

use crate::{
    api,
    front::{AppState, errors, middleware::payload::ApiPath, response},
};

#[web::get("")]
async fn list_clinics(
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let clinics = api::clinic::list_clinics(&app_state.repo)
        .await
        .map_err(|e| errors::api_error("at GET /clinics", e))?;

    Ok(response::ok(clinics))
}

#[web::get("/{clinic_id}")]
async fn get_clinic(
    app_state: web::types::State<AppState>,
    path: ApiPath<(i64,)>,
) -> Result<impl web::Responder, web::Error> {
    let clinic = api::clinic::get_clinic(&app_state.repo, path.0)
        .await
        .map_err(|e| errors::api_error("at GET /clinics/{id}", e))?;

    Ok(response::ok(clinic))
}
