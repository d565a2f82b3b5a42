use ntex::web;

use crate::{
    api,
    front::{AppState, errors, middleware::{self, payload::{ApiJson, ApiPath}}, response, session},
};

#[web::get("")]
async fn list_pets(
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let pets = api::pet::list_pets(&app_state.repo, user_session.user_id)
        .await
        .map_err(|e| errors::api_error("at GET /pets", e))?;

    Ok(response::ok(pets))
}

#[web::post("")]
async fn create_pet(
    _: middleware::csrf_token::CsrfToken,
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    body: ApiJson<api::pet::PetRequest>,
) -> Result<impl web::Responder, web::Error> {
    let pet = api::pet::create_pet(&app_state.repo, user_session.user_id, body.into_inner())
        .await
        .map_err(|e| errors::api_error("at POST /pets", e))?;

    Ok(response::created(pet))
}

/// Pet with its medical records and vaccinations.
#[web::get("/{pet_id}")]
async fn get_pet(
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    path: ApiPath<(i64,)>,
) -> Result<impl web::Responder, web::Error> {
    let details = api::pet::get_pet_details(&app_state.repo, user_session.user_id, path.0)
        .await
        .map_err(|e| errors::api_error("at GET /pets/{id}", e))?;

    Ok(response::ok(details))
}

#[web::put("/{pet_id}")]
async fn update_pet(
    _: middleware::csrf_token::CsrfToken,
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    path: ApiPath<(i64,)>,
    body: ApiJson<api::pet::PetRequest>,
) -> Result<impl web::Responder, web::Error> {
    let pet = api::pet::update_pet(
        &app_state.repo,
        user_session.user_id,
        path.0,
        body.into_inner(),
    )
    .await
    .map_err(|e| errors::api_error("at PUT /pets/{id}", e))?;

    Ok(response::ok_with_message(pet, "pet updated"))
}

#[web::delete("/{pet_id}")]
async fn delete_pet(
    _: middleware::csrf_token::CsrfToken,
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    path: ApiPath<(i64,)>,
) -> Result<impl web::Responder, web::Error> {
    api::pet::delete_pet(&app_state.repo, user_session.user_id, path.0)
        .await
        .map_err(|e| errors::api_error("at DELETE /pets/{id}", e))?;

    Ok(web::HttpResponse::Ok().json(&response::ApiResponse::message("pet deleted")))
}

#[web::get("/{pet_id}/medical-records")]
async fn get_medical_records(
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    path: ApiPath<(i64,)>,
) -> Result<impl web::Responder, web::Error> {
    let records = api::pet::get_medical_records(&app_state.repo, user_session.user_id, path.0)
        .await
        .map_err(|e| errors::api_error("at GET /pets/{id}/medical-records", e))?;

    Ok(response::ok(records))
}

#[web::post("/{pet_id}/medical-records")]
async fn add_medical_record(
    _: middleware::csrf_token::CsrfToken,
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    path: ApiPath<(i64,)>,
    body: ApiJson<api::pet::MedicalRecordRequest>,
) -> Result<impl web::Responder, web::Error> {
    let record = api::pet::add_medical_record(
        &app_state.repo,
        user_session.user_id,
        path.0,
        body.into_inner(),
    )
    .await
    .map_err(|e| errors::api_error("at POST /pets/{id}/medical-records", e))?;

    Ok(response::created(record))
}

#[web::get("/{pet_id}/vaccinations")]
async fn get_vaccinations(
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    path: ApiPath<(i64,)>,
) -> Result<impl web::Responder, web::Error> {
    let vaccinations = api::pet::get_vaccinations(&app_state.repo, user_session.user_id, path.0)
        .await
        .map_err(|e| errors::api_error("at GET /pets/{id}/vaccinations", e))?;

    Ok(response::ok(vaccinations))
}

#[web::post("/{pet_id}/vaccinations")]
async fn add_vaccination(
    _: middleware::csrf_token::CsrfToken,
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
    path: ApiPath<(i64,)>,
    body: ApiJson<api::pet::VaccinationRequest>,
) -> Result<impl web::Responder, web::Error> {
    let vaccination = api::pet::add_vaccination(
        &app_state.repo,
        user_session.user_id,
        path.0,
        body.into_inner(),
    )
    .await
    .map_err(|e| errors::api_error("at POST /pets/{id}/vaccinations", e))?;

    Ok(response::created(vaccination))
}
