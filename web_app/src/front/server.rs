//! Handlers not linked to a specific resource

use ntex::web;
use serde_json::json;

use crate::front::{errors, response};

/// Return a [UrlNotFound](errors::UserError::UrlNotFound) error for urls not defined
pub async fn serve_not_found() -> Result<web::HttpResponse, web::Error> {
    Err(errors::UserError::UrlNotFound.into())
}

#[web::get("/health")]
async fn health() -> Result<impl web::Responder, web::Error> {
    Ok(response::ok(json!({ "status": "ok" })))
}
