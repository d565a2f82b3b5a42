//! HTTP layer: ntex handlers, extractors, error mapping and routes.
//!
//! Handlers stay thin. They pull the caller from the identity cookie, call
//! into [`crate::api`] and wrap the result in the [`response::ApiResponse`]
//! envelope.

pub mod admin;
pub mod appointment;
pub mod auth;
pub mod clinic;
pub mod errors;
pub mod middleware;
pub mod oauth;
pub mod pet;
pub mod response;
pub mod routes;
pub mod server;
pub mod session;
pub mod vet;
pub mod veterinarian;

use crate::{repo, services};
use csrf::AesGcmCsrfProtection;

pub struct AppState {
    pub csrf_protec: AesGcmCsrfProtection,
    pub repo: repo::ImplAppRepo,
    pub metrics_estimator: services::ImplMetricsEstimator,
}
