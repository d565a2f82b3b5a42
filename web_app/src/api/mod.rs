//! # API Module
//!
//! Business logic of the clinic. Functions here receive the repository (and
//! any other collaborator) explicitly and return `anyhow::Result`; expected
//! failures are [`DomainError`] values so the HTTP layer can map them to a
//! status code.
//!
//! ## Modules
//!
//! - [`appointment`] - Booking workflow, cancellation and status lifecycle
//! - [`availability`] - Slot computation from weekly templates
//! - [`clinic`] - Clinic catalogue and vet assignments
//! - [`pet`] - Pets and their health records
//! - [`report`] - Admin and vet dashboards
//! - [`user`] - Registration, login and role management
//! - [`veterinarian`] - Vet profiles and schedules

pub mod appointment;
pub mod availability;
pub mod clinic;
pub mod pet;
pub mod report;
pub mod user;
pub mod veterinarian;

use derive_more::{Display, Error};

/// Expected failure of a business operation.
#[derive(Debug, Display, Error, PartialEq)]
pub enum DomainError {
    #[display("validation error: {_0}")]
    Validation(#[error(not(source))] String),
    #[display("authentication required")]
    Unauthenticated,
    #[display("forbidden: {_0}")]
    Forbidden(#[error(not(source))] String),
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    #[display("conflict: {_0}")]
    Conflict(#[error(not(source))] String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> anyhow::Error {
        DomainError::Validation(msg.into()).into()
    }

    pub fn forbidden(msg: impl Into<String>) -> anyhow::Error {
        DomainError::Forbidden(msg.into()).into()
    }

    pub fn not_found(msg: impl Into<String>) -> anyhow::Error {
        DomainError::NotFound(msg.into()).into()
    }

    pub fn conflict(msg: impl Into<String>) -> anyhow::Error {
        DomainError::Conflict(msg.into()).into()
    }
}

/// Returns the [`DomainError`] carried by `err`, if any.
pub fn domain_error(err: &anyhow::Error) -> Option<&DomainError> {
    err.downcast_ref::<DomainError>()
}

/// Strips markup from user supplied free text.
pub fn sanitize_text(value: &str) -> String {
    ammonia::clean(value.trim())
}

pub fn sanitize_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| sanitize_text(&v))
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_survives_anyhow() {
        let err = DomainError::conflict("slot taken");

        assert_eq!(
            domain_error(&err),
            Some(&DomainError::Conflict("slot taken".to_string()))
        );
        assert!(domain_error(&anyhow::anyhow!("db down")).is_none());
    }

    #[test]
    fn test_sanitize_text_removes_scripts() {
        assert_eq!(sanitize_text(" hi<script>alert(1)</script> "), "hi");
        assert_eq!(sanitize_opt(Some("   ".to_string())), None);
    }
}
