use super::response::ApiResponse;
use crate::api::{self, DomainError};
use derive_more::{Display, Error};
use log::{error, warn};
use ntex::{http, web};

#[derive(Debug, Display, Error, PartialEq)]
pub enum UserError {
    #[display("resource not found")]
    UrlNotFound,
    #[display("authentication required")]
    Unauthorized,
    #[display("{_0}")]
    InvalidInput(#[error(not(source))] String),
    #[display("{_0}")]
    Forbidden(#[error(not(source))] String),
    #[display("{_0}")]
    NotFound(#[error(not(source))] String),
    #[display("{_0}")]
    Conflict(#[error(not(source))] String),
}

impl web::error::WebResponseError for UserError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        warn!("{:?}", self);

        web::HttpResponse::build(self.status_code()).json(&ApiResponse::failure(&self.to_string()))
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            UserError::UrlNotFound | UserError::NotFound(_) => http::StatusCode::NOT_FOUND,
            UserError::Unauthorized => http::StatusCode::UNAUTHORIZED,
            UserError::InvalidInput(_) => http::StatusCode::BAD_REQUEST,
            UserError::Forbidden(_) => http::StatusCode::FORBIDDEN,
            UserError::Conflict(_) => http::StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, Display, Error)]
pub enum ServerError {
    ExternalServiceError(#[error(not(source))] String),
    InternalServerError(#[error(not(source))] String),
    InvalidCsrfToken,
}

impl ServerError {
    fn get_error_message(&self) -> String {
        match self {
            ServerError::ExternalServiceError(msg) => format!("[ExternalServiceError] {:#?}", msg),
            ServerError::InternalServerError(msg) => format!("[InternalServerError] {:#?}", msg),
            ServerError::InvalidCsrfToken => "[InvalidCsrfToken]".to_string(),
        }
    }

    /// Text sent to the client. Details only leave the process in debug builds.
    fn public_message(&self) -> String {
        match self {
            ServerError::InvalidCsrfToken => "invalid csrf token".to_string(),
            _ if cfg!(debug_assertions) => self.get_error_message(),
            _ => "internal server error".to_string(),
        }
    }
}

impl web::error::WebResponseError for ServerError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        error!("{}", self.get_error_message());

        web::HttpResponse::build(self.status_code())
            .json(&ApiResponse::failure(&self.public_message()))
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            ServerError::InvalidCsrfToken => http::StatusCode::FORBIDDEN,
            ServerError::ExternalServiceError(_) => http::StatusCode::BAD_GATEWAY,
            ServerError::InternalServerError(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn to_user_error(err: &anyhow::Error) -> Option<UserError> {
    Some(match api::domain_error(err)? {
        DomainError::Validation(msg) => UserError::InvalidInput(msg.clone()),
        DomainError::Unauthenticated => UserError::Unauthorized,
        DomainError::Forbidden(msg) => UserError::Forbidden(msg.clone()),
        DomainError::NotFound(msg) => UserError::NotFound(format!("{msg} not found")),
        DomainError::Conflict(msg) => UserError::Conflict(msg.clone()),
    })
}

/// Maps a business error to its HTTP form. Anything that is not a
/// [`DomainError`] is an internal error tagged with `context`.
pub fn api_error(context: &str, err: anyhow::Error) -> web::Error {
    match to_user_error(&err) {
        Some(user_error) => user_error.into(),
        None => ServerError::InternalServerError(format!("{context}: {err:#}")).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ntex::web::error::WebResponseError;

    #[test]
    fn test_domain_errors_keep_their_status() {
        for (err, status) in [
            (DomainError::validation("reason is required"), 400),
            (DomainError::Unauthenticated.into(), 401),
            (DomainError::forbidden("Admin role required"), 403),
            (DomainError::not_found("pet 3"), 404),
            (DomainError::conflict("slot taken"), 409),
        ] {
            let user_error = to_user_error(&err).unwrap();
            assert_eq!(user_error.status_code().as_u16(), status, "{user_error:?}");
        }
    }

    #[test]
    fn test_unexpected_errors_are_internal() {
        assert!(to_user_error(&anyhow::anyhow!("database is locked")).is_none());
        assert_eq!(
            ServerError::InvalidCsrfToken.status_code(),
            http::StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            to_user_error(&DomainError::not_found("pet 3")),
            Some(UserError::NotFound("pet 3 not found".to_string()))
        );
    }
}
