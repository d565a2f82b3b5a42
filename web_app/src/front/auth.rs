//! Account endpoints: registration, password and Google login, logout.
//!
//! A successful login stores the [session::WebAppSession] in the identity
//! cookie and the csrf cookie in the private session; the matching csrf token
//! goes back in the body and must be echoed in `X-CSRF-Token`.

use csrf::CsrfProtection;
use ntex::web;
use ntex_identity::Identity;
use oauth2::{AuthorizationCode, CsrfToken, TokenResponse, reqwest};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    api, consts,
    front::{
        AppState, errors, middleware::{self, payload::{ApiJson, ApiQuery}}, oauth, response, session,
    },
    models::user_app::{RolePermissions, User},
};

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    email: String,
    password: String,
}

/// Google oauth minimum data to handle the login callback request
#[derive(Deserialize, Debug)]
struct Q {
    code: String,
    state: String,
}

/// Google oauth minimum data to handle the login callback request
#[derive(Deserialize, Clone, Debug)]
pub struct UserProfile {
    email: String,
    name: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct LoggedUser {
    #[serde(flatten)]
    user: User,
    permissions: RolePermissions,
    #[serde(skip_serializing_if = "Option::is_none")]
    csrf_token: Option<String>,
}

impl LoggedUser {
    fn new(user: User, csrf_token: Option<String>) -> Self {
        Self {
            permissions: user.account_role.permissions(),
            user,
            csrf_token,
        }
    }
}

/// Remembers `user` and returns a fresh csrf token bound to this session.
fn start_session(
    app_state: &AppState,
    cookie: &ntex_session::Session,
    identity: &Identity,
    user: &User,
) -> Result<String, web::Error> {
    let (csrf_token, csrf_cookie) = app_state
        .csrf_protec
        .generate_token_pair(None, consts::MAX_AGE_COOKIES)
        .map_err(|e| {
            errors::ServerError::InternalServerError(format!("cant set token csrf protection: {e}"))
        })?;

    cookie.set(consts::CSRF_TOKEN_COOKIE_NAME, csrf_cookie.b64_string())?;
    session::WebAppSession::from(user).remember(identity)?;

    Ok(csrf_token.b64_string())
}

#[web::post("/register")]
async fn register(
    app_state: web::types::State<AppState>,
    body: ApiJson<api::user::RegisterRequest>,
) -> Result<impl web::Responder, web::Error> {
    let user = api::user::register_user(&app_state.repo, &body)
        .await
        .map_err(|e| errors::api_error("at POST /auth/register", e))?;

    Ok(response::created(LoggedUser::new(user, None)))
}

#[web::post("/login")]
async fn login(
    app_state: web::types::State<AppState>,
    body: ApiJson<LoginRequest>,
    cookie: ntex_session::Session,
    identity: Identity,
) -> Result<impl web::Responder, web::Error> {
    let user = api::user::login(&app_state.repo, &body.email, &body.password)
        .await
        .map_err(|e| errors::api_error("at POST /auth/login", e))?;

    let csrf_token = start_session(&app_state, &cookie, &identity, &user)?;

    Ok(response::ok_with_message(
        LoggedUser::new(user, Some(csrf_token)),
        "logged in",
    ))
}

#[web::post("/logout")]
async fn logout(
    _: middleware::csrf_token::CsrfToken,
    _: session::WebAppSession,
    cookie: ntex_session::Session,
    identity: Identity,
) -> Result<impl web::Responder, web::Error> {
    identity.forget();
    cookie.clear();

    Ok(web::HttpResponse::Ok().json(&response::ApiResponse::message("logged out")))
}

/// Current user, re-read from storage so a changed role shows immediately.
#[web::get("/me")]
async fn me(
    user_session: session::WebAppSession,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let user = api::user::resolve_user(&app_state.repo, user_session.user_id)
        .await
        .map_err(|e| errors::api_error("at GET /auth/me", e))?;

    Ok(response::ok(LoggedUser::new(user, None)))
}

/// Starts the Google sign-in: returns the authorization url and keeps the
/// oauth state in the session.
#[web::get("/google")]
async fn google_auth_url(cookie: ntex_session::Session) -> Result<impl web::Responder, web::Error> {
    let client = oauth::build_google_oauth_client().map_err(|e| {
        errors::ServerError::ExternalServiceError(format!("at google oauth client: {e}"))
    })?;
    let (auth_url, csrf_state) = oauth::get_new_auth_url(&client);

    cookie
        .set(consts::CSRF_STATE_COOKIE_NAME, csrf_state)
        .map_err(|e| {
            errors::ServerError::InternalServerError(format!(
                "at /auth/google cant set CSRF_STATE_COOKIE_NAME: {e}"
            ))
        })?;

    Ok(response::ok(json!({ "auth_url": auth_url.to_string() })))
}

/// Endpoint handles the google oauth callback
#[web::get("/google_callback")]
async fn google_callback(
    q: ApiQuery<Q>,
    cookie: ntex_session::Session,
    app_state: web::types::State<AppState>,
    identity: Identity,
) -> Result<impl web::Responder, web::Error> {
    if q.state.ne(cookie
        .get::<CsrfToken>(consts::CSRF_STATE_COOKIE_NAME)?
        .unwrap_or(CsrfToken::new_random())
        .secret())
    {
        cookie.clear();
        return Err(errors::UserError::Forbidden("invalid oauth state".into()).into());
    }
    cookie.remove(consts::CSRF_STATE_COOKIE_NAME);

    let client = oauth::build_google_oauth_client().map_err(|e| {
        errors::ServerError::ExternalServiceError(format!("at google oauth client: {e}"))
    })?;

    let token = client
        .exchange_code(AuthorizationCode::new(q.code.to_string()))
        .request_async(
            &reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::limited(1))
                .build()
                .map_err(|e| {
                    errors::ServerError::ExternalServiceError(format!(
                        "at google oauth token creation: {e}"
                    ))
                })?,
        )
        .await
        .map_err(|e| {
            errors::ServerError::ExternalServiceError(format!(
                "at google oauth token creation: {e}"
            ))
        })?
        .access_token()
        .secret()
        .to_string();

    let profile = crate::utils::REQUEST_CLIENT
        .get(consts::GOOGLE_ENDPOINT_USER_INFO)
        .bearer_auth(token)
        .send()
        .await
        .map_err(|e| {
            errors::ServerError::ExternalServiceError(format!("at get google user info: {}", e))
        })?
        .json::<UserProfile>()
        .await
        .map_err(|e| {
            errors::ServerError::ExternalServiceError(format!("at get google user info: {}", e))
        })?;

    let user =
        api::user::get_or_create_user_by_email(&app_state.repo, &profile.email, profile.name.as_deref())
            .await
            .map_err(|e| errors::api_error("at /auth/google_callback", e))?;

    let csrf_token = start_session(&app_state, &cookie, &identity, &user)?;

    Ok(response::ok_with_message(
        LoggedUser::new(user, Some(csrf_token)),
        "logged in",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user_app::AccountRole;

    #[test]
    fn test_logged_user_carries_role_permissions() {
        let user = User::new("Vet", "vet@x.com", AccountRole::Vet);

        let value = serde_json::to_value(LoggedUser::new(user, Some("tok".to_string()))).unwrap();

        assert_eq!(value["account_role"], "Vet");
        assert_eq!(value["permissions"]["can_view_patients"], true);
        assert_eq!(value["permissions"]["can_manage_users"], false);
        assert_eq!(value["csrf_token"], "tok");
        assert!(value.get("password_hash").is_none());
    }
}
