use base64::{Engine, prelude::BASE64_STANDARD};
use csrf::CsrfProtection;
use ntex::{http::Payload, web};
use ntex_session::UserSession;

use crate::{
    consts,
    front::{AppState, errors},
};

/// Guard for mutating endpoints: the `X-CSRF-Token` header must pair with the
/// csrf cookie stored in the encrypted session at login.
#[derive(Default, Debug)]
pub struct CsrfToken;

fn header_token(req: &web::HttpRequest) -> Option<String> {
    req.headers()
        .get(consts::CSRF_TOKEN_HEADER_NAME)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn is_csrf_valid(req: &web::HttpRequest) -> bool {
    if let (Some(token_base64), Ok(Some(cookie_base64)), Some(app_state)) = (
        header_token(req),
        req.get_session()
            .get::<String>(consts::CSRF_TOKEN_COOKIE_NAME),
        req.app_state::<AppState>(),
    ) {
        let token = BASE64_STANDARD
            .decode(token_base64.as_bytes())
            .map(|token| app_state.csrf_protec.parse_token(&token));
        let cookie = BASE64_STANDARD
            .decode(cookie_base64.as_bytes())
            .map(|cookie| app_state.csrf_protec.parse_cookie(&cookie));

        if let (Ok(Ok(token)), Ok(Ok(cookie))) = (token, cookie) {
            return app_state
                .csrf_protec
                .verify_token_pair(&token, &cookie)
                .is_ok();
        }
    }

    false
}

impl<Err> web::FromRequest<Err> for CsrfToken {
    type Error = web::Error;

    fn from_request(
        req: &web::HttpRequest,
        _: &mut Payload,
    ) -> impl std::future::Future<Output = Result<Self, Self::Error>> {
        if !is_csrf_valid(req) {
            return std::future::ready(Err(errors::ServerError::InvalidCsrfToken.into()));
        }

        std::future::ready(Ok(Self))
    }
}
