use ntex::{
    http::Payload,
    web::{Error, FromRequest, HttpRequest},
};
use ntex_identity::RequestIdentity;

use crate::front::{errors, session::WebAppSession};

fn deserialize_session(str: &str) -> serde_json::Result<WebAppSession> {
    serde_json::from_str::<WebAppSession>(str)
}

/// Extracts the [WebAppSession] from the identity cookie
fn get_logged_user(auth_cookie: Option<String>) -> Result<WebAppSession, Error> {
    if let Ok(session) = deserialize_session(&auth_cookie.unwrap_or_default()) {
        return Ok(session);
    }

    Err(errors::UserError::Unauthorized.into())
}

impl<Err> FromRequest<Err> for WebAppSession {
    type Error = Error;

    fn from_request(
        req: &HttpRequest,
        _: &mut Payload,
    ) -> impl std::future::Future<Output = Result<Self, Self::Error>> {
        let identity_cookie = req.get_identity();
        futures::future::ready(get_logged_user(identity_cookie))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user_app::AccountRole;

    #[test]
    fn test_get_logged_user() {
        let raw = serde_json::to_string(&WebAppSession {
            user_id: 1,
            email: "jane@x.com".to_string(),
            name: "Jane".to_string(),
            role: AccountRole::Customer,
        })
        .unwrap();

        assert_eq!(get_logged_user(Some(raw)).unwrap().user_id, 1);
        assert!(get_logged_user(None).is_err());
        assert!(get_logged_user(Some("{not json".to_string())).is_err());
    }
}
