use crate::models::user_app::{AccountRole, User};
use ntex_identity::Identity;

/// Identity cookie payload, stored encrypted on the client.
///
/// `role` is a snapshot taken at login. Privileged handlers re-resolve the
/// user from storage instead of trusting it.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct WebAppSession {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub role: AccountRole,
}

impl From<&User> for WebAppSession {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.to_string(),
            name: user.name.to_string(),
            role: user.account_role,
        }
    }
}

impl WebAppSession {
    pub fn remember(&self, identity: &Identity) -> serde_json::Result<()> {
        identity.remember(serde_json::to_string(self)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_snapshot_from_user() {
        let user = User {
            id: 9,
            ..User::new("Jane", "Jane@X.com", AccountRole::Vet)
        };

        let session = WebAppSession::from(&user);
        let raw = serde_json::to_string(&session).unwrap();

        assert_eq!(session.email, "jane@x.com");
        assert_eq!(
            serde_json::from_str::<WebAppSession>(&raw).unwrap(),
            session
        );
    }
}
