pub const CSRF_STATE_COOKIE_NAME: &str = "csrf_state";
pub const CSRF_TOKEN_HEADER_NAME: &str = "x-csrf-token";
pub const CSRF_TOKEN_COOKIE_NAME: &str = "csrf_token";
pub const SESSION_COOKIE_NAME: &str = "vet_clinic_session";
pub const IDENTITY_COOKIE_NAME: &str = "vet_clinic_identity";
pub const GOOGLE_ENDPOINT_USER_INFO: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Length of a bookable slot and of every appointment.
pub const SLOT_MINUTES: u32 = 30;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Rows returned by the "recent appointments" dashboard widgets.
pub const RECENT_APPOINTMENTS_LIMIT: i64 = 10;

pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

pub const MAX_AGE_COOKIES: i64 = chrono::TimeDelta::hours(4).num_seconds();
