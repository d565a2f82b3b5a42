pub mod csrf_token;
pub mod logged_user;
pub mod payload;
