pub mod appointment;
pub mod clinic;
pub mod pet;
pub mod user_app;
pub mod veterinarian;
pub mod report;
