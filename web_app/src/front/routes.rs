//! Route configuration.
//!
//! Routes are grouped by functionality into scopes. Static segments are
//! registered before `{id}` segments of the same scope.

use super::{admin, appointment, auth, clinic, pet, server, vet, veterinarian};
use ntex::web;

/// # Routes
/// - `POST /auth/register`, `POST /auth/login`, `POST /auth/logout`
/// - `GET /auth/me`
/// - `GET /auth/google`, `GET /auth/google_callback`
pub fn auth(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/auth").service((
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        auth::google_auth_url,
        auth::google_callback,
    )));
}

/// # Routes
/// - `GET|POST /appointments`
/// - `GET /appointments/availability`
/// - `GET|PUT|DELETE /appointments/{appointment_id}`
pub fn appointments(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/appointments").service((
        appointment::list_appointments,
        appointment::create_appointment,
        appointment::booked_slots,
        appointment::get_appointment,
        appointment::update_appointment,
        appointment::cancel_appointment,
    )));
}

/// # Routes
/// - `GET /veterinarians`
/// - `GET /veterinarians/{vet_id}`
/// - `GET /veterinarians/{vet_id}/slots`
pub fn veterinarians(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/veterinarians").service((
        veterinarian::list_veterinarians,
        veterinarian::get_veterinarian,
        veterinarian::get_veterinarian_slots,
    )));
}

pub fn clinics(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/clinics").service((clinic::list_clinics, clinic::get_clinic)));
}

/// # Routes
/// - `GET|POST /pets`
/// - `GET|PUT|DELETE /pets/{pet_id}`
/// - `GET|POST /pets/{pet_id}/medical-records`
/// - `GET|POST /pets/{pet_id}/vaccinations`
pub fn pets(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/pets").service((
        pet::list_pets,
        pet::create_pet,
        pet::get_pet,
        pet::update_pet,
        pet::delete_pet,
        pet::get_medical_records,
        pet::add_medical_record,
        pet::get_vaccinations,
        pet::add_vaccination,
    )));
}

/// Admin only. The role is re-checked against storage in every handler.
pub fn admin(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/admin").service((
        admin::get_stats,
        admin::list_users,
        admin::change_user_role,
        admin::standardize_roles,
        admin::list_appointments,
        admin::create_clinic,
        admin::create_veterinarian,
        admin::assign_veterinarian,
    )));
}

/// Vet only, scoped to the caller's own profile.
pub fn vet(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/vet").service((
        vet::get_stats,
        vet::get_schedule,
        vet::update_appointment_status,
        vet::get_patients,
        vet::get_profile,
        vet::update_availability,
    )));
}

pub fn health(cfg: &mut web::ServiceConfig) {
    cfg.service(server::health);
}
