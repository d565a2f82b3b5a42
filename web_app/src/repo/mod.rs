//! Persistence boundary. Handlers and business functions only see [`AppRepo`];
//! composed reads (joins) are exposed as named methods returning read models.

pub mod sqlite;
pub mod sqlite_queries;

use crate::models;
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Outcome of a write guarded by the active-slot uniqueness rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotWrite {
    Written(i64),
    SlotTaken,
    /// The row left the expected status before the write landed.
    StatusChanged,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppRepo {
    // users

    async fn get_user_by_id(&self, user_id: i64) -> anyhow::Result<Option<models::user_app::User>>;

    async fn get_user_by_email(
        &self,
        email: &str,
    ) -> anyhow::Result<Option<models::user_app::User>>;

    /// Returns `None` when the email is already registered.
    async fn insert_user(&self, user: &models::user_app::User) -> anyhow::Result<Option<i64>>;

    async fn get_all_users(&self) -> anyhow::Result<Vec<models::user_app::User>>;

    async fn update_user_role(
        &self,
        user_id: i64,
        role: models::user_app::AccountRole,
    ) -> anyhow::Result<bool>;

    async fn get_stored_roles(&self) -> anyhow::Result<Vec<models::user_app::StoredRole>>;

    // pets

    async fn insert_pet(&self, pet: &models::pet::Pet) -> anyhow::Result<i64>;

    async fn update_pet(&self, pet: &models::pet::Pet) -> anyhow::Result<()>;

    async fn delete_pet(&self, pet_id: i64) -> anyhow::Result<()>;

    async fn get_pet_by_id(&self, pet_id: i64) -> anyhow::Result<Option<models::pet::Pet>>;

    async fn get_pets_by_owner(&self, owner_id: i64) -> anyhow::Result<Vec<models::pet::Pet>>;

    async fn insert_medical_record(
        &self,
        record: &models::pet::MedicalRecord,
    ) -> anyhow::Result<i64>;

    async fn get_medical_records(
        &self,
        pet_id: i64,
    ) -> anyhow::Result<Vec<models::pet::MedicalRecord>>;

    async fn insert_vaccination(
        &self,
        vaccination: &models::pet::Vaccination,
    ) -> anyhow::Result<i64>;

    async fn get_vaccinations(&self, pet_id: i64)
    -> anyhow::Result<Vec<models::pet::Vaccination>>;

    // veterinarians

    /// Returns `None` when the user already has a profile.
    async fn insert_veterinarian(
        &self,
        vet: &models::veterinarian::Veterinarian,
    ) -> anyhow::Result<Option<i64>>;

    async fn update_veterinarian(
        &self,
        vet: &models::veterinarian::Veterinarian,
    ) -> anyhow::Result<()>;

    async fn get_veterinarian_by_id(
        &self,
        vet_id: i64,
    ) -> anyhow::Result<Option<models::veterinarian::Veterinarian>>;

    async fn get_veterinarian_by_user_id(
        &self,
        user_id: i64,
    ) -> anyhow::Result<Option<models::veterinarian::Veterinarian>>;

    async fn get_veterinarian_profile(
        &self,
        vet_id: i64,
    ) -> anyhow::Result<Option<models::veterinarian::VeterinarianProfile>>;

    async fn get_veterinarian_profiles(
        &self,
        only_available: bool,
    ) -> anyhow::Result<Vec<models::veterinarian::VeterinarianProfile>>;

    async fn get_veterinarian_clinic_ids(&self, vet_id: i64) -> anyhow::Result<Vec<i64>>;

    // clinics

    async fn insert_clinic(&self, clinic: &models::clinic::Clinic) -> anyhow::Result<i64>;

    async fn get_clinic_by_id(
        &self,
        clinic_id: i64,
    ) -> anyhow::Result<Option<models::clinic::Clinic>>;

    async fn get_clinics(&self, only_active: bool) -> anyhow::Result<Vec<models::clinic::Clinic>>;

    async fn assign_veterinarian_to_clinic(
        &self,
        clinic_id: i64,
        vet_id: i64,
    ) -> anyhow::Result<()>;

    // appointments

    /// Conditional insert: [`SlotWrite::SlotTaken`] when an active appointment
    /// already holds the same vet (or clinic) and start instant.
    async fn insert_appointment(
        &self,
        appointment: &models::appointment::Appointment,
    ) -> anyhow::Result<SlotWrite>;

    /// Full row update, guarded by the same uniqueness rule as inserts. Only
    /// lands while the stored status still equals `expected_status`.
    async fn update_appointment(
        &self,
        appointment: &models::appointment::Appointment,
        expected_status: models::appointment::AppointmentStatus,
    ) -> anyhow::Result<SlotWrite>;

    /// Compare-and-set on the status column. `false` when the row was not in
    /// the `from` status anymore.
    async fn transition_appointment_status(
        &self,
        appointment_id: i64,
        from: models::appointment::AppointmentStatus,
        to: models::appointment::AppointmentStatus,
    ) -> anyhow::Result<bool>;

    async fn get_appointment_by_id(
        &self,
        appointment_id: i64,
    ) -> anyhow::Result<Option<models::appointment::Appointment>>;

    async fn get_appointment_details(
        &self,
        appointment_id: i64,
    ) -> anyhow::Result<Option<models::appointment::AppointmentDetails>>;

    async fn find_appointments(
        &self,
        filter: &models::appointment::AppointmentFilter,
    ) -> anyhow::Result<Vec<models::appointment::AppointmentDetails>>;

    /// Active appointments whose start falls in `[from, until)`.
    async fn get_booked_slots(
        &self,
        from: NaiveDateTime,
        until: NaiveDateTime,
        vet_id: Option<i64>,
    ) -> anyhow::Result<Vec<models::appointment::BookedSlot>>;

    // reporting

    async fn get_admin_counts(
        &self,
        day_start: NaiveDateTime,
        next_day: NaiveDateTime,
    ) -> anyhow::Result<models::report::AdminCounts>;

    async fn get_vet_counts(
        &self,
        vet_id: i64,
        day_start: NaiveDateTime,
        next_day: NaiveDateTime,
    ) -> anyhow::Result<models::report::VetCounts>;

    async fn get_vet_patients(
        &self,
        vet_id: i64,
    ) -> anyhow::Result<Vec<models::report::PatientSummary>>;
}

pub type ImplAppRepo = Box<dyn AppRepo>;
