//! # Appointment API Module
//!
//! Booking workflow. The slot rule (one active appointment per vet and start
//! instant) is enforced by the repository in the same statement that writes
//! the row; this module only maps [`repo::SlotWrite::SlotTaken`] to a
//! conflict. Status changes follow [`AppointmentStatus::next_statuses`] and
//! are written as compare-and-set on the current status.

use crate::{
    api::{self, DomainError, availability, user},
    consts, metric, models, repo,
};
use anyhow::anyhow;
use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use models::appointment::{
    Appointment, AppointmentDetails, AppointmentFilter, AppointmentStatus, AppointmentType,
    PaymentStatus,
};
use serde::Deserialize;

/// Booking payload. Required fields are optional here so a missing one is a
/// validation error instead of a body decoding failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAppointmentRequest {
    pub veterinarian_id: Option<i64>,
    /// YYYY-MM-DD
    pub date: Option<String>,
    /// HH:MM
    pub time: Option<String>,
    pub reason: Option<String>,
    pub pet_id: Option<i64>,
    pub clinic_id: Option<i64>,
    pub appointment_type: Option<AppointmentType>,
    pub notes: Option<String>,
}

/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub date: Option<String>,
    pub time: Option<String>,
    pub reason: Option<String>,
    pub appointment_type: Option<AppointmentType>,
    pub notes: Option<String>,
    pub pet_id: Option<i64>,
    pub clinic_id: Option<i64>,
    pub status: Option<AppointmentStatus>,
}

/// Status change requested by a vet, with optional clinical notes.
#[derive(Debug, Clone, Deserialize)]
pub struct VetStatusUpdate {
    pub status: AppointmentStatus,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentQuery {
    pub status: Option<AppointmentStatus>,
    pub veterinarian_id: Option<i64>,
    /// YYYY-MM-DD
    pub date: Option<String>,
}

impl AppointmentQuery {
    fn into_filter(self) -> anyhow::Result<AppointmentFilter> {
        let (from, until) = match self.date.as_deref() {
            Some(date) => {
                let (from, until) = availability::day_range(availability::parse_date(date)?);
                (Some(from), Some(until))
            }
            None => (None, None),
        };

        Ok(AppointmentFilter {
            veterinarian_id: self.veterinarian_id,
            status: self.status,
            from,
            until,
            ..Default::default()
        })
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> anyhow::Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DomainError::validation(format!("{field} is required")))
}

fn slot_instant(date: NaiveDate, time: &str) -> anyhow::Result<(NaiveDateTime, NaiveDateTime)> {
    let start = date.and_time(availability::parse_time(time)?);
    Ok((start, start + Duration::minutes(consts::SLOT_MINUTES.into())))
}

async fn load_details(
    repo: &repo::ImplAppRepo,
    appointment_id: i64,
) -> anyhow::Result<AppointmentDetails> {
    repo.get_appointment_details(appointment_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("appointment {appointment_id}")))
}

async fn load_appointment(
    repo: &repo::ImplAppRepo,
    appointment_id: i64,
) -> anyhow::Result<Appointment> {
    repo.get_appointment_by_id(appointment_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("appointment {appointment_id}")))
}

/// The pet must exist and belong to the caller, unless the caller is admin.
async fn check_pet(repo: &repo::ImplAppRepo, caller_id: i64, pet_id: i64) -> anyhow::Result<()> {
    let pet = repo
        .get_pet_by_id(pet_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("pet {pet_id}")))?;

    user::ensure_owner_or_admin(repo, caller_id, pet.owner_id).await
}

/// Inactive clinics don't take bookings and read as unknown.
async fn check_clinic(repo: &repo::ImplAppRepo, clinic_id: i64) -> anyhow::Result<()> {
    repo.get_clinic_by_id(clinic_id)
        .await?
        .filter(|clinic| clinic.is_active)
        .map(|_| ())
        .ok_or_else(|| DomainError::not_found(format!("clinic {clinic_id}")))
}

/// Books an appointment for `caller_id`.
///
/// # Errors
/// - [`DomainError::Validation`] on missing or malformed fields, or when the
///   vet is not taking appointments. Nothing is written.
/// - [`DomainError::NotFound`] for an unknown vet, pet or clinic.
/// - [`DomainError::Forbidden`] when booking for somebody else's pet.
/// - [`DomainError::Conflict`] when the vet already has an active
///   appointment at that instant.
pub async fn create_appointment(
    repo: &repo::ImplAppRepo,
    caller_id: i64,
    request: CreateAppointmentRequest,
) -> anyhow::Result<AppointmentDetails> {
    let _span = logfire::span!("create_appointment").entered();

    let vet_id = request
        .veterinarian_id
        .ok_or_else(|| DomainError::validation("veterinarian_id is required"))?;
    let date = availability::parse_date(required(&request.date, "date")?)?;
    let time = required(&request.time, "time")?;
    let reason = api::sanitize_text(required(&request.reason, "reason")?);
    if reason.is_empty() {
        return Err(DomainError::validation("reason is required"));
    }
    let (start, end) = slot_instant(date, time)?;

    let vet = repo
        .get_veterinarian_by_id(vet_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("veterinarian {vet_id}")))?;
    if !vet.is_available {
        return Err(DomainError::validation(
            "veterinarian is not taking appointments",
        ));
    }

    if let Some(pet_id) = request.pet_id {
        check_pet(repo, caller_id, pet_id).await?;
    }

    let clinic_id = match request.clinic_id {
        Some(clinic_id) => {
            check_clinic(repo, clinic_id).await?;
            Some(clinic_id)
        }
        None => repo
            .get_veterinarian_clinic_ids(vet.id)
            .await?
            .first()
            .copied(),
    };

    let now = Utc::now();
    let appointment = Appointment {
        id: 0,
        pet_id: request.pet_id,
        clinic_id,
        veterinarian_id: Some(vet.id),
        customer_id: caller_id,
        appointment_date: start,
        end_time: end,
        status: AppointmentStatus::Scheduled,
        appointment_type: request.appointment_type.unwrap_or_default(),
        reason,
        diagnosis: None,
        treatment: None,
        notes: api::sanitize_opt(request.notes),
        amount: vet.consultation_fee,
        payment_status: PaymentStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    let appointment_id = match repo.insert_appointment(&appointment).await? {
        repo::SlotWrite::Written(id) => id,
        repo::SlotWrite::SlotTaken => {
            metric::incr_appointment_action_statds("slot_taken");
            return Err(DomainError::conflict(format!(
                "veterinarian {vet_id} is already booked at {start}"
            )));
        }
        repo::SlotWrite::StatusChanged => {
            return Err(anyhow!("appointment insert reported a status change"));
        }
    };

    metric::incr_appointment_action_statds("create");
    tracing::info!(appointment_id, vet_id, %start, "appointment booked");
    load_details(repo, appointment_id).await
}

/// Enriched appointment, visible to the booking customer and to admins.
pub async fn get_appointment(
    repo: &repo::ImplAppRepo,
    caller_id: i64,
    appointment_id: i64,
) -> anyhow::Result<AppointmentDetails> {
    let details = load_details(repo, appointment_id).await?;
    user::ensure_owner_or_admin(repo, caller_id, details.appointment.customer_id).await?;

    Ok(details)
}

/// Merges the patch into the stored appointment.
///
/// Moving the appointment onto an instant already held by an active
/// appointment of the same vet is a conflict, same as when booking.
pub async fn update_appointment(
    repo: &repo::ImplAppRepo,
    caller_id: i64,
    appointment_id: i64,
    patch: UpdateAppointmentRequest,
) -> anyhow::Result<AppointmentDetails> {
    let mut appointment = load_appointment(repo, appointment_id).await?;
    user::ensure_owner_or_admin(repo, caller_id, appointment.customer_id).await?;

    if appointment.status.is_terminal() {
        return Err(DomainError::conflict(format!(
            "appointment is {} and can't be modified",
            appointment.status
        )));
    }

    // owners may only cancel, other lifecycle steps belong to vets and admins
    let loaded_status = appointment.status;
    let status_change = patch.status.filter(|s| *s != loaded_status);
    if status_change.is_some_and(|s| s != AppointmentStatus::Cancelled)
        && !user::resolve_user(repo, caller_id)
            .await?
            .account_role
            .is_admin()
    {
        return Err(DomainError::forbidden(
            "only cancellation can be requested on an appointment",
        ));
    }

    if patch.date.is_some() || patch.time.is_some() {
        let date = match patch.date.as_deref() {
            Some(date) => availability::parse_date(date)?,
            None => appointment.appointment_date.date(),
        };
        let time = patch.time.unwrap_or_else(|| appointment.start_hhmm());
        (appointment.appointment_date, appointment.end_time) = slot_instant(date, &time)?;
    }

    if let Some(reason) = patch.reason {
        appointment.reason = api::sanitize_text(&reason);
        if appointment.reason.is_empty() {
            return Err(DomainError::validation("reason can't be blank"));
        }
    }

    if let Some(appointment_type) = patch.appointment_type {
        appointment.appointment_type = appointment_type;
    }

    if patch.notes.is_some() {
        appointment.notes = api::sanitize_opt(patch.notes);
    }

    if let Some(pet_id) = patch.pet_id {
        check_pet(repo, caller_id, pet_id).await?;
        appointment.pet_id = Some(pet_id);
    }

    if let Some(clinic_id) = patch.clinic_id {
        check_clinic(repo, clinic_id).await?;
        appointment.clinic_id = Some(clinic_id);
    }

    if let Some(status) = status_change {
        if !appointment.status.can_transition_to(status) {
            return Err(DomainError::conflict(format!(
                "appointment can't go from {} to {status}",
                appointment.status
            )));
        }
        appointment.status = status;
    }

    appointment.updated_at = Utc::now();

    match repo.update_appointment(&appointment, loaded_status).await? {
        repo::SlotWrite::Written(_) => {}
        repo::SlotWrite::SlotTaken => {
            return Err(DomainError::conflict(format!(
                "the veterinarian is already booked at {}",
                appointment.appointment_date
            )));
        }
        repo::SlotWrite::StatusChanged => {
            metric::incr_appointment_action_statds("status_race");
            return Err(DomainError::conflict(
                "appointment status changed meanwhile, reload and retry",
            ));
        }
    }

    metric::incr_appointment_action_statds("update");
    load_details(repo, appointment_id).await
}

/// Cancels without deleting. Cancelling twice returns the appointment
/// unchanged; completed, in-progress and no-show appointments can't be
/// cancelled.
pub async fn cancel_appointment(
    repo: &repo::ImplAppRepo,
    caller_id: i64,
    appointment_id: i64,
) -> anyhow::Result<AppointmentDetails> {
    let appointment = load_appointment(repo, appointment_id).await?;
    user::ensure_owner_or_admin(repo, caller_id, appointment.customer_id).await?;

    if appointment.status == AppointmentStatus::Cancelled {
        return load_details(repo, appointment_id).await;
    }

    transition(repo, &appointment, AppointmentStatus::Cancelled).await?;

    metric::incr_appointment_action_statds("cancel");
    load_details(repo, appointment_id).await
}

/// Compare-and-set from the loaded status to `next`.
async fn transition(
    repo: &repo::ImplAppRepo,
    appointment: &Appointment,
    next: AppointmentStatus,
) -> anyhow::Result<()> {
    if !appointment.status.can_transition_to(next) {
        return Err(DomainError::conflict(format!(
            "appointment can't go from {} to {next}",
            appointment.status
        )));
    }

    let applied = repo
        .transition_appointment_status(appointment.id, appointment.status, next)
        .await?;
    if applied {
        return Ok(());
    }

    // somebody else changed the status first
    let current = load_appointment(repo, appointment.id).await?;
    if current.status == next {
        return Ok(());
    }

    Err(DomainError::conflict(format!(
        "appointment changed to {} meanwhile",
        current.status
    )))
}

/// Active appointments on `date`, optionally for one vet.
pub async fn get_booked_slots(
    repo: &repo::ImplAppRepo,
    date: NaiveDate,
    vet_id: Option<i64>,
) -> anyhow::Result<Vec<models::appointment::BookedSlot>> {
    let (day_start, next_day) = availability::day_range(date);
    repo.get_booked_slots(day_start, next_day, vet_id).await
}

/// Appointments booked by the caller.
pub async fn list_own_appointments(
    repo: &repo::ImplAppRepo,
    caller_id: i64,
    query: AppointmentQuery,
) -> anyhow::Result<Vec<AppointmentDetails>> {
    let filter = AppointmentFilter {
        customer_id: Some(caller_id),
        ..query.into_filter()?
    };

    repo.find_appointments(&filter).await
}

/// Every appointment, for admins.
pub async fn list_all_appointments(
    repo: &repo::ImplAppRepo,
    query: AppointmentQuery,
) -> anyhow::Result<Vec<AppointmentDetails>> {
    repo.find_appointments(&query.into_filter()?).await
}

/// Appointments a vet is responsible for: assigned to the vet directly or
/// booked at one of the vet's clinics.
pub async fn is_in_vet_scope(
    repo: &repo::ImplAppRepo,
    vet: &models::veterinarian::Veterinarian,
    appointment: &Appointment,
) -> anyhow::Result<bool> {
    if appointment.veterinarian_id == Some(vet.id) {
        return Ok(true);
    }

    let Some(clinic_id) = appointment.clinic_id else {
        return Ok(false);
    };

    Ok(repo
        .get_veterinarian_clinic_ids(vet.id)
        .await?
        .contains(&clinic_id))
}

/// Vet-driven lifecycle step, optionally recording clinical notes.
pub async fn update_status_by_vet(
    repo: &repo::ImplAppRepo,
    vet: &models::veterinarian::Veterinarian,
    appointment_id: i64,
    request: VetStatusUpdate,
) -> anyhow::Result<AppointmentDetails> {
    let _span = logfire::span!("update_status_by_vet").entered();

    let appointment = load_appointment(repo, appointment_id).await?;
    if !is_in_vet_scope(repo, vet, &appointment).await? {
        return Err(DomainError::forbidden(
            "appointment is not assigned to this veterinarian",
        ));
    }

    transition(repo, &appointment, request.status).await?;

    let diagnosis = api::sanitize_opt(request.diagnosis);
    let treatment = api::sanitize_opt(request.treatment);
    let notes = api::sanitize_opt(request.notes);
    if diagnosis.is_some() || treatment.is_some() || notes.is_some() {
        let mut appointment = load_appointment(repo, appointment_id).await?;
        appointment.diagnosis = diagnosis.or(appointment.diagnosis);
        appointment.treatment = treatment.or(appointment.treatment);
        appointment.notes = notes.or(appointment.notes);
        appointment.updated_at = Utc::now();

        match repo.update_appointment(&appointment, appointment.status).await? {
            repo::SlotWrite::Written(_) => {}
            repo::SlotWrite::SlotTaken => {
                return Err(anyhow!(
                    "appointment {appointment_id} notes update hit the slot index"
                ));
            }
            repo::SlotWrite::StatusChanged => {
                return Err(DomainError::conflict(
                    "appointment status changed meanwhile, reload and retry",
                ));
            }
        }
    }

    metric::incr_appointment_action_statds(&format!("status_{}", request.status));
    load_details(repo, appointment_id).await
}
