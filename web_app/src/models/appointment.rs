use chrono::{DateTime, NaiveDateTime, Utc};
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Display, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    #[display("scheduled")]
    Scheduled,
    #[display("confirmed")]
    Confirmed,
    #[display("in_progress")]
    InProgress,
    #[display("completed")]
    Completed,
    #[display("cancelled")]
    Cancelled,
    #[display("no_show")]
    NoShow,
}

impl AppointmentStatus {
    pub const ACTIVE: [AppointmentStatus; 2] =
        [AppointmentStatus::Scheduled, AppointmentStatus::Confirmed];

    /// Holds a slot: counts against the booking uniqueness rule.
    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }

    pub fn next_statuses(&self) -> &'static [AppointmentStatus] {
        match self {
            AppointmentStatus::Scheduled => &[
                AppointmentStatus::Confirmed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::Confirmed => &[
                AppointmentStatus::InProgress,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
            ],
            AppointmentStatus::InProgress => &[AppointmentStatus::Completed],
            AppointmentStatus::Completed
            | AppointmentStatus::Cancelled
            | AppointmentStatus::NoShow => &[],
        }
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        self.next_statuses().contains(&next)
    }
}

#[derive(Debug, Display, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    #[display("pending")]
    Pending,
    #[display("paid")]
    Paid,
    #[display("failed")]
    Failed,
    #[display("refunded")]
    Refunded,
}

#[derive(Debug, Display, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    #[default]
    #[display("consultation")]
    Consultation,
    #[display("checkup")]
    Checkup,
    #[display("vaccination")]
    Vaccination,
    #[display("surgery")]
    Surgery,
    #[display("emergency")]
    Emergency,
    #[display("dental")]
    Dental,
    #[display("grooming")]
    Grooming,
    #[display("follow_up")]
    FollowUp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: i64,
    pub pet_id: Option<i64>,
    pub clinic_id: Option<i64>,
    pub veterinarian_id: Option<i64>,
    pub customer_id: i64,
    pub appointment_date: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: AppointmentStatus,
    pub appointment_type: AppointmentType,
    pub reason: String,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
    pub amount: Decimal,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn is_booked_by(&self, user_id: i64) -> bool {
        self.customer_id == user_id
    }

    pub fn start_hhmm(&self) -> String {
        self.appointment_date.format("%H:%M").to_string()
    }
}

/// Appointment enriched with the related vet, pet, clinic and customer.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AppointmentDetails {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub veterinarian_name: Option<String>,
    pub veterinarian_specializations: Vec<String>,
    pub pet_name: Option<String>,
    pub pet_species: Option<String>,
    pub clinic_name: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
}

/// Slot taken by an active appointment.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BookedSlot {
    pub appointment_id: i64,
    pub veterinarian_id: Option<i64>,
    pub appointment_date: NaiveDateTime,
    pub time: String,
    pub status: AppointmentStatus,
}

/// Search criteria for appointment listings. `None` means no restriction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentFilter {
    pub customer_id: Option<i64>,
    pub veterinarian_id: Option<i64>,
    /// Appointments assigned to this vet or to any clinic the vet works at.
    pub veterinarian_scope: Option<i64>,
    pub status: Option<AppointmentStatus>,
    pub from: Option<NaiveDateTime>,
    pub until: Option<NaiveDateTime>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lifecycle() {
        assert!(AppointmentStatus::Scheduled.can_transition_to(AppointmentStatus::Confirmed));
        assert!(AppointmentStatus::Confirmed.can_transition_to(AppointmentStatus::InProgress));
        assert!(AppointmentStatus::InProgress.can_transition_to(AppointmentStatus::Completed));
        assert!(AppointmentStatus::Scheduled.can_transition_to(AppointmentStatus::NoShow));
        assert!(!AppointmentStatus::InProgress.can_transition_to(AppointmentStatus::Cancelled));
        assert!(!AppointmentStatus::Cancelled.can_transition_to(AppointmentStatus::Scheduled));
        assert!(!AppointmentStatus::Completed.can_transition_to(AppointmentStatus::Confirmed));
    }

    #[test]
    fn test_terminal_statuses_have_no_exit() {
        for status in [
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
        ] {
            assert!(status.is_terminal());
            assert!(status.next_statuses().is_empty());
            assert!(!status.is_active());
        }
    }

    #[test]
    fn test_stored_names_match_wire_names() {
        assert_eq!(AppointmentStatus::InProgress.to_string(), "in_progress");
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::NoShow).unwrap(),
            format!("\"{}\"", AppointmentStatus::NoShow)
        );
        assert_eq!(
            serde_json::to_string(&AppointmentType::FollowUp).unwrap(),
            format!("\"{}\"", AppointmentType::FollowUp)
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Refunded).unwrap(),
            format!("\"{}\"", PaymentStatus::Refunded)
        );
        assert!(serde_json::from_str::<AppointmentStatus>("\"garbage\"").is_err());
    }
}
