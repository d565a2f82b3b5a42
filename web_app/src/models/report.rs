//! Read models produced by the aggregate dashboard queries.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize, PartialEq, sqlx::FromRow)]
pub struct AdminCounts {
    pub total_users: i64,
    pub total_veterinarians: i64,
    pub total_clinics: i64,
    pub total_pets: i64,
    pub total_appointments: i64,
    pub todays_appointments: i64,
    pub scheduled_appointments: i64,
    pub completed_appointments: i64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, sqlx::FromRow)]
pub struct VetCounts {
    pub todays_appointments: i64,
    pub upcoming_appointments: i64,
    pub completed_appointments: i64,
    pub total_patients: i64,
}

/// Pet seen by a vet, with its owner and visit history summary.
#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
pub struct PatientSummary {
    pub pet_id: i64,
    pub pet_name: String,
    pub species: String,
    pub breed: String,
    pub owner_id: i64,
    pub owner_name: String,
    pub owner_email: String,
    pub visit_count: i64,
    pub last_visit: Option<NaiveDateTime>,
}

/// Revenue and growth figures. Estimated, not derived from stored data.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct EstimatedFigures {
    pub monthly_revenue: Decimal,
    pub total_revenue: Decimal,
    pub revenue_growth: f64,
    pub user_growth: f64,
    pub appointment_growth: f64,
}
