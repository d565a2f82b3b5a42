use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const WEEK_DAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// One entry of the recurring weekly schedule. Times are "HH:MM".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayAvailability {
    pub day: String,
    pub start_time: String,
    pub end_time: String,
    pub is_working: bool,
}

impl DayAvailability {
    pub fn new(day: &str, start_time: &str, end_time: &str, is_working: bool) -> Self {
        Self {
            day: day.to_string(),
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            is_working,
        }
    }
}

/// Monday to friday 09:00-17:00, weekends off.
pub fn default_weekly_availability() -> Vec<DayAvailability> {
    WEEK_DAYS
        .iter()
        .map(|day| {
            let is_working = !matches!(*day, "saturday" | "sunday");
            DayAvailability::new(day, "09:00", "17:00", is_working)
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Veterinarian {
    pub id: i64,
    pub user_id: i64,
    pub license_number: String,
    pub specializations: Vec<String>,
    pub years_of_experience: i64,
    pub consultation_fee: Decimal,
    pub availability: Vec<DayAvailability>,
    pub rating: f64,
    pub review_count: i64,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Veterinarian {
    pub fn has_specialization(&self, specialization: &str) -> bool {
        self.specializations
            .iter()
            .any(|s| s.eq_ignore_ascii_case(specialization.trim()))
    }
}

/// Veterinarian joined with its user account and clinic assignments.
#[derive(Debug, Clone, Serialize)]
pub struct VeterinarianProfile {
    #[serde(flatten)]
    pub veterinarian: Veterinarian,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub clinic_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_slots: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weekly_availability() {
        let week = default_weekly_availability();

        assert_eq!(week.len(), 7);
        assert!(week[0].is_working && week[4].is_working);
        assert!(!week[5].is_working && !week[6].is_working);
    }
}
