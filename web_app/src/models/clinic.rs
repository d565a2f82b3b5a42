use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClinicContact {
    pub phone: String,
    pub email: String,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperatingHours {
    pub day: String,
    pub open: String,
    pub close: String,
    pub is_closed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServicePrice {
    pub service: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Clinic {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub address: Address,
    pub contact: ClinicContact,
    pub services: Vec<String>,
    pub operating_hours: Vec<OperatingHours>,
    pub pricing: Vec<ServicePrice>,
    pub features: Vec<String>,
    pub rating: f64,
    pub is_active: bool,
    pub is_emergency_24h: bool,
    pub veterinarian_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
