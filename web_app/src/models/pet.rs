use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Display, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum PetGender {
    #[default]
    #[display("Male")]
    #[serde(alias = "male", alias = "MALE")]
    Male,
    #[display("Female")]
    #[serde(alias = "female", alias = "FEMALE")]
    Female,
}

impl PetGender {
    pub fn from_db(value: &str) -> Self {
        if value.eq_ignore_ascii_case("female") {
            return PetGender::Female;
        }
        PetGender::Male
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: i64,
    pub gender: PetGender,
    pub weight: Option<f64>,
    pub color: Option<String>,
    pub allergies: Vec<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pet {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicalRecord {
    pub id: i64,
    pub pet_id: i64,
    pub record_date: NaiveDate,
    pub description: String,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub veterinarian_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vaccination {
    pub id: i64,
    pub pet_id: i64,
    pub name: String,
    pub date_administered: NaiveDate,
    pub next_due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Pet with its health collections, returned by the pet detail endpoint.
#[derive(Debug, Serialize)]
pub struct PetDetails {
    #[serde(flatten)]
    pub pet: Pet,
    pub medical_records: Vec<MedicalRecord>,
    pub vaccinations: Vec<Vaccination>,
}
