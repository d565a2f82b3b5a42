use crate::models;
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use sqlx::{FromRow, Row, SqlitePool, sqlite::SqliteRow};
use std::str::FromStr;

use super::{AppRepo, SlotWrite, sqlite_queries};

#[derive(Clone)]
pub struct SqlxSqliteRepo {
    pub db_pool: SqlitePool,
}

/// Decodes a JSON text column into `T`.
fn json_column<T: DeserializeOwned>(row: &SqliteRow, column: &str) -> sqlx::Result<T> {
    let raw: String = row.try_get(column)?;
    serde_json::from_str::<T>(&raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// Snake-case enum stored as bare text, e.g. `no_show`.
fn enum_column<T: DeserializeOwned>(row: &SqliteRow, column: &str) -> sqlx::Result<T> {
    let raw: String = row.try_get(column)?;
    serde_json::from_value::<T>(serde_json::Value::String(raw)).map_err(|e| {
        sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        }
    })
}

fn decimal_column(row: &SqliteRow, column: &str) -> sqlx::Result<Decimal> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// Parses a `group_concat` column of ids ("3,1,2") into a sorted list.
fn id_list_column(row: &SqliteRow, column: &str) -> sqlx::Result<Vec<i64>> {
    let raw: Option<String> = row.try_get(column)?;
    let mut ids = raw
        .unwrap_or_default()
        .split(',')
        .filter_map(|id| id.trim().parse::<i64>().ok())
        .collect::<Vec<i64>>();
    ids.sort_unstable();

    Ok(ids)
}

fn to_json<T: serde::Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

impl FromRow<'_, SqliteRow> for models::user_app::User {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            account_role: models::user_app::AccountRole::classify(
                &row.try_get::<String, &str>("account_role")?,
            ),
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            is_enabled: row.try_get("is_enabled")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for models::user_app::StoredRole {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            raw_role: row
                .try_get::<Option<String>, &str>("raw_role")?
                .unwrap_or_default(),
        })
    }
}

impl FromRow<'_, SqliteRow> for models::pet::Pet {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            name: row.try_get("name")?,
            species: row.try_get("species")?,
            breed: row.try_get("breed")?,
            age: row.try_get("age")?,
            gender: models::pet::PetGender::from_db(&row.try_get::<String, &str>("gender")?),
            weight: row.try_get("weight")?,
            color: row.try_get("color")?,
            allergies: json_column(row, "allergies")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for models::pet::MedicalRecord {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            pet_id: row.try_get("pet_id")?,
            record_date: row.try_get("record_date")?,
            description: row.try_get("description")?,
            diagnosis: row.try_get("diagnosis")?,
            treatment: row.try_get("treatment")?,
            veterinarian_id: row.try_get("veterinarian_id")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for models::pet::Vaccination {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            pet_id: row.try_get("pet_id")?,
            name: row.try_get("name")?,
            date_administered: row.try_get("date_administered")?,
            next_due_date: row.try_get("next_due_date")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for models::veterinarian::Veterinarian {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            license_number: row.try_get("license_number")?,
            specializations: json_column(row, "specializations")?,
            years_of_experience: row.try_get("years_of_experience")?,
            consultation_fee: decimal_column(row, "consultation_fee")?,
            availability: json_column(row, "availability")?,
            rating: row.try_get("rating")?,
            review_count: row.try_get("review_count")?,
            is_available: row.try_get("is_available")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for models::veterinarian::VeterinarianProfile {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            veterinarian: models::veterinarian::Veterinarian::from_row(row)?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            clinic_ids: id_list_column(row, "clinic_ids")?,
            available_slots: None,
        })
    }
}

impl FromRow<'_, SqliteRow> for models::clinic::Clinic {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            address: json_column(row, "address")?,
            contact: json_column(row, "contact")?,
            services: json_column(row, "services")?,
            operating_hours: json_column(row, "operating_hours")?,
            pricing: json_column(row, "pricing")?,
            features: json_column(row, "features")?,
            rating: row.try_get("rating")?,
            is_active: row.try_get("is_active")?,
            is_emergency_24h: row.try_get("is_emergency_24h")?,
            veterinarian_ids: id_list_column(row, "veterinarian_ids")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for models::appointment::Appointment {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            pet_id: row.try_get("pet_id")?,
            clinic_id: row.try_get("clinic_id")?,
            veterinarian_id: row.try_get("veterinarian_id")?,
            customer_id: row.try_get("customer_id")?,
            appointment_date: row.try_get("appointment_date")?,
            end_time: row.try_get("end_time")?,
            status: enum_column(row, "status")?,
            appointment_type: enum_column(row, "appointment_type")?,
            reason: row.try_get("reason")?,
            diagnosis: row.try_get("diagnosis")?,
            treatment: row.try_get("treatment")?,
            notes: row.try_get("notes")?,
            amount: decimal_column(row, "amount")?,
            payment_status: enum_column(row, "payment_status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for models::appointment::AppointmentDetails {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let specializations: Option<String> = row.try_get("veterinarian_specializations")?;

        Ok(Self {
            appointment: models::appointment::Appointment::from_row(row)?,
            veterinarian_name: row.try_get("veterinarian_name")?,
            veterinarian_specializations: specializations
                .and_then(|raw| serde_json::from_str::<Vec<String>>(&raw).ok())
                .unwrap_or_default(),
            pet_name: row.try_get("pet_name")?,
            pet_species: row.try_get("pet_species")?,
            clinic_name: row.try_get("clinic_name")?,
            customer_name: row.try_get("customer_name")?,
            customer_email: row.try_get("customer_email")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for models::appointment::BookedSlot {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let appointment_date: NaiveDateTime = row.try_get("appointment_date")?;

        Ok(Self {
            appointment_id: row.try_get("appointment_id")?,
            veterinarian_id: row.try_get("veterinarian_id")?,
            time: appointment_date.format("%H:%M").to_string(),
            appointment_date,
            status: enum_column(row, "status")?,
        })
    }
}

#[async_trait]
impl AppRepo for SqlxSqliteRepo {
    async fn get_user_by_id(&self, user_id: i64) -> anyhow::Result<Option<models::user_app::User>> {
        Ok(
            sqlx::query_as::<_, models::user_app::User>(sqlite_queries::QUERY_GET_USER_BY_ID)
                .bind(user_id)
                .fetch_optional(&self.db_pool)
                .await?,
        )
    }

    async fn get_user_by_email(
        &self,
        email: &str,
    ) -> anyhow::Result<Option<models::user_app::User>> {
        Ok(
            sqlx::query_as::<_, models::user_app::User>(sqlite_queries::QUERY_GET_USER_BY_EMAIL)
                .bind(email.trim())
                .fetch_optional(&self.db_pool)
                .await?,
        )
    }

    async fn insert_user(&self, user: &models::user_app::User) -> anyhow::Result<Option<i64>> {
        Ok(sqlx::query_scalar::<_, i64>(sqlite_queries::QUERY_INSERT_USER)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.account_role.to_string())
            .bind(&user.phone)
            .bind(&user.address)
            .bind(user.is_enabled)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_optional(&self.db_pool)
            .await?)
    }

    async fn get_all_users(&self) -> anyhow::Result<Vec<models::user_app::User>> {
        Ok(
            sqlx::query_as::<_, models::user_app::User>(sqlite_queries::QUERY_GET_ALL_USERS)
                .fetch_all(&self.db_pool)
                .await?,
        )
    }

    async fn update_user_role(
        &self,
        user_id: i64,
        role: models::user_app::AccountRole,
    ) -> anyhow::Result<bool> {
        Ok(
            sqlx::query("UPDATE user_app SET account_role=$2, updated_at=$3 WHERE id=$1;")
                .bind(user_id)
                .bind(role.to_string())
                .bind(Utc::now())
                .execute(&self.db_pool)
                .await?
                .rows_affected()
                > 0,
        )
    }

    async fn get_stored_roles(&self) -> anyhow::Result<Vec<models::user_app::StoredRole>> {
        Ok(sqlx::query_as::<_, models::user_app::StoredRole>(
            sqlite_queries::QUERY_GET_STORED_ROLES,
        )
        .fetch_all(&self.db_pool)
        .await?)
    }

    async fn insert_pet(&self, pet: &models::pet::Pet) -> anyhow::Result<i64> {
        Ok(sqlx::query(sqlite_queries::QUERY_INSERT_PET)
            .bind(pet.owner_id)
            .bind(&pet.name)
            .bind(&pet.species)
            .bind(&pet.breed)
            .bind(pet.age)
            .bind(pet.gender.to_string())
            .bind(pet.weight)
            .bind(&pet.color)
            .bind(to_json(&pet.allergies)?)
            .bind(&pet.notes)
            .bind(pet.created_at)
            .bind(pet.updated_at)
            .execute(&self.db_pool)
            .await?
            .last_insert_rowid())
    }

    async fn update_pet(&self, pet: &models::pet::Pet) -> anyhow::Result<()> {
        Ok(sqlx::query(sqlite_queries::QUERY_UPDATE_PET)
            .bind(pet.id)
            .bind(&pet.name)
            .bind(&pet.species)
            .bind(&pet.breed)
            .bind(pet.age)
            .bind(pet.gender.to_string())
            .bind(pet.weight)
            .bind(&pet.color)
            .bind(to_json(&pet.allergies)?)
            .bind(&pet.notes)
            .bind(Utc::now())
            .execute(&self.db_pool)
            .await
            .map(|_| ())?)
    }

    async fn delete_pet(&self, pet_id: i64) -> anyhow::Result<()> {
        Ok(sqlx::query("DELETE FROM pet WHERE id=$1;")
            .bind(pet_id)
            .execute(&self.db_pool)
            .await
            .map(|_| ())?)
    }

    async fn get_pet_by_id(&self, pet_id: i64) -> anyhow::Result<Option<models::pet::Pet>> {
        Ok(
            sqlx::query_as::<_, models::pet::Pet>(sqlite_queries::QUERY_GET_PET_BY_ID)
                .bind(pet_id)
                .fetch_optional(&self.db_pool)
                .await?,
        )
    }

    async fn get_pets_by_owner(&self, owner_id: i64) -> anyhow::Result<Vec<models::pet::Pet>> {
        Ok(
            sqlx::query_as::<_, models::pet::Pet>(sqlite_queries::QUERY_GET_PETS_BY_OWNER)
                .bind(owner_id)
                .fetch_all(&self.db_pool)
                .await?,
        )
    }

    async fn insert_medical_record(
        &self,
        record: &models::pet::MedicalRecord,
    ) -> anyhow::Result<i64> {
        Ok(sqlx::query(sqlite_queries::QUERY_INSERT_MEDICAL_RECORD)
            .bind(record.pet_id)
            .bind(record.record_date)
            .bind(&record.description)
            .bind(&record.diagnosis)
            .bind(&record.treatment)
            .bind(record.veterinarian_id)
            .bind(record.created_at)
            .execute(&self.db_pool)
            .await?
            .last_insert_rowid())
    }

    async fn get_medical_records(
        &self,
        pet_id: i64,
    ) -> anyhow::Result<Vec<models::pet::MedicalRecord>> {
        Ok(sqlx::query_as::<_, models::pet::MedicalRecord>(
            sqlite_queries::QUERY_GET_MEDICAL_RECORDS,
        )
        .bind(pet_id)
        .fetch_all(&self.db_pool)
        .await?)
    }

    async fn insert_vaccination(
        &self,
        vaccination: &models::pet::Vaccination,
    ) -> anyhow::Result<i64> {
        Ok(sqlx::query(sqlite_queries::QUERY_INSERT_VACCINATION)
            .bind(vaccination.pet_id)
            .bind(&vaccination.name)
            .bind(vaccination.date_administered)
            .bind(vaccination.next_due_date)
            .bind(vaccination.created_at)
            .execute(&self.db_pool)
            .await?
            .last_insert_rowid())
    }

    async fn get_vaccinations(
        &self,
        pet_id: i64,
    ) -> anyhow::Result<Vec<models::pet::Vaccination>> {
        Ok(
            sqlx::query_as::<_, models::pet::Vaccination>(sqlite_queries::QUERY_GET_VACCINATIONS)
                .bind(pet_id)
                .fetch_all(&self.db_pool)
                .await?,
        )
    }

    async fn insert_veterinarian(
        &self,
        vet: &models::veterinarian::Veterinarian,
    ) -> anyhow::Result<Option<i64>> {
        Ok(
            sqlx::query_scalar::<_, i64>(sqlite_queries::QUERY_INSERT_VETERINARIAN)
                .bind(vet.user_id)
                .bind(&vet.license_number)
                .bind(to_json(&vet.specializations)?)
                .bind(vet.years_of_experience)
                .bind(vet.consultation_fee.to_string())
                .bind(to_json(&vet.availability)?)
                .bind(vet.rating)
                .bind(vet.review_count)
                .bind(vet.is_available)
                .bind(vet.created_at)
                .bind(vet.updated_at)
                .fetch_optional(&self.db_pool)
                .await?,
        )
    }

    async fn update_veterinarian(
        &self,
        vet: &models::veterinarian::Veterinarian,
    ) -> anyhow::Result<()> {
        Ok(sqlx::query(sqlite_queries::QUERY_UPDATE_VETERINARIAN)
            .bind(vet.id)
            .bind(&vet.license_number)
            .bind(to_json(&vet.specializations)?)
            .bind(vet.years_of_experience)
            .bind(vet.consultation_fee.to_string())
            .bind(to_json(&vet.availability)?)
            .bind(vet.is_available)
            .bind(Utc::now())
            .execute(&self.db_pool)
            .await
            .map(|_| ())?)
    }

    async fn get_veterinarian_by_id(
        &self,
        vet_id: i64,
    ) -> anyhow::Result<Option<models::veterinarian::Veterinarian>> {
        Ok(sqlx::query_as::<_, models::veterinarian::Veterinarian>(
            sqlite_queries::QUERY_GET_VETERINARIAN_BY_ID,
        )
        .bind(vet_id)
        .fetch_optional(&self.db_pool)
        .await?)
    }

    async fn get_veterinarian_by_user_id(
        &self,
        user_id: i64,
    ) -> anyhow::Result<Option<models::veterinarian::Veterinarian>> {
        Ok(sqlx::query_as::<_, models::veterinarian::Veterinarian>(
            sqlite_queries::QUERY_GET_VETERINARIAN_BY_USER_ID,
        )
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await?)
    }

    async fn get_veterinarian_profile(
        &self,
        vet_id: i64,
    ) -> anyhow::Result<Option<models::veterinarian::VeterinarianProfile>> {
        Ok(sqlx::query_as::<_, models::veterinarian::VeterinarianProfile>(
            sqlite_queries::QUERY_GET_VETERINARIAN_PROFILE,
        )
        .bind(vet_id)
        .fetch_optional(&self.db_pool)
        .await?)
    }

    async fn get_veterinarian_profiles(
        &self,
        only_available: bool,
    ) -> anyhow::Result<Vec<models::veterinarian::VeterinarianProfile>> {
        Ok(sqlx::query_as::<_, models::veterinarian::VeterinarianProfile>(
            sqlite_queries::QUERY_GET_VETERINARIAN_PROFILES,
        )
        .bind(only_available)
        .fetch_all(&self.db_pool)
        .await?)
    }

    async fn get_veterinarian_clinic_ids(&self, vet_id: i64) -> anyhow::Result<Vec<i64>> {
        Ok(
            sqlx::query_scalar::<_, i64>(sqlite_queries::QUERY_GET_VETERINARIAN_CLINIC_IDS)
                .bind(vet_id)
                .fetch_all(&self.db_pool)
                .await?,
        )
    }

    async fn insert_clinic(&self, clinic: &models::clinic::Clinic) -> anyhow::Result<i64> {
        Ok(sqlx::query(sqlite_queries::QUERY_INSERT_CLINIC)
            .bind(&clinic.name)
            .bind(&clinic.description)
            .bind(to_json(&clinic.address)?)
            .bind(to_json(&clinic.contact)?)
            .bind(to_json(&clinic.services)?)
            .bind(to_json(&clinic.operating_hours)?)
            .bind(to_json(&clinic.pricing)?)
            .bind(to_json(&clinic.features)?)
            .bind(clinic.rating)
            .bind(clinic.is_active)
            .bind(clinic.is_emergency_24h)
            .bind(clinic.created_at)
            .bind(clinic.updated_at)
            .execute(&self.db_pool)
            .await?
            .last_insert_rowid())
    }

    async fn get_clinic_by_id(
        &self,
        clinic_id: i64,
    ) -> anyhow::Result<Option<models::clinic::Clinic>> {
        Ok(
            sqlx::query_as::<_, models::clinic::Clinic>(sqlite_queries::QUERY_GET_CLINIC_BY_ID)
                .bind(clinic_id)
                .fetch_optional(&self.db_pool)
                .await?,
        )
    }

    async fn get_clinics(&self, only_active: bool) -> anyhow::Result<Vec<models::clinic::Clinic>> {
        Ok(
            sqlx::query_as::<_, models::clinic::Clinic>(sqlite_queries::QUERY_GET_CLINICS)
                .bind(only_active)
                .fetch_all(&self.db_pool)
                .await?,
        )
    }

    async fn assign_veterinarian_to_clinic(
        &self,
        clinic_id: i64,
        vet_id: i64,
    ) -> anyhow::Result<()> {
        Ok(
            sqlx::query(sqlite_queries::QUERY_ASSIGN_VETERINARIAN_TO_CLINIC)
                .bind(clinic_id)
                .bind(vet_id)
                .bind(Utc::now())
                .execute(&self.db_pool)
                .await
                .map(|_| ())?,
        )
    }

    async fn insert_appointment(
        &self,
        appointment: &models::appointment::Appointment,
    ) -> anyhow::Result<SlotWrite> {
        let inserted_id = sqlx::query_scalar::<_, i64>(sqlite_queries::QUERY_INSERT_APPOINTMENT)
            .bind(appointment.pet_id)
            .bind(appointment.clinic_id)
            .bind(appointment.veterinarian_id)
            .bind(appointment.customer_id)
            .bind(appointment.appointment_date)
            .bind(appointment.end_time)
            .bind(appointment.status.to_string())
            .bind(appointment.appointment_type.to_string())
            .bind(&appointment.reason)
            .bind(&appointment.diagnosis)
            .bind(&appointment.treatment)
            .bind(&appointment.notes)
            .bind(appointment.amount.to_string())
            .bind(appointment.payment_status.to_string())
            .bind(appointment.created_at)
            .bind(appointment.updated_at)
            .fetch_optional(&self.db_pool)
            .await?;

        Ok(inserted_id.map_or(SlotWrite::SlotTaken, SlotWrite::Written))
    }

    async fn update_appointment(
        &self,
        appointment: &models::appointment::Appointment,
        expected_status: models::appointment::AppointmentStatus,
    ) -> anyhow::Result<SlotWrite> {
        let result = sqlx::query(sqlite_queries::QUERY_UPDATE_APPOINTMENT)
            .bind(appointment.id)
            .bind(appointment.pet_id)
            .bind(appointment.clinic_id)
            .bind(appointment.veterinarian_id)
            .bind(appointment.appointment_date)
            .bind(appointment.end_time)
            .bind(appointment.status.to_string())
            .bind(appointment.appointment_type.to_string())
            .bind(&appointment.reason)
            .bind(&appointment.diagnosis)
            .bind(&appointment.treatment)
            .bind(&appointment.notes)
            .bind(appointment.amount.to_string())
            .bind(appointment.payment_status.to_string())
            .bind(appointment.updated_at)
            .bind(expected_status.to_string())
            .execute(&self.db_pool)
            .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Ok(SlotWrite::StatusChanged),
            Ok(_) => Ok(SlotWrite::Written(appointment.id)),
            Err(err) if is_unique_violation(&err) => Ok(SlotWrite::SlotTaken),
            Err(err) => Err(err.into()),
        }
    }

    async fn transition_appointment_status(
        &self,
        appointment_id: i64,
        from: models::appointment::AppointmentStatus,
        to: models::appointment::AppointmentStatus,
    ) -> anyhow::Result<bool> {
        Ok(
            sqlx::query(sqlite_queries::QUERY_TRANSITION_APPOINTMENT_STATUS)
                .bind(appointment_id)
                .bind(from.to_string())
                .bind(to.to_string())
                .bind(Utc::now())
                .execute(&self.db_pool)
                .await?
                .rows_affected()
                > 0,
        )
    }

    async fn get_appointment_by_id(
        &self,
        appointment_id: i64,
    ) -> anyhow::Result<Option<models::appointment::Appointment>> {
        Ok(sqlx::query_as::<_, models::appointment::Appointment>(
            sqlite_queries::QUERY_GET_APPOINTMENT_BY_ID,
        )
        .bind(appointment_id)
        .fetch_optional(&self.db_pool)
        .await?)
    }

    async fn get_appointment_details(
        &self,
        appointment_id: i64,
    ) -> anyhow::Result<Option<models::appointment::AppointmentDetails>> {
        Ok(sqlx::query_as::<_, models::appointment::AppointmentDetails>(
            sqlite_queries::QUERY_GET_APPOINTMENT_DETAILS,
        )
        .bind(appointment_id)
        .fetch_optional(&self.db_pool)
        .await?)
    }

    async fn find_appointments(
        &self,
        filter: &models::appointment::AppointmentFilter,
    ) -> anyhow::Result<Vec<models::appointment::AppointmentDetails>> {
        Ok(sqlx::query_as::<_, models::appointment::AppointmentDetails>(
            sqlite_queries::QUERY_FIND_APPOINTMENTS,
        )
        .bind(filter.customer_id)
        .bind(filter.veterinarian_id)
        .bind(filter.veterinarian_scope)
        .bind(filter.status.map(|s| s.to_string()))
        .bind(filter.from)
        .bind(filter.until)
        // a negative limit means no limit for sqlite
        .bind(filter.limit.unwrap_or(-1))
        .fetch_all(&self.db_pool)
        .await?)
    }

    async fn get_booked_slots(
        &self,
        from: NaiveDateTime,
        until: NaiveDateTime,
        vet_id: Option<i64>,
    ) -> anyhow::Result<Vec<models::appointment::BookedSlot>> {
        Ok(sqlx::query_as::<_, models::appointment::BookedSlot>(
            sqlite_queries::QUERY_GET_BOOKED_SLOTS,
        )
        .bind(from)
        .bind(until)
        .bind(vet_id)
        .fetch_all(&self.db_pool)
        .await?)
    }

    async fn get_admin_counts(
        &self,
        day_start: NaiveDateTime,
        next_day: NaiveDateTime,
    ) -> anyhow::Result<models::report::AdminCounts> {
        Ok(
            sqlx::query_as::<_, models::report::AdminCounts>(
                sqlite_queries::QUERY_GET_ADMIN_COUNTS,
            )
            .bind(day_start)
            .bind(next_day)
            .fetch_one(&self.db_pool)
            .await?,
        )
    }

    async fn get_vet_counts(
        &self,
        vet_id: i64,
        day_start: NaiveDateTime,
        next_day: NaiveDateTime,
    ) -> anyhow::Result<models::report::VetCounts> {
        Ok(
            sqlx::query_as::<_, models::report::VetCounts>(sqlite_queries::QUERY_GET_VET_COUNTS)
                .bind(vet_id)
                .bind(day_start)
                .bind(next_day)
                .fetch_one(&self.db_pool)
                .await?,
        )
    }

    async fn get_vet_patients(
        &self,
        vet_id: i64,
    ) -> anyhow::Result<Vec<models::report::PatientSummary>> {
        Ok(sqlx::query_as::<_, models::report::PatientSummary>(
            sqlite_queries::QUERY_GET_VET_PATIENTS,
        )
        .bind(vet_id)
        .fetch_all(&self.db_pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        appointment::{Appointment, AppointmentFilter, AppointmentStatus},
        user_app::{AccountRole, User},
    };
    use chrono::NaiveDate;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_repo() -> SqlxSqliteRepo {
        let db_pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::raw_sql(include_str!("../../../migrations/init.sql"))
            .execute(&db_pool)
            .await
            .unwrap();

        SqlxSqliteRepo { db_pool }
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn new_appointment(customer_id: i64, vet_id: Option<i64>, start: NaiveDateTime) -> Appointment {
        Appointment {
            id: 0,
            pet_id: None,
            clinic_id: None,
            veterinarian_id: vet_id,
            customer_id,
            appointment_date: start,
            end_time: start + chrono::Duration::minutes(30),
            status: AppointmentStatus::Scheduled,
            appointment_type: Default::default(),
            reason: "checkup".to_string(),
            diagnosis: None,
            treatment: None,
            notes: None,
            amount: Decimal::ZERO,
            payment_status: Default::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn seed_vet(repo: &SqlxSqliteRepo) -> (i64, i64) {
        let user_id = repo
            .insert_user(&User::new("Dr. Vega", "vega@clinic.test", AccountRole::Vet))
            .await
            .unwrap()
            .unwrap();
        let vet = models::veterinarian::Veterinarian {
            id: 0,
            user_id,
            license_number: "LIC-1".to_string(),
            specializations: vec!["surgery".to_string()],
            years_of_experience: 4,
            consultation_fee: Decimal::new(4550, 2),
            availability: models::veterinarian::default_weekly_availability(),
            rating: 0.0,
            review_count: 0,
            is_available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let vet_id = repo.insert_veterinarian(&vet).await.unwrap().unwrap();

        (user_id, vet_id)
    }

    #[ntex::test]
    async fn test_insert_user_duplicate_email_is_ignored() {
        let repo = setup_repo().await;

        let first = repo
            .insert_user(&User::new("Ana", "ana@mail.test", AccountRole::Customer))
            .await
            .unwrap();
        let second = repo
            .insert_user(&User::new("Ana 2", "ANA@mail.test", AccountRole::Customer))
            .await
            .unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
    }

    #[ntex::test]
    async fn test_legacy_role_is_classified_on_read() {
        let repo = setup_repo().await;
        let user_id = repo
            .insert_user(&User::new("Old", "old@mail.test", AccountRole::Customer))
            .await
            .unwrap()
            .unwrap();
        sqlx::query("UPDATE user_app SET account_role='veterinarian' WHERE id=$1")
            .bind(user_id)
            .execute(&repo.db_pool)
            .await
            .unwrap();

        let user = repo.get_user_by_id(user_id).await.unwrap().unwrap();
        let stored = repo.get_stored_roles().await.unwrap();

        assert_eq!(user.account_role, AccountRole::Vet);
        assert_eq!(stored[0].raw_role, "veterinarian");
    }

    #[ntex::test]
    async fn test_double_booking_same_vet_slot_is_rejected() {
        let repo = setup_repo().await;
        let (_, vet_id) = seed_vet(&repo).await;
        let customer_id = repo
            .insert_user(&User::new("Ana", "ana@mail.test", AccountRole::Customer))
            .await
            .unwrap()
            .unwrap();

        let first = repo
            .insert_appointment(&new_appointment(customer_id, Some(vet_id), at(7, 10, 0)))
            .await
            .unwrap();
        let second = repo
            .insert_appointment(&new_appointment(customer_id, Some(vet_id), at(7, 10, 0)))
            .await
            .unwrap();

        assert!(matches!(first, SlotWrite::Written(_)));
        assert_eq!(second, SlotWrite::SlotTaken);
    }

    #[ntex::test]
    async fn test_cancelled_slot_can_be_rebooked() {
        let repo = setup_repo().await;
        let (_, vet_id) = seed_vet(&repo).await;
        let customer_id = repo
            .insert_user(&User::new("Ana", "ana@mail.test", AccountRole::Customer))
            .await
            .unwrap()
            .unwrap();

        let SlotWrite::Written(first_id) = repo
            .insert_appointment(&new_appointment(customer_id, Some(vet_id), at(7, 10, 0)))
            .await
            .unwrap()
        else {
            panic!("first booking should be written");
        };
        let cancelled = repo
            .transition_appointment_status(
                first_id,
                AppointmentStatus::Scheduled,
                AppointmentStatus::Cancelled,
            )
            .await
            .unwrap();
        let again = repo
            .insert_appointment(&new_appointment(customer_id, Some(vet_id), at(7, 10, 0)))
            .await
            .unwrap();

        assert!(cancelled);
        assert!(matches!(again, SlotWrite::Written(id) if id != first_id));
    }

    #[ntex::test]
    async fn test_status_transition_is_compare_and_set() {
        let repo = setup_repo().await;
        let customer_id = repo
            .insert_user(&User::new("Ana", "ana@mail.test", AccountRole::Customer))
            .await
            .unwrap()
            .unwrap();
        let SlotWrite::Written(id) = repo
            .insert_appointment(&new_appointment(customer_id, None, at(7, 10, 0)))
            .await
            .unwrap()
        else {
            panic!("booking should be written");
        };

        let first = repo
            .transition_appointment_status(
                id,
                AppointmentStatus::Scheduled,
                AppointmentStatus::Confirmed,
            )
            .await
            .unwrap();
        let stale = repo
            .transition_appointment_status(
                id,
                AppointmentStatus::Scheduled,
                AppointmentStatus::Cancelled,
            )
            .await
            .unwrap();

        assert!(first);
        assert!(!stale);
    }

    #[ntex::test]
    async fn test_moving_onto_taken_slot_reports_slot_taken() {
        let repo = setup_repo().await;
        let (_, vet_id) = seed_vet(&repo).await;
        let customer_id = repo
            .insert_user(&User::new("Ana", "ana@mail.test", AccountRole::Customer))
            .await
            .unwrap()
            .unwrap();
        repo.insert_appointment(&new_appointment(customer_id, Some(vet_id), at(7, 10, 0)))
            .await
            .unwrap();
        let SlotWrite::Written(id) = repo
            .insert_appointment(&new_appointment(customer_id, Some(vet_id), at(7, 11, 0)))
            .await
            .unwrap()
        else {
            panic!("booking should be written");
        };

        let mut moved = repo.get_appointment_by_id(id).await.unwrap().unwrap();
        moved.appointment_date = at(7, 10, 0);
        let result = repo
            .update_appointment(&moved, AppointmentStatus::Scheduled)
            .await
            .unwrap();

        assert_eq!(result, SlotWrite::SlotTaken);
    }

    #[ntex::test]
    async fn test_stale_update_cannot_revert_cancelled_appointment() {
        let repo = setup_repo().await;
        let customer_id = repo
            .insert_user(&User::new("Ana", "ana@mail.test", AccountRole::Customer))
            .await
            .unwrap()
            .unwrap();
        let SlotWrite::Written(id) = repo
            .insert_appointment(&new_appointment(customer_id, None, at(7, 10, 0)))
            .await
            .unwrap()
        else {
            panic!("booking should be written");
        };
        let mut stale = repo.get_appointment_by_id(id).await.unwrap().unwrap();

        let cancelled = repo
            .transition_appointment_status(
                id,
                AppointmentStatus::Scheduled,
                AppointmentStatus::Cancelled,
            )
            .await
            .unwrap();
        stale.reason = "rescheduled from a stale read".into();
        let write = repo
            .update_appointment(&stale, AppointmentStatus::Scheduled)
            .await
            .unwrap();
        let stored = repo.get_appointment_by_id(id).await.unwrap().unwrap();

        assert!(cancelled);
        assert_eq!(write, SlotWrite::StatusChanged);
        assert_eq!(stored.status, AppointmentStatus::Cancelled);
        assert_ne!(stored.reason, stale.reason);
    }

    #[ntex::test]
    async fn test_unknown_stored_status_is_a_decode_error() {
        let repo = setup_repo().await;
        let customer_id = repo
            .insert_user(&User::new("Ana", "ana@mail.test", AccountRole::Customer))
            .await
            .unwrap()
            .unwrap();
        let SlotWrite::Written(id) = repo
            .insert_appointment(&new_appointment(customer_id, None, at(7, 10, 0)))
            .await
            .unwrap()
        else {
            panic!("booking should be written");
        };
        sqlx::query("UPDATE appointment SET status='archived' WHERE id=$1")
            .bind(id)
            .execute(&repo.db_pool)
            .await
            .unwrap();

        let err = repo.get_appointment_by_id(id).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<sqlx::Error>(),
            Some(sqlx::Error::ColumnDecode { index, .. }) if index == "status"
        ));
    }

    #[ntex::test]
    async fn test_booked_slots_and_details() {
        let repo = setup_repo().await;
        let (_, vet_id) = seed_vet(&repo).await;
        let customer_id = repo
            .insert_user(&User::new("Ana", "ana@mail.test", AccountRole::Customer))
            .await
            .unwrap()
            .unwrap();
        repo.insert_appointment(&new_appointment(customer_id, Some(vet_id), at(7, 10, 0)))
            .await
            .unwrap();
        repo.insert_appointment(&new_appointment(customer_id, Some(vet_id), at(8, 9, 30)))
            .await
            .unwrap();

        let slots = repo
            .get_booked_slots(at(7, 0, 0), at(8, 0, 0), Some(vet_id))
            .await
            .unwrap();
        let found = repo
            .find_appointments(&AppointmentFilter {
                customer_id: Some(customer_id),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].time, "10:00");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].appointment.appointment_date, at(8, 9, 30));
        assert_eq!(found[0].veterinarian_name.as_deref(), Some("Dr. Vega"));
        assert_eq!(found[0].veterinarian_specializations, vec!["surgery"]);
        assert_eq!(found[0].customer_email, "ana@mail.test");
    }

    #[ntex::test]
    async fn test_admin_counts_today_range() {
        let repo = setup_repo().await;
        let (_, vet_id) = seed_vet(&repo).await;
        let customer_id = repo
            .insert_user(&User::new("Ana", "ana@mail.test", AccountRole::Customer))
            .await
            .unwrap()
            .unwrap();
        repo.insert_appointment(&new_appointment(customer_id, Some(vet_id), at(7, 10, 0)))
            .await
            .unwrap();
        repo.insert_appointment(&new_appointment(customer_id, Some(vet_id), at(8, 0, 0)))
            .await
            .unwrap();

        let counts = repo.get_admin_counts(at(7, 0, 0), at(8, 0, 0)).await.unwrap();

        assert_eq!(counts.total_users, 2);
        assert_eq!(counts.total_veterinarians, 1);
        assert_eq!(counts.total_appointments, 2);
        assert_eq!(counts.todays_appointments, 1);
        assert_eq!(counts.scheduled_appointments, 2);
    }

    #[ntex::test]
    async fn test_clinic_assignment_shows_on_profile() {
        let repo = setup_repo().await;
        let (_, vet_id) = seed_vet(&repo).await;
        let clinic_id = repo
            .insert_clinic(&models::clinic::Clinic {
                name: "Central".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
                ..Default::default()
            })
            .await
            .unwrap();

        repo.assign_veterinarian_to_clinic(clinic_id, vet_id)
            .await
            .unwrap();
        repo.assign_veterinarian_to_clinic(clinic_id, vet_id)
            .await
            .unwrap();
        let profile = repo.get_veterinarian_profile(vet_id).await.unwrap().unwrap();
        let clinic = repo.get_clinic_by_id(clinic_id).await.unwrap().unwrap();

        assert_eq!(profile.clinic_ids, vec![clinic_id]);
        assert_eq!(clinic.veterinarian_ids, vec![vet_id]);
        assert_eq!(profile.veterinarian.consultation_fee, Decimal::new(4550, 2));
    }
}
