//! # Pet API Module
//!
//! Pets and their health collections. Only the owner or an admin may read or
//! mutate a pet; records are removed together with the pet.

use crate::{
    api::{self, DomainError, user},
    models, repo,
};
use chrono::{NaiveDate, Utc};
use models::pet::PetGender;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PetRequest {
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<PetGender>,
    pub weight: Option<f64>,
    pub color: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl PetRequest {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() || self.species.trim().is_empty() {
            return Err(DomainError::validation("pet name and species are required"));
        }
        if self.age.is_some_and(|age| age < 0) {
            return Err(DomainError::validation("age can't be negative"));
        }
        if self.weight.is_some_and(|weight| weight <= 0.0) {
            return Err(DomainError::validation("weight must be positive"));
        }

        Ok(())
    }

    /// Copies the request over `pet`, leaving ids and timestamps untouched.
    fn apply_to(self, pet: &mut models::pet::Pet) {
        pet.name = api::sanitize_text(&self.name);
        pet.species = api::sanitize_text(&self.species);
        pet.breed = self
            .breed
            .map(|breed| api::sanitize_text(&breed))
            .unwrap_or_default();
        pet.age = self.age.unwrap_or_default();
        pet.gender = self.gender.unwrap_or_default();
        pet.weight = self.weight;
        pet.color = api::sanitize_opt(self.color);
        pet.allergies = self
            .allergies
            .unwrap_or_default()
            .iter()
            .map(|allergy| api::sanitize_text(allergy))
            .filter(|allergy| !allergy.is_empty())
            .collect();
        pet.notes = api::sanitize_opt(self.notes);
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MedicalRecordRequest {
    pub record_date: NaiveDate,
    pub description: String,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub veterinarian_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VaccinationRequest {
    pub name: String,
    pub date_administered: NaiveDate,
    pub next_due_date: Option<NaiveDate>,
}

/// Loads a pet the caller is allowed to see.
async fn get_authorized_pet(
    repo: &repo::ImplAppRepo,
    caller_id: i64,
    pet_id: i64,
) -> anyhow::Result<models::pet::Pet> {
    let pet = repo
        .get_pet_by_id(pet_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("pet {pet_id}")))?;

    user::ensure_owner_or_admin(repo, caller_id, pet.owner_id).await?;
    Ok(pet)
}

pub async fn create_pet(
    repo: &repo::ImplAppRepo,
    owner_id: i64,
    request: PetRequest,
) -> anyhow::Result<models::pet::Pet> {
    request.validate()?;

    let now = Utc::now();
    let mut pet = models::pet::Pet {
        owner_id,
        created_at: now,
        updated_at: now,
        ..Default::default()
    };
    request.apply_to(&mut pet);
    pet.id = repo.insert_pet(&pet).await?;

    Ok(pet)
}

pub async fn list_pets(
    repo: &repo::ImplAppRepo,
    owner_id: i64,
) -> anyhow::Result<Vec<models::pet::Pet>> {
    repo.get_pets_by_owner(owner_id).await
}

/// Pet plus medical records and vaccinations.
pub async fn get_pet_details(
    repo: &repo::ImplAppRepo,
    caller_id: i64,
    pet_id: i64,
) -> anyhow::Result<models::pet::PetDetails> {
    let pet = get_authorized_pet(repo, caller_id, pet_id).await?;

    Ok(models::pet::PetDetails {
        medical_records: repo.get_medical_records(pet.id).await?,
        vaccinations: repo.get_vaccinations(pet.id).await?,
        pet,
    })
}

/// Full replacement of the editable fields.
pub async fn update_pet(
    repo: &repo::ImplAppRepo,
    caller_id: i64,
    pet_id: i64,
    request: PetRequest,
) -> anyhow::Result<models::pet::Pet> {
    request.validate()?;

    let mut pet = get_authorized_pet(repo, caller_id, pet_id).await?;
    request.apply_to(&mut pet);
    pet.updated_at = Utc::now();
    repo.update_pet(&pet).await?;

    Ok(pet)
}

pub async fn delete_pet(
    repo: &repo::ImplAppRepo,
    caller_id: i64,
    pet_id: i64,
) -> anyhow::Result<()> {
    let pet = get_authorized_pet(repo, caller_id, pet_id).await?;
    repo.delete_pet(pet.id).await
}

pub async fn add_medical_record(
    repo: &repo::ImplAppRepo,
    caller_id: i64,
    pet_id: i64,
    request: MedicalRecordRequest,
) -> anyhow::Result<models::pet::MedicalRecord> {
    let description = api::sanitize_text(&request.description);
    if description.is_empty() {
        return Err(DomainError::validation("description is required"));
    }

    let pet = get_authorized_pet(repo, caller_id, pet_id).await?;
    let mut record = models::pet::MedicalRecord {
        id: 0,
        pet_id: pet.id,
        record_date: request.record_date,
        description,
        diagnosis: api::sanitize_opt(request.diagnosis),
        treatment: api::sanitize_opt(request.treatment),
        veterinarian_id: request.veterinarian_id,
        created_at: Utc::now(),
    };
    record.id = repo.insert_medical_record(&record).await?;

    Ok(record)
}

pub async fn get_medical_records(
    repo: &repo::ImplAppRepo,
    caller_id: i64,
    pet_id: i64,
) -> anyhow::Result<Vec<models::pet::MedicalRecord>> {
    let pet = get_authorized_pet(repo, caller_id, pet_id).await?;
    repo.get_medical_records(pet.id).await
}

pub async fn add_vaccination(
    repo: &repo::ImplAppRepo,
    caller_id: i64,
    pet_id: i64,
    request: VaccinationRequest,
) -> anyhow::Result<models::pet::Vaccination> {
    let name = api::sanitize_text(&request.name);
    if name.is_empty() {
        return Err(DomainError::validation("vaccine name is required"));
    }
    if request
        .next_due_date
        .is_some_and(|due| due < request.date_administered)
    {
        return Err(DomainError::validation(
            "next due date can't be before the administered date",
        ));
    }

    let pet = get_authorized_pet(repo, caller_id, pet_id).await?;
    let mut vaccination = models::pet::Vaccination {
        id: 0,
        pet_id: pet.id,
        name,
        date_administered: request.date_administered,
        next_due_date: request.next_due_date,
        created_at: Utc::now(),
    };
    vaccination.id = repo.insert_vaccination(&vaccination).await?;

    Ok(vaccination)
}

pub async fn get_vaccinations(
    repo: &repo::ImplAppRepo,
    caller_id: i64,
    pet_id: i64,
) -> anyhow::Result<Vec<models::pet::Vaccination>> {
    let pet = get_authorized_pet(repo, caller_id, pet_id).await?;
    repo.get_vaccinations(pet.id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::domain_error, models::user_app::AccountRole, repo::MockAppRepo};
    use mockall::predicate::*;

    fn create_test_pet(id: i64, owner_id: i64) -> models::pet::Pet {
        models::pet::Pet {
            id,
            owner_id,
            name: "Firulais".to_string(),
            species: "dog".to_string(),
            ..Default::default()
        }
    }

    fn pet_request() -> PetRequest {
        PetRequest {
            name: " Michi ".to_string(),
            species: "cat".to_string(),
            gender: Some(PetGender::Female),
            allergies: Some(vec!["pollen".to_string(), " ".to_string()]),
            ..Default::default()
        }
    }

    #[test]
    fn test_pet_request_validation() {
        assert!(pet_request().validate().is_ok());
        assert!(
            PetRequest {
                species: "".to_string(),
                ..pet_request()
            }
            .validate()
            .is_err()
        );
        assert!(
            PetRequest {
                age: Some(-1),
                ..pet_request()
            }
            .validate()
            .is_err()
        );
        assert!(
            PetRequest {
                weight: Some(0.0),
                ..pet_request()
            }
            .validate()
            .is_err()
        );
    }

    #[ntex::test]
    async fn test_create_pet() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_insert_pet()
            .withf(|pet: &models::pet::Pet| {
                pet.owner_id == 4 && pet.name == "Michi" && pet.allergies == vec!["pollen"]
            })
            .times(1)
            .returning(|_| Ok(11));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let pet = create_pet(&mock_repo, 4, pet_request()).await.unwrap();

        assert_eq!(pet.id, 11);
        assert_eq!(pet.gender, PetGender::Female);
    }

    #[ntex::test]
    async fn test_get_pet_details_of_other_owner_is_forbidden() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_pet_by_id()
            .with(eq(1))
            .returning(|id| Ok(Some(create_test_pet(id, 2))));
        mock_repo.expect_get_user_by_id().returning(|id| {
            Ok(Some(models::user_app::User {
                id,
                ..models::user_app::User::new("Other", "o@x.com", AccountRole::Customer)
            }))
        });
        mock_repo.expect_get_medical_records().never();
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let err = get_pet_details(&mock_repo, 3, 1).await.unwrap_err();

        assert!(matches!(domain_error(&err), Some(DomainError::Forbidden(_))));
    }

    #[ntex::test]
    async fn test_get_pet_details_owner() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_pet_by_id()
            .returning(|id| Ok(Some(create_test_pet(id, 2))));
        mock_repo
            .expect_get_medical_records()
            .with(eq(1))
            .returning(|_| Ok(vec![]));
        mock_repo
            .expect_get_vaccinations()
            .with(eq(1))
            .returning(|_| Ok(vec![]));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let details = get_pet_details(&mock_repo, 2, 1).await.unwrap();

        assert_eq!(details.pet.name, "Firulais");
    }

    #[ntex::test]
    async fn test_missing_pet_is_not_found() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_get_pet_by_id().returning(|_| Ok(None));
        mock_repo.expect_delete_pet().never();
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let err = delete_pet(&mock_repo, 2, 99).await.unwrap_err();

        assert!(matches!(domain_error(&err), Some(DomainError::NotFound(_))));
    }

    #[ntex::test]
    async fn test_add_vaccination_rejects_due_date_in_past() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_insert_vaccination().never();
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let request = VaccinationRequest {
            name: "rabies".to_string(),
            date_administered: NaiveDate::from_ymd_opt(2030, 5, 1).unwrap(),
            next_due_date: NaiveDate::from_ymd_opt(2030, 4, 1),
        };
        let err = add_vaccination(&mock_repo, 2, 1, request).await.unwrap_err();

        assert!(matches!(domain_error(&err), Some(DomainError::Validation(_))));
    }
}
