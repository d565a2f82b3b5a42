//! # Veterinarian API Module
//!
//! Vet profiles, their weekly templates and the slot listings built on top
//! of [`api::availability`].

use crate::{
    api::{self, DomainError, availability},
    models, repo,
};
use chrono::{NaiveDate, Utc};
use models::veterinarian::{DayAvailability, WEEK_DAYS};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVeterinarianRequest {
    pub user_id: i64,
    pub license_number: String,
    #[serde(default)]
    pub specializations: Vec<String>,
    #[serde(default)]
    pub years_of_experience: i64,
    pub consultation_fee: Decimal,
    pub availability: Option<Vec<DayAvailability>>,
    #[serde(default)]
    pub clinic_ids: Vec<i64>,
}

/// Checks a weekly template: known day names, each at most once, and
/// working days with parseable hours where the start is before the end.
pub fn validate_availability(template: &[DayAvailability]) -> anyhow::Result<()> {
    let mut seen_days = HashSet::new();

    for entry in template {
        let day = entry.day.trim().to_lowercase();
        if !WEEK_DAYS.contains(&day.as_str()) {
            return Err(DomainError::validation(format!("unknown day {:?}", entry.day)));
        }
        if !seen_days.insert(day) {
            return Err(DomainError::validation(format!("day {:?} is repeated", entry.day)));
        }
        if !entry.is_working {
            continue;
        }

        match (
            availability::parse_hhmm(&entry.start_time),
            availability::parse_hhmm(&entry.end_time),
        ) {
            (Some(start), Some(end)) if start < end => {}
            _ => {
                return Err(DomainError::validation(format!(
                    "working hours of {} must be HH:MM with start before end",
                    entry.day
                )));
            }
        }
    }

    Ok(())
}

/// Available vets, optionally narrowed to a specialization. With `date`
/// every profile carries its free slots for that day.
pub async fn list_veterinarians(
    repo: &repo::ImplAppRepo,
    date: Option<NaiveDate>,
    specialization: Option<&str>,
) -> anyhow::Result<Vec<models::veterinarian::VeterinarianProfile>> {
    let mut profiles = repo
        .get_veterinarian_profiles(true)
        .await?
        .into_iter()
        .filter(|profile| {
            specialization
                .filter(|s| !s.trim().is_empty())
                .is_none_or(|s| profile.veterinarian.has_specialization(s))
        })
        .collect::<Vec<_>>();

    if let Some(date) = date {
        for profile in profiles.iter_mut() {
            profile.available_slots =
                Some(availability::available_slots(repo, &profile.veterinarian, date).await?);
        }
    }

    Ok(profiles)
}

pub async fn get_veterinarian(
    repo: &repo::ImplAppRepo,
    vet_id: i64,
    date: Option<NaiveDate>,
) -> anyhow::Result<models::veterinarian::VeterinarianProfile> {
    let mut profile = repo
        .get_veterinarian_profile(vet_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("veterinarian {vet_id}")))?;

    if let Some(date) = date {
        profile.available_slots =
            Some(availability::available_slots(repo, &profile.veterinarian, date).await?);
    }

    Ok(profile)
}

pub async fn get_veterinarian_slots(
    repo: &repo::ImplAppRepo,
    vet_id: i64,
    date: NaiveDate,
) -> anyhow::Result<Vec<String>> {
    let vet = repo
        .get_veterinarian_by_id(vet_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("veterinarian {vet_id}")))?;

    availability::available_slots(repo, &vet, date).await
}

/// Vet profile of an account. [`DomainError::NotFound`] when the user has
/// the Vet role but no profile yet.
pub async fn get_veterinarian_for_user(
    repo: &repo::ImplAppRepo,
    user_id: i64,
) -> anyhow::Result<models::veterinarian::Veterinarian> {
    repo.get_veterinarian_by_user_id(user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("veterinarian profile for this account"))
}

pub async fn get_own_profile(
    repo: &repo::ImplAppRepo,
    user_id: i64,
) -> anyhow::Result<models::veterinarian::VeterinarianProfile> {
    let vet = get_veterinarian_for_user(repo, user_id).await?;
    get_veterinarian(repo, vet.id, None).await
}

/// Admin operation: attaches a vet profile to an existing Vet account.
pub async fn create_veterinarian_profile(
    repo: &repo::ImplAppRepo,
    request: CreateVeterinarianRequest,
) -> anyhow::Result<models::veterinarian::VeterinarianProfile> {
    let license_number = api::sanitize_text(&request.license_number);
    if license_number.is_empty() {
        return Err(DomainError::validation("license number is required"));
    }
    if request.consultation_fee.is_sign_negative() || request.years_of_experience < 0 {
        return Err(DomainError::validation(
            "fee and years of experience can't be negative",
        ));
    }

    let weekly_availability = request
        .availability
        .unwrap_or_else(models::veterinarian::default_weekly_availability);
    validate_availability(&weekly_availability)?;

    let user = repo
        .get_user_by_id(request.user_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("user {}", request.user_id)))?;
    if !user.account_role.is_vet() {
        return Err(DomainError::validation("user must have the Vet role"));
    }

    for clinic_id in &request.clinic_ids {
        if repo.get_clinic_by_id(*clinic_id).await?.is_none() {
            return Err(DomainError::not_found(format!("clinic {clinic_id}")));
        }
    }

    let now = Utc::now();
    let vet = models::veterinarian::Veterinarian {
        id: 0,
        user_id: user.id,
        license_number,
        specializations: request
            .specializations
            .iter()
            .map(|s| api::sanitize_text(s))
            .filter(|s| !s.is_empty())
            .collect(),
        years_of_experience: request.years_of_experience,
        consultation_fee: request.consultation_fee,
        availability: weekly_availability,
        rating: 0.0,
        review_count: 0,
        is_available: true,
        created_at: now,
        updated_at: now,
    };

    let Some(vet_id) = repo.insert_veterinarian(&vet).await? else {
        return Err(DomainError::conflict("user already has a veterinarian profile"));
    };

    for clinic_id in request.clinic_ids {
        repo.assign_veterinarian_to_clinic(clinic_id, vet_id).await?;
    }

    tracing::info!(vet_id, user_id = user.id, "veterinarian profile created");
    get_veterinarian(repo, vet_id, None).await
}

/// Replaces the weekly template of the caller's own profile.
pub async fn update_availability(
    repo: &repo::ImplAppRepo,
    user_id: i64,
    template: Vec<DayAvailability>,
) -> anyhow::Result<models::veterinarian::Veterinarian> {
    validate_availability(&template)?;

    let mut vet = get_veterinarian_for_user(repo, user_id).await?;
    vet.availability = template;
    vet.updated_at = Utc::now();
    repo.update_veterinarian(&vet).await?;

    Ok(vet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::domain_error, models::user_app::AccountRole, repo::MockAppRepo};
    use mockall::predicate::*;
    use rust_decimal_macros::dec;

    fn create_test_vet(id: i64, user_id: i64, specializations: &[&str]) -> models::veterinarian::Veterinarian {
        models::veterinarian::Veterinarian {
            id,
            user_id,
            license_number: "LIC".to_string(),
            specializations: specializations.iter().map(|s| s.to_string()).collect(),
            years_of_experience: 3,
            consultation_fee: dec!(50),
            availability: models::veterinarian::default_weekly_availability(),
            rating: 4.5,
            review_count: 2,
            is_available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn create_test_profile(vet: models::veterinarian::Veterinarian) -> models::veterinarian::VeterinarianProfile {
        models::veterinarian::VeterinarianProfile {
            veterinarian: vet,
            name: "Dr. Vega".to_string(),
            email: "vega@x.com".to_string(),
            phone: None,
            clinic_ids: vec![],
            available_slots: None,
        }
    }

    fn create_request(user_id: i64) -> CreateVeterinarianRequest {
        CreateVeterinarianRequest {
            user_id,
            license_number: "LIC-9".to_string(),
            specializations: vec!["Dermatology".to_string()],
            years_of_experience: 2,
            consultation_fee: dec!(35.5),
            availability: None,
            clinic_ids: vec![],
        }
    }

    #[test]
    fn test_validate_availability() {
        assert!(validate_availability(&models::veterinarian::default_weekly_availability()).is_ok());
        assert!(validate_availability(&[DayAvailability::new("funday", "09:00", "10:00", true)]).is_err());
        assert!(
            validate_availability(&[
                DayAvailability::new("monday", "09:00", "10:00", true),
                DayAvailability::new("Monday", "11:00", "12:00", true),
            ])
            .is_err()
        );
        assert!(validate_availability(&[DayAvailability::new("monday", "10:00", "09:00", true)]).is_err());
        assert!(validate_availability(&[DayAvailability::new("monday", "", "", false)]).is_ok());
    }

    #[ntex::test]
    async fn test_list_veterinarians_by_specialization() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_veterinarian_profiles()
            .with(eq(true))
            .returning(|_| {
                Ok(vec![
                    create_test_profile(create_test_vet(1, 10, &["surgery"])),
                    create_test_profile(create_test_vet(2, 11, &["dental"])),
                ])
            });
        mock_repo.expect_get_booked_slots().never();
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let vets = list_veterinarians(&mock_repo, None, Some("Surgery"))
            .await
            .unwrap();

        assert_eq!(vets.len(), 1);
        assert_eq!(vets[0].veterinarian.id, 1);
        assert!(vets[0].available_slots.is_none());
    }

    #[ntex::test]
    async fn test_list_veterinarians_with_date_adds_slots() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_veterinarian_profiles()
            .returning(|_| Ok(vec![create_test_profile(create_test_vet(1, 10, &[]))]));
        mock_repo
            .expect_get_booked_slots()
            .times(1)
            .returning(|_, _, _| Ok(vec![]));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);
        let monday = NaiveDate::from_ymd_opt(2030, 1, 7);

        let vets = list_veterinarians(&mock_repo, monday, None).await.unwrap();

        assert_eq!(vets[0].available_slots.as_ref().map(Vec::len), Some(16));
    }

    #[ntex::test]
    async fn test_create_profile_requires_vet_role() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_get_user_by_id().returning(|id| {
            Ok(Some(models::user_app::User {
                id,
                ..models::user_app::User::new("Ana", "ana@x.com", AccountRole::Customer)
            }))
        });
        mock_repo.expect_insert_veterinarian().never();
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let err = create_veterinarian_profile(&mock_repo, create_request(5))
            .await
            .unwrap_err();

        assert!(matches!(domain_error(&err), Some(DomainError::Validation(_))));
    }

    #[ntex::test]
    async fn test_create_profile_twice_conflicts() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_get_user_by_id().returning(|id| {
            Ok(Some(models::user_app::User {
                id,
                ..models::user_app::User::new("Vega", "vega@x.com", AccountRole::Vet)
            }))
        });
        mock_repo
            .expect_insert_veterinarian()
            .times(1)
            .returning(|_| Ok(None));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let err = create_veterinarian_profile(&mock_repo, create_request(5))
            .await
            .unwrap_err();

        assert!(matches!(domain_error(&err), Some(DomainError::Conflict(_))));
    }

    #[ntex::test]
    async fn test_update_availability() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_veterinarian_by_user_id()
            .with(eq(10))
            .returning(|user_id| Ok(Some(create_test_vet(1, user_id, &[]))));
        mock_repo
            .expect_update_veterinarian()
            .withf(|vet: &models::veterinarian::Veterinarian| vet.availability.len() == 1)
            .times(1)
            .returning(|_| Ok(()));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let template = vec![DayAvailability::new("tuesday", "10:00", "14:00", true)];
        let vet = update_availability(&mock_repo, 10, template).await.unwrap();

        assert_eq!(vet.availability[0].day, "tuesday");
    }
}
