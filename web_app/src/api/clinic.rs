//! Clinic catalogue and vet assignments.

use crate::{
    api::{self, DomainError},
    models, repo,
};
use chrono::Utc;
use models::clinic::{Address, ClinicContact, OperatingHours, ServicePrice};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateClinicRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub address: Address,
    pub contact: ClinicContact,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub operating_hours: Vec<OperatingHours>,
    #[serde(default)]
    pub pricing: Vec<ServicePrice>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub is_emergency_24h: bool,
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .iter()
        .map(|v| api::sanitize_text(v))
        .filter(|v| !v.is_empty())
        .collect()
}

pub async fn list_clinics(repo: &repo::ImplAppRepo) -> anyhow::Result<Vec<models::clinic::Clinic>> {
    repo.get_clinics(true).await
}

/// Inactive clinics are hidden the same way as missing ones.
pub async fn get_clinic(
    repo: &repo::ImplAppRepo,
    clinic_id: i64,
) -> anyhow::Result<models::clinic::Clinic> {
    repo.get_clinic_by_id(clinic_id)
        .await?
        .filter(|clinic| clinic.is_active)
        .ok_or_else(|| DomainError::not_found(format!("clinic {clinic_id}")))
}

pub async fn create_clinic(
    repo: &repo::ImplAppRepo,
    request: CreateClinicRequest,
) -> anyhow::Result<models::clinic::Clinic> {
    let name = api::sanitize_text(&request.name);
    if name.is_empty() {
        return Err(DomainError::validation("clinic name is required"));
    }
    if request.pricing.iter().any(|p| p.price.is_sign_negative()) {
        return Err(DomainError::validation("prices can't be negative"));
    }

    let now = Utc::now();
    let mut clinic = models::clinic::Clinic {
        id: 0,
        name,
        description: api::sanitize_text(&request.description),
        address: request.address,
        contact: request.contact,
        services: clean_list(request.services),
        operating_hours: request.operating_hours,
        pricing: request.pricing,
        features: clean_list(request.features),
        rating: 0.0,
        is_active: true,
        is_emergency_24h: request.is_emergency_24h,
        veterinarian_ids: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    clinic.id = repo.insert_clinic(&clinic).await?;

    tracing::info!(clinic_id = clinic.id, "clinic created");
    Ok(clinic)
}

/// Idempotent: assigning twice keeps a single link.
pub async fn assign_veterinarian(
    repo: &repo::ImplAppRepo,
    clinic_id: i64,
    vet_id: i64,
) -> anyhow::Result<models::clinic::Clinic> {
    if repo.get_clinic_by_id(clinic_id).await?.is_none() {
        return Err(DomainError::not_found(format!("clinic {clinic_id}")));
    }
    if repo.get_veterinarian_by_id(vet_id).await?.is_none() {
        return Err(DomainError::not_found(format!("veterinarian {vet_id}")));
    }

    repo.assign_veterinarian_to_clinic(clinic_id, vet_id).await?;

    repo.get_clinic_by_id(clinic_id)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("clinic {clinic_id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::domain_error, repo::MockAppRepo};
    use mockall::predicate::*;
    use rust_decimal_macros::dec;

    fn create_request(name: &str) -> CreateClinicRequest {
        CreateClinicRequest {
            name: name.to_string(),
            description: "Small animals".to_string(),
            address: Address::default(),
            contact: ClinicContact::default(),
            services: vec!["surgery".to_string(), "".to_string()],
            operating_hours: vec![],
            pricing: vec![ServicePrice {
                service: "consultation".to_string(),
                price: dec!(30),
            }],
            features: vec![],
            is_emergency_24h: true,
        }
    }

    #[ntex::test]
    async fn test_create_clinic() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_insert_clinic()
            .withf(|clinic: &models::clinic::Clinic| {
                clinic.is_active && clinic.services == vec!["surgery"]
            })
            .times(1)
            .returning(|_| Ok(4));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let clinic = create_clinic(&mock_repo, create_request("Central")).await.unwrap();

        assert_eq!(clinic.id, 4);
        assert!(clinic.is_emergency_24h);
    }

    #[ntex::test]
    async fn test_create_clinic_requires_name() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_insert_clinic().never();
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let err = create_clinic(&mock_repo, create_request("  ")).await.unwrap_err();

        assert!(matches!(domain_error(&err), Some(DomainError::Validation(_))));
    }

    #[ntex::test]
    async fn test_inactive_clinic_is_hidden() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_get_clinic_by_id().with(eq(2)).returning(|id| {
            Ok(Some(models::clinic::Clinic {
                id,
                is_active: false,
                ..Default::default()
            }))
        });
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let err = get_clinic(&mock_repo, 2).await.unwrap_err();

        assert!(matches!(domain_error(&err), Some(DomainError::NotFound(_))));
    }

    #[ntex::test]
    async fn test_assign_unknown_vet() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_get_clinic_by_id().returning(|id| {
            Ok(Some(models::clinic::Clinic {
                id,
                ..Default::default()
            }))
        });
        mock_repo
            .expect_get_veterinarian_by_id()
            .returning(|_| Ok(None));
        mock_repo.expect_assign_veterinarian_to_clinic().never();
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let err = assign_veterinarian(&mock_repo, 1, 9).await.unwrap_err();

        assert!(matches!(domain_error(&err), Some(DomainError::NotFound(_))));
    }
}
