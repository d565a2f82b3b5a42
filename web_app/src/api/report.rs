//! # Report API Module
//!
//! Dashboards for admins and vets. Counts come from storage; revenue and
//! growth figures come from a [`services::MetricsEstimator`] because the app
//! does not process payments.
//!
//! "Today" is the half-open range `[date 00:00, next day 00:00)` in clinic
//! local time, the same clock appointments are stored with.

use crate::{api::availability, consts, models, repo, services};
use chrono::NaiveDate;
use models::appointment::{AppointmentDetails, AppointmentFilter, AppointmentStatus};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    #[serde(flatten)]
    pub counts: models::report::AdminCounts,
    pub estimated: models::report::EstimatedFigures,
    pub recent_appointments: Vec<AppointmentDetails>,
}

#[derive(Debug, Serialize)]
pub struct VetDashboard {
    pub veterinarian_id: i64,
    #[serde(flatten)]
    pub counts: models::report::VetCounts,
    pub estimated: models::report::EstimatedFigures,
    pub todays_schedule: Vec<AppointmentDetails>,
}

pub async fn admin_dashboard(
    repo: &repo::ImplAppRepo,
    estimator: &services::ImplMetricsEstimator,
    today: NaiveDate,
) -> anyhow::Result<AdminDashboard> {
    let (day_start, next_day) = availability::day_range(today);

    Ok(AdminDashboard {
        counts: repo.get_admin_counts(day_start, next_day).await?,
        estimated: estimator.clinic_figures(),
        recent_appointments: repo
            .find_appointments(&AppointmentFilter {
                limit: Some(consts::RECENT_APPOINTMENTS_LIMIT),
                ..Default::default()
            })
            .await?,
    })
}

pub async fn vet_dashboard(
    repo: &repo::ImplAppRepo,
    estimator: &services::ImplMetricsEstimator,
    vet: &models::veterinarian::Veterinarian,
    today: NaiveDate,
) -> anyhow::Result<VetDashboard> {
    let (day_start, next_day) = availability::day_range(today);

    Ok(VetDashboard {
        veterinarian_id: vet.id,
        counts: repo.get_vet_counts(vet.id, day_start, next_day).await?,
        estimated: estimator.vet_figures(vet.id),
        todays_schedule: vet_schedule(repo, vet, Some(today), None).await?,
    })
}

/// Appointments in the vet's scope, for one day when `date` is given.
/// Ordered latest first.
pub async fn vet_schedule(
    repo: &repo::ImplAppRepo,
    vet: &models::veterinarian::Veterinarian,
    date: Option<NaiveDate>,
    status: Option<AppointmentStatus>,
) -> anyhow::Result<Vec<AppointmentDetails>> {
    let (from, until) = date
        .map(availability::day_range)
        .map_or((None, None), |(from, until)| (Some(from), Some(until)));

    repo.find_appointments(&AppointmentFilter {
        veterinarian_scope: Some(vet.id),
        status,
        from,
        until,
        ..Default::default()
    })
    .await
}

pub async fn vet_patients(
    repo: &repo::ImplAppRepo,
    vet: &models::veterinarian::Veterinarian,
) -> anyhow::Result<Vec<models::report::PatientSummary>> {
    repo.get_vet_patients(vet.id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{repo::MockAppRepo, services::MockMetricsEstimator};
    use chrono::Utc;
    use mockall::predicate::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 7).unwrap()
    }

    fn test_vet() -> models::veterinarian::Veterinarian {
        models::veterinarian::Veterinarian {
            id: 3,
            user_id: 30,
            license_number: "LIC".to_string(),
            specializations: vec![],
            years_of_experience: 1,
            consultation_fee: Decimal::ZERO,
            availability: vec![],
            rating: 0.0,
            review_count: 0,
            is_available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn figures() -> models::report::EstimatedFigures {
        models::report::EstimatedFigures {
            monthly_revenue: dec!(1000),
            total_revenue: dec!(12000),
            revenue_growth: 1.5,
            user_growth: 2.0,
            appointment_growth: 3.0,
        }
    }

    #[ntex::test]
    async fn test_admin_dashboard_uses_today_range() {
        let (day_start, next_day) = availability::day_range(today());
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_admin_counts()
            .with(eq(day_start), eq(next_day))
            .times(1)
            .returning(|_, _| {
                Ok(models::report::AdminCounts {
                    total_users: 5,
                    todays_appointments: 2,
                    ..Default::default()
                })
            });
        mock_repo
            .expect_find_appointments()
            .withf(|filter: &AppointmentFilter| {
                filter.limit == Some(consts::RECENT_APPOINTMENTS_LIMIT) && filter.customer_id.is_none()
            })
            .returning(|_| Ok(vec![]));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);
        let mut mock_estimator = MockMetricsEstimator::new();
        mock_estimator
            .expect_clinic_figures()
            .times(1)
            .returning(figures);
        let mock_estimator: services::ImplMetricsEstimator = Box::new(mock_estimator);

        let dashboard = admin_dashboard(&mock_repo, &mock_estimator, today())
            .await
            .unwrap();

        assert_eq!(dashboard.counts.total_users, 5);
        assert_eq!(dashboard.counts.todays_appointments, 2);
        assert_eq!(dashboard.estimated.total_revenue, dec!(12000));
    }

    #[ntex::test]
    async fn test_vet_dashboard_is_scoped_to_vet() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_vet_counts()
            .withf(|vet_id, _, _| *vet_id == 3)
            .returning(|_, _, _| {
                Ok(models::report::VetCounts {
                    total_patients: 4,
                    ..Default::default()
                })
            });
        mock_repo
            .expect_find_appointments()
            .withf(|filter: &AppointmentFilter| {
                filter.veterinarian_scope == Some(3) && filter.from.is_some()
            })
            .times(1)
            .returning(|_| Ok(vec![]));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);
        let mut mock_estimator = MockMetricsEstimator::new();
        mock_estimator
            .expect_vet_figures()
            .with(eq(3))
            .returning(|_| figures());
        let mock_estimator: services::ImplMetricsEstimator = Box::new(mock_estimator);

        let dashboard = vet_dashboard(&mock_repo, &mock_estimator, &test_vet(), today())
            .await
            .unwrap();

        assert_eq!(dashboard.veterinarian_id, 3);
        assert_eq!(dashboard.counts.total_patients, 4);
    }

    #[ntex::test]
    async fn test_vet_schedule_without_date_is_unbounded() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_find_appointments()
            .withf(|filter: &AppointmentFilter| filter.from.is_none() && filter.until.is_none())
            .returning(|_| Ok(vec![]));
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let result = vet_schedule(&mock_repo, &test_vet(), None, None).await;

        assert!(result.is_ok());
    }
}
