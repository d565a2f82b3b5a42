//! Placeholder figures for the dashboards. Values are random on every call
//! and must not be read as real revenue.

use rust_decimal::Decimal;

use crate::models;

/// Growth percentage with one decimal, in `[low, high]`.
fn random_pct(low: i64, high: i64) -> f64 {
    rand::random_range::<i64, _>(low * 10..=high * 10) as f64 / 10.0
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomMetricsEstimator;

impl crate::services::MetricsEstimator for RandomMetricsEstimator {
    fn clinic_figures(&self) -> models::report::EstimatedFigures {
        let monthly_revenue = rand::random_range::<i64, _>(10_000..=60_000);
        models::report::EstimatedFigures {
            monthly_revenue: Decimal::new(monthly_revenue, 0),
            total_revenue: Decimal::new(monthly_revenue * rand::random_range::<i64, _>(6..=24), 0),
            revenue_growth: random_pct(-5, 25),
            user_growth: random_pct(0, 30),
            appointment_growth: random_pct(-10, 40),
        }
    }

    fn vet_figures(&self, vet_id: i64) -> models::report::EstimatedFigures {
        let monthly_revenue = rand::random_range::<i64, _>(2_000..=15_000);
        log::debug!("estimated figures requested for vet {vet_id}");

        models::report::EstimatedFigures {
            monthly_revenue: Decimal::new(monthly_revenue, 0),
            total_revenue: Decimal::new(monthly_revenue * rand::random_range::<i64, _>(3..=12), 0),
            revenue_growth: random_pct(-5, 25),
            user_growth: random_pct(0, 15),
            appointment_growth: random_pct(-10, 30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MetricsEstimator;

    #[test]
    fn test_random_pct_keeps_one_decimal_in_range() {
        for _ in 0..200 {
            let value = random_pct(-5, 25);
            assert!((-5.0..=25.0).contains(&value));
            assert!(((value * 10.0).round() - value * 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_clinic_figures_are_consistent() {
        let figures = RandomMetricsEstimator.clinic_figures();

        assert!(figures.total_revenue >= figures.monthly_revenue);
        assert!((-5.0..=25.0).contains(&figures.revenue_growth));
    }
}
