pub mod estimator;

use crate::models;

/// Source of the financial and growth figures shown on dashboards.
///
/// There is no payment processing behind the app, so these figures are
/// estimates and never read from the appointment table.
#[cfg_attr(test, mockall::automock)]
pub trait MetricsEstimator {
    fn clinic_figures(&self) -> models::report::EstimatedFigures;

    fn vet_figures(&self, vet_id: i64) -> models::report::EstimatedFigures;
}

pub type ImplMetricsEstimator = Box<dyn MetricsEstimator>;
