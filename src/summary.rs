use crate::model::ProjectedPeriod;
use crate::rates::{performance_percent, share_percent};

/// Totals over an augmented table.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub periods: usize,
    pub total_type1_breaches: f64,
    /// `None` unless every row carries an adjustment.
    pub total_adjusted_type1_breaches: Option<f64>,
    pub total_type3_breaches: f64,
    pub total_attendances: f64,
    /// Type 1 breaches as a share of all attendances.
    pub type1_breach_percent: Option<f64>,
    pub overall_performance_percent: Option<f64>,
}

pub fn summarize(rows: &[ProjectedPeriod]) -> Summary {
    let total_type1_breaches: f64 = rows.iter().map(|r| r.type1_breaches).sum();
    let total_type3_breaches: f64 = rows.iter().map(|r| r.type3_breaches).sum();
    let total_attendances: f64 = rows.iter().map(|r| r.total_attendances).sum();
    let total_adjusted_type1_breaches = if rows.is_empty() {
        None
    } else {
        rows.iter()
            .map(|r| r.adjusted_type1_breaches)
            .sum::<Option<f64>>()
    };

    Summary {
        periods: rows.len(),
        total_type1_breaches,
        total_adjusted_type1_breaches,
        total_type3_breaches,
        total_attendances,
        type1_breach_percent: share_percent(total_type1_breaches, total_attendances),
        overall_performance_percent: performance_percent(
            total_type1_breaches + total_type3_breaches,
            total_attendances,
        ),
    }
}
