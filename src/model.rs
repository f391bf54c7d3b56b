use chrono::{Datelike, Months, NaiveDate};

use crate::rates::breaches_at;
use crate::schema::phase;

/// One reporting interval as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    /// Display label; only its position in the sequence matters to the maths.
    pub label: String,
    /// Parsed from the label when it looks like a date.
    pub date: Option<NaiveDate>,
    pub type1_attendances: f64,
    pub type3_attendances: f64,
    pub type3_compliance_percent: Option<f64>,
    /// Observed breaches, present on historic rows.
    pub type1_breaches: Option<f64>,
    pub type3_breaches: Option<f64>,
}

impl Period {
    /// A planned period with a known Type 3 compliance rate.
    pub fn planned(
        label: impl Into<String>,
        type1_attendances: f64,
        type3_attendances: f64,
        type3_compliance_percent: f64,
    ) -> Self {
        Self {
            label: label.into(),
            date: None,
            type1_attendances,
            type3_attendances,
            type3_compliance_percent: Some(type3_compliance_percent),
            type1_breaches: None,
            type3_breaches: None,
        }
    }

    /// A period carrying attendances only, to be projected.
    pub fn attendances(
        label: impl Into<String>,
        type1_attendances: f64,
        type3_attendances: f64,
    ) -> Self {
        Self {
            label: label.into(),
            date: None,
            type1_attendances,
            type3_attendances,
            type3_compliance_percent: None,
            type1_breaches: None,
            type3_breaches: None,
        }
    }

    /// A period with observed breach counts.
    pub fn observed(
        label: impl Into<String>,
        type1_attendances: f64,
        type3_attendances: f64,
        type1_breaches: f64,
        type3_breaches: f64,
    ) -> Self {
        Self {
            label: label.into(),
            date: None,
            type1_attendances,
            type3_attendances,
            type3_compliance_percent: None,
            type1_breaches: Some(type1_breaches),
            type3_breaches: Some(type3_breaches),
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn total_attendances(&self) -> f64 {
        self.type1_attendances + self.type3_attendances
    }

    /// Type 3 breaches from the compliance rate, falling back to the observed count.
    pub fn derived_type3_breaches(&self) -> Option<f64> {
        self.type3_compliance_percent
            .map(|pct| breaches_at(self.type3_attendances, pct))
            .or(self.type3_breaches)
    }

    /// Observed Type 3 breaches, falling back to the compliance rate.
    pub fn observed_type3_breaches(&self) -> Option<f64> {
        self.type3_breaches.or_else(|| {
            self.type3_compliance_percent
                .map(|pct| breaches_at(self.type3_attendances, pct))
        })
    }
}

/// Where a row of the augmented table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Overall-target mode.
    Planned,
    /// Before the trajectory cutoff, observed figures.
    Historic,
    /// On or after the trajectory cutoff.
    Projected,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Planned => phase::PLANNED,
            Phase::Historic => phase::HISTORIC,
            Phase::Projected => phase::PROJECTED,
        }
    }
}

/// Cutoff separating historic periods from projected ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    /// Periods dated strictly before this date are historic.
    Date(NaiveDate),
    /// The first `n` periods are historic.
    Index(usize),
}

/// A period augmented with derived breach and performance figures.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedPeriod {
    pub label: String,
    pub date: Option<NaiveDate>,
    pub phase: Phase,
    pub type1_attendances: f64,
    pub type3_attendances: f64,
    pub total_attendances: f64,
    /// Interpolated Type 1 target, projected rows only.
    pub type1_target_percent: Option<f64>,
    /// Overall-target mode only.
    pub target_breaches_allowed: Option<f64>,
    pub type3_breaches: f64,
    /// Required breaches on planned/projected rows, observed on historic rows.
    pub type1_breaches: f64,
    pub type1_performance_percent: Option<f64>,
    pub type3_performance_percent: Option<f64>,
    pub overall_performance_percent: Option<f64>,
    /// Set by a manual adjustment.
    pub adjusted_type1_breaches: Option<f64>,
}

/// Calendar-month periods starting at `start`'s month, zero attendances and
/// full Type 3 compliance: the empty planning table.
pub fn planning_months(start: NaiveDate, count: usize) -> Vec<Period> {
    let first = start.with_day(1).unwrap_or(start);
    (0..count)
        .map_while(|i| {
            u32::try_from(i)
                .ok()
                .and_then(|n| first.checked_add_months(Months::new(n)))
        })
        .map(|month| {
            Period::planned(month.format("%B %Y").to_string(), 0.0, 0.0, 100.0).with_date(month)
        })
        .collect()
}
