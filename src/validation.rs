//! Up-front batch validation.
//!
//! Every check records an [`InputIssue`] instead of returning early, so one
//! failed request reports all of its invalid rows and fields at once.

use crate::error::{InputIssue, ProjectorError};
use crate::model::Period;
use crate::schema::input;

/// Which figures a period must carry for the requested computation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Needs {
    /// A Type 3 compliance rate or an observed Type 3 breach count.
    pub type3_breaches: bool,
    /// An observed Type 1 breach count.
    pub type1_breaches: bool,
}

impl Needs {
    pub const ATTENDANCES: Needs = Needs {
        type3_breaches: false,
        type1_breaches: false,
    };
    pub const TYPE3: Needs = Needs {
        type3_breaches: true,
        type1_breaches: false,
    };
    pub const OBSERVED: Needs = Needs {
        type3_breaches: true,
        type1_breaches: true,
    };
}

#[derive(Debug, Default)]
pub struct Validator {
    issues: Vec<InputIssue>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: InputIssue) {
        self.issues.push(issue);
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// A scalar percentage argument in [0, 100].
    pub fn percent_argument(&mut self, field: &str, value: f64) {
        if let Some(message) = percent_problem(value) {
            self.push(InputIssue::argument(field, message));
        }
    }

    /// A scalar argument that must be finite and non-negative.
    pub fn non_negative_argument(&mut self, field: &str, value: f64) {
        if let Some(message) = count_problem(value) {
            self.push(InputIssue::argument(field, message));
        }
    }

    pub fn period(&mut self, row: usize, period: &Period, needs: Needs) {
        let label = period.label.as_str();
        let counts = [
            (input::TYPE1_ATTENDANCES, Some(period.type1_attendances)),
            (input::TYPE3_ATTENDANCES, Some(period.type3_attendances)),
            (input::TYPE1_BREACHES, period.type1_breaches),
            (input::TYPE3_BREACHES, period.type3_breaches),
        ];
        for (field, value) in counts {
            if let Some(message) = value.and_then(count_problem) {
                self.push(InputIssue::row(row, label, field, message));
            }
        }

        if let Some(message) = period.type3_compliance_percent.and_then(percent_problem) {
            self.push(InputIssue::row(
                row,
                label,
                input::TYPE3_COMPLIANCE_PERCENT,
                message,
            ));
        }

        if needs.type3_breaches
            && period.type3_compliance_percent.is_none()
            && period.type3_breaches.is_none()
        {
            self.push(InputIssue::row(
                row,
                label,
                input::TYPE3_COMPLIANCE_PERCENT,
                "missing; supply a compliance rate or an observed type3_breaches count",
            ));
        }

        if needs.type1_breaches && period.type1_breaches.is_none() {
            self.push(InputIssue::row(
                row,
                label,
                input::TYPE1_BREACHES,
                "missing observed count for a historic period",
            ));
        }
    }

    pub fn periods(&mut self, periods: &[Period], needs: Needs) {
        for (row, period) in periods.iter().enumerate() {
            self.period(row, period, needs);
        }
    }

    pub fn finish(self) -> Result<(), ProjectorError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ProjectorError::InvalidInput(self.issues))
        }
    }
}

fn count_problem(value: f64) -> Option<&'static str> {
    if !value.is_finite() {
        Some("must be a finite number")
    } else if value < 0.0 {
        Some("must be non-negative")
    } else {
        None
    }
}

fn percent_problem(value: f64) -> Option<&'static str> {
    if !value.is_finite() {
        Some("must be a finite number")
    } else if !(0.0..=100.0).contains(&value) {
        Some("must lie in [0, 100]")
    } else {
        None
    }
}
