//! Breach requirement and trajectory calculations.
//!
//! All operations are pure: they validate the whole batch first and then
//! build a fresh augmented row for every input period.

use crate::config::ProjectorConfig;
use crate::error::{InputIssue, ProjectorError};
use crate::model::{Period, Phase, ProjectedPeriod, Split};
use crate::rates::{breaches_at, interpolate_target, non_negative, performance_percent};
use crate::validation::{Needs, Validator};

/// Targets for a linear Type 1 trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryTargets {
    /// Held constant across every projected period.
    pub type3_target_percent: f64,
    /// Type 1 target of the first projected period.
    pub start_type1_target_percent: f64,
    /// Type 1 target of the last projected period.
    pub end_type1_target_percent: f64,
}

#[derive(Debug, Clone, Default)]
pub struct BreachProjector {
    config: ProjectorConfig,
}

impl BreachProjector {
    pub fn new(config: ProjectorConfig) -> Result<Self, ProjectorError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    /// Type 1 breaches that still meet `overall_target_percent` given each
    /// period's Type 3 breaches.
    ///
    /// Rounded with `rounding.required_breaches` after clamping at zero.
    pub fn compute_required_breaches(
        &self,
        periods: &[Period],
        overall_target_percent: f64,
    ) -> Result<Vec<ProjectedPeriod>, ProjectorError> {
        let mut validator = Validator::new();
        validator.percent_argument("overall_target_percent", overall_target_percent);
        validator.periods(periods, Needs::TYPE3);
        validator.finish()?;

        log::debug!(
            "Computing required breaches for {} periods at {overall_target_percent}% overall",
            periods.len()
        );

        let rounding = self.config.rounding.required_breaches;
        let rows = periods
            .iter()
            .map(|period| {
                let type3_breaches = non_negative(period.derived_type3_breaches().unwrap_or(0.0));
                let total = period.total_attendances();
                let allowed = breaches_at(total, overall_target_percent);
                let required = rounding.apply(non_negative(allowed - type3_breaches));

                let mut row = augment(period, Phase::Planned, required, type3_breaches);
                row.target_breaches_allowed = Some(allowed);
                row
            })
            .collect();

        Ok(rows)
    }

    /// Historic periods keep their observed breaches; projected periods get
    /// Type 1 breaches from a target interpolated between the start and end
    /// targets, and Type 3 breaches from the constant Type 3 target.
    ///
    /// With no `split` every period is projected.
    pub fn compute_trajectory(
        &self,
        periods: &[Period],
        targets: TrajectoryTargets,
        split: Option<Split>,
    ) -> Result<Vec<ProjectedPeriod>, ProjectorError> {
        let mut validator = Validator::new();
        validator.percent_argument("type3_target_percent", targets.type3_target_percent);
        validator.percent_argument(
            "start_type1_target_percent",
            targets.start_type1_target_percent,
        );
        validator.percent_argument("end_type1_target_percent", targets.end_type1_target_percent);

        let historic_len = historic_prefix_len(periods, split, &mut validator);
        let (historic, future) = periods.split_at(historic_len.min(periods.len()));

        for (row, period) in historic.iter().enumerate() {
            validator.period(row, period, Needs::OBSERVED);
        }
        for (offset, period) in future.iter().enumerate() {
            validator.period(historic.len() + offset, period, Needs::ATTENDANCES);
        }

        if future.is_empty()
            && targets.start_type1_target_percent != targets.end_type1_target_percent
        {
            validator.push(InputIssue::argument(
                "end_type1_target_percent",
                "differs from the start target but no period falls on or after the cutoff",
            ));
        }
        validator.finish()?;

        log::debug!(
            "Computing trajectory: {} historic, {} projected periods ({}% -> {}%)",
            historic.len(),
            future.len(),
            targets.start_type1_target_percent,
            targets.end_type1_target_percent
        );

        let rounding = self.config.rounding.trajectory;
        let mut rows = Vec::with_capacity(periods.len());

        for period in historic {
            let type1_breaches = period.type1_breaches.unwrap_or(0.0);
            let type3_breaches = period.observed_type3_breaches().unwrap_or(0.0);
            rows.push(augment(period, Phase::Historic, type1_breaches, type3_breaches));
        }

        for (i, period) in future.iter().enumerate() {
            let target = interpolate_target(
                targets.start_type1_target_percent,
                targets.end_type1_target_percent,
                i,
                future.len(),
            );
            let type3_breaches =
                breaches_at(period.type3_attendances, targets.type3_target_percent);
            let type1_breaches =
                non_negative(rounding.apply(breaches_at(period.type1_attendances, target)));

            let mut row = augment(period, Phase::Projected, type1_breaches, type3_breaches);
            row.type1_target_percent = Some(target);
            rows.push(row);
        }

        Ok(rows)
    }

    /// Subtract an assumed improvement from every row's Type 1 breaches,
    /// clamping at zero.
    pub fn apply_manual_adjustment(
        &self,
        rows: &[ProjectedPeriod],
        weekly_reduction: f64,
    ) -> Result<Vec<ProjectedPeriod>, ProjectorError> {
        let mut validator = Validator::new();
        validator.non_negative_argument("weekly_reduction", weekly_reduction);
        validator.finish()?;

        Ok(rows
            .iter()
            .map(|row| ProjectedPeriod {
                adjusted_type1_breaches: Some(non_negative(row.type1_breaches - weekly_reduction)),
                ..row.clone()
            })
            .collect())
    }
}

/// Number of leading periods that are historic under `split`, recording an
/// issue for every period that breaks the historic-then-future ordering.
fn historic_prefix_len(
    periods: &[Period],
    split: Option<Split>,
    validator: &mut Validator,
) -> usize {
    match split {
        None => 0,
        Some(Split::Index(n)) => {
            if n > periods.len() {
                validator.push(InputIssue::argument(
                    "split",
                    format!("index {n} exceeds the {} periods supplied", periods.len()),
                ));
            }
            n.min(periods.len())
        }
        Some(Split::Date(cutoff)) => {
            let mut prefix = 0;
            let mut seen_future = false;
            // An undated period ends the historic prefix.
            let mut prefix_closed = false;
            for (row, period) in periods.iter().enumerate() {
                match period.date {
                    None => {
                        validator.push(InputIssue::row(
                            row,
                            &period.label,
                            "date",
                            "missing; a date cutoff needs every period dated",
                        ));
                        prefix_closed = true;
                    }
                    Some(date) if date < cutoff => {
                        if seen_future {
                            validator.push(InputIssue::row(
                                row,
                                &period.label,
                                "date",
                                "dated before the cutoff but follows a projected period",
                            ));
                        } else if !prefix_closed {
                            prefix += 1;
                        }
                    }
                    Some(_) => seen_future = true,
                }
            }
            prefix
        }
    }
}

fn augment(
    period: &Period,
    phase: Phase,
    type1_breaches: f64,
    type3_breaches: f64,
) -> ProjectedPeriod {
    let total = period.total_attendances();
    if total <= 0.0 {
        log::warn!(
            "Period '{}' has no attendances; performance is undefined",
            period.label
        );
    }

    ProjectedPeriod {
        label: period.label.clone(),
        date: period.date,
        phase,
        type1_attendances: period.type1_attendances,
        type3_attendances: period.type3_attendances,
        total_attendances: total,
        type1_target_percent: None,
        target_breaches_allowed: None,
        type3_breaches,
        type1_breaches,
        type1_performance_percent: performance_percent(type1_breaches, period.type1_attendances),
        type3_performance_percent: performance_percent(type3_breaches, period.type3_attendances),
        overall_performance_percent: performance_percent(type1_breaches + type3_breaches, total),
        adjusted_type1_breaches: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoundingSettings;
    use crate::rates::Rounding;
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn projector_with(required: Rounding, trajectory: Rounding) -> BreachProjector {
        BreachProjector::new(ProjectorConfig {
            rounding: RoundingSettings {
                required_breaches: required,
                trajectory,
            },
            ..Default::default()
        })
        .unwrap()
    }

    fn targets(type3: f64, start: f64, end: f64) -> TrajectoryTargets {
        TrajectoryTargets {
            type3_target_percent: type3,
            start_type1_target_percent: start,
            end_type1_target_percent: end,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── Required breaches ───────────────────────────────────────────────────

    #[test]
    fn full_type3_compliance_leaves_whole_allowance_to_type1() {
        let rows = BreachProjector::default()
            .compute_required_breaches(&[Period::planned("Apr", 1000.0, 200.0, 100.0)], 95.0)
            .unwrap();
        let row = &rows[0];
        assert_eq!(row.type3_breaches, 0.0);
        assert_eq!(row.total_attendances, 1200.0);
        assert_abs_diff_eq!(row.target_breaches_allowed.unwrap(), 60.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.type1_breaches, 60.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.overall_performance_percent.unwrap(), 95.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.type1_performance_percent.unwrap(), 94.0, epsilon = 1e-9);
        assert_eq!(row.type3_performance_percent, Some(100.0));
        assert_eq!(row.phase, Phase::Planned);
    }

    #[test]
    fn type3_breaches_reduce_type1_allowance() {
        let rows = BreachProjector::default()
            .compute_required_breaches(&[Period::planned("May", 500.0, 100.0, 90.0)], 98.0)
            .unwrap();
        let row = &rows[0];
        assert_abs_diff_eq!(row.type3_breaches, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.target_breaches_allowed.unwrap(), 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.type1_breaches, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn looser_target_raises_requirement() {
        let rows = BreachProjector::default()
            .compute_required_breaches(&[Period::planned("May", 500.0, 100.0, 90.0)], 80.0)
            .unwrap();
        assert_abs_diff_eq!(rows[0].target_breaches_allowed.unwrap(), 120.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rows[0].type1_breaches, 110.0, epsilon = 1e-9);
    }

    #[test]
    fn requirement_clamps_at_zero() {
        // Type 3 alone already breaches more than the overall allowance.
        let rows = BreachProjector::default()
            .compute_required_breaches(&[Period::planned("Jun", 100.0, 100.0, 50.0)], 95.0)
            .unwrap();
        assert_eq!(rows[0].type1_breaches, 0.0);
        assert_eq!(rows[0].type1_performance_percent, Some(100.0));
    }

    #[test]
    fn requirement_may_exceed_type1_attendances() {
        let rows = BreachProjector::default()
            .compute_required_breaches(&[Period::planned("Jul", 10.0, 1000.0, 100.0)], 50.0)
            .unwrap();
        assert_abs_diff_eq!(rows[0].type1_breaches, 505.0, epsilon = 1e-9);
        assert_eq!(rows[0].type1_performance_percent, Some(0.0));
    }

    #[test]
    fn observed_type3_count_used_without_rate() {
        let mut period = Period::attendances("Aug", 500.0, 100.0);
        period.type3_breaches = Some(4.0);
        let rows = BreachProjector::default()
            .compute_required_breaches(&[period], 98.0)
            .unwrap();
        assert_abs_diff_eq!(rows[0].type1_breaches, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn required_rounding_policies() {
        // 10 * (1 - 0.75) = 2.5 exactly.
        let periods = [Period::planned("Sep", 10.0, 0.0, 100.0)];
        let raw = projector_with(Rounding::None, Rounding::HalfUp)
            .compute_required_breaches(&periods, 75.0)
            .unwrap();
        let up = projector_with(Rounding::HalfUp, Rounding::HalfUp)
            .compute_required_breaches(&periods, 75.0)
            .unwrap();
        let even = projector_with(Rounding::HalfEven, Rounding::HalfUp)
            .compute_required_breaches(&periods, 75.0)
            .unwrap();
        assert_eq!(raw[0].type1_breaches, 2.5);
        assert_eq!(up[0].type1_breaches, 3.0);
        assert_eq!(even[0].type1_breaches, 2.0);
    }

    #[test]
    fn trajectory_rounding_treats_decimal_halves_as_ties() {
        let cases = [
            // (type1 attendances, target, half_up, half_even)
            (1000.0, 95.05, 50.0, 50.0),
            (200.0, 98.25, 4.0, 4.0),
            (100.0, 97.5, 3.0, 2.0),
        ];
        for (attendances, target, half_up, half_even) in cases {
            let periods = [Period::attendances("Apr", attendances, 0.0)];
            let up = projector_with(Rounding::None, Rounding::HalfUp)
                .compute_trajectory(&periods, targets(100.0, target, target), None)
                .unwrap();
            let even = projector_with(Rounding::None, Rounding::HalfEven)
                .compute_trajectory(&periods, targets(100.0, target, target), None)
                .unwrap();
            assert_eq!(up[0].type1_breaches, half_up, "half_up at {target}%");
            assert_eq!(even[0].type1_breaches, half_even, "half_even at {target}%");
        }
    }

    #[test]
    fn required_rounding_treats_decimal_halves_as_ties() {
        // 100 * (1 - 0.975) is 2.50000000000000222 before snapping.
        let periods = [Period::planned("Sep", 100.0, 0.0, 100.0)];
        let up = projector_with(Rounding::HalfUp, Rounding::HalfUp)
            .compute_required_breaches(&periods, 97.5)
            .unwrap();
        let even = projector_with(Rounding::HalfEven, Rounding::HalfUp)
            .compute_required_breaches(&periods, 97.5)
            .unwrap();
        assert_eq!(up[0].type1_breaches, 3.0);
        assert_eq!(even[0].type1_breaches, 2.0);
    }

    #[test]
    fn zero_attendances_give_undefined_performance() {
        let rows = BreachProjector::default()
            .compute_required_breaches(&[Period::planned("Oct", 0.0, 0.0, 100.0)], 95.0)
            .unwrap();
        let row = &rows[0];
        assert_eq!(row.type1_breaches, 0.0);
        assert_eq!(row.overall_performance_percent, None);
        assert_eq!(row.type1_performance_percent, None);
        assert_eq!(row.type3_performance_percent, None);
    }

    #[test]
    fn invalid_batch_fails_whole_request() {
        let periods = [
            Period::planned("ok", 100.0, 10.0, 90.0),
            Period::planned("bad", -1.0, 10.0, 120.0),
            Period::attendances("no-type3", 100.0, 10.0),
        ];
        let err = BreachProjector::default()
            .compute_required_breaches(&periods, 101.0)
            .unwrap_err();
        let issues = err.issues();
        assert_eq!(issues.len(), 4);
        assert!(issues.iter().any(|i| i.field == "overall_target_percent"));
        assert!(issues.iter().any(|i| i.row == Some(2)));
    }

    #[test]
    fn empty_batch_is_empty_result() {
        let rows = BreachProjector::default()
            .compute_required_breaches(&[], 95.0)
            .unwrap();
        assert!(rows.is_empty());
    }

    // ── Trajectory ──────────────────────────────────────────────────────────

    #[test]
    fn trajectory_ramps_between_targets() {
        let periods = [
            Period::attendances("Apr", 1000.0, 200.0),
            Period::attendances("May", 1000.0, 200.0),
            Period::attendances("Jun", 1000.0, 200.0),
        ];
        let rows = BreachProjector::default()
            .compute_trajectory(&periods, targets(95.0, 76.0, 78.0), None)
            .unwrap();

        let targets: Vec<f64> = rows.iter().map(|r| r.type1_target_percent.unwrap()).collect();
        assert_eq!(targets[0], 76.0);
        assert_abs_diff_eq!(targets[1], 77.0, epsilon = 1e-12);
        assert_eq!(targets[2], 78.0);

        let first = &rows[0];
        assert_eq!(first.phase, Phase::Projected);
        assert_eq!(first.type1_breaches, 240.0);
        assert_abs_diff_eq!(first.type3_breaches, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            first.overall_performance_percent.unwrap(),
            100.0 * (1.0 - 250.0 / 1200.0),
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(first.type1_performance_percent.unwrap(), 76.0, epsilon = 1e-9);
        assert_abs_diff_eq!(first.type3_performance_percent.unwrap(), 95.0, epsilon = 1e-9);
        assert_eq!(rows[1].type1_breaches, 230.0);
        assert_eq!(rows[2].type1_breaches, 220.0);
    }

    #[test]
    fn single_future_period_uses_start_target() {
        let rows = BreachProjector::default()
            .compute_trajectory(
                &[Period::attendances("Apr", 1000.0, 0.0)],
                targets(95.0, 80.0, 95.0),
                None,
            )
            .unwrap();
        assert_eq!(rows[0].type1_target_percent, Some(80.0));
    }

    #[test]
    fn trajectory_rounding_policies() {
        let periods = [Period::attendances("Apr", 10.0, 0.0)];
        let up = projector_with(Rounding::None, Rounding::HalfUp)
            .compute_trajectory(&periods, targets(100.0, 75.0, 75.0), None)
            .unwrap();
        let even = projector_with(Rounding::None, Rounding::HalfEven)
            .compute_trajectory(&periods, targets(100.0, 75.0, 75.0), None)
            .unwrap();
        assert_eq!(up[0].type1_breaches, 3.0);
        assert_eq!(even[0].type1_breaches, 2.0);
    }

    #[test]
    fn historic_rows_use_observed_breaches() {
        let periods = [
            Period::observed("Jan", 1000.0, 200.0, 300.0, 5.0).with_date(date(2025, 1, 1)),
            Period::observed("Feb", 1000.0, 200.0, 250.0, 4.0).with_date(date(2025, 2, 1)),
            Period::attendances("Mar", 1000.0, 200.0).with_date(date(2025, 3, 1)),
            Period::attendances("Apr", 1000.0, 200.0).with_date(date(2025, 4, 1)),
        ];
        let rows = BreachProjector::default()
            .compute_trajectory(
                &periods,
                targets(95.0, 76.0, 78.0),
                Some(Split::Date(date(2025, 3, 1))),
            )
            .unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].phase, Phase::Historic);
        assert_eq!(rows[0].type1_breaches, 300.0);
        assert_eq!(rows[0].type3_breaches, 5.0);
        assert_eq!(rows[0].type1_target_percent, None);
        assert_abs_diff_eq!(rows[0].type1_performance_percent.unwrap(), 70.0, epsilon = 1e-9);
        assert_abs_diff_eq!(rows[0].type3_performance_percent.unwrap(), 97.5, epsilon = 1e-9);
        assert_abs_diff_eq!(
            rows[0].overall_performance_percent.unwrap(),
            100.0 * (1.0 - 305.0 / 1200.0),
            epsilon = 1e-9
        );

        assert_eq!(rows[2].phase, Phase::Projected);
        assert_eq!(rows[2].type1_target_percent, Some(76.0));
        assert_eq!(rows[3].type1_target_percent, Some(78.0));
    }

    #[test]
    fn index_split_marks_leading_periods_historic() {
        let periods = [
            Period::observed("Jan", 100.0, 10.0, 20.0, 1.0),
            Period::attendances("Feb", 100.0, 10.0),
        ];
        let rows = BreachProjector::default()
            .compute_trajectory(&periods, targets(95.0, 80.0, 90.0), Some(Split::Index(1)))
            .unwrap();
        assert_eq!(rows[0].phase, Phase::Historic);
        assert_eq!(rows[1].phase, Phase::Projected);
        assert_eq!(rows[1].type1_target_percent, Some(80.0));
    }

    #[test]
    fn differing_targets_need_a_future_period() {
        let periods = [Period::observed("Jan", 100.0, 10.0, 20.0, 1.0)];
        let err = BreachProjector::default()
            .compute_trajectory(&periods, targets(95.0, 80.0, 90.0), Some(Split::Index(1)))
            .unwrap_err();
        assert_eq!(err.issues()[0].field, "end_type1_target_percent");

        let rows = BreachProjector::default()
            .compute_trajectory(&periods, targets(95.0, 80.0, 80.0), Some(Split::Index(1)))
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn historic_rows_missing_observations_are_rejected() {
        let periods = [
            Period::attendances("Jan", 100.0, 10.0),
            Period::attendances("Feb", 100.0, 10.0),
        ];
        let err = BreachProjector::default()
            .compute_trajectory(&periods, targets(95.0, 80.0, 80.0), Some(Split::Index(1)))
            .unwrap_err();
        assert!(err.issues().iter().all(|i| i.row == Some(0)));
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn date_split_requires_dates_and_order() {
        let periods = [
            Period::observed("Jan", 100.0, 10.0, 20.0, 1.0).with_date(date(2025, 1, 1)),
            Period::attendances("Mar", 100.0, 10.0).with_date(date(2025, 3, 1)),
            Period::observed("Feb", 100.0, 10.0, 20.0, 1.0).with_date(date(2025, 2, 1)),
            Period::attendances("undated", 100.0, 10.0),
        ];
        let err = BreachProjector::default()
            .compute_trajectory(
                &periods,
                targets(95.0, 80.0, 90.0),
                Some(Split::Date(date(2025, 3, 1))),
            )
            .unwrap_err();
        let rows: Vec<Option<usize>> = err.issues().iter().map(|i| i.row).collect();
        assert_eq!(rows, vec![Some(2), Some(3)]);
    }

    #[test]
    fn undated_period_ends_historic_prefix() {
        let periods = [
            Period::attendances("undated", 100.0, 10.0),
            Period::observed("Jan", 100.0, 10.0, 20.0, 1.0).with_date(date(2025, 1, 1)),
            Period::attendances("Mar", 100.0, 10.0).with_date(date(2025, 3, 1)),
        ];
        let err = BreachProjector::default()
            .compute_trajectory(
                &periods,
                targets(95.0, 80.0, 90.0),
                Some(Split::Date(date(2025, 3, 1))),
            )
            .unwrap_err();
        let issues = err.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].row, Some(0));
        assert_eq!(issues[0].field, "date");
    }

    #[test]
    fn split_index_beyond_periods_is_rejected() {
        let err = BreachProjector::default()
            .compute_trajectory(
                &[Period::observed("Jan", 100.0, 10.0, 20.0, 1.0)],
                targets(95.0, 80.0, 80.0),
                Some(Split::Index(3)),
            )
            .unwrap_err();
        assert_eq!(err.issues()[0].field, "split");
    }

    #[test]
    fn trajectory_zero_attendances_are_defined() {
        let rows = BreachProjector::default()
            .compute_trajectory(
                &[Period::attendances("Apr", 0.0, 0.0)],
                targets(95.0, 76.0, 76.0),
                None,
            )
            .unwrap();
        assert_eq!(rows[0].type1_breaches, 0.0);
        assert_eq!(rows[0].overall_performance_percent, None);
    }

    // ── Manual adjustment ───────────────────────────────────────────────────

    #[test]
    fn adjustment_subtracts_and_clamps() {
        let projector = BreachProjector::default();
        let rows = projector
            .compute_trajectory(
                &[
                    Period::attendances("Apr", 100.0, 0.0),
                    Period::attendances("May", 1000.0, 0.0),
                ],
                targets(95.0, 95.0, 95.0),
                None,
            )
            .unwrap();
        assert_eq!(rows[0].type1_breaches, 5.0);
        assert_eq!(rows[1].type1_breaches, 50.0);

        let adjusted = projector.apply_manual_adjustment(&rows, 10.0).unwrap();
        assert_eq!(adjusted[0].adjusted_type1_breaches, Some(0.0));
        assert_eq!(adjusted[1].adjusted_type1_breaches, Some(40.0));
        assert_eq!(adjusted[1].type1_breaches, 50.0);
    }

    #[test]
    fn zero_reduction_copies_breaches() {
        let projector = BreachProjector::default();
        let rows = projector
            .compute_required_breaches(&[Period::planned("Apr", 1000.0, 200.0, 100.0)], 95.0)
            .unwrap();
        let adjusted = projector.apply_manual_adjustment(&rows, 0.0).unwrap();
        assert_eq!(adjusted[0].adjusted_type1_breaches, Some(rows[0].type1_breaches));
    }

    #[test]
    fn negative_reduction_is_invalid() {
        let err = BreachProjector::default()
            .apply_manual_adjustment(&[], -1.0)
            .unwrap_err();
        assert!(matches!(err, ProjectorError::InvalidInput(_)));
    }

    // ── Properties ──────────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn required_breaches_never_negative_or_nan(
            type1 in 0.0f64..100_000.0,
            type3 in 0.0f64..100_000.0,
            compliance in 0.0f64..=100.0,
            target in 0.0f64..=100.0,
        ) {
            let rows = BreachProjector::default()
                .compute_required_breaches(&[Period::planned("p", type1, type3, compliance)], target)
                .unwrap();
            let row = &rows[0];
            prop_assert!(row.type1_breaches >= 0.0);
            prop_assert!(row.type3_breaches >= 0.0);
            prop_assert!(row.type1_breaches.is_finite());
            for pct in [
                row.type1_performance_percent,
                row.type3_performance_percent,
                row.overall_performance_percent,
            ]
            .into_iter()
            .flatten()
            {
                prop_assert!((0.0..=100.0).contains(&pct));
            }
        }

        #[test]
        fn required_breaches_are_idempotent(
            type1 in 0.0f64..10_000.0,
            type3 in 0.0f64..10_000.0,
            compliance in 0.0f64..=100.0,
            target in 0.0f64..=100.0,
        ) {
            let projector = BreachProjector::default();
            let periods = [Period::planned("p", type1, type3, compliance)];
            let first = projector.compute_required_breaches(&periods, target).unwrap();
            let second = projector.compute_required_breaches(&periods, target).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn equal_endpoints_give_constant_target(
            target in 0.0f64..=100.0,
            n in 1usize..24,
        ) {
            let periods: Vec<Period> = (0..n)
                .map(|i| Period::attendances(format!("p{i}"), 100.0, 10.0))
                .collect();
            let rows = BreachProjector::default()
                .compute_trajectory(&periods, targets(95.0, target, target), None)
                .unwrap();
            prop_assert!(rows.iter().all(|r| r.type1_target_percent == Some(target)));
        }

        #[test]
        fn projected_breaches_never_negative(
            type1 in 0.0f64..100_000.0,
            type3 in 0.0f64..100_000.0,
            start in 0.0f64..=100.0,
            end in 0.0f64..=100.0,
        ) {
            let periods = [
                Period::attendances("a", type1, type3),
                Period::attendances("b", type3, type1),
            ];
            let rows = BreachProjector::default()
                .compute_trajectory(&periods, targets(95.0, start, end), None)
                .unwrap();
            for row in &rows {
                prop_assert!(row.type1_breaches >= 0.0);
                prop_assert!(row.type3_breaches >= 0.0);
                prop_assert!(!row.type1_breaches.is_nan());
            }
        }
    }
}
