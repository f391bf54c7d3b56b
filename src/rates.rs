//! Percentage arithmetic shared by every projection mode.

use serde::{Deserialize, Serialize};

/// How fractional breach counts are turned into whole breaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Keep the fractional value.
    None,
    /// Ties round away from zero (2.5 -> 3).
    HalfUp,
    /// Ties round to the even neighbour (2.5 -> 2, 3.5 -> 4).
    HalfEven,
}

/// Decimal places kept before a tie is broken.
const SNAP_SCALE: f64 = 1e9;

impl Rounding {
    /// Ties are judged on the value snapped to nine decimal places, so a
    /// decimal half such as 1000 * (1 - 0.9505) counts as a tie.
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Rounding::None => value,
            Rounding::HalfUp => snap(value).round(),
            Rounding::HalfEven => snap(value).round_ties_even(),
        }
    }
}

fn snap(value: f64) -> f64 {
    let scaled = value * SNAP_SCALE;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / SNAP_SCALE
}

/// Breaches implied by a compliance percentage over `attendances`.
pub fn breaches_at(attendances: f64, compliance_percent: f64) -> f64 {
    attendances * (1.0 - compliance_percent / 100.0)
}

/// Share of `attendances` that did not breach, in percent.
///
/// Returns `None` when there are no attendances. The result is clamped to
/// [0, 100], so a breach count above the attendance count reads as 0%.
pub fn performance_percent(breaches: f64, attendances: f64) -> Option<f64> {
    if attendances <= 0.0 {
        return None;
    }
    Some((100.0 * (1.0 - breaches / attendances)).clamp(0.0, 100.0))
}

/// `part` as a percentage of `whole`, `None` when `whole` is zero.
pub fn share_percent(part: f64, whole: f64) -> Option<f64> {
    if whole <= 0.0 {
        return None;
    }
    Some(100.0 * part / whole)
}

/// Linear ramp from `start` to `end` over `n` points, evaluated at `i`.
///
/// A single point sits at `start`; the last of several sits exactly at `end`.
pub fn interpolate_target(start: f64, end: f64, i: usize, n: usize) -> f64 {
    if n <= 1 || i == 0 {
        return start;
    }
    if i >= n - 1 {
        return end;
    }
    start + (end - start) * i as f64 / (n - 1) as f64
}

/// Clamp a breach count at zero.
pub fn non_negative(value: f64) -> f64 {
    value.max(0.0)
}
