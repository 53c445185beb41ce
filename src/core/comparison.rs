use itertools::Itertools;

use crate::{
    core::{reading::ReadingSet, subsystem::Subsystem},
    quantity::energy::KilowattHours,
};

/// Percentage difference of `lhs` relative to `rhs`.
///
/// Returns `NaN` when the reference is zero: the comparison is undefined
/// rather than an error, so a degenerate first cycle cannot bring the
/// aggregation loop down.
#[must_use]
pub fn relative_difference(lhs: KilowattHours, rhs: KilowattHours) -> f64 {
    if rhs == KilowattHours::ZERO {
        f64::NAN
    } else {
        (lhs.0 - rhs.0) / rhs.0 * 100.0
    }
}

/// All six ordered pairwise differences between the subsystem hourly energies.
#[must_use]
pub fn pairwise_differences(readings: &ReadingSet) -> Vec<(Subsystem, Subsystem, f64)> {
    Subsystem::ALL
        .iter()
        .cartesian_product(Subsystem::ALL.iter())
        .filter(|(lhs, rhs)| lhs != rhs)
        .map(|(lhs, rhs)| {
            (
                *lhs,
                *rhs,
                relative_difference(readings[*lhs].energy_hourly, readings[*rhs].energy_hourly),
            )
        })
        .collect()
}
