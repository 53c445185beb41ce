use std::{
    iter::Sum,
    ops::{Index, IndexMut},
};

use derive_more::{Add, AddAssign};
use serde::{Deserialize, Serialize};

use crate::{
    core::subsystem::Subsystem,
    quantity::{cost::Cost, energy::KilowattHours},
};

/// An energy/cost pair accumulated over some period.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Add, AddAssign, Deserialize, Serialize)]
pub struct Tally {
    pub energy: KilowattHours,
    pub cost: Cost,
}

impl Tally {
    pub const ZERO: Self = Self { energy: KilowattHours::ZERO, cost: Cost::ZERO };
}

impl Sum for Tally {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |sum, tally| sum + tally)
    }
}

/// Running totals for the current calendar day.
///
/// `total` is never accumulated independently: it is recomputed as the sum of
/// the subsystem tallies after every mutation, so the sum invariant holds
/// exactly regardless of reset timing.
#[derive(Copy, Clone, Debug, Default, Deserialize, Serialize)]
#[must_use]
pub struct DailyTotals {
    subsystems: [Tally; 3],
    pub total: Tally,
}

impl DailyTotals {
    pub fn add(&mut self, subsystem: Subsystem, increment: Tally) {
        self.subsystems[subsystem.index()] += increment;
        self.total = self.subsystems.iter().copied().sum();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Used by the startup loader, which reads each bucket from the store.
    pub fn restore(&mut self, subsystem: Subsystem, tally: Tally) {
        self.subsystems[subsystem.index()] = tally;
        self.total = self.subsystems.iter().copied().sum();
    }
}

impl Index<Subsystem> for DailyTotals {
    type Output = Tally;

    fn index(&self, subsystem: Subsystem) -> &Self::Output {
        &self.subsystems[subsystem.index()]
    }
}

impl IndexMut<Subsystem> for DailyTotals {
    fn index_mut(&mut self, subsystem: Subsystem) -> &mut Self::Output {
        &mut self.subsystems[subsystem.index()]
    }
}

pub const DAYS_PER_WEEK: usize = 7;

/// Running totals for the current ISO week.
///
/// The day arrays are indexed Monday = 0 … Sunday = 6. Each slot holds the
/// final daily total of a closed day, or the running total for the
/// in-progress weekday. The weekly sums are always recomputed from the
/// arrays, never accumulated, so they stay exact across resets.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[must_use]
pub struct WeeklyTotals {
    pub energy: KilowattHours,
    pub cost: Cost,
    pub daily_energies: [KilowattHours; DAYS_PER_WEEK],
    pub daily_costs: [Cost; DAYS_PER_WEEK],
    pub last_reset_week: u32,
}

impl WeeklyTotals {
    pub fn new(week: u32) -> Self {
        Self {
            energy: KilowattHours::ZERO,
            cost: Cost::ZERO,
            daily_energies: [KilowattHours::ZERO; DAYS_PER_WEEK],
            daily_costs: [Cost::ZERO; DAYS_PER_WEEK],
            last_reset_week: week,
        }
    }

    /// Zero everything and stamp the new week.
    pub fn reset(&mut self, week: u32) {
        *self = Self::new(week);
    }

    pub fn set_day(&mut self, weekday_index: usize, tally: Tally) {
        self.daily_energies[weekday_index] = tally.energy;
        self.daily_costs[weekday_index] = tally.cost;
    }

    #[must_use]
    pub fn day(&self, weekday_index: usize) -> Tally {
        Tally {
            energy: self.daily_energies[weekday_index],
            cost: self.daily_costs[weekday_index],
        }
    }

    /// Recompute the weekly sums from the 7-slot arrays.
    pub fn recompute(&mut self) {
        self.energy = self.daily_energies.iter().copied().sum();
        self.cost = self.daily_costs.iter().copied().sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_total_tracks_subsystem_sum() {
        let mut daily = DailyTotals::default();
        daily.add(Subsystem::Lighting, Tally { energy: KilowattHours(1.0), cost: Cost(0.3) });
        daily.add(Subsystem::Hvac, Tally { energy: KilowattHours(2.0), cost: Cost(0.6) });
        daily.add(Subsystem::Lighting, Tally { energy: KilowattHours(0.5), cost: Cost(0.15) });
        assert_eq!(daily.total.energy, KilowattHours(3.5));
        assert_eq!(daily.total.cost, Cost(1.05));
    }

    #[test]
    fn weekly_sums_follow_the_arrays() {
        let mut weekly = WeeklyTotals::new(10);
        weekly.set_day(0, Tally { energy: KilowattHours(1.0), cost: Cost(0.3) });
        weekly.set_day(6, Tally { energy: KilowattHours(2.0), cost: Cost(0.6) });
        weekly.recompute();
        assert_eq!(weekly.energy, KilowattHours(3.0));
        assert_eq!(weekly.cost, Cost(0.9));

        weekly.reset(11);
        assert_eq!(weekly.energy, KilowattHours::ZERO);
        assert!(weekly.daily_energies.iter().all(|energy| *energy == KilowattHours::ZERO));
        assert_eq!(weekly.last_reset_week, 11);
    }
}
