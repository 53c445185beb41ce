use crate::{
    core::{clock::CycleInstant, reading::ReadingSet, totals::{DailyTotals, Tally, WeeklyTotals}},
    prelude::*,
    quantity::{energy::KilowattHours, rate::KilowattHourRate},
};

/// The engine's entire mutable state: daily buckets, weekly arrays and the
/// reset markers that gate the rollovers. Single writer, one mutation per
/// cycle.
#[derive(Clone, Debug)]
#[must_use]
pub struct AggregationState {
    pub daily: DailyTotals,
    pub weekly: WeeklyTotals,
    /// Calendar-day key of the last daily reset.
    pub last_reset_date: String,
}

impl AggregationState {
    /// Fresh state with the markers stamped to the given instant, so neither
    /// rollover fires on the first cycle.
    pub fn starting_at(instant: CycleInstant) -> Self {
        Self {
            daily: DailyTotals::default(),
            weekly: WeeklyTotals::new(instant.iso_week()),
            last_reset_date: instant.day_key(),
        }
    }

    /// Week rollover check. Runs before the day check every cycle.
    ///
    /// Returns whether a reset fired, so the caller can persist the zeroed
    /// arrays and the new week marker before anything else happens this
    /// cycle. Re-running within the same ISO week is a no-op.
    pub fn check_week(&mut self, instant: CycleInstant) -> bool {
        let current_week = instant.iso_week();
        if self.weekly.last_reset_week == current_week {
            return false;
        }
        info!(from = self.weekly.last_reset_week, to = current_week, "week rollover");
        self.weekly.reset(current_week);
        true
    }

    /// Day rollover check.
    ///
    /// Closes out yesterday first: the about-to-be-cleared daily total is
    /// written into *yesterday's* weekday slot (today's index would be off by
    /// one). The slot is only written when the closing energy is positive, so
    /// a restart shortly after midnight cannot blank an already-closed day.
    /// Re-running within the same calendar day is a no-op.
    pub fn check_day(&mut self, instant: CycleInstant) -> bool {
        let current_date = instant.day_key();
        if self.last_reset_date == current_date {
            return false;
        }
        let closing = self.daily.total;
        info!(
            date = %current_date,
            energy = %closing.energy,
            cost = %closing.cost,
            "day rollover",
        );
        if closing.energy > KilowattHours::ZERO {
            self.weekly.set_day(instant.previous_weekday_index(), closing);
        }
        self.daily.reset();
        self.last_reset_date = current_date;
        true
    }

    /// Fold one interval's readings into the daily buckets.
    ///
    /// Must run after the rollover checks of the same cycle so a fresh bucket
    /// receives this interval's contribution. `interval_fraction` is the
    /// cycle length as a fraction of an hour.
    pub fn accumulate(
        &mut self,
        readings: &ReadingSet,
        price: KilowattHourRate,
        interval_fraction: f64,
    ) {
        for (subsystem, reading) in readings.iter() {
            let energy = reading.energy_hourly * interval_fraction;
            self.daily.add(subsystem, Tally { energy, cost: energy * price });
        }
    }

    /// Mirror the running daily total into today's weekly slot and refresh
    /// the weekly sums. Runs every cycle, reset or not, so the weekly totals
    /// always include the in-progress day.
    pub fn update_current_day(&mut self, instant: CycleInstant) {
        self.weekly.set_day(instant.weekday_index(), self.daily.total);
        self.weekly.recompute();
    }
}
