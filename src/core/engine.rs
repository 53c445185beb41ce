use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use bon::Builder;
use tokio::time::{MissedTickBehavior, interval};

use crate::{
    api::heartbeat,
    core::{
        clock::CycleInstant,
        comparison::pairwise_differences,
        pricing::hourly_price,
        reading::{ReadingGenerator, ReadingSet},
        rollover::AggregationState,
        subsystem::Subsystem,
        totals::{DAYS_PER_WEEK, Tally},
    },
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
    store::{
        TagStore, TagValue,
        key::{DailyScope, InstantField, SummaryField, TagKey, TallyField, WeeklySeries},
        point_inventory,
    },
};

/// The aggregation engine: owns all cycle state and drives one full
/// generate → price → rollover-check → accumulate → persist pass per tick.
///
/// Single writer by construction. The loop awaits each cycle inline, so
/// cycles never overlap even when a store write outlasts the tick.
#[derive(Builder)]
pub struct Engine<S> {
    store: S,

    generator: ReadingGenerator,

    /// Cycle period: drives both the scheduler and the interval fraction of
    /// the accumulator, so the two can never drift apart.
    #[builder(into)]
    interval: Duration,

    #[builder(default = heartbeat::Client::disabled())]
    heartbeat: heartbeat::Client,

    #[builder(default = AggregationState::starting_at(CycleInstant::now()))]
    state: AggregationState,
}

/// Read the persisted aggregation state, defaulting every missing value:
/// on a first run this yields zeroed totals with the markers stamped to now,
/// so no rollover fires spuriously.
pub async fn load_state(store: &impl TagStore) -> Result<AggregationState> {
    let keys = state_keys();
    let values = store.get(&keys).await?;
    ensure!(
        values.len() == keys.len(),
        "the store returned {} values for {} keys",
        values.len(),
        keys.len(),
    );

    let number = |value: Option<TagValue>| value.and_then(|value| value.as_number());
    let mut values = values.into_iter();
    let mut state = AggregationState::starting_at(CycleInstant::now());

    for subsystem in Subsystem::ALL {
        let tally = Tally {
            energy: KilowattHours(number(values.next().flatten()).unwrap_or(0.0)),
            cost: Cost(number(values.next().flatten()).unwrap_or(0.0)),
        };
        state.daily.restore(subsystem, tally);
    }
    // The aggregate daily total and the weekly sums are recomputed from
    // their parts instead of trusting the persisted sums.
    for _ in 0..4 {
        let _ = values.next();
    }
    if let Some(date) = values.next().flatten().and_then(TagValue::into_text) {
        state.last_reset_date = date;
    }
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    if let Some(week) = number(values.next().flatten()) {
        state.weekly.last_reset_week = week as u32;
    }
    for index in 0..DAYS_PER_WEEK {
        state.weekly.daily_energies[index] =
            KilowattHours(number(values.next().flatten()).unwrap_or(0.0));
    }
    for index in 0..DAYS_PER_WEEK {
        state.weekly.daily_costs[index] = Cost(number(values.next().flatten()).unwrap_or(0.0));
    }
    state.weekly.recompute();
    Ok(state)
}

/// Keys read back at startup, in the order [`load_state`] consumes them.
fn state_keys() -> Vec<TagKey> {
    let mut keys = Vec::with_capacity(26);
    for subsystem in Subsystem::ALL {
        keys.push(TagKey::Daily(DailyScope::Subsystem(subsystem), TallyField::Energy));
        keys.push(TagKey::Daily(DailyScope::Subsystem(subsystem), TallyField::Cost));
    }
    keys.push(TagKey::Daily(DailyScope::Total, TallyField::Energy));
    keys.push(TagKey::Daily(DailyScope::Total, TallyField::Cost));
    keys.push(TagKey::WeeklyTotal(TallyField::Energy));
    keys.push(TagKey::WeeklyTotal(TallyField::Cost));
    keys.push(TagKey::LastResetDate);
    keys.push(TagKey::LastResetWeek);
    for index in 0..DAYS_PER_WEEK {
        keys.push(TagKey::WeeklyDay(WeeklySeries::Energies, index));
    }
    for index in 0..DAYS_PER_WEEK {
        keys.push(TagKey::WeeklyDay(WeeklySeries::Costs, index));
    }
    keys
}

impl<S: TagStore> Engine<S> {
    /// Create missing data points and load the persisted state.
    ///
    /// A failed read is degraded, not fatal: the engine starts from zeroed
    /// state and overwrites the store as it goes.
    #[instrument(skip_all)]
    pub async fn initialize(&mut self) -> Result {
        for (point, point_type) in point_inventory() {
            if !self.store.exists(&point).await? {
                info!(point = %point, ?point_type, "creating the data point…");
                self.store.create(&point, point_type).await?;
            }
        }
        match load_state(&self.store).await {
            Ok(state) => self.state = state,
            Err(error) => warn!("failed to load the persisted state, starting fresh: {error:#}"),
        }
        Ok(())
    }

    /// Run cycles until the termination flag is raised.
    ///
    /// The first cycle fires immediately; afterwards `Delay` tick behaviour
    /// reschedules from completion, so a slow store stretches the period
    /// instead of piling up cycles.
    pub async fn run(&mut self, should_terminate: &AtomicBool) {
        info!(interval = ?self.interval, "starting the aggregation loop…");
        let mut ticks = interval(self.interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        while !should_terminate.load(Ordering::Relaxed) {
            ticks.tick().await;
            self.run_cycle(CycleInstant::now()).await;
            self.heartbeat.send().await;
        }
        info!("terminating…");
    }

    /// One full aggregation cycle at the given instant.
    ///
    /// The rollover checks run first so a freshly reset bucket receives this
    /// interval's contribution; each reset is persisted before the cycle
    /// proceeds, so a crash mid-cycle cannot replay it.
    pub async fn run_cycle(&mut self, instant: CycleInstant) {
        if self.state.check_week(instant) {
            self.persist(self.week_reset_batch()).await;
        }
        if self.state.check_day(instant) {
            self.persist(self.day_reset_batch()).await;
        }

        let mut readings = self.generator.generate(instant.hour());
        let total_energy_hourly = readings.total_energy_hourly();
        let price = hourly_price(instant.hour(), total_energy_hourly);
        readings.apply_price(price);
        debug!(hour = instant.hour(), %price, energy = %total_energy_hourly, "generated readings");

        self.state.accumulate(&readings, price, self.interval_fraction());
        self.state.update_current_day(instant);

        self.persist(self.snapshot_batch(&readings, total_energy_hourly, price)).await;
    }

    pub const fn state(&self) -> &AggregationState {
        &self.state
    }

    fn interval_fraction(&self) -> f64 {
        self.interval.as_secs_f64() / 3600.0
    }

    /// Failed writes are logged, never propagated: the in-memory state stays
    /// authoritative and the next cycle's write covers the same keys again.
    async fn persist(&self, updates: Vec<(TagKey, TagValue)>) {
        if let Err(error) = self.store.set(updates).await {
            warn!("failed to persist to the tag store: {error:#}");
        }
    }

    /// Week marker and the zeroed weekly state, in one batch.
    fn week_reset_batch(&self) -> Vec<(TagKey, TagValue)> {
        let weekly = &self.state.weekly;
        let mut updates = vec![(
            TagKey::LastResetWeek,
            TagValue::number(f64::from(weekly.last_reset_week)),
        )];
        updates.extend(self.weekly_day_updates());
        updates.push((TagKey::WeeklyTotal(TallyField::Energy), TagValue::number(weekly.energy)));
        updates.push((TagKey::WeeklyTotal(TallyField::Cost), TagValue::number(weekly.cost)));
        updates
    }

    /// Day marker and the weekday series including yesterday's close-out.
    fn day_reset_batch(&self) -> Vec<(TagKey, TagValue)> {
        let mut updates =
            vec![(TagKey::LastResetDate, TagValue::text(self.state.last_reset_date.clone()))];
        updates.extend(self.weekly_day_updates());
        updates
    }

    fn weekly_day_updates(&self) -> Vec<(TagKey, TagValue)> {
        let weekly = &self.state.weekly;
        let mut updates = Vec::with_capacity(2 * DAYS_PER_WEEK);
        for index in 0..DAYS_PER_WEEK {
            updates.push((
                TagKey::WeeklyDay(WeeklySeries::Energies, index),
                TagValue::number(weekly.daily_energies[index]),
            ));
        }
        for index in 0..DAYS_PER_WEEK {
            updates.push((
                TagKey::WeeklyDay(WeeklySeries::Costs, index),
                TagValue::number(weekly.daily_costs[index]),
            ));
        }
        updates
    }

    /// Everything the cycle produced, in one batch. The weekday series and
    /// reset markers are repeated here so a transiently failed rollover
    /// write is healed by the following cycle.
    fn snapshot_batch(
        &self,
        readings: &ReadingSet,
        total_energy_hourly: KilowattHours,
        price: KilowattHourRate,
    ) -> Vec<(TagKey, TagValue)> {
        let mut updates = Vec::with_capacity(50);
        for (subsystem, reading) in readings.iter() {
            updates.push((
                TagKey::Instant(subsystem, InstantField::Voltage),
                TagValue::number(reading.voltage),
            ));
            updates.push((
                TagKey::Instant(subsystem, InstantField::Current),
                TagValue::number(reading.current),
            ));
            updates.push((
                TagKey::Instant(subsystem, InstantField::Power),
                TagValue::number(reading.power),
            ));
            updates.push((
                TagKey::Instant(subsystem, InstantField::Energy),
                TagValue::number(reading.energy_hourly),
            ));
            updates.push((
                TagKey::Instant(subsystem, InstantField::Cost),
                TagValue::number(reading.cost_hourly),
            ));
        }

        updates.push((
            TagKey::Summary(SummaryField::TotalEnergy),
            TagValue::number(total_energy_hourly),
        ));
        updates.push((
            TagKey::Summary(SummaryField::TotalCost),
            TagValue::number(total_energy_hourly * price),
        ));
        updates.push((TagKey::Summary(SummaryField::EnergyPrice), TagValue::number(price)));

        for subsystem in Subsystem::ALL {
            let tally = self.state.daily[subsystem];
            updates.push((
                TagKey::Daily(DailyScope::Subsystem(subsystem), TallyField::Energy),
                TagValue::number(tally.energy),
            ));
            updates.push((
                TagKey::Daily(DailyScope::Subsystem(subsystem), TallyField::Cost),
                TagValue::number(tally.cost),
            ));
        }
        let total = self.state.daily.total;
        updates.push((
            TagKey::Daily(DailyScope::Total, TallyField::Energy),
            TagValue::number(total.energy),
        ));
        updates
            .push((TagKey::Daily(DailyScope::Total, TallyField::Cost), TagValue::number(total.cost)));

        let weekly = &self.state.weekly;
        updates.push((TagKey::WeeklyTotal(TallyField::Energy), TagValue::number(weekly.energy)));
        updates.push((TagKey::WeeklyTotal(TallyField::Cost), TagValue::number(weekly.cost)));

        for (lhs, rhs, difference) in pairwise_differences(readings) {
            updates.push((TagKey::Comparison(lhs, rhs), TagValue::Number(difference)));
        }

        updates.extend(self.weekly_day_updates());
        updates.push((TagKey::LastResetDate, TagValue::text(self.state.last_reset_date.clone())));
        updates.push((
            TagKey::LastResetWeek,
            TagValue::number(f64::from(weekly.last_reset_week)),
        ));
        updates
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::*;
    use crate::store::memory::MemoryStore;

    fn instant(year: i32, month: u32, day: u32, hour: u32) -> CycleInstant {
        CycleInstant::new(Local.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap())
    }

    fn engine(store: MemoryStore) -> Engine<MemoryStore> {
        Engine::builder()
            .store(store)
            .generator(ReadingGenerator::new(Some(42)))
            .interval(Duration::from_secs(5))
            .build()
    }

    fn stored_number(store: &MemoryStore, key: &str) -> f64 {
        store
            .value(key)
            .and_then(|value| value.as_number())
            .unwrap_or_else(|| panic!("`{key}` is not a stored number"))
    }

    #[tokio::test]
    async fn initialize_creates_every_point() -> Result {
        let store = MemoryStore::new();
        engine(store.clone()).initialize().await?;
        for point in ["Lighting", "HVAC", "Appliance", "EnergySummary", "WeeklyEnergy"] {
            assert!(store.exists(point).await?, "missing point `{point}`");
        }
        Ok(())
    }

    #[tokio::test]
    async fn cycle_persists_a_consistent_snapshot() {
        let store = MemoryStore::new();
        let mut engine = engine(store.clone());
        let noon = instant(2024, 1, 2, 12);
        engine.run_cycle(noon).await;
        engine.run_cycle(noon).await;

        let price = stored_number(&store, "EnergySummary.EnergyPrice");
        assert!((0.20..=0.50).contains(&price));

        let subsystem_sum = stored_number(&store, "DailyEnergyLighting.Energy")
            + stored_number(&store, "DailyEnergyHVAC.Energy")
            + stored_number(&store, "DailyEnergyAppliance.Energy");
        let total = stored_number(&store, "DailyEnergyTotal.Energy");
        assert!((total - subsystem_sum).abs() < 1e-9);
        assert!(total > 0.0);

        // Tuesday's running total is mirrored into slot 2 (Day2).
        assert!((stored_number(&store, "WeeklyEnergy.Day2") - total).abs() < 1e-12);
        assert!(
            (stored_number(&store, "WeeklyEnergyTotal.Energy") - total).abs() < 1e-12,
        );

        assert!(store.value("Comparison.Lighting_HVAC").is_some());
        assert_eq!(
            store.value("ResetTimes.LastResetDate"),
            Some(TagValue::text("2024-01-02")),
        );
    }

    #[tokio::test]
    async fn day_rollover_closes_yesterday_before_accumulating() {
        let store = MemoryStore::new();
        let mut engine = engine(store.clone());
        engine.run_cycle(instant(2024, 1, 2, 23)).await;
        let tuesday_total = stored_number(&store, "DailyEnergyTotal.Energy");

        engine.run_cycle(instant(2024, 1, 3, 0)).await;
        // Tuesday's total was carried into its closed slot…
        assert!((stored_number(&store, "WeeklyEnergy.Day2") - tuesday_total).abs() < 1e-12);
        // …and the fresh daily bucket holds only Wednesday's first interval:
        // at most ~5 kW across all three subsystems for a 5-second slice.
        let wednesday_total = stored_number(&store, "DailyEnergyTotal.Energy");
        assert!(wednesday_total > 0.0);
        assert!(wednesday_total < 0.01);
        assert_eq!(
            store.value("ResetTimes.LastResetDate"),
            Some(TagValue::text("2024-01-03")),
        );
    }

    #[tokio::test]
    async fn restart_resumes_from_the_persisted_state() -> Result {
        let store = MemoryStore::new();
        let mut first = engine(store.clone());
        first.initialize().await?;
        first.run_cycle(instant(2024, 1, 2, 12)).await;
        let persisted_total = first.state().daily.total;

        let mut second = engine(store.clone());
        second.initialize().await?;
        let state = second.state();
        assert_eq!(state.last_reset_date, "2024-01-02");
        assert!((state.daily.total.energy.0 - persisted_total.energy.0).abs() < 1e-12);
        assert!((state.weekly.energy.0 - persisted_total.energy.0).abs() < 1e-12);
        Ok(())
    }

    #[tokio::test]
    async fn first_run_defaults_do_not_fire_rollovers() -> Result {
        let state = load_state(&MemoryStore::new()).await?;
        assert_eq!(state.daily.total, Tally::ZERO);
        assert_eq!(state.weekly.energy, KilowattHours::ZERO);
        assert_eq!(state.last_reset_date, CycleInstant::now().day_key());
        Ok(())
    }
}
