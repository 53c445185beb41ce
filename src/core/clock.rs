use chrono::{DateTime, Datelike, Local, TimeDelta, Timelike};

/// Wall clock captured once at the start of a cycle.
///
/// Every calendar derivation of the cycle goes through the same captured
/// instant, so a cycle that straddles midnight still sees one consistent
/// hour, day key, week number and weekday index.
#[derive(Copy, Clone, Debug)]
#[must_use]
pub struct CycleInstant(DateTime<Local>);

impl CycleInstant {
    pub fn now() -> Self {
        Self(Local::now())
    }

    pub const fn new(now: DateTime<Local>) -> Self {
        Self(now)
    }

    #[must_use]
    pub fn hour(self) -> u32 {
        self.0.hour()
    }

    /// Calendar-day key, for example `2026-08-29`.
    #[must_use]
    pub fn day_key(self) -> String {
        self.0.date_naive().to_string()
    }

    /// ISO-8601 week number: Monday-start weeks, week 1 contains the first Thursday.
    #[must_use]
    pub fn iso_week(self) -> u32 {
        self.0.iso_week().week()
    }

    /// Index into the 7-slot weekly arrays: Monday = 0 … Sunday = 6.
    #[must_use]
    pub fn weekday_index(self) -> usize {
        self.0.weekday().num_days_from_monday() as usize
    }

    /// Yesterday's weekday index, used to close out the previous day's slot.
    #[must_use]
    pub fn previous_weekday_index(self) -> usize {
        (self.0 - TimeDelta::days(1)).weekday().num_days_from_monday() as usize
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> CycleInstant {
        CycleInstant::new(Local.with_ymd_and_hms(year, month, day, hour, 30, 0).unwrap())
    }

    #[test]
    fn monday_maps_to_zero() {
        // 2024-01-01 was a Monday.
        assert_eq!(at(2024, 1, 1, 12).weekday_index(), 0);
    }

    #[test]
    fn sunday_maps_to_six() {
        // 2024-01-07 was a Sunday.
        assert_eq!(at(2024, 1, 7, 12).weekday_index(), 6);
    }

    #[test]
    fn previous_weekday_wraps_over_monday() {
        // Monday looks back to Sunday.
        assert_eq!(at(2024, 1, 1, 0).previous_weekday_index(), 6);
        // Wednesday looks back to Tuesday.
        assert_eq!(at(2024, 1, 3, 0).previous_weekday_index(), 1);
    }

    #[test]
    fn iso_week_at_year_boundary() {
        // 2024-12-30 (Monday) already belongs to ISO week 1 of 2025.
        assert_eq!(at(2024, 12, 30, 12).iso_week(), 1);
        assert_eq!(at(2024, 12, 29, 12).iso_week(), 52);
    }

    #[test]
    fn day_key_is_iso_date() {
        assert_eq!(at(2026, 8, 29, 23).day_key(), "2026-08-29");
    }
}
