use std::ops::Mul;

use chrono::TimeDelta;

use crate::quantity::energy::KilowattHours;

quantity!(Watts, "W", "{:.1}");

impl Mul<TimeDelta> for Watts {
    type Output = KilowattHours;

    fn mul(self, rhs: TimeDelta) -> Self::Output {
        let hours = rhs.as_seconds_f64() / 3600.0;
        KilowattHours(self.0 * hours / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_kilowatt_over_one_hour() {
        assert_eq!(Watts(1000.0) * TimeDelta::hours(1), KilowattHours(1.0));
    }

    #[test]
    fn scales_with_duration() {
        assert_eq!(Watts(1000.0) * TimeDelta::minutes(30), KilowattHours(0.5));
    }
}
