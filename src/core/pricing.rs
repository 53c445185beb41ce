use std::f64::consts::PI;

use crate::quantity::{energy::KilowattHours, rate::KilowattHourRate};

pub const BASE_PRICE: KilowattHourRate = KilowattHourRate(0.30);
pub const PRICE_FLOOR: KilowattHourRate = KilowattHourRate(0.20);
pub const PRICE_CEILING: KilowattHourRate = KilowattHourRate(0.50);

/// Derive the per-kWh price from the time of day and the total hourly demand.
///
/// The time-of-day term swings ±0.05 €/kWh over the day; the demand term adds
/// up to 0.10 €/kWh. The result is kept within the tariff bounds.
#[must_use]
pub fn hourly_price(hour: u32, total_energy_hourly: KilowattHours) -> KilowattHourRate {
    let time_variation = (f64::from(hour) * PI / 12.0).sin() * 0.05;
    let demand_variation = (total_energy_hourly.0 * 0.2).min(0.10);
    KilowattHourRate(BASE_PRICE.0 + time_variation + demand_variation)
        .clamp(PRICE_FLOOR, PRICE_CEILING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_price_at_midnight_with_no_demand() {
        assert_eq!(hourly_price(0, KilowattHours::ZERO), BASE_PRICE);
    }

    #[test]
    fn demand_term_saturates() {
        // 0.2 €/kWh per kWh of demand, capped at +0.10.
        assert_eq!(hourly_price(0, KilowattHours(0.25)), KilowattHourRate(0.35));
        assert_eq!(hourly_price(0, KilowattHours(10.0)), KilowattHourRate(0.40));
    }

    #[test]
    fn stays_within_tariff_bounds() {
        for hour in 0..24 {
            for demand in [0.0, 0.1, 1.0, 100.0] {
                let price = hourly_price(hour, KilowattHours(demand));
                assert!(price >= PRICE_FLOOR, "hour {hour}: {price}");
                assert!(price <= PRICE_CEILING, "hour {hour}: {price}");
            }
        }
    }

    #[test]
    fn deterministic() {
        assert_eq!(
            hourly_price(18, KilowattHours(1.5)),
            hourly_price(18, KilowattHours(1.5))
        );
    }
}
