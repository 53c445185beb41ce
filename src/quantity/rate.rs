quantity!(KilowattHourRate, "€/kWh", "{:.3}");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp() {
        let (floor, ceiling) = (KilowattHourRate(0.20), KilowattHourRate(0.50));
        assert_eq!(KilowattHourRate(0.10).clamp(floor, ceiling), floor);
        assert_eq!(KilowattHourRate(0.60).clamp(floor, ceiling), ceiling);
        assert_eq!(KilowattHourRate(0.30).clamp(floor, ceiling), KilowattHourRate(0.30));
    }
}
