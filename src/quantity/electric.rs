use std::ops::Mul;

use crate::quantity::power::Watts;

quantity!(Volts, "V", "{:.1}");

quantity!(Amperes, "A", "{:.2}");

impl Mul<Amperes> for Volts {
    type Output = Watts;

    fn mul(self, rhs: Amperes) -> Self::Output {
        Watts(self.0 * rhs.0)
    }
}
