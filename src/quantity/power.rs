use std::ops::Mul;

use chrono::TimeDelta;

use crate::quantity::energy::WattHours;

quantity!(Watts, "W", 0);

impl Mul<TimeDelta> for Watts {
    type Output = WattHours;

    fn mul(self, rhs: TimeDelta) -> Self::Output {
        let hours = rhs.as_seconds_f64() / 3600.0;
        WattHours(self.0 * hours)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_watts_times_minute() {
        let energy = Watts(500.0) * TimeDelta::minutes(1);
        assert_abs_diff_eq!(energy.0, 500.0 / 60.0);
    }

    #[test]
    fn test_ordering_and_max() {
        assert!(Watts(-1.0) < Watts::ZERO);
        assert_eq!(Watts(-250.0).max(Watts::ZERO), Watts::ZERO);
    }
}
