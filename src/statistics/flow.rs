use std::ops::Mul;

use chrono::TimeDelta;
use derive_more::AddAssign;

use crate::quantity::{energy::WattHours, power::Watts};

/// Generic bidirectional power or energy flow.
#[must_use]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, AddAssign)]
pub struct Flow<T> {
    /// Importing from grid or charging the battery.
    pub import: T,

    /// Exporting to the grid or discharging the battery.
    pub export: T,
}

impl<T: Copy> Flow<T> {
    /// Get the reversed flow where the import becomes export and vice versa.
    pub const fn reversed(self) -> Self {
        Self { import: self.export, export: self.import }
    }
}

impl Flow<Watts> {
    /// Split a signed reading where positive values mean import (battery charging).
    pub fn importing_positive(power: Watts) -> Self {
        Self { import: power.max(Watts::ZERO), export: (-power).max(Watts::ZERO) }
    }

    /// Split a signed reading where positive values mean export (grid feed-in).
    pub fn exporting_positive(power: Watts) -> Self {
        Self::importing_positive(power).reversed()
    }
}

impl Mul<TimeDelta> for Flow<Watts> {
    type Output = Flow<WattHours>;

    fn mul(self, time_delta: TimeDelta) -> Self::Output {
        Flow { import: self.import * time_delta, export: self.export * time_delta }
    }
}
