use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::{
    api::tigo::{AggregateEnergy, BarView, Dataset, InstantMetrics, LastValueField, ObjectTypeId},
    quantity::{percentage::Percentage, power::Watts},
    statistics::{EnergyAccumulators, PowerSample},
};

/// Value together with the instant it was fetched at.
#[must_use]
#[derive(Clone, Debug)]
pub struct Stamped<T> {
    pub value: T,
    pub fetched_at: DateTime<Utc>,
}

impl<T> Stamped<T> {
    pub const fn new(value: T, fetched_at: DateTime<Utc>) -> Self {
        Self { value, fetched_at }
    }
}

/// Everything fetched so far.
///
/// A successful sub-fetch overwrites its own field, a failed one leaves the previous value in place.
#[must_use]
#[derive(Default)]
pub struct Snapshot {
    pub energy: Option<Stamped<AggregateEnergy>>,
    pub last_values: BTreeMap<LastValueField, Stamped<Dataset>>,
    pub instant: Option<Stamped<InstantReadings>>,
    pub energy_totals: Option<Stamped<EnergyAccumulators>>,
    pub bars: BTreeMap<BarView, Stamped<f64>>,
    pub lifetime_energy: Option<Stamped<f64>>,
}

/// Site-level instantaneous readings.
///
/// Replaced as a whole, so a metric missing from a successful response is cleared.
#[must_use]
#[derive(Clone, Debug, Default)]
pub struct InstantReadings {
    pub grid_power: Option<Watts>,
    pub home_power: Option<Watts>,
    pub battery_percentage: Option<Percentage>,
    pub battery_power: Option<Watts>,
    pub solar_power: Option<Watts>,
    pub object_types: BTreeMap<u16, Option<f64>>,
    pub is_data_available: bool,
    pub time: Option<String>,
}

impl From<&InstantMetrics> for InstantReadings {
    fn from(metrics: &InstantMetrics) -> Self {
        Self {
            grid_power: metrics.first(ObjectTypeId::GRID_POWER).map(Watts),
            home_power: metrics.first(ObjectTypeId::HOME_POWER).map(Watts),
            battery_percentage: metrics.first(ObjectTypeId::BATTERY_PERCENTAGE).map(Percentage),
            battery_power: metrics.first(ObjectTypeId::BATTERY_POWER).map(Watts),
            solar_power: metrics.first(ObjectTypeId::SOLAR_POWER).map(Watts),
            object_types: metrics
                .object_types
                .iter()
                .map(|(id, samples)| (*id, samples.first().copied().flatten()))
                .collect(),
            is_data_available: metrics.is_data_available,
            time: metrics.first_time().map(ToOwned::to_owned),
        }
    }
}

impl InstantReadings {
    pub const fn power_sample(&self) -> PowerSample {
        PowerSample {
            solar: self.solar_power,
            home: self.home_power,
            grid: self.grid_power,
            battery: self.battery_power,
        }
    }
}
