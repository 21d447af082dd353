//! Read-only accessors over the latest snapshot.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use chrono::{DateTime, Utc};

use crate::{
    api::tigo::{BarView, Dataset, LastValueField, SiteDescriptor, SystemObject},
    prelude::*,
    quantity::{energy::WattHours, percentage::Percentage, power::Watts},
    snapshot::Snapshot,
    statistics::Channel,
};

/// Per-device series.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Reading {
    /// Today's aggregate energy.
    Energy,

    LastValue(LastValueField),
}

impl Reading {
    pub const ALL: [Self; 9] = [
        Self::Energy,
        Self::LastValue(LastValueField::Pin),
        Self::LastValue(LastValueField::Rssi),
        Self::LastValue(LastValueField::Pwm),
        Self::LastValue(LastValueField::Temp),
        Self::LastValue(LastValueField::Vin),
        Self::LastValue(LastValueField::Vout),
        Self::LastValue(LastValueField::Iin),
        Self::LastValue(LastValueField::ReclaimedPower),
    ];
}

impl Display for Reading {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Energy => write!(f, "energy"),
            Self::LastValue(field) => write!(f, "{field}"),
        }
    }
}

impl FromStr for Reading {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|reading| reading.to_string() == name)
            .ok_or_else(|| anyhow!("unknown reading `{name}`"))
    }
}

/// Site-level scalar.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum Summary {
    #[display("grid_power")]
    GridPower,

    #[display("home_power")]
    HomePower,

    #[display("battery_percentage")]
    BatteryPercentage,

    #[display("battery_power")]
    BatteryPower,

    #[display("solar_power")]
    SolarPower,

    #[display("data_available")]
    DataAvailable,

    #[display("solar_energy")]
    SolarEnergy,

    #[display("home_energy")]
    HomeEnergy,

    #[display("grid_import")]
    GridImport,

    #[display("grid_export")]
    GridExport,

    #[display("battery_charge")]
    BatteryCharge,

    #[display("battery_discharge")]
    BatteryDischarge,

    #[display("now")]
    Now,

    #[display("hour")]
    Hour,

    #[display("day")]
    Day,

    #[display("month")]
    Month,

    #[display("year")]
    Year,

    #[display("all_time")]
    AllTime,
}

impl Summary {
    pub const ALL: [Self; 18] = [
        Self::GridPower,
        Self::HomePower,
        Self::BatteryPercentage,
        Self::BatteryPower,
        Self::SolarPower,
        Self::DataAvailable,
        Self::SolarEnergy,
        Self::HomeEnergy,
        Self::GridImport,
        Self::GridExport,
        Self::BatteryCharge,
        Self::BatteryDischarge,
        Self::Now,
        Self::Hour,
        Self::Day,
        Self::Month,
        Self::Year,
        Self::AllTime,
    ];

    /// Integrated energy channel behind the key, if it is one.
    pub const fn channel(self) -> Option<Channel> {
        match self {
            Self::SolarEnergy => Some(Channel::SolarEnergy),
            Self::HomeEnergy => Some(Channel::HomeEnergy),
            Self::GridImport => Some(Channel::GridImport),
            Self::GridExport => Some(Channel::GridExport),
            Self::BatteryCharge => Some(Channel::BatteryCharge),
            Self::BatteryDischarge => Some(Channel::BatteryDischarge),
            _ => None,
        }
    }

    pub const fn bar_view(self) -> Option<BarView> {
        match self {
            Self::Now => Some(BarView::Now),
            Self::Hour => Some(BarView::Hour),
            Self::Day => Some(BarView::Day),
            Self::Month => Some(BarView::Month),
            Self::Year => Some(BarView::Year),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SummaryValue {
    Power(Watts),
    Energy(WattHours),
    Percentage(Percentage),

    /// Value in upstream units.
    Number(f64),

    Flag(bool),
}

impl Display for SummaryValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Power(power) => write!(f, "{power}"),
            Self::Energy(energy) => write!(f, "{energy}"),
            Self::Percentage(percentage) => write!(f, "{percentage}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Flag(true) => write!(f, "yes"),
            Self::Flag(false) => write!(f, "no"),
        }
    }
}

/// Pure view: no network calls, no mutation.
#[derive(Copy, Clone)]
pub struct ResultView<'a> {
    snapshot: &'a Snapshot,
    site: Option<&'a SiteDescriptor>,
}

impl<'a> ResultView<'a> {
    pub const fn new(snapshot: &'a Snapshot, site: Option<&'a SiteDescriptor>) -> Self {
        Self { snapshot, site }
    }

    pub fn reading(&self, reading: Reading) -> Option<&'a Dataset> {
        match reading {
            Reading::Energy => self.snapshot.energy.as_ref().map(|energy| &energy.value.dataset),
            Reading::LastValue(field) => {
                self.snapshot.last_values.get(&field).map(|stamped| &stamped.value)
            }
        }
    }

    pub fn reading_for(&self, device_id: &str, reading: Reading) -> Option<f64> {
        self.reading(reading)?.get(device_id)
    }

    pub fn summary(&self, key: Summary) -> Option<SummaryValue> {
        if let Some(channel) = key.channel() {
            let totals = self.snapshot.energy_totals.as_ref()?;
            return Some(SummaryValue::Energy(totals.value.get(channel)));
        }
        if let Some(view) = key.bar_view() {
            return self.snapshot.bars.get(&view).map(|bar| SummaryValue::Number(bar.value));
        }
        if key == Summary::AllTime {
            return self.snapshot.lifetime_energy.as_ref().map(|it| SummaryValue::Number(it.value));
        }
        let instant = &self.snapshot.instant.as_ref()?.value;
        match key {
            Summary::GridPower => instant.grid_power.map(SummaryValue::Power),
            Summary::HomePower => instant.home_power.map(SummaryValue::Power),
            Summary::BatteryPower => instant.battery_power.map(SummaryValue::Power),
            Summary::SolarPower => instant.solar_power.map(SummaryValue::Power),
            Summary::BatteryPercentage => instant.battery_percentage.map(SummaryValue::Percentage),
            Summary::DataAvailable => Some(SummaryValue::Flag(instant.is_data_available)),
            _ => None,
        }
    }

    /// When the value behind the key was last fetched.
    pub fn fetched_at(&self, key: Summary) -> Option<DateTime<Utc>> {
        if key.channel().is_some() {
            return self.snapshot.energy_totals.as_ref().map(|it| it.fetched_at);
        }
        if let Some(view) = key.bar_view() {
            return self.snapshot.bars.get(&view).map(|bar| bar.fetched_at);
        }
        if key == Summary::AllTime {
            return self.snapshot.lifetime_energy.as_ref().map(|it| it.fetched_at);
        }
        self.snapshot.instant.as_ref().map(|it| it.fetched_at)
    }

    /// Panels of the site, empty until the site descriptor is fetched.
    pub fn devices(&self) -> Vec<&'a SystemObject> {
        self.site.map_or_else(Vec::new, |site| site.panels().collect())
    }
}
