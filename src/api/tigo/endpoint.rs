use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use itertools::Itertools;

/// Upstream path together with its query.
#[must_use]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Endpoint {
    pub path: &'static str,
    pub query: Vec<(&'static str, String)>,
}

impl Endpoint {
    /// Site topology: panels, inverters and the rest of the system objects.
    pub fn system_config(system_id: &str) -> Self {
        Self {
            path: "/system/summary/config",
            query: vec![
                ("system_id", system_id.to_owned()),
                ("resourceId", "config".to_owned()),
                ("v", "0.1.0".to_owned()),
                ("_", "0".to_owned()),
            ],
        }
    }

    /// Daily per-panel energy.
    pub fn aggregate_energy(system_id: &str, date: NaiveDate) -> Self {
        Self {
            path: "/api/v4/system/summary/aggenergy",
            query: vec![("system_id", system_id.to_owned()), ("date", date.to_string())],
        }
    }

    /// Per-panel values of the field at the observation time (`HH:MM`).
    pub fn last_value(
        system_id: &str,
        date: NaiveDate,
        field: LastValueField,
        observed_at: &str,
    ) -> Self {
        Self {
            path: "/api/v4/system/summary/lastvalue",
            query: vec![
                ("system_id", system_id.to_owned()),
                ("resourceId", format!("lastValue-{date}-{field}-{observed_at}")),
                ("v", "0.1.0".to_owned()),
                ("_", "0".to_owned()),
            ],
        }
    }

    /// Instantaneous site-level metrics.
    pub fn instant_metrics(system_id: &str, object_types: &[ObjectTypeId]) -> Self {
        let mut query = vec![("systemId", system_id.to_owned()), ("aggregate", "now".to_owned())];
        query.extend(object_types.iter().map(|id| ("objectTypeIds[]", id.to_string())));
        Self { path: "/api/v4/data/aggregate", query }
    }

    /// Generation bar chart for the date at the given granularity.
    pub fn bar_chart(system_id: &str, view: BarView, date: NaiveDate) -> Self {
        Self {
            path: "/api/v4/data/aggregate",
            query: vec![
                ("systemId", system_id.to_owned()),
                ("view", "gen".to_owned()),
                ("output", "echart".to_owned()),
                ("type", "bar".to_owned()),
                ("agg", view.to_string()),
                ("start", date.to_string()),
                ("end", date.to_string()),
                ("reclaimed", "true".to_owned()),
            ],
        }
    }

    /// Lifetime totals of the site.
    pub fn lifetime(system_id: &str) -> Self {
        Self {
            path: "/fleet/system/overview/data-lifetime",
            query: vec![("sysid", system_id.to_owned()), ("range", "lifetime".to_owned())],
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)?;
        if !self.query.is_empty() {
            let query = self.query.iter().map(|(key, value)| format!("{key}={value}")).join("&");
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

/// Per-panel field served by the «last value» endpoint.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, derive_more::Display)]
pub enum LastValueField {
    #[display("pin")]
    Pin,

    #[display("rssi")]
    Rssi,

    #[display("pwm")]
    Pwm,

    #[display("temp")]
    Temp,

    #[display("vin")]
    Vin,

    #[display("vout")]
    Vout,

    #[display("iin")]
    Iin,

    #[display("reclaimedPower")]
    ReclaimedPower,
}

impl LastValueField {
    pub const ALL: [Self; 8] = [
        Self::Pin,
        Self::Rssi,
        Self::Pwm,
        Self::Temp,
        Self::Vin,
        Self::Vout,
        Self::Iin,
        Self::ReclaimedPower,
    ];
}

/// Bar chart granularity.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, derive_more::Display)]
pub enum BarView {
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
}

impl BarView {
    pub const ALL: [Self; 5] = [Self::Now, Self::Hour, Self::Day, Self::Month, Self::Year];
}

/// Metric identifier of the instantaneous aggregate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, derive_more::Display)]
pub struct ObjectTypeId(pub u16);

impl ObjectTypeId {
    /// Net grid power, positive when exporting.
    pub const GRID_POWER: Self = Self(14);

    pub const HOME_POWER: Self = Self(36);

    pub const BATTERY_PERCENTAGE: Self = Self(46);

    /// Net battery power, positive when charging.
    pub const BATTERY_POWER: Self = Self(56);

    pub const SOLAR_POWER: Self = Self(62);

    /// Everything the dashboard requests in a single «now» call.
    pub const INSTANT: [Self; 8] = [
        Self::GRID_POWER,
        Self(32),
        Self::HOME_POWER,
        Self::BATTERY_PERCENTAGE,
        Self::BATTERY_POWER,
        Self(58),
        Self::SOLAR_POWER,
        Self(57),
    ];
}
