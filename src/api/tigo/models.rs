use std::collections::BTreeMap;

use serde::{Deserialize, de::IgnoredAny};
use serde_json::{Map, Value};
use serde_with::{DisplayFromStr, MapSkipError, PickFirst, VecSkipError, serde_as};

use crate::api::tigo::ObjectTypeId;

/// Per-device values keyed by the device's string identifier.
///
/// Entries which are not numbers (`null` for an offline panel, for example) are dropped.
#[must_use]
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Dataset(#[serde_as(as = "MapSkipError<_, PickFirst<(_, DisplayFromStr)>>")] pub BTreeMap<String, f64>);

impl Dataset {
    pub fn get(&self, device_id: &str) -> Option<f64> {
        self.0.get(device_id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Daily aggregate energy response.
#[must_use]
#[serde_as]
#[derive(Clone, Debug, Deserialize)]
pub struct AggregateEnergy {
    #[serde(default)]
    pub dataset: Dataset,

    /// Last observation timestamp per device, like `2025-06-01 12:34:00`.
    #[serde(rename = "datasetLastData", default)]
    #[serde_as(as = "MapSkipError<_, _>")]
    pub last_observed_at: BTreeMap<String, String>,
}

impl AggregateEnergy {
    /// Latest observation time-of-day (`HH:MM`) across all devices.
    pub fn latest_observation_time(&self) -> Option<&str> {
        self.last_observed_at.values().max().and_then(|timestamp| timestamp.get(11..16))
    }
}

/// Response of the «last value» endpoint.
#[must_use]
#[derive(Clone, Debug, Deserialize)]
pub struct LastValue {
    #[serde(default)]
    pub dataset: Dataset,
}

/// Instantaneous aggregate response.
#[must_use]
#[serde_as]
#[derive(Clone, Debug, Deserialize)]
pub struct InstantMetrics {
    #[serde(rename = "objectTypeIds", default)]
    #[serde_as(as = "MapSkipError<DisplayFromStr, VecSkipError<_>>")]
    pub object_types: BTreeMap<u16, Vec<Option<f64>>>,

    #[serde(rename = "dataAvailable", default)]
    pub is_data_available: bool,

    #[serde(default)]
    pub time: Vec<Option<String>>,
}

impl InstantMetrics {
    /// First sample of the metric, if any.
    pub fn first(&self, id: ObjectTypeId) -> Option<f64> {
        self.object_types.get(&id.0)?.first().copied().flatten()
    }

    pub fn first_time(&self) -> Option<&str> {
        self.time.first()?.as_deref()
    }
}

/// `echart` bar chart response.
#[must_use]
#[derive(Clone, Debug, Deserialize)]
pub struct BarChart {
    #[serde(default)]
    pub series: Vec<Series>,
}

impl BarChart {
    pub const SOLAR_TOTAL: &str = "solar_total";

    /// First non-null point of the `solar_total` series, zero when there is none.
    #[must_use]
    pub fn solar_total(&self) -> f64 {
        self.series
            .iter()
            .find(|series| series.id == Self::SOLAR_TOTAL)
            .and_then(|series| series.data.iter().find_map(|point| point.1))
            .unwrap_or(0.0)
    }
}

#[must_use]
#[serde_as]
#[derive(Clone, Debug, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    #[serde_as(as = "VecSkipError<_>")]
    pub data: Vec<Point>,
}

/// Chart point: the category (ignored) and the value.
#[derive(Clone, Debug, Deserialize)]
pub struct Point(pub IgnoredAny, pub Option<f64>);

/// Lifetime summary response.
#[must_use]
#[serde_as]
#[derive(Clone, Debug, Deserialize)]
pub struct Lifetime {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub energy: f64,
}

/// Site topology, cached for the process lifetime.
///
/// Only the fields this crate reads are typed, the rest of every object is kept as is.
#[must_use]
#[derive(Clone, Debug, Deserialize)]
pub struct SiteDescriptor {
    pub system: System,
}

#[must_use]
#[derive(Clone, Debug, Deserialize)]
pub struct System {
    #[serde(default)]
    pub objects: Vec<SystemObject>,
}

#[must_use]
#[derive(Clone, Debug, Deserialize)]
pub struct SystemObject {
    #[serde(rename = "A", default)]
    id: Option<Value>,

    /// Object type discriminator.
    #[serde(rename = "B", default)]
    pub kind: Option<i64>,

    #[serde(rename = "L", default)]
    pub label: Option<String>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl SystemObject {
    pub const PANEL_KIND: i64 = 2;

    pub fn is_panel(&self) -> bool {
        self.kind == Some(Self::PANEL_KIND)
    }

    /// Identifier as used for the dataset keys.
    pub fn id(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

impl SiteDescriptor {
    pub fn panels(&self) -> impl Iterator<Item = &SystemObject> {
        self.system.objects.iter().filter(|object| object.is_panel())
    }
}
