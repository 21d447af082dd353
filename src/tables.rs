use chrono::Local;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use itertools::Itertools;

use crate::view::{Reading, ResultView, Summary, SummaryValue};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

fn missing() -> Cell {
    Cell::new("n/a").add_attribute(Attribute::Dim).set_alignment(CellAlignment::Right)
}

#[must_use]
pub fn build_summary_table(view: &ResultView<'_>) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Key", "Value", "Fetched at"]);
    for key in Summary::ALL {
        let value = match view.summary(key) {
            Some(value @ SummaryValue::Power(power)) => Cell::new(value)
                .set_alignment(CellAlignment::Right)
                .fg(if power.0 < 0.0 { Color::Red } else { Color::Reset }),
            Some(value @ SummaryValue::Flag(flag)) => {
                Cell::new(value).fg(if flag { Color::Green } else { Color::Red })
            }
            Some(value) => Cell::new(value).set_alignment(CellAlignment::Right),
            None => missing(),
        };
        let fetched_at = view.fetched_at(key).map_or_else(missing, |fetched_at| {
            Cell::new(fetched_at.with_timezone(&Local).format("%H:%M:%S")).add_attribute(Attribute::Dim)
        });
        table.add_row(vec![Cell::new(key), value, fetched_at]);
    }
    table
}

#[must_use]
pub fn build_devices_table(view: &ResultView<'_>) -> Table {
    let mut table = new_table();
    table.set_header(vec!["ID", "Label", "Other fields"]);
    for device in view.devices() {
        table.add_row(vec![
            device.id().map_or_else(missing, Cell::new),
            device.label.as_deref().map_or_else(missing, Cell::new),
            Cell::new(device.other.keys().join(", ")).add_attribute(Attribute::Dim),
        ]);
    }
    table
}

/// Panels as rows, the selected readings as columns.
#[must_use]
pub fn build_readings_table(view: &ResultView<'_>, readings: &[Reading]) -> Table {
    let mut table = new_table();
    table.set_header(
        ["Panel".to_owned()].into_iter().chain(readings.iter().map(ToString::to_string)).collect_vec(),
    );
    for device in view.devices() {
        let Some(id) = device.id() else {
            continue;
        };
        let label = device.label.clone().unwrap_or_else(|| id.clone());
        let cells = readings.iter().map(|reading| {
            view.reading_for(&id, *reading).map_or_else(missing, |value| {
                Cell::new(format!("{value:.1}")).set_alignment(CellAlignment::Right)
            })
        });
        table.add_row([Cell::new(label).add_attribute(Attribute::Bold)].into_iter().chain(cells).collect_vec());
    }
    table
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        api::tigo::{Dataset, LastValueField, SiteDescriptor},
        prelude::*,
        snapshot::{Snapshot, Stamped},
    };

    // language=json
    const SITE: &str = r#"{"system": {"objects": [{"A": 1001, "B": 2, "L": "A1", "P": 4, "Z": "x"}]}}"#;

    #[test]
    fn test_devices_table_lists_other_fields() -> Result {
        let site: SiteDescriptor = serde_json::from_str(SITE)?;
        let snapshot = Snapshot::default();
        let table = build_devices_table(&ResultView::new(&snapshot, Some(&site))).to_string();
        assert!(table.contains("1001"));
        assert!(table.contains("A1"));
        assert!(table.contains("P, Z"));
        Ok(())
    }

    #[test]
    fn test_readings_table_selected_columns() -> Result {
        let site: SiteDescriptor = serde_json::from_str(SITE)?;
        let fetched_at = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let snapshot = Snapshot {
            last_values: BTreeMap::from([(
                LastValueField::Vin,
                Stamped::new(Dataset(BTreeMap::from([("1001".to_owned(), 36.4)])), fetched_at),
            )]),
            ..Default::default()
        };
        let readings = ["vin".parse::<Reading>()?];
        let table = build_readings_table(&ResultView::new(&snapshot, Some(&site)), &readings).to_string();
        assert!(table.contains("vin"));
        assert!(table.contains("36.4"));
        assert!(!table.contains("energy"));
        Ok(())
    }
}
