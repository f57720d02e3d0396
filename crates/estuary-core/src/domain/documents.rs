use std::collections::BTreeMap;

use serde::Serialize;

use super::{IsoDate, Scalar};

/// Record of field name to scalar, one row of a history table.
pub type FieldRecord = BTreeMap<String, Scalar>;

/// `{info, hist}`-shaped document produced by the rate and ticker pipelines.
///
/// `hist` is keyed by ISO date; the `BTreeMap` guarantees unique keys in
/// ascending chronological order. `info` reflects the most recent observation
/// when both sections derive from the same table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesDocument {
    pub info: FieldRecord,
    pub hist: BTreeMap<IsoDate, FieldRecord>,
}

impl SeriesDocument {
    pub fn new(info: FieldRecord, hist: BTreeMap<IsoDate, FieldRecord>) -> Self {
        Self { info, hist }
    }

    /// Chronologically last history entry.
    pub fn latest(&self) -> Option<(&IsoDate, &FieldRecord)> {
        self.hist.iter().next_back()
    }
}

/// Point-in-time counter snapshot produced by the epidemic pipeline.
///
/// Counter values are kept as the upstream page renders them (grouped
/// strings such as `"704,753,890"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterDocument {
    pub country: String,
    pub cases: String,
    pub deaths: String,
    pub recovered: String,
}

/// Resolved latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityBlock {
    pub city: String,
}

/// One observation or forecast step: temperature, textual condition, wind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionBlock {
    pub temp: f64,
    pub description: String,
    pub wind: f64,
}

/// Four-block document produced by the weather pipeline.
///
/// Forecast keys are the provider's timestamp strings
/// (`YYYY-MM-DD HH:MM:SS`), which sort chronologically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherDocument {
    pub city: CityBlock,
    pub position: Coordinate,
    pub current: ConditionBlock,
    pub forecast: BTreeMap<String, ConditionBlock>,
}

/// Canonical pipeline output, serialized verbatim by the query gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    Series(SeriesDocument),
    Counters(CounterDocument),
    Weather(WeatherDocument),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, f64)]) -> FieldRecord {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), Scalar::Number(*value)))
            .collect()
    }

    #[test]
    fn history_iterates_in_ascending_date_order() {
        let mut hist = BTreeMap::new();
        hist.insert(
            IsoDate::parse("2023-01-26").expect("valid"),
            record(&[("Base rate", 13.0)]),
        );
        hist.insert(
            IsoDate::parse("2023-01-01").expect("valid"),
            record(&[("Base rate", 13.0)]),
        );

        let document = SeriesDocument::new(FieldRecord::new(), hist);
        let keys: Vec<_> = document.hist.keys().map(IsoDate::as_str).collect();
        assert_eq!(keys, ["2023-01-01", "2023-01-26"]);

        let (latest, _) = document.latest().expect("history is non-empty");
        assert_eq!(latest.as_str(), "2023-01-26");
    }

    #[test]
    fn series_document_serializes_with_info_and_hist_keys() {
        let mut hist = BTreeMap::new();
        hist.insert(
            IsoDate::parse("2023-01-01").expect("valid"),
            record(&[("Base rate", 13.0)]),
        );
        let document = SeriesDocument::new(record(&[("Base rate", 13.0)]), hist);

        let json = serde_json::to_value(&document).expect("document serializes");
        assert!(json.get("info").is_some());
        assert_eq!(
            json["hist"]["2023-01-01"]["Base rate"],
            serde_json::json!(13.0)
        );
    }
}
