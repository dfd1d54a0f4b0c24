//! Exporter: narrows records with optional filters and writes them in one of
//! the supported formats through a [`Storage`].

use crate::core::geojson::flattened_features;
use crate::core::search::contains_ignore_case;
use crate::core::xlsx::{write_workbook, Cell};
use crate::domain::model::{DistrictRecord, COLUMNS};
use crate::domain::ports::Storage;
use crate::utils::error::ExportError;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub const SHEET_NAME: &str = "Distritos";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Excel,
    Json,
    GeoJson,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Csv,
        ExportFormat::Excel,
        ExportFormat::Json,
        ExportFormat::GeoJson,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
            ExportFormat::Json => "json",
            ExportFormat::GeoJson => "geojson",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Json => "json",
            ExportFormat::GeoJson => "geojson",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "json" => Ok(ExportFormat::Json),
            "geojson" => Ok(ExportFormat::GeoJson),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Field name → match value. Text values match as case-insensitive substrings,
/// numbers compare by value (numeric text included), anything else must be equal.
/// Unknown field names are ignored.
pub type ExportFilters = HashMap<String, Value>;

/// Records passing every filter (logical AND). The input is never modified.
pub fn apply_filters(records: &[DistrictRecord], filters: &ExportFilters) -> Vec<DistrictRecord> {
    for field in filters.keys().filter(|field| !COLUMNS.contains(&field.as_str())) {
        tracing::debug!("Ignoring filter on unknown field '{}'", field);
    }

    records
        .iter()
        .filter(|record| {
            filters.iter().all(|(field, expected)| match record.field_value(field) {
                None => true,
                Some(actual) => filter_matches(&actual, expected),
            })
        })
        .cloned()
        .collect()
}

fn filter_matches(actual: &Value, expected: &Value) -> bool {
    match expected {
        Value::String(term) => match actual {
            Value::String(s) => contains_ignore_case(s, term),
            Value::Number(n) => contains_ignore_case(&n.to_string(), term),
            _ => false,
        },
        Value::Number(expected) => {
            let actual = match actual {
                Value::String(s) => s.trim().parse::<f64>().ok(),
                other => other.as_f64(),
            };
            actual.zip(expected.as_f64()).is_some_and(|(a, e)| a == e)
        }
        other => actual == other,
    }
}

/// Writes `records` as `<base_name>.<ext>` and returns how many records were written.
///
/// An empty input still produces a valid file (header-only CSV, `[]`, an empty
/// sheet or an empty feature collection).
pub fn export<S: Storage + ?Sized>(
    records: &[DistrictRecord],
    format: &str,
    storage: &S,
    base_name: &str,
    filters: Option<&ExportFilters>,
) -> Result<usize, ExportError> {
    let format: ExportFormat = format.parse()?;
    let selected = match filters {
        Some(filters) if !filters.is_empty() => apply_filters(records, filters),
        _ => records.to_vec(),
    };

    let (bytes, written) = encode(&selected, format)?;
    let file_name = format!("{}.{}", base_name, format.extension());

    storage
        .write_file(&file_name, &bytes)
        .map_err(|source| ExportError::Io {
            format: format.name().to_string(),
            destination: storage.locate(&file_name),
            source,
        })?;

    tracing::debug!(
        "Wrote {} records ({} bytes) to {}",
        written,
        bytes.len(),
        storage.locate(&file_name)
    );
    Ok(written)
}

/// Same as [`export`] but logs the outcome and reports success as a flag.
pub fn export_reported<S: Storage + ?Sized>(
    records: &[DistrictRecord],
    format: &str,
    storage: &S,
    base_name: &str,
    filters: Option<&ExportFilters>,
) -> bool {
    tracing::info!("💾 Exporting districts as {}...", format.to_uppercase());
    match export(records, format, storage, base_name, filters) {
        Ok(written) => {
            let extension = format
                .parse::<ExportFormat>()
                .map(|f| f.extension())
                .unwrap_or(format);
            tracing::info!(
                "✅ {} records saved to {}",
                written,
                storage.locate(&format!("{}.{}", base_name, extension))
            );
            true
        }
        Err(e) => {
            tracing::error!("❌ Export failed: {}", e);
            false
        }
    }
}

fn encode(records: &[DistrictRecord], format: ExportFormat) -> Result<(Vec<u8>, usize), ExportError> {
    let encode_error = |message: String| ExportError::Encode {
        format: format.name().to_string(),
        message,
    };

    match format {
        ExportFormat::Csv => {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(Vec::new());
            writer
                .write_record(COLUMNS)
                .map_err(|e| encode_error(e.to_string()))?;
            for record in records {
                writer.serialize(record).map_err(|e| encode_error(e.to_string()))?;
            }
            let bytes = writer
                .into_inner()
                .map_err(|e| encode_error(e.to_string()))?;
            Ok((bytes, records.len()))
        }
        ExportFormat::Json => {
            let bytes = serde_json::to_vec_pretty(records).map_err(|e| encode_error(e.to_string()))?;
            Ok((bytes, records.len()))
        }
        ExportFormat::GeoJson => {
            let collection = flattened_features(records);
            let bytes =
                serde_json::to_vec_pretty(&collection).map_err(|e| encode_error(e.to_string()))?;
            Ok((bytes, collection.len()))
        }
        ExportFormat::Excel => {
            let rows: Vec<Vec<Cell>> = records
                .iter()
                .map(|record| {
                    COLUMNS
                        .iter()
                        .map(|column| {
                            record
                                .field_value(column)
                                .map(|value| Cell::from(&value))
                                .unwrap_or(Cell::Empty)
                        })
                        .collect()
                })
                .collect();
            let bytes =
                write_workbook(SHEET_NAME, &COLUMNS, &rows).map_err(|e| encode_error(e.to_string()))?;
            Ok((bytes, records.len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::RecordStore;
    use std::cell::RefCell;

    #[derive(Default)]
    struct MockStorage {
        files: RefCell<HashMap<String, Vec<u8>>>,
        fail_writes: bool,
    }

    impl MockStorage {
        fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.borrow().get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        fn read_file(&self, path: &str) -> std::io::Result<Vec<u8>> {
            self.get_file(path).ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, format!("File not found: {}", path))
            })
        }

        fn write_file(&self, path: &str, data: &[u8]) -> std::io::Result<()> {
            if self.fail_writes {
                return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"));
            }
            self.files.borrow_mut().insert(path.to_string(), data.to_vec());
            Ok(())
        }

        fn locate(&self, path: &str) -> String {
            format!("mock://{}", path)
        }
    }

    fn filters(pairs: &[(&str, Value)]) -> ExportFilters {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_format_names() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("xlsx".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(ExportError::UnsupportedFormat(ref f)) if f == "pdf"
        ));
    }

    #[test]
    fn test_filters_compose_with_and() {
        let store = RecordStore::load().unwrap();
        let selected = apply_filters(
            store.records(),
            &filters(&[("DPA_DESPRO", Value::from("guayas")), ("NMT_25", Value::from("dp"))]),
        );
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].code, "09D05");
    }

    #[test]
    fn test_non_string_filters_use_equality() {
        let store = RecordStore::load().unwrap();
        let zone_two = apply_filters(store.records(), &filters(&[("ZONA", Value::from(2))]));
        assert_eq!(zone_two.len(), 5);
        assert!(zone_two.iter().all(|r| r.zone == Some(2)));

        // "2" as text is a substring match, so zone 2 only
        let text = apply_filters(store.records(), &filters(&[("ZONA", Value::from("2"))]));
        assert_eq!(text.len(), 5);
    }

    #[test]
    fn test_numeric_filter_on_code_column_compares_by_value() {
        let store = RecordStore::load().unwrap();
        let pichincha = apply_filters(store.records(), &filters(&[("DPA_PROVIN", Value::from(17))]));
        assert_eq!(pichincha.len(), 5);

        // 090150 read as a number from TOML is still Guayaquil's parish
        let parish = apply_filters(store.records(), &filters(&[("DPA_PARROQ", Value::from(90150))]));
        assert!(!parish.is_empty());
        assert!(parish.iter().all(|r| r.parish_code == "090150"));
    }

    #[test]
    fn test_unknown_filter_field_is_ignored() {
        let store = RecordStore::load().unwrap();
        let selected = apply_filters(store.records(), &filters(&[("COLOR", Value::from("red"))]));
        assert_eq!(selected.len(), store.len());
    }

    #[test]
    fn test_unsupported_format_writes_nothing() {
        let storage = MockStorage::default();
        let err = export(&[], "pdf", &storage, "out", None).unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFormat(_)));
        assert!(storage.files.borrow().is_empty());
        assert!(!export_reported(&[], "pdf", &storage, "out", None));
    }

    #[test]
    fn test_io_failure_names_format() {
        let storage = MockStorage {
            fail_writes: true,
            ..Default::default()
        };
        let store = RecordStore::load().unwrap();
        let err = export(store.records(), "json", &storage, "out", None).unwrap_err();
        match err {
            ExportError::Io {
                format,
                destination,
                ..
            } => {
                assert_eq!(format, "json");
                assert_eq!(destination, "mock://out.json");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_empty_input_writes_valid_containers() {
        let storage = MockStorage::default();
        for format in ExportFormat::ALL {
            assert_eq!(export(&[], format.name(), &storage, "empty", None).unwrap(), 0);
        }

        let csv = String::from_utf8(storage.get_file("empty.csv").unwrap()).unwrap();
        assert_eq!(csv.trim_end(), COLUMNS.join(","));

        let json: Value = serde_json::from_slice(&storage.get_file("empty.json").unwrap()).unwrap();
        assert_eq!(json, serde_json::json!([]));

        let geojson: Value =
            serde_json::from_slice(&storage.get_file("empty.geojson").unwrap()).unwrap();
        assert_eq!(geojson["type"], "FeatureCollection");
        assert_eq!(geojson["features"], serde_json::json!([]));

        assert!(storage.get_file("empty.xlsx").is_some());
    }

    #[test]
    fn test_json_round_trip_keeps_every_field() {
        let storage = MockStorage::default();
        let store = RecordStore::load().unwrap();
        let written = export(store.records(), "json", &storage, "districts", None).unwrap();
        assert_eq!(written, store.len());

        let reloaded: Vec<DistrictRecord> =
            serde_json::from_slice(&storage.get_file("districts.json").unwrap()).unwrap();
        assert_eq!(reloaded, store.snapshot());
    }

    #[test]
    fn test_csv_export_has_header_and_rows() {
        let storage = MockStorage::default();
        let store = RecordStore::load().unwrap();
        let filter = filters(&[("DPA_DESPRO", Value::from("pichincha"))]);
        let written = export(store.records(), "csv", &storage, "pichincha", Some(&filter)).unwrap();
        assert_eq!(written, 5);

        let content = String::from_utf8(storage.get_file("pichincha.csv").unwrap()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("COD_DISTRI,NOM_DISTRI"));
        assert!(lines[1].starts_with("17D01,CARCELÉN,"));
    }

    #[test]
    fn test_geojson_export_orders_coordinates() {
        let storage = MockStorage::default();
        let record = DistrictRecord {
            code: "09D03".to_string(),
            latitude: Some(-2.19),
            longitude: Some(-79.89),
            ..Default::default()
        };
        export(&[record], "geojson", &storage, "one", None).unwrap();
        let geojson: Value = serde_json::from_slice(&storage.get_file("one.geojson").unwrap()).unwrap();
        assert_eq!(
            geojson["features"][0]["geometry"]["coordinates"],
            serde_json::json!([-79.89, -2.19])
        );
    }
}
