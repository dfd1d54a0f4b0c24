//! Record Store and its loaders.
//!
//! The embedded table ships inside the binary as `data/districts.csv`; file
//! loaders read the same columns from delimited text or a spreadsheet. All
//! loaders sit behind [`RecordSource`].

use crate::domain::model::DistrictRecord;
use crate::domain::ports::RecordSource;
use crate::utils::error::LoadError;
use calamine::{open_workbook_auto, Data, Reader};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

const EMBEDDED_DISTRICTS: &str = include_str!("../../data/districts.csv");

/// Columns a file must carry for its rows to be placeable on a map.
pub const REQUIRED_COLUMNS: [&str; 3] = ["COD_DISTRI", "Latitud", "Longitud"];

/// Immutable snapshot of the district table for one process run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    records: Vec<DistrictRecord>,
}

impl RecordStore {
    pub fn new(records: Vec<DistrictRecord>) -> Self {
        Self { records }
    }

    /// The embedded dataset.
    pub fn load() -> Result<Self, LoadError> {
        Self::from_source(&EmbeddedSource)
    }

    pub fn from_source(source: &dyn RecordSource) -> Result<Self, LoadError> {
        source.load().map(Self::new)
    }

    pub fn records(&self) -> &[DistrictRecord] {
        &self.records
    }

    /// Independent copy; changes to it never reach the store.
    pub fn snapshot(&self) -> Vec<DistrictRecord> {
        self.records.clone()
    }

    pub fn into_records(self) -> Vec<DistrictRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record carrying `code`. Codes repeat across provinces, so this is a list.
    pub fn find_by_code(&self, code: &str) -> Vec<&DistrictRecord> {
        self.records.iter().filter(|r| r.code == code).collect()
    }
}

/// Loads from `source`, logging a failure and returning `None` instead of an error.
pub fn load_reported(source: &dyn RecordSource) -> Option<RecordStore> {
    match RecordStore::from_source(source) {
        Ok(store) => {
            tracing::info!("✅ {} districts loaded from {}", store.len(), source.describe());
            Some(store)
        }
        Err(e) => {
            tracing::error!("❌ Could not load {}: {}", source.describe(), e);
            None
        }
    }
}

/// Picks a loader by file extension. Anything that is not a spreadsheet is read as delimited text.
pub fn source_for_path(path: impl Into<PathBuf>) -> Box<dyn RecordSource> {
    let path = path.into();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("xlsx") | Some("xlsm") | Some("xls") | Some("ods") => {
            Box::new(SpreadsheetSource::new(path))
        }
        _ => Box::new(DelimitedFileSource::new(path)),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSource;

impl RecordSource for EmbeddedSource {
    fn describe(&self) -> String {
        "embedded dataset".to_string()
    }

    fn load(&self) -> Result<Vec<DistrictRecord>, LoadError> {
        parse_delimited(EMBEDDED_DISTRICTS, "embedded:districts.csv")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Windows1252,
}

/// Encodings tried in order; the first that decodes wins.
pub const ENCODING_FALLBACKS: [TextEncoding; 3] = [
    TextEncoding::Utf8,
    TextEncoding::Latin1,
    TextEncoding::Windows1252,
];

impl TextEncoding {
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin1",
            TextEncoding::Windows1252 => "cp1252",
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                std::str::from_utf8(bytes).ok().map(str::to_owned)
            }
            // C1 control bytes almost always mean the file is really cp1252
            TextEncoding::Latin1 => {
                if bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
                    None
                } else {
                    Some(bytes.iter().map(|&b| char::from(b)).collect())
                }
            }
            TextEncoding::Windows1252 => encoding_rs::WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(Cow::into_owned),
        }
    }
}

pub fn decode_with_fallback(bytes: &[u8]) -> Option<(String, TextEncoding)> {
    ENCODING_FALLBACKS
        .iter()
        .find_map(|encoding| encoding.decode(bytes).map(|text| (text, *encoding)))
}

/// CSV (or any comma-delimited text) file with the dataset's column headers.
#[derive(Debug, Clone)]
pub struct DelimitedFileSource {
    path: PathBuf,
}

impl DelimitedFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for DelimitedFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Vec<DistrictRecord>, LoadError> {
        let path = self.describe();
        let bytes = read_bytes(&self.path)?;

        let (text, encoding) =
            decode_with_fallback(&bytes).ok_or_else(|| LoadError::Undecodable {
                path: path.clone(),
                tried: ENCODING_FALLBACKS
                    .iter()
                    .map(TextEncoding::name)
                    .collect::<Vec<_>>()
                    .join(", "),
            })?;
        tracing::debug!("Decoded {} as {}", path, encoding.name());

        parse_delimited(&text, &path)
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, LoadError> {
    std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.display().to_string(),
            }
        } else {
            LoadError::Io {
                path: path.display().to_string(),
                source,
            }
        }
    })
}

/// Parses delimited text; rows that do not fit the header are skipped with a warning.
pub fn parse_delimited(text: &str, origin: &str) -> Result<Vec<DistrictRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|source| LoadError::Csv {
            path: origin.to_string(),
            source,
        })?
        .clone();
    check_required_columns(headers.iter(), origin)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (index, row) in reader.deserialize::<DistrictRecord>().enumerate() {
        match row {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                // 第 1 行是標題
                tracing::warn!("⚠️ Skipping line {} of {}: {}", index + 2, origin, e);
            }
        }
    }

    if skipped > 0 {
        tracing::warn!("⚠️ {} malformed rows skipped in {}", skipped, origin);
    }
    tracing::debug!("Parsed {} records from {}", records.len(), origin);
    Ok(records)
}

fn check_required_columns<'a>(
    headers: impl Iterator<Item = &'a str>,
    origin: &str,
) -> Result<(), LoadError> {
    let present: Vec<&str> = headers.collect();
    match REQUIRED_COLUMNS.iter().find(|column| !present.contains(column)) {
        Some(column) => Err(LoadError::MissingColumn {
            path: origin.to_string(),
            column: column.to_string(),
        }),
        None => Ok(()),
    }
}

/// First sheet of a workbook, header row matched to columns by name.
#[derive(Debug, Clone)]
pub struct SpreadsheetSource {
    path: PathBuf,
}

impl SpreadsheetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for SpreadsheetSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Vec<DistrictRecord>, LoadError> {
        let path = self.describe();
        if !self.path.exists() {
            return Err(LoadError::NotFound { path });
        }

        let spreadsheet_error = |message: String| LoadError::Spreadsheet {
            path: path.clone(),
            message,
        };

        let mut workbook =
            open_workbook_auto(&self.path).map_err(|e| spreadsheet_error(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| spreadsheet_error("workbook has no sheets".to_string()))?
            .map_err(|e| spreadsheet_error(e.to_string()))?;

        let mut rows = range.rows();
        let header: Vec<String> = rows
            .next()
            .ok_or_else(|| spreadsheet_error("first sheet is empty".to_string()))?
            .iter()
            .map(cell_text)
            .collect();
        check_required_columns(header.iter().map(String::as_str), &path)?;

        let mut records = Vec::new();
        for row in rows {
            if row.iter().all(|cell| matches!(cell, Data::Empty)) {
                continue;
            }
            let mut record = DistrictRecord::default();
            for (column, cell) in header.iter().zip(row.iter()) {
                record.set_field(column, &cell_text(cell));
            }
            records.push(record);
        }

        tracing::debug!("Read {} rows from {}", records.len(), path);
        Ok(records)
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        // codes typed as numbers come back as floats
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
