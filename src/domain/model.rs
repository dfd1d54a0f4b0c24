use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Column headers in dataset order. Exports and file loaders use these exact spellings.
pub const COLUMNS: [&str; 15] = [
    "COD_DISTRI",
    "NOM_DISTRI",
    "DIRECCION",
    "DPA_PARROQ",
    "DPA_DESPAR",
    "DPA_CANTON",
    "DPA_DESCAN",
    "DPA_PROVIN",
    "DPA_DESPRO",
    "ZONA",
    "NMT_25",
    "COMPLEMENT",
    "Capital_Pr",
    "Latitud",
    "Longitud",
];

/// Columns holding numbers; every other column is text, codes included.
pub const NUMERIC_COLUMNS: [&str; 3] = ["ZONA", "Latitud", "Longitud"];

/// Flag value marking a district seated in a provincial capital (case-sensitive).
pub const CAPITAL_YES: &str = "SI";
pub const CAPITAL_NO: &str = "NO";

/// One educational district. Codes are not unique across the dataset.
///
/// Numeric columns are optional: a value that cannot be parsed on load is kept
/// as `None` rather than rejecting the row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DistrictRecord {
    #[serde(rename = "COD_DISTRI", default)]
    pub code: String,
    #[serde(rename = "NOM_DISTRI", default)]
    pub name: String,
    #[serde(rename = "DIRECCION", default)]
    pub address: String,
    #[serde(rename = "DPA_PARROQ", default)]
    pub parish_code: String,
    #[serde(rename = "DPA_DESPAR", default)]
    pub parish_name: String,
    #[serde(rename = "DPA_CANTON", default)]
    pub canton_code: String,
    #[serde(rename = "DPA_DESCAN", default)]
    pub canton_name: String,
    #[serde(rename = "DPA_PROVIN", default)]
    pub province_code: String,
    #[serde(rename = "DPA_DESPRO", default)]
    pub province_name: String,
    #[serde(rename = "ZONA", default, deserialize_with = "lenient_zone")]
    pub zone: Option<u32>,
    #[serde(rename = "NMT_25", default)]
    pub kind: String,
    #[serde(rename = "COMPLEMENT", default)]
    pub source: String,
    #[serde(rename = "Capital_Pr", default)]
    pub capital_flag: String,
    #[serde(rename = "Latitud", default, deserialize_with = "csv::invalid_option")]
    pub latitude: Option<f64>,
    #[serde(rename = "Longitud", default, deserialize_with = "csv::invalid_option")]
    pub longitude: Option<f64>,
}

impl DistrictRecord {
    pub fn is_capital(&self) -> bool {
        self.capital_flag == CAPITAL_YES
    }

    /// `(latitude, longitude)` when both are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// Value of a column by header name, numbers as JSON numbers, the rest as text.
    /// Unknown column names yield `None`.
    pub fn field_value(&self, column: &str) -> Option<Value> {
        let text = |s: &str| Some(Value::String(s.to_string()));
        match column {
            "COD_DISTRI" => text(&self.code),
            "NOM_DISTRI" => text(&self.name),
            "DIRECCION" => text(&self.address),
            "DPA_PARROQ" => text(&self.parish_code),
            "DPA_DESPAR" => text(&self.parish_name),
            "DPA_CANTON" => text(&self.canton_code),
            "DPA_DESCAN" => text(&self.canton_name),
            "DPA_PROVIN" => text(&self.province_code),
            "DPA_DESPRO" => text(&self.province_name),
            "ZONA" => Some(self.zone.map(Value::from).unwrap_or(Value::Null)),
            "NMT_25" => text(&self.kind),
            "COMPLEMENT" => text(&self.source),
            "Capital_Pr" => text(&self.capital_flag),
            "Latitud" => Some(number_or_null(self.latitude)),
            "Longitud" => Some(number_or_null(self.longitude)),
            _ => None,
        }
    }

    /// Assigns a column from raw cell text. Numeric columns that fail to parse become `None`.
    /// Returns `false` for an unknown column name.
    pub fn set_field(&mut self, column: &str, raw: &str) -> bool {
        let raw = raw.trim();
        match column {
            "COD_DISTRI" => self.code = raw.to_string(),
            "NOM_DISTRI" => self.name = raw.to_string(),
            "DIRECCION" => self.address = raw.to_string(),
            "DPA_PARROQ" => self.parish_code = raw.to_string(),
            "DPA_DESPAR" => self.parish_name = raw.to_string(),
            "DPA_CANTON" => self.canton_code = raw.to_string(),
            "DPA_DESCAN" => self.canton_name = raw.to_string(),
            "DPA_PROVIN" => self.province_code = raw.to_string(),
            "DPA_DESPRO" => self.province_name = raw.to_string(),
            "ZONA" => self.zone = parse_zone(raw),
            "NMT_25" => self.kind = raw.to_string(),
            "COMPLEMENT" => self.source = raw.to_string(),
            "Capital_Pr" => self.capital_flag = raw.to_string(),
            "Latitud" => self.latitude = raw.parse().ok().filter(|v: &f64| v.is_finite()),
            "Longitud" => self.longitude = raw.parse().ok().filter(|v: &f64| v.is_finite()),
            _ => return false,
        }
        true
    }

    /// Number of empty text columns plus absent numeric columns.
    pub fn missing_values(&self) -> usize {
        COLUMNS
            .iter()
            .filter(|column| match self.field_value(column) {
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(Value::Null) | None => true,
                Some(_) => false,
            })
            .count()
    }
}

// 試算表常把區域存成 8.0
fn parse_zone(raw: &str) -> Option<u32> {
    raw.parse::<u32>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().and_then(whole_zone))
}

fn whole_zone(value: f64) -> Option<u32> {
    (value.fract() == 0.0 && value >= 0.0 && value <= u32::MAX as f64).then_some(value as u32)
}

/// `ZONA` as written by either loader: `8`, `8.0` or `"8"` all give zone 8.
/// Anything else degrades to `None` instead of failing the row.
fn lenient_zone<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let zone = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .or_else(|| n.as_f64().and_then(whole_zone)),
        Some(Value::String(s)) => parse_zone(s.trim()),
        _ => None,
    };
    Ok(zone)
}

fn number_or_null(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Natural region derived from coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Coast,
    Sierra,
    Amazon,
    Galapagos,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Coast, Region::Sierra, Region::Amazon, Region::Galapagos];

    pub fn label(&self) -> &'static str {
        match self {
            Region::Coast => "COAST",
            Region::Sierra => "SIERRA",
            Region::Amazon => "AMAZON",
            Region::Galapagos => "GALAPAGOS",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
