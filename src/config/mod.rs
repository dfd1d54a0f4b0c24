pub mod cli;
pub mod toml_config;

use crate::core::export::ExportFilters;
use crate::domain::model::NUMERIC_COLUMNS;
use serde_json::Value;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

/// Splits `FIELD=VALUE`. Values for the numeric columns become numbers when they
/// parse; everything else stays text, so `DPA_PROVIN=09` keeps its leading zero.
pub fn parse_filter(raw: &str) -> std::result::Result<(String, Value), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", raw))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in '{}'", raw));
    }

    let value = value.trim();
    let value = if !NUMERIC_COLUMNS.contains(&field) {
        Value::from(value)
    } else if let Ok(n) = value.parse::<i64>() {
        Value::from(n)
    } else if let Some(n) = value.parse::<f64>().ok().filter(|n| n.is_finite()) {
        Value::from(n)
    } else {
        Value::from(value)
    };
    Ok((field.to_string(), value))
}

pub fn filters_from_pairs(pairs: &[(String, Value)]) -> ExportFilters {
    pairs.iter().cloned().collect()
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "districts")]
#[command(about = "Explore and export Ecuador's educational districts")]
pub struct CliConfig {
    #[arg(long, global = true, default_value = toml_config::DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Load districts from a CSV/TXT or spreadsheet file instead of the built-in table
    #[arg(long, global = true)]
    pub input: Option<String>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log process CPU and memory per phase")]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Dataset overview
    Info,
    /// Province ranking and natural regions
    Provinces,
    /// Administrative zone summary
    Zones,
    /// Case-insensitive search over name, province, canton and address
    Search { term: String },
    /// Districts of one province
    Province { name: String },
    /// Text charts and histograms
    Charts,
    /// ASCII map
    Map,
    /// Write the districts to a file
    Export {
        /// csv, excel, json or geojson
        format: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "output")]
        output: Option<String>,
        /// FIELD=VALUE, repeatable; all filters must match
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, Value)>,
    },
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("config", &self.config)?;
        if let Some(input) = &self.input {
            validate_path("input", input)?;
        }
        match &self.command {
            Some(Command::Search { term }) => validate_non_empty_string("search.term", term),
            Some(Command::Province { name }) => validate_non_empty_string("province.name", name),
            Some(Command::Export { name: Some(name), .. }) => validate_non_empty_string("export.name", name),
            _ => Ok(()),
        }
    }
}

/// Arguments of the web-map bundle generator.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "generate_geojson")]
#[command(about = "Write the GeoJSON layers and companion files of the web map")]
pub struct GeoJsonArgs {
    #[arg(long, default_value = toml_config::DEFAULT_CONFIG_FILE)]
    pub config: String,

    #[arg(long)]
    pub input: Option<String>,

    /// Overrides `output.web_map_directory`
    #[arg(long)]
    pub output: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl Validate for GeoJsonArgs {
    fn validate(&self) -> Result<()> {
        validate_path("config", &self.config)?;
        if let Some(output) = &self.output {
            validate_path("output", output)?;
        }
        Ok(())
    }
}
