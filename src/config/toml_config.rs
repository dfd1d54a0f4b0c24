use crate::core::export::{ExportFilters, ExportFormat};
use crate::core::raster::RasterOptions;
use crate::core::webmap::WebMapConfig;
use crate::utils::error::{AnalyzerError, Result};
use crate::utils::validation::{
    validate_distinct_glyphs, validate_non_empty_string, validate_path, validate_positive_number,
    validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "analyzer.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub output: OutputConfig,
    pub raster: RasterOptions,
    pub charts: ChartsConfig,
    pub export: ExportConfig,
    pub web_map: WebMapConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 匯出檔案目錄
    pub directory: String,
    pub base_name: String,
    /// 網頁地圖資料目錄
    pub web_map_directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
            base_name: "distritos_ecuador".to_string(),
            web_map_directory: "data".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    pub histogram_bins: usize,
    pub top_provinces: usize,
    pub bar_width: usize,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            histogram_bins: 15,
            top_provinces: 10,
            bar_width: 40,
        }
    }
}

/// Exports written after the default report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub formats: Vec<String>,
    pub filters: ExportFilters,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl AnalyzerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AnalyzerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` when it exists, otherwise falls back to defaults.
    pub fn load_optional<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::debug!("📄 Loading configuration from {}", path.display());
            Self::from_file(path)
        } else {
            tracing::debug!("No configuration file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AnalyzerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AnalyzerError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn export_formats(&self) -> Result<Vec<ExportFormat>> {
        self.export
            .formats
            .iter()
            .map(|name| {
                name.parse::<ExportFormat>()
                    .map_err(|_| AnalyzerError::InvalidConfigValueError {
                        field: "export.formats".to_string(),
                        value: name.clone(),
                        reason: format!(
                            "Unsupported format. Valid formats: {}",
                            ExportFormat::ALL
                                .iter()
                                .map(|f| f.name())
                                .collect::<Vec<_>>()
                                .join(", ")
                        ),
                    })
            })
            .collect()
    }

    /// Filters as an `Option`, `None` when no filter is configured.
    pub fn export_filters(&self) -> Option<&ExportFilters> {
        (!self.export.filters.is_empty()).then_some(&self.export.filters)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_path("output.directory", &self.output.directory)?;
        validate_path("output.web_map_directory", &self.output.web_map_directory)?;
        validate_non_empty_string("output.base_name", &self.output.base_name)?;

        validate_positive_number("raster.height", self.raster.height, 1)?;
        validate_positive_number("raster.width", self.raster.width, 1)?;
        validate_distinct_glyphs(
            "raster.glyphs",
            self.raster.capital_glyph,
            self.raster.district_glyph,
        )?;

        validate_range("charts.histogram_bins", self.charts.histogram_bins, 1, 100)?;
        validate_positive_number("charts.top_provinces", self.charts.top_provinces, 1)?;
        validate_range("charts.bar_width", self.charts.bar_width, 1, 200)?;

        self.export_formats()?;

        let view = &self.web_map.map;
        validate_range("web_map.map.minZoom", view.min_zoom, 0, view.max_zoom)?;
        validate_range("web_map.map.zoom", view.zoom, view.min_zoom, view.max_zoom)?;
        validate_range("web_map.map.center[0]", view.center[0], -90.0, 90.0)?;
        validate_range("web_map.map.center[1]", view.center[1], -180.0, 180.0)?;

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }
}

impl Validate for AnalyzerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AnalyzerConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.raster.height, 20);
        assert_eq!(config.raster.width, 40);
        assert_eq!(config.charts.histogram_bins, 15);
        assert_eq!(config.output.web_map_directory, "data");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[output]
directory = "./reports"
base_name = "mi_analisis"

[raster]
height = 10
width = 30
capital_glyph = "C"
district_glyph = "d"

[charts]
top_provinces = 5

[export]
formats = ["csv", "excel"]

[export.filters]
DPA_DESPRO = "guayas"
ZONA = 8

[web_map.map]
zoom = 7

[monitoring]
enabled = true
"#;

        let config = AnalyzerConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output.directory, "./reports");
        assert_eq!(config.output.web_map_directory, "data");
        assert_eq!(config.raster.capital_glyph, 'C');
        assert_eq!(config.charts.top_provinces, 5);
        assert_eq!(config.charts.histogram_bins, 15);
        assert_eq!(
            config.export_formats().unwrap(),
            vec![ExportFormat::Csv, ExportFormat::Excel]
        );
        let filters = config.export_filters().unwrap();
        assert_eq!(filters["DPA_DESPRO"], Value::from("guayas"));
        assert_eq!(filters["ZONA"].as_f64(), Some(8.0));
        assert_eq!(config.web_map.map.zoom, 7);
        assert_eq!(config.web_map.map.max_zoom, 18);
        assert!(config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("DISTRICTS_TEST_OUTPUT_DIR", "/tmp/distritos");

        let toml_content = r#"
[output]
directory = "${DISTRICTS_TEST_OUTPUT_DIR}"
base_name = "${DISTRICTS_TEST_UNSET_VARIABLE}"
"#;

        let config = AnalyzerConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output.directory, "/tmp/distritos");
        assert_eq!(config.output.base_name, "${DISTRICTS_TEST_UNSET_VARIABLE}");

        std::env::remove_var("DISTRICTS_TEST_OUTPUT_DIR");
    }

    #[test]
    fn test_config_validation() {
        let same_glyphs = AnalyzerConfig::from_toml_str(
            r#"
[raster]
capital_glyph = "x"
district_glyph = "x"
"#,
        )
        .unwrap();
        assert!(same_glyphs.validate().is_err());

        let bad_format = AnalyzerConfig::from_toml_str("[export]\nformats = [\"pdf\"]").unwrap();
        let err = bad_format.validate().unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidConfigValueError { ref field, .. } if field == "export.formats"));

        let zero_height = AnalyzerConfig::from_toml_str("[raster]\nheight = 0").unwrap();
        assert!(zero_height.validate().is_err());

        let bad_zoom = AnalyzerConfig::from_toml_str("[web_map.map]\nzoom = 20").unwrap();
        assert!(bad_zoom.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = AnalyzerConfig::from_toml_str("[raster\nheight = 3").unwrap_err();
        assert!(matches!(err, AnalyzerError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\nbase_name = \"desde_archivo\"\n")
            .unwrap();

        let config = AnalyzerConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.base_name, "desde_archivo");

        let missing = AnalyzerConfig::load_optional("/nonexistent/analyzer.toml").unwrap();
        assert_eq!(missing, AnalyzerConfig::default());
    }
}
