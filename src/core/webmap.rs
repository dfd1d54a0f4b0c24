//! Companion files of the web map: the `config.js` settings object and the
//! static instructions page.

use chrono::Utc;
use serde::{Deserialize, Serialize};

pub const DISTRICTS_FILE: &str = "distritos.geojson";
pub const INSTITUTIONS_FILE: &str = "sample_instituciones.geojson";
pub const PROVINCES_FILE: &str = "sample_provincias.geojson";
pub const CONFIG_FILE: &str = "config.js";
pub const INSTRUCTIONS_FILE: &str = "instrucciones.html";

pub const INSTRUCTIONS_HTML: &str = include_str!("../../data/instrucciones.html");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapView {
    /// `[lat, lon]`, the order Leaflet expects.
    pub center: [f64; 2],
    pub zoom: u8,
    pub max_zoom: u8,
    pub min_zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: [-1.8312, -78.1834],
            zoom: 6,
            max_zoom: 18,
            min_zoom: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", default)]
pub struct Palette {
    pub fiscal: String,
    pub particular: String,
    pub fiscomisional: String,
    pub default: String,
    pub distrito: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            fiscal: "#2e7d32".to_string(),
            particular: "#d32f2f".to_string(),
            fiscomisional: "#f57c00".to_string(),
            default: "#1976d2".to_string(),
            distrito: "#ff5722".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterOptions {
    pub max_cluster_radius: u32,
    pub show_coverage_on_hover: bool,
    pub chunked_loading: bool,
    pub animate: bool,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            max_cluster_radius: 50,
            show_coverage_on_hover: false,
            chunked_loading: true,
            animate: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFiles {
    pub distritos: String,
    pub instituciones: String,
    pub provincias: String,
}

impl Default for DataFiles {
    fn default() -> Self {
        Self {
            distritos: format!("data/{}", DISTRICTS_FILE),
            instituciones: format!("data/{}", INSTITUTIONS_FILE),
            provincias: format!("data/{}", PROVINCES_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PopupOptions {
    pub max_width: u32,
    pub close_button: bool,
    pub auto_pan: bool,
}

impl Default for PopupOptions {
    fn default() -> Self {
        Self {
            max_width: 350,
            close_button: true,
            auto_pan: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Messages {
    pub no_data: String,
    pub load_error: String,
    pub no_instituciones: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            no_data: "No se encontraron datos para mostrar".to_string(),
            load_error: "Error al cargar los datos del mapa".to_string(),
            no_instituciones:
                "Para ver todas las instituciones educativas, sube el archivo instituciones.geojson completo"
                    .to_string(),
        }
    }
}

/// Settings object the map viewer reads from `config.js`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebMapConfig {
    pub map: MapView,
    pub colors: Palette,
    pub cluster: ClusterOptions,
    pub data_files: DataFiles,
    pub popup: PopupOptions,
    pub messages: Messages,
}

impl WebMapConfig {
    /// `const CONFIG = {...};` followed by a CommonJS export guard.
    pub fn render_config_js(&self) -> serde_json::Result<String> {
        let body = serde_json::to_string_pretty(self)?;
        Ok(format!(
            "// Configuración del mapa educativo Ecuador\n\
             // Generado: {}\n\n\
             const CONFIG = {};\n\n\
             if (typeof module !== 'undefined' && module.exports) {{\n    module.exports = CONFIG;\n}}\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            body
        ))
    }
}
