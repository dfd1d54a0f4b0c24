pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command, GeoJsonArgs};

pub use app::pipelines::{AnalyzerPipeline, WebMapPipeline};
pub use config::{cli::LocalStorage, toml_config::AnalyzerConfig};
pub use core::{etl::EtlEngine, store::RecordStore};
pub use domain::model::{DistrictRecord, Region};
pub use utils::error::{AnalyzerError, Result};
