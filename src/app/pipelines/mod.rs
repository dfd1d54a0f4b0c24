pub mod analyzer_pipeline;
pub mod webmap_pipeline;

pub use analyzer_pipeline::{AnalysisOutcome, AnalysisReport, AnalyzerPipeline, ExportOutcome};
pub use webmap_pipeline::{BundleSummary, WebMapBundle, WebMapPipeline};
