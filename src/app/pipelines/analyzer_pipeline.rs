use crate::app::report;
use crate::config::toml_config::AnalyzerConfig;
use crate::core::aggregate::{
    chart_data, dataset_overview, province_ranking, region_distribution, zone_distribution,
    zone_summaries, ChartData, DatasetOverview, Share, ZoneSummary,
};
use crate::core::export::{export_reported, ExportFormat};
use crate::core::raster::{rasterize_with, Grid};
use crate::core::store::RecordStore;
use crate::core::{DistrictRecord, Pipeline, RecordSource, Storage};
use crate::utils::error::Result;

/// Everything the default report shows, computed once.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub records: Vec<DistrictRecord>,
    pub overview: DatasetOverview,
    pub ranking: Vec<Share>,
    pub regions: Vec<Share>,
    pub zones: Vec<ZoneSummary>,
    pub zone_shares: Vec<Share>,
    pub charts: ChartData,
    pub map: Grid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub format: ExportFormat,
    pub succeeded: bool,
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub text: String,
    pub exports: Vec<ExportOutcome>,
}

impl AnalysisOutcome {
    pub fn all_exports_succeeded(&self) -> bool {
        self.exports.iter().all(|e| e.succeeded)
    }
}

/// Full analysis: overview, provinces, zones, charts and map, followed by
/// the exports listed in `[export]`.
pub struct AnalyzerPipeline<S: Storage> {
    source: Box<dyn RecordSource>,
    storage: S,
    config: AnalyzerConfig,
}

impl<S: Storage> AnalyzerPipeline<S> {
    pub fn new(source: Box<dyn RecordSource>, storage: S, config: AnalyzerConfig) -> Self {
        Self {
            source,
            storage,
            config,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: Storage> Pipeline for AnalyzerPipeline<S> {
    type Transformed = AnalysisReport;
    type Output = AnalysisOutcome;

    fn extract(&self) -> Result<Vec<DistrictRecord>> {
        tracing::info!("📊 Loading districts from {}", self.source.describe());
        let store = RecordStore::from_source(self.source.as_ref())?;
        Ok(store.into_records())
    }

    fn transform(&self, records: Vec<DistrictRecord>) -> Result<AnalysisReport> {
        let charts = &self.config.charts;
        let report = AnalysisReport {
            overview: dataset_overview(&records),
            ranking: province_ranking(&records),
            regions: region_distribution(&records),
            zones: zone_summaries(&records),
            zone_shares: zone_distribution(&records),
            charts: chart_data(&records, charts.top_provinces, charts.histogram_bins),
            map: rasterize_with(&records, &self.config.raster),
            records,
        };
        tracing::debug!(
            "🔄 {} provinces, {} zones, {} districts on the map",
            report.ranking.len(),
            report.zones.len(),
            report.map.plotted
        );
        Ok(report)
    }

    fn load(&self, report: AnalysisReport) -> Result<AnalysisOutcome> {
        let mut text = String::new();
        text.push_str(&report::render_overview(&report.overview));
        text.push_str(&report::render_province_analysis(&report.ranking, &report.regions));
        text.push_str(&report::render_zone_analysis(&report.zones, &report.zone_shares));
        text.push_str(&report::render_charts(&report.charts, self.config.charts.bar_width));
        text.push_str(&report::render_map(&report.map, &self.config.raster));

        let mut exports = Vec::new();
        for format in self.config.export_formats()? {
            let succeeded = export_reported(
                &report.records,
                format.name(),
                &self.storage,
                &self.config.output.base_name,
                self.config.export_filters(),
            );
            exports.push(ExportOutcome { format, succeeded });
        }

        Ok(AnalysisOutcome { text, exports })
    }
}
