use clap::Parser;
use ecuador_districts::app::report;
use ecuador_districts::config::filters_from_pairs;
use ecuador_districts::core::aggregate::{
    chart_data, dataset_overview, province_ranking, region_distribution, zone_distribution,
    zone_summaries,
};
use ecuador_districts::core::export::{export, ExportFormat};
use ecuador_districts::core::raster::rasterize_with;
use ecuador_districts::core::search::{province_profile, search};
use ecuador_districts::core::store::{load_reported, source_for_path, EmbeddedSource};
use ecuador_districts::core::{RecordSource, Storage};
use ecuador_districts::utils::{logger, validation::Validate};
use ecuador_districts::{
    AnalyzerConfig, AnalyzerPipeline, CliConfig, Command, DistrictRecord, EtlEngine,
    LocalStorage, Result,
};

fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(cli) {
        tracing::error!(
            "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

fn run(cli: CliConfig) -> Result<()> {
    cli.validate()?;

    let config = AnalyzerConfig::load_optional(&cli.config)?;
    config.validate()?;

    let source: Box<dyn RecordSource> = match &cli.input {
        Some(path) => source_for_path(path),
        None => Box::new(EmbeddedSource),
    };

    match cli.command {
        None => {
            let monitor_enabled = cli.monitor || config.monitoring_enabled();
            if monitor_enabled {
                tracing::info!("🔍 System monitoring enabled");
            }
            run_full_report(source, config, monitor_enabled)
        }
        Some(command) => {
            let Some(store) = load_reported(source.as_ref()) else {
                eprintln!("❌ No district data could be loaded");
                std::process::exit(1);
            };
            run_command(command, store.records(), &config)
        }
    }
}

fn run_full_report(source: Box<dyn RecordSource>, config: AnalyzerConfig, monitor_enabled: bool) -> Result<()> {
    println!("🚀 Ecuador educational districts analyzer");

    let storage = LocalStorage::new(config.output.directory.clone());
    let pipeline = AnalyzerPipeline::new(source, storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    let outcome = engine.run()?;
    println!("{}", outcome.text);

    for failed in outcome.exports.iter().filter(|e| !e.succeeded) {
        tracing::warn!("⚠️ Export as {} did not complete", failed.format);
    }
    println!("\n✅ Analysis complete");
    println!("💡 Run `districts --help` for search, province and export commands");
    Ok(())
}

fn run_command(command: Command, records: &[DistrictRecord], config: &AnalyzerConfig) -> Result<()> {
    let text = match command {
        Command::Info => report::render_overview(&dataset_overview(records)),
        Command::Provinces => report::render_province_analysis(
            &province_ranking(records),
            &region_distribution(records),
        ),
        Command::Zones => {
            report::render_zone_analysis(&zone_summaries(records), &zone_distribution(records))
        }
        Command::Search { term } => report::render_search_results(&term, &search(records, &term)),
        Command::Province { name } => report::render_province_profile(&province_profile(records, &name)),
        Command::Charts => report::render_charts(
            &chart_data(records, config.charts.top_provinces, config.charts.histogram_bins),
            config.charts.bar_width,
        ),
        Command::Map => report::render_map(&rasterize_with(records, &config.raster), &config.raster),
        Command::Export {
            format,
            name,
            output,
            filters,
        } => {
            let storage = LocalStorage::new(output.unwrap_or_else(|| config.output.directory.clone()));
            let base_name = name.unwrap_or_else(|| config.output.base_name.clone());
            let filters = if filters.is_empty() {
                config.export_filters().cloned()
            } else {
                Some(filters_from_pairs(&filters))
            };

            let format: ExportFormat = format.parse()?;
            let written = export(records, format.name(), &storage, &base_name, filters.as_ref())?;
            format!(
                "✅ {} districts saved to {}",
                written,
                storage.locate(&format!("{}.{}", base_name, format.extension()))
            )
        }
    };

    println!("{}", text);
    Ok(())
}
