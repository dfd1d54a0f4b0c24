use clap::Parser;
use ecuador_districts::core::store::{source_for_path, EmbeddedSource};
use ecuador_districts::core::RecordSource;
use ecuador_districts::utils::{logger, validation::Validate};
use ecuador_districts::{AnalyzerConfig, EtlEngine, GeoJsonArgs, LocalStorage, WebMapPipeline};

fn main() {
    let args = GeoJsonArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    println!("🇪🇨 GeoJSON generator for the Ecuador education map");
    println!("{}", "=".repeat(60));

    if let Err(e) = args.validate() {
        tracing::error!("❌ Argument validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let config = match AnalyzerConfig::load_optional(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file is valid TOML");
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| config.output.web_map_directory.clone());
    tracing::info!("📁 Output directory: {}", output_dir);

    let source: Box<dyn RecordSource> = match &args.input {
        Some(path) => source_for_path(path),
        None => Box::new(EmbeddedSource),
    };

    let pipeline = WebMapPipeline::new(source, LocalStorage::new(output_dir), config.web_map);
    let engine = EtlEngine::new_with_monitoring(pipeline, config.monitoring.enabled);

    match engine.run() {
        Ok(summary) => {
            println!("\n🎉 Web map files generated");
            for file in &summary.files {
                println!("   ✅ {}", file);
            }
            println!("\n📊 Summary:");
            println!("   • Districts: {}", summary.districts);
            println!("   • Provinces: {}", summary.provinces);
            println!("   • Sample institutions: {}", summary.institutions);
            println!("   • Files written: {}", summary.files.len());
            println!("\n💡 Open instrucciones.html to replace the sample layers with official data");
        }
        Err(e) => {
            tracing::error!(
                "❌ Generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}
