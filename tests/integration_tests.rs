use ecuador_districts::core::export::{export, export_reported, ExportFilters};
use ecuador_districts::core::store::{source_for_path, EmbeddedSource};
use ecuador_districts::core::webmap::WebMapConfig;
use ecuador_districts::{
    AnalyzerConfig, AnalyzerPipeline, EtlEngine, LocalStorage, RecordStore, WebMapPipeline,
};
use serde_json::Value;
use tempfile::TempDir;

#[test]
fn test_end_to_end_report_with_exports() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("output");

    let mut config = AnalyzerConfig::default();
    config.output.directory = output_dir.display().to_string();
    config.export.formats = vec![
        "csv".to_string(),
        "excel".to_string(),
        "json".to_string(),
        "geojson".to_string(),
    ];

    let storage = LocalStorage::new(&output_dir);
    let pipeline = AnalyzerPipeline::new(Box::new(EmbeddedSource), storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, false);

    let outcome = engine.run().unwrap();
    assert!(outcome.all_exports_succeeded());
    assert!(outcome.text.contains("33 rows × 15 columns"));

    for extension in ["csv", "xlsx", "json", "geojson"] {
        let path = output_dir.join(format!("distritos_ecuador.{}", extension));
        assert!(path.exists(), "missing {}", path.display());
    }
}

#[test]
fn test_csv_export_reloads_identically() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = RecordStore::load()?;
    let storage = LocalStorage::new(temp_dir.path());

    let written = export(store.records(), "csv", &storage, "todos", None)?;
    assert_eq!(written, 33);

    let reloaded = RecordStore::from_source(source_for_path(temp_dir.path().join("todos.csv")).as_ref())?;
    assert_eq!(reloaded, store);
    Ok(())
}

#[test]
fn test_excel_export_reloads_through_spreadsheet_loader() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let store = RecordStore::load()?;
    let storage = LocalStorage::new(temp_dir.path());

    let mut filters = ExportFilters::new();
    filters.insert("DPA_DESPRO".to_string(), Value::from("pichincha"));
    export(store.records(), "xlsx", &storage, "pichincha", Some(&filters))?;

    let reloaded =
        RecordStore::from_source(source_for_path(temp_dir.path().join("pichincha.xlsx")).as_ref())?;
    assert_eq!(reloaded.len(), 5);
    assert!(reloaded.records().iter().all(|r| r.province_name == "PICHINCHA"));

    let expected: Vec<_> = store
        .records()
        .iter()
        .filter(|r| r.province_name == "PICHINCHA")
        .cloned()
        .collect();
    assert_eq!(reloaded.records(), expected.as_slice());
    Ok(())
}

#[test]
fn test_geojson_export_is_longitude_first() {
    let temp_dir = TempDir::new().unwrap();
    let store = RecordStore::load().unwrap();
    let storage = LocalStorage::new(temp_dir.path());

    let mut filters = ExportFilters::new();
    filters.insert("COD_DISTRI".to_string(), Value::from("09D01"));
    assert!(export_reported(store.records(), "GeoJSON", &storage, "uno", Some(&filters)));

    let content = std::fs::read(temp_dir.path().join("uno.geojson")).unwrap();
    let collection: Value = serde_json::from_slice(&content).unwrap();
    let features = collection["features"].as_array().unwrap();
    assert_eq!(features.len(), 1);
    assert_eq!(
        features[0]["geometry"]["coordinates"],
        serde_json::json!([-79.89298215, -2.262745182])
    );
    assert_eq!(features[0]["properties"]["ZONA"], Value::from(8));
}

#[test]
fn test_unsupported_format_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let store = RecordStore::load().unwrap();
    let storage = LocalStorage::new(temp_dir.path());

    assert!(!export_reported(store.records(), "pdf", &storage, "nada", None));
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_web_map_bundle_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");

    let pipeline = WebMapPipeline::new(
        Box::new(EmbeddedSource),
        LocalStorage::new(&data_dir),
        WebMapConfig::default(),
    );
    let summary = EtlEngine::new(pipeline).run().unwrap();
    assert_eq!(summary.districts, 33);
    assert_eq!(summary.provinces, 24);

    for name in [
        "distritos.geojson",
        "sample_instituciones.geojson",
        "sample_provincias.geojson",
        "config.js",
        "instrucciones.html",
    ] {
        assert!(data_dir.join(name).exists(), "missing {}", name);
    }

    let districts: Value =
        serde_json::from_slice(&std::fs::read(data_dir.join("distritos.geojson")).unwrap()).unwrap();
    let properties = districts["features"][0]["properties"].as_object().unwrap();
    assert_eq!(properties.len(), 9);
    assert_eq!(properties["COD_DISTRI"], Value::from("09D01"));
    assert_eq!(properties["Capital_Pr"], Value::from("SI"));

    let provinces: Value =
        serde_json::from_slice(&std::fs::read(data_dir.join("sample_provincias.geojson")).unwrap()).unwrap();
    assert_eq!(provinces["features"].as_array().unwrap().len(), 24);

    let config_js = std::fs::read_to_string(data_dir.join("config.js")).unwrap();
    assert!(config_js.contains("\"maxClusterRadius\": 50"));
    assert!(config_js.contains("module.exports = CONFIG;"));
}

#[test]
fn test_missing_input_file_fails_the_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let pipeline = AnalyzerPipeline::new(
        source_for_path(temp_dir.path().join("no_existe.csv")),
        LocalStorage::new(temp_dir.path()),
        AnalyzerConfig::default(),
    );

    let err = EtlEngine::new(pipeline).run().unwrap_err();
    assert!(err.user_friendly_message().contains("does not exist"));
    assert_eq!(err.exit_code(), 1);
}
