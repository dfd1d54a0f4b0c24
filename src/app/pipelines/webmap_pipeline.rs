use crate::core::geojson::{
    district_features, institution_features, province_features, sample_institutions,
    sample_provinces, FeatureCollection,
};
use crate::core::store::RecordStore;
use crate::core::webmap::{
    WebMapConfig, CONFIG_FILE, DISTRICTS_FILE, INSTITUTIONS_FILE, INSTRUCTIONS_FILE,
    INSTRUCTIONS_HTML, PROVINCES_FILE,
};
use crate::core::{DistrictRecord, Pipeline, RecordSource, Storage};
use crate::utils::error::Result;
use std::collections::HashSet;

pub struct WebMapBundle {
    pub districts: FeatureCollection,
    pub institutions: FeatureCollection,
    pub provinces: FeatureCollection,
    pub config_js: String,
    pub province_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BundleSummary {
    pub districts: usize,
    pub institutions: usize,
    pub provinces: usize,
    /// Locations of the written files, in write order.
    pub files: Vec<String>,
}

/// Writes the three GeoJSON layers, `config.js` and the instructions page.
pub struct WebMapPipeline<S: Storage> {
    source: Box<dyn RecordSource>,
    storage: S,
    config: WebMapConfig,
}

impl<S: Storage> WebMapPipeline<S> {
    pub fn new(source: Box<dyn RecordSource>, storage: S, config: WebMapConfig) -> Self {
        Self {
            source,
            storage,
            config,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn write(&self, name: &str, data: &[u8], files: &mut Vec<String>) -> Result<()> {
        self.storage.write_file(name, data)?;
        let location = self.storage.locate(name);
        tracing::info!("✅ Saved {}", location);
        files.push(location);
        Ok(())
    }
}

impl<S: Storage> Pipeline for WebMapPipeline<S> {
    type Transformed = WebMapBundle;
    type Output = BundleSummary;

    fn extract(&self) -> Result<Vec<DistrictRecord>> {
        let store = RecordStore::from_source(self.source.as_ref())?;
        tracing::info!("📊 {} districts loaded from {}", store.len(), self.source.describe());
        Ok(store.into_records())
    }

    fn transform(&self, records: Vec<DistrictRecord>) -> Result<WebMapBundle> {
        let province_count = records
            .iter()
            .map(|r| r.province_name.as_str())
            .collect::<HashSet<_>>()
            .len();

        Ok(WebMapBundle {
            districts: district_features(&records),
            institutions: institution_features(&sample_institutions()?),
            provinces: province_features(&sample_provinces()?),
            config_js: self.config.render_config_js()?,
            province_count,
        })
    }

    fn load(&self, bundle: WebMapBundle) -> Result<BundleSummary> {
        let mut files = Vec::new();

        self.write(DISTRICTS_FILE, &serde_json::to_vec_pretty(&bundle.districts)?, &mut files)?;
        self.write(INSTITUTIONS_FILE, &serde_json::to_vec_pretty(&bundle.institutions)?, &mut files)?;
        self.write(PROVINCES_FILE, &serde_json::to_vec_pretty(&bundle.provinces)?, &mut files)?;
        self.write(INSTRUCTIONS_FILE, INSTRUCTIONS_HTML.as_bytes(), &mut files)?;
        self.write(CONFIG_FILE, bundle.config_js.as_bytes(), &mut files)?;

        Ok(BundleSummary {
            districts: bundle.districts.len(),
            institutions: bundle.institutions.len(),
            provinces: bundle.province_count,
            files,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::etl::EtlEngine;
    use crate::core::store::EmbeddedSource;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockStorage {
        files: RefCell<HashMap<String, Vec<u8>>>,
        fail_writes: bool,
    }

    impl Storage for MockStorage {
        fn read_file(&self, path: &str) -> std::io::Result<Vec<u8>> {
            self.files
                .borrow()
                .get(path)
                .cloned()
                .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
        }

        fn write_file(&self, path: &str, data: &[u8]) -> std::io::Result<()> {
            if self.fail_writes {
                return Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
            }
            self.files.borrow_mut().insert(path.to_string(), data.to_vec());
            Ok(())
        }

        fn locate(&self, path: &str) -> String {
            format!("mock://{}", path)
        }
    }

    #[test]
    fn test_bundle_writes_five_files() {
        let engine = EtlEngine::new(WebMapPipeline::new(
            Box::new(EmbeddedSource),
            MockStorage::default(),
            WebMapConfig::default(),
        ));
        let summary = engine.run().unwrap();

        assert_eq!(summary.districts, 33);
        assert_eq!(summary.institutions, 12);
        assert_eq!(summary.provinces, 24);
        assert_eq!(summary.files.len(), 5);
        assert_eq!(summary.files[0], "mock://distritos.geojson");

        let files = engine.pipeline().storage().files.borrow();
        let districts: serde_json::Value = serde_json::from_slice(&files["distritos.geojson"]).unwrap();
        assert_eq!(districts["features"].as_array().unwrap().len(), 33);
        assert!(String::from_utf8_lossy(&files["config.js"]).contains("const CONFIG = {"));
        assert!(files.contains_key("instrucciones.html"));
    }

    #[test]
    fn test_write_failure_is_an_error() {
        let pipeline = WebMapPipeline::new(
            Box::new(EmbeddedSource),
            MockStorage {
                fail_writes: true,
                ..Default::default()
            },
            WebMapConfig::default(),
        );
        assert!(EtlEngine::new(pipeline).run().is_err());
    }
}
