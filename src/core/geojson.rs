//! GeoJSON feature collections for the web map.
//!
//! Coordinates are always written `[longitude, latitude]`. Property keys are
//! the ones the map viewer reads, capitalisation included.

use crate::domain::model::{DistrictRecord, COLUMNS};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const SAMPLE_INSTITUTIONS: &str = include_str!("../../data/sample_institutions.json");
const SAMPLE_PROVINCES: &str = include_str!("../../data/sample_provinces.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: PointGeometry,
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn point(longitude: f64, latitude: f64, properties: Map<String, Value>) -> Self {
        Self {
            kind: "Feature".to_string(),
            geometry: PointGeometry {
                kind: "Point".to_string(),
                coordinates: [longitude, latitude],
            },
            properties,
        }
    }

    pub fn longitude(&self) -> f64 {
        self.geometry.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.geometry.coordinates[1]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn record_features(
    records: &[DistrictRecord],
    properties: impl Fn(&DistrictRecord) -> Map<String, Value>,
) -> FeatureCollection {
    let mut skipped = 0usize;
    let features = records
        .iter()
        .filter_map(|record| match record.coordinates() {
            Some((lat, lon)) => Some(Feature::point(lon, lat, properties(record))),
            None => {
                skipped += 1;
                None
            }
        })
        .collect();

    if skipped > 0 {
        tracing::warn!("⚠️ {} districts without coordinates left out of GeoJSON", skipped);
    }
    FeatureCollection::new(features)
}

/// Every column except the coordinate pair, numbers as numbers and the rest as text.
pub fn flattened_features(records: &[DistrictRecord]) -> FeatureCollection {
    record_features(records, |record| {
        COLUMNS
            .iter()
            .filter(|column| !matches!(**column, "Latitud" | "Longitud"))
            .filter_map(|column| record.field_value(column).map(|v| (column.to_string(), v)))
            .collect()
    })
}

/// The districts layer (`distritos.geojson`).
pub fn district_features(records: &[DistrictRecord]) -> FeatureCollection {
    record_features(records, |record| {
        let mut properties = Map::new();
        properties.insert("COD_DISTRI".into(), record.code.clone().into());
        properties.insert("NOM_DISTRI".into(), record.name.clone().into());
        properties.insert("DPA_DESPRO".into(), record.province_name.clone().into());
        properties.insert("DPA_DESCAN".into(), record.canton_name.clone().into());
        properties.insert(
            "ZONA".into(),
            record.zone.map(Value::from).unwrap_or(Value::Null),
        );
        properties.insert("DIRECCION".into(), record.address.clone().into());
        properties.insert("Capital_Pr".into(), record.capital_flag.clone().into());
        properties.insert("COMPLEMENT".into(), record.source.clone().into());
        properties.insert("NMT_25".into(), record.kind.clone().into());
        properties
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleInstitution {
    pub name: String,
    pub amie: String,
    pub funding: String,
    pub province: String,
    pub canton: String,
    pub students: u32,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleProvince {
    pub province: String,
    pub capital: String,
    pub lat: f64,
    pub lon: f64,
}

pub fn sample_institutions() -> serde_json::Result<Vec<SampleInstitution>> {
    serde_json::from_str(SAMPLE_INSTITUTIONS)
}

pub fn sample_provinces() -> serde_json::Result<Vec<SampleProvince>> {
    serde_json::from_str(SAMPLE_PROVINCES)
}

/// The institutions layer (`sample_instituciones.geojson`).
pub fn institution_features(institutions: &[SampleInstitution]) -> FeatureCollection {
    FeatureCollection::new(
        institutions
            .iter()
            .map(|inst| {
                let mut properties = Map::new();
                properties.insert("NOM_INSTITUCION_EDUCATIVA".into(), inst.name.clone().into());
                properties.insert("AMIE".into(), inst.amie.clone().into());
                properties.insert("NOM_SOSTENIMIENTO".into(), inst.funding.clone().into());
                properties.insert("DPA_DESPRO".into(), inst.province.clone().into());
                properties.insert("DPA_DESCAN".into(), inst.canton.clone().into());
                properties.insert("TOTAL_ESTUDIANTES".into(), inst.students.into());
                properties.insert("REGIMEN".into(), "REGULAR".into());
                properties.insert("ZONA".into(), "URBANA".into());
                Feature::point(inst.lon, inst.lat, properties)
            })
            .collect(),
    )
}

/// The provinces layer (`sample_provincias.geojson`), one point per capital.
pub fn province_features(provinces: &[SampleProvince]) -> FeatureCollection {
    FeatureCollection::new(
        provinces
            .iter()
            .map(|prov| {
                let mut properties = Map::new();
                properties.insert("DPA_DESPRO".into(), prov.province.clone().into());
                properties.insert("CAPITAL".into(), prov.capital.clone().into());
                properties.insert("TIPO".into(), "PROVINCIA".into());
                Feature::point(prov.lon, prov.lat, properties)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::RecordStore;

    fn guayaquil() -> DistrictRecord {
        DistrictRecord {
            code: "09D03".to_string(),
            name: "CENTRO".to_string(),
            province_name: "GUAYAS".to_string(),
            zone: Some(8),
            capital_flag: "SI".to_string(),
            latitude: Some(-2.19),
            longitude: Some(-79.89),
            ..Default::default()
        }
    }

    #[test]
    fn test_coordinates_are_longitude_first() {
        let collection = district_features(&[guayaquil()]);
        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(
            json["features"][0]["geometry"]["coordinates"],
            serde_json::json!([-79.89, -2.19])
        );
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["geometry"]["type"], "Point");
    }

    #[test]
    fn test_district_property_keys() {
        let collection = district_features(&[guayaquil()]);
        let keys: Vec<&str> = collection.features[0]
            .properties
            .keys()
            .map(String::as_str)
            .collect();
        let mut expected = vec![
            "COD_DISTRI",
            "NOM_DISTRI",
            "DPA_DESPRO",
            "DPA_DESCAN",
            "ZONA",
            "DIRECCION",
            "Capital_Pr",
            "COMPLEMENT",
            "NMT_25",
        ];
        expected.sort();
        let mut keys = keys;
        keys.sort();
        assert_eq!(keys, expected);
        assert_eq!(collection.features[0].properties["ZONA"], Value::from(8));
    }

    #[test]
    fn test_flattened_features_coerce_types() {
        let collection = flattened_features(&[guayaquil()]);
        let properties = &collection.features[0].properties;
        assert_eq!(properties.len(), COLUMNS.len() - 2);
        assert_eq!(properties["ZONA"], Value::from(8));
        assert_eq!(properties["Capital_Pr"], Value::from("SI"));
        assert!(!properties.contains_key("Latitud"));
    }

    #[test]
    fn test_records_without_coordinates_are_skipped() {
        let mut lost = guayaquil();
        lost.longitude = None;
        let collection = district_features(&[guayaquil(), lost]);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_sample_layers() {
        let institutions = institution_features(&sample_institutions().unwrap());
        assert_eq!(institutions.len(), 12);
        let first = &institutions.features[0];
        assert_eq!(first.properties["TOTAL_ESTUDIANTES"], Value::from(1200));
        assert_eq!(first.properties["ZONA"], Value::from("URBANA"));
        assert_eq!(first.geometry.coordinates, [-79.8941, -2.1894]);

        let provinces = province_features(&sample_provinces().unwrap());
        assert_eq!(provinces.len(), 24);
        assert!(provinces
            .features
            .iter()
            .all(|f| f.properties["TIPO"] == Value::from("PROVINCIA")));
    }

    #[test]
    fn test_embedded_districts_layer() {
        let store = RecordStore::load().unwrap();
        let collection = district_features(store.records());
        assert_eq!(collection.len(), store.len());
        assert!(collection
            .features
            .iter()
            .all(|f| (-92.0..=-75.0).contains(&f.longitude()) && (-5.0..=2.0).contains(&f.latitude())));
    }
}
