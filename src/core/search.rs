use crate::core::aggregate::sorted_zones;
use crate::domain::model::DistrictRecord;
use serde::Serialize;
use std::collections::HashSet;

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Records whose name, province, canton or address contains `term`, ignoring case.
pub fn search(records: &[DistrictRecord], term: &str) -> Vec<DistrictRecord> {
    records
        .iter()
        .filter(|r| {
            [&r.name, &r.province_name, &r.canton_name, &r.address]
                .iter()
                .any(|field| contains_ignore_case(field, term))
        })
        .cloned()
        .collect()
}

/// Records whose province name contains `name`, ignoring case.
pub fn filter_by_province(records: &[DistrictRecord], name: &str) -> Vec<DistrictRecord> {
    records
        .iter()
        .filter(|r| contains_ignore_case(&r.province_name, name))
        .cloned()
        .collect()
}

/// A province filter plus the figures shown alongside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvinceProfile {
    pub query: String,
    pub districts: Vec<DistrictRecord>,
    pub cantons: usize,
    pub capitals: usize,
    pub zones: Vec<u32>,
}

impl ProvinceProfile {
    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }
}

pub fn province_profile(records: &[DistrictRecord], name: &str) -> ProvinceProfile {
    let districts = filter_by_province(records, name);
    ProvinceProfile {
        query: name.to_string(),
        cantons: districts
            .iter()
            .map(|r| r.canton_name.as_str())
            .collect::<HashSet<_>>()
            .len(),
        capitals: districts.iter().filter(|r| r.is_capital()).count(),
        zones: sorted_zones(&districts),
        districts,
    }
}
