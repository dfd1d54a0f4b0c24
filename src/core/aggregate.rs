//! Grouping, ranking and the descriptive statistics built on top of it.

use crate::core::region::classify;
use crate::domain::model::{DistrictRecord, Region, CAPITAL_NO, CAPITAL_YES, COLUMNS};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::Hash;

/// Records sharing one key, in encounter order.
#[derive(Debug, Clone)]
pub struct Group<'a, K> {
    pub key: K,
    pub members: Vec<&'a DistrictRecord>,
}

impl<K> Group<'_, K> {
    pub fn count(&self) -> usize {
        self.members.len()
    }
}

/// Groups `records` by `key_fn`, groups listed by first occurrence of their key.
pub fn aggregate<'a, K, F>(records: &'a [DistrictRecord], key_fn: F) -> Vec<Group<'a, K>>
where
    K: Eq + Hash + Clone,
    F: Fn(&DistrictRecord) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<Group<'a, K>> = Vec::new();

    for record in records {
        let key = key_fn(record);
        match index.get(&key) {
            Some(&position) => groups[position].members.push(record),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    members: vec![record],
                });
            }
        }
    }

    groups
}

/// Descending count; the sort is stable so ties keep encounter order.
pub fn ranked<K>(mut groups: Vec<Group<'_, K>>) -> Vec<Group<'_, K>> {
    groups.sort_by(|a, b| b.count().cmp(&a.count()));
    groups
}

pub fn province_key(record: &DistrictRecord) -> String {
    record.province_name.clone()
}

pub fn zone_key(record: &DistrictRecord) -> Option<u32> {
    record.zone
}

/// `None` for records without both coordinates.
pub fn region_key(record: &DistrictRecord) -> Option<Region> {
    record.coordinates().map(|(lat, lon)| classify(lat, lon))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    /// Extent of every record with coordinates; `None` when there are none.
    pub fn of<'a>(records: impl IntoIterator<Item = &'a DistrictRecord>) -> Option<Self> {
        records
            .into_iter()
            .filter_map(DistrictRecord::coordinates)
            .fold(None, |bounds: Option<BoundingBox>, (lat, lon)| {
                Some(match bounds {
                    None => BoundingBox {
                        lat_min: lat,
                        lat_max: lat,
                        lon_min: lon,
                        lon_max: lon,
                    },
                    Some(b) => BoundingBox {
                        lat_min: b.lat_min.min(lat),
                        lat_max: b.lat_max.max(lat),
                        lon_min: b.lon_min.min(lon),
                        lon_max: b.lon_max.max(lon),
                    },
                })
            })
    }

    pub fn lat_span(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    pub fn lon_span(&self) -> f64 {
        self.lon_max - self.lon_min
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneSummary {
    pub zone: Option<u32>,
    pub districts: usize,
    pub provinces: usize,
    pub cantons: usize,
    pub bounds: Option<BoundingBox>,
}

/// Per-zone counts, distinct provinces/cantons and extent, ordered by zone number
/// (records without a zone last).
pub fn zone_summaries(records: &[DistrictRecord]) -> Vec<ZoneSummary> {
    let mut summaries: Vec<ZoneSummary> = aggregate(records, zone_key)
        .into_iter()
        .map(|group| ZoneSummary {
            zone: group.key,
            districts: group.count(),
            provinces: distinct(&group.members, |r| r.province_name.as_str()),
            cantons: distinct(&group.members, |r| r.canton_name.as_str()),
            bounds: BoundingBox::of(group.members.iter().copied()),
        })
        .collect();
    summaries.sort_by_key(|s| (s.zone.is_none(), s.zone));
    summaries
}

fn distinct<'a>(members: &[&'a DistrictRecord], field: impl Fn(&'a DistrictRecord) -> &'a str) -> usize {
    members.iter().map(|&r| field(r)).collect::<HashSet<_>>().len()
}

/// A labelled count with its share of the total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn shares<K>(groups: Vec<Group<'_, K>>, total: usize, label: impl Fn(&K) -> String) -> Vec<Share> {
    groups
        .into_iter()
        .map(|group| Share {
            label: label(&group.key),
            count: group.count(),
            percent: percent(group.count(), total),
        })
        .collect()
}

pub fn province_ranking(records: &[DistrictRecord]) -> Vec<Share> {
    shares(ranked(aggregate(records, province_key)), records.len(), |province: &String| province.clone())
}

pub fn top_provinces(records: &[DistrictRecord], limit: usize) -> Vec<Share> {
    let mut ranking = province_ranking(records);
    ranking.truncate(limit);
    ranking
}

pub const NO_COORDINATES_LABEL: &str = "NO COORDINATES";

pub fn region_distribution(records: &[DistrictRecord]) -> Vec<Share> {
    shares(ranked(aggregate(records, region_key)), records.len(), |region| {
        region
            .map(|r| r.label().to_string())
            .unwrap_or_else(|| NO_COORDINATES_LABEL.to_string())
    })
}

/// Zone shares ordered by zone number.
pub fn zone_distribution(records: &[DistrictRecord]) -> Vec<Share> {
    let mut groups = aggregate(records, zone_key);
    groups.sort_by_key(|g| (g.key.is_none(), g.key));
    shares(groups, records.len(), |zone| match zone {
        Some(z) => format!("Zone {}", z),
        None => "No zone".to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub provinces: usize,
    pub cantons: usize,
    pub zones: Vec<u32>,
    pub complete_records: usize,
    pub missing_values: usize,
    pub bounds: Option<BoundingBox>,
    pub capitals: usize,
    pub non_capitals: usize,
}

pub fn dataset_overview(records: &[DistrictRecord]) -> DatasetOverview {
    let all: Vec<&DistrictRecord> = records.iter().collect();
    let missing: Vec<usize> = records.iter().map(DistrictRecord::missing_values).collect();

    DatasetOverview {
        rows: records.len(),
        columns: COLUMNS.len(),
        provinces: distinct(&all, |r| r.province_name.as_str()),
        cantons: distinct(&all, |r| r.canton_name.as_str()),
        zones: sorted_zones(records),
        complete_records: missing.iter().filter(|&&m| m == 0).count(),
        missing_values: missing.iter().sum(),
        bounds: BoundingBox::of(records),
        capitals: records.iter().filter(|r| r.capital_flag == CAPITAL_YES).count(),
        non_capitals: records.iter().filter(|r| r.capital_flag == CAPITAL_NO).count(),
    }
}

pub fn sorted_zones<'a>(records: impl IntoIterator<Item = &'a DistrictRecord>) -> Vec<u32> {
    records
        .into_iter()
        .filter_map(|r| r.zone)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width bins over `[min, max]`. The maximum lands in the last bin; a
/// zero-width range puts every value in the first bin.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if bins == 0 || values.is_empty() {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bins as f64;

    let mut result: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for value in values {
        let slot = if width > 0.0 {
            (((value - min) / width) as usize).min(bins - 1)
        } else {
            0
        };
        result[slot].count += 1;
    }

    result
}

/// Everything the chart panel draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub top_provinces: Vec<Share>,
    pub zone_shares: Vec<Share>,
    pub latitude_bins: Vec<HistogramBin>,
    pub longitude_bins: Vec<HistogramBin>,
    pub capitals: usize,
    pub non_capitals: usize,
}

pub fn chart_data(records: &[DistrictRecord], top: usize, bins: usize) -> ChartData {
    let latitudes: Vec<f64> = records.iter().filter_map(|r| r.latitude).collect();
    let longitudes: Vec<f64> = records.iter().filter_map(|r| r.longitude).collect();

    ChartData {
        top_provinces: top_provinces(records, top),
        zone_shares: zone_distribution(records),
        latitude_bins: histogram(&latitudes, bins),
        longitude_bins: histogram(&longitudes, bins),
        capitals: records.iter().filter(|r| r.capital_flag == CAPITAL_YES).count(),
        non_capitals: records.iter().filter(|r| r.capital_flag == CAPITAL_NO).count(),
    }
}
