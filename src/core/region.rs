use crate::domain::model::Region;

/// Longitude test of one classification rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LongitudeTest {
    Below(f64),
    AtLeast(f64),
    Any,
}

impl LongitudeTest {
    fn matches(&self, lon: f64) -> bool {
        match *self {
            LongitudeTest::Below(limit) => lon < limit,
            LongitudeTest::AtLeast(limit) => lon >= limit,
            LongitudeTest::Any => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionRule {
    pub test: LongitudeTest,
    pub region: Region,
}

/// Evaluated top-down, first match wins. The ranges overlap (-90 is below both
/// -89 and -79.5), so Galápagos has to stay ahead of the coast.
pub const REGION_RULES: [RegionRule; 4] = [
    RegionRule {
        test: LongitudeTest::Below(-89.0),
        region: Region::Galapagos,
    },
    RegionRule {
        test: LongitudeTest::Below(-79.5),
        region: Region::Coast,
    },
    RegionRule {
        test: LongitudeTest::AtLeast(-78.5),
        region: Region::Amazon,
    },
    RegionRule {
        test: LongitudeTest::Any,
        region: Region::Sierra,
    },
];

/// Natural region for a coordinate. Latitude does not take part in any rule.
pub fn classify(_lat: f64, lon: f64) -> Region {
    REGION_RULES
        .iter()
        .find(|rule| rule.test.matches(lon))
        .map(|rule| rule.region)
        .unwrap_or(Region::Sierra)
}
