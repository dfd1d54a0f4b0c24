use crate::domain::model::DistrictRecord;
use crate::utils::error::{LoadError, Result};

/// Byte-level destination rooted at an output directory.
pub trait Storage {
    fn read_file(&self, path: &str) -> std::io::Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> std::io::Result<()>;
    /// Human-readable location of `path`, used in logs and summaries.
    fn locate(&self, path: &str) -> String;
}

/// Anything that can produce the district table: the embedded asset or a file.
pub trait RecordSource {
    fn describe(&self) -> String;
    fn load(&self) -> std::result::Result<Vec<DistrictRecord>, LoadError>;
}

pub trait Pipeline {
    type Transformed;
    type Output;

    fn extract(&self) -> Result<Vec<DistrictRecord>>;
    fn transform(&self, records: Vec<DistrictRecord>) -> Result<Self::Transformed>;
    fn load(&self, transformed: Self::Transformed) -> Result<Self::Output>;
}
