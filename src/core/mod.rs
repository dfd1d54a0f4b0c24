pub mod aggregate;
pub mod etl;
pub mod export;
pub mod geojson;
pub mod raster;
pub mod region;
pub mod search;
pub mod store;
pub mod webmap;
pub mod xlsx;

pub use crate::domain::model::{DistrictRecord, Region};
pub use crate::domain::ports::{Pipeline, RecordSource, Storage};
pub use crate::utils::error::Result;
