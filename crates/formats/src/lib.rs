pub mod boundary;
pub mod geojson;
pub mod topojson;

pub use boundary::*;
