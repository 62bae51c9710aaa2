//! Coordinate reference systems and the conversion of input coordinates into `[lon, lat]`.

pub mod crs;
pub mod datum;
mod gauss_kruger;

pub use crs::{Crs, CrsNormalizer};
pub use datum::Datum;
pub use gauss_kruger::GaussKruger;
