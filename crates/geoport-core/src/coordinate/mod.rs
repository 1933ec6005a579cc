//! Coordinate domain module.
//!
//! - `model`: the validated `Coordinate` value and `validate`
//! - `places`: naming of well-known places for history entries

mod model;
mod places;

pub use model::{Coordinate, validate};
pub use places::{CUSTOM_LOCATION_NAME, describe};
