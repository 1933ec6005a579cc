//! Override session domain module.
//!
//! - `model`: the per-device `OverrideSession` record and its status view
//! - `registry`: `SessionRegistry`, the process-wide device → session map

mod model;
mod registry;

pub use model::{OverrideSession, OverrideStatus};
pub use registry::SessionRegistry;
