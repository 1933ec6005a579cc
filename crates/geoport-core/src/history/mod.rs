//! Override history domain module.
//!
//! - `model`: `HistoryEntry` and the dedup/bound constants
//! - `store`: `OverrideHistoryStore`, the per-device bounded log

mod model;
mod store;

pub use model::{HistoryEntry, MAX_HISTORY_ENTRIES, PROXIMITY_THRESHOLD};
pub use store::OverrideHistoryStore;
