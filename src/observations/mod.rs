//! Append-only science experiment log.

pub mod analysis;
pub mod store;
pub mod variant;

pub use analysis::{
    Analysis, GroupSummary, PivotRow, PivotTable, analyze, group_means, group_summaries, pivot,
};
pub use store::{Observation, ObservationStore};
pub use variant::ExperimentVariant;
