pub mod schema;

pub use schema::{Config, ObservationsConfig, ReliabilityConfig, TutorConfig};
