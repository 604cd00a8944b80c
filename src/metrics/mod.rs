pub mod tracker;

pub use tracker::{EpisodeReport, MetricsTracker, TrainingMetrics};
