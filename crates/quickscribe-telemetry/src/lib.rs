//! Telemetry for the quickscribe pipeline.

pub mod pipeline_metrics;

pub use pipeline_metrics::{MetricsSnapshot, PipelineMetrics};
