//! Observability for the store
//!
//! Structured JSON logging and monotonic counters for the write pipeline.
//!
//! # Principles
//!
//! 1. Logging is synchronous and unbuffered; one log line is one event
//! 2. Deterministic field ordering
//! 3. Counters only, monotonic, reset on process start
//! 4. No side effects on execution

mod logger;
mod metrics;

pub use logger::{Logger, PipelineEvent, Severity};
pub use metrics::{MetricsSnapshot, PipelineMetrics};
