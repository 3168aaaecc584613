//! Observability for the sequencing path
//!
//! This module provides:
//! - Structured logging (JSON, one line per event)
//! - Typed lifecycle events
//! - Monotonic counters
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on sequencing
//! 3. No background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use aerowal::observability::{Event, Logger, SequencerMetrics};
//!
//! let logger = Logger::console();
//! logger.event(Event::SequencerStart, &[("queue_capacity", "1024")]);
//!
//! let metrics = SequencerMetrics::new();
//! metrics.increment_stamped();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{LogBuffer, Logger, Severity};
pub use metrics::{MetricsSnapshot, SequencerMetrics};
