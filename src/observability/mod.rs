//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! executor / sequencer / grant resolver produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms via the metrics facade)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
