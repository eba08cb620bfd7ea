//! # Pipeline
//!
//! Factory engine: template lookup, blocker evaluation, stage advancement and
//! background re-evaluation.

pub mod errors;
pub mod monitor;
pub mod registry;
pub mod signals;
pub mod tracker;

pub use errors::{PipelineError, PipelineResult};
pub use monitor::{BlockerMonitor, BlockerMonitorConfig, MonitorStats};
pub use registry::TemplateRegistry;
pub use signals::{ExternalSignalSource, NoExternalSignals, SignalBoard};
pub use tracker::PipelineTracker;
