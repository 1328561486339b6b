//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod stream;
pub mod templates;

pub use config::{AppName, ApplicationSpec, BatchConfig};
pub use error::{ConfigError, ExternalError, ExternalErrorKind, PipelineError, RuntimeError};
pub use layout::WorkingLayout;
pub use pipeline::{AppOutcome, AppReport, PipelineStep, RunSummary};
pub use stream::{BuildEvent, ExecOutcome, ExecutionContext, LineSplitter};
