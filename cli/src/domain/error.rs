//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

use crate::domain::pipeline::PipelineStep;

// ── External call classification ──────────────────────────────────────────────

/// Coarse classification of a failure reported by an external process or API.
///
/// Assigned once, at the boundary of the call, from the most structured
/// signal available (io `ErrorKind`, SQLSTATE, exit code, a filesystem
/// probe). Callers decide tolerate/abort from the kind alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalErrorKind {
    /// The thing being created is already there.
    AlreadyExists,
    /// The thing being removed is not there.
    NotFound,
    /// Anything else. Always fatal.
    Other,
}

/// A classified failure of one external operation.
#[derive(Debug, Error)]
#[error("{operation} failed: {detail}")]
pub struct ExternalError {
    pub kind: ExternalErrorKind,
    /// Short human name of the operation, e.g. `git clone`.
    pub operation: String,
    /// Raw diagnostic output (stderr, API message), surfaced verbatim.
    pub detail: String,
}

impl ExternalError {
    #[must_use]
    pub fn new(
        kind: ExternalErrorKind,
        operation: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            operation: operation.into(),
            detail: detail.into(),
        }
    }

    /// Shorthand for a fatal, unclassified failure.
    #[must_use]
    pub fn other(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(ExternalErrorKind::Other, operation, detail)
    }
}

// ── Container runtime errors ──────────────────────────────────────────────────

/// Errors reported by a `ContainerRuntime` implementation.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A single build-log line could not be decoded.
    #[error("malformed runtime output: {0}")]
    Malformed(String),

    /// The runtime API rejected the request.
    #[error("container runtime returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport or stream-level failure.
    #[error("container runtime stream failed: {0}")]
    Stream(String),
}

impl RuntimeError {
    /// Returns `true` when the error only affects one line of output.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

// ── Pipeline errors ───────────────────────────────────────────────────────────

/// Fatal, per-step pipeline failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot create {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    External(#[from] ExternalError),

    #[error("image build for '{tag}' failed: {message}")]
    BuildFailed { tag: String, message: String },

    #[error("image build for '{tag}' did not finish within {secs}s")]
    BuildTimedOut { tag: String, secs: u64 },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("container launch failed: {0}")]
    LaunchFailed(String),
}

/// A pipeline failure annotated with the step it happened in.
#[derive(Debug, Error)]
#[error("{step} failed: {source:#}")]
pub struct StepFailure {
    pub step: PipelineStep,
    #[source]
    pub source: anyhow::Error,
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to batch configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid application name '{0}': must match ^[a-z0-9][a-z0-9_]{{0,62}}$")]
    InvalidAppName(String),

    #[error("Application '{0}' is listed more than once.")]
    DuplicateApp(String),

    #[error("No applications configured.")]
    NoApplications,

    #[error("Unknown application '{name}'.\n\nConfigured applications: {valid}")]
    UnknownApp { name: String, valid: String },

    #[error("'{0}' must name a program to run.")]
    EmptyCommand(&'static str),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}
