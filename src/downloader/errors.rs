// Error types for the quality-constrained downloader

use std::path::PathBuf;

use thiserror::Error;

use super::models::{QualityPolicy, TargetQualitySpec};

/// Invalid user or environment configuration. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Height value is not an integer
    #[error("{source_name}: '{value}' is not a valid height (expected an integer between {min} and {max})")]
    InvalidHeight {
        source_name: &'static str,
        value: String,
        min: u32,
        max: u32,
    },

    /// Height value is outside the supported range
    #[error("{source_name}: height {value} is out of range ({min}..={max})")]
    HeightOutOfRange {
        source_name: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// Unknown quality policy name
    #[error("{source_name}: unknown quality policy '{value}' (expected 'strict' or 'best_effort')")]
    InvalidPolicy {
        source_name: &'static str,
        value: String,
    },

    /// Client list was given but held nothing usable
    #[error("explicit client list is empty after trimming")]
    EmptyClientList,
}

/// Failure raised by the extraction backend for a single attempt.
///
/// Only `message` takes part in retry classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExtractionError {
    pub message: String,
}

impl ExtractionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fatal errors surfaced by [`super::orchestrator::Downloader`].
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend failed with an error that no other attempt can fix
    #[error("download failed (target {target}, policy {policy}): {source}")]
    FatalExtraction {
        target: TargetQualitySpec,
        policy: QualityPolicy,
        #[source]
        source: ExtractionError,
    },

    /// Every mode and attempt was tried without an acceptable result
    #[error(
        "no acceptable download for target {target} (policy {policy}) after {attempts} attempts; recent failures: {}",
        .reasons.join(" | ")
    )]
    SearchExhausted {
        target: TargetQualitySpec,
        policy: QualityPolicy,
        attempts: usize,
        reasons: Vec<String>,
    },

    #[error("download cancelled after {attempts} attempts (target {target}, policy {policy})")]
    Cancelled {
        target: TargetQualitySpec,
        policy: QualityPolicy,
        attempts: usize,
    },

    #[error("IO error on {path} (target {target}, policy {policy}): {source}")]
    Io {
        target: TargetQualitySpec,
        policy: QualityPolicy,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    pub fn io(
        target: &TargetQualitySpec,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            target: *target,
            policy: target.policy(),
            path: path.into(),
            source,
        }
    }

    pub fn cancelled(target: &TargetQualitySpec, attempts: usize) -> Self {
        Self::Cancelled {
            target: *target,
            policy: target.policy(),
            attempts,
        }
    }

    /// Whether this error came from bad input rather than from the backend
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
