// Common data models for the quality-constrained downloader

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::{ConfigError, ExtractionError};

/// Lowest height the resolver accepts
pub const MIN_TARGET_HEIGHT: u32 = 144;
/// Highest height the resolver accepts (8K)
pub const MAX_TARGET_HEIGHT: u32 = 4320;
/// Height used when nothing is requested
pub const DEFAULT_TARGET_HEIGHT: u32 = 720;

/// How strictly the achieved height must match the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityPolicy {
    /// Exact target height first, then a flagged fallback at or below it
    #[default]
    Strict,
    /// Anything at or below the target is fine
    BestEffort,
}

impl QualityPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::BestEffort => "best_effort",
        }
    }
}

impl fmt::Display for QualityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "best_effort" => Ok(Self::BestEffort),
            _ => Err(ConfigError::InvalidPolicy {
                source_name: "quality policy",
                value: s.to_string(),
            }),
        }
    }
}

/// Validated target height plus policy. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetQualitySpec {
    height: u32,
    policy: QualityPolicy,
}

impl TargetQualitySpec {
    pub fn new(height: u32, policy: QualityPolicy) -> Result<Self, ConfigError> {
        if !(MIN_TARGET_HEIGHT..=MAX_TARGET_HEIGHT).contains(&height) {
            return Err(ConfigError::HeightOutOfRange {
                source_name: "target quality",
                value: height,
                min: MIN_TARGET_HEIGHT,
                max: MAX_TARGET_HEIGHT,
            });
        }
        Ok(Self { height, policy })
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn policy(&self) -> QualityPolicy {
        self.policy
    }
}

impl Default for TargetQualitySpec {
    fn default() -> Self {
        Self {
            height: DEFAULT_TARGET_HEIGHT,
            policy: QualityPolicy::Strict,
        }
    }
}

impl fmt::Display for TargetQualitySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}p", self.height)
    }
}

/// Backend client identifier (e.g. "web", "ios"), or auto when `None`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct ClientCandidate(Option<String>);

impl ClientCandidate {
    /// Let the backend pick its own client
    pub fn auto() -> Self {
        Self(None)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self(Some(name.into()))
    }

    pub fn name(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl fmt::Display for ClientCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("auto"))
    }
}

/// Credential source used for one attempt
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "browser", rename_all = "snake_case")]
pub enum AuthContext {
    NoAuth,
    /// Cookies imported from the named browser's store
    CookieSource(String),
}

impl AuthContext {
    pub fn browser(&self) -> Option<&str> {
        match self {
            Self::NoAuth => None,
            Self::CookieSource(browser) => Some(browser),
        }
    }

    /// Short label used in logs ("none", "cookies:chrome")
    pub fn label(&self) -> String {
        match self {
            Self::NoAuth => "none".to_string(),
            Self::CookieSource(browser) => format!("cookies:{}", browser),
        }
    }
}

impl fmt::Display for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// One (client, auth) pair from the plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub client: ClientCandidate,
    pub auth: AuthContext,
}

impl Attempt {
    pub fn new(client: ClientCandidate, auth: AuthContext) -> Self {
        Self { client, auth }
    }
}

/// Ordered attempts for one download request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttemptPlan {
    attempts: Vec<Attempt>,
}

impl AttemptPlan {
    pub fn new(attempts: Vec<Attempt>) -> Self {
        Self { attempts }
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Attempt> {
        self.attempts.get(index)
    }
}

/// Quality-selection mode: a named format selector and its acceptance rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityMode {
    pub name: &'static str,
    pub selector: String,
    pub requires_exact_match: bool,
}

/// Parameters for one backend invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub url: String,
    pub format_selector: String,
    pub client: Option<String>,
    pub cookie_browser: Option<String>,
}

/// One stream the backend fetched (video or audio part of a merge)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamRecord {
    pub format_id: Option<String>,
    pub height: Option<u32>,
}

/// What the backend reports about a finished download.
///
/// Every field is optional; the executor resolves height, format and
/// artifact path with a fixed precedence:
/// - height: `height`, then the highest `streams[].height`, then a media probe
/// - format: `format_id`, then `streams[].format_id` joined with `+`
/// - path: the first `reported_paths` entry that exists, then the output
///   directory diff
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    pub height: Option<u32>,
    pub streams: Vec<StreamRecord>,
    pub reported_paths: Vec<PathBuf>,
    pub format_id: Option<String>,
}

impl ExtractionResult {
    pub fn metadata_height(&self) -> Option<u32> {
        self.height
            .or_else(|| self.streams.iter().filter_map(|s| s.height).max())
    }

    pub fn resolved_format_id(&self) -> Option<String> {
        if let Some(id) = self.format_id.as_ref().filter(|id| !id.is_empty()) {
            return Some(id.clone());
        }
        let ids: Vec<&str> = self
            .streams
            .iter()
            .filter_map(|s| s.format_id.as_deref())
            .filter(|id| !id.is_empty())
            .collect();
        if ids.is_empty() {
            None
        } else {
            Some(ids.join("+"))
        }
    }
}

/// Caller-facing download request. Every field except `url` is optional and
/// falls back to captured environment defaults.
#[derive(Debug, Clone, Default)]
pub struct DownloadRequest {
    pub url: String,
    pub target_height: Option<u32>,
    /// Legacy alias for `target_height` (`--min-height`)
    pub legacy_height: Option<u32>,
    pub policy: Option<String>,
    pub clients: Option<Vec<String>>,
    pub cookie_browser: Option<String>,
}

impl DownloadRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Final result of a successful download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadOutcome {
    pub path: PathBuf,
    pub client: ClientCandidate,
    pub auth_context: AuthContext,
    pub achieved_height: Option<u32>,
    pub format_id: Option<String>,
    pub target_quality: u32,
    pub policy: QualityPolicy,
    pub fallback: bool,
    pub fallback_reason: Option<String>,
}

/// Result of running a single (mode, client, auth) combination
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(DownloadOutcome),
    QualityRejected(String),
    RetryableError(String),
    FatalError(ExtractionError),
}

impl AttemptOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::QualityRejected(_) => "quality_rejected",
            Self::RetryableError(_) => "retryable_error",
            Self::FatalError(_) => "fatal_error",
        }
    }
}

/// Diagnostic status of one finished attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptStatus {
    pub mode: &'static str,
    pub attempt: usize,
    pub total: usize,
    pub client: String,
    pub auth: String,
    pub outcome: &'static str,
    pub retryable: bool,
    pub detail: Option<String>,
}
