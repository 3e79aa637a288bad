// Orchestrator: attempt search over quality modes x (client, auth)
//
// Outer loop: quality modes in sequencer order. Inner loop: attempts in plan
// order. The first accepted attempt ends the search. Retryable failures and
// quality rejections are absorbed; a fatal backend error aborts immediately.
// Attempts run strictly one at a time: the output directory diff used to
// find artifacts is only sound without concurrent attempts.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::artifacts::{locate_artifact, remove_artifact, ArtifactSnapshot};
use super::auth;
use super::diagnostics::classify_failure;
use super::errors::DownloadError;
use super::format_selector::FormatSelector;
use super::models::{
    Attempt, AttemptOutcome, AttemptPlan, AttemptStatus, DownloadOutcome, DownloadRequest,
    ExtractionRequest, QualityMode, QualityPolicy, TargetQualitySpec,
};
use super::planner;
use super::quality::{self, QualityInputs};
use super::report;
use super::traits::{ExtractionBackend, MediaProbe, NoProbe, ProgressEmitter};
use super::utils::normalize_youtube_url;
use crate::config::EnvDefaults;

/// How many recent failure reasons the exhaustion error keeps
pub const MAX_REPORTED_REASONS: usize = 4;

/// One (mode, attempt) pair handed out by [`AttemptSearch`]
#[derive(Debug, Clone)]
pub struct ScheduledAttempt {
    pub mode: QualityMode,
    pub attempt: Attempt,
    /// 1-based position within the current mode
    pub index: usize,
    /// Attempts per mode
    pub total: usize,
}

/// Search state over the mode x plan space.
///
/// Owns the cursor and the bounded list of recent failure reasons; knows
/// nothing about the backend.
#[derive(Debug)]
pub struct AttemptSearch {
    spec: TargetQualitySpec,
    modes: Vec<QualityMode>,
    plan: AttemptPlan,
    mode_idx: usize,
    attempt_idx: usize,
    tried: usize,
    reasons: VecDeque<String>,
}

impl AttemptSearch {
    pub fn new(spec: TargetQualitySpec, modes: Vec<QualityMode>, plan: AttemptPlan) -> Self {
        Self {
            spec,
            modes,
            plan,
            mode_idx: 0,
            attempt_idx: 0,
            tried: 0,
            reasons: VecDeque::with_capacity(MAX_REPORTED_REASONS + 1),
        }
    }

    /// Advance to the next combination, or `None` once the space is exhausted
    pub fn next_attempt(&mut self) -> Option<ScheduledAttempt> {
        loop {
            let mode = self.modes.get(self.mode_idx)?;
            if let Some(attempt) = self.plan.get(self.attempt_idx) {
                self.attempt_idx += 1;
                self.tried += 1;
                return Some(ScheduledAttempt {
                    mode: mode.clone(),
                    attempt: attempt.clone(),
                    index: self.attempt_idx,
                    total: self.plan.len(),
                });
            }
            self.mode_idx += 1;
            self.attempt_idx = 0;
        }
    }

    pub fn record_failure(&mut self, reason: impl Into<String>) {
        self.reasons.push_back(reason.into());
        while self.reasons.len() > MAX_REPORTED_REASONS {
            self.reasons.pop_front();
        }
    }

    pub fn tried(&self) -> usize {
        self.tried
    }

    pub fn recent_reasons(&self) -> Vec<String> {
        self.reasons.iter().cloned().collect()
    }

    pub fn exhausted_error(&self) -> DownloadError {
        DownloadError::SearchExhausted {
            target: self.spec,
            policy: self.spec.policy(),
            attempts: self.tried,
            reasons: self.recent_reasons(),
        }
    }
}

/// Runs one scheduled attempt against the backend and applies the quality gate
pub struct AttemptExecutor<'a> {
    backend: &'a dyn ExtractionBackend,
    probe: &'a dyn MediaProbe,
    output_dir: &'a Path,
    url: &'a str,
    spec: TargetQualitySpec,
}

impl<'a> AttemptExecutor<'a> {
    pub fn new(
        backend: &'a dyn ExtractionBackend,
        probe: &'a dyn MediaProbe,
        output_dir: &'a Path,
        url: &'a str,
        spec: TargetQualitySpec,
    ) -> Self {
        Self {
            backend,
            probe,
            output_dir,
            url,
            spec,
        }
    }

    pub async fn run(&self, scheduled: &ScheduledAttempt) -> Result<AttemptOutcome, DownloadError> {
        let ScheduledAttempt { mode, attempt, .. } = scheduled;
        let label = attempt_label(scheduled);

        let snapshot = ArtifactSnapshot::capture(self.output_dir)
            .map_err(|e| DownloadError::io(&self.spec, self.output_dir, e))?;

        let request = ExtractionRequest {
            url: self.url.to_string(),
            format_selector: mode.selector.clone(),
            client: attempt.client.name().map(str::to_string),
            cookie_browser: attempt.auth.browser().map(str::to_string),
        };
        debug!(
            backend = self.backend.name(),
            selector = %request.format_selector,
            "{} starting",
            label
        );

        let result = match self.backend.extract(&request).await {
            Ok(result) => result,
            Err(err) => {
                return Ok(match classify_failure(&err.message) {
                    Some(marker) => AttemptOutcome::RetryableError(format!(
                        "{}: {}: {}",
                        label,
                        marker.description(),
                        first_line(&err.message)
                    )),
                    None => AttemptOutcome::FatalError(err),
                });
            }
        };

        let located = locate_artifact(&result.reported_paths, &snapshot, self.output_dir)
            .map_err(|e| DownloadError::io(&self.spec, self.output_dir, e))?;
        let Some(path) = located else {
            return Ok(AttemptOutcome::RetryableError(format!(
                "{}: backend reported success but no artifact was found",
                label
            )));
        };

        let achieved = match result.metadata_height() {
            Some(h) => Some(h),
            None => self.probe.probe_height(&path).await,
        };
        let format_id = result.resolved_format_id();

        if let Some(reason) = self.rejection(mode, achieved) {
            if snapshot.is_unchanged(&path) {
                warn!(path = %path.display(), "Rejected file predates the attempt, keeping it");
            } else {
                remove_artifact(&path);
            }
            return Ok(AttemptOutcome::QualityRejected(format!("{}: {}", label, reason)));
        }

        Ok(AttemptOutcome::Success(report::build_outcome(
            &self.spec, mode, attempt, path, achieved, format_id,
        )))
    }

    /// Why `achieved` violates the mode's constraint, if it does
    fn rejection(&self, mode: &QualityMode, achieved: Option<u32>) -> Option<String> {
        let target = self.spec.height();
        let rule = if mode.requires_exact_match {
            QualityPolicy::Strict
        } else {
            QualityPolicy::BestEffort
        };
        match achieved {
            Some(h) if quality::is_quality_acceptable(h, target, rule) => None,
            Some(h) if mode.requires_exact_match => {
                Some(format!("got {}p, need exactly {}p", h, target))
            }
            Some(h) => Some(format!("got {}p, above the {}p cap", h, target)),
            None if mode.requires_exact_match => {
                Some(format!("height unknown, need exactly {}p", target))
            }
            None => None,
        }
    }
}

/// Download controller: resolves the request, plans the search and drives it
pub struct Downloader {
    backend: Box<dyn ExtractionBackend>,
    probe: Box<dyn MediaProbe>,
    output_dir: PathBuf,
    env: EnvDefaults,
    emitter: ProgressEmitter,
    cancel: Arc<AtomicBool>,
}

impl Downloader {
    pub fn new(backend: Box<dyn ExtractionBackend>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            probe: Box::new(NoProbe),
            output_dir: output_dir.into(),
            env: EnvDefaults::default(),
            emitter: ProgressEmitter::new(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_probe(mut self, probe: Box<dyn MediaProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_env_defaults(mut self, env: EnvDefaults) -> Self {
        self.env = env;
        self
    }

    pub fn with_emitter(mut self, emitter: ProgressEmitter) -> Self {
        self.emitter = emitter;
        self
    }

    /// Share a flag checked around every attempt; setting it stops the search
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Resolve a request and run the full search
    pub async fn download(&self, request: &DownloadRequest) -> Result<DownloadOutcome, DownloadError> {
        let spec = quality::resolve(&QualityInputs {
            cli_height: request.target_height,
            legacy_cli_height: request.legacy_height,
            env_height: self.env.target_quality.as_deref(),
            legacy_env_height: self.env.min_height.as_deref(),
            cli_policy: request.policy.as_deref(),
            env_policy: self.env.quality_policy.as_deref(),
        })?;

        let explicit_clients = request
            .clients
            .as_deref()
            .or(self.env.player_clients.as_deref());
        let clients = auth::clients(explicit_clients)?;
        let browsers = auth::cookie_browsers(
            request.cookie_browser.as_deref(),
            self.env.cookies_from_browser.as_deref(),
        );
        let plan = planner::plan(&clients, &browsers);

        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| DownloadError::io(&spec, &self.output_dir, e))?;

        let url = normalize_youtube_url(&request.url);
        info!(
            url = %url,
            target = %spec,
            policy = %spec.policy(),
            attempts_per_mode = plan.len(),
            cookie_browsers = ?browsers,
            "Starting download"
        );
        self.run_search(&url, spec, plan).await
    }

    /// Drive the search for an already resolved target and plan
    pub async fn run_search(
        &self,
        url: &str,
        spec: TargetQualitySpec,
        plan: AttemptPlan,
    ) -> Result<DownloadOutcome, DownloadError> {
        let modes = FormatSelector::modes(&spec);
        let mut search = AttemptSearch::new(spec, modes, plan);
        let executor = AttemptExecutor::new(
            self.backend.as_ref(),
            self.probe.as_ref(),
            &self.output_dir,
            url,
            spec,
        );

        while let Some(scheduled) = search.next_attempt() {
            if self.cancel.load(Ordering::SeqCst) {
                warn!(attempts = search.tried() - 1, "Download cancelled");
                return Err(DownloadError::cancelled(&spec, search.tried() - 1));
            }

            let outcome = executor.run(&scheduled).await?;
            self.emit_status(&scheduled, &outcome);

            // An interrupt also reaches the backend process; its failure is the cancellation
            if self.cancel.load(Ordering::SeqCst) && !matches!(outcome, AttemptOutcome::Success(_)) {
                warn!(attempts = search.tried(), "Download cancelled during attempt");
                return Err(DownloadError::cancelled(&spec, search.tried()));
            }

            match outcome {
                AttemptOutcome::Success(done) => {
                    info!(summary = %report::summary_line(&done), "Download accepted");
                    return Ok(done);
                }
                AttemptOutcome::QualityRejected(reason) | AttemptOutcome::RetryableError(reason) => {
                    search.record_failure(reason);
                }
                AttemptOutcome::FatalError(source) => {
                    warn!(error = %source, "Non-retryable backend error, aborting");
                    return Err(DownloadError::FatalExtraction {
                        target: spec,
                        policy: spec.policy(),
                        source,
                    });
                }
            }
        }

        Err(search.exhausted_error())
    }

    fn emit_status(&self, scheduled: &ScheduledAttempt, outcome: &AttemptOutcome) {
        let detail = match outcome {
            AttemptOutcome::Success(done) => done.fallback_reason.clone(),
            AttemptOutcome::QualityRejected(reason) | AttemptOutcome::RetryableError(reason) => {
                Some(reason.clone())
            }
            AttemptOutcome::FatalError(err) => Some(first_line(&err.message).to_string()),
        };
        self.emitter.emit(AttemptStatus {
            mode: scheduled.mode.name,
            attempt: scheduled.index,
            total: scheduled.total,
            client: scheduled.attempt.client.to_string(),
            auth: scheduled.attempt.auth.label(),
            outcome: outcome.kind(),
            retryable: matches!(
                outcome,
                AttemptOutcome::QualityRejected(_) | AttemptOutcome::RetryableError(_)
            ),
            detail,
        });
    }
}

fn attempt_label(scheduled: &ScheduledAttempt) -> String {
    format!(
        "[{} {}/{} client={} auth={}]",
        scheduled.mode.name,
        scheduled.index,
        scheduled.total,
        scheduled.attempt.client,
        scheduled.attempt.auth
    )
}

fn first_line(message: &str) -> &str {
    message
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
}
