// Outcome reporting for accepted attempts

use std::path::PathBuf;

use super::models::{Attempt, DownloadOutcome, QualityMode, QualityPolicy, TargetQualitySpec};

/// A result is a fallback when it is known to be below the target, or when
/// a strict request had to settle for the relaxed selector.
pub fn is_fallback(spec: &TargetQualitySpec, mode: &QualityMode, achieved: Option<u32>) -> bool {
    let below_target = achieved.map_or(false, |h| h < spec.height());
    let relaxed_under_strict =
        !mode.requires_exact_match && spec.policy() == QualityPolicy::Strict;
    below_target || relaxed_under_strict
}

pub fn fallback_reason(
    spec: &TargetQualitySpec,
    mode: &QualityMode,
    achieved: Option<u32>,
) -> Option<String> {
    if !is_fallback(spec, mode, achieved) {
        return None;
    }
    let reason = match achieved {
        Some(h) if h < spec.height() => format!(
            "requested {}p but best available was {}p (mode {})",
            spec.height(),
            h,
            mode.name
        ),
        Some(h) => format!(
            "exact {}p selector failed on every attempt; accepted {}p from mode {}",
            spec.height(),
            h,
            mode.name
        ),
        None => format!(
            "exact {}p selector failed on every attempt; accepted unknown height from mode {}",
            spec.height(),
            mode.name
        ),
    };
    Some(reason)
}

/// Assemble the final record for an accepted attempt
pub fn build_outcome(
    spec: &TargetQualitySpec,
    mode: &QualityMode,
    attempt: &Attempt,
    path: PathBuf,
    achieved_height: Option<u32>,
    format_id: Option<String>,
) -> DownloadOutcome {
    DownloadOutcome {
        path,
        client: attempt.client.clone(),
        auth_context: attempt.auth.clone(),
        achieved_height,
        format_id,
        target_quality: spec.height(),
        policy: spec.policy(),
        fallback: is_fallback(spec, mode, achieved_height),
        fallback_reason: fallback_reason(spec, mode, achieved_height),
    }
}

/// One-line human summary of an outcome
pub fn summary_line(outcome: &DownloadOutcome) -> String {
    let height = outcome
        .achieved_height
        .map_or_else(|| "unknown height".to_string(), |h| format!("{}p", h));
    let mut line = format!(
        "Saved: {} ({}, format {}, client {}, auth {}, target {}p {})",
        outcome.path.display(),
        height,
        outcome.format_id.as_deref().unwrap_or("unknown"),
        outcome.client,
        outcome.auth_context,
        outcome.target_quality,
        outcome.policy,
    );
    if let Some(reason) = &outcome.fallback_reason {
        line.push_str(&format!(" [fallback: {}]", reason));
    }
    line
}
