// Target quality resolution and acceptance rules
//
// Height precedence: CLI target > legacy CLI alias > YT_TARGET_QUALITY >
// YT_MIN_HEIGHT > 720. Policy precedence: CLI > YT_QUALITY_POLICY > strict.
// Only the winning source is validated.

use tracing::debug;

use super::errors::ConfigError;
use super::models::{
    QualityPolicy, TargetQualitySpec, DEFAULT_TARGET_HEIGHT, MAX_TARGET_HEIGHT, MIN_TARGET_HEIGHT,
};

/// Raw quality inputs, already captured from CLI and environment
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityInputs<'a> {
    pub cli_height: Option<u32>,
    pub legacy_cli_height: Option<u32>,
    pub env_height: Option<&'a str>,
    pub legacy_env_height: Option<&'a str>,
    pub cli_policy: Option<&'a str>,
    pub env_policy: Option<&'a str>,
}

/// Resolve and validate the target quality for one request
pub fn resolve(inputs: &QualityInputs<'_>) -> Result<TargetQualitySpec, ConfigError> {
    let height = resolve_target_height(inputs)?;
    let policy = resolve_policy(inputs.cli_policy, inputs.env_policy)?;
    debug!(height, %policy, "Resolved target quality");
    TargetQualitySpec::new(height, policy)
}

pub fn resolve_target_height(inputs: &QualityInputs<'_>) -> Result<u32, ConfigError> {
    if let Some(height) = inputs.cli_height {
        return check_bounds("--target-quality", height);
    }
    if let Some(height) = inputs.legacy_cli_height {
        return check_bounds("--min-height", height);
    }
    if let Some(raw) = non_blank(inputs.env_height) {
        return parse_height("YT_TARGET_QUALITY", raw);
    }
    if let Some(raw) = non_blank(inputs.legacy_env_height) {
        return parse_height("YT_MIN_HEIGHT", raw);
    }
    Ok(DEFAULT_TARGET_HEIGHT)
}

pub fn resolve_policy(
    cli_policy: Option<&str>,
    env_policy: Option<&str>,
) -> Result<QualityPolicy, ConfigError> {
    if let Some(raw) = non_blank(cli_policy) {
        return parse_policy("--quality-policy", raw);
    }
    if let Some(raw) = non_blank(env_policy) {
        return parse_policy("YT_QUALITY_POLICY", raw);
    }
    Ok(QualityPolicy::default())
}

/// Parse a height string from the given source
pub fn parse_height(source_name: &'static str, raw: &str) -> Result<u32, ConfigError> {
    let height: u32 = raw.trim().parse().map_err(|_| ConfigError::InvalidHeight {
        source_name,
        value: raw.to_string(),
        min: MIN_TARGET_HEIGHT,
        max: MAX_TARGET_HEIGHT,
    })?;
    check_bounds(source_name, height)
}

fn parse_policy(source_name: &'static str, raw: &str) -> Result<QualityPolicy, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidPolicy {
        source_name,
        value: raw.to_string(),
    })
}

fn check_bounds(source_name: &'static str, height: u32) -> Result<u32, ConfigError> {
    if (MIN_TARGET_HEIGHT..=MAX_TARGET_HEIGHT).contains(&height) {
        Ok(height)
    } else {
        Err(ConfigError::HeightOutOfRange {
            source_name,
            value: height,
            min: MIN_TARGET_HEIGHT,
            max: MAX_TARGET_HEIGHT,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Policy-level acceptance of an achieved height.
///
/// Strict wants the exact target; best effort takes anything up to it.
pub fn is_quality_acceptable(height: u32, target: u32, policy: QualityPolicy) -> bool {
    match policy {
        QualityPolicy::Strict => height == target,
        QualityPolicy::BestEffort => height <= target,
    }
}
