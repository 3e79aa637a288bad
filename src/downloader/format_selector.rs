// FormatSelector - quality mode sequencing
//
// Turns a target height into the ordered yt-dlp format selectors to try:
// - exact_target: only streams at exactly the target height
// - best_below_or_equal_target: best stream capped at the target height
//
// Both prefer an mp4/m4a pair (merges without re-encoding) before any
// video+audio pair and finally a combined stream.

use super::models::{QualityMode, QualityPolicy, TargetQualitySpec};

pub const EXACT_TARGET: &str = "exact_target";
pub const BEST_BELOW_OR_EQUAL_TARGET: &str = "best_below_or_equal_target";

/// Format selector builder for quality modes
pub struct FormatSelector;

impl FormatSelector {
    /// Ordered quality modes for a target
    pub fn modes(spec: &TargetQualitySpec) -> Vec<QualityMode> {
        let relaxed = Self::best_below_or_equal_mode(spec.height());
        match spec.policy() {
            QualityPolicy::Strict => vec![Self::exact_mode(spec.height()), relaxed],
            QualityPolicy::BestEffort => vec![relaxed],
        }
    }

    pub fn exact_mode(height: u32) -> QualityMode {
        QualityMode {
            name: EXACT_TARGET,
            selector: Self::exact_spec(height),
            requires_exact_match: true,
        }
    }

    pub fn best_below_or_equal_mode(height: u32) -> QualityMode {
        QualityMode {
            name: BEST_BELOW_OR_EQUAL_TARGET,
            selector: Self::capped_spec(height),
            requires_exact_match: false,
        }
    }

    /// Video+audio at exactly `height`, else a combined stream of that height
    pub fn exact_spec(height: u32) -> String {
        format!(
            "bv*[height={h}][ext=mp4]+ba[ext=m4a]/bv*[height={h}]+ba/b[height={h}]",
            h = height
        )
    }

    /// Best video+audio at or below `height`, else a combined stream
    pub fn capped_spec(height: u32) -> String {
        format!(
            "bv*[height<={h}][ext=mp4]+ba[ext=m4a]/bv*[height<={h}]+ba/b[height<={h}]",
            h = height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_yields_exact_then_relaxed() {
        let spec = TargetQualitySpec::new(720, QualityPolicy::Strict).unwrap();
        let modes = FormatSelector::modes(&spec);

        assert_eq!(modes.len(), 2);
        assert_eq!(modes[0].name, EXACT_TARGET);
        assert!(modes[0].requires_exact_match);
        assert_eq!(modes[1].name, BEST_BELOW_OR_EQUAL_TARGET);
        assert!(!modes[1].requires_exact_match);
    }

    #[test]
    fn test_best_effort_yields_single_relaxed_mode() {
        let spec = TargetQualitySpec::new(1080, QualityPolicy::BestEffort).unwrap();
        let modes = FormatSelector::modes(&spec);

        assert_eq!(modes.len(), 1);
        assert_eq!(modes[0].name, BEST_BELOW_OR_EQUAL_TARGET);
        assert!(modes[0].selector.contains("height<=1080"));
    }

    #[test]
    fn test_exact_selector_targets_exact_height() {
        let selector = FormatSelector::exact_spec(720);
        assert!(selector.contains("height=720"));
        assert!(!selector.contains("height<="));
        assert!(selector.ends_with("b[height=720]"));
    }
}
