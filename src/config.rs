//! Environment defaults.
//!
//! Every environment variable the downloader honors is read here, once, and
//! handed to the engine as plain values. Nothing below this module touches
//! `std::env`.

use std::path::PathBuf;

use tracing::debug;

pub const ENV_TARGET_QUALITY: &str = "YT_TARGET_QUALITY";
pub const ENV_MIN_HEIGHT: &str = "YT_MIN_HEIGHT";
pub const ENV_QUALITY_POLICY: &str = "YT_QUALITY_POLICY";
pub const ENV_COOKIES_FROM_BROWSER: &str = "YT_COOKIES_FROM_BROWSER";
pub const ENV_PLAYER_CLIENTS: &str = "YT_PLAYER_CLIENTS";
pub const ENV_OUTPUT_DIR: &str = "YT_OUTPUT_DIR";
pub const ENV_YTDLP_PYTHON: &str = "YTDLP_PYTHON";
pub const ENV_YTDLP_PROXY: &str = "YTDLP_PROXY";

/// Output directory used when neither CLI nor environment name one
pub const DEFAULT_OUTPUT_DIR: &str = "out";

/// Captured environment values. Blank values are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDefaults {
    pub target_quality: Option<String>,
    pub min_height: Option<String>,
    pub quality_policy: Option<String>,
    pub cookies_from_browser: Option<String>,
    pub player_clients: Option<Vec<String>>,
    pub output_dir: Option<PathBuf>,
    /// Python interpreter for `python -m yt_dlp` mode
    pub ytdlp_python: Option<String>,
    pub proxy: Option<String>,
}

impl EnvDefaults {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (tests pass a map instead of the process env)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let defaults = Self {
            target_quality: get(ENV_TARGET_QUALITY),
            min_height: get(ENV_MIN_HEIGHT),
            quality_policy: get(ENV_QUALITY_POLICY),
            cookies_from_browser: get(ENV_COOKIES_FROM_BROWSER),
            player_clients: get(ENV_PLAYER_CLIENTS).map(|raw| split_list(&raw)),
            output_dir: get(ENV_OUTPUT_DIR).map(PathBuf::from),
            ytdlp_python: get(ENV_YTDLP_PYTHON),
            proxy: get(ENV_YTDLP_PROXY),
        };
        debug!(?defaults, "Captured environment defaults");
        defaults
    }

    /// Output directory: explicit value, then environment, then `./out`
    pub fn resolve_output_dir(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}
