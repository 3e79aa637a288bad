// ffprobe-based media probe
//
// Only consulted when yt-dlp's metadata has no height for the fetched file.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::downloader::traits::MediaProbe;
use crate::downloader::utils::{find_tool, run_output_with_timeout};

const PROBE_TIMEOUT_SECS: u64 = 30;

pub struct FfprobeProbe {
    ffprobe_path: String,
}

impl FfprobeProbe {
    pub fn new() -> Self {
        Self {
            ffprobe_path: find_tool("ffprobe"),
        }
    }

    fn build_args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-select_streams".to_string(),
            "v:0".to_string(),
            "-show_entries".to_string(),
            "stream=height".to_string(),
            "-of".to_string(),
            "csv=p=0".to_string(),
            path.to_string_lossy().to_string(),
        ]
    }

    fn parse_height(stdout: &str) -> Option<u32> {
        stdout
            .lines()
            .map(|l| l.trim().trim_end_matches(','))
            .find(|l| !l.is_empty())
            .and_then(|l| l.parse().ok())
            .filter(|h| *h > 0)
    }
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    async fn probe_height(&self, path: &Path) -> Option<u32> {
        let output = run_output_with_timeout(
            &self.ffprobe_path,
            Self::build_args(path),
            Some(PROBE_TIMEOUT_SECS),
        )
        .await;

        match output {
            Ok(out) if out.status.success() => {
                let height = Self::parse_height(&String::from_utf8_lossy(&out.stdout));
                debug!(path = %path.display(), ?height, "Probed media height");
                height
            }
            Ok(out) => {
                debug!(
                    path = %path.display(),
                    stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                    "ffprobe failed"
                );
                None
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "ffprobe unavailable");
                None
            }
        }
    }
}
