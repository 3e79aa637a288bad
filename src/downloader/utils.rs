// Helper functions for backend implementations

use std::path::{Path, PathBuf};
use std::process::Stdio;

use regex::Regex;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration as TokioDuration};
use tracing::debug;

lazy_static::lazy_static! {
    static ref LIVE_URL_RE: Regex = Regex::new(
        r"(?i)^(?:https?://)?(?:[\w-]+\.)*youtube\.com/live/([\w-]+)"
    ).unwrap();
}

/// Rewrite `youtube.com/live/<id>` links to the regular watch URL.
/// Anything else is returned unchanged.
pub fn normalize_youtube_url(url: &str) -> String {
    let trimmed = url.trim();
    match LIVE_URL_RE.captures(trimmed) {
        Some(caps) => format!("https://www.youtube.com/watch?v={}", &caps[1]),
        None => trimmed.to_string(),
    }
}

/// Run command and collect its output, optionally bounded by a timeout.
/// The child is killed when the timeout fires.
pub async fn run_output_with_timeout(
    program: &str,
    args: Vec<String>,
    timeout_secs: Option<u64>,
) -> Result<std::process::Output, String> {
    let mut child = TokioCommand::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| format!("Failed to start {}: {}", program, e))?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| format!("Failed to capture stdout from {}", program))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| format!("Failed to capture stderr from {}", program))?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe
            .read_to_end(&mut buf)
            .await
            .map_err(|e| format!("Failed to read stdout: {}", e))?;
        Ok::<Vec<u8>, String>(buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe
            .read_to_end(&mut buf)
            .await
            .map_err(|e| format!("Failed to read stderr: {}", e))?;
        Ok::<Vec<u8>, String>(buf)
    });

    let status = match timeout_secs {
        Some(secs) => match timeout(TokioDuration::from_secs(secs), child.wait()).await {
            Ok(status) => status,
            Err(_) => {
                let _ = child.kill().await;
                stdout_task.abort();
                stderr_task.abort();
                return Err(format!("Timed out after {}s", secs));
            }
        },
        None => child.wait().await,
    }
    .map_err(|e| format!("Failed to wait for {}: {}", program, e))?;

    let stdout = stdout_task
        .await
        .map_err(|e| format!("stdout task failed: {}", e))??;
    let stderr = stderr_task
        .await
        .map_err(|e| format!("stderr task failed: {}", e))??;
    Ok(std::process::Output {
        status,
        stdout,
        stderr,
    })
}

/// Locate a tool binary: common install paths, `~/.local/bin`, then `PATH`.
/// Falls back to the bare name so spawning reports the failure.
pub fn find_tool(binary_name: &str) -> String {
    let mut candidates: Vec<PathBuf> = [
        "/opt/homebrew/bin", // Homebrew on Apple Silicon
        "/usr/local/bin",    // Homebrew on Intel Mac
        "/usr/bin",          // System installation
    ]
    .iter()
    .map(|dir| Path::new(dir).join(binary_name))
    .collect();

    // pip install --user
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".local/bin").join(binary_name));
    }

    if let Some(found) = candidates.iter().find(|p| p.is_file()) {
        debug!(tool = binary_name, path = %found.display(), "Found tool");
        return found.to_string_lossy().to_string();
    }

    if let Some(found) = search_path(binary_name) {
        debug!(tool = binary_name, path = %found.display(), "Found tool in PATH");
        return found.to_string_lossy().to_string();
    }

    binary_name.to_string()
}

fn search_path(binary_name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(binary_name))
        .find(|p| p.is_file())
}

/// Reduce backend stderr to its `ERROR:` lines; falls back to the last
/// non-empty line so user-facing messages never carry a full dump.
pub fn summarize_stderr(stderr: &str) -> String {
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("ERROR:"))
        .collect();
    if !errors.is_empty() {
        return errors.join("\n");
    }
    stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .last()
        .unwrap_or("backend exited without output")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_url_is_rewritten() {
        assert_eq!(
            normalize_youtube_url("https://www.youtube.com/live/AbC_123?si=x"),
            "https://www.youtube.com/watch?v=AbC_123"
        );
        assert_eq!(
            normalize_youtube_url("youtube.com/live/xyz"),
            "https://www.youtube.com/watch?v=xyz"
        );
    }

    #[test]
    fn test_other_urls_are_unchanged() {
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
        assert_eq!(normalize_youtube_url(url), url);
        assert_eq!(
            normalize_youtube_url("https://vimeo.com/live/123"),
            "https://vimeo.com/live/123"
        );
    }

    #[test]
    fn test_summarize_keeps_error_lines() {
        let stderr = "[youtube] abc: Downloading webpage\n\
                      WARNING: something minor\n\
                      ERROR: [youtube] abc: Requested format is not available\n";
        assert_eq!(
            summarize_stderr(stderr),
            "ERROR: [youtube] abc: Requested format is not available"
        );
    }

    #[test]
    fn test_summarize_without_error_lines() {
        assert_eq!(summarize_stderr("line one\nline two\n\n"), "line two");
        assert_eq!(summarize_stderr(""), "backend exited without output");
    }

    #[test]
    fn test_find_tool_falls_back_to_name() {
        assert_eq!(
            find_tool("definitely-not-a-real-tool-xyz"),
            "definitely-not-a-real-tool-xyz"
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let result =
            run_output_with_timeout("definitely-not-a-real-tool-xyz", Vec::new(), Some(5)).await;
        assert!(result.unwrap_err().starts_with("Failed to start"));
    }
}
