// yt-dlp backend - runs one download per call
//
// Two ways to invoke yt-dlp:
// - native binary (found in common install paths or PATH)
// - `python -m yt_dlp` when YTDLP_PYTHON names an interpreter
//
// Each call downloads with the given format selector, client and cookie
// source, then reports what it fetched through `--dump-json --no-simulate`
// (info JSON) and `--print after_move:filepath` (final path after merge).

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::downloader::errors::ExtractionError;
use crate::downloader::models::{ExtractionRequest, ExtractionResult, StreamRecord};
use crate::downloader::traits::ExtractionBackend;
use crate::downloader::utils::{find_tool, run_output_with_timeout, summarize_stderr};

/// How yt-dlp is launched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YtDlpCommand {
    /// Native `yt-dlp` executable
    Binary(String),
    /// `<python> -m yt_dlp`
    PythonModule(String),
}

impl YtDlpCommand {
    /// Python module mode when an interpreter is configured, else the binary
    pub fn detect(python_override: Option<&str>) -> Self {
        match python_override {
            Some(python) => Self::PythonModule(python.to_string()),
            None => Self::Binary(find_tool("yt-dlp")),
        }
    }

    pub fn program(&self) -> &str {
        match self {
            Self::Binary(path) | Self::PythonModule(path) => path,
        }
    }

    fn base_args(&self) -> Vec<String> {
        match self {
            Self::Binary(_) => Vec::new(),
            Self::PythonModule(_) => vec!["-m".to_string(), "yt_dlp".to_string()],
        }
    }
}

/// Static backend options shared by every attempt
#[derive(Debug, Clone)]
pub struct YtDlpConfig {
    pub output_dir: PathBuf,
    /// yt-dlp output template, relative to `output_dir`
    pub output_template: String,
    /// Container for merged video+audio downloads
    pub merge_output_format: String,
    pub retries: u32,
    pub fragment_retries: u32,
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
}

impl Default for YtDlpConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("out"),
            output_template: "%(title)s.%(ext)s".to_string(),
            merge_output_format: "mp4".to_string(),
            retries: 3,
            fragment_retries: 3,
            proxy: None,
        }
    }
}

impl YtDlpConfig {
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }
}

/// yt-dlp download backend
pub struct YtDlpBackend {
    command: YtDlpCommand,
    config: YtDlpConfig,
}

impl YtDlpBackend {
    pub fn new(command: YtDlpCommand, config: YtDlpConfig) -> Self {
        Self { command, config }
    }

    pub fn command(&self) -> &YtDlpCommand {
        &self.command
    }

    /// Build command arguments for one attempt
    pub fn build_args(&self, request: &ExtractionRequest) -> Vec<String> {
        let output = self.config.output_dir.join(&self.config.output_template);
        let mut args = self.command.base_args();
        args.extend([
            "-f".to_string(),
            request.format_selector.clone(),
            "--no-playlist".to_string(),
            "--restrict-filenames".to_string(),
            "--force-overwrites".to_string(),
            "--merge-output-format".to_string(),
            self.config.merge_output_format.clone(),
            "--retries".to_string(),
            self.config.retries.to_string(),
            "--fragment-retries".to_string(),
            self.config.fragment_retries.to_string(),
            "-o".to_string(),
            output.to_string_lossy().to_string(),
            "--dump-json".to_string(),
            "--no-simulate".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
        ]);

        // Auto mode leaves client choice to yt-dlp
        if let Some(client) = &request.client {
            args.push("--extractor-args".to_string());
            args.push(format!("youtube:player_client={}", client));
        }

        if let Some(browser) = &request.cookie_browser {
            args.push("--cookies-from-browser".to_string());
            args.push(browser.clone());
        }

        if let Some(proxy) = &self.config.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        args.push("--".to_string());
        args.push(request.url.clone());
        args
    }

    /// Parse stdout: JSON lines are info dicts, other lines are final paths
    pub fn parse_output(stdout: &str) -> ExtractionResult {
        let mut result = ExtractionResult::default();
        let mut printed_paths = Vec::new();
        let mut info_paths = Vec::new();

        for line in stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if line.starts_with('{') {
                match serde_json::from_str::<Value>(line) {
                    Ok(json) => Self::apply_info(&json, &mut result, &mut info_paths),
                    Err(e) => warn!(error = %e, "Skipping unparsable info JSON line"),
                }
            } else {
                printed_paths.push(PathBuf::from(line));
            }
        }

        for path in printed_paths.into_iter().chain(info_paths) {
            if !result.reported_paths.contains(&path) {
                result.reported_paths.push(path);
            }
        }
        result
    }

    fn apply_info(json: &Value, result: &mut ExtractionResult, paths: &mut Vec<PathBuf>) {
        result.height = json["height"].as_u64().map(|h| h as u32).or(result.height);
        if let Some(id) = json["format_id"].as_str() {
            result.format_id = Some(id.to_string());
        }

        if let Some(formats) = json["requested_formats"].as_array() {
            result.streams = formats
                .iter()
                .map(|f| StreamRecord {
                    format_id: f["format_id"].as_str().map(|s| s.to_string()),
                    height: f["height"].as_u64().map(|h| h as u32),
                })
                .collect();
        }

        if let Some(downloads) = json["requested_downloads"].as_array() {
            paths.extend(
                downloads
                    .iter()
                    .filter_map(|d| d["filepath"].as_str().or_else(|| d["_filename"].as_str()))
                    .map(PathBuf::from),
            );
        }
        for key in ["filepath", "_filename", "filename"] {
            if let Some(path) = json[key].as_str() {
                paths.push(PathBuf::from(path));
            }
        }
    }
}

#[async_trait]
impl ExtractionBackend for YtDlpBackend {
    fn name(&self) -> &'static str {
        match self.command {
            YtDlpCommand::Binary(_) => "cli-yt-dlp",
            YtDlpCommand::PythonModule(_) => "python-yt-dlp",
        }
    }

    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResult, ExtractionError> {
        let args = self.build_args(request);
        debug!(
            program = self.command.program(),
            args = %args.join(" "),
            "Running yt-dlp"
        );

        // No timeout: long downloads are bounded by yt-dlp's own retries
        let output = run_output_with_timeout(self.command.program(), args, None)
            .await
            .map_err(ExtractionError::new)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::new(summarize_stderr(&stderr)));
        }

        Ok(Self::parse_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(client: Option<&str>, browser: Option<&str>) -> ExtractionRequest {
        ExtractionRequest {
            url: "https://www.youtube.com/watch?v=abc".to_string(),
            format_selector: "bv*[height=720]+ba/b[height=720]".to_string(),
            client: client.map(str::to_string),
            cookie_browser: browser.map(str::to_string),
        }
    }

    fn backend(command: YtDlpCommand) -> YtDlpBackend {
        YtDlpBackend::new(command, YtDlpConfig::default().with_output_dir("/tmp/out"))
    }

    #[test]
    fn test_auto_client_without_cookies() {
        let args = backend(YtDlpCommand::Binary("yt-dlp".to_string()))
            .build_args(&request(None, None));

        assert_eq!(args[0], "-f");
        assert_eq!(args[1], "bv*[height=720]+ba/b[height=720]");
        assert!(!args.iter().any(|a| a == "--extractor-args"));
        assert!(!args.iter().any(|a| a == "--cookies-from-browser"));
        assert!(args.contains(&"--force-overwrites".to_string()));
        assert!(args.contains(&"/tmp/out/%(title)s.%(ext)s".to_string()));
        assert_eq!(args[args.len() - 2], "--");
        assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=abc");
    }

    #[test]
    fn test_client_and_cookies_are_passed() {
        let args = backend(YtDlpCommand::Binary("yt-dlp".to_string()))
            .build_args(&request(Some("ios"), Some("firefox")));

        let client_pos = args.iter().position(|a| a == "--extractor-args").unwrap();
        assert_eq!(args[client_pos + 1], "youtube:player_client=ios");
        let cookie_pos = args
            .iter()
            .position(|a| a == "--cookies-from-browser")
            .unwrap();
        assert_eq!(args[cookie_pos + 1], "firefox");
    }

    #[test]
    fn test_python_module_mode_prefixes_args() {
        let backend = backend(YtDlpCommand::PythonModule("python3".to_string()));
        let args = backend.build_args(&request(None, None));

        assert_eq!(&args[..2], ["-m", "yt_dlp"]);
        assert_eq!(backend.command().program(), "python3");
        assert_eq!(backend.name(), "python-yt-dlp");
    }

    #[test]
    fn test_parse_output_reads_merged_download() {
        let stdout = concat!(
            r#"{"id":"abc","format_id":"136+140","height":720,"#,
            r#""requested_formats":[{"format_id":"136","height":720},{"format_id":"140","height":null}],"#,
            r#""requested_downloads":[{"filepath":"/tmp/out/Clip.mp4"}],"_filename":"/tmp/out/Clip.webm"}"#,
            "\n/tmp/out/Clip.mp4\n"
        );
        let result = YtDlpBackend::parse_output(stdout);

        assert_eq!(result.height, Some(720));
        assert_eq!(result.format_id.as_deref(), Some("136+140"));
        assert_eq!(result.streams.len(), 2);
        assert_eq!(
            result.reported_paths,
            vec![
                PathBuf::from("/tmp/out/Clip.mp4"),
                PathBuf::from("/tmp/out/Clip.webm"),
            ]
        );
    }

    #[test]
    fn test_parse_output_without_height() {
        let stdout = r#"{"id":"abc","requested_formats":[{"format_id":"398","height":720},{"format_id":"251"}]}"#;
        let result = YtDlpBackend::parse_output(stdout);

        assert_eq!(result.height, None);
        assert_eq!(result.metadata_height(), Some(720));
        assert_eq!(result.resolved_format_id().as_deref(), Some("398+251"));
        assert!(result.reported_paths.is_empty());
    }

    #[test]
    fn test_parse_output_ignores_garbage() {
        let result = YtDlpBackend::parse_output("{not json\n\n");
        assert_eq!(result, ExtractionResult::default());
    }
}
