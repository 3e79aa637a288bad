//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use youtube_downloader_lib::DownloadRequest;

/// Download a video at an exact target height, or the best below it.
///
/// Tries every player client without cookies first, then with cookies from
/// each browser, until an attempt satisfies the quality policy.
#[derive(Parser, Debug)]
#[command(name = "youtube-downloader")]
#[command(author, version, about)]
pub struct Args {
    /// Video URL (`youtube.com/live/<id>` links are accepted)
    pub url: String,

    /// Target video height in pixels (144-4320, default 720)
    #[arg(long, value_name = "HEIGHT")]
    pub target_quality: Option<u32>,

    /// Legacy alias for --target-quality
    #[arg(long, value_name = "HEIGHT")]
    pub min_height: Option<u32>,

    /// strict (exact height, fall back only when unavailable) or best_effort
    #[arg(long, value_name = "POLICY")]
    pub quality_policy: Option<String>,

    /// Player client to try (repeatable or comma-separated; default: auto)
    #[arg(long = "client", value_name = "CLIENT", value_delimiter = ',')]
    pub clients: Vec<String>,

    /// Browser to read cookies from; "none" disables cookie attempts
    #[arg(long, value_name = "BROWSER")]
    pub cookies_from_browser: Option<String>,

    /// Directory for downloaded files (default: $YT_OUTPUT_DIR or ./out)
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print the outcome as JSON instead of a summary line
    #[arg(long)]
    pub json: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn to_request(&self) -> DownloadRequest {
        DownloadRequest {
            url: self.url.clone(),
            target_height: self.target_quality,
            legacy_height: self.min_height,
            policy: self.quality_policy.clone(),
            clients: (!self.clients.is_empty()).then(|| self.clients.clone()),
            cookie_browser: self.cookies_from_browser.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://www.youtube.com/watch?v=abc";

    #[test]
    fn test_cli_minimal_args_parse() {
        let args = Args::try_parse_from(["youtube-downloader", URL]).unwrap();
        assert_eq!(args.url, URL);
        assert_eq!(args.target_quality, None);
        assert!(args.clients.is_empty());
        assert!(!args.json);

        let request = args.to_request();
        assert_eq!(request.clients, None);
        assert_eq!(request.policy, None);
    }

    #[test]
    fn test_cli_url_is_required() {
        let err = Args::try_parse_from(["youtube-downloader"]).unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_cli_quality_flags() {
        let args = Args::try_parse_from([
            "youtube-downloader",
            URL,
            "--target-quality",
            "1080",
            "--min-height",
            "480",
            "--quality-policy",
            "best_effort",
        ])
        .unwrap();

        let request = args.to_request();
        assert_eq!(request.target_height, Some(1080));
        assert_eq!(request.legacy_height, Some(480));
        assert_eq!(request.policy.as_deref(), Some("best_effort"));
    }

    #[test]
    fn test_cli_non_numeric_height_is_rejected() {
        let result =
            Args::try_parse_from(["youtube-downloader", URL, "--target-quality", "hd"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
    }

    #[test]
    fn test_cli_clients_repeat_and_split() {
        let args = Args::try_parse_from([
            "youtube-downloader",
            URL,
            "--client",
            "web,ios",
            "--client",
            "android",
        ])
        .unwrap();
        assert_eq!(args.clients, vec!["web", "ios", "android"]);
    }

    #[test]
    fn test_cli_verbose_and_quiet() {
        let args = Args::try_parse_from(["youtube-downloader", URL, "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);

        let args = Args::try_parse_from(["youtube-downloader", URL, "--quiet"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_cookie_and_output_flags() {
        let args = Args::try_parse_from([
            "youtube-downloader",
            URL,
            "--cookies-from-browser",
            "none",
            "-o",
            "/tmp/videos",
            "--json",
        ])
        .unwrap();
        assert_eq!(args.cookies_from_browser.as_deref(), Some("none"));
        assert_eq!(args.output_dir, Some(PathBuf::from("/tmp/videos")));
        assert!(args.json);
    }
}
