pub mod config;
pub mod downloader;

pub use config::EnvDefaults;
pub use downloader::report::summary_line;
pub use downloader::{
    ConfigError, DownloadError, DownloadOutcome, DownloadRequest, Downloader, ExtractionBackend,
    MediaProbe, QualityPolicy, TargetQualitySpec,
};
