// Downloader module - quality-constrained attempt search over yt-dlp

pub mod artifacts;
pub mod auth;
pub mod diagnostics;
pub mod errors;
pub mod extractors;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod planner;
pub mod quality;
pub mod report;
pub mod traits;
pub mod utils;

pub use errors::{ConfigError, DownloadError, ExtractionError};
pub use extractors::{FfprobeProbe, YtDlpBackend, YtDlpCommand, YtDlpConfig};
pub use models::{
    Attempt, AttemptOutcome, AttemptPlan, AttemptStatus, AuthContext, ClientCandidate,
    DownloadOutcome, DownloadRequest, ExtractionRequest, ExtractionResult, QualityMode,
    QualityPolicy, StreamRecord, TargetQualitySpec,
};
pub use orchestrator::{AttemptExecutor, AttemptSearch, Downloader, ScheduledAttempt};
pub use traits::{ExtractionBackend, MediaProbe, NoProbe, ProgressEmitter};
