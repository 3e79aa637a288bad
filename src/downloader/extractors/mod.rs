// Extraction backends
//
// - yt-dlp: native binary or `python -m yt_dlp` (YTDLP_PYTHON)
// - ffprobe: height probe for artifacts whose metadata lacks one

mod probe;
mod ytdlp;

pub use probe::FfprobeProbe;
pub use ytdlp::{YtDlpBackend, YtDlpCommand, YtDlpConfig};
