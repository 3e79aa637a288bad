// Output directory bookkeeping
//
// Every attempt snapshots the output directory before running. A file counts
// as produced by the attempt only if it is new or its identity (size, mtime)
// changed since the snapshot.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};

/// Extensions of in-progress backend files that are never final artifacts
const PARTIAL_EXTENSIONS: [&str; 4] = ["part", "ytdl", "temp", "tmp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileIdentity {
    len: u64,
    modified: Option<SystemTime>,
}

impl FileIdentity {
    fn of(meta: &std::fs::Metadata) -> Self {
        Self {
            len: meta.len(),
            modified: meta.modified().ok(),
        }
    }
}

/// Files present in the output directory at one point in time
#[derive(Debug, Clone, Default)]
pub struct ArtifactSnapshot {
    files: HashMap<PathBuf, FileIdentity>,
}

impl ArtifactSnapshot {
    /// Capture the directory. A missing directory yields an empty snapshot.
    pub fn capture(dir: &Path) -> io::Result<Self> {
        Ok(Self {
            files: scan(dir)?.into_iter().collect(),
        })
    }

    /// Whether `path` is still exactly as it was when the snapshot was taken
    pub fn is_unchanged(&self, path: &Path) -> bool {
        let Some(before) = self.files.get(path) else {
            return false;
        };
        match identity(path) {
            Some(now) => now == *before,
            None => false,
        }
    }

    /// Newest file created or changed since this snapshot
    pub fn newest_since(&self, dir: &Path) -> io::Result<Option<PathBuf>> {
        let newest = scan(dir)?
            .into_iter()
            .filter(|(path, identity)| self.files.get(path) != Some(identity))
            .max_by_key(|(_, identity)| identity.modified)
            .map(|(path, _)| path);
        Ok(newest)
    }
}

/// Pick the artifact for a finished attempt: reported paths first, then the
/// snapshot diff.
pub fn locate_artifact(
    reported: &[PathBuf],
    snapshot: &ArtifactSnapshot,
    dir: &Path,
) -> io::Result<Option<PathBuf>> {
    // A reported path left over from an earlier run is not this attempt's output
    if let Some(path) = reported
        .iter()
        .find(|p| p.is_file() && !snapshot.is_unchanged(p))
    {
        return Ok(Some(path.clone()));
    }
    if !reported.is_empty() {
        debug!(reported = ?reported, "No reported path was produced, falling back to directory diff");
    }
    snapshot.newest_since(dir)
}

/// Delete a rejected artifact. Missing files are fine; other failures are
/// logged and swallowed.
pub fn remove_artifact(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed rejected artifact"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove rejected artifact"),
    }
}

fn scan(dir: &Path) -> io::Result<Vec<(PathBuf, FileIdentity)>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if is_partial(&path) {
            continue;
        }
        // Entries can vanish between read_dir and metadata
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        files.push((path, FileIdentity::of(&meta)));
    }
    Ok(files)
}

fn identity(path: &Path) -> Option<FileIdentity> {
    std::fs::metadata(path)
        .ok()
        .filter(|meta| meta.is_file())
        .map(|meta| FileIdentity::of(&meta))
}

fn is_partial(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |ext| {
            PARTIAL_EXTENSIONS
                .iter()
                .any(|p| ext.eq_ignore_ascii_case(p))
        })
}
