use crate::error::LeaderboardError;
use std::io::Write;
use std::path::Path;

/// Replaces `path` with `contents` so that readers see either the old file
/// or the new one, never a partial write. The temporary file lives in the
/// destination directory so the final rename stays on one filesystem.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), LeaderboardError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".leaderboard")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| LeaderboardError::io(dir, e))?;
    tmp.write_all(contents)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| LeaderboardError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| LeaderboardError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}
