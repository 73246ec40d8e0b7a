use crate::board::Leaderboard;
use crate::error::LeaderboardError;
use crate::reader::{ScoredTrial, read_result_file};
use crate::summary::summarize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A result file that was left out of the aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationReport {
    pub leaderboard: Leaderboard,
    pub skipped: Vec<SkippedFile>,
}

/// Rebuilds the leaderboard from `data_dir/<participant>/*.csv`.
///
/// Unreadable or malformed files, and participant folders that cannot be
/// listed, are reported in `skipped`; only failure to list `data_dir` itself
/// is an error.
pub fn scan(data_dir: &Path) -> Result<AggregationReport, LeaderboardError> {
    let mut report = AggregationReport::default();

    for participant_dir in sorted_entries(data_dir, |p| p.is_dir())? {
        let Some(participant) = participant_dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        let trials = participant_trials(&participant_dir, &mut report.skipped);
        if let Some(summary) = summarize(participant, &trials) {
            report.leaderboard.upsert(summary);
        }
    }

    Ok(report)
}

/// Trials from every readable result file in one participant folder.
fn participant_trials(dir: &Path, skipped: &mut Vec<SkippedFile>) -> Vec<ScoredTrial> {
    let files = match sorted_entries(dir, is_csv) {
        Ok(files) => files,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "skipping participant folder");
            skipped.push(SkippedFile {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            });
            return Vec::new();
        }
    };

    let mut trials = Vec::new();
    for file in files {
        match read_result_file(&file) {
            Ok(mut t) => {
                debug!(path = %file.display(), trials = t.len(), "read result file");
                trials.append(&mut t);
            }
            Err(e) => {
                warn!(path = %file.display(), error = %e, "skipping result file");
                skipped.push(SkippedFile {
                    path: file,
                    reason: e.to_string(),
                });
            }
        }
    }
    trials
}

pub(crate) fn is_csv(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn sorted_entries(
    dir: &Path,
    keep: impl Fn(&Path) -> bool,
) -> Result<Vec<PathBuf>, LeaderboardError> {
    let entries = std::fs::read_dir(dir).map_err(|e| LeaderboardError::io(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| LeaderboardError::io(dir, e))?.path();
        if keep(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str = "position,cue_valid,response,response_time\n";

    fn write(dir: &Path, participant: &str, file: &str, body: &str) {
        let p = dir.join(participant);
        fs::create_dir_all(&p).unwrap();
        fs::write(p.join(file), body).unwrap();
    }

    #[test]
    fn aggregates_all_blocks_per_participant() {
        let data = tempfile::tempdir().unwrap();
        write(data.path(), "sub-01", "sub-01_block1.csv", &format!("{HEADER}left,true,left,0.4\n"));
        write(data.path(), "sub-01", "sub-01_block2.csv", &format!("{HEADER}right,false,right,0.6\n"));
        write(data.path(), "sub-02", "sub-02_block1.csv", &format!("{HEADER}left,true,right,0.3\n"));

        let report = scan(data.path()).unwrap();

        assert!(report.skipped.is_empty());
        let entries = report.leaderboard.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].participant, "sub-02");
        assert_eq!(entries[1].participant, "sub-01");
        assert_eq!(entries[1].n_trials, 2);
        assert_eq!(entries[1].accuracy, 1.0);
        assert_eq!(entries[0].accuracy, 0.0);
    }

    #[test]
    fn malformed_files_are_skipped_not_fatal() {
        let data = tempfile::tempdir().unwrap();
        write(data.path(), "sub-01", "good.csv", &format!("{HEADER}left,true,left,0.4\n"));
        write(data.path(), "sub-01", "bad.csv", "garbage\n1,2\n");
        write(data.path(), "sub-02", "bad.csv", &format!("{HEADER}left,maybe,left,0.4\n"));
        write(data.path(), "sub-03", "notes.txt", "not a result file");

        let report = scan(data.path()).unwrap();

        assert_eq!(report.leaderboard.len(), 1);
        assert_eq!(report.leaderboard.rank_of("sub-01"), Some(1));
        assert_eq!(report.skipped.len(), 2);
        assert!(report.skipped[0].reason.contains("missing column"));
        assert!(report.skipped[1].reason.contains("cue_valid"));
    }

    #[test]
    fn unlistable_participant_folder_is_skipped() {
        let data = tempfile::tempdir().unwrap();
        let gone = data.path().join("sub-09");
        let mut skipped = Vec::new();

        let trials = participant_trials(&gone, &mut skipped);

        assert!(trials.is_empty());
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].path, gone);
    }

    #[test]
    fn missing_data_dir_is_an_error() {
        let data = tempfile::tempdir().unwrap();
        assert!(scan(&data.path().join("data")).is_err());
    }
}
