use crate::block::Block;
use crate::error::StorageError;
use posner_core::TrialRecord;
use std::path::{Path, PathBuf};
use tracing::info;

/// `sub-01`, `sub-02`, ...
pub fn subject_label(subject_id: u32) -> String {
    format!("sub-{subject_id:02}")
}

/// Creates `root/data/sub-XX`. An existing folder is reused only with `overwrite`.
pub fn create_subject_dir(
    root: &Path,
    subject_id: u32,
    overwrite: bool,
) -> Result<PathBuf, StorageError> {
    let dir = root.join("data").join(subject_label(subject_id));
    if dir.exists() {
        if !overwrite {
            return Err(StorageError::SubjectExists { path: dir });
        }
        return Ok(dir);
    }
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// `<subject_dir>/<subject>_block<N>.csv`, with `N` counted from 1.
pub fn block_path(subject_dir: &Path, block_index: usize) -> PathBuf {
    let subject = subject_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    subject_dir.join(format!("{subject}_block{}.csv", block_index + 1))
}

pub fn write_block(
    subject_dir: &Path,
    block_index: usize,
    block: &Block,
) -> Result<PathBuf, StorageError> {
    if !block.is_complete() {
        return Err(StorageError::IncompleteBlock {
            pending: block.pending(),
        });
    }
    let path = block_path(subject_dir, block_index);
    write_records(&path, &block.records())?;
    info!(path = %path.display(), trials = block.len(), "block saved");
    Ok(path)
}

pub fn write_records(path: &Path, records: &[TrialRecord]) -> Result<(), StorageError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_block(path: &Path) -> Result<Vec<TrialRecord>, StorageError> {
    let mut reader = csv::Reader::from_path(path)?;
    let records = reader.deserialize().collect::<Result<Vec<TrialRecord>, _>>()?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use posner_core::{Side, Trial};
    use std::time::Duration;

    fn answered_block() -> Block {
        let mut block = Block::from_trials(vec![
            Trial::new(Side::Left, true),
            Trial::new(Side::Right, false),
        ]);
        block.next_trial().unwrap();
        block
            .record_response(Some(Side::Left), Some(Duration::from_millis(600)))
            .unwrap();
        block.next_trial().unwrap();
        block.record_response(None, None).unwrap();
        block
    }

    #[test]
    fn subject_dir_is_zero_padded() {
        let root = tempfile::tempdir().unwrap();
        let dir = create_subject_dir(root.path(), 1, false).unwrap();
        assert!(dir.is_dir());
        assert_eq!(dir, root.path().join("data").join("sub-01"));
        assert_eq!(subject_label(123), "sub-123");
    }

    #[test]
    fn existing_subject_dir_needs_overwrite() {
        let root = tempfile::tempdir().unwrap();
        create_subject_dir(root.path(), 4, false).unwrap();
        assert!(create_subject_dir(root.path(), 4, true).is_ok());
        assert!(matches!(
            create_subject_dir(root.path(), 4, false),
            Err(StorageError::SubjectExists { .. })
        ));
    }

    #[test]
    fn block_file_layout() {
        let root = tempfile::tempdir().unwrap();
        let dir = create_subject_dir(root.path(), 1, false).unwrap();
        let path = write_block(&dir, 0, &answered_block()).unwrap();

        assert_eq!(path.file_name().unwrap(), "sub-01_block1.csv");
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "position,cue_valid,response,response_time",
                "left,true,left,0.6",
                "right,false,,",
            ]
        );
    }

    #[test]
    fn written_blocks_read_back() {
        let root = tempfile::tempdir().unwrap();
        let dir = create_subject_dir(root.path(), 2, false).unwrap();
        let block = answered_block();
        let path = write_block(&dir, 3, &block).unwrap();
        assert_eq!(read_block(&path).unwrap(), block.records());
    }

    #[test]
    fn incomplete_blocks_are_not_written() {
        let root = tempfile::tempdir().unwrap();
        let block = Block::from_trials(vec![Trial::new(Side::Left, true)]);
        assert!(matches!(
            write_block(root.path(), 0, &block),
            Err(StorageError::IncompleteBlock { pending: 1 })
        ));
    }
}
