use crate::atomic::write_atomic;
use crate::error::LeaderboardError;
use crate::html;
use crate::scan::{AggregationReport, is_csv, scan};
use posner_timing::Timer;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info};

pub const CSV_NAME: &str = "leaderboard.csv";
pub const HTML_NAME: &str = "leaderboard.html";

#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub interval: Duration,
    /// Browser refresh period written into the HTML page.
    pub refresh_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("."),
            interval: Duration::from_secs(2),
            refresh_secs: 10,
        }
    }
}

impl WatchConfig {
    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(CSV_NAME)
    }

    pub fn html_path(&self) -> PathBuf {
        self.output_dir.join(HTML_NAME)
    }
}

type Snapshot = BTreeMap<PathBuf, (Option<SystemTime>, u64)>;

/// Detects changes to the result files under a directory by comparing
/// successive `(path, modified, len)` snapshots.
#[derive(Debug)]
pub struct DirectoryPoller {
    root: PathBuf,
    snapshot: Snapshot,
}

impl DirectoryPoller {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            snapshot: Snapshot::new(),
        }
    }

    /// Takes a fresh snapshot; true when it differs from the previous one.
    pub fn poll(&mut self) -> Result<bool, LeaderboardError> {
        let mut next = Snapshot::new();
        collect(&self.root, &mut next)?;
        let changed = next != self.snapshot;
        self.snapshot = next;
        Ok(changed)
    }

    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.snapshot.keys().map(PathBuf::as_path)
    }
}

fn collect(dir: &Path, out: &mut Snapshot) -> Result<(), LeaderboardError> {
    let entries = std::fs::read_dir(dir).map_err(|e| LeaderboardError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| LeaderboardError::io(dir, e))?.path();
        if path.is_dir() {
            collect(&path, out)?;
        } else if is_csv(&path) {
            // A file removed between listing and stat simply drops out.
            if let Ok(meta) = std::fs::metadata(&path) {
                out.insert(path, (meta.modified().ok(), meta.len()));
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing changed since the last rebuild.
    Idle,
    /// Files changed during the last interval; waiting for them to settle.
    Settling,
    Rebuilt { participants: usize, skipped: usize },
}

/// Keeps `leaderboard.csv` and `leaderboard.html` in sync with the data
/// directory.
pub struct LeaderboardWatcher<T: Timer> {
    config: WatchConfig,
    timer: T,
    poller: DirectoryPoller,
    pending: bool,
}

impl<T: Timer> LeaderboardWatcher<T> {
    pub fn new(config: WatchConfig, timer: T) -> Self {
        let poller = DirectoryPoller::new(&config.data_dir);
        Self {
            config,
            timer,
            poller,
            pending: false,
        }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Creates the data and output directories if missing.
    pub fn create_dirs(&self) -> Result<(), LeaderboardError> {
        for dir in [&self.config.data_dir, &self.config.output_dir] {
            std::fs::create_dir_all(dir).map_err(|e| LeaderboardError::io(dir, e))?;
        }
        Ok(())
    }

    /// Scans the data directory and rewrites both artifacts.
    pub fn rebuild(&self) -> Result<AggregationReport, LeaderboardError> {
        let report = scan(&self.config.data_dir)?;
        report.leaderboard.save_csv(&self.config.csv_path())?;
        let updated = chrono::Local::now().naive_local();
        let page = html::render(&report.leaderboard, updated, self.config.refresh_secs);
        write_atomic(&self.config.html_path(), page.as_bytes())?;
        info!(
            participants = report.leaderboard.len(),
            skipped = report.skipped.len(),
            "leaderboard updated"
        );
        Ok(report)
    }

    /// One polling step. A change is only acted on once a following poll
    /// sees the same snapshot, so files still being written are not read.
    pub fn tick(&mut self) -> Result<Tick, LeaderboardError> {
        if self.poller.poll()? {
            debug!("result files changed");
            self.pending = true;
            return Ok(Tick::Settling);
        }
        if !self.pending {
            return Ok(Tick::Idle);
        }
        let report = self.rebuild()?;
        self.pending = false;
        Ok(Tick::Rebuilt {
            participants: report.leaderboard.len(),
            skipped: report.skipped.len(),
        })
    }

    /// Processes existing data, then polls until `should_stop` is set. The
    /// flag is checked once per interval. Errors during a pass are logged and
    /// the loop keeps going.
    pub fn run(&mut self, should_stop: &AtomicBool) -> Result<(), LeaderboardError> {
        self.create_dirs()?;
        self.poller.poll()?;
        self.rebuild()?;
        info!(
            data_dir = %self.config.data_dir.display(),
            interval_ms = self.config.interval.as_millis() as u64,
            "watching for results"
        );

        while !should_stop.load(Ordering::SeqCst) {
            self.timer.sleep(self.config.interval);
            if let Err(e) = self.tick() {
                error!(error = %e, "leaderboard pass failed");
            }
        }
        info!("stopped watching");
        Ok(())
    }
}
