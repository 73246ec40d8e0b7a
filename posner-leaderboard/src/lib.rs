pub mod atomic;
pub mod board;
pub mod error;
pub mod html;
pub mod reader;
pub mod scan;
pub mod summary;
pub mod watch;

pub use board::Leaderboard;
pub use error::{FileError, LeaderboardError};
pub use reader::{ScoredTrial, read_result_file};
pub use scan::{AggregationReport, SkippedFile, scan};
pub use summary::{ParticipantSummary, summarize};
pub use watch::{DirectoryPoller, LeaderboardWatcher, Tick, WatchConfig};
