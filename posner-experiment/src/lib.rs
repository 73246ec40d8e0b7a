pub mod block;
pub mod config;
pub mod error;
pub mod input;
pub mod screen;
pub mod sequence;
pub mod session;
pub mod storage;

pub use block::{Block, BlockState, TrialCue};
pub use config::ExperimentConfig;
pub use error::{
    BlockError, ConfigError, ConfigViolation, ExperimentError, InputError, ScreenError,
    SequenceError, StorageError, ViolationKind,
};
pub use input::{InputSource, Key, KeyWait, RandomInput, ScriptedInput};
pub use screen::{NullScreen, RecordingScreen, Screen};
pub use sequence::{DEFAULT_MAX_ATTEMPTS, SequenceSpec, generate, invalid_gaps};
pub use session::{ExperimentSummary, Session, TrialOutcome};
