//! Error types for sequence generation, block bookkeeping, configuration,
//! result storage and the session collaborators.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a trial sequence.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SequenceError {
    #[error("p_valid must be in (0, 1], got {p_valid}")]
    ProbabilityOutOfRange { p_valid: f64 },

    #[error("a block needs at least two trials")]
    EmptyBlock,

    #[error(
        "{n_trials} trials can't be evenly divided between left/right and valid/invalid with p_valid={p_valid}"
    )]
    UnevenSplit { n_trials: usize, p_valid: f64 },

    #[error("max_attempts must be at least 1")]
    NoAttempts,

    /// Every shuffle drawn within the attempt bound violated the spacing constraint.
    #[error("no feasible sequence with min_gap={min_gap} after {attempts} attempts")]
    Infeasible { attempts: usize, min_gap: usize },
}

impl SequenceError {
    /// True for structural problems with the requested sequence,
    /// false when sampling merely ran out of attempts.
    pub fn is_validation(&self) -> bool {
        !matches!(self, SequenceError::Infeasible { .. })
    }
}

/// Misuse of the [`Block`](crate::Block) traversal protocol.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockError {
    #[error("sequence has not been started")]
    NotStarted,

    #[error("trial {index} is still waiting for a response")]
    ResponsePending { index: usize },

    #[error("a response was already recorded for trial {index}")]
    AlreadyRecorded { index: usize },
}

/// One problem found while validating a configuration document.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigViolation {
    pub key: String,
    pub kind: ViolationKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    Missing,
    WrongType { expected: &'static str },
    OutOfRange { reason: String },
    Sequence(SequenceError),
}

impl ConfigViolation {
    pub fn new(key: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            key: key.into(),
            kind,
        }
    }
}

impl fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::Missing => write!(f, "config does not contain {}", self.key),
            ViolationKind::WrongType { expected } => write!(f, "{} must be {}", self.key, expected),
            ViolationKind::OutOfRange { reason } => write!(f, "{} {}", self.key, reason),
            ViolationKind::Sequence(e) => write!(f, "{}: {}", self.key, e),
        }
    }
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("couldn't find config file at {0}")]
    NotFound(PathBuf),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {}", join_violations(.0))]
    Invalid(Vec<ConfigViolation>),
}

impl ConfigError {
    pub fn violations(&self) -> &[ConfigViolation] {
        match self {
            ConfigError::Invalid(v) => v,
            _ => &[],
        }
    }
}

fn join_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result file errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("folder for subject already exists: {path} (change the subject ID or overwrite)")]
    SubjectExists { path: PathBuf },

    #[error("block has {pending} trials without a response")]
    IncompleteBlock { pending: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Failure of the participant input collaborator.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("scripted input has no answers left")]
    Exhausted,

    #[error("input device disconnected")]
    Disconnected,
}

/// Failure of the presentation collaborator.
#[derive(Error, Debug)]
pub enum ScreenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything that can stop a running session.
#[derive(Error, Debug)]
pub enum ExperimentError {
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error(transparent)]
    Block(#[from] BlockError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("input error: {0}")]
    Input(#[from] InputError),

    #[error("screen error: {0}")]
    Screen(#[from] ScreenError),

    #[error("experiment aborted by participant")]
    Aborted,
}
