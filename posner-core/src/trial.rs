use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Screen side a target (or a cue) appears on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSideError(pub String);

impl fmt::Display for ParseSideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected 'left' or 'right', got '{}'", self.0)
    }
}

impl std::error::Error for ParseSideError {}

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            _ => Err(ParseSideError(s.to_string())),
        }
    }
}

/// Lifecycle of a single trial inside a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrialState {
    #[default]
    Pending,
    Presented,
    Complete,
}

/// One presentation/response cycle.
///
/// `position` and `cue_valid` are fixed at generation time. The response
/// fields are written once, when the trial completes; a timed-out trial
/// completes with both left empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub position: Side,
    pub cue_valid: bool,
    pub response: Option<Side>,
    pub response_time: Option<Duration>,
    pub state: TrialState,
}

impl Trial {
    pub fn new(position: Side, cue_valid: bool) -> Self {
        Self {
            position,
            cue_valid,
            response: None,
            response_time: None,
            state: TrialState::Pending,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == TrialState::Complete
    }

    /// `None` until the trial completes. Timeouts count as incorrect.
    pub fn is_correct(&self) -> Option<bool> {
        self.is_complete()
            .then(|| self.response == Some(self.position))
    }

    pub fn to_record(&self) -> TrialRecord {
        TrialRecord {
            position: self.position,
            cue_valid: self.cue_valid,
            response: self.response,
            response_time: self.response_time.map(|d| d.as_secs_f64()),
        }
    }
}

/// One row of a per-block result file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub position: Side,
    pub cue_valid: bool,
    pub response: Option<Side>,
    /// Seconds from target onset to keypress.
    pub response_time: Option<f64>,
}

impl TrialRecord {
    pub fn is_correct(&self) -> bool {
        self.response == Some(self.position)
    }
}
