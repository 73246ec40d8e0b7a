//! Lenient reader for per-block result files.
//!
//! Accepts the current layout (`position,cue_valid,response,response_time`)
//! as well as older files that used `side`/`valid`/`time` headers, Python
//! style `True`/`False` booleans, or stored correctness instead of the key
//! pressed in the `response` column.

use crate::error::FileError;
use posner_core::Side;
use std::path::Path;

/// One trial reduced to what the leaderboard needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredTrial {
    pub cue_valid: bool,
    pub correct: bool,
    /// Seconds; `None` when the trial got no response.
    pub response_time: Option<f64>,
}

struct Columns {
    position: usize,
    cue_valid: usize,
    response: usize,
    response_time: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, FileError> {
        let find = |names: &[&str], column: &'static str| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
                .ok_or(FileError::MissingColumn(column))
        };
        Ok(Self {
            position: find(&["position", "side"], "position")?,
            cue_valid: find(&["cue_valid", "valid"], "cue_valid")?,
            response: find(&["response"], "response")?,
            response_time: find(&["response_time", "time", "rt"], "response_time")?,
        })
    }
}

pub fn read_result_file(path: &Path) -> Result<Vec<ScoredTrial>, FileError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;
    let columns = Columns::locate(reader.headers()?)?;

    let mut trials = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let cell = |idx: usize| record.get(idx).unwrap_or("");
        let bad = |column: &'static str, value: &str| FileError::BadValue {
            row,
            column,
            value: value.to_string(),
        };

        let raw = cell(columns.position);
        let position: Side = raw.parse().map_err(|_| bad("position", raw))?;

        let raw = cell(columns.cue_valid);
        let cue_valid = parse_bool(raw).ok_or_else(|| bad("cue_valid", raw))?;

        let raw = cell(columns.response);
        let correct = if raw.is_empty() {
            false
        } else if let Ok(side) = raw.parse::<Side>() {
            side == position
        } else {
            parse_bool(raw).ok_or_else(|| bad("response", raw))?
        };

        let raw = cell(columns.response_time);
        let response_time = if raw.is_empty() {
            None
        } else {
            match raw.parse::<f64>() {
                Ok(t) if t.is_finite() && t >= 0.0 => Some(t),
                _ => return Err(bad("response_time", raw)),
            }
        };

        trials.push(ScoredTrial {
            cue_valid,
            correct,
            response_time,
        });
    }
    Ok(trials)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
