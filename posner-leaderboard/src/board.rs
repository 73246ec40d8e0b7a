use crate::atomic::write_atomic;
use crate::error::LeaderboardError;
use crate::summary::ParticipantSummary;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;

/// Participant summaries ranked by mean response time, fastest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Leaderboard {
    entries: Vec<ParticipantSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Row {
    #[serde(rename = "Participant")]
    participant: String,
    #[serde(rename = "Response Time (s)")]
    mean_rt: Option<f64>,
    #[serde(rename = "Response Time Valid Cues (s)")]
    mean_rt_valid: Option<f64>,
    #[serde(rename = "Response Time Invalid Cues (s)")]
    mean_rt_invalid: Option<f64>,
    #[serde(rename = "Response Time Difference (s)")]
    rt_difference: Option<f64>,
    #[serde(rename = "Accuracy")]
    accuracy: f64,
    #[serde(rename = "Trials")]
    n_trials: usize,
}

impl From<&ParticipantSummary> for Row {
    fn from(s: &ParticipantSummary) -> Self {
        Row {
            participant: s.participant.clone(),
            mean_rt: s.mean_rt,
            mean_rt_valid: s.mean_rt_valid,
            mean_rt_invalid: s.mean_rt_invalid,
            rt_difference: s.rt_difference,
            accuracy: s.accuracy,
            n_trials: s.n_trials,
        }
    }
}

impl From<Row> for ParticipantSummary {
    fn from(r: Row) -> Self {
        ParticipantSummary {
            participant: r.participant,
            n_trials: r.n_trials,
            mean_rt: r.mean_rt,
            mean_rt_valid: r.mean_rt_valid,
            mean_rt_invalid: r.mean_rt_invalid,
            rt_difference: r.rt_difference,
            accuracy: r.accuracy,
        }
    }
}

/// Missing means sort after every measured one.
fn by_mean_rt(a: &ParticipantSummary, b: &ParticipantSummary) -> Ordering {
    let rt = match (a.mean_rt, b.mean_rt) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    rt.then_with(|| a.participant.cmp(&b.participant))
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a participant, or replaces the existing entry with the same key.
    pub fn upsert(&mut self, summary: ParticipantSummary) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.participant == summary.participant)
        {
            Some(existing) => *existing = summary,
            None => self.entries.push(summary),
        }
        self.entries.sort_by(by_mean_rt);
    }

    pub fn entries(&self) -> &[ParticipantSummary] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 1-based rank.
    pub fn rank_of(&self, participant: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.participant == participant)
            .map(|i| i + 1)
    }

    pub fn to_csv(&self) -> Result<Vec<u8>, LeaderboardError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        if self.entries.is_empty() {
            writer.write_record([
                "Participant",
                "Response Time (s)",
                "Response Time Valid Cues (s)",
                "Response Time Invalid Cues (s)",
                "Response Time Difference (s)",
                "Accuracy",
                "Trials",
            ])?;
        }
        for entry in &self.entries {
            writer.serialize(Row::from(entry))?;
        }
        writer
            .into_inner()
            .map_err(|e| LeaderboardError::Csv(e.into_error().into()))
    }

    pub fn save_csv(&self, path: &Path) -> Result<(), LeaderboardError> {
        write_atomic(path, &self.to_csv()?)
    }

    pub fn load_csv(path: &Path) -> Result<Self, LeaderboardError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut board = Self::new();
        for row in reader.deserialize::<Row>() {
            board.upsert(row?.into());
        }
        Ok(board)
    }
}
