use crate::reader::ScoredTrial;

/// Per-participant task performance. Times are in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantSummary {
    pub participant: String,
    pub n_trials: usize,
    pub mean_rt: Option<f64>,
    pub mean_rt_valid: Option<f64>,
    pub mean_rt_invalid: Option<f64>,
    /// Invalid minus valid: the cueing effect.
    pub rt_difference: Option<f64>,
    /// Share of all trials answered with the target side; timeouts count as errors.
    pub accuracy: f64,
}

/// Returns `None` when there is nothing to summarise.
pub fn summarize(participant: &str, trials: &[ScoredTrial]) -> Option<ParticipantSummary> {
    if trials.is_empty() {
        return None;
    }
    let mean_rt = mean(trials.iter().filter_map(|t| t.response_time));
    let mean_rt_valid = mean(
        trials
            .iter()
            .filter(|t| t.cue_valid)
            .filter_map(|t| t.response_time),
    );
    let mean_rt_invalid = mean(
        trials
            .iter()
            .filter(|t| !t.cue_valid)
            .filter_map(|t| t.response_time),
    );
    let rt_difference = mean_rt_invalid.zip(mean_rt_valid).map(|(i, v)| i - v);
    let correct = trials.iter().filter(|t| t.correct).count();

    Some(ParticipantSummary {
        participant: participant.to_string(),
        n_trials: trials.len(),
        mean_rt,
        mean_rt_valid,
        mean_rt_invalid,
        rt_difference,
        accuracy: correct as f64 / trials.len() as f64,
    })
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}
