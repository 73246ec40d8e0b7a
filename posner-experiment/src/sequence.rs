//! Counterbalanced trial sequences.
//!
//! A block holds the same number of left and right targets, and within each
//! side a fixed share of valid cues. The order is drawn by rejection
//! sampling: shuffles whose invalid-cue trials sit closer together than
//! `min_gap` are discarded, up to `max_attempts` draws.

use crate::error::SequenceError;
use posner_core::{Side, Trial};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

const SPLIT_TOLERANCE: f64 = 1e-9;
const REJECTION_LOG_EVERY: usize = 100;

/// Parameters of one block's sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceSpec {
    pub n_trials: usize,
    pub p_valid: f64,
    /// Minimum distance between consecutive invalid-cue trials. 0 disables the check.
    pub min_gap: usize,
    pub max_attempts: usize,
}

impl SequenceSpec {
    pub fn new(n_trials: usize, p_valid: f64) -> Self {
        Self {
            n_trials,
            p_valid,
            min_gap: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_min_gap(mut self, min_gap: usize) -> Self {
        self.min_gap = min_gap;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn validate(&self) -> Result<(), SequenceError> {
        self.valid_per_side().map(|_| ())
    }

    /// Number of valid-cue trials on each side.
    pub fn valid_per_side(&self) -> Result<usize, SequenceError> {
        let p_valid = self.p_valid;
        if !(p_valid > 0.0 && p_valid <= 1.0) {
            return Err(SequenceError::ProbabilityOutOfRange { p_valid });
        }
        if self.n_trials == 0 {
            return Err(SequenceError::EmptyBlock);
        }
        let uneven = SequenceError::UnevenSplit {
            n_trials: self.n_trials,
            p_valid,
        };
        if self.n_trials % 2 != 0 {
            return Err(uneven);
        }
        let per_side = (self.n_trials / 2) as f64 * p_valid;
        if (per_side - per_side.round()).abs() > SPLIT_TOLERANCE {
            return Err(uneven);
        }
        if self.max_attempts == 0 {
            return Err(SequenceError::NoAttempts);
        }
        Ok(per_side.round() as usize)
    }

    pub fn invalid_per_side(&self) -> Result<usize, SequenceError> {
        Ok(self.n_trials / 2 - self.valid_per_side()?)
    }
}

/// Draws one block's trial order.
pub fn generate<R: Rng + ?Sized>(
    spec: &SequenceSpec,
    rng: &mut R,
) -> Result<Vec<Trial>, SequenceError> {
    let n_valid = spec.valid_per_side()?;
    let half = spec.n_trials / 2;

    let mut labels: Vec<(Side, bool)> = Side::ALL
        .iter()
        .flat_map(|&side| (0..half).map(move |i| (side, i < n_valid)))
        .collect();

    for attempt in 1..=spec.max_attempts {
        labels.shuffle(rng);
        let distances = gaps(labels.iter().map(|&(_, valid)| valid));
        if distances.iter().all(|&gap| gap >= spec.min_gap) {
            debug!(
                attempt,
                n_trials = spec.n_trials,
                min_gap = spec.min_gap,
                "sequence accepted"
            );
            return Ok(labels
                .iter()
                .map(|&(side, valid)| Trial::new(side, valid))
                .collect());
        }
        if attempt % REJECTION_LOG_EVERY == 0 {
            debug!(attempt, min_gap = spec.min_gap, "still rejecting shuffles");
        }
    }

    Err(SequenceError::Infeasible {
        attempts: spec.max_attempts,
        min_gap: spec.min_gap,
    })
}

/// Distances between consecutive invalid-cue trials, in order.
pub fn invalid_gaps(trials: &[Trial]) -> Vec<usize> {
    gaps(trials.iter().map(|t| t.cue_valid))
}

fn gaps(validity: impl Iterator<Item = bool>) -> Vec<usize> {
    let mut previous = None;
    let mut out = Vec::new();
    for (i, valid) in validity.enumerate() {
        if valid {
            continue;
        }
        if let Some(p) = previous {
            out.push(i - p);
        }
        previous = Some(i);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn count(trials: &[Trial], side: Side, valid: bool) -> usize {
        trials
            .iter()
            .filter(|t| t.position == side && t.cue_valid == valid)
            .count()
    }

    #[test]
    fn twenty_trials_eighty_percent_valid_gap_three() {
        let spec = SequenceSpec::new(20, 0.8).with_min_gap(3);
        let mut rng = StdRng::seed_from_u64(7);

        let trials = generate(&spec, &mut rng).unwrap();

        assert_eq!(trials.len(), 20);
        assert_eq!(count(&trials, Side::Left, true), 8);
        assert_eq!(count(&trials, Side::Left, false), 2);
        assert_eq!(count(&trials, Side::Right, true), 8);
        assert_eq!(count(&trials, Side::Right, false), 2);

        let gaps = invalid_gaps(&trials);
        assert_eq!(gaps.len(), 3);
        assert!(gaps.iter().all(|&g| g >= 3), "gaps: {gaps:?}");
    }

    #[test]
    fn spacing_holds_across_many_sequences() {
        let spec = SequenceSpec::new(40, 0.9).with_min_gap(4);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..150 {
            let trials = generate(&spec, &mut rng).unwrap();
            assert!(invalid_gaps(&trials).iter().all(|&g| g >= 4));
        }
    }

    #[test]
    fn fresh_trials_have_no_response() {
        let mut rng = StdRng::seed_from_u64(1);
        let trials = generate(&SequenceSpec::new(8, 0.5), &mut rng).unwrap();
        assert!(trials.iter().all(|t| t.response.is_none()
            && t.response_time.is_none()
            && !t.is_complete()));
    }

    #[test]
    fn all_valid_needs_no_spacing() {
        let spec = SequenceSpec::new(10, 1.0).with_min_gap(100);
        let mut rng = StdRng::seed_from_u64(3);
        let trials = generate(&spec, &mut rng).unwrap();
        assert!(trials.iter().all(|t| t.cue_valid));
    }

    #[test]
    fn uneven_splits_fail_validation() {
        let mut rng = StdRng::seed_from_u64(0);
        for (n, p) in [(9, 0.5), (10, 0.5), (20, 0.33), (7, 1.0)] {
            let err = generate(&SequenceSpec::new(n, p), &mut rng).unwrap_err();
            assert!(
                matches!(err, SequenceError::UnevenSplit { .. }),
                "{n}/{p}: {err:?}"
            );
        }
    }

    #[test]
    fn probability_must_be_in_half_open_unit_interval() {
        for p in [0.0, -0.5, 1.1, f64::NAN] {
            assert!(matches!(
                SequenceSpec::new(20, p).validate(),
                Err(SequenceError::ProbabilityOutOfRange { .. })
            ));
        }
        assert!(SequenceSpec::new(20, 1.0).validate().is_ok());
    }

    #[test]
    fn zero_trials_or_attempts_are_rejected() {
        assert_eq!(
            SequenceSpec::new(0, 0.5).validate(),
            Err(SequenceError::EmptyBlock)
        );
        assert_eq!(
            SequenceSpec::new(20, 0.5).with_max_attempts(0).validate(),
            Err(SequenceError::NoAttempts)
        );
    }

    #[test]
    fn impossible_spacing_reports_liveness_failure() {
        // 10 invalid trials cannot be 3 apart in 20 slots.
        let spec = SequenceSpec::new(20, 0.5)
            .with_min_gap(3)
            .with_max_attempts(25);
        let mut rng = StdRng::seed_from_u64(9);
        let err = generate(&spec, &mut rng).unwrap_err();
        assert_eq!(
            err,
            SequenceError::Infeasible {
                attempts: 25,
                min_gap: 3
            }
        );
        assert!(!err.is_validation());
    }

    #[test]
    fn gaps_are_measured_between_invalid_indices() {
        let trials: Vec<Trial> = [true, false, true, true, false, false, true]
            .into_iter()
            .map(|v| Trial::new(Side::Left, v))
            .collect();
        assert_eq!(invalid_gaps(&trials), vec![3, 1]);
    }

    #[test]
    fn per_side_counts_follow_the_ratio() {
        let spec = SequenceSpec::new(20, 0.8);
        assert_eq!(spec.valid_per_side(), Ok(8));
        assert_eq!(spec.invalid_per_side(), Ok(2));
    }
}
