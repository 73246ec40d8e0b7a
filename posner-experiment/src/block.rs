use crate::error::{BlockError, SequenceError};
use crate::sequence::{self, SequenceSpec};
use posner_core::{Side, Trial, TrialRecord, TrialState};
use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Unstarted,
    InProgress,
    Complete,
}

/// What the presentation step needs to know about the trial being dispensed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialCue {
    pub index: usize,
    pub position: Side,
    pub cue_valid: bool,
}

impl TrialCue {
    pub fn cued_side(&self) -> Side {
        if self.cue_valid {
            self.position
        } else {
            self.position.opposite()
        }
    }
}

/// A generated sequence plus the responses collected for it.
///
/// Trials are handed out strictly in order and each one takes exactly one
/// response before the next can be dispensed.
#[derive(Debug, Clone)]
pub struct Block {
    trials: Vec<Trial>,
    dispensed: usize,
    completed: usize,
}

impl Block {
    pub fn generate<R: Rng + ?Sized>(
        spec: &SequenceSpec,
        rng: &mut R,
    ) -> Result<Self, SequenceError> {
        Ok(Self::from_trials(sequence::generate(spec, rng)?))
    }

    /// Wraps an existing order; any response data on the trials is discarded.
    pub fn from_trials(trials: Vec<Trial>) -> Self {
        let trials = trials
            .into_iter()
            .map(|t| Trial::new(t.position, t.cue_valid))
            .collect();
        Self {
            trials,
            dispensed: 0,
            completed: 0,
        }
    }

    pub fn state(&self) -> BlockState {
        if self.completed == self.trials.len() {
            BlockState::Complete
        } else if self.dispensed == 0 {
            BlockState::Unstarted
        } else {
            BlockState::InProgress
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state() == BlockState::Complete
    }

    /// Dispenses the next trial, or `None` once every trial has been answered.
    pub fn next_trial(&mut self) -> Result<Option<TrialCue>, BlockError> {
        if self.dispensed > self.completed {
            return Err(BlockError::ResponsePending {
                index: self.dispensed - 1,
            });
        }
        let index = self.dispensed;
        let Some(trial) = self.trials.get_mut(index) else {
            return Ok(None);
        };
        trial.state = TrialState::Presented;
        self.dispensed += 1;
        Ok(Some(TrialCue {
            index,
            position: trial.position,
            cue_valid: trial.cue_valid,
        }))
    }

    /// Stores the answer for the trial most recently dispensed.
    /// `None` for both fields records a timeout.
    pub fn record_response(
        &mut self,
        response: Option<Side>,
        response_time: Option<Duration>,
    ) -> Result<(), BlockError> {
        if self.dispensed == 0 {
            return Err(BlockError::NotStarted);
        }
        let index = self.dispensed - 1;
        if self.completed > index {
            return Err(BlockError::AlreadyRecorded { index });
        }
        let trial = &mut self.trials[index];
        trial.response = response;
        trial.response_time = response_time;
        trial.state = TrialState::Complete;
        self.completed += 1;
        Ok(())
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    /// Trials dispensed but not yet answered, plus those never dispensed.
    pub fn pending(&self) -> usize {
        self.trials.len() - self.completed
    }

    pub fn n_correct(&self) -> usize {
        self.trials
            .iter()
            .filter(|t| t.is_correct() == Some(true))
            .count()
    }

    pub fn records(&self) -> Vec<TrialRecord> {
        self.trials.iter().map(Trial::to_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> Block {
        Block::from_trials(vec![
            Trial::new(Side::Left, true),
            Trial::new(Side::Right, false),
            Trial::new(Side::Right, true),
        ])
    }

    #[test]
    fn walks_unstarted_in_progress_complete() {
        let mut block = block();
        assert_eq!(block.state(), BlockState::Unstarted);

        for i in 0..3 {
            let cue = block.next_trial().unwrap().unwrap();
            assert_eq!(cue.index, i);
            assert_eq!(block.state(), BlockState::InProgress);
            block
                .record_response(Some(Side::Left), Some(Duration::from_millis(300)))
                .unwrap();
        }

        assert_eq!(block.state(), BlockState::Complete);
        assert_eq!(block.next_trial(), Ok(None));
    }

    #[test]
    fn responses_land_on_the_matching_trial() {
        let mut block = block();
        let answers = [
            (Some(Side::Left), Some(Duration::from_millis(310))),
            (None, None),
            (Some(Side::Left), Some(Duration::from_millis(290))),
        ];
        for (response, rt) in answers {
            block.next_trial().unwrap();
            block.record_response(response, rt).unwrap();
        }

        for (trial, (response, rt)) in block.trials().iter().zip(answers) {
            assert_eq!(trial.response, response);
            assert_eq!(trial.response_time, rt);
            assert!(trial.is_complete());
        }
        assert_eq!(block.n_correct(), 1);
    }

    #[test]
    fn responding_before_start_is_misuse() {
        let mut block = block();
        assert_eq!(
            block.record_response(Some(Side::Left), None),
            Err(BlockError::NotStarted)
        );
    }

    #[test]
    fn double_recording_is_misuse() {
        let mut block = block();
        block.next_trial().unwrap();
        block.record_response(Some(Side::Left), None).unwrap();
        assert_eq!(
            block.record_response(Some(Side::Right), None),
            Err(BlockError::AlreadyRecorded { index: 0 })
        );
        assert_eq!(block.trials()[0].response, Some(Side::Left));
    }

    #[test]
    fn completing_twice_is_misuse() {
        let mut block = Block::from_trials(vec![Trial::new(Side::Left, true)]);
        block.next_trial().unwrap();
        block.record_response(None, None).unwrap();
        assert!(block.is_complete());
        assert_eq!(
            block.record_response(None, None),
            Err(BlockError::AlreadyRecorded { index: 0 })
        );
    }

    #[test]
    fn cannot_skip_an_unanswered_trial() {
        let mut block = block();
        block.next_trial().unwrap();
        assert_eq!(
            block.next_trial(),
            Err(BlockError::ResponsePending { index: 0 })
        );
    }

    #[test]
    fn invalid_cue_points_to_the_other_side() {
        for (position, cue_valid, cued) in [
            (Side::Left, true, Side::Left),
            (Side::Left, false, Side::Right),
            (Side::Right, true, Side::Right),
            (Side::Right, false, Side::Left),
        ] {
            let cue = TrialCue {
                index: 0,
                position,
                cue_valid,
            };
            assert_eq!(cue.cued_side(), cued);
        }
    }

    #[test]
    fn records_keep_trial_order() {
        let block = block();
        let sides: Vec<Side> = block.records().iter().map(|r| r.position).collect();
        assert_eq!(sides, vec![Side::Left, Side::Right, Side::Right]);
        assert_eq!(block.pending(), 3);
    }
}
