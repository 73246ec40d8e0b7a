use crate::block::{Block, TrialCue};
use crate::config::ExperimentConfig;
use crate::error::ExperimentError;
use crate::input::{InputSource, Key, KeyWait};
use crate::screen::Screen;
use crate::sequence;
use crate::storage;
use posner_core::{Message, Phase, Scene, Side};
use posner_timing::Timer;
use rand::Rng;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

const RESPONSE_KEYS: [Key; 3] = [Key::Left, Key::Right, Key::Escape];
const CONTINUE_KEYS: [Key; 2] = [Key::Space, Key::Escape];

/// What the participant did on one trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialOutcome {
    pub response: Option<Side>,
    pub response_time: Option<Duration>,
}

/// Where a finished session left its data.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentSummary {
    pub subject_dir: PathBuf,
    pub block_files: Vec<PathBuf>,
    pub n_trials: usize,
    pub n_correct: usize,
}

/// Everything a running experiment needs, built once and passed around
/// explicitly: configuration, clock, input device, screen and RNG.
pub struct Session<T, I, S, R>
where
    T: Timer,
    I: InputSource,
    S: Screen,
    R: Rng,
{
    pub config: ExperimentConfig,
    pub timer: T,
    pub input: I,
    pub screen: S,
    pub rng: R,
    phase: Phase,
}

impl<T, I, S, R> Session<T, I, S, R>
where
    T: Timer,
    I: InputSource,
    S: Screen,
    R: Rng,
{
    /// Fails if the configured spacing constraint cannot be met, before any
    /// screen is shown.
    pub fn new(
        config: ExperimentConfig,
        timer: T,
        input: I,
        screen: S,
        mut rng: R,
    ) -> Result<Self, ExperimentError> {
        sequence::generate(&config.sequence, &mut rng)?;
        Ok(Self {
            config,
            timer,
            input,
            screen,
            rng,
            phase: Phase::default(),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Fixation, cue, target, then a bounded wait for an arrow key.
    pub fn run_trial(&mut self, cue: &TrialCue) -> Result<TrialOutcome, ExperimentError> {
        self.screen.show(&Scene::Fixation)?;
        self.timer.sleep(self.config.fix_dur);

        self.screen.show(&Scene::Cue(cue.cued_side()))?;
        self.timer.sleep(self.config.cue_dur);

        self.screen.show(&Scene::Target(cue.position))?;
        self.input.clear();
        let onset = self.timer.now();

        let outcome = match self
            .input
            .wait_for(&RESPONSE_KEYS, self.config.response_timeout)?
        {
            KeyWait::Pressed(Key::Escape) => return Err(ExperimentError::Aborted),
            KeyWait::Pressed(key) => TrialOutcome {
                response: key.side(),
                response_time: Some(self.timer.elapsed(onset)),
            },
            KeyWait::TimedOut => TrialOutcome {
                response: None,
                response_time: None,
            },
        };

        debug!(
            trial = cue.index,
            position = %cue.position,
            cue_valid = cue.cue_valid,
            response = ?outcome.response,
            rt_ms = outcome.response_time.map(|d| d.as_secs_f64() * 1e3),
            "trial complete"
        );
        Ok(outcome)
    }

    /// Generates a fresh sequence and runs it to completion.
    pub fn run_block(&mut self) -> Result<Block, ExperimentError> {
        let mut block = Block::generate(&self.config.sequence, &mut self.rng)?;
        while let Some(cue) = block.next_trial()? {
            let outcome = self.run_trial(&cue)?;
            block.record_response(outcome.response, outcome.response_time)?;
        }
        info!(
            trials = block.len(),
            correct = block.n_correct(),
            "block complete"
        );
        Ok(block)
    }

    /// Runs every phase for one participant and writes one CSV per block.
    pub fn run_experiment(
        &mut self,
        subject_id: u32,
        overwrite: bool,
    ) -> Result<ExperimentSummary, ExperimentError> {
        let subject_dir = storage::create_subject_dir(&self.config.root, subject_id, overwrite)?;
        let mut summary = ExperimentSummary {
            subject_dir,
            block_files: Vec::new(),
            n_trials: 0,
            n_correct: 0,
        };
        info!(
            subject = subject_id,
            n_blocks = self.config.n_blocks,
            "session started"
        );

        let result = self.run_phases(&mut summary);
        self.screen.close();
        result?;

        info!(
            subject_dir = %summary.subject_dir.display(),
            trials = summary.n_trials,
            correct = summary.n_correct,
            "session finished"
        );
        Ok(summary)
    }

    /// Walks every phase from the welcome screen, saving each block as it
    /// completes.
    fn run_phases(&mut self, summary: &mut ExperimentSummary) -> Result<(), ExperimentError> {
        let n_blocks = self.config.n_blocks;
        self.phase = Phase::default();
        loop {
            match self.phase {
                Phase::Block(i) => {
                    let block = self.run_block()?;
                    let path = storage::write_block(&summary.subject_dir, i, &block)?;
                    summary.n_trials += block.len();
                    summary.n_correct += block.n_correct();
                    summary.block_files.push(path);
                }
                phase => {
                    if let Some(message) = phase.message(n_blocks) {
                        self.show_message(message)?;
                    }
                }
            }
            match self.phase.next(n_blocks) {
                Some(next) => self.phase = next,
                None => return Ok(()),
            }
        }
    }

    /// Shows an instruction screen until space is pressed. Escape leaves the
    /// session, except on the final screen where it also just closes it.
    fn show_message(&mut self, message: Message) -> Result<(), ExperimentError> {
        self.screen.show(&Scene::Text(message))?;
        loop {
            match self.input.wait_for(&CONTINUE_KEYS, None)? {
                KeyWait::Pressed(Key::Escape) if message != Message::Goodbye => {
                    return Err(ExperimentError::Aborted);
                }
                KeyWait::Pressed(_) => return Ok(()),
                KeyWait::TimedOut => continue,
            }
        }
    }
}
