use crate::terminal::{KEY_HELP, TerminalInput, TerminalScreen};
use anyhow::{Context, Result, bail};
use posner_experiment::{
    ConfigError, ExperimentConfig, ExperimentError, ExperimentSummary, NullScreen, RandomInput,
    Screen, Session,
};
use posner_leaderboard::{LeaderboardWatcher, WatchConfig};
use posner_timing::HighPrecisionTimer;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

fn load_config(path: &Path) -> Result<ExperimentConfig> {
    ExperimentConfig::load(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))
}

fn print_summary(summary: &ExperimentSummary) {
    println!();
    println!("Data written to {}", summary.subject_dir.display());
    for file in &summary.block_files {
        println!("  {}", file.display());
    }
    if summary.n_trials > 0 {
        println!(
            "Correct: {}/{} ({:.1}%)",
            summary.n_correct,
            summary.n_trials,
            summary.n_correct as f64 / summary.n_trials as f64 * 100.0
        );
    }
}

pub fn run(subject_id: u32, config_path: &Path, overwrite: bool) -> Result<()> {
    let config = load_config(config_path)?;
    println!("=== POSNER CUEING TASK ===");
    println!(
        "Subject: {subject_id}  Blocks: {}  Trials per block: {}",
        config.n_blocks, config.sequence.n_trials
    );
    println!("({KEY_HELP})\n");

    let mut session = Session::new(
        config,
        HighPrecisionTimer::new(),
        TerminalInput::stdin(),
        TerminalScreen::stdout(),
        rand::rng(),
    )
    .context("experiment setup failed")?;

    match session.run_experiment(subject_id, overwrite) {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(ExperimentError::Aborted) => {
            warn!(subject = subject_id, "session aborted");
            println!("\nExperiment aborted. Completed blocks were saved.");
            Ok(())
        }
        Err(e) => Err(e).context("experiment failed"),
    }
}

/// Full session with random key presses and real timing. Refuses to touch an
/// existing participant folder; the new one is removed afterwards unless
/// `keep` is set. `quiet` suppresses the scenes but not the summary.
pub fn test(
    subject_id: u32,
    config_path: &Path,
    keep: bool,
    seed: Option<u64>,
    quiet: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let (rng, responder) = match seed {
        Some(seed) => (StdRng::seed_from_u64(seed), StdRng::seed_from_u64(seed ^ 0x5eed)),
        None => (StdRng::from_os_rng(), StdRng::from_os_rng()),
    };
    info!(subject = subject_id, ?seed, "dry run");

    let screen: Box<dyn Screen> = if quiet {
        Box::new(NullScreen)
    } else {
        Box::new(TerminalScreen::stdout())
    };
    let mut session = Session::new(
        config,
        HighPrecisionTimer::new(),
        RandomInput::new(responder),
        screen,
        rng,
    )
    .context("experiment setup failed")?;
    let summary = session
        .run_experiment(subject_id, false)
        .context("dry run failed")?;
    print_summary(&summary);

    if !keep {
        std::fs::remove_dir_all(&summary.subject_dir).with_context(|| {
            format!("failed to remove {}", summary.subject_dir.display())
        })?;
        println!("Removed {}", summary.subject_dir.display());
    }
    Ok(())
}

pub fn validate(config_path: &Path) -> Result<()> {
    match ExperimentConfig::load(config_path) {
        Ok(config) => {
            println!(
                "{} is valid: {} block(s) of {} trials, p_valid {}, min_gap {}",
                config_path.display(),
                config.n_blocks,
                config.sequence.n_trials,
                config.sequence.p_valid,
                config.sequence.min_gap,
            );
            Ok(())
        }
        Err(ConfigError::Invalid(violations)) => {
            println!("{} has {} problem(s):", config_path.display(), violations.len());
            for v in &violations {
                println!("  - {v}");
            }
            bail!("invalid configuration");
        }
        Err(e) => Err(e).with_context(|| format!("failed to read {}", config_path.display())),
    }
}

pub fn leaderboard(config: WatchConfig, once: bool) -> Result<()> {
    let csv_path = config.csv_path();
    let html_path = config.html_path();
    let mut watcher = LeaderboardWatcher::new(config, HighPrecisionTimer::new());

    if once {
        watcher.create_dirs()?;
        let report = watcher.rebuild().context("failed to build leaderboard")?;
        for skipped in &report.skipped {
            println!("skipped {}: {}", skipped.path.display(), skipped.reason);
        }
        println!(
            "{} participant(s) written to {} and {}",
            report.leaderboard.len(),
            csv_path.display(),
            html_path.display()
        );
        return Ok(());
    }

    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .context("failed to install the Ctrl-C handler")?;

    println!("Watching {} (Ctrl-C to stop)", watcher.config().data_dir.display());
    watcher.run(&stop).context("leaderboard watcher failed")?;
    println!("Stopped watching");
    Ok(())
}
