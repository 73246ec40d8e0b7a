use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Posner cueing task
#[derive(Parser, Debug)]
#[command(name = "posner")]
#[command(author, version, about = "Posner spatial cueing experiment and live leaderboard")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the task for one participant in the terminal
    Run {
        /// Participant number, used for the `sub-XX` data folder
        subject_id: u32,
        /// JSON configuration file
        config: PathBuf,
        /// Reuse an existing data folder for this participant
        #[arg(long)]
        overwrite: bool,
    },

    /// Dry run with simulated key presses
    Test {
        subject_id: u32,
        config: PathBuf,
        /// Keep the generated data folder afterwards
        #[arg(long)]
        keep: bool,
        /// Seed for the trial sequence and simulated responses
        #[arg(long)]
        seed: Option<u64>,
        /// Do not print the scenes
        #[arg(long)]
        quiet: bool,
    },

    /// Check a configuration file and report every problem found
    Validate { config: PathBuf },

    /// Aggregate result files into leaderboard.csv and leaderboard.html
    Leaderboard {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// Seconds between directory polls
        #[arg(long, default_value_t = 2)]
        interval_secs: u64,
        /// Browser refresh period written into the page
        #[arg(long, default_value_t = 10)]
        refresh_secs: u64,
        /// Build the artifacts once and exit
        #[arg(long)]
        once: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaderboard_defaults() {
        let cli = Cli::try_parse_from(["posner", "leaderboard"]).unwrap();
        match cli.command {
            Commands::Leaderboard {
                data_dir,
                output_dir,
                interval_secs,
                refresh_secs,
                once,
            } => {
                assert_eq!(data_dir, PathBuf::from("data"));
                assert_eq!(output_dir, PathBuf::from("."));
                assert_eq!(interval_secs, 2);
                assert_eq!(refresh_secs, 10);
                assert!(!once);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn run_takes_subject_and_config() {
        let cli =
            Cli::try_parse_from(["posner", "run", "7", "cfg.json", "--overwrite"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Run { subject_id: 7, overwrite: true, .. }
        ));
    }

    #[test]
    fn test_can_run_quietly() {
        let cli = Cli::try_parse_from(["posner", "test", "2", "cfg.json", "--quiet"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Test { subject_id: 2, quiet: true, keep: false, .. }
        ));
    }

    #[test]
    fn subject_id_must_be_a_number() {
        assert!(Cli::try_parse_from(["posner", "test", "abc", "cfg.json"]).is_err());
    }
}
