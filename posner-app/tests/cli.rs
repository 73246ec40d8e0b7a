use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn posner(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_posner"))
        .args(args)
        .current_dir(cwd)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

fn write_config(dir: &Path, body: &str) -> String {
    let path = dir.join("config.json");
    fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

const QUICK: &str = r#"{
    "root": ".",
    "fix_dur": 0.001,
    "cue_dur": 0.001,
    "n_blocks": 2,
    "n_trials": 4,
    "p_valid": 0.5
}"#;

#[test]
fn validate_accepts_a_good_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), QUICK);
    let out = posner(&["validate", &config], dir.path());
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("is valid"));
}

#[test]
fn validate_lists_every_problem() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        r#"{"root": ".", "fix_dur": "slow", "n_blocks": 1, "n_trials": 9, "p_valid": 0.5}"#,
    );
    let out = posner(&["validate", &config], dir.path());
    assert!(!out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("fix_dur"));
    assert!(stdout.contains("cue_dur"));
    assert!(stdout.contains("n_trials"));
}

#[test]
fn dry_run_removes_its_data_unless_kept() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), QUICK);

    let out = posner(&["test", "3", &config, "--seed", "1"], dir.path());
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(!dir.path().join("data").join("sub-03").exists());

    let out = posner(&["test", "3", &config, "--seed", "1", "--keep"], dir.path());
    assert!(out.status.success());
    let subject = dir.path().join("data").join("sub-03");
    assert!(subject.join("sub-03_block1.csv").is_file());
    assert!(subject.join("sub-03_block2.csv").is_file());

    // An existing participant folder is never reused by a dry run.
    let out = posner(&["test", "3", &config], dir.path());
    assert!(!out.status.success());
}

#[test]
fn leaderboard_once_ranks_dry_run_results() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), QUICK);
    for id in ["1", "2"] {
        let out = posner(&["test", id, &config, "--keep"], dir.path());
        assert!(out.status.success());
    }

    let out = posner(&["leaderboard", "--once"], dir.path());
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("2 participant(s)"));

    let csv = fs::read_to_string(dir.path().join("leaderboard.csv")).unwrap();
    assert_eq!(csv.lines().count(), 3);
    let html = fs::read_to_string(dir.path().join("leaderboard.html")).unwrap();
    assert!(html.contains("class=\"gold\""));
}

#[test]
fn quiet_dry_run_prints_only_the_summary() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), QUICK);
    let out = posner(&["test", "4", &config, "--seed", "2", "--quiet"], dir.path());
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(!stdout.contains("[ ]"));
    assert!(stdout.contains("Data written to"));
}

#[cfg(unix)]
#[test]
fn leaderboard_watch_stops_on_interrupt() {
    use std::time::{Duration, Instant};

    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_posner"))
        .args(["leaderboard", "--interval-secs", "1"])
        .current_dir(dir.path())
        .env("RUST_LOG", "warn")
        .stdout(std::process::Stdio::piped())
        .spawn()
        .unwrap();

    let html = dir.path().join("leaderboard.html");
    let deadline = Instant::now() + Duration::from_secs(10);
    while !html.exists() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    assert!(html.exists());

    let pid = child.id().to_string();
    assert!(Command::new("kill").args(["-INT", &pid]).status().unwrap().success());

    let deadline = Instant::now() + Duration::from_secs(10);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if Instant::now() > deadline {
            child.kill().unwrap();
            panic!("watcher ignored the interrupt");
        }
        std::thread::sleep(Duration::from_millis(20));
    };
    assert!(status.success());
    let mut stdout = String::new();
    std::io::Read::read_to_string(&mut child.stdout.take().unwrap(), &mut stdout).unwrap();
    assert!(stdout.contains("Stopped watching"));
}
