//! Line-based terminal front end: scenes are printed as text and keys are
//! typed followed by Enter.

use posner_core::{Frame, Scene, Side};
use posner_experiment::{InputError, InputSource, Key, KeyWait, Screen, ScreenError};
use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

pub const KEY_HELP: &str = "keys: Enter = space, l = left, r = right, q = escape";

/// Text rendering of a scene. Highlighted frames are drawn as `[#]`, the
/// target as `[*]`.
pub fn render_scene(scene: &Scene) -> String {
    if let Scene::Text(message) = scene {
        return message.text();
    }
    let cell = |frame: &Frame| match scene {
        Scene::Target(side) if *side == frame.side => "[*]",
        _ if frame.highlighted => "[#]",
        _ => "[ ]",
    };
    let frames = scene.frames();
    let (left, right) = match frames.as_slice() {
        [l, r] => (cell(l), cell(r)),
        _ => ("[ ]", "[ ]"),
    };
    let centre = if scene.shows_fixation() { "+" } else { " " };
    format!("{left}    {centre}    {right}")
}

pub struct TerminalScreen<W: Write> {
    out: W,
}

impl TerminalScreen<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalScreen<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Screen for TerminalScreen<W> {
    fn show(&mut self, scene: &Scene) -> Result<(), ScreenError> {
        writeln!(self.out, "{}", render_scene(scene))?;
        if matches!(scene, Scene::Text(_)) {
            writeln!(self.out, "({KEY_HELP})")?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn close(&mut self) {
        let _ = self.out.flush();
    }
}

/// Maps one typed line to a key. An empty line is the space bar.
pub fn parse_key(line: &str) -> Option<Key> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | " " | "space" => Some(Key::Space),
        "l" | "left" => Some(Key::Left),
        "r" | "right" => Some(Key::Right),
        "q" | "esc" | "escape" => Some(Key::Escape),
        other => other.parse::<Side>().ok().map(Key::from),
    }
}

/// Keys read from a line reader on a helper thread and forwarded over a
/// channel so waits can be bounded.
pub struct TerminalInput {
    keys: Receiver<Key>,
}

impl TerminalInput {
    pub fn stdin() -> Self {
        Self::spawn(std::io::BufReader::new(std::io::stdin()))
    }

    pub fn spawn<B: BufRead + Send + 'static>(reader: B) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in reader.lines() {
                let Ok(line) = line else { break };
                if let Some(key) = parse_key(&line) {
                    if tx.send(key).is_err() {
                        break;
                    }
                }
            }
        });
        Self { keys: rx }
    }
}

impl InputSource for TerminalInput {
    fn wait_for(
        &mut self,
        accepted: &[Key],
        timeout: Option<Duration>,
    ) -> Result<KeyWait, InputError> {
        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            let key = match deadline {
                None => self.keys.recv().map_err(|_| InputError::Disconnected)?,
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    match self.keys.recv_timeout(left) {
                        Ok(key) => key,
                        Err(RecvTimeoutError::Timeout) => return Ok(KeyWait::TimedOut),
                        Err(RecvTimeoutError::Disconnected) => {
                            return Err(InputError::Disconnected);
                        }
                    }
                }
            };
            if accepted.contains(&key) {
                return Ok(KeyWait::Pressed(key));
            }
        }
    }

    fn clear(&mut self) {
        while self.keys.try_recv().is_ok() {}
    }
}
