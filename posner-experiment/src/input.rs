use crate::error::InputError;
use posner_core::Side;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::VecDeque;
use std::time::Duration;

/// Keys the task listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    Left,
    Right,
    Escape,
}

impl Key {
    pub fn side(self) -> Option<Side> {
        match self {
            Key::Left => Some(Side::Left),
            Key::Right => Some(Side::Right),
            _ => None,
        }
    }
}

impl From<Side> for Key {
    fn from(side: Side) -> Self {
        match side {
            Side::Left => Key::Left,
            Side::Right => Key::Right,
        }
    }
}

/// Outcome of a bounded wait for a keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyWait {
    Pressed(Key),
    TimedOut,
}

/// Source of participant keypresses.
///
/// `wait_for` blocks until one of `accepted` is pressed or `timeout`
/// elapses; other keys are ignored. With `timeout = None` it never returns
/// `TimedOut`.
pub trait InputSource {
    fn wait_for(&mut self, accepted: &[Key], timeout: Option<Duration>)
    -> Result<KeyWait, InputError>;

    /// Drops keys pressed before now, so a response cannot precede the
    /// target it answers.
    fn clear(&mut self) {}
}

impl<I: InputSource + ?Sized> InputSource for &mut I {
    fn wait_for(
        &mut self,
        accepted: &[Key],
        timeout: Option<Duration>,
    ) -> Result<KeyWait, InputError> {
        (**self).wait_for(accepted, timeout)
    }

    fn clear(&mut self) {
        (**self).clear()
    }
}

impl<I: InputSource + ?Sized> InputSource for Box<I> {
    fn wait_for(
        &mut self,
        accepted: &[Key],
        timeout: Option<Duration>,
    ) -> Result<KeyWait, InputError> {
        (**self).wait_for(accepted, timeout)
    }

    fn clear(&mut self) {
        (**self).clear()
    }
}

/// Replays a fixed list of events. Keys the caller is not listening for are
/// dropped, as is a timeout offered to an unbounded wait.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    queue: VecDeque<KeyWait>,
    waits: usize,
}

impl ScriptedInput {
    pub fn new(events: impl IntoIterator<Item = KeyWait>) -> Self {
        Self {
            queue: events.into_iter().collect(),
            waits: 0,
        }
    }

    pub fn keys(keys: impl IntoIterator<Item = Key>) -> Self {
        Self::new(keys.into_iter().map(KeyWait::Pressed))
    }

    pub fn push(&mut self, event: KeyWait) {
        self.queue.push_back(event);
    }

    /// Number of completed `wait_for` calls.
    pub fn waits(&self) -> usize {
        self.waits
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl InputSource for ScriptedInput {
    fn wait_for(
        &mut self,
        accepted: &[Key],
        timeout: Option<Duration>,
    ) -> Result<KeyWait, InputError> {
        while let Some(event) = self.queue.pop_front() {
            let usable = match event {
                KeyWait::Pressed(key) => accepted.contains(&key),
                KeyWait::TimedOut => timeout.is_some(),
            };
            if usable {
                self.waits += 1;
                return Ok(event);
            }
        }
        Err(InputError::Exhausted)
    }
}

/// Presses a uniformly chosen accepted key, never `Escape` unless it is the
/// only choice. Used for unattended dry runs.
#[derive(Debug, Clone)]
pub struct RandomInput<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomInput<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> InputSource for RandomInput<R> {
    fn wait_for(
        &mut self,
        accepted: &[Key],
        _timeout: Option<Duration>,
    ) -> Result<KeyWait, InputError> {
        let choices: Vec<Key> = accepted
            .iter()
            .copied()
            .filter(|&k| k != Key::Escape)
            .collect();
        let pool = if choices.is_empty() { accepted } else { &choices[..] };
        pool.choose(&mut self.rng)
            .map(|&k| KeyWait::Pressed(k))
            .ok_or(InputError::Exhausted)
    }
}
