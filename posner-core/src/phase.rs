use crate::scene::Message;

/// Phases of a session, in the order they are visited.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Welcome,
    BlockIntro(usize),
    Block(usize),
    Goodbye,
}

impl Phase {
    pub fn next(&self, n_blocks: usize) -> Option<Self> {
        use Phase::*;
        Some(match *self {
            Welcome if n_blocks == 0 => Goodbye,
            Welcome => BlockIntro(0),
            BlockIntro(i) => Block(i),
            Block(i) if i + 1 < n_blocks => BlockIntro(i + 1),
            Block(_) => Goodbye,
            Goodbye => return None,
        })
    }

    /// Instruction screen shown in this phase, if any.
    pub fn message(&self, n_blocks: usize) -> Option<Message> {
        match *self {
            Phase::Welcome => Some(Message::Welcome),
            Phase::BlockIntro(block) => Some(Message::BlockIntro {
                block,
                total: n_blocks,
            }),
            Phase::Goodbye => Some(Message::Goodbye),
            Phase::Block(_) => None,
        }
    }
}
