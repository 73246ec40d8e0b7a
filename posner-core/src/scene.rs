use crate::trial::Side;

/// Horizontal centre of the left and right placeholder frames, in normalised units.
pub const FRAME_X: [f32; 2] = [-0.5, 0.5];

/// What the participant sees at a given moment of the task.
#[derive(Debug, Clone, PartialEq)]
pub enum Scene {
    Text(Message),
    /// Fixation point with both frames unhighlighted.
    Fixation,
    /// Fixation point with the frame on the given side highlighted.
    Cue(Side),
    /// Target dot inside the frame on the given side.
    Target(Side),
}

/// Placeholder frame as drawn in a scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub side: Side,
    pub x: f32,
    pub highlighted: bool,
}

impl Scene {
    /// Frames drawn in this scene, left first. Text screens have none.
    pub fn frames(&self) -> Vec<Frame> {
        let highlight = match self {
            Scene::Text(_) => return Vec::new(),
            Scene::Fixation | Scene::Target(_) => None,
            Scene::Cue(side) => Some(*side),
        };
        Side::ALL
            .iter()
            .zip(FRAME_X)
            .map(|(&side, x)| Frame {
                side,
                x,
                highlighted: highlight == Some(side),
            })
            .collect()
    }

    pub fn shows_fixation(&self) -> bool {
        matches!(self, Scene::Fixation | Scene::Cue(_))
    }

    pub fn target_x(&self) -> Option<f32> {
        match self {
            Scene::Target(Side::Left) => Some(FRAME_X[0]),
            Scene::Target(Side::Right) => Some(FRAME_X[1]),
            _ => None,
        }
    }
}

/// Instruction screens. Each one waits for the space bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    Welcome,
    BlockIntro { block: usize, total: usize },
    Goodbye,
}

impl Message {
    pub fn text(&self) -> String {
        match self {
            Message::Welcome => "Welcome to the experiment!\n\n\
                Look at the white fixation point in the middle of the screen.\n\n\
                When a black dot appears, indicate if it is on the left or right using the arrow keys.\n\n\
                Respond as fast as possible!\n\n\
                Press space to continue"
                .to_string(),
            Message::BlockIntro { block, total } => {
                format!("Press space to start block {} of {}", block + 1, total)
            }
            Message::Goodbye => "Thank you for participating!\n\nPress space to exit.".to_string(),
        }
    }
}
