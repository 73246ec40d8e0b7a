pub mod phase;
pub mod scene;
pub mod trial;

pub use phase::Phase;
pub use scene::{Frame, Message, Scene, FRAME_X};
pub use trial::{ParseSideError, Side, Trial, TrialRecord, TrialState};
