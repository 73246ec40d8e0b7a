use crate::error::ScreenError;
use posner_core::Scene;

/// Presentation surface. `show` replaces whatever was on screen.
pub trait Screen {
    fn show(&mut self, scene: &Scene) -> Result<(), ScreenError>;

    /// Releases the surface at the end of a session.
    fn close(&mut self) {}
}

impl<S: Screen + ?Sized> Screen for &mut S {
    fn show(&mut self, scene: &Scene) -> Result<(), ScreenError> {
        (**self).show(scene)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

impl<S: Screen + ?Sized> Screen for Box<S> {
    fn show(&mut self, scene: &Scene) -> Result<(), ScreenError> {
        (**self).show(scene)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Keeps every scene shown, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingScreen {
    pub scenes: Vec<Scene>,
    pub closed: bool,
}

impl Screen for RecordingScreen {
    fn show(&mut self, scene: &Scene) -> Result<(), ScreenError> {
        self.scenes.push(scene.clone());
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullScreen;

impl Screen for NullScreen {
    fn show(&mut self, _scene: &Scene) -> Result<(), ScreenError> {
        Ok(())
    }
}
