use mowve_engine::foundation::math::Rect;
use mowve_engine::input::KeyCode;
use mowve_engine::scene::{Lifecycle, ObjectError, ObjectRegistry, ObjectState};

use super::Context;
use crate::commands::Command;
use crate::frame::{Frame, Scope};
use crate::objects::{Core, GameObject};

const CLEAR: u32 = 0xff22_1100;
const TEXT: u32 = 0xffff_8800;
const MESSAGE: &str = "Paused\n\nPress ESC to exit.\nPress SPACE to continue.";
const MESSAGE_TOP: i32 = 128;

/// Holds a suspended context until the player resumes or quits it
#[derive(Debug)]
pub struct PauseMenu {
    pub(super) core: Core,
    pub(super) children: ObjectRegistry<GameObject>,
    suspended: Box<Context>,
}

impl PauseMenu {
    /// Suspend `context` behind the pause screen
    pub fn new(context: Context) -> Self {
        let mut pause = Self {
            core: Core::new(),
            children: ObjectRegistry::new(),
            suspended: Box::new(context),
        };
        pause.initialise();
        pause
    }

    /// The context waiting to resume
    pub fn suspended(&self) -> &Context {
        &self.suspended
    }

    /// Tear down the pause screen and hand back the suspended context
    pub fn resume(mut self, frame: &mut Frame<'_>) -> Context {
        self.core.step_or_log(ObjectState::Destroying);
        self.children.destroy_all(&mut Scope::menu(frame));
        self.core.step_or_log(ObjectState::Destroyed);
        *self.suspended
    }

    pub(super) fn initialise(&mut self) {
        self.core.step_or_log(ObjectState::Initialized);
    }

    pub(super) fn create(&mut self) -> Result<(), ObjectError> {
        self.core.step(ObjectState::Created)
    }

    pub(super) fn destroy(self, frame: &mut Frame<'_>) {
        let suspended = self.resume(frame);
        suspended.destroy(frame);
    }

    pub(super) fn handle_input(&mut self, frame: &mut Frame<'_>) {
        let input = frame.services.input;
        if input.key_pressed(KeyCode::Escape) {
            frame.request(Command::ShowMainMenu);
        } else if input.key_pressed(KeyCode::Space) {
            frame.request(Command::Resume);
        }
    }

    pub(super) fn render(&self, frame: &mut Frame<'_>) {
        let viewport = frame.services.viewport();
        let renderer = &mut frame.services.renderer;
        renderer.clear(CLEAR);
        let area = Rect::new(viewport.left, viewport.top + MESSAGE_TOP, viewport.right, viewport.bottom);
        renderer.draw_text(MESSAGE, area, TEXT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::names;
    use crate::contexts::MainMenu;
    use crate::testing::Harness;
    use mowve_engine::scene::Identity;

    #[test]
    fn test_resume_returns_same_context() {
        let mut harness = Harness::new();
        let mut menu = Context::MainMenu(MainMenu::new());
        menu.create(&mut harness.frame()).unwrap();
        let id = menu.id();

        let mut pause = PauseMenu::new(menu);
        pause.create().unwrap();
        assert_eq!(pause.suspended().id(), id);

        let resumed = pause.resume(&mut harness.frame());
        assert_eq!(resumed.id(), id);
        resumed.destroy(&mut harness.frame());
    }

    #[test]
    fn test_space_resumes_and_escape_leaves() {
        let mut harness = Harness::new();
        let mut pause = PauseMenu::new(Context::MainMenu(MainMenu::new()));

        harness.input.set_key(KeyCode::Space, true);
        pause.handle_input(&mut harness.frame());
        assert_eq!(harness.requests.drain(), vec![Command::Resume]);
        harness.input.end_frame();

        harness.input.set_key(KeyCode::Escape, true);
        pause.handle_input(&mut harness.frame());
        assert_eq!(harness.requests.drain(), vec![Command::ShowMainMenu]);
    }

    #[test]
    fn test_destroy_releases_suspended_objects() {
        let mut harness = Harness::new();
        let mut menu = Context::MainMenu(MainMenu::new());
        menu.create(&mut harness.frame()).unwrap();
        let face = harness.resources.find_by_name(names::FACE_INACTIVE).unwrap();
        // pool slot plus one per button
        assert_eq!(harness.resources.ref_count(face), Some(5));

        let pause = PauseMenu::new(menu);
        pause.destroy(&mut harness.frame());
        assert_eq!(harness.resources.ref_count(face), Some(1));
    }
}
