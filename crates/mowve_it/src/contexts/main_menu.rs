use mowve_engine::foundation::math::Rect;
use mowve_engine::input::KeyCode;
use mowve_engine::scene::{ObjectError, ObjectRegistry, ObjectState};

use super::adopt;
use crate::commands::Command;
use crate::frame::{Frame, Scope};
use crate::objects::{Button, Core, GameObject};

const CLEAR: u32 = 0xff40_80f0;
const BUTTON_HALF_WIDTH: i32 = 128;
const BUTTON_HEIGHT: i32 = 96;

/// Start screen with one button per destination
#[derive(Debug)]
pub struct MainMenu {
    pub(super) core: Core,
    pub(super) children: ObjectRegistry<GameObject>,
}

impl Default for MainMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl MainMenu {
    /// Menu with no buttons until it is created
    pub fn new() -> Self {
        let mut menu = Self {
            core: Core::new(),
            children: ObjectRegistry::new(),
        };
        menu.initialise();
        menu
    }

    /// Button labels in screen order
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.children.iter().filter_map(|child| match child {
            GameObject::Button(button) => Some(button.label()),
            _ => None,
        })
    }

    pub(super) fn initialise(&mut self) {
        self.core.step_or_log(ObjectState::Initialized);
    }

    pub(super) fn create(&mut self, frame: &mut Frame<'_>) -> Result<(), ObjectError> {
        self.core.step(ObjectState::Created)?;
        let viewport = frame.services.viewport();
        let centre = (viewport.left + viewport.right) / 2;
        let entries = [
            ("New Game", 32, Command::StartLevel(1)),
            ("How To Play", 160, Command::ShowHelp),
            ("Options", 288, Command::ShowOptions),
            ("Exit", 416, Command::Quit),
        ];

        let mut scope = Scope::menu(frame);
        for (label, top, action) in entries {
            let area = Rect::new(centre - BUTTON_HALF_WIDTH, top, centre + BUTTON_HALF_WIDTH, top + BUTTON_HEIGHT);
            adopt(&mut self.children, &mut scope, Button::new(label, area, action).into())?;
        }
        Ok(())
    }

    pub(super) fn destroy(mut self, frame: &mut Frame<'_>) {
        self.core.step_or_log(ObjectState::Destroying);
        self.children.destroy_all(&mut Scope::menu(frame));
        self.core.step_or_log(ObjectState::Destroyed);
    }

    pub(super) fn handle_input(&mut self, frame: &mut Frame<'_>) {
        if frame.services.input.key_pressed(KeyCode::Escape) {
            frame.request(Command::Quit);
        }
    }

    pub(super) fn update(&mut self, frame: &mut Frame<'_>) {
        self.children.update(&mut Scope::menu(frame));
    }

    pub(super) fn render(&self, frame: &mut Frame<'_>) {
        frame.services.renderer.clear(CLEAR);
        self.children.render(&mut Scope::menu(frame));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use mowve_engine::input::MouseButtons;

    #[test]
    fn test_four_buttons_centred() {
        let mut harness = Harness::new();
        let mut frame = harness.frame();
        let mut menu = MainMenu::new();
        menu.create(&mut frame).unwrap();

        let labels: Vec<_> = menu.labels().collect();
        assert_eq!(labels, ["New Game", "How To Play", "Options", "Exit"]);
        let first = menu.children.iter().find_map(|child| match child {
            GameObject::Button(button) => Some(button.area()),
            _ => None,
        });
        assert_eq!(first, Some(Rect::new(384, 32, 640, 128)));
        menu.destroy(&mut frame);
    }

    #[test]
    fn test_new_game_button_starts_level_one() {
        let mut harness = Harness::new();
        let mut menu = MainMenu::new();
        menu.create(&mut harness.frame()).unwrap();

        harness.input.set_pointer(512, 64);
        harness.input.set_buttons(MouseButtons::LEFT, true);
        menu.update(&mut harness.frame());
        harness.input.end_frame();
        harness.input.set_buttons(MouseButtons::LEFT, false);
        menu.update(&mut harness.frame());

        assert_eq!(harness.requests.drain(), vec![Command::StartLevel(1)]);
        menu.destroy(&mut harness.frame());
    }

    #[test]
    fn test_escape_quits() {
        let mut harness = Harness::new();
        harness.input.set_key(KeyCode::Escape, true);
        let mut menu = MainMenu::new();
        menu.handle_input(&mut harness.frame());
        assert_eq!(harness.requests.drain(), vec![Command::Quit]);
    }
}
