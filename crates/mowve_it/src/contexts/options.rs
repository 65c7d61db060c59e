use mowve_engine::foundation::math::Rect;
use mowve_engine::input::KeyCode;
use mowve_engine::scene::{ObjectError, ObjectRegistry, ObjectState};

use super::adopt;
use crate::commands::Command;
use crate::frame::{Frame, Scope};
use crate::objects::{Core, GameObject, Slider, SliderTarget};

const CLEAR: u32 = 0xff88_ffff;
const TEXT: u32 = 0xff77_0000;
const TITLE: &str = "Options:\n(Press ESC to return to Main Menu.)";
const SLIDER_LEFT: i32 = 400;
const SLIDER_RIGHT: i32 = 528;
const SLIDER_HEIGHT: i32 = 32;

const ROWS: [(&str, i32, SliderTarget); 2] = [
    ("Music volume (dB): ", 192, SliderTarget::MusicVolume),
    ("Grass density (lowest - highest): ", 256, SliderTarget::GrassDensity),
];

/// Settings screen with the music and grass sliders
#[derive(Debug)]
pub struct OptionsMenu {
    pub(super) core: Core,
    pub(super) children: ObjectRegistry<GameObject>,
}

impl Default for OptionsMenu {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionsMenu {
    /// Options screen with no sliders until it is created
    pub fn new() -> Self {
        let mut options = Self {
            core: Core::new(),
            children: ObjectRegistry::new(),
        };
        options.initialise();
        options
    }

    pub(super) fn initialise(&mut self) {
        self.core.step_or_log(ObjectState::Initialized);
    }

    pub(super) fn create(&mut self, frame: &mut Frame<'_>) -> Result<(), ObjectError> {
        self.core.step(ObjectState::Created)?;
        let mut scope = Scope::menu(frame);
        for (_, top, target) in ROWS {
            let area = Rect::new(SLIDER_LEFT, top, SLIDER_RIGHT, top + SLIDER_HEIGHT);
            adopt(&mut self.children, &mut scope, Slider::new(target, area).into())?;
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
            frame.request(Command::ShowMainMenu);
        }
    }

    pub(super) fn update(&mut self, frame: &mut Frame<'_>) {
        self.children.update(&mut Scope::menu(frame));
    }

    pub(super) fn render(&self, frame: &mut Frame<'_>) {
        let viewport = frame.services.viewport();
        let renderer = &mut frame.services.renderer;
        renderer.clear(CLEAR);
        renderer.draw_text(TITLE, Rect::new(64, 64, viewport.right, viewport.bottom), TEXT);
        for (label, top, _) in ROWS {
            renderer.draw_text(label, Rect::new(32, top, viewport.right, viewport.bottom), TEXT);
        }
        self.children.render(&mut Scope::menu(frame));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use approx::assert_relative_eq;
    use mowve_engine::input::MouseButtons;

    #[test]
    fn test_sliders_start_from_settings() {
        let mut harness = Harness::new();
        harness.settings.audio.music_volume = 0.25;
        let mut options = OptionsMenu::new();
        options.create(&mut harness.frame()).unwrap();

        let settings: Vec<_> = options
            .children
            .iter()
            .filter_map(|child| match child {
                GameObject::Slider(slider) => Some((slider.target(), slider.setting())),
                _ => None,
            })
            .collect();
        assert_eq!(settings.len(), 2);
        assert_eq!(settings[0].0, SliderTarget::MusicVolume);
        assert_relative_eq!(settings[0].1, 0.25);
        assert_relative_eq!(settings[1].1, 1.0);
        options.destroy(&mut harness.frame());
    }

    #[test]
    fn test_drag_changes_music_volume() {
        let mut harness = Harness::new();
        harness.load_sounds();
        let mut options = OptionsMenu::new();
        options.create(&mut harness.frame()).unwrap();

        harness.input.set_pointer(SLIDER_LEFT, 200);
        harness.input.set_buttons(MouseButtons::LEFT, true);
        options.update(&mut harness.frame());
        assert_relative_eq!(harness.settings.audio.music_volume, 0.0);
        options.destroy(&mut harness.frame());
    }

    #[test]
    fn test_render_labels() {
        let mut harness = Harness::new();
        let options = OptionsMenu::new();
        options.render(&mut harness.frame());
        assert_eq!(harness.renderer.frame_text().len(), 3);
        assert_eq!(harness.renderer.frame_text()[1], "Music volume (dB): ");
    }
}
