//! Menu widgets: textured push buttons and drag sliders

use mowve_engine::assets::loader::{acquire_texture, preload_mesh};
use mowve_engine::assets::{Asset, ResourceHandle};
use mowve_engine::audio::volume_to_millibels;
use mowve_engine::foundation::math::{colour, Rect};
use mowve_engine::input::MouseButtons;
use mowve_engine::scene::{ObjectError, ObjectState, ObjectStatus};

use super::{Core, ObjectKind};
use crate::assets::{grass_for_density, names};
use crate::commands::Command;
use crate::config::GameplayConfig;
use crate::frame::{Frame, Scope};

/// Widgets treat their right and bottom edges as inside
fn hit(area: Rect, (x, y): (i32, i32)) -> bool {
    x >= area.left && x <= area.right && y >= area.top && y <= area.bottom
}

/// Which face texture a button shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonFace {
    /// Idle
    Inactive,
    /// Hovered
    Active,
    /// Held down
    Pressed,
    /// Not clickable
    Disabled,
}

impl ButtonFace {
    const ALL: [Self; 4] = [Self::Inactive, Self::Active, Self::Pressed, Self::Disabled];

    /// Pool name of the face texture
    pub const fn texture_name(self) -> &'static str {
        match self {
            Self::Inactive => names::FACE_INACTIVE,
            Self::Active => names::FACE_ACTIVE,
            Self::Pressed => names::FACE_PRESSED,
            Self::Disabled => names::FACE_DISABLED,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Inactive => 0,
            Self::Active => 1,
            Self::Pressed => 2,
            Self::Disabled => 3,
        }
    }
}

/// Push button that queues a command when clicked
#[derive(Debug)]
pub struct Button {
    pub(super) core: Core,
    label: String,
    area: Rect,
    action: Command,
    available: bool,
    face: ButtonFace,
    faces: [Option<ResourceHandle>; 4],
}

impl Button {
    /// Button labelled `label` covering `area`
    pub fn new(label: impl Into<String>, area: Rect, action: Command) -> Self {
        let mut button = Self {
            core: Core::new(),
            label: label.into(),
            area,
            action,
            available: true,
            face: ButtonFace::Inactive,
            faces: [None; 4],
        };
        button.initialise();
        button
    }

    /// Builder: enable or disable the button
    #[must_use]
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Kind tag
    pub const fn kind(&self) -> ObjectKind {
        ObjectKind::Button
    }

    /// Caption drawn on the face
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Clickable rectangle
    pub const fn area(&self) -> Rect {
        self.area
    }

    /// Face shown this frame
    pub const fn face(&self) -> ButtonFace {
        self.face
    }

    pub(super) fn initialise(&mut self) {
        self.core.step_or_log(ObjectState::Initialized);
        self.face = ButtonFace::Inactive;
    }

    pub(super) fn create(&mut self, scope: &mut Scope<'_, '_>) -> Result<(), ObjectError> {
        self.core.step(ObjectState::Created)?;
        let services = &mut scope.frame.services;
        for face in ButtonFace::ALL {
            // a missing face draws nothing; the label still shows
            match acquire_texture(services.resources, &mut *services.loader, face.texture_name()) {
                Ok(handle) => self.faces[face.index()] = Some(handle),
                Err(err) => log::warn!("Button '{}' face {face:?}: {err}", self.label),
            }
        }
        Ok(())
    }

    pub(super) fn destroy(mut self, scope: &mut Scope<'_, '_>) {
        self.core.step_or_log(ObjectState::Destroying);
        for handle in self.faces.iter_mut().filter_map(Option::take) {
            scope.frame.release(handle);
        }
        self.core.step_or_log(ObjectState::Destroyed);
    }

    pub(super) fn update(&mut self, scope: &mut Scope<'_, '_>) -> ObjectStatus {
        if !self.available {
            self.face = ButtonFace::Disabled;
            return ObjectStatus::Alive;
        }

        let input = scope.frame.services.input;
        let inside = hit(self.area, input.pointer());
        let was_inside = hit(self.area, input.previous_pointer());

        if inside {
            if input.button_pressed(MouseButtons::LEFT) {
                self.face = ButtonFace::Pressed;
            } else if !input.is_button_down(MouseButtons::LEFT) && !was_inside {
                self.face = ButtonFace::Active;
                scope.frame.play_sound(names::SND_HOVER);
            }
            if input.button_released(MouseButtons::LEFT) {
                log::debug!("Button '{}' clicked", self.label);
                scope.frame.play_sound(names::SND_CLICK);
                scope.frame.request(self.action.clone());
            }
        } else if was_inside {
            self.face = ButtonFace::Inactive;
        }
        ObjectStatus::Alive
    }

    pub(super) fn render(&self, scope: &mut Scope<'_, '_>) {
        let services = &mut scope.frame.services;
        let texture = self.faces[self.face.index()]
            .and_then(|handle| services.resources.get(handle))
            .and_then(Asset::as_texture)
            .map(|texture| texture.handle);
        if let Some(texture) = texture {
            services.renderer.draw_sprite(texture, self.area, colour::WHITE);
        }
        services.renderer.draw_text(&self.label, self.area, colour::WHITE);
    }
}

/// Setting a slider edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SliderTarget {
    /// Background music volume, applied while dragging
    MusicVolume,
    /// Grass detail, snapped to thirds; the grass mesh is swapped on release
    GrassDensity,
}

const SLIDER_BACK: u32 = 0xffff_0000;
const SLIDER_KNOB: u32 = 0xffff_8888;

/// Horizontal slider over a 0..=1 setting
#[derive(Debug)]
pub struct Slider {
    pub(super) core: Core,
    target: SliderTarget,
    area: Rect,
    setting: f32,
    dragged: bool,
}

impl Slider {
    /// Slider for `target` covering `area`
    pub fn new(target: SliderTarget, area: Rect) -> Self {
        let mut slider = Self {
            core: Core::new(),
            target,
            area,
            setting: 1.0,
            dragged: false,
        };
        slider.initialise();
        slider
    }

    /// Kind tag
    pub const fn kind(&self) -> ObjectKind {
        ObjectKind::Slider
    }

    /// Setting the slider edits
    pub const fn target(&self) -> SliderTarget {
        self.target
    }

    /// Current value in 0..=1
    pub const fn setting(&self) -> f32 {
        self.setting
    }

    /// Whether the pointer is holding the knob
    pub const fn is_dragged(&self) -> bool {
        self.dragged
    }

    pub(super) fn initialise(&mut self) {
        self.core.step_or_log(ObjectState::Initialized);
        self.setting = 1.0;
        self.dragged = false;
    }

    pub(super) fn create(&mut self, scope: &mut Scope<'_, '_>) -> Result<(), ObjectError> {
        self.core.step(ObjectState::Created)?;
        let settings = &scope.frame.settings;
        self.setting = match self.target {
            SliderTarget::MusicVolume => settings.audio.music_volume.clamp(0.0, 1.0),
            SliderTarget::GrassDensity => GameplayConfig::snap_density(settings.gameplay.grass_density),
        };
        Ok(())
    }

    pub(super) fn destroy(mut self, _scope: &mut Scope<'_, '_>) {
        self.core.step_or_log(ObjectState::Destroying);
        self.core.step_or_log(ObjectState::Destroyed);
    }

    pub(super) fn update(&mut self, scope: &mut Scope<'_, '_>) -> ObjectStatus {
        let input = scope.frame.services.input;
        if input.button_pressed(MouseButtons::LEFT) && hit(self.area, input.pointer()) {
            self.dragged = true;
        }
        if !self.dragged {
            return ObjectStatus::Alive;
        }

        self.setting = self.value_at(input.pointer().0);
        self.on_drag(scope.frame);
        if input.button_released(MouseButtons::LEFT) {
            self.dragged = false;
            self.on_release(scope.frame);
        }
        ObjectStatus::Alive
    }

    #[allow(clippy::cast_precision_loss)]
    fn value_at(&self, x: i32) -> f32 {
        if x < self.area.left {
            0.0
        } else if x > self.area.right {
            1.0
        } else {
            (x - self.area.left) as f32 / self.area.width().max(1) as f32
        }
    }

    fn on_drag(&mut self, frame: &mut Frame<'_>) {
        match self.target {
            SliderTarget::MusicVolume => {
                frame.settings.audio.music_volume = self.setting;
                let services = &mut frame.services;
                let music = services
                    .resources
                    .get_by_name(names::SND_LOOP)
                    .and_then(Asset::as_sound)
                    .map(|sound| sound.buffer);
                if let Some(buffer) = music {
                    if let Err(err) = services.audio.set_volume(buffer, volume_to_millibels(self.setting)) {
                        log::warn!("Setting music volume: {err}");
                    }
                }
            }
            SliderTarget::GrassDensity => {
                self.setting = GameplayConfig::snap_density(self.setting);
                frame.settings.gameplay.grass_density = self.setting;
            }
        }
    }

    fn on_release(&mut self, frame: &mut Frame<'_>) {
        if self.target != SliderTarget::GrassDensity {
            return;
        }
        let services = &mut frame.services;
        let Some(old) = services.resources.find_by_name(names::GRASS) else {
            return;
        };
        // tiles still holding the old mesh keep it alive until they go
        services.resources.release(old);
        let variant = grass_for_density(self.setting);
        match preload_mesh(services.resources, &mut *services.loader, names::GRASS, variant) {
            Ok(_) => log::info!("Grass mesh switched to {variant}"),
            Err(err) => log::warn!("Reloading grass mesh: {err}"),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub(super) fn render(&self, scope: &mut Scope<'_, '_>) {
        let third = self.area.height() / 3;
        let bar = Rect::new(self.area.left, self.area.top + third, self.area.right, self.area.top + third * 2);

        let width = self.area.width() as f32;
        let offset = self.area.left as f32 + self.setting * width * 0.9;
        let knob = Rect::new(
            offset as i32,
            self.area.top,
            (offset + width * 0.1) as i32,
            self.area.bottom,
        );

        let renderer = &mut scope.frame.services.renderer;
        renderer.fill_rect(bar, SLIDER_BACK);
        renderer.fill_rect(knob, SLIDER_KNOB);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::GameObject;
    use crate::testing::Harness;
    use approx::assert_relative_eq;
    use mowve_engine::assets::loader::preload_sound;
    use mowve_engine::audio::SILENT_MILLIBELS;
    use mowve_engine::scene::{Lifecycle, ObjectRegistry};

    fn button() -> Button {
        Button::new("Options", Rect::new(100, 100, 200, 150), Command::ShowOptions)
    }

    #[test]
    fn test_button_click_requests_action() {
        let mut harness = Harness::new();
        harness.load_sounds();
        let mut registry = ObjectRegistry::new();
        {
            let mut frame = harness.frame();
            let mut scope = Scope::menu(&mut frame);
            let mut object = GameObject::from(button());
            object.create(&mut scope).unwrap();
            registry.register(object).unwrap();
        }

        harness.input.set_pointer(150, 120);
        harness.step(&mut registry);
        harness.input.set_buttons(MouseButtons::LEFT, true);
        harness.step(&mut registry);
        assert!(harness.requests.drain().is_empty());

        harness.input.set_buttons(MouseButtons::LEFT, false);
        harness.step(&mut registry);
        assert_eq!(harness.requests.drain(), vec![Command::ShowOptions]);
        // hover then click
        assert_eq!(harness.audio.plays().len(), 2);
    }

    #[test]
    fn test_button_faces_follow_pointer() {
        let mut harness = Harness::new();
        let mut frame = harness.frame();
        let mut scope = Scope::menu(&mut frame);
        let mut button = button();
        button.create(&mut scope).unwrap();
        drop(scope);
        drop(frame);

        harness.input.set_pointer(150, 120);
        {
            let mut frame = harness.frame();
            let mut scope = Scope::menu(&mut frame);
            button.update(&mut scope);
        }
        assert_eq!(button.face(), ButtonFace::Active);
        harness.input.end_frame();

        harness.input.set_pointer(10, 10);
        {
            let mut frame = harness.frame();
            let mut scope = Scope::menu(&mut frame);
            button.update(&mut scope);
        }
        assert_eq!(button.face(), ButtonFace::Inactive);

        let mut disabled = button.with_available(false);
        let mut frame = harness.frame();
        let mut scope = Scope::menu(&mut frame);
        disabled.update(&mut scope);
        assert_eq!(disabled.face(), ButtonFace::Disabled);
        disabled.destroy(&mut scope);
    }

    #[test]
    fn test_button_edges_are_inside() {
        let area = Rect::new(0, 0, 10, 10);
        assert!(hit(area, (10, 10)));
        assert!(!hit(area, (11, 5)));
    }

    #[test]
    fn test_volume_slider_drag() {
        let mut harness = Harness::new();
        harness.load_sounds();
        let mut frame = harness.frame();
        let music = preload_sound(
            frame.services.resources,
            &mut *frame.services.loader,
            &mut *frame.services.audio,
            names::SND_LOOP,
            crate::assets::GUITAR_LOOP,
        )
        .unwrap();
        let buffer = frame.services.resources.get(music).and_then(Asset::as_sound).unwrap().buffer;
        let mut scope = Scope::menu(&mut frame);
        let mut slider = Slider::new(SliderTarget::MusicVolume, Rect::new(0, 0, 100, 30));
        slider.create(&mut scope).unwrap();
        assert_relative_eq!(slider.setting(), 1.0);
        drop(scope);
        drop(frame);

        harness.input.set_pointer(-20, 10);
        harness.input.set_buttons(MouseButtons::LEFT, false);
        {
            let mut frame = harness.frame();
            let mut scope = Scope::menu(&mut frame);
            slider.update(&mut scope);
        }
        assert!(!slider.is_dragged());

        harness.input.set_pointer(50, 10);
        harness.input.set_buttons(MouseButtons::LEFT, true);
        {
            let mut frame = harness.frame();
            let mut scope = Scope::menu(&mut frame);
            slider.update(&mut scope);
        }
        assert!(slider.is_dragged());
        assert_relative_eq!(slider.setting(), 0.5);
        assert_relative_eq!(harness.settings.audio.music_volume, 0.5);
        harness.input.end_frame();

        // dragging past the left edge clamps to silent
        harness.input.set_pointer(-20, 10);
        {
            let mut frame = harness.frame();
            let mut scope = Scope::menu(&mut frame);
            slider.update(&mut scope);
        }
        assert_relative_eq!(slider.setting(), 0.0);
        assert_eq!(harness.audio.volume(buffer), Some(SILENT_MILLIBELS));
    }

    #[test]
    fn test_density_slider_swaps_grass_on_release() {
        let mut harness = Harness::new();
        let mut registry = ObjectRegistry::new();
        {
            let mut frame = harness.frame();
            let mut scope = Scope::menu(&mut frame);
            let mut tile = GameObject::from(crate::objects::GrassTile::new(mowve_engine::foundation::math::Vec3::zeros()));
            tile.create(&mut scope).unwrap();
            registry.register(tile).unwrap();
            let mut slider = GameObject::from(Slider::new(SliderTarget::GrassDensity, Rect::new(0, 0, 90, 30)));
            slider.create(&mut scope).unwrap();
            registry.register(slider).unwrap();
        }
        let before = harness.resources.find_by_name(names::GRASS).unwrap();

        harness.input.set_pointer(40, 10);
        harness.input.set_buttons(MouseButtons::LEFT, true);
        harness.step(&mut registry);
        assert_relative_eq!(harness.settings.gameplay.grass_density, 0.5);
        assert_eq!(harness.resources.find_by_name(names::GRASS), Some(before));

        harness.input.set_buttons(MouseButtons::LEFT, false);
        harness.step(&mut registry);
        let after = harness.resources.find_by_name(names::GRASS).unwrap();
        assert_ne!(after, before);
        // the tile still holds the old mesh
        assert_eq!(harness.resources.ref_count(before), Some(1));

        let mut frame = harness.frame();
        let mut scope = Scope::menu(&mut frame);
        registry.destroy_all(&mut scope);
        assert!(!scope.frame.services.resources.contains(before));
    }
}
