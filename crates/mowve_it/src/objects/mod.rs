//! Game objects held by context registries
//!
//! [`GameObject`] is the closed set of things a context can own. Each variant
//! implements the lifecycle hooks itself; the enum dispatches to them and
//! supplies the per-frame simulation the registry drives.

mod floating_text;
mod grass;
mod mower;
mod props;
mod ui;

pub use floating_text::FloatingText;
pub use grass::GrassTile;
pub use mower::{apply_friction, Mower, MowerKind};
pub use props::{Prop, PropKind};
pub use ui::{Button, ButtonFace, Slider, SliderTarget};

use mowve_engine::assets::loader::acquire_mesh;
use mowve_engine::assets::{ResourceHandle, ResourceId};
use mowve_engine::scene::{
    Identity, Lifecycle, ObjectError, ObjectId, ObjectRegistry, ObjectState, ObjectStatus, Simulated,
};

use crate::frame::Scope;

/// Identity and lifecycle stage shared by every object
#[derive(Debug)]
pub struct Core {
    id: ObjectId,
    state: ObjectState,
}

impl Default for Core {
    fn default() -> Self {
        Self::new()
    }
}

impl Core {
    /// Fresh identity, not yet initialised
    pub fn new() -> Self {
        Self {
            id: ObjectId::next(),
            state: ObjectState::Uninitialized,
        }
    }

    /// Object identity
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Current lifecycle stage
    pub const fn state(&self) -> ObjectState {
        self.state
    }

    /// Advance the lifecycle
    pub fn step(&mut self, to: ObjectState) -> Result<(), ObjectError> {
        self.state.transition(to)
    }

    /// Advance the lifecycle where the hook cannot report failure
    pub fn step_or_log(&mut self, to: ObjectState) {
        if let Err(err) = self.step(to) {
            log::warn!("{}: {err}", self.id);
        }
    }

    /// Track registry ownership
    pub fn set_registered(&mut self, registered: bool) {
        let to = if registered {
            ObjectState::Active
        } else {
            ObjectState::Created
        };
        self.step_or_log(to);
    }
}

/// Kind tag for every object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Player mower
    Mower(MowerKind),
    /// Grass tile
    GrassTile,
    /// Scenery or pickup
    Prop(PropKind),
    /// Score popup
    FloatingText,
    /// Menu button
    Button,
    /// Menu slider
    Slider,
}

/// Acquire the mesh called `name` on behalf of an object being created
pub(crate) fn acquire_shared_mesh(
    scope: &mut Scope<'_, '_>,
    name: &str,
    id: ResourceId,
) -> Result<ResourceHandle, ObjectError> {
    let services = &mut scope.frame.services;
    Ok(acquire_mesh(services.resources, &mut *services.loader, name, id)?)
}

/// Anything a context can own
#[derive(Debug)]
pub enum GameObject {
    /// Player mower
    Mower(Mower),
    /// Grass tile
    Grass(GrassTile),
    /// Gnome, ornament, mole hill or rabbit
    Prop(Prop),
    /// Score popup
    Text(FloatingText),
    /// Menu button
    Button(Button),
    /// Menu slider
    Slider(Slider),
}

impl GameObject {
    /// Mower payload, if this is the mower
    pub fn as_mower(&self) -> Option<&Mower> {
        match self {
            Self::Mower(mower) => Some(mower),
            _ => None,
        }
    }

    /// Grass payload, if this is a grass tile
    pub fn as_grass(&self) -> Option<&GrassTile> {
        match self {
            Self::Grass(tile) => Some(tile),
            _ => None,
        }
    }

    /// Grass payload, if this is a grass tile
    pub fn as_grass_mut(&mut self) -> Option<&mut GrassTile> {
        match self {
            Self::Grass(tile) => Some(tile),
            _ => None,
        }
    }

    /// Prop payload, if this is a prop
    pub fn as_prop(&self) -> Option<&Prop> {
        match self {
            Self::Prop(prop) => Some(prop),
            _ => None,
        }
    }

    /// Lifecycle stage of the wrapped object
    pub fn state(&self) -> ObjectState {
        self.core().state()
    }

    fn core(&self) -> &Core {
        match self {
            Self::Mower(mower) => &mower.core,
            Self::Grass(tile) => &tile.core,
            Self::Prop(prop) => &prop.core,
            Self::Text(text) => &text.core,
            Self::Button(button) => &button.core,
            Self::Slider(slider) => &slider.core,
        }
    }

    fn core_mut(&mut self) -> &mut Core {
        match self {
            Self::Mower(mower) => &mut mower.core,
            Self::Grass(tile) => &mut tile.core,
            Self::Prop(prop) => &mut prop.core,
            Self::Text(text) => &mut text.core,
            Self::Button(button) => &mut button.core,
            Self::Slider(slider) => &mut slider.core,
        }
    }
}

impl Identity for GameObject {
    type Kind = ObjectKind;

    fn id(&self) -> ObjectId {
        self.core().id()
    }

    fn kind(&self) -> ObjectKind {
        match self {
            Self::Mower(mower) => mower.kind(),
            Self::Grass(tile) => tile.kind(),
            Self::Prop(prop) => prop.kind(),
            Self::Text(text) => text.kind(),
            Self::Button(button) => button.kind(),
            Self::Slider(slider) => slider.kind(),
        }
    }

    fn set_registered(&mut self, registered: bool) {
        self.core_mut().set_registered(registered);
    }
}

impl<'s, 'f> Lifecycle<Scope<'s, 'f>> for GameObject {
    fn initialise(&mut self) {
        match self {
            Self::Mower(mower) => mower.initialise(),
            Self::Grass(tile) => tile.initialise(),
            Self::Prop(prop) => prop.initialise(),
            Self::Text(text) => text.initialise(),
            Self::Button(button) => button.initialise(),
            Self::Slider(slider) => slider.initialise(),
        }
    }

    fn create(&mut self, env: &mut Scope<'s, 'f>) -> Result<(), ObjectError> {
        match self {
            Self::Mower(mower) => mower.create(env),
            Self::Grass(tile) => tile.create(env),
            Self::Prop(prop) => prop.create(env),
            Self::Text(text) => text.create(env),
            Self::Button(button) => button.create(env),
            Self::Slider(slider) => slider.create(env),
        }
    }

    fn destroy(self, env: &mut Scope<'s, 'f>) {
        match self {
            Self::Mower(mower) => mower.destroy(env),
            Self::Grass(tile) => tile.destroy(env),
            Self::Prop(prop) => prop.destroy(env),
            Self::Text(text) => text.destroy(env),
            Self::Button(button) => button.destroy(env),
            Self::Slider(slider) => slider.destroy(env),
        }
    }

    fn handle_input(&mut self, env: &mut Scope<'s, 'f>) {
        if let Self::Mower(mower) = self {
            mower.handle_input(env);
        }
    }
}

impl<'s, 'f> Simulated<Scope<'s, 'f>> for GameObject {
    fn update(&mut self, siblings: &mut ObjectRegistry<Self>, env: &mut Scope<'s, 'f>) -> ObjectStatus {
        match self {
            Self::Mower(mower) => mower.update(siblings, env),
            Self::Grass(_) => ObjectStatus::Alive,
            Self::Prop(prop) => prop.update(),
            Self::Text(text) => text.update(),
            Self::Button(button) => button.update(env),
            Self::Slider(slider) => slider.update(env),
        }
    }

    fn render(&self, env: &mut Scope<'s, 'f>) {
        match self {
            Self::Mower(mower) => mower.render(env),
            Self::Grass(tile) => tile.render(env),
            Self::Prop(prop) => prop.render(env),
            Self::Text(text) => text.render(env),
            Self::Button(button) => button.render(env),
            Self::Slider(slider) => slider.render(env),
        }
    }
}

impl From<Mower> for GameObject {
    fn from(mower: Mower) -> Self {
        Self::Mower(mower)
    }
}

impl From<GrassTile> for GameObject {
    fn from(tile: GrassTile) -> Self {
        Self::Grass(tile)
    }
}

impl From<Prop> for GameObject {
    fn from(prop: Prop) -> Self {
        Self::Prop(prop)
    }
}

impl From<FloatingText> for GameObject {
    fn from(text: FloatingText) -> Self {
        Self::Text(text)
    }
}

impl From<Button> for GameObject {
    fn from(button: Button) -> Self {
        Self::Button(button)
    }
}

impl From<Slider> for GameObject {
    fn from(slider: Slider) -> Self {
        Self::Slider(slider)
    }
}
