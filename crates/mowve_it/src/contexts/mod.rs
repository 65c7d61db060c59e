//! Top-level screens
//!
//! Exactly one [`Context`] is active at a time. It owns the objects on screen
//! and hands them a [`Scope`] each frame. Contexts are only swapped while the
//! game applies commands, never from inside a context pass.

mod help;
mod main_game;
mod main_menu;
mod options;
mod pause;

pub use help::HelpPages;
pub use main_game::MainGame;
pub use main_menu::MainMenu;
pub use options::OptionsMenu;
pub use pause::PauseMenu;

use mowve_engine::scene::{Container, Identity, Lifecycle, ObjectError, ObjectId, ObjectRegistry, Rejected, RegistryError};

use crate::frame::{Frame, Scope};
use crate::objects::{Core, GameObject};

/// Kind tag for every context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// Start screen
    MainMenu,
    /// How-to-play pages
    Help,
    /// Settings sliders
    Options,
    /// Suspended level
    Pause,
    /// Level being played
    MainGame,
}

/// The active screen
#[derive(Debug)]
pub enum Context {
    /// Start screen
    MainMenu(MainMenu),
    /// How-to-play pages
    Help(HelpPages),
    /// Settings sliders
    Options(OptionsMenu),
    /// Suspended level
    Pause(PauseMenu),
    /// Level being played
    Game(MainGame),
}

impl Context {
    /// Main game payload, if a level is running
    pub fn as_game(&self) -> Option<&MainGame> {
        match self {
            Self::Game(game) => Some(game),
            _ => None,
        }
    }

    /// Main game payload, if a level is running
    pub fn as_game_mut(&mut self) -> Option<&mut MainGame> {
        match self {
            Self::Game(game) => Some(game),
            _ => None,
        }
    }

    fn core(&self) -> &Core {
        match self {
            Self::MainMenu(menu) => &menu.core,
            Self::Help(help) => &help.core,
            Self::Options(options) => &options.core,
            Self::Pause(pause) => &pause.core,
            Self::Game(game) => &game.core,
        }
    }
}

impl Identity for Context {
    type Kind = ContextKind;

    fn id(&self) -> ObjectId {
        self.core().id()
    }

    fn kind(&self) -> ContextKind {
        match self {
            Self::MainMenu(_) => ContextKind::MainMenu,
            Self::Help(_) => ContextKind::Help,
            Self::Options(_) => ContextKind::Options,
            Self::Pause(_) => ContextKind::Pause,
            Self::Game(_) => ContextKind::MainGame,
        }
    }
}

impl<'f> Lifecycle<Frame<'f>> for Context {
    fn initialise(&mut self) {
        match self {
            Self::MainMenu(menu) => menu.initialise(),
            Self::Help(help) => help.initialise(),
            Self::Options(options) => options.initialise(),
            Self::Pause(pause) => pause.initialise(),
            Self::Game(game) => game.initialise(),
        }
    }

    fn create(&mut self, env: &mut Frame<'f>) -> Result<(), ObjectError> {
        match self {
            Self::MainMenu(menu) => menu.create(env),
            Self::Help(help) => help.create(),
            Self::Options(options) => options.create(env),
            Self::Pause(pause) => pause.create(),
            Self::Game(game) => game.create(env),
        }
    }

    fn destroy(self, env: &mut Frame<'f>) {
        log::debug!("Destroying {:?} context", self.kind());
        match self {
            Self::MainMenu(menu) => menu.destroy(env),
            Self::Help(help) => help.destroy(env),
            Self::Options(options) => options.destroy(env),
            Self::Pause(pause) => pause.destroy(env),
            Self::Game(game) => game.destroy(env),
        }
    }
}

impl<'f> Container<Frame<'f>> for Context {
    type Child = GameObject;

    fn children(&self) -> &ObjectRegistry<GameObject> {
        match self {
            Self::MainMenu(menu) => &menu.children,
            Self::Help(help) => &help.children,
            Self::Options(options) => &options.children,
            Self::Pause(pause) => &pause.children,
            Self::Game(game) => &game.children,
        }
    }

    fn children_mut(&mut self) -> &mut ObjectRegistry<GameObject> {
        match self {
            Self::MainMenu(menu) => &mut menu.children,
            Self::Help(help) => &mut help.children,
            Self::Options(options) => &mut options.children,
            Self::Pause(pause) => &mut pause.children,
            Self::Game(game) => &mut game.children,
        }
    }

    fn update(&mut self, env: &mut Frame<'f>) {
        match self {
            Self::MainMenu(menu) => menu.update(env),
            Self::Help(_) | Self::Pause(_) => {}
            Self::Options(options) => options.update(env),
            Self::Game(game) => game.update(env),
        }
    }

    fn render(&self, env: &mut Frame<'f>) {
        match self {
            Self::MainMenu(menu) => menu.render(env),
            Self::Help(help) => help.render(env),
            Self::Options(options) => options.render(env),
            Self::Pause(pause) => pause.render(env),
            Self::Game(game) => game.render(env),
        }
    }

    fn handle_input(&mut self, env: &mut Frame<'f>) {
        match self {
            Self::MainMenu(menu) => menu.handle_input(env),
            Self::Help(help) => help.handle_input(env),
            Self::Options(options) => options.handle_input(env),
            Self::Pause(pause) => pause.handle_input(env),
            Self::Game(game) => game.handle_input(env),
        }
    }

    fn destroy_child(&mut self, id: ObjectId, env: &mut Frame<'f>) -> Result<(), RegistryError> {
        if let Self::Game(game) = self {
            return game.destroy_child(id, env);
        }
        let mut scope = Scope::menu(env);
        self.children_mut().destroy_object(id, &mut scope)
    }
}

/// Create `object` and move it into `children`
///
/// An object the registry turns away is destroyed again before the error is
/// returned.
pub(crate) fn adopt(
    children: &mut ObjectRegistry<GameObject>,
    scope: &mut Scope<'_, '_>,
    mut object: GameObject,
) -> Result<ObjectId, ObjectError> {
    object.create(scope)?;
    children.register(object).map_err(|Rejected { error, object }| {
        object.destroy(scope);
        ObjectError::from(error)
    })
}
