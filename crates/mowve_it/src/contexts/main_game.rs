//! The level being played
//!
//! Each frame the children update first, then the game may spawn a prop,
//! checks whether every grass tile is mowed and runs the level timer down.
//! A level reports exactly one outcome: completion, timeout or running out of
//! lives, whichever comes first.

use mowve_engine::foundation::math::{colour, utils, Vec3};
use mowve_engine::input::KeyCode;
use mowve_engine::scene::{Lifecycle, ObjectError, ObjectId, ObjectRegistry, ObjectState, Rejected, RegistryError};
use rand::Rng;

use super::adopt;
use crate::commands::{Command, GameOverReason};
use crate::frame::{Frame, Scope};
use crate::levels::{LevelSpec, LevelState};
use crate::objects::{Core, GameObject, GrassTile, Mower, MowerKind, Prop, PropKind};

const AMBIENT: u32 = 0xff40_80f0;
const CAMERA_SPEED: f32 = 1.0 / 60.0;
const FIELD_OF_VIEW: f32 = 1.0;
const NEAR_PLANE: f32 = 1.0;
const FAR_PLANE: f32 = 100.0;
const SPAWN_TRIES: u32 = 128;
const FRAMES_PER_SECOND: u32 = 60;

/// Context running one level at a time
#[derive(Debug)]
pub struct MainGame {
    pub(super) core: Core,
    pub(super) children: ObjectRegistry<GameObject>,
    spec: &'static LevelSpec,
    level: LevelState,
    mower: Option<ObjectId>,
}

impl MainGame {
    /// Game about to play `spec` from a score of zero
    pub fn new(spec: &'static LevelSpec, lives: u32) -> Self {
        let mut game = Self {
            core: Core::new(),
            children: ObjectRegistry::new(),
            spec,
            level: LevelState::new(spec, lives, 0),
            mower: None,
        };
        game.initialise();
        game
    }

    /// Running level
    pub const fn level(&self) -> &LevelState {
        &self.level
    }

    /// The player's mower
    pub fn mower(&self) -> Option<&Mower> {
        self.mower
            .and_then(|id| self.children.get(id))
            .and_then(GameObject::as_mower)
    }

    /// Replace the lawn with level `spec`, keeping score and camera mode
    pub fn start_level(&mut self, spec: &'static LevelSpec, frame: &mut Frame<'_>) -> Result<(), ObjectError> {
        self.children
            .destroy_all(&mut Scope::level(frame, &mut self.level));
        self.mower = None;

        let mut level = LevelState::new(spec, frame.settings.gameplay.starting_lives, self.level.score);
        level.follow_camera = self.level.follow_camera;
        self.spec = spec;
        self.level = level;
        self.populate(frame)
    }

    /// Swap the mower for one of `kind` with the same position and velocity
    pub fn switch_mower(&mut self, kind: MowerKind, frame: &mut Frame<'_>) -> Result<(), ObjectError> {
        let Some((id, position, velocity)) = self
            .mower
            .and_then(|id| self.children.get(id).and_then(GameObject::as_mower).map(|mower| (id, mower)))
            .filter(|(_, mower)| mower.mower_kind() != kind)
            .map(|(id, mower)| (id, mower.position(), mower.velocity()))
        else {
            return Ok(());
        };

        let mut scope = Scope::level(frame, &mut self.level);
        let mut replacement = GameObject::from(Mower::new(kind).with_motion(position, velocity));
        replacement.create(&mut scope)?;
        match self.children.replace_object(id, replacement, &mut scope) {
            Ok(new_id) => {
                log::info!("Mower switched to {kind:?}");
                self.mower = Some(new_id);
                Ok(())
            }
            Err(Rejected { error, object }) => {
                object.destroy(&mut scope);
                Err(error.into())
            }
        }
    }

    pub(super) fn initialise(&mut self) {
        self.core.step_or_log(ObjectState::Initialized);
    }

    pub(super) fn create(&mut self, frame: &mut Frame<'_>) -> Result<(), ObjectError> {
        self.core.step(ObjectState::Created)?;
        self.populate(frame)
    }

    pub(super) fn destroy(mut self, frame: &mut Frame<'_>) {
        self.core.step_or_log(ObjectState::Destroying);
        self.children
            .destroy_all(&mut Scope::level(frame, &mut self.level));
        self.core.step_or_log(ObjectState::Destroyed);
    }

    pub(super) fn destroy_child(&mut self, id: ObjectId, frame: &mut Frame<'_>) -> Result<(), RegistryError> {
        if self.mower == Some(id) {
            self.mower = None;
        }
        self.children
            .destroy_object(id, &mut Scope::level(frame, &mut self.level))
    }

    /// Mower at the origin, then the lawn
    fn populate(&mut self, frame: &mut Frame<'_>) -> Result<(), ObjectError> {
        log::info!("Starting level {}", self.spec.number);
        let camera = &mut frame.services.camera;
        camera.set_position(self.level.far_view);
        camera.set_focus(Vec3::zeros());
        camera.begin_animate(0.0);

        let mut scope = Scope::level(frame, &mut self.level);
        let mower = adopt(&mut self.children, &mut scope, Mower::new(MowerKind::Mover).into())?;
        self.mower = Some(mower);
        for position in self.spec.tile_positions() {
            adopt(&mut self.children, &mut scope, GrassTile::new(position).into())?;
        }
        Ok(())
    }

    pub(super) fn handle_input(&mut self, frame: &mut Frame<'_>) {
        let input = frame.services.input;
        if input.key_pressed(KeyCode::Escape) {
            frame.request(Command::Pause);
            return;
        }
        if input.key_pressed(KeyCode::Space) {
            self.toggle_follow(frame);
        }
        self.children
            .handle_input(&mut Scope::level(frame, &mut self.level));
    }

    fn toggle_follow(&mut self, frame: &mut Frame<'_>) {
        let camera = &mut frame.services.camera;
        self.level.follow_camera = !self.level.follow_camera;
        camera.begin_animate(CAMERA_SPEED);
        if !self.level.follow_camera {
            camera.set_position(self.level.far_view);
            camera.set_focus(Vec3::zeros());
        }
        log::debug!("Camera follow: {}", self.level.follow_camera);
    }

    pub(super) fn update(&mut self, frame: &mut Frame<'_>) {
        self.children
            .update(&mut Scope::level(frame, &mut self.level));
        self.spawn(frame);
        self.check_lawn(frame);
        self.run_timer(frame);
    }

    fn spawn(&mut self, frame: &mut Frame<'_>) {
        let gameplay = &frame.settings.gameplay;
        if self.level.is_finished() || self.level.timer < gameplay.spawn_threshold {
            return;
        }
        if frame.rng.gen_range(0..gameplay.spawn_chance.max(1)) != 0 {
            return;
        }

        let kind = match frame.rng.gen_range(0..3) {
            0 => PropKind::Gnome,
            1 => PropKind::StoneOrnament,
            _ => PropKind::MoleHill,
        };
        let Some(position) = self.place(frame) else {
            log::debug!("No room for a {kind:?}");
            return;
        };

        let mut scope = Scope::level(frame, &mut self.level);
        match adopt(&mut self.children, &mut scope, Prop::new(kind, position).into()) {
            Ok(_) => log::trace!("Spawned {kind:?} at {position:?}"),
            Err(err) => log::debug!("Skipping {kind:?}: {err}"),
        }
    }

    /// Random lawn position clear of the mower
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn place(&self, frame: &mut Frame<'_>) -> Option<Vec3> {
        let half = self.level.tile_width * 2.0;
        let span = (self.level.tile_width * 4.0) as u32;
        if span == 0 {
            return None;
        }
        let keep_out = self
            .mower()
            .map(|mower| (mower.position(), mower.mower_kind().extent() * 2.0));

        (0..SPAWN_TRIES)
            .map(|_| {
                let x = -half + frame.rng.gen_range(0..span) as f32;
                let z = -half + frame.rng.gen_range(0..span) as f32;
                Vec3::new(x, 0.0, z)
            })
            .find(|point| keep_out.map_or(true, |(centre, extent)| !utils::touches_xz(&centre, extent, point)))
    }

    #[allow(clippy::cast_precision_loss)]
    fn check_lawn(&mut self, frame: &mut Frame<'_>) {
        let (total, mowed) = self
            .children
            .iter()
            .filter_map(GameObject::as_grass)
            .fold((0_u32, 0_u32), |(total, mowed), tile| {
                (total + 1, mowed + u32::from(tile.is_mowed()))
            });
        if total == 0 {
            return;
        }
        if mowed == total {
            if self.level.finish() {
                log::info!("Level {} complete with score {}", self.level.number, self.level.score);
                frame.request(Command::LevelComplete {
                    level: self.level.number,
                    score: self.level.score,
                });
            }
        } else {
            self.level.grass_cut = mowed as f32 * 100.0 / total as f32;
        }
    }

    fn run_timer(&mut self, frame: &mut Frame<'_>) {
        self.level.timer = self.level.timer.saturating_sub(1);
        if self.level.timer == 0 && self.level.finish() {
            log::info!("Level {} timed out", self.level.number);
            frame.request(Command::GameOver {
                reason: GameOverReason::Timeout,
                score: self.level.score,
            });
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub(super) fn render(&self, frame: &mut Frame<'_>) {
        let viewport = frame.services.viewport();
        let aspect = viewport.width() as f32 / viewport.height().max(1) as f32;
        let view = frame.services.camera.view_matrix();
        let renderer = &mut frame.services.renderer;
        renderer.clear(AMBIENT);
        renderer.set_view_transform(&view);
        renderer.set_projection_transform(&utils::perspective_lh(FIELD_OF_VIEW, aspect, NEAR_PLANE, FAR_PLANE));

        self.children.render(&mut Scope::menu(frame));

        let hud = format!(
            "Grass cut: {}%\nScore: {}\n\nLives remaining: {}\n\nTime remaining (seconds): {}",
            self.level.grass_cut as u32,
            self.level.score,
            self.level.lives,
            self.level.timer / FRAMES_PER_SECOND,
        );
        frame.services.renderer.draw_text(&hud, viewport, colour::WHITE);
    }
}
