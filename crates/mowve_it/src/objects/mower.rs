//! The player's lawn mower
//!
//! Each frame the mower moves, is clamped to the arena, accelerates from the
//! movement keys, loses speed to friction and then resolves contact with
//! every other object in its registry:
//!
//! | Contact | Effect |
//! |---------|--------|
//! | unmowed grass | tile mowed, +1 |
//! | gnome | smashed away, +50 |
//! | ornament | a life lost (game over at none), -100 |
//! | mole hill | squashed a little, mower slowed; flattened gives +100 and 3 s |

use mowve_engine::assets::ResourceHandle;
use mowve_engine::foundation::math::{utils, Transform, Vec3};
use mowve_engine::input::KeyCode;
use mowve_engine::scene::{Lifecycle, ObjectError, ObjectId, ObjectRegistry, ObjectState, ObjectStatus};

use super::{acquire_shared_mesh, Core, FloatingText, GameObject, ObjectKind};
use crate::assets;
use crate::commands::{Command, GameOverReason};
use crate::frame::Scope;

const FRICTION: f32 = 0.01;
const GNOME_POINTS: u32 = 50;
const ORNAMENT_PENALTY: u32 = 100;
const MOLE_HILL_POINTS: u32 = 100;
const MOLE_HILL_BONUS_FRAMES: u32 = 180;
const MOLE_HILL_SQUASH: f32 = 0.021;
const MOLE_HILL_DRAG: f32 = 0.8;
const SMASH_LIFT: f32 = 0.5;
const FOLLOW_HEIGHT: f32 = 10.0;
const FOLLOW_DISTANCE: f32 = 20.0;

/// The three mowers the player can switch between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MowerKind {
    /// Small, quick and twitchy
    Mini,
    /// The all-rounder every level starts with
    Mover,
    /// Wide cut, slow to accelerate
    Monster,
}

impl MowerKind {
    /// Half-width of the cutting box
    pub const fn extent(self) -> f32 {
        match self {
            Self::Mini => 1.5,
            Self::Mover => 2.0,
            Self::Monster => 3.0,
        }
    }

    /// Speed gained per frame while a movement key is held
    pub const fn acceleration(self) -> f32 {
        match self {
            Self::Mini => 0.02,
            Self::Mover => 0.015,
            Self::Monster => 0.012,
        }
    }

    /// Pool name of the mesh
    pub const fn mesh_name(self) -> &'static str {
        match self {
            Self::Mini => "MowerMini",
            Self::Mover => "MowerMover",
            Self::Monster => "MowerMonster",
        }
    }

    const fn resource(self) -> mowve_engine::assets::ResourceId {
        match self {
            Self::Mini => assets::MOWER_MINI,
            Self::Mover => assets::MOWER_MOVER,
            Self::Monster => assets::MOWER_MONSTER,
        }
    }

    /// Key that selects this mower
    pub const fn key(self) -> KeyCode {
        match self {
            Self::Mini => KeyCode::Num1,
            Self::Mover => KeyCode::Num2,
            Self::Monster => KeyCode::Num3,
        }
    }
}

/// Slow a velocity by a fixed amount along its own direction
///
/// Each axis loses `0.01 * v_axis / |v|`; an axis smaller than its share
/// stops outright, so the mower always comes to rest exactly.
pub fn apply_friction(velocity: &mut Vec3) {
    let speed = velocity.norm();
    if speed <= 0.0 {
        return;
    }
    for axis in velocity.iter_mut() {
        let sub = FRICTION * *axis / speed;
        if axis.abs() < sub.abs() {
            *axis = 0.0;
        } else {
            *axis -= sub;
        }
    }
}

/// What touching the other objects did this frame
#[derive(Debug, Default)]
struct Contacts {
    texts: Vec<FloatingText>,
    flattened: Vec<ObjectId>,
}

/// Player mower
#[derive(Debug)]
pub struct Mower {
    pub(super) core: Core,
    kind: MowerKind,
    position: Vec3,
    velocity: Vec3,
    facing: Vec3,
    mesh: Option<ResourceHandle>,
}

impl Mower {
    /// Initialised mower at the origin
    pub fn new(kind: MowerKind) -> Self {
        let mut mower = Self {
            core: Core::new(),
            kind,
            position: Vec3::zeros(),
            velocity: Vec3::zeros(),
            facing: Vec3::z(),
            mesh: None,
        };
        mower.initialise();
        mower
    }

    /// Builder: start from another mower's motion
    #[must_use]
    pub fn with_motion(mut self, position: Vec3, velocity: Vec3) -> Self {
        self.position = position;
        self.velocity = velocity;
        self
    }

    /// Kind tag
    pub const fn kind(&self) -> ObjectKind {
        ObjectKind::Mower(self.kind)
    }

    /// Which mower this is
    pub const fn mower_kind(&self) -> MowerKind {
        self.kind
    }

    /// World position
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Movement per frame
    pub const fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Unit heading, kept from the last frame the mower moved
    pub const fn facing(&self) -> Vec3 {
        self.facing
    }

    pub(super) fn initialise(&mut self) {
        self.core.step_or_log(ObjectState::Initialized);
        self.position = Vec3::zeros();
        self.velocity = Vec3::zeros();
        self.facing = Vec3::z();
    }

    pub(super) fn create(&mut self, scope: &mut Scope<'_, '_>) -> Result<(), ObjectError> {
        self.core.step(ObjectState::Created)?;
        self.mesh = Some(acquire_shared_mesh(scope, self.kind.mesh_name(), self.kind.resource())?);
        Ok(())
    }

    pub(super) fn destroy(mut self, scope: &mut Scope<'_, '_>) {
        self.core.step_or_log(ObjectState::Destroying);
        if let Some(mesh) = self.mesh.take() {
            scope.frame.release(mesh);
        }
        self.core.step_or_log(ObjectState::Destroyed);
    }

    pub(super) fn handle_input(&mut self, scope: &mut Scope<'_, '_>) {
        let input = scope.frame.services.input;
        let selected = [MowerKind::Mini, MowerKind::Mover, MowerKind::Monster]
            .into_iter()
            .find(|kind| *kind != self.kind && input.key_pressed(kind.key()));
        if let Some(kind) = selected {
            log::debug!("Switching mower to {kind:?}");
            scope.frame.request(Command::SwitchMower(kind));
        }
    }

    pub(super) fn update(&mut self, siblings: &mut ObjectRegistry<GameObject>, scope: &mut Scope<'_, '_>) -> ObjectStatus {
        self.position += self.velocity;
        if let Some(level) = scope.level.as_deref() {
            self.clamp_to_arena(level.arena_limit());
        }
        self.accelerate(scope);
        apply_friction(&mut self.velocity);

        let contacts = self.collide(siblings, scope);
        for id in contacts.flattened {
            if let Err(err) = siblings.destroy_object(id, scope) {
                log::warn!("Flattened mole hill: {err}");
            }
        }
        for text in contacts.texts {
            spawn_text(siblings, scope, text);
        }

        self.follow_camera(scope);
        if self.velocity.x != 0.0 || self.velocity.z != 0.0 {
            self.facing = Vec3::new(self.velocity.x, 0.0, self.velocity.z).normalize();
        }
        ObjectStatus::Alive
    }

    pub(super) fn render(&self, scope: &mut Scope<'_, '_>) {
        let yaw = self.facing.x.atan2(self.facing.z);
        let world = Transform::from_position(self.position).with_yaw(yaw).to_matrix();
        scope.frame.draw_mesh(self.mesh, &world);
    }

    fn clamp_to_arena(&mut self, limit: f32) {
        for axis in [0, 2] {
            if self.position[axis] > limit {
                self.position[axis] = limit;
                self.velocity[axis] = 0.0;
            } else if self.position[axis] < -limit {
                self.position[axis] = -limit;
                self.velocity[axis] = 0.0;
            }
        }
    }

    fn accelerate(&mut self, scope: &Scope<'_, '_>) {
        let input = scope.frame.services.input;
        let held = |keys: [KeyCode; 2]| keys.iter().any(|key| input.is_key_down(*key));
        let rate = self.kind.acceleration();
        if held([KeyCode::A, KeyCode::Left]) {
            self.velocity.x -= rate;
        }
        if held([KeyCode::D, KeyCode::Right]) {
            self.velocity.x += rate;
        }
        if held([KeyCode::W, KeyCode::Up]) {
            self.velocity.z += rate;
        }
        if held([KeyCode::S, KeyCode::Down]) {
            self.velocity.z -= rate;
        }
    }

    fn collide(&mut self, siblings: &mut ObjectRegistry<GameObject>, scope: &mut Scope<'_, '_>) -> Contacts {
        let mut contacts = Contacts::default();
        let Some(level) = scope.level.as_deref_mut() else {
            return contacts;
        };
        let stage_frames = scope.frame.settings.gameplay.text_stage_frames;
        let extent = self.kind.extent();

        for other in siblings.iter_mut() {
            match other {
                GameObject::Grass(tile) => {
                    if !tile.is_mowed() && utils::touches_xz(&self.position, extent, &tile.position()) {
                        tile.mow();
                        level.award(1);
                    }
                }
                GameObject::Prop(prop) if utils::touches_xz(&self.position, extent, &prop.position()) => {
                    match prop.prop_kind() {
                        super::PropKind::Gnome if !prop.is_smashed() => {
                            prop.smash(self.smash_velocity());
                            level.award(GNOME_POINTS);
                            contacts
                                .texts
                                .push(FloatingText::new("+50 points", 0xff00_ff00, stage_frames));
                        }
                        super::PropKind::StoneOrnament if !prop.is_smashed() => {
                            if level.lives == 0 {
                                if level.finish() {
                                    log::info!("Ornament hit with no lives left");
                                    scope.frame.request(Command::GameOver {
                                        reason: GameOverReason::NoLives,
                                        score: level.score,
                                    });
                                }
                            } else {
                                level.lives -= 1;
                            }
                            level.penalise(ORNAMENT_PENALTY);
                            prop.smash(self.smash_velocity());
                            contacts
                                .texts
                                .push(FloatingText::new("-100 points", 0xffff_0000, stage_frames));
                        }
                        super::PropKind::MoleHill => {
                            if prop.squash(MOLE_HILL_SQUASH) {
                                contacts.flattened.push(prop.id());
                                level.award(MOLE_HILL_POINTS);
                                level.timer = level.timer.saturating_add(MOLE_HILL_BONUS_FRAMES);
                                contacts
                                    .texts
                                    .push(FloatingText::new("+100 points\n+3 seconds.", 0xffff_ff44, stage_frames));
                            }
                            self.velocity.x *= MOLE_HILL_DRAG;
                            self.velocity.z *= MOLE_HILL_DRAG;
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }
        contacts
    }

    fn smash_velocity(&self) -> Vec3 {
        Vec3::new(self.velocity.x, SMASH_LIFT, self.velocity.z)
    }

    fn follow_camera(&self, scope: &mut Scope<'_, '_>) {
        if !scope.level.as_deref().is_some_and(|level| level.follow_camera) {
            return;
        }
        let camera = &mut scope.frame.services.camera;
        camera.set_focus(self.position);
        camera.set_position(Vec3::new(
            self.position.x,
            FOLLOW_HEIGHT,
            self.position.z - FOLLOW_DISTANCE,
        ));
    }
}

/// Create a popup and hand it to the registry, dropping it on failure
fn spawn_text(siblings: &mut ObjectRegistry<GameObject>, scope: &mut Scope<'_, '_>, text: FloatingText) {
    let mut object = GameObject::from(text);
    if let Err(err) = object.create(scope) {
        log::debug!("Skipping floating text: {err}");
        return;
    }
    if let Err(rejected) = siblings.register(object) {
        log::debug!("Skipping floating text: {}", rejected.error);
        rejected.into_inner().destroy(scope);
    }
}
