//! Things placed on the lawn besides grass
//!
//! Gnomes and ornaments stand for a while and vanish unless the mower sends
//! them flying first. Mole hills stay until they are flattened. Rabbits idle
//! for a while and leave.

use mowve_engine::assets::{ResourceHandle, ResourceId};
use mowve_engine::foundation::math::{Transform, Vec3};
use mowve_engine::scene::{ObjectError, ObjectId, ObjectState, ObjectStatus};

use super::{acquire_shared_mesh, Core, ObjectKind};
use crate::assets::{self, names};
use crate::frame::Scope;

const GRAVITY: f32 = 0.03;
const FLOOR: f32 = -50.0;
const SQUASH_RECOVERY: f32 = 0.001;
const FLATTENED: f32 = 0.001;

/// Prop variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropKind {
    /// Worth points when smashed
    Gnome,
    /// Costs a life when smashed
    StoneOrnament,
    /// Worth points and time once flattened
    MoleHill,
    /// Harmless visitor
    RabbitHelper,
}

impl PropKind {
    /// Frames before an untouched prop leaves; `None` stays forever
    pub const fn lifetime(self) -> Option<u32> {
        match self {
            Self::Gnome => Some(240),
            Self::StoneOrnament => Some(360),
            Self::MoleHill => None,
            Self::RabbitHelper => Some(600),
        }
    }

    const fn mesh(self) -> (&'static str, ResourceId) {
        match self {
            Self::Gnome => (names::GNOME, assets::GNOME),
            Self::StoneOrnament => (names::ORNAMENT, assets::ORNAMENT),
            Self::MoleHill => (names::MOLE_HILL, assets::MOLE_HILL),
            Self::RabbitHelper => (names::RABBIT, assets::RABBIT),
        }
    }
}

/// A gnome, ornament, mole hill or rabbit
#[derive(Debug)]
pub struct Prop {
    pub(super) core: Core,
    kind: PropKind,
    position: Vec3,
    velocity: Vec3,
    frames_left: u32,
    smashed: bool,
    squash: f32,
    mesh: Option<ResourceHandle>,
}

impl Prop {
    /// Prop of `kind` standing at `position`
    pub fn new(kind: PropKind, position: Vec3) -> Self {
        let mut prop = Self {
            core: Core::new(),
            kind,
            position,
            velocity: Vec3::zeros(),
            frames_left: 0,
            smashed: false,
            squash: 1.0,
            mesh: None,
        };
        prop.initialise();
        prop
    }

    /// Builder: set the velocity (rabbits face along it)
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Kind tag
    pub const fn kind(&self) -> ObjectKind {
        ObjectKind::Prop(self.kind)
    }

    /// Which prop this is
    pub const fn prop_kind(&self) -> PropKind {
        self.kind
    }

    /// Object identity
    pub const fn id(&self) -> ObjectId {
        self.core.id()
    }

    /// World position
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Whether the mower has knocked it flying
    pub const fn is_smashed(&self) -> bool {
        self.smashed
    }

    /// Vertical scale of a mole hill, 1 when untouched
    pub const fn squash_scale(&self) -> f32 {
        self.squash
    }

    /// Knock the prop flying; it falls from then on
    pub fn smash(&mut self, velocity: Vec3) {
        self.smashed = true;
        self.velocity = velocity;
    }

    /// Press the prop down by `amount`; true once it is flat
    pub fn squash(&mut self, amount: f32) -> bool {
        self.squash -= amount;
        self.squash <= FLATTENED
    }

    pub(super) fn initialise(&mut self) {
        self.core.step_or_log(ObjectState::Initialized);
        self.frames_left = self.kind.lifetime().unwrap_or(0);
        self.smashed = false;
        self.squash = 1.0;
    }

    pub(super) fn create(&mut self, scope: &mut Scope<'_, '_>) -> Result<(), ObjectError> {
        self.core.step(ObjectState::Created)?;
        let (name, id) = self.kind.mesh();
        self.mesh = Some(acquire_shared_mesh(scope, name, id)?);
        Ok(())
    }

    pub(super) fn destroy(mut self, scope: &mut Scope<'_, '_>) {
        self.core.step_or_log(ObjectState::Destroying);
        if let Some(mesh) = self.mesh.take() {
            scope.frame.release(mesh);
        }
        self.core.step_or_log(ObjectState::Destroyed);
    }

    pub(super) fn update(&mut self) -> ObjectStatus {
        if self.smashed {
            self.velocity.y -= GRAVITY;
            self.position += self.velocity;
            return if self.position.y <= FLOOR {
                ObjectStatus::Expired
            } else {
                ObjectStatus::Alive
            };
        }

        if self.kind == PropKind::MoleHill {
            self.squash = (self.squash + SQUASH_RECOVERY).min(1.0);
            return ObjectStatus::Alive;
        }

        self.frames_left = self.frames_left.saturating_sub(1);
        if self.frames_left == 0 {
            ObjectStatus::Expired
        } else {
            ObjectStatus::Alive
        }
    }

    pub(super) fn render(&self, scope: &mut Scope<'_, '_>) {
        let mut transform = Transform::from_position(self.position);
        match self.kind {
            PropKind::MoleHill => transform = transform.with_scale(Vec3::new(1.0, self.squash, 1.0)),
            PropKind::RabbitHelper if self.velocity.x != 0.0 || self.velocity.z != 0.0 => {
                transform = transform.with_yaw(self.velocity.x.atan2(self.velocity.z));
            }
            _ => {}
        }
        scope.frame.draw_mesh(self.mesh, &transform.to_matrix());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn run(prop: &mut Prop) -> u32 {
        let mut frames = 1;
        while prop.update() == ObjectStatus::Alive {
            frames += 1;
            assert!(frames < 10_000);
        }
        frames
    }

    #[test]
    fn test_lifetimes() {
        assert_eq!(run(&mut Prop::new(PropKind::Gnome, Vec3::zeros())), 240);
        assert_eq!(run(&mut Prop::new(PropKind::StoneOrnament, Vec3::zeros())), 360);
        assert_eq!(run(&mut Prop::new(PropKind::RabbitHelper, Vec3::zeros())), 600);
    }

    #[test]
    fn test_smashed_prop_falls_out() {
        let mut gnome = Prop::new(PropKind::Gnome, Vec3::zeros());
        gnome.smash(Vec3::new(0.1, 0.5, 0.0));
        let frames = run(&mut gnome);
        assert!(gnome.position().y <= FLOOR);
        assert!(gnome.position().x > 0.0);
        // smashing replaces the countdown with a fall
        assert!(frames > 60);
    }

    #[test]
    fn test_mole_hill_recovers_and_stays() {
        let mut hill = Prop::new(PropKind::MoleHill, Vec3::zeros());
        assert!(!hill.squash(0.5));
        for _ in 0..100 {
            assert_eq!(hill.update(), ObjectStatus::Alive);
        }
        assert_relative_eq!(hill.squash_scale(), 0.6, epsilon = 1e-4);
        for _ in 0..1_000 {
            hill.update();
        }
        assert_relative_eq!(hill.squash_scale(), 1.0);
        assert!(hill.squash(1.0));
    }

    #[test]
    fn test_rabbit_stays_put() {
        let mut rabbit = Prop::new(PropKind::RabbitHelper, Vec3::new(1.0, 0.0, 1.0)).with_velocity(Vec3::new(0.2, 0.0, 0.0));
        rabbit.update();
        assert_eq!(rabbit.position(), Vec3::new(1.0, 0.0, 1.0));
    }
}
