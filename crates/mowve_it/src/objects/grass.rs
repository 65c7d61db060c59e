use mowve_engine::assets::ResourceHandle;
use mowve_engine::foundation::math::{Transform, Vec3};
use mowve_engine::scene::{ObjectError, ObjectState};

use super::{acquire_shared_mesh, Core, ObjectKind};
use crate::assets::{grass_for_density, names};
use crate::frame::Scope;

const MOWED_HEIGHT: f32 = 0.1;
const SWAY: f32 = 0.1;
const SWAY_RATE: f32 = 0.002;

/// One square of lawn
#[derive(Debug)]
pub struct GrassTile {
    pub(super) core: Core,
    position: Vec3,
    mowed: bool,
    mesh: Option<ResourceHandle>,
}

impl GrassTile {
    /// Unmowed tile centred on `position`
    pub fn new(position: Vec3) -> Self {
        let mut tile = Self {
            core: Core::new(),
            position,
            mowed: false,
            mesh: None,
        };
        tile.initialise();
        tile
    }

    /// Kind tag
    pub const fn kind(&self) -> ObjectKind {
        ObjectKind::GrassTile
    }

    /// Tile centre
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Whether the mower has cut it
    pub const fn is_mowed(&self) -> bool {
        self.mowed
    }

    /// Cut the tile; it stays cut for the rest of the level
    pub fn mow(&mut self) {
        self.mowed = true;
    }

    pub(super) fn initialise(&mut self) {
        self.core.step_or_log(ObjectState::Initialized);
        self.mowed = false;
    }

    pub(super) fn create(&mut self, scope: &mut Scope<'_, '_>) -> Result<(), ObjectError> {
        self.core.step(ObjectState::Created)?;
        let variant = grass_for_density(scope.frame.settings.gameplay.grass_density);
        self.mesh = Some(acquire_shared_mesh(scope, names::GRASS, variant)?);
        Ok(())
    }

    pub(super) fn destroy(mut self, scope: &mut Scope<'_, '_>) {
        self.core.step_or_log(ObjectState::Destroying);
        if let Some(mesh) = self.mesh.take() {
            scope.frame.release(mesh);
        }
        self.core.step_or_log(ObjectState::Destroyed);
    }

    pub(super) fn render(&self, scope: &mut Scope<'_, '_>) {
        let world = if self.mowed {
            Transform::from_position(self.position)
                .with_scale(Vec3::new(1.0, MOWED_HEIGHT, 1.0))
                .to_matrix()
        } else {
            // blades lean with time, top moving along x
            #[allow(clippy::cast_precision_loss)]
            let ms = scope.frame.services.clock.total_time().as_millis() as f32;
            let mut world = Transform::from_position(self.position).to_matrix();
            world[(0, 1)] = (ms * SWAY_RATE).cos() * SWAY;
            world
        };
        scope.frame.draw_mesh(self.mesh, &world);
    }
}
