//! Level table and per-level running state

use mowve_engine::foundation::math::Vec3;

/// Static description of one level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSpec {
    /// 1-based level number
    pub number: u8,
    /// Tiles per side of the square lawn
    pub grid: u32,
    /// Lawn scale used for the arena bounds and spawn area
    pub tile_width: f32,
    /// Frames allowed
    pub timer: u32,
    /// Camera position when not following the mower
    pub far_view: [f32; 3],
}

static LEVELS: [LevelSpec; 4] = [
    LevelSpec {
        number: 1,
        grid: 8,
        tile_width: 4.0,
        timer: 600,
        far_view: [0.0, 10.0, -12.5],
    },
    LevelSpec {
        number: 2,
        grid: 12,
        tile_width: 6.0,
        timer: 900,
        far_view: [0.0, 15.0, -18.75],
    },
    LevelSpec {
        number: 3,
        grid: 16,
        tile_width: 8.0,
        timer: 1200,
        far_view: [0.0, 20.0, -25.0],
    },
    LevelSpec {
        number: 4,
        grid: 20,
        tile_width: 10.0,
        timer: 1500,
        far_view: [0.0, 25.0, -31.25],
    },
];

impl LevelSpec {
    /// Look up level `number`
    pub fn get(number: u8) -> Option<&'static Self> {
        LEVELS.iter().find(|level| level.number == number)
    }

    /// Level that follows this one, if any
    pub fn next(&self) -> Option<&'static Self> {
        Self::get(self.number + 1)
    }

    /// Centres of the grass tiles, row by row
    #[allow(clippy::cast_precision_loss)]
    pub fn tile_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        let offset = (self.grid - 1) as f32;
        (0..self.grid).flat_map(move |i| {
            (0..self.grid).map(move |j| Vec3::new((i * 2) as f32 - offset, 0.0, (j * 2) as f32 - offset))
        })
    }
}

/// Mutable state of the level being played
#[derive(Debug, Clone, PartialEq)]
pub struct LevelState {
    /// Level number
    pub number: u8,
    /// Lawn scale
    pub tile_width: f32,
    /// Frames left
    pub timer: u32,
    /// Ornament hits left before the game is lost
    pub lives: u32,
    /// Points so far, never negative
    pub score: u32,
    /// Share of grass mowed, in percent
    pub grass_cut: f32,
    /// Camera position when not following the mower
    pub far_view: Vec3,
    /// Whether the camera tracks the mower
    pub follow_camera: bool,
    finished: bool,
}

impl LevelState {
    /// Fresh state for `spec`, carrying `score` over from the previous level
    pub fn new(spec: &LevelSpec, lives: u32, score: u32) -> Self {
        Self {
            number: spec.number,
            tile_width: spec.tile_width,
            timer: spec.timer,
            lives,
            score,
            grass_cut: 0.0,
            far_view: Vec3::from(spec.far_view),
            follow_camera: false,
            finished: false,
        }
    }

    /// Claim the level's single outcome; true only on the first call
    pub fn finish(&mut self) -> bool {
        !std::mem::replace(&mut self.finished, true)
    }

    /// Whether an outcome was already claimed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Half-size of the arena the mower may roam
    pub fn arena_limit(&self) -> f32 {
        self.tile_width * 2.0 - 1.0
    }

    /// Add points
    pub fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Remove points, flooring at zero
    pub fn penalise(&mut self, points: u32) {
        self.score = self.score.saturating_sub(points);
    }
}
