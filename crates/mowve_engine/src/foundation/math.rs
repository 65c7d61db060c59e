//! Math utilities and types
//!
//! Thin nalgebra aliases plus the handful of 2D/3D helpers the game needs:
//! world transforms for meshes, integer screen rectangles for UI, and
//! packed ARGB colours.

pub use nalgebra::{Matrix4, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// World transform of a mesh instance: translation, yaw and per-axis scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,

    /// Rotation around +Y in radians
    pub yaw: f32,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            yaw: 0.0,
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder: set yaw
    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    /// Builder: set scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Scale, then rotate, then translate
    pub fn to_matrix(&self) -> Mat4 {
        let scale = Mat4::new_nonuniform_scaling(&self.scale);
        let rotation = Mat4::from_axis_angle(&Vec3::y_axis(), self.yaw);
        let translation = Mat4::new_translation(&self.position);
        translation * rotation * scale
    }
}

/// Integer screen-space rectangle (left/top inclusive, right/bottom exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    /// Left edge
    pub left: i32,
    /// Top edge
    pub top: i32,
    /// Right edge
    pub right: i32,
    /// Bottom edge
    pub bottom: i32,
}

impl Rect {
    /// Create a rectangle from its edges
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Create a rectangle centred on a point
    pub const fn centred(cx: i32, cy: i32, half_width: i32, half_height: i32) -> Self {
        Self::new(cx - half_width, cy - half_height, cx + half_width, cy + half_height)
    }

    /// Width in pixels
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Height in pixels
    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Whether the point lies inside the rectangle
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Copy of the rectangle with its top edge moved down
    pub const fn offset_top(&self, by: i32) -> Self {
        Self::new(self.left, self.top + by, self.right, self.bottom)
    }
}

/// Packed ARGB colour helpers
pub mod colour {
    /// Opaque white
    pub const WHITE: u32 = 0xffff_ffff;
    /// Opaque black
    pub const BLACK: u32 = 0xff00_0000;

    /// Replace the alpha channel of a packed ARGB colour
    pub fn with_alpha(argb: u32, alpha: f32) -> u32 {
        // clamp keeps the cast in 0..=255
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u32;
        (argb & 0x00ff_ffff) | (a << 24)
    }

    /// Alpha channel of a packed ARGB colour in 0..=1
    #[allow(clippy::cast_precision_loss)]
    pub fn alpha(argb: u32) -> f32 {
        (argb >> 24) as f32 / 255.0
    }
}

/// Common math utilities
pub mod utils {
    use super::Vec3;

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Component-wise linear interpolation
    pub fn lerp_vec3(a: &Vec3, b: &Vec3, t: f32) -> Vec3 {
        a + (b - a) * t
    }

    /// Axis-aligned containment test on the XZ plane
    pub fn within_xz(centre: &Vec3, half_extent: f32, point: &Vec3) -> bool {
        point.x > centre.x - half_extent
            && point.x < centre.x + half_extent
            && point.z > centre.z - half_extent
            && point.z < centre.z + half_extent
    }

    /// Axis-aligned overlap test on the XZ plane, edges included
    pub fn touches_xz(centre: &Vec3, half_extent: f32, point: &Vec3) -> bool {
        point.x >= centre.x - half_extent
            && point.x <= centre.x + half_extent
            && point.z >= centre.z - half_extent
            && point.z <= centre.z + half_extent
    }

    /// Left-handed perspective projection mapping depth to 0..=1
    pub fn perspective_lh(fov_y: f32, aspect: f32, near: f32, far: f32) -> super::Mat4 {
        let y_scale = 1.0 / (fov_y * 0.5).tan();
        let x_scale = y_scale / aspect;
        let depth = far / (far - near);
        super::Mat4::new(
            x_scale, 0.0, 0.0, 0.0,
            0.0, y_scale, 0.0, 0.0,
            0.0, 0.0, depth, -near * depth,
            0.0, 0.0, 1.0, 0.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_transform_translation() {
        let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let moved = transform.to_matrix().transform_point(&Point3::origin());
        assert_relative_eq!(moved.x, 1.0);
        assert_relative_eq!(moved.y, 2.0);
        assert_relative_eq!(moved.z, 3.0);
    }

    #[test]
    fn test_transform_scale_then_translate() {
        let transform = Transform::from_position(Vec3::new(0.0, 1.0, 0.0))
            .with_scale(Vec3::new(2.0, 2.0, 2.0));
        let moved = transform.to_matrix().transform_point(&Point3::new(1.0, 1.0, 0.0));
        assert_relative_eq!(moved.x, 2.0, epsilon = 1e-6);
        assert_relative_eq!(moved.y, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10, 20, 30, 40);
        assert!(rect.contains(10, 20));
        assert!(rect.contains(29, 39));
        assert!(!rect.contains(30, 25));
        assert_eq!(rect.width(), 20);
        assert_eq!(Rect::centred(0, 0, 5, 5), Rect::new(-5, -5, 5, 5));
    }

    #[test]
    fn test_colour_alpha() {
        assert_eq!(colour::with_alpha(0xff00_ff00, 0.0), 0x0000_ff00);
        assert_eq!(colour::with_alpha(0x0000_ff00, 1.0), 0xff00_ff00);
        assert_relative_eq!(colour::alpha(0x8000_0000), 128.0 / 255.0);
    }

    #[test]
    fn test_within_xz() {
        let centre = Vec3::new(1.0, 0.0, 1.0);
        assert!(utils::within_xz(&centre, 2.0, &Vec3::new(2.5, 100.0, 0.0)));
        assert!(!utils::within_xz(&centre, 2.0, &Vec3::new(3.0, 0.0, 1.0)));
    }

    #[test]
    fn test_touches_xz_includes_edges() {
        let centre = Vec3::zeros();
        assert!(utils::touches_xz(&centre, 2.0, &Vec3::new(2.0, 0.0, -2.0)));
        assert!(!utils::touches_xz(&centre, 2.0, &Vec3::new(2.01, 0.0, 0.0)));
    }

    #[test]
    fn test_perspective_lh_depth_range() {
        let projection = utils::perspective_lh(1.0, 4.0 / 3.0, 1.0, 100.0);
        let near = projection.transform_point(&Point3::new(0.0, 0.0, 1.0));
        let far = projection.transform_point(&Point3::new(0.0, 0.0, 100.0));
        assert_relative_eq!(near.z, 0.0, epsilon = 1e-5);
        assert_relative_eq!(far.z, 1.0, epsilon = 1e-5);
    }
}
