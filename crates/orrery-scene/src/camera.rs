//! Fixed camera for the orrery: view and projection matrix generation.

use glam::{Mat4, Vec3};

/// Distance the camera sits back from the scene origin.
pub const CAMERA_DISTANCE: f32 = 20.0;

/// Vertical field of view in degrees. Negative on purpose: it mirrors the
/// image on both axes, which the view rotations below account for.
pub const FIELD_OF_VIEW_DEGREES: f32 = -45.0;

/// Near clip plane distance.
pub const NEAR_PLANE: f32 = 0.1;

/// Far clip plane distance.
pub const FAR_PLANE: f32 = 100.0;

/// A camera that never moves. The scene's orbital plane is XY, so the view
/// tips it up to face the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneCamera {
    /// Distance back along the view axis.
    pub distance: f32,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl SceneCamera {
    /// Compute the view matrix: `T(0, 0, -distance) · Rx(90°) · Ry(180°)`.
    ///
    /// Depends only on constants, so every call yields the same matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::IDENTITY
            * Mat4::from_translation(Vec3::new(0.0, 0.0, -self.distance))
            * Mat4::from_axis_angle(Vec3::X, 90.0_f32.to_radians())
            * Mat4::from_axis_angle(Vec3::Y, 180.0_f32.to_radians())
    }

    /// Compute the perspective projection with reverse-Z for the given
    /// `width / height` aspect ratio.
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        // Reverse-Z: near plane maps to z=1, far plane maps to z=0.
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            aspect_ratio,
            self.far,  // swapped: far as "near" parameter
            self.near, // swapped: near as "far" parameter
        )
    }
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self {
            distance: CAMERA_DISTANCE,
            fov_y_degrees: FIELD_OF_VIEW_DEGREES,
            near: NEAR_PLANE,
            far: FAR_PLANE,
        }
    }
}
