//! Per-frame animation state and the matrices derived from it.

use glam::Mat4;

use crate::body::Body;
use crate::camera::SceneCamera;
use crate::transform::{BodyConfig, model_matrix};

/// Default angle increment per frame, in degrees.
pub const DEFAULT_STEP_DEGREES: f32 = 1.0;

/// The only mutable state driving the scene: one shared animation angle.
///
/// Created before the render loop, advanced once per frame, and dropped on
/// exit. Every body transform is a pure function of `angle`.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    /// Current angle in degrees, always in `[0, 360)`.
    angle: f32,
    /// Increment applied by [`advance`](Self::advance).
    step: f32,
    /// Number of frames advanced so far.
    frame: u64,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMatrices {
    pub view: Mat4,
    pub projection: Mat4,
    /// Model matrix per body, in [`Body::ALL`] order.
    pub bodies: [(Body, Mat4); Body::COUNT],
}

impl SceneState {
    /// Creates a state at angle 0 with the given per-frame step.
    pub fn new(step: f32) -> Self {
        Self {
            angle: 0.0,
            step,
            frame: 0,
        }
    }

    /// Current animation angle in degrees.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Per-frame increment in degrees.
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Number of frames advanced.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advance by one frame and wrap into `[0, 360)`.
    pub fn advance(&mut self) {
        let mut angle = (self.angle + self.step).rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs.
        if angle >= 360.0 {
            angle = 0.0;
        }
        self.angle = angle;
        self.frame += 1;
    }

    /// Model matrix for every body at the current angle.
    pub fn body_transforms(&self) -> [(Body, Mat4); Body::COUNT] {
        Body::ALL.map(|body| (body, model_matrix(BodyConfig::for_body(body), self.angle)))
    }

    /// Assemble the view, projection and model matrices for this frame.
    pub fn frame_matrices(&self, camera: &SceneCamera, aspect_ratio: f32) -> FrameMatrices {
        FrameMatrices {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(aspect_ratio),
            bodies: self.body_transforms(),
        }
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_DEGREES)
    }
}
