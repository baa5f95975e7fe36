//! Scene description for the orrery: celestial bodies, their per-frame model
//! transforms, the shared animation angle, and the fixed camera.

pub mod body;
pub mod camera;
pub mod state;
pub mod transform;

pub use body::Body;
pub use camera::{CAMERA_DISTANCE, FAR_PLANE, FIELD_OF_VIEW_DEGREES, NEAR_PLANE, SceneCamera};
pub use state::{DEFAULT_STEP_DEGREES, FrameMatrices, SceneState};
pub use transform::{BodyConfig, Orbit, Tilt, model_matrix};
