//! Window, input and the per-frame render loop of the orrery.

pub mod frame_pacer;
pub mod input;
pub mod run_state;
pub mod window;

pub use frame_pacer::FramePacer;
pub use input::{KeyboardState, RawKeyEvent};
pub use run_state::RunState;
pub use window::{ExitStatus, OrreryApp, run};
