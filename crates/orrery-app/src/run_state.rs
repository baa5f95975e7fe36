//! Lifecycle of the render loop.

use std::fmt;

/// Where the render loop is in its lifetime.
///
/// The only legal path is `Running -> Closing -> Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Drawing a frame on every redraw.
    #[default]
    Running,
    /// Exit was requested; GPU resources are being released.
    Closing,
    /// Resources released and the event loop told to exit.
    Terminated,
}

impl RunState {
    /// Move from `Running` to `Closing`. Returns `false` if already past `Running`.
    pub fn request_close(&mut self) -> bool {
        match self {
            Self::Running => {
                *self = Self::Closing;
                true
            }
            Self::Closing | Self::Terminated => false,
        }
    }

    /// Move from `Closing` to `Terminated`. Returns `false` from any other state.
    pub fn finish_shutdown(&mut self) -> bool {
        match self {
            Self::Closing => {
                *self = Self::Terminated;
                true
            }
            Self::Running | Self::Terminated => false,
        }
    }

    pub fn is_running(self) -> bool {
        self == Self::Running
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Running => "running",
            Self::Closing => "closing",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_running() {
        assert_eq!(RunState::default(), RunState::Running);
        assert!(RunState::default().is_running());
    }

    #[test]
    fn test_full_lifecycle() {
        let mut state = RunState::Running;
        assert!(state.request_close());
        assert_eq!(state, RunState::Closing);
        assert!(state.finish_shutdown());
        assert_eq!(state, RunState::Terminated);
    }

    #[test]
    fn test_cannot_skip_closing() {
        let mut state = RunState::Running;
        assert!(!state.finish_shutdown());
        assert_eq!(state, RunState::Running);
    }

    #[test]
    fn test_close_requested_twice() {
        let mut state = RunState::Running;
        assert!(state.request_close());
        assert!(!state.request_close());
        assert_eq!(state, RunState::Closing);
    }

    #[test]
    fn test_terminated_is_final() {
        let mut state = RunState::Terminated;
        assert!(!state.request_close());
        assert!(!state.finish_shutdown());
        assert_eq!(state, RunState::Terminated);
    }

    #[test]
    fn test_display() {
        assert_eq!(RunState::Closing.to_string(), "closing");
    }
}
