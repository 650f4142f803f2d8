//! Session lifecycle state. Pure data: written only by the event loop and
//! the `start` entry point, read by everyone else.

use std::fmt;

/// Lifecycle of one subscription session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No socket yet; safe to start.
    Idle,
    /// Dial in progress.
    Connecting,
    /// Socket open and multiplexing. Carries a free-form session label.
    Active(String),
    /// Socket closed cleanly; safe to start again.
    Closed,
    /// The last socket ended with an error; safe to start again.
    Failed(String),
}

impl SessionState {
    /// True when `start` may open a new socket.
    pub fn may_start(&self) -> bool {
        matches!(
            self,
            SessionState::Idle | SessionState::Closed | SessionState::Failed(_)
        )
    }

    /// True when the socket is open and the loop is multiplexing.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active(_))
    }

    /// True while a loop instance is consuming (or about to consume) commands.
    pub(crate) fn accepts_commands(&self) -> bool {
        matches!(self, SessionState::Connecting | SessionState::Active(_))
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "IDLE"),
            SessionState::Connecting => write!(f, "CONNECTING"),
            SessionState::Active(meta) => write!(f, "RUNNING - {}", meta),
            SessionState::Closed => write!(f, "CLOSED"),
            SessionState::Failed(reason) => write!(f, "ERROR - {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_states_are_stable_and_distinct() {
        let states = [
            SessionState::Idle,
            SessionState::Connecting,
            SessionState::Active("2 channel(s)".to_string()),
            SessionState::Closed,
            SessionState::Failed("boom".to_string()),
        ];
        let rendered: Vec<String> = states.iter().map(|s| s.to_string()).collect();
        assert_eq!(rendered[0], "IDLE");
        assert_eq!(rendered[1], "CONNECTING");
        assert_eq!(rendered[2], "RUNNING - 2 channel(s)");
        assert_eq!(rendered[3], "CLOSED");
        assert_eq!(rendered[4], "ERROR - boom");
        for (i, a) in rendered.iter().enumerate() {
            for b in rendered.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn may_start_only_from_terminal_states() {
        assert!(SessionState::Idle.may_start());
        assert!(SessionState::Closed.may_start());
        assert!(SessionState::Failed("x".to_string()).may_start());
        assert!(!SessionState::Connecting.may_start());
        assert!(!SessionState::Active("m".to_string()).may_start());
    }

    #[test]
    fn only_a_live_session_accepts_commands() {
        assert!(SessionState::Connecting.accepts_commands());
        assert!(SessionState::Active("m".to_string()).accepts_commands());
        assert!(!SessionState::Idle.accepts_commands());
        assert!(!SessionState::Closed.accepts_commands());
        assert!(!SessionState::Failed("x".to_string()).accepts_commands());
    }
}
