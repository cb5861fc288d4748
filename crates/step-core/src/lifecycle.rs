//! Initialization guard and lifecycle phases.

use std::sync::atomic::{AtomicBool, Ordering};

/// One-time initialization flag.
///
/// The flag is claimed atomically at the start of setup, so a second caller
/// never observes a half-initialized state as "not yet initialized".
#[derive(Debug, Default)]
pub struct InitGuard {
    claimed: AtomicBool,
}

impl InitGuard {
    /// Create an unclaimed guard.
    pub const fn new() -> Self {
        Self {
            claimed: AtomicBool::new(false),
        }
    }

    /// Claim the guard. Returns `true` only for the first caller.
    pub fn try_claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Whether the guard has been claimed.
    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }
}

/// Phases of the tag expander's initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpanderPhase {
    /// Nothing has run yet.
    Uninitialized,
    /// The style block is in the document head.
    StyleInjected,
    /// Parsing is deferred until the document finishes loading.
    WaitingForDom,
    /// All step tags present at load have been expanded.
    Parsed,
    /// A remote script element was appended.
    RemoteScriptRequested,
    /// The remote script loaded; tags were parsed again.
    RemoteScriptLoaded,
    /// The remote script failed; tags were parsed again locally.
    RemoteScriptFailed,
}

impl ExpanderPhase {
    /// Whether no further transition is expected.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Parsed | Self::RemoteScriptLoaded | Self::RemoteScriptFailed
        )
    }
}

impl std::fmt::Display for ExpanderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::StyleInjected => "style-injected",
            Self::WaitingForDom => "waiting-for-dom",
            Self::Parsed => "parsed",
            Self::RemoteScriptRequested => "remote-script-requested",
            Self::RemoteScriptLoaded => "remote-script-loaded",
            Self::RemoteScriptFailed => "remote-script-failed",
        };
        write!(f, "{}", name)
    }
}

/// Lifecycle state of an asset cache worker instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Populating the cache from the manifest.
    Installing,
    /// Installed and waiting for older instances to release their clients.
    Waiting,
    /// Installed with waiting skipped; activates immediately.
    Skipped,
    /// Removing old cache generations.
    Activating,
    /// Active and controlling clients.
    Activated,
    /// Installation failed; this instance will never activate.
    Redundant,
}

impl WorkerState {
    /// Whether the instance has finished installing successfully.
    pub fn is_installed(&self) -> bool {
        matches!(self, Self::Waiting | Self::Skipped)
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Installing => "installing",
            Self::Waiting => "installed (waiting)",
            Self::Skipped => "installed (skip waiting)",
            Self::Activating => "activating",
            Self::Activated => "activated",
            Self::Redundant => "redundant",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_claims_once() {
        let guard = InitGuard::new();
        assert!(!guard.is_claimed());
        assert!(guard.try_claim());
        assert!(!guard.try_claim());
        assert!(guard.is_claimed());
    }

    #[test]
    fn test_terminal_phases() {
        assert!(ExpanderPhase::Parsed.is_terminal());
        assert!(ExpanderPhase::RemoteScriptFailed.is_terminal());
        assert!(!ExpanderPhase::RemoteScriptRequested.is_terminal());
        assert!(!ExpanderPhase::WaitingForDom.is_terminal());
    }

    #[test]
    fn test_worker_state_installed() {
        assert!(WorkerState::Skipped.is_installed());
        assert!(WorkerState::Waiting.is_installed());
        assert!(!WorkerState::Redundant.is_installed());
        assert_eq!(WorkerState::Activated.to_string(), "activated");
    }
}
