//! Scenario steps
//!
//! A step is one action against the page plus the policy applied when it
//! does not pass.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::browser::Selector;
use crate::core::{Capture, OnFailure, WaitState};
use crate::scenario::fixtures::SeedPlan;

/// An action against the remote page
#[derive(Debug, Clone)]
pub enum Action {
    /// Load the URL
    Navigate { url: String },
    /// Block until the selector reaches `state`
    WaitFor {
        selector: Selector,
        state: WaitState,
        /// Falls back to the run's default timeout
        timeout_ms: Option<u64>,
    },
    /// Click the first match
    Click { selector: Selector },
    /// Click the first match if there is one; no match is an assertion failure
    ClickIfPresent { selector: Selector },
    /// Replace an input's value
    Fill { selector: Selector, value: String },
    /// Fixed delay for animations
    Pause { ms: u64 },
    /// Run a script in the page
    Evaluate { script: String },
    /// Create fixtures through the page's own API client
    Seed(SeedPlan),
    /// Read a visible input's value, optionally comparing it
    InspectInput {
        selector: Selector,
        expected: Option<String>,
    },
    /// Assert that something is currently visible
    ExpectVisible { selector: Selector },
    /// Check every static selector of the scenario's contract
    VerifyContract,
    /// Write a PNG below the output directory
    Screenshot { path: PathBuf, capture: Capture },
}

impl Action {
    /// Explicit timeout carried by the action, if any
    pub fn timeout(&self, default: Duration) -> Option<Duration> {
        match self {
            Action::WaitFor { timeout_ms, .. } => Some(
                timeout_ms
                    .map(Duration::from_millis)
                    .unwrap_or(default),
            ),
            Action::Pause { ms } => Some(Duration::from_millis(*ms)),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Navigate { url } => write!(f, "navigate {}", url),
            Action::WaitFor {
                selector, state, ..
            } => write!(f, "wait {} {}", selector, state),
            Action::Click { selector } => write!(f, "click {}", selector),
            Action::ClickIfPresent { selector } => write!(f, "click-if-present {}", selector),
            Action::Fill { selector, .. } => write!(f, "fill {}", selector),
            Action::Pause { ms } => write!(f, "pause {}ms", ms),
            Action::Evaluate { .. } => write!(f, "evaluate"),
            Action::Seed(_) => write!(f, "seed fixtures"),
            Action::InspectInput { selector, .. } => write!(f, "inspect {}", selector),
            Action::ExpectVisible { selector } => write!(f, "expect-visible {}", selector),
            Action::VerifyContract => write!(f, "verify selector contract"),
            Action::Screenshot { path, .. } => write!(f, "screenshot {}", path.display()),
        }
    }
}

/// One ordered action plus its failure policy
#[derive(Debug, Clone)]
pub struct Step {
    /// Name used in reports and by `after` gates
    pub name: String,
    pub action: Action,
    pub on_failure: OnFailure,
    /// Only run when the named earlier step passed
    pub after: Option<String>,
    /// Screenshot taken when this step aborts the scenario
    pub failure_capture: Option<PathBuf>,
}

impl Step {
    /// Create an aborting step named after its action
    pub fn new(action: Action) -> Self {
        Self {
            name: action.to_string(),
            action,
            on_failure: OnFailure::Abort,
            after: None,
            failure_capture: None,
        }
    }

    pub fn navigate(url: impl Into<String>) -> Self {
        Self::new(Action::Navigate { url: url.into() })
    }

    pub fn wait(selector: Selector, state: WaitState) -> Self {
        Self::new(Action::WaitFor {
            selector,
            state,
            timeout_ms: None,
        })
    }

    pub fn wait_within(selector: Selector, state: WaitState, timeout_ms: u64) -> Self {
        Self::new(Action::WaitFor {
            selector,
            state,
            timeout_ms: Some(timeout_ms),
        })
    }

    pub fn click(selector: Selector) -> Self {
        Self::new(Action::Click { selector })
    }

    pub fn fill(selector: Selector, value: impl Into<String>) -> Self {
        Self::new(Action::Fill {
            selector,
            value: value.into(),
        })
    }

    pub fn pause(ms: u64) -> Self {
        Self::new(Action::Pause { ms })
    }

    pub fn screenshot(path: impl Into<PathBuf>, capture: Capture) -> Self {
        Self::new(Action::Screenshot {
            path: path.into(),
            capture,
        })
    }

    /// Override the generated name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Record failures and keep going
    pub fn or_continue(mut self) -> Self {
        self.on_failure = OnFailure::Continue;
        self
    }

    /// Gate on an earlier step having passed
    pub fn after(mut self, step: impl Into<String>) -> Self {
        self.after = Some(step.into());
        self
    }

    /// Capture this screenshot when the step aborts the scenario
    pub fn capture_on_failure(mut self, path: impl Into<PathBuf>) -> Self {
        self.failure_capture = Some(path.into());
        self
    }
}
