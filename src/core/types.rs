//! Shared types used across uiverify modules
//!
//! Contains element states, wait targets and capture descriptions.

use serde::{Deserialize, Serialize};

use crate::browser::Selector;

/// Target state for a wait step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    /// At least one matching element is rendered with a non-empty box
    #[default]
    Visible,
    /// No matching element is visible (including none attached)
    Hidden,
    /// At least one matching element exists in the DOM
    Attached,
    /// No matching element exists in the DOM
    Detached,
}

impl WaitState {
    /// Check whether an observed element state satisfies this target
    pub fn is_satisfied_by(&self, state: &ElementState) -> bool {
        match self {
            WaitState::Visible => state.visible,
            WaitState::Hidden => !state.visible,
            WaitState::Attached => state.count > 0,
            WaitState::Detached => state.count == 0,
        }
    }
}

impl std::fmt::Display for WaitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitState::Visible => write!(f, "visible"),
            WaitState::Hidden => write!(f, "hidden"),
            WaitState::Attached => write!(f, "attached"),
            WaitState::Detached => write!(f, "detached"),
        }
    }
}

/// Snapshot of the elements matching one selector on the live page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementState {
    /// Number of matching elements
    #[serde(default)]
    pub count: usize,
    /// Whether any matching element is visible
    #[serde(default)]
    pub visible: bool,
    /// Value of the first matching form control, if it has one
    #[serde(default)]
    pub value: Option<String>,
}

impl ElementState {
    /// State for a selector that matched nothing
    pub fn missing() -> Self {
        Self::default()
    }

    /// State for a single visible element
    pub fn visible() -> Self {
        Self {
            count: 1,
            visible: true,
            value: None,
        }
    }

    /// State for a single visible form control holding `value`
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::visible()
        }
    }
}

/// What a screenshot step captures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// The page, either the viewport or the whole scrollable document
    Page { full_page: bool },
    /// The bounding box of the first element matching a selector
    Element(Selector),
}

impl std::fmt::Display for Capture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capture::Page { full_page: true } => write!(f, "full page"),
            Capture::Page { full_page: false } => write!(f, "viewport"),
            Capture::Element(selector) => write!(f, "element {}", selector),
        }
    }
}

/// What the runner does when a step does not pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnFailure {
    /// Record the failure and carry on with the next step
    Continue,
    /// Record the failure, capture evidence and skip the rest
    #[default]
    Abort,
}
