//! Page driver trait for abstracting browser backends
//!
//! The runner only talks to this trait, so the agent-browser CLI can be
//! swapped for another engine or an in-memory fake.

use async_trait::async_trait;
use std::path::Path;

use crate::browser::Selector;
use crate::core::{Capture, ElementState, Result, VerifyError};

/// One browser page driven from a single control task
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Make sure the engine is available and a page can be opened
    async fn launch(&mut self) -> Result<()>;

    /// Load a URL in the page
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Click the first element matching the selector
    async fn click(&self, selector: &Selector) -> Result<()>;

    /// Replace the value of a text input or textarea
    async fn fill(&self, selector: &Selector, value: &str) -> Result<()>;

    /// Evaluate a JavaScript expression in the page; promises are awaited
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// Inspect the elements matching a selector
    async fn query(&self, selector: &Selector) -> Result<ElementState> {
        let value = self.evaluate(&selector.state_js()).await?;
        if value.is_null() {
            return Ok(ElementState::missing());
        }
        serde_json::from_value(value).map_err(|e| {
            VerifyError::browser(format!("Unexpected element state for {}: {}", selector, e))
        })
    }

    /// Write a PNG screenshot to `path`, replacing any existing file
    async fn screenshot(&self, path: &Path, capture: &Capture) -> Result<()>;

    /// Close the page and browser
    async fn close(&self) -> Result<()>;

    /// Get the driver name
    fn name(&self) -> &str;
}
