//! In-memory page used in place of a real browser

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use uiverify::browser::{PageDriver, Selector};
use uiverify::core::{Capture, ElementState, Result, VerifyError};
use uiverify::scenario::{RunSettings, SelectorContract};

#[derive(Default)]
pub struct PageState {
    pub calls: Vec<String>,
    pub elements: HashMap<String, ElementState>,
    /// Clicking the key applies these element states
    pub on_click: HashMap<String, Vec<(String, ElementState)>>,
    pub fills: Vec<(String, String)>,
    pub scripts: Vec<String>,
    pub eval_result: serde_json::Value,
    pub screenshots: Vec<PathBuf>,
    pub hang_queries: bool,
    pub hang_launch: bool,
    pub launch_error: bool,
    pub closed: bool,
}

/// Cloneable handle; tests keep one clone to inspect what the runner did
#[derive(Clone, Default)]
pub struct FakePage {
    pub state: Arc<Mutex<PageState>>,
}

impl FakePage {
    /// Every static selector of `contract` is visible, `#loading` is hidden
    pub fn satisfying(contract: &SelectorContract) -> Self {
        let page = FakePage::default();
        for (_, entry) in contract.static_entries() {
            page.set(&entry.selector, ElementState::visible());
        }
        page.set(
            &Selector::css("#loading"),
            ElementState {
                count: 1,
                visible: false,
                value: None,
            },
        );
        page
    }

    pub fn set(&self, selector: &Selector, state: ElementState) {
        self.lock().elements.insert(selector.to_string(), state);
    }

    pub fn remove(&self, selector: &Selector) {
        self.lock().elements.remove(&selector.to_string());
    }

    pub fn on_click(&self, clicked: &Selector, target: &Selector, state: ElementState) {
        self.lock()
            .on_click
            .entry(clicked.to_string())
            .or_default()
            .push((target.to_string(), state));
    }

    pub fn lock(&self) -> std::sync::MutexGuard<'_, PageState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn closed(&self) -> bool {
        self.lock().closed
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn launch(&mut self) -> Result<()> {
        let (hang, error) = {
            let mut state = self.lock();
            state.calls.push("launch".into());
            (state.hang_launch, state.launch_error)
        };
        if hang {
            std::future::pending::<()>().await;
        }
        if error {
            return Err(VerifyError::AgentBrowserNotFound);
        }
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.lock().calls.push(format!("navigate {}", url));
        Ok(())
    }

    async fn click(&self, selector: &Selector) -> Result<()> {
        let mut state = self.lock();
        let key = selector.to_string();
        state.calls.push(format!("click {}", key));
        let present = state.elements.get(&key).map(|e| e.count > 0).unwrap_or(false);
        if !present {
            return Err(VerifyError::browser(format!("no element matches {}", key)));
        }
        if let Some(effects) = state.on_click.get(&key).cloned() {
            for (target, element) in effects {
                state.elements.insert(target, element);
            }
        }
        Ok(())
    }

    async fn fill(&self, selector: &Selector, value: &str) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(format!("fill {}", selector));
        state.fills.push((selector.to_string(), value.to_string()));
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let mut state = self.lock();
        state.calls.push("evaluate".into());
        state.scripts.push(script.to_string());
        Ok(state.eval_result.clone())
    }

    async fn query(&self, selector: &Selector) -> Result<ElementState> {
        let hang = {
            let state = self.lock();
            state.hang_queries
        };
        if hang {
            std::future::pending::<()>().await;
        }
        let state = self.lock();
        Ok(state
            .elements
            .get(&selector.to_string())
            .cloned()
            .unwrap_or_default())
    }

    async fn screenshot(&self, path: &Path, capture: &Capture) -> Result<()> {
        std::fs::write(path, b"\x89PNG")?;
        let mut state = self.lock();
        state.calls.push(format!("screenshot {} ({})", path.display(), capture));
        state.screenshots.push(path.to_path_buf());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut state = self.lock();
        state.calls.push("close".into());
        state.closed = true;
        Ok(())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Settings for tests: no HTTP probe, artifacts under `dir`
pub fn settings(dir: &Path) -> RunSettings {
    RunSettings {
        output_dir: dir.to_path_buf(),
        preflight: None,
        check_contract: true,
        enforce_contract: true,
        ..RunSettings::default()
    }
}
