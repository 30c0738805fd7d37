//! Browser executor - wraps agent-browser CLI
//!
//! Every page operation is one agent-browser invocation bounded by the
//! command timeout; the child is killed if the bound elapses.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, trace, warn};

use crate::browser::capture::{crop_png, BoundingBox};
use crate::browser::{PageDriver, Selector};
use crate::core::config::BrowserConfig;
use crate::core::{Capture, Result, VerifyError};

/// Executor for browser automation via agent-browser CLI
pub struct AgentBrowser {
    /// Executable name or path
    binary: String,
    /// Session name for isolation
    session_name: String,
    /// Whether to run in headed mode
    headed: bool,
    /// Bound for a single invocation
    command_timeout: Duration,
}

/// `--json` envelope printed by agent-browser
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

impl AgentBrowser {
    /// Create a new executor for a session
    pub fn new(session_name: impl Into<String>) -> Self {
        Self::from_config(&BrowserConfig {
            session_name: session_name.into(),
            ..BrowserConfig::default()
        })
    }

    /// Create an executor from browser configuration
    pub fn from_config(config: &BrowserConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            session_name: config.session_name.clone(),
            headed: config.headed,
            command_timeout: Duration::from_millis(config.command_timeout_ms),
        }
    }

    /// Set headed mode
    pub fn set_headed(&mut self, headed: bool) {
        self.headed = headed;
    }

    /// Check if agent-browser is installed; an unresponsive binary counts as missing
    pub async fn is_available(&self) -> bool {
        let status = Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();
        match tokio::time::timeout(self.command_timeout, status).await {
            Ok(result) => result.map(|s| s.success()).unwrap_or(false),
            Err(_) => {
                warn!(binary = %self.binary, "agent-browser --version timed out");
                false
            }
        }
    }

    /// Run an agent-browser command
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["--session", &self.session_name]);

        if self.headed {
            cmd.arg("--headed");
        }

        cmd.args(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let verb = args.first().copied().unwrap_or("command");
        trace!(session = %self.session_name, ?args, "agent-browser");

        let output = match tokio::time::timeout(self.command_timeout, cmd.output()).await {
            Ok(result) => result.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    VerifyError::AgentBrowserNotFound
                } else {
                    VerifyError::browser(format!("Failed to run agent-browser: {}", e))
                }
            })?,
            Err(_) => {
                return Err(VerifyError::timeout(
                    format!("agent-browser {}", verb),
                    self.command_timeout.as_millis() as u64,
                ))
            }
        };

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(VerifyError::browser(format!(
                "agent-browser {} failed: {}",
                verb,
                stderr.trim()
            )))
        }
    }
}

impl Default for AgentBrowser {
    fn default() -> Self {
        Self::new("uiverify")
    }
}

/// Interpret `eval --json` output, falling back to raw stdout
pub(crate) fn parse_eval_output(stdout: &str) -> Result<serde_json::Value> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(serde_json::Value::Null);
    }

    let value: serde_json::Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(_) => return Ok(serde_json::Value::String(trimmed.to_string())),
    };

    if value.get("success").is_none() {
        return Ok(value);
    }

    let envelope: Envelope = serde_json::from_value(value)?;
    if !envelope.success {
        return Err(VerifyError::browser(
            envelope
                .error
                .unwrap_or_else(|| "evaluation failed".to_string()),
        ));
    }

    Ok(match envelope.data {
        Some(serde_json::Value::Object(mut map)) if map.contains_key("result") => {
            map.remove("result").unwrap_or(serde_json::Value::Null)
        }
        Some(other) => other,
        None => serde_json::Value::Null,
    })
}

#[async_trait]
impl PageDriver for AgentBrowser {
    async fn launch(&mut self) -> Result<()> {
        if !self.is_available().await {
            return Err(VerifyError::AgentBrowserNotFound);
        }
        debug!(session = %self.session_name, headed = self.headed, "agent-browser available");
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        self.run_command(&["open", url]).await?;
        Ok(())
    }

    async fn click(&self, selector: &Selector) -> Result<()> {
        self.run_command(&["click", &selector.to_string()]).await?;
        Ok(())
    }

    async fn fill(&self, selector: &Selector, value: &str) -> Result<()> {
        self.run_command(&["fill", &selector.to_string(), value])
            .await?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let output = self.run_command(&["eval", script, "--json"]).await?;
        parse_eval_output(&output)
    }

    async fn screenshot(&self, path: &Path, capture: &Capture) -> Result<()> {
        let target = path.to_string_lossy().into_owned();
        match capture {
            Capture::Page { full_page } => {
                let mut args = vec!["screenshot", target.as_str()];
                if *full_page {
                    args.push("--full");
                }
                self.run_command(&args).await?;
            }
            Capture::Element(selector) => {
                let rect = self.evaluate(&selector.bounding_box_js()).await?;
                if rect.is_null() {
                    return Err(VerifyError::browser(format!(
                        "No element matches {} for capture",
                        selector
                    )));
                }
                let rect: BoundingBox = serde_json::from_value(rect)?;

                let full = path.with_extension("full.png");
                let full_str = full.to_string_lossy().into_owned();
                self.run_command(&["screenshot", full_str.as_str(), "--full"])
                    .await?;

                let cropped = crop_png(&full, path, &rect);
                let _ = std::fs::remove_file(&full);
                cropped?;
            }
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.run_command(&["close"]).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "agent-browser"
    }
}
