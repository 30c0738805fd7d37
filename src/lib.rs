//! uiverify - scripted UI verification for the scheduling admin app
//!
//! Drives a real browser through agent-browser, runs fixed scenarios against
//! a running instance and reports a per-step verdict with screenshot evidence.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **Browser**: Selectors, the page driver trait and the agent-browser engine
//! - **Scenario**: Steps, selector contracts, fixtures, the runner and reports
//! - **Scenarios**: The built-in verification scenarios
//! - **CLI**: Command implementations and report rendering
//!
//! # Usage
//!
//! ```rust,no_run
//! use uiverify::browser::AgentBrowser;
//! use uiverify::scenario::{Fixtures, RunSettings, ScenarioRunner};
//! use uiverify::scenarios::ScenarioKind;
//! use uiverify::Config;
//!
//! #[tokio::main]
//! async fn main() -> uiverify::Result<()> {
//!     let config = Config::load();
//!     let scenario = ScenarioKind::GlobalSettings.build(&config, &Fixtures::unique())?;
//!
//!     let browser = AgentBrowser::from_config(&config.browser);
//!     let mut runner = ScenarioRunner::new(browser, RunSettings::from_config(&config));
//!     let report = runner.run(&scenario).await;
//!     println!("{}: {}", report.scenario, report.verdict);
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod cli;
pub mod core;
pub mod logging;
pub mod scenario;
pub mod scenarios;

// Re-export commonly used items
pub use core::{Config, Result, VerifyError};
