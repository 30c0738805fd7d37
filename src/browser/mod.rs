//! Browser automation module
//!
//! Selectors, the page-driver seam and its agent-browser implementation.

mod capture;
mod driver;
mod executor;
mod selector;
mod wait;

pub use capture::{crop_png, BoundingBox};
pub use driver::PageDriver;
pub use executor::AgentBrowser;
pub use selector::{js_string, Selector};
pub use wait::wait_for;
