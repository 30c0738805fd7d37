//! Export menu: seed a site through the page's API client, enter its
//! dashboard and open the Export dropdown.

use crate::browser::Selector;
use crate::core::{Capture, Result, WaitState};
use crate::scenario::{Action, Fixtures, Scenario, SeedPlan, SelectorContract, Step};

use super::{contract_check, loading_wait};

pub const NAME: &str = "export-menu";

/// Name of the step clicking the Export button
pub const EXPORT_CLICK: &str = "open export menu";

pub fn contract() -> SelectorContract {
    SelectorContract::new(NAME)
        .with("loading", Selector::css("#loading"))
        .with("dashboard", Selector::css("#site-dashboard-section"))
        // exact name, so "Export Backup" does not match
        .with_dynamic("export_button", Selector::role_exact("button", "Export"))
        .with_dynamic("export_menu_open", Selector::css(".dropdown-menu.show"))
}

pub fn build(target: String, contract: SelectorContract, fixtures: &Fixtures) -> Result<Scenario> {
    let loaded = loading_wait(&contract, Some(5000))?.capture_on_failure("loading_fail.png");
    let dashboard = Step::wait_within(contract.get("dashboard")?, WaitState::Visible, 5000)
        .named("dashboard shown")
        .capture_on_failure("dashboard_fail.png");
    let export = Step::new(Action::ClickIfPresent {
        selector: contract.get("export_button")?,
    })
    .named(EXPORT_CLICK)
    .or_continue();
    let menu = Step::wait_within(contract.get("export_menu_open")?, WaitState::Visible, 2000)
        .named("export menu shown")
        .or_continue()
        .after(EXPORT_CLICK);

    Ok(Scenario::new(NAME, target.clone(), contract)
        .describe("Seed a user, site and shift, enter the dashboard and open the Export menu")
        .step(Step::navigate(target))
        .step(loaded)
        .step(contract_check())
        .step(Step::new(Action::Seed(SeedPlan::standard(fixtures))).named("seed fixtures"))
        .step(dashboard)
        .step(export)
        .step(menu)
        .step(
            Step::new(Action::Evaluate {
                script: "window.scrollTo(0, document.body.scrollHeight)".to_string(),
            })
            .named("scroll to footer"),
        )
        .step(Step::screenshot("verification.png", Capture::Page { full_page: false })))
}
