//! Global settings: open the section and check the rest-hour inputs

use crate::browser::Selector;
use crate::core::{Capture, Result, WaitState};
use crate::scenario::{Action, Scenario, SelectorContract, Step};

use super::{contract_check, loading_wait};

pub const NAME: &str = "global-settings";

/// Expected default of the minimum rest hours input
pub const DEFAULT_MIN_REST_HOURS: &str = "10";

pub fn contract() -> SelectorContract {
    SelectorContract::new(NAME)
        .with("loading", Selector::css("#loading"))
        .with("settings_nav", Selector::text("Global Settings"))
        .with("settings_section", Selector::css("#global-settings-section"))
        .with("min_rest", Selector::css("#gs-min-rest-hours"))
        .with("min_rest_weight", Selector::css("#rw-min-rest-hours"))
}

pub fn build(target: String, contract: SelectorContract) -> Result<Scenario> {
    let loaded = loading_wait(&contract, Some(10000))?.or_continue();

    Ok(Scenario::new(NAME, target.clone(), contract.clone())
        .describe("Open Global Settings and verify the minimum rest hour inputs")
        .capture_errors_to("verification/error.png")
        .step(Step::navigate(target))
        .step(loaded)
        .step(contract_check())
        .step(Step::click(contract.get("settings_nav")?))
        .step(Step::wait(contract.get("settings_section")?, WaitState::Visible))
        .step(
            Step::new(Action::InspectInput {
                selector: contract.get("min_rest")?,
                expected: Some(DEFAULT_MIN_REST_HOURS.to_string()),
            })
            .or_continue(),
        )
        .step(
            Step::new(Action::InspectInput {
                selector: contract.get("min_rest_weight")?,
                expected: None,
            })
            .or_continue(),
        )
        .step(Step::screenshot(
            "verification/ui_check.png",
            Capture::Page { full_page: false },
        )))
}
