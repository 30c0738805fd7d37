//! Role modal: create a site, enter its dashboard and open Add Role

use crate::browser::Selector;
use crate::core::{Capture, Result, VerifyError, WaitState};
use crate::scenario::{Action, Fixtures, Scenario, SelectorContract, Step};

use super::{contract_check, loading_wait};

pub const NAME: &str = "role-modal";

pub fn contract() -> SelectorContract {
    SelectorContract::new(NAME)
        .with("loading", Selector::css("#loading"))
        .with("sites_nav", Selector::text("Sites & Shifts"))
        .with("sites_section", Selector::css("#sites-section"))
        .with("new_site_name", Selector::css("#new-site-name"))
        .with("create_site", Selector::css("#create-site-btn"))
        .with_dynamic("site_row", Selector::css("#sites-table tbody tr"))
        .with("site_header", Selector::css("#sd-site-name"))
        .with("roles_tab", Selector::has_text("a.nav-link", "Roles"))
        .with("roles_panel", Selector::css("#sd-categories"))
        .with("add_role", Selector::has_text("button", "Add Role"))
        .with("category_modal", Selector::css("#categoryModal"))
        .with("fill_first", Selector::text("Fill First / Core Staff"))
        .with_dynamic("enter_dashboard", Selector::has_text("button", "Enter Dashboard"))
}

/// The Enter Dashboard button in the row of the site named `site_name`
fn enter_dashboard(contract: &SelectorContract, site_name: &str) -> Result<Selector> {
    let row = match contract.get("site_row")? {
        Selector::Css(css) => Selector::has_text(css, site_name),
        other => {
            return Err(VerifyError::contract(format!(
                "site_row must be a plain CSS selector, got {}",
                other
            )))
        }
    };
    Ok(contract.get("enter_dashboard")?.within(row))
}

pub fn build(target: String, contract: SelectorContract, fixtures: &Fixtures) -> Result<Scenario> {
    let site_name = fixtures.name("Test Site");
    let enter = enter_dashboard(&contract, &site_name)?;
    let loaded = loading_wait(&contract, Some(10000))?.or_continue();

    Ok(Scenario::new(NAME, target.clone(), contract.clone())
        .describe("Create a site, open its Roles tab and check the Add Role modal")
        .step(Step::navigate(target))
        .step(loaded)
        .step(contract_check())
        .step(Step::click(contract.get("sites_nav")?))
        .step(Step::wait(contract.get("sites_section")?, WaitState::Visible))
        .step(Step::fill(contract.get("new_site_name")?, site_name.clone()))
        .step(Step::click(contract.get("create_site")?))
        .step(Step::wait(Selector::text(site_name), WaitState::Visible).named("site listed"))
        .step(Step::click(enter).named("enter site dashboard"))
        .step(Step::wait(contract.get("site_header")?, WaitState::Visible))
        .step(Step::click(contract.get("roles_tab")?))
        .step(Step::wait(contract.get("roles_panel")?, WaitState::Visible))
        .step(Step::click(contract.get("add_role")?))
        .step(Step::wait(contract.get("category_modal")?, WaitState::Visible))
        .step(Step::pause(1000).named("modal fade in"))
        .step(
            Step::new(Action::ExpectVisible {
                selector: contract.get("fill_first")?,
            })
            .named("fill first checkbox")
            .or_continue(),
        )
        .step(Step::screenshot("verify_roles.png", Capture::Page { full_page: false })))
}
