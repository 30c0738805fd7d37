//! Bulk add: users, then sites, through the shared bulk-add modal

use crate::browser::Selector;
use crate::core::{Capture, Result, WaitState};
use crate::scenario::{bulk_payload, BulkEntry, Fixtures, Scenario, SelectorContract, Step};

use super::{contract_check, loading_wait};

pub const NAME: &str = "bulk-add";

pub fn contract() -> SelectorContract {
    SelectorContract::new(NAME)
        .with("loading", Selector::css("#loading"))
        .with("users_tab", Selector::has_text(".list-group-item", "Users"))
        .with("users_bulk_add", Selector::has_text("#users-section button", "Bulk Add"))
        .with("users_table", Selector::css("#users-table"))
        .with("sites_tab", Selector::has_text(".list-group-item", "Sites & Shifts"))
        .with("sites_bulk_add", Selector::has_text("#sites-section button", "Bulk Add"))
        .with("sites_table", Selector::css("#sites-table"))
        .with("bulk_modal", Selector::css("#bulkAddModal"))
        .with("bulk_input", Selector::css("#bulk-input-text"))
        .with("bulk_process", Selector::has_text("#bulkAddModal button", "Process"))
        .with("bulk_close", Selector::css("#bulkAddModal .btn-close"))
        .with_dynamic("bulk_results_shown", Selector::css("#bulk-results:not(.d-none)"))
}

/// Users entered in the first phase
pub fn user_entries() -> Vec<BulkEntry> {
    vec![
        BulkEntry::new("user_alpha"),
        BulkEntry::with_role("user_beta", "admin"),
        BulkEntry::new("user_gamma"),
    ]
}

/// Sites entered in the second phase
pub fn site_entries() -> Vec<BulkEntry> {
    vec![BulkEntry::new("Site Alpha"), BulkEntry::new("Site Beta")]
}

/// One pass through the modal for one entity kind
struct Phase {
    label: &'static str,
    tab: &'static str,
    open: &'static str,
    table: &'static str,
    entries: Vec<BulkEntry>,
    result_shot: &'static str,
    table_shot: &'static str,
}

fn phase_steps(contract: &SelectorContract, fixtures: &Fixtures, phase: Phase) -> Result<Vec<Step>> {
    let label = phase.label;
    let modal = contract.get("bulk_modal")?;

    Ok(vec![
        Step::click(contract.get(phase.tab)?).named(format!("{}: open tab", label)),
        Step::pause(500).named(format!("{}: tab settle", label)),
        Step::click(contract.get(phase.open)?).named(format!("{}: open bulk add", label)),
        Step::wait(modal, WaitState::Visible).named(format!("{}: modal shown", label)),
        Step::pause(500).named(format!("{}: modal settle", label)),
        Step::fill(
            contract.get("bulk_input")?,
            bulk_payload(fixtures, &phase.entries),
        )
        .named(format!("{}: enter list", label)),
        Step::click(contract.get("bulk_process")?).named(format!("{}: process", label)),
        Step::wait(contract.get("bulk_results_shown")?, WaitState::Visible)
            .named(format!("{}: results shown", label)),
        Step::pause(1000).named(format!("{}: render", label)),
        Step::screenshot(phase.result_shot, Capture::Page { full_page: false })
            .named(format!("{}: result screenshot", label)),
        Step::click(contract.get("bulk_close")?).named(format!("{}: close modal", label)),
        Step::pause(1000).named(format!("{}: fade out", label)),
        Step::screenshot(phase.table_shot, Capture::Element(contract.get(phase.table)?))
            .named(format!("{}: table screenshot", label)),
    ])
}

pub fn build(target: String, contract: SelectorContract, fixtures: &Fixtures) -> Result<Scenario> {
    let users = phase_steps(
        &contract,
        fixtures,
        Phase {
            label: "users",
            tab: "users_tab",
            open: "users_bulk_add",
            table: "users_table",
            entries: user_entries(),
            result_shot: "verification/bulk_users_result.png",
            table_shot: "verification/users_table.png",
        },
    )?;
    let sites = phase_steps(
        &contract,
        fixtures,
        Phase {
            label: "sites",
            tab: "sites_tab",
            open: "sites_bulk_add",
            table: "sites_table",
            entries: site_entries(),
            result_shot: "verification/bulk_sites_result.png",
            table_shot: "verification/sites_table.png",
        },
    )?;

    let loaded = loading_wait(&contract, None)?;
    Ok(Scenario::new(NAME, target.clone(), contract)
        .describe("Bulk-add users and sites and capture the modal results and tables")
        .step(Step::navigate(target))
        .step(loaded)
        .step(contract_check())
        .steps(users)
        .steps(sites))
}
