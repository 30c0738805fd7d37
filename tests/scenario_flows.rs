//! Scenario runs against an in-memory page
//!
//! Tokio time is paused, so pauses and timeouts elapse instantly while their
//! ordering and bounds are still observable.

mod support;

use support::{settings, FakePage};
use uiverify::browser::Selector;
use uiverify::core::{Config, ElementState};
use uiverify::scenario::{Fixtures, ScenarioRunner, StepStatus, Verdict};
use uiverify::scenarios::{export_menu, ScenarioKind, LOADED};

fn build(kind: ScenarioKind) -> uiverify::scenario::Scenario {
    kind.build(&Config::default(), &Fixtures::literal()).unwrap()
}

/// Enter Dashboard button in the row of `site`
fn enter_dashboard(site: &str) -> Selector {
    Selector::has_text("button", "Enter Dashboard")
        .within(Selector::has_text("#sites-table tbody tr", site))
}

fn status_of(report: &uiverify::scenario::ScenarioReport, step: &str) -> StepStatus {
    report
        .step(step)
        .unwrap_or_else(|| panic!("no step named {}", step))
        .status
}

#[tokio::test(start_paused = true)]
async fn test_bulk_add_happy_path() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build(ScenarioKind::BulkAdd);
    let page = FakePage::satisfying(&scenario.contract);
    page.on_click(
        &Selector::has_text("#bulkAddModal button", "Process"),
        &Selector::css("#bulk-results:not(.d-none)"),
        ElementState::visible(),
    );

    let mut runner = ScenarioRunner::new(page.clone(), settings(dir.path()));
    let report = runner.run(&scenario).await;

    assert_eq!(report.verdict, Verdict::Pass, "{:#?}", report.steps);
    assert!(page.closed());

    let fills = page.lock().fills.clone();
    assert_eq!(fills[0].0, "#bulk-input-text");
    assert_eq!(fills[0].1, "user_alpha\nuser_beta|admin\nuser_gamma");
    assert_eq!(fills[1].1, "Site Alpha\nSite Beta");

    for shot in [
        "verification/bulk_users_result.png",
        "verification/users_table.png",
        "verification/bulk_sites_result.png",
        "verification/sites_table.png",
    ] {
        assert!(dir.path().join(shot).exists(), "{} missing", shot);
    }
    assert_eq!(report.artifacts().count(), 4);

    let calls = page.calls();
    assert_eq!(calls.first().map(String::as_str), Some("launch"));
    assert_eq!(calls.last().map(String::as_str), Some("close"));
}

#[tokio::test(start_paused = true)]
async fn test_bulk_results_never_shown_aborts_before_screenshot() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build(ScenarioKind::BulkAdd);
    let page = FakePage::satisfying(&scenario.contract);

    let mut runner = ScenarioRunner::new(page.clone(), settings(dir.path()));
    let report = runner.run(&scenario).await;

    assert_eq!(report.verdict, Verdict::Fail);
    assert_eq!(status_of(&report, "users: results shown"), StepStatus::TimedOut);
    assert_eq!(report.aborted_at.as_deref(), Some("users: results shown"));
    assert_eq!(status_of(&report, "users: result screenshot"), StepStatus::Skipped);
    assert!(!dir.path().join("verification/bulk_users_result.png").exists());
    assert!(page.closed());
}

#[tokio::test(start_paused = true)]
async fn test_export_loading_timeout_captures_and_stops() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("verification.png"), b"old run").unwrap();

    let scenario = build(ScenarioKind::ExportMenu);
    let page = FakePage::satisfying(&scenario.contract);
    page.set(&Selector::css("#loading"), ElementState::visible());

    let mut runner = ScenarioRunner::new(page.clone(), settings(dir.path()));
    let started = tokio::time::Instant::now();
    let report = runner.run(&scenario).await;
    let elapsed = started.elapsed();

    assert_eq!(status_of(&report, LOADED), StepStatus::TimedOut);
    assert_eq!(report.aborted_at.as_deref(), Some(LOADED));
    assert!(report
        .steps
        .iter()
        .skip_while(|s| s.name != LOADED)
        .skip(1)
        .all(|s| s.status == StepStatus::Skipped));

    assert!(dir.path().join("loading_fail.png").exists());
    assert_eq!(report.failure_artifacts, vec![dir.path().join("loading_fail.png")]);
    // stale evidence from an earlier run is gone and nothing replaced it
    assert!(!dir.path().join("verification.png").exists());
    assert!(page.lock().scripts.is_empty(), "seeding must not run");
    assert!(page.closed());

    assert!(elapsed >= std::time::Duration::from_millis(5000));
    assert!(elapsed <= scenario.time_budget(runner.settings()));
}

#[tokio::test(start_paused = true)]
async fn test_export_button_missing_skips_menu_wait() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build(ScenarioKind::ExportMenu);
    let page = FakePage::satisfying(&scenario.contract);
    page.lock().eval_result = serde_json::json!({ "siteId": 7 });

    let mut runner = ScenarioRunner::new(page.clone(), settings(dir.path()));
    let report = runner.run(&scenario).await;

    let seed = report.step("seed fixtures").unwrap();
    assert_eq!(seed.status, StepStatus::Passed);
    assert!(seed.observations.iter().any(|o| o == "site id: 7"));
    assert!(page.lock().scripts[0].contains("\"username\":\"TestUser\""));

    let export = report.step(export_menu::EXPORT_CLICK).unwrap();
    assert_eq!(export.status, StepStatus::AssertionFailed);
    assert!(export.detail.as_deref().unwrap().contains("not found"));

    let menu = report.step("export menu shown").unwrap();
    assert_eq!(menu.status, StepStatus::Skipped);
    assert_eq!(menu.detail.as_deref(), Some("requires 'open export menu'"));

    assert!(dir.path().join("verification.png").exists());
    assert_eq!(report.verdict, Verdict::Fail);
    assert!(report.aborted_at.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_export_menu_opens() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build(ScenarioKind::ExportMenu);
    let page = FakePage::satisfying(&scenario.contract);
    page.lock().eval_result = serde_json::json!({ "siteId": 3 });
    let export = Selector::role_exact("button", "Export");
    page.set(&export, ElementState::visible());
    page.on_click(&export, &Selector::css(".dropdown-menu.show"), ElementState::visible());

    let mut runner = ScenarioRunner::new(page.clone(), settings(dir.path()));
    let report = runner.run(&scenario).await;

    assert_eq!(report.verdict, Verdict::Pass, "{:#?}", report.steps);
    let scripts = page.lock().scripts.clone();
    assert!(scripts
        .iter()
        .any(|s| s == "window.scrollTo(0, document.body.scrollHeight)"));
}

#[tokio::test(start_paused = true)]
async fn test_export_seed_without_site_id_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build(ScenarioKind::ExportMenu);
    let page = FakePage::satisfying(&scenario.contract);

    let mut runner = ScenarioRunner::new(page.clone(), settings(dir.path()));
    let report = runner.run(&scenario).await;

    assert_eq!(status_of(&report, "seed fixtures"), StepStatus::Errored);
    assert_eq!(status_of(&report, "dashboard shown"), StepStatus::Skipped);
    assert!(page.closed());
}

#[tokio::test(start_paused = true)]
async fn test_global_settings_reports_unexpected_default() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build(ScenarioKind::GlobalSettings);
    let page = FakePage::satisfying(&scenario.contract);
    page.set(&Selector::css("#gs-min-rest-hours"), ElementState::with_value("8"));
    page.set(&Selector::css("#rw-min-rest-hours"), ElementState::with_value("1.5"));

    let mut runner = ScenarioRunner::new(page.clone(), settings(dir.path()));
    let report = runner.run(&scenario).await;

    let min_rest = report.step("inspect #gs-min-rest-hours").unwrap();
    assert_eq!(min_rest.status, StepStatus::AssertionFailed);
    assert_eq!(
        min_rest.detail.as_deref(),
        Some("unexpected value '8', expected '10'")
    );
    let weight = report.step("inspect #rw-min-rest-hours").unwrap();
    assert_eq!(weight.status, StepStatus::Passed);
    assert_eq!(weight.observations, vec!["value: 1.5".to_string()]);

    assert!(dir.path().join("verification/ui_check.png").exists());
    assert!(!dir.path().join("verification/error.png").exists());
    assert_eq!(report.verdict, Verdict::Fail);
}

#[tokio::test(start_paused = true)]
async fn test_global_settings_default_verified() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build(ScenarioKind::GlobalSettings);
    let page = FakePage::satisfying(&scenario.contract);
    page.set(&Selector::css("#gs-min-rest-hours"), ElementState::with_value("10"));

    let mut runner = ScenarioRunner::new(page, settings(dir.path()));
    let report = runner.run(&scenario).await;

    assert_eq!(report.verdict, Verdict::Pass, "{:#?}", report.steps);
    assert_eq!(
        report.step("inspect #gs-min-rest-hours").unwrap().detail.as_deref(),
        Some("default value verified")
    );
}

#[tokio::test(start_paused = true)]
async fn test_global_settings_error_capture() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build(ScenarioKind::GlobalSettings);
    let page = FakePage::satisfying(&scenario.contract);
    // attached but never shown
    page.set(
        &Selector::css("#global-settings-section"),
        ElementState {
            count: 1,
            visible: false,
            value: None,
        },
    );

    let mut runner = ScenarioRunner::new(page.clone(), settings(dir.path()));
    let report = runner.run(&scenario).await;

    assert_eq!(
        status_of(&report, "wait #global-settings-section visible"),
        StepStatus::TimedOut
    );
    assert!(dir.path().join("verification/error.png").exists());
    assert!(!dir.path().join("verification/ui_check.png").exists());
    assert!(page.closed());
}

#[tokio::test(start_paused = true)]
async fn test_role_modal_happy_path() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build(ScenarioKind::RoleModal);
    let page = FakePage::satisfying(&scenario.contract);
    page.on_click(
        &Selector::css("#create-site-btn"),
        &Selector::text("Test Site"),
        ElementState::visible(),
    );
    page.set(&enter_dashboard("Test Site"), ElementState::visible());

    let mut runner = ScenarioRunner::new(page.clone(), settings(dir.path()));
    let report = runner.run(&scenario).await;

    assert_eq!(report.verdict, Verdict::Pass, "{:#?}", report.steps);
    assert_eq!(status_of(&report, "fill first checkbox"), StepStatus::Passed);
    assert!(dir.path().join("verify_roles.png").exists());
    assert_eq!(page.lock().fills[0].1, "Test Site");
}

#[tokio::test(start_paused = true)]
async fn test_role_modal_ignores_other_sites_rows() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build(ScenarioKind::RoleModal);
    let page = FakePage::satisfying(&scenario.contract);
    page.on_click(
        &Selector::css("#create-site-btn"),
        &Selector::text("Test Site"),
        ElementState::visible(),
    );
    // only an older site's row offers the button
    page.set(&enter_dashboard("Old Site"), ElementState::visible());
    page.set(
        &Selector::has_text("button", "Enter Dashboard"),
        ElementState::visible(),
    );

    let mut runner = ScenarioRunner::new(page.clone(), settings(dir.path()));
    let report = runner.run(&scenario).await;

    assert_eq!(status_of(&report, "enter site dashboard"), StepStatus::Errored);
    assert_eq!(report.aborted_at.as_deref(), Some("enter site dashboard"));
    assert!(!dir.path().join("verify_roles.png").exists());
}

#[tokio::test(start_paused = true)]
async fn test_role_modal_contract_broken() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build(ScenarioKind::RoleModal);
    let page = FakePage::satisfying(&scenario.contract);
    page.remove(&Selector::css("#categoryModal"));

    let mut runner = ScenarioRunner::new(page.clone(), settings(dir.path()));
    let report = runner.run(&scenario).await;

    let check = report.step("selector contract").unwrap();
    assert_eq!(check.status, StepStatus::ContractBroken);
    assert!(check
        .detail
        .as_deref()
        .unwrap()
        .contains("category_modal (#categoryModal)"));
    assert_eq!(report.aborted_at.as_deref(), Some("selector contract"));
    // no interaction happened after the check
    assert!(!page.calls().iter().any(|c| c.starts_with("click")));
}

#[tokio::test(start_paused = true)]
async fn test_unenforced_contract_only_warns() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build(ScenarioKind::RoleModal);
    let page = FakePage::satisfying(&scenario.contract);
    page.remove(&Selector::text("Fill First / Core Staff"));
    page.on_click(
        &Selector::css("#create-site-btn"),
        &Selector::text("Test Site"),
        ElementState::visible(),
    );
    page.set(&enter_dashboard("Test Site"), ElementState::visible());

    let mut settings = settings(dir.path());
    settings.enforce_contract = false;
    let mut runner = ScenarioRunner::new(page.clone(), settings);
    let report = runner.run(&scenario).await;

    assert_eq!(status_of(&report, "selector contract"), StepStatus::ContractBroken);
    assert!(report.aborted_at.is_none());
    assert_eq!(status_of(&report, "fill first checkbox"), StepStatus::AssertionFailed);
    assert!(dir.path().join("verify_roles.png").exists());
}

#[tokio::test(start_paused = true)]
async fn test_skipped_contract_check() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build(ScenarioKind::GlobalSettings);
    let page = FakePage::satisfying(&scenario.contract);
    page.set(&Selector::css("#gs-min-rest-hours"), ElementState::with_value("10"));
    page.remove(&Selector::css("#rw-min-rest-hours"));

    let mut settings = settings(dir.path());
    settings.check_contract = false;
    let mut runner = ScenarioRunner::new(page, settings);
    let report = runner.run(&scenario).await;

    assert_eq!(status_of(&report, "selector contract"), StepStatus::Skipped);
    assert_eq!(
        status_of(&report, "inspect #rw-min-rest-hours"),
        StepStatus::AssertionFailed
    );
}

#[tokio::test(start_paused = true)]
async fn test_unresponsive_engine_still_terminates() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build(ScenarioKind::RoleModal);
    let page = FakePage::satisfying(&scenario.contract);
    page.lock().hang_queries = true;

    let mut runner = ScenarioRunner::new(page.clone(), settings(dir.path()));
    let started = tokio::time::Instant::now();
    let report = runner.run(&scenario).await;

    assert!(started.elapsed() <= scenario.time_budget(runner.settings()));
    assert_eq!(report.verdict, Verdict::Fail);
    assert!(page.closed());
}

#[tokio::test(start_paused = true)]
async fn test_launch_failure_skips_everything() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build(ScenarioKind::GlobalSettings);
    let page = FakePage::default();
    page.lock().launch_error = true;

    let mut runner = ScenarioRunner::new(page.clone(), settings(dir.path()));
    let report = runner.run(&scenario).await;

    assert_eq!(report.steps[0].name, "launch");
    assert_eq!(report.steps[0].status, StepStatus::Errored);
    assert!(report.steps[1..].iter().all(|s| s.status == StepStatus::Skipped));
    assert_eq!(report.aborted_at.as_deref(), Some("launch"));
    assert!(!page.calls().iter().any(|c| c.starts_with("navigate")));
}

#[tokio::test(start_paused = true)]
async fn test_stuck_launch_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = build(ScenarioKind::RoleModal);
    let page = FakePage::satisfying(&scenario.contract);
    page.lock().hang_launch = true;

    let mut runner = ScenarioRunner::new(page.clone(), settings(dir.path()));
    let command_timeout = runner.settings().command_timeout;
    let started = tokio::time::Instant::now();
    let report = tokio::time::timeout(scenario.time_budget(runner.settings()), runner.run(&scenario))
        .await
        .expect("a launch that never returns must not stall the run");

    assert_eq!(report.steps[0].name, "launch");
    assert_eq!(report.steps[0].status, StepStatus::TimedOut);
    assert!(report.steps[1..].iter().all(|s| s.status == StepStatus::Skipped));
    assert_eq!(report.aborted_at.as_deref(), Some("launch"));
    assert!(started.elapsed() <= command_timeout * 2);
    assert!(page.closed());
    assert!(!page.calls().iter().any(|c| c.starts_with("navigate")));
}

#[tokio::test]
async fn test_unreachable_target_fails_preflight_fast() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    // port 9 (discard) is closed on test machines
    config.set_all_targets("http://127.0.0.1:9/index.html");
    let scenario = ScenarioKind::ExportMenu
        .build(&config, &Fixtures::literal())
        .unwrap();

    let page = FakePage::satisfying(&scenario.contract);
    let mut settings = settings(dir.path());
    settings.preflight = Some(std::time::Duration::from_millis(500));
    let mut runner = ScenarioRunner::new(page.clone(), settings);
    let report = runner.run(&scenario).await;

    assert_eq!(report.steps[0].name, "preflight");
    assert_eq!(report.steps[0].status, StepStatus::Errored);
    assert!(page.calls().is_empty(), "browser must not be touched");
    assert!(!dir.path().join("verification.png").exists());
}
