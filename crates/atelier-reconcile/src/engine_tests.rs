//! End-to-end engine tests: gather, plan, lower, execute, and around again.

use std::fs;

use tempfile::tempdir;

use atelier_models::{Role, Workbench, Workshop};
use atelier_persistence::{read_marker, WorkshopStore};
use atelier_tmux::SessionDriver;
use atelier_workspace::bench_path;

use crate::executor::Executor;
use crate::gather::Gatherer;
use crate::lower::lower;
use crate::plan::{reconcile_materialize, reconcile_open, OpKind};
use crate::testing::{FakeDriver, FakeWorktrees, RecordingSink};

fn seeded_workshop(store: &WorkshopStore) -> Workshop {
    let mut shop = Workshop::new("paint");
    shop.add_bench(
        Workbench::new(shop.id.clone(), "lead", "main").with_role(Role::Orchestrator),
    );
    shop.add_bench(Workbench::new(shop.id.clone(), "alpha", "work/alpha"));
    store.save(&shop).unwrap();
    shop
}

#[test]
fn test_materialize_then_replan_reaches_nothing_to_do() {
    let state_dir = tempdir().unwrap();
    let root = tempdir().unwrap();
    let store = WorkshopStore::new(state_dir.path());
    let driver = FakeDriver::default();
    let worktrees = FakeWorktrees::default();

    let shop = seeded_workshop(&store);

    // First pass: everything is absent, so everything is created.
    let gatherer = Gatherer::new(&driver, root.path());
    let state = gatherer.gather(&shop);
    let plan = reconcile_materialize(&shop, &state);
    assert_eq!(plan.count(OpKind::Create), 2);
    assert!(!plan.nothing_to_do);

    let exec = Executor::new(&driver, &worktrees, &store);
    let report = exec.execute_batch(&lower(&plan, &shop).batches);
    assert!(report.is_success());
    assert_eq!(report.done, 2);

    // Directories and markers now exist.
    let lead_dir = bench_path(root.path(), "paint", "lead");
    assert!(lead_dir.is_dir());
    assert!(read_marker(&lead_dir).unwrap().is_some());

    // Second pass over the persisted record: nothing left to do.
    let shop = store.load(&shop.id).unwrap();
    assert_eq!(
        shop.benches[0].recorded_path,
        Some(lead_dir.clone())
    );
    let state = gatherer.gather(&shop);
    let replan = reconcile_materialize(&shop, &state);
    assert!(replan.nothing_to_do);
    assert!(lower(&replan, &shop).batches.is_empty());
}

#[test]
fn test_open_after_materialize_builds_session_then_settles() {
    let state_dir = tempdir().unwrap();
    let root = tempdir().unwrap();
    let store = WorkshopStore::new(state_dir.path());
    let driver = FakeDriver::default();
    let worktrees = FakeWorktrees::default();

    let shop = seeded_workshop(&store);
    let gatherer = Gatherer::new(&driver, root.path());
    let exec = Executor::new(&driver, &worktrees, &store);

    // Materialize directories first.
    let state = gatherer.gather(&shop);
    let plan = reconcile_materialize(&shop, &state);
    assert!(exec.execute_batch(&lower(&plan, &shop).batches).is_success());

    // Open: creates the session and one window per bench.
    let shop = store.load(&shop.id).unwrap();
    let state = gatherer.gather(&shop);
    let plan = reconcile_open(&shop, &state);
    assert_eq!(plan.session.as_ref().unwrap().op, OpKind::Create);
    assert_eq!(plan.count(OpKind::Create), 3); // session + 2 windows
    exec.execute(&lower(&plan, &shop).flatten()).unwrap();

    assert!(driver.session_exists("atelier-paint"));
    assert_eq!(
        driver.window_names("atelier-paint"),
        vec!["lead".to_string(), "alpha".to_string()]
    );

    // Third pass: the idempotence fast path fires before any effect.
    let shop = store.load(&shop.id).unwrap();
    let state = gatherer.gather(&shop);
    let replan = reconcile_open(&shop, &state);
    assert!(replan.nothing_to_do);
    assert!(lower(&replan, &shop).batches.is_empty());
}

#[test]
fn test_plan_is_stable_without_execute() {
    let root = tempdir().unwrap();
    let driver = FakeDriver::default();

    let mut shop = Workshop::new("paint");
    shop.add_bench(Workbench::new(shop.id.clone(), "alpha", "work/alpha"));

    let gatherer = Gatherer::new(&driver, root.path());
    let state_a = gatherer.gather(&shop);
    let state_b = gatherer.gather(&shop);

    let plan_a = reconcile_open(&shop, &state_a);
    let plan_b = reconcile_open(&shop, &state_b);

    assert_eq!(plan_a.benches.len(), plan_b.benches.len());
    assert_eq!(plan_a.benches[0].op, plan_b.benches[0].op);
    assert_eq!(plan_a.windows[0].op, plan_b.windows[0].op);
    assert_eq!(plan_a.nothing_to_do, plan_b.nothing_to_do);
}

#[test]
fn test_move_scenario_renames_and_persists() {
    let state_dir = tempdir().unwrap();
    let root = tempdir().unwrap();
    let store = WorkshopStore::new(state_dir.path());
    let driver = FakeDriver::default();
    let worktrees = FakeWorktrees::default();

    let mut shop = Workshop::new("ws");
    shop.add_bench(Workbench::new(shop.id.clone(), "g1", "work/g1"));
    let bench_id = shop.benches[0].id.clone();

    // The record points at an old location that still exists; the derived
    // location does not exist yet.
    let old = root.path().join("old-g1");
    fs::create_dir_all(&old).unwrap();
    shop.benches[0].recorded_path = Some(old.clone());
    store.save(&shop).unwrap();

    let gatherer = Gatherer::new(&driver, root.path());
    let state = gatherer.gather(&shop);
    let plan = reconcile_materialize(&shop, &state);

    let action = &plan.benches[0];
    assert_eq!(action.op, OpKind::Move);
    assert!(action.update_recorded_path);

    let exec = Executor::new(&driver, &worktrees, &store);
    exec.execute(&lower(&plan, &shop).flatten()).unwrap();

    let derived = bench_path(root.path(), "ws", "g1");
    assert!(derived.is_dir());
    assert!(!old.exists());

    let loaded = store.load(&shop.id).unwrap();
    assert_eq!(
        loaded.bench(&bench_id).unwrap().recorded_path,
        Some(derived)
    );
}

#[test]
fn test_batch_apply_isolates_single_failure() {
    let root = tempdir().unwrap();
    let driver = FakeDriver::default();
    let worktrees = FakeWorktrees {
        fail: Some("repository unreachable".to_string()),
        ..FakeWorktrees::default()
    };
    let sink = RecordingSink::default();

    let mut shop = Workshop::new("paint");
    shop.add_bench(Workbench::new(shop.id.clone(), "one", "work/one"));
    // Only the middle bench uses a worktree, and worktree adds fail.
    shop.add_bench(
        Workbench::new(shop.id.clone(), "two", "work/two").with_source_repo("/repos/app"),
    );
    shop.add_bench(Workbench::new(shop.id.clone(), "three", "work/three"));

    let gatherer = Gatherer::new(&driver, root.path());
    let state = gatherer.gather(&shop);
    let plan = reconcile_materialize(&shop, &state);

    let exec = Executor::new(&driver, &worktrees, &sink);
    let report = exec.execute_batch(&lower(&plan, &shop).batches);

    assert_eq!(report.done, 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].label, "two");
    assert!(bench_path(root.path(), "paint", "one").is_dir());
    assert!(!bench_path(root.path(), "paint", "two").exists());
    assert!(bench_path(root.path(), "paint", "three").is_dir());
}

#[test]
fn test_session_rename_does_not_break_idempotence() {
    let state_dir = tempdir().unwrap();
    let root = tempdir().unwrap();
    let store = WorkshopStore::new(state_dir.path());
    let worktrees = FakeWorktrees::default();

    let shop = seeded_workshop(&store);

    let mut driver = FakeDriver::default();
    // The session was renamed by hand but still carries the workshop marker.
    driver.add_session("my-custom-name", shop.id.as_str());
    driver.add_window("my-custom-name", "lead", 3, "orc");
    driver.add_window("my-custom-name", "alpha", 3, "imp");

    // Materialize directories so only session state is in question.
    let gatherer = Gatherer::new(&driver, root.path());
    let state = gatherer.gather(&shop);
    let exec = Executor::new(&driver, &worktrees, &store);
    let plan = reconcile_materialize(&shop, &state);
    assert!(exec.execute_batch(&lower(&plan, &shop).batches).is_success());

    let shop = store.load(&shop.id).unwrap();
    let state = gatherer.gather(&shop);
    let plan = reconcile_open(&shop, &state);

    let session = plan.session.as_ref().unwrap();
    assert_eq!(session.op, OpKind::Exists);
    assert_eq!(session.name, "my-custom-name");
    assert!(plan.nothing_to_do);
}

#[test]
fn test_orphan_surfaced_not_recreated() {
    let root = tempdir().unwrap();
    let driver = FakeDriver::default();

    let mut shop = Workshop::new("paint");
    shop.add_bench(Workbench::new(shop.id.clone(), "alpha", "work/alpha"));
    // Previously materialized at the derived path, but the directory is gone.
    shop.benches[0].recorded_path =
        Some(bench_path(root.path(), "paint", "alpha"));

    let gatherer = Gatherer::new(&driver, root.path());
    let state = gatherer.gather(&shop);
    let plan = reconcile_materialize(&shop, &state);

    assert!(plan.benches.is_empty());
    assert_eq!(plan.orphans.len(), 1);

    // Lowering an orphan yields only a warning, no mutation.
    let lowered = lower(&plan, &shop);
    for batch in &lowered.batches {
        for effect in &batch.effects {
            assert!(matches!(effect, crate::effect::Effect::Log { .. }));
        }
    }
    assert_eq!(
        plan.orphans[0].recorded_path,
        bench_path(root.path(), "paint", "alpha")
    );
}
