//! Command handlers for CLI subcommands.

use std::path::Path;

use atelier_guards::{
    check_commission_create, check_delete, check_focus, check_status_change,
    check_workplan_advance, CommissionCreateContext, DeleteContext, FocusContext, GuardResult,
    StatusChangeContext, WorkplanAdvanceContext,
};
use atelier_models::{
    Commission, CommissionId, CommissionStatus, Workbench, Workplan, WorkplanId, WorkplanStatus,
    Workshop, WorkshopId,
};
use atelier_persistence::{CommissionStore, WorkshopStore};
use atelier_reconcile::{
    lower, reconcile_materialize, reconcile_open, Executor, Gatherer, OpKind, ReconcileError,
    WorkshopPlan,
};
use atelier_tmux::TmuxDriver;
use atelier_workspace::{bench_path, GitCli};
use tracing::info;

use crate::cli::{
    BenchCommands, Commands, CommissionCommands, OutputFormat, WorkplanCommands, WorkshopCommands,
};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Execute a CLI command.
pub fn execute(command: Commands, state_dir: &Path, benches_root: &Path) -> Result<()> {
    let shops = WorkshopStore::new(state_dir);
    let commissions = CommissionStore::new(state_dir);

    match command {
        Commands::Plan { workshop } => cmd_plan(&shops, benches_root, &workshop),
        Commands::Apply {
            workshop,
            best_effort,
        } => cmd_apply(&shops, benches_root, &workshop, best_effort),
        Commands::Open { workshop } => cmd_open(&shops, benches_root, &workshop),
        Commands::Workshop(cmd) => match cmd {
            WorkshopCommands::New { name } => cmd_workshop_new(&shops, &name),
            WorkshopCommands::List { format } => cmd_workshop_list(&shops, format),
        },
        Commands::Bench(cmd) => match cmd {
            BenchCommands::Add {
                workshop,
                name,
                branch,
                role,
                repo,
            } => cmd_bench_add(&shops, benches_root, &workshop, &name, &branch, role, repo),
        },
        Commands::Commission(cmd) => match cmd {
            CommissionCommands::New {
                workshop,
                title,
                acting_as,
            } => cmd_commission_new(&shops, &commissions, &workshop, &title, acting_as),
            CommissionCommands::List { workshop } => {
                cmd_commission_list(&shops, &commissions, workshop.as_deref())
            }
            CommissionCommands::Pin { id } => cmd_commission_pin(&commissions, &id, true),
            CommissionCommands::Unpin { id } => cmd_commission_pin(&commissions, &id, false),
            CommissionCommands::Focus {
                id,
                workshop,
                bench,
            } => cmd_commission_focus(&shops, &commissions, &id, &workshop, &bench),
            CommissionCommands::Release { workshop, bench } => {
                cmd_commission_release(&shops, &workshop, &bench)
            }
            CommissionCommands::Complete { id } => cmd_commission_complete(&commissions, &id),
            CommissionCommands::Delete { id, force } => {
                cmd_commission_delete(&commissions, &id, force)
            }
        },
        Commands::Workplan(cmd) => match cmd {
            WorkplanCommands::Add {
                commission,
                summary,
            } => cmd_workplan_add(&commissions, &commission, &summary),
            WorkplanCommands::Advance {
                commission,
                workplan,
            } => cmd_workplan_advance(&commissions, &commission, &workplan),
        },
    }
}

/// Turns a guard verdict into a denial error. Every mutating handler runs
/// its guard through this before touching state.
fn ensure(verdict: GuardResult) -> Result<()> {
    if verdict.allowed {
        Ok(())
    } else {
        Err(ReconcileError::GuardDenied(verdict.reason).into())
    }
}

/// Looks a workshop up by name first, then by ID. Not-found propagates as
/// the typed persistence error, never as "create it".
fn resolve_workshop(store: &WorkshopStore, key: &str) -> Result<Workshop> {
    match store.load_by_name(key) {
        Ok(shop) => Ok(shop),
        Err(e) if e.is_not_found() => match WorkshopId::parse(key) {
            Ok(id) => Ok(store.load(&id)?),
            Err(_) => Err(e.into()),
        },
        Err(e) => Err(e.into()),
    }
}

/// Like [`resolve_workshop`], but maps not-found to `None` for guards that
/// take existence as an input.
fn resolve_workshop_opt(store: &WorkshopStore, key: &str) -> Result<Option<Workshop>> {
    match store.load_by_name(key) {
        Ok(shop) => Ok(Some(shop)),
        Err(e) if e.is_not_found() => match WorkshopId::parse(key) {
            Err(_) => Ok(None),
            Ok(id) => match store.load(&id) {
                Ok(shop) => Ok(Some(shop)),
                Err(e) if e.is_not_found() => Ok(None),
                Err(e) => Err(e.into()),
            },
        },
        Err(e) => Err(e.into()),
    }
}

fn cmd_plan(shops: &WorkshopStore, benches_root: &Path, workshop: &str) -> Result<()> {
    let shop = resolve_workshop(shops, workshop)?;
    let driver = TmuxDriver::new()?;

    let state = Gatherer::new(&driver, benches_root).gather(&shop);
    let plan = reconcile_open(&shop, &state);

    println!("Plan for workshop '{}' ({})", shop.name, shop.id);
    println!();
    print_plan(&plan);
    Ok(())
}

fn cmd_apply(
    shops: &WorkshopStore,
    benches_root: &Path,
    workshop: &str,
    best_effort: bool,
) -> Result<()> {
    let shop = resolve_workshop(shops, workshop)?;
    let driver = TmuxDriver::new()?;
    let git = GitCli::new()?;

    let state = Gatherer::new(&driver, benches_root).gather(&shop);
    let plan = reconcile_materialize(&shop, &state);

    if plan.nothing_to_do {
        println!("Nothing to do: workshop '{}' is already materialized.", shop.name);
        return Ok(());
    }

    info!(workshop_id = %shop.id, best_effort, "applying workshop infrastructure");

    let lowered = lower(&plan, &shop);
    let executor = Executor::new(&driver, &git, shops);

    if best_effort {
        let report = executor.execute_batch(&lowered.batches);
        println!(
            "Applied {} bench(es), {} failed.",
            report.done,
            report.errors.len()
        );
        for err in &report.errors {
            eprintln!("  {}: {}", err.label, err.error);
        }
        print_attention(&plan);
        if !report.is_success() {
            return Err(format!("{} bench(es) failed to apply", report.errors.len()).into());
        }
    } else {
        executor.execute(&lowered.flatten())?;
        println!(
            "Applied: {} created, {} moved, {} repaired.",
            plan.count(OpKind::Create),
            plan.count(OpKind::Move),
            plan.count(OpKind::Update),
        );
        print_attention(&plan);
    }

    Ok(())
}

fn cmd_open(shops: &WorkshopStore, benches_root: &Path, workshop: &str) -> Result<()> {
    let shop = resolve_workshop(shops, workshop)?;
    let driver = TmuxDriver::new()?;
    let git = GitCli::new()?;

    let state = Gatherer::new(&driver, benches_root).gather(&shop);
    let plan = reconcile_open(&shop, &state);

    if plan.nothing_to_do {
        println!("Nothing to do: workshop '{}' is already open.", shop.name);
        return Ok(());
    }

    info!(workshop_id = %shop.id, "opening workshop");

    let lowered = lower(&plan, &shop);
    Executor::new(&driver, &git, shops).execute(&lowered.flatten())?;

    let session = plan
        .session
        .as_ref()
        .map(|s| s.name.clone())
        .unwrap_or_else(|| shop.session_name());
    println!(
        "Opened session '{}': {} window(s) created, {} already present.",
        session,
        plan.windows.iter().filter(|w| w.op == OpKind::Create).count(),
        plan.windows.iter().filter(|w| w.op == OpKind::Exists).count(),
    );
    print_attention(&plan);

    Ok(())
}

/// Prints a plan in three sections: will create, already satisfied, needs
/// manual attention.
fn print_plan(plan: &WorkshopPlan) {
    let mut create = Vec::new();
    let mut satisfied = Vec::new();

    if let Some(session) = &plan.session {
        match session.op {
            OpKind::Create => create.push(format!("session {}", session.name)),
            _ => satisfied.push(format!("session {}", session.name)),
        }
    }
    for bench in &plan.benches {
        let line = format!("bench {} at {}", bench.name, bench.path.display());
        match bench.op {
            OpKind::Create => create.push(line),
            OpKind::Move => create.push(format!(
                "bench {} moved to {} (from {})",
                bench.name,
                bench.path.display(),
                bench
                    .from
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            )),
            OpKind::Exists | OpKind::Update => satisfied.push(line),
            _ => {}
        }
    }
    for window in &plan.windows {
        match window.op {
            OpKind::Create => create.push(format!("window {}", window.window)),
            OpKind::Exists => satisfied.push(format!("window {}", window.window)),
            _ => {}
        }
    }

    if plan.nothing_to_do {
        println!("Nothing to do.");
        return;
    }

    if !create.is_empty() {
        println!("Will create:");
        for line in &create {
            println!("  {}", line);
        }
    }
    if !satisfied.is_empty() {
        println!("Already satisfied:");
        for line in &satisfied {
            println!("  {}", line);
        }
    }
    print_attention(plan);

    println!();
    println!(
        "{} to create, {} satisfied, {} need attention",
        create.len(),
        satisfied.len(),
        plan.needs_attention()
    );
}

/// Prints the "needs manual attention" section: missing benches, orphaned
/// records, and deviating windows.
fn print_attention(plan: &WorkshopPlan) {
    let missing: Vec<_> = plan
        .benches
        .iter()
        .filter(|b| b.op == OpKind::Missing)
        .collect();
    let deviating: Vec<_> = plan
        .windows
        .iter()
        .filter(|w| w.op == OpKind::Update)
        .collect();

    if missing.is_empty() && deviating.is_empty() && plan.orphans.is_empty() {
        return;
    }

    println!("Needs manual attention:");
    for bench in missing {
        println!(
            "  bench {} has no directory at {}; run 'atelier apply' to materialize it",
            bench.name,
            bench.path.display()
        );
    }
    for orphan in &plan.orphans {
        println!(
            "  bench {} was materialized at {} but nothing is on disk",
            orphan.name,
            orphan.recorded_path.display()
        );
    }
    for window in deviating {
        println!(
            "  window {} deviates: {}",
            window.window,
            window.deviation.as_deref().unwrap_or("unknown deviation")
        );
    }
}

fn cmd_workshop_new(shops: &WorkshopStore, name: &str) -> Result<()> {
    match shops.load_by_name(name) {
        Ok(existing) => {
            return Err(format!("workshop '{}' already exists ({})", name, existing.id).into())
        }
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e.into()),
    }

    let shop = Workshop::new(name);
    shops.save(&shop)?;

    info!(workshop_id = %shop.id, name = %shop.name, "created workshop");
    println!("Created workshop '{}' ({})", shop.name, shop.id);
    Ok(())
}

fn cmd_workshop_list(shops: &WorkshopStore, format: OutputFormat) -> Result<()> {
    let workshops = shops.list()?;

    match format {
        OutputFormat::Table => {
            if workshops.is_empty() {
                println!("No workshops found.");
                return Ok(());
            }
            println!("{:<30}  {:<20}  {:<10}  BENCHES", "ID", "NAME", "STATUS");
            println!("{}", "-".repeat(72));
            for shop in &workshops {
                println!(
                    "{:<30}  {:<20}  {:<10}  {}",
                    shop.id,
                    truncate(&shop.name, 20),
                    format!("{:?}", shop.status),
                    shop.benches.len()
                );
            }
            println!("\n{} workshop(s)", workshops.len());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&workshops)?);
        }
        OutputFormat::Brief => {
            for shop in &workshops {
                println!("{}\t{}", shop.id, shop.name);
            }
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_bench_add(
    shops: &WorkshopStore,
    benches_root: &Path,
    workshop: &str,
    name: &str,
    branch: &str,
    role: crate::cli::RoleArg,
    repo: Option<std::path::PathBuf>,
) -> Result<()> {
    let mut shop = resolve_workshop(shops, workshop)?;

    if shop.benches.iter().any(|b| b.name == name) {
        return Err(format!("bench '{}' already exists in workshop '{}'", name, shop.name).into());
    }

    let mut bench = Workbench::new(shop.id.clone(), name, branch).with_role(role.into());
    if let Some(repo) = repo {
        bench = bench.with_source_repo(repo);
    }
    let bench_id = bench.id.clone();
    shop.add_bench(bench);
    shops.save(&shop)?;

    info!(workshop_id = %shop.id, bench_id = %bench_id, "added workbench");
    println!("Added bench '{}' ({})", name, bench_id);
    println!(
        "  Will materialize at: {}",
        bench_path(benches_root, &shop.name, name).display()
    );
    println!("  Run 'atelier apply {}' to materialize it.", shop.name);
    Ok(())
}

fn cmd_commission_new(
    shops: &WorkshopStore,
    commissions: &CommissionStore,
    workshop: &str,
    title: &str,
    acting_as: crate::cli::RoleArg,
) -> Result<()> {
    let shop = resolve_workshop_opt(shops, workshop)?;

    ensure(check_commission_create(&CommissionCreateContext {
        actor_role: acting_as.into(),
        workshop_exists: shop.is_some(),
    }))?;

    let shop = shop.ok_or("workshop disappeared during commission creation")?;
    let commission = Commission::new(shop.id.clone(), title);
    commissions.save(&commission)?;

    info!(commission_id = %commission.id, workshop_id = %shop.id, "created commission");
    println!("Created commission '{}' ({})", title, commission.id);
    Ok(())
}

fn cmd_commission_list(
    shops: &WorkshopStore,
    commissions: &CommissionStore,
    workshop: Option<&str>,
) -> Result<()> {
    let listed = match workshop {
        Some(key) => {
            let shop = resolve_workshop(shops, key)?;
            commissions.list_for_workshop(&shop.id)?
        }
        None => commissions.list()?,
    };

    if listed.is_empty() {
        println!("No commissions found.");
        return Ok(());
    }

    println!("{:<30}  {:<28}  {:<10}  PLANS", "ID", "TITLE", "STATUS");
    println!("{}", "-".repeat(78));
    for commission in &listed {
        let pin = if commission.pinned { " [pinned]" } else { "" };
        println!(
            "{:<30}  {:<28}  {:<10}  {}{}",
            commission.id,
            truncate(&commission.title, 28),
            format!("{:?}", commission.status),
            commission.workplans.len(),
            pin
        );
    }
    println!("\n{} commission(s)", listed.len());
    Ok(())
}

fn cmd_commission_pin(commissions: &CommissionStore, id: &str, pinned: bool) -> Result<()> {
    let mut commission = commissions.load(&CommissionId::parse(id)?)?;
    commission.pinned = pinned;
    commissions.save(&commission)?;

    let verb = if pinned { "Pinned" } else { "Unpinned" };
    println!("{} commission '{}' ({})", verb, commission.title, commission.id);
    Ok(())
}

fn cmd_commission_focus(
    shops: &WorkshopStore,
    commissions: &CommissionStore,
    id: &str,
    workshop: &str,
    bench_name: &str,
) -> Result<()> {
    let commission = commissions.load(&CommissionId::parse(id)?)?;
    let mut shop = resolve_workshop(shops, workshop)?;

    let bench = shop
        .benches
        .iter()
        .find(|b| b.name == bench_name)
        .ok_or_else(|| format!("bench '{}' not found in workshop '{}'", bench_name, shop.name))?;
    let bench_id = bench.id.clone();
    let actor = bench.actor.clone();

    let current_holders = shop
        .active_benches()
        .filter(|b| b.focus.as_ref() == Some(&commission.id))
        .map(|b| b.actor.clone())
        .collect();

    ensure(check_focus(&FocusContext {
        actor,
        current_holders,
    }))?;

    let bench = shop
        .bench_mut(&bench_id)
        .ok_or("bench disappeared while focusing")?;
    bench.focus = Some(commission.id.clone());
    shops.save(&shop)?;

    info!(commission_id = %commission.id, bench = %bench_name, "focused commission");
    println!(
        "Bench '{}' now holds focus on commission '{}' ({})",
        bench_name, commission.title, commission.id
    );
    Ok(())
}

fn cmd_commission_release(shops: &WorkshopStore, workshop: &str, bench_name: &str) -> Result<()> {
    let mut shop = resolve_workshop(shops, workshop)?;

    let bench = shop
        .benches
        .iter_mut()
        .find(|b| b.name == bench_name)
        .ok_or_else(|| format!("bench '{}' not found in workshop '{}'", bench_name, shop.name))?;

    match bench.focus.take() {
        Some(released) => {
            shops.save(&shop)?;
            println!("Bench '{}' released focus on {}", bench_name, released);
        }
        None => println!("Bench '{}' holds no focus.", bench_name),
    }
    Ok(())
}

fn cmd_commission_complete(commissions: &CommissionStore, id: &str) -> Result<()> {
    let mut commission = commissions.load(&CommissionId::parse(id)?)?;

    ensure(check_status_change(&StatusChangeContext {
        current: commission.status,
        target: CommissionStatus::Complete,
        pinned: commission.pinned,
    }))?;

    commission.close(CommissionStatus::Complete);
    commissions.save(&commission)?;

    info!(commission_id = %commission.id, "completed commission");
    println!("Completed commission '{}' ({})", commission.title, commission.id);
    Ok(())
}

fn cmd_commission_delete(commissions: &CommissionStore, id: &str, force: bool) -> Result<()> {
    let commission = commissions.load(&CommissionId::parse(id)?)?;

    ensure(check_delete(&DeleteContext {
        entity_kind: "commission",
        dependent_count: commission.workplans.len(),
        force,
    }))?;

    commissions.delete(&commission.id)?;

    info!(commission_id = %commission.id, force, "deleted commission");
    println!("Deleted commission '{}' ({})", commission.title, commission.id);
    Ok(())
}

fn cmd_workplan_add(commissions: &CommissionStore, commission: &str, summary: &str) -> Result<()> {
    let mut commission = commissions.load(&CommissionId::parse(commission)?)?;

    let plan = Workplan::new(summary);
    let plan_id = plan.id.clone();
    commission.add_workplan(plan);
    commissions.save(&commission)?;

    println!("Added workplan '{}' ({})", summary, plan_id);
    Ok(())
}

fn cmd_workplan_advance(
    commissions: &CommissionStore,
    commission: &str,
    workplan: &str,
) -> Result<()> {
    let mut commission = commissions.load(&CommissionId::parse(commission)?)?;
    let plan_id = WorkplanId::parse(workplan)?;
    let plan = commission
        .workplan(&plan_id)
        .ok_or_else(|| format!("workplan not found: {}", workplan))?;

    ensure(check_workplan_advance(&WorkplanAdvanceContext {
        current: plan.status,
    }))?;

    let next = match plan.status {
        WorkplanStatus::Draft => WorkplanStatus::PendingReview,
        WorkplanStatus::PendingReview => WorkplanStatus::Approved,
        other => return Err(format!("workplan cannot advance from {:?}", other).into()),
    };

    let plan = commission
        .workplan_mut(&plan_id)
        .ok_or_else(|| format!("workplan not found: {}", workplan))?;
    plan.status = next;
    commissions.save(&commission)?;

    info!(commission_id = %commission.id, workplan_id = %plan_id, ?next, "advanced workplan");
    println!("Advanced workplan {} to {:?}", plan_id, next);
    Ok(())
}

/// Truncates a string to the given length, adding "..." if truncated.
/// Counts chars, not bytes, so multi-byte names never split mid-character.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
