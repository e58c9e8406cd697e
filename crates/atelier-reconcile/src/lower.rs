//! Lowering: translate a plan into effect batches.
//!
//! Batches are keyed by entity so batch apply can isolate one bench's
//! failure from the rest. Bench batches come first (directories must exist
//! before windows target them), then a single session batch. Flattening
//! preserves that order for single-shot apply.

use serde_json::to_string_pretty;

use atelier_models::Workshop;
use atelier_persistence::{marker_path, BenchMarker};

use crate::effect::{Effect, FileEffect, GitEffect, LogLevel, PersistEffect, SessionEffect};
use crate::plan::{OpKind, WorkshopPlan};

/// One entity's ordered effects.
#[derive(Debug, Clone)]
pub struct EffectBatch {
    /// Entity label, used in batch error reporting.
    pub label: String,
    /// Effects in execution order.
    pub effects: Vec<Effect>,
}

/// All batches for one plan, in execution order.
#[derive(Debug, Clone)]
pub struct LoweredPlan {
    pub batches: Vec<EffectBatch>,
}

impl LoweredPlan {
    /// Flattens every batch into one ordered effect list.
    pub fn flatten(&self) -> Vec<Effect> {
        self.batches
            .iter()
            .flat_map(|b| b.effects.iter().cloned())
            .collect()
    }
}

/// Lowers a plan to effects. Pure: inspects the plan and the workshop
/// record, produces data.
pub fn lower(plan: &WorkshopPlan, workshop: &Workshop) -> LoweredPlan {
    let mut batches = Vec::new();

    for action in &plan.benches {
        let mut effects = Vec::new();
        let bench = workshop.bench(&action.bench_id);

        match action.op {
            OpKind::Create => {
                match bench.and_then(|b| b.source_repo.clone()) {
                    Some(repo) => effects.push(Effect::Git(GitEffect::WorktreeAdd {
                        repo_path: repo,
                        branch: bench.map(|b| b.branch.clone()).unwrap_or_default(),
                        target_path: action.path.clone(),
                    })),
                    None => effects.push(Effect::File(FileEffect::mkdir(&action.path))),
                }
            }
            OpKind::Move => {
                if let Some(from) = &action.from {
                    effects.push(Effect::File(FileEffect::rename(from, &action.path)));
                }
            }
            OpKind::Missing => {
                effects.push(Effect::warn(format!(
                    "bench '{}' is missing at {}; materialize it with 'atelier apply' or recreate it manually",
                    action.name,
                    action.path.display()
                )));
            }
            OpKind::Exists | OpKind::Update | OpKind::Skip => {}
        }

        if action.needs_marker && action.op != OpKind::Missing {
            let marker = BenchMarker::new(action.bench_id.clone());
            // Serialization of a plain struct cannot fail.
            let content = to_string_pretty(&marker).unwrap_or_default();
            effects.push(Effect::File(FileEffect::write(
                marker_path(&action.path),
                content,
            )));
        }

        if action.update_recorded_path && action.op != OpKind::Missing {
            effects.push(Effect::Persist(PersistEffect::WorkbenchPath {
                workshop_id: plan.workshop_id.clone(),
                workbench_id: action.bench_id.clone(),
                path: action.path.clone(),
            }));
        }

        if !effects.is_empty() {
            batches.push(EffectBatch {
                label: action.name.clone(),
                effects,
            });
        }
    }

    for orphan in &plan.orphans {
        batches.push(EffectBatch {
            label: orphan.name.clone(),
            effects: vec![Effect::warn(format!(
                "bench '{}' has a record but no directory (last seen at {}); recreate it or delete the record",
                orphan.name,
                orphan.recorded_path.display()
            ))],
        });
    }

    if let Some(session) = &plan.session {
        let mut effects = Vec::new();

        if session.op == OpKind::Create {
            effects.push(Effect::Session(SessionEffect::CreateSession {
                name: session.name.clone(),
                workshop_id: plan.workshop_id.clone(),
            }));
        }

        for window in &plan.windows {
            match window.op {
                OpKind::Create => effects.push(Effect::Session(SessionEffect::CreateWindow {
                    session: session.name.clone(),
                    window: window.window.clone(),
                    cwd: window.cwd.clone(),
                    command: window.command.clone(),
                })),
                OpKind::Update => effects.push(Effect::warn(format!(
                    "window '{}' deviates ({}); left untouched",
                    window.window,
                    window.deviation.as_deref().unwrap_or("unknown drift")
                ))),
                OpKind::Skip => effects.push(Effect::Log {
                    level: LogLevel::Debug,
                    message: format!(
                        "window '{}' skipped: target directory does not exist",
                        window.window
                    ),
                }),
                _ => {}
            }
        }

        if !effects.is_empty() {
            batches.push(EffectBatch {
                label: "session".to_string(),
                effects,
            });
        }
    }

    LoweredPlan { batches }
}
