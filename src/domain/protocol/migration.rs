//! Migration adapter - normalizes legacy persisted step and phase
//! identifiers to the current catalogs.
//!
//! Runs on every context load, before any processing. Step ids renamed in
//! past catalog revisions are mapped forward, then the (possibly renamed)
//! step id is looked up in the current catalogs and the phase corrected to
//! match. The adapter reports whether it changed anything so the caller can
//! persist the corrected context immediately and migration runs at most
//! once per session. Idempotent on already-current contexts.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::domain::foundation::StepId;
use crate::domain::protocol::catalog::all_catalogs;
use crate::domain::protocol::context::SessionContext;
use crate::domain::protocol::phase::Phase;

/// Legacy step id -> current step id.
///
/// Every id ever shipped keeps an entry here; removing one strands any
/// session still persisted under it.
static STEP_RENAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("problem_intro", "problem_shifting_intro"),
        ("feel_problem", "body_sensation_check"),
        ("check_still_problem", "check_if_still_problem"),
        ("integration_awareness_1", "problem_integration_awareness_1"),
        ("integration_action_1", "problem_integration_action_1"),
        ("goal_description", "goal_capture"),
        ("restate_problem_step", "blockage_restate_step"),
        ("trauma_intro", "trauma_shifting_intro"),
    ])
});

/// Current step id -> owning phase, derived from the live catalogs.
static STEP_PHASES: Lazy<HashMap<&'static str, Phase>> = Lazy::new(|| {
    let mut phases = HashMap::new();
    for catalog in all_catalogs() {
        for step in catalog.iter() {
            phases.insert(step.id(), step.phase());
        }
    }
    phases
});

/// What the adapter did to a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// True if anything was rewritten; the caller must persist immediately.
    pub changed: bool,
}

/// Normalizes loaded contexts to the current catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct MigrationAdapter;

impl MigrationAdapter {
    /// Creates the adapter.
    pub fn new() -> Self {
        Self
    }

    /// Rewrites legacy step ids and the step's phase in place.
    pub fn migrate(&self, ctx: &mut SessionContext) -> MigrationOutcome {
        let mut changed = false;

        if let Some(renamed) = STEP_RENAMES.get(ctx.current_step.as_str()) {
            ctx.current_step = StepId::new(*renamed);
            changed = true;
        }

        if let Some(phase) = STEP_PHASES.get(ctx.current_step.as_str()) {
            if ctx.current_phase != *phase {
                ctx.current_phase = *phase;
                changed = true;
            }
        }

        // Response keys recorded under legacy ids move with the rename so
        // later steps keep seeing them.
        let legacy_keys: Vec<String> = ctx
            .user_responses
            .keys()
            .filter(|k| STEP_RENAMES.contains_key(k.as_str()))
            .cloned()
            .collect();
        for key in legacy_keys {
            if let Some(value) = ctx.user_responses.remove(&key) {
                let renamed = STEP_RENAMES[key.as_str()];
                ctx.user_responses.insert(renamed.to_string(), value);
                changed = true;
            }
        }

        MigrationOutcome { changed }
    }
}
