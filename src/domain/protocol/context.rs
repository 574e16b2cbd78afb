//! Session context - the mutable state a guided session accumulates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{SessionId, StepId, Timestamp, UserId};
use crate::domain::protocol::modality::Modality;
use crate::domain::protocol::phase::Phase;
use crate::domain::protocol::step::Effect;

/// Named cross-step values.
///
/// Replaces the free-form metadata map of the original design: every value a
/// step writes for a later step is a named, typed field here, so a value
/// written at any catalog distance stays legible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scratch {
    /// Goal statement captured by Reality Shifting.
    #[serde(default)]
    pub goal_statement: Option<String>,
    /// Optional deadline attached to the goal.
    #[serde(default)]
    pub goal_deadline: Option<String>,
    /// Belief statement captured by Belief Shifting.
    #[serde(default)]
    pub belief_statement: Option<String>,
    /// Identity label captured by Identity Shifting.
    #[serde(default)]
    pub identity_label: Option<String>,
    /// Override problem statement recorded by a digging-deeper loop;
    /// substitutes for the original until cleared.
    #[serde(default)]
    pub override_problem: Option<String>,
    /// Number of completed working-loop cycles.
    #[serde(default)]
    pub cycle_count: u32,
    /// Number of digging-deeper rounds entered.
    #[serde(default)]
    pub digging_rounds: u32,
}

/// The full state of one guided session.
///
/// Created on first interaction for a session id, loaded and migrated on
/// resume, mutated only by the protocol engine, persisted after every
/// mutation, and deleted only on an explicit fresh-session request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    /// The session this context belongs to.
    pub session_id: SessionId,
    /// The user owning the session.
    pub user_id: UserId,
    /// The modality this session runs.
    pub modality: Modality,
    /// Current lifecycle phase.
    pub current_phase: Phase,
    /// Current step id within the modality's catalog.
    pub current_step: StepId,
    /// Last recorded response per step id (keys unique).
    #[serde(default)]
    pub user_responses: BTreeMap<String, String>,
    /// The problem statement captured at discovery, if any.
    #[serde(default)]
    pub problem_statement: Option<String>,
    /// Typed cross-step scratch values.
    #[serde(default)]
    pub scratch: Scratch,
    /// When the session started.
    pub start_time: Timestamp,
    /// Last time the session was touched.
    pub last_activity: Timestamp,
}

impl SessionContext {
    /// Creates a fresh context positioned at the modality's intro step.
    pub fn new(session_id: SessionId, user_id: UserId, modality: Modality) -> Self {
        let now = Timestamp::now();
        Self {
            session_id,
            user_id,
            modality,
            current_phase: Phase::Intro,
            current_step: StepId::new(modality.intro_step()),
            user_responses: BTreeMap::new(),
            problem_statement: None,
            scratch: Scratch::default(),
            start_time: now,
            last_activity: now,
        }
    }

    /// Records the user's response for a step, replacing any earlier one.
    pub fn record_response(&mut self, step: &StepId, response: impl Into<String>) {
        self.user_responses
            .insert(step.as_str().to_string(), response.into());
    }

    /// Returns the recorded response for a step, if any.
    pub fn response_for(&self, step: &str) -> Option<&str> {
        self.user_responses.get(step).map(String::as_str)
    }

    /// The problem currently being worked: the digging-deeper override if one
    /// is recorded, otherwise the original problem statement.
    pub fn effective_problem(&self) -> &str {
        self.scratch
            .override_problem
            .as_deref()
            .or(self.problem_statement.as_deref())
            .unwrap_or("")
    }

    /// The goal statement, if captured.
    pub fn goal(&self) -> &str {
        self.scratch.goal_statement.as_deref().unwrap_or("")
    }

    /// The belief statement, if captured.
    pub fn belief(&self) -> &str {
        self.scratch.belief_statement.as_deref().unwrap_or("")
    }

    /// The identity label, if captured.
    pub fn identity(&self) -> &str {
        self.scratch.identity_label.as_deref().unwrap_or("")
    }

    /// Refreshes the last-activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity = Timestamp::now();
    }

    /// Moves the session to a step and its phase.
    pub fn advance_to(&mut self, step: &str, phase: Phase) {
        self.current_step = StepId::new(step);
        self.current_phase = phase;
    }

    /// Applies a commit effect using the accepted input.
    pub fn apply_effect(&mut self, effect: Effect, input: &str) {
        let text = input.trim().to_string();
        match effect {
            Effect::SetProblemStatement => self.problem_statement = Some(text),
            Effect::SetGoalStatement => self.scratch.goal_statement = Some(text),
            Effect::SetGoalDeadline => self.scratch.goal_deadline = Some(text),
            Effect::SetBeliefStatement => self.scratch.belief_statement = Some(text),
            Effect::SetIdentityLabel => self.scratch.identity_label = Some(text),
            Effect::SetOverrideProblem => {
                self.scratch.override_problem = Some(text);
                self.scratch.digging_rounds += 1;
            }
            Effect::IncrementCycle => self.scratch.cycle_count += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> SessionContext {
        SessionContext::new(
            SessionId::new("s-1").unwrap(),
            UserId::new("u-1").unwrap(),
            Modality::ProblemShifting,
        )
    }

    #[test]
    fn new_context_starts_at_intro() {
        let ctx = ctx();
        assert_eq!(ctx.current_phase, Phase::Intro);
        assert_eq!(ctx.current_step.as_str(), "problem_shifting_intro");
        assert!(ctx.user_responses.is_empty());
        assert!(ctx.problem_statement.is_none());
    }

    #[test]
    fn record_response_replaces_earlier_value() {
        let mut ctx = ctx();
        let step = StepId::new("problem_capture");
        ctx.record_response(&step, "first");
        ctx.record_response(&step, "second");
        assert_eq!(ctx.response_for("problem_capture"), Some("second"));
        assert_eq!(ctx.user_responses.len(), 1);
    }

    #[test]
    fn effective_problem_prefers_override() {
        let mut ctx = ctx();
        assert_eq!(ctx.effective_problem(), "");

        ctx.apply_effect(Effect::SetProblemStatement, "my boss ignores me");
        assert_eq!(ctx.effective_problem(), "my boss ignores me");

        ctx.apply_effect(Effect::SetOverrideProblem, "I dread meetings");
        assert_eq!(ctx.effective_problem(), "I dread meetings");
        assert_eq!(ctx.scratch.digging_rounds, 1);
    }

    #[test]
    fn effects_write_named_fields() {
        let mut ctx = ctx();
        ctx.apply_effect(Effect::SetGoalStatement, "run a marathon");
        ctx.apply_effect(Effect::SetGoalDeadline, "next spring");
        ctx.apply_effect(Effect::SetBeliefStatement, "I am not enough");
        ctx.apply_effect(Effect::SetIdentityLabel, "a failure");

        assert_eq!(ctx.goal(), "run a marathon");
        assert_eq!(ctx.scratch.goal_deadline.as_deref(), Some("next spring"));
        assert_eq!(ctx.belief(), "I am not enough");
        assert_eq!(ctx.identity(), "a failure");
    }

    #[test]
    fn effects_trim_input() {
        let mut ctx = ctx();
        ctx.apply_effect(Effect::SetProblemStatement, "  spaces  ");
        assert_eq!(ctx.effective_problem(), "spaces");
    }

    #[test]
    fn increment_cycle_counts_loops() {
        let mut ctx = ctx();
        ctx.apply_effect(Effect::IncrementCycle, "");
        ctx.apply_effect(Effect::IncrementCycle, "");
        assert_eq!(ctx.scratch.cycle_count, 2);
    }

    #[test]
    fn advance_to_updates_step_and_phase() {
        let mut ctx = ctx();
        ctx.advance_to("body_sensation_check", Phase::Working);
        assert_eq!(ctx.current_step.as_str(), "body_sensation_check");
        assert_eq!(ctx.current_phase, Phase::Working);
    }

    #[test]
    fn context_round_trips_through_json() {
        let mut ctx = ctx();
        ctx.apply_effect(Effect::SetProblemStatement, "too much work");
        ctx.record_response(&StepId::new("problem_capture"), "too much work");
        ctx.advance_to("body_sensation_check", Phase::Working);

        let json = serde_json::to_string(&ctx).unwrap();
        let back: SessionContext = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ctx);
    }

    #[test]
    fn legacy_payload_without_scratch_deserializes() {
        // Persisted contexts predating the typed scratch carry no such keys.
        let json = r#"{
            "session_id": "s-legacy",
            "user_id": "u-1",
            "modality": "problem_shifting",
            "current_phase": "working",
            "current_step": "body_sensation_check",
            "start_time": "2024-01-01T00:00:00Z",
            "last_activity": "2024-01-01T00:05:00Z"
        }"#;
        let ctx: SessionContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.scratch, Scratch::default());
        assert!(ctx.user_responses.is_empty());
    }
}
