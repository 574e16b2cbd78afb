//! Belief Shifting - loosen a limiting belief until it no longer feels true.
//!
//! Graph shape: capture the belief as a short sentence, then loop through
//! feeling the belief, noticing what happens, naming the preferred belief
//! and feeling that, until `belief_check` comes back "no".

use once_cell::sync::Lazy;

use crate::domain::assistance::trigger::{AssistAction, TriggerCondition};
use crate::domain::protocol::catalog::StepCatalog;
use crate::domain::protocol::modality::Modality;
use crate::domain::protocol::phase::Phase;
use crate::domain::protocol::resolution::parse_yes_no;
use crate::domain::protocol::routing::{RouteDecision, RouteRequest};
use crate::domain::protocol::step::{Effect, ExpectedResponse, RenderCtx, Step};

fn feel_belief(rc: &RenderCtx) -> String {
    format!("Feel that '{}' is true... what does it feel like?", rc.ctx.belief())
}

fn feel_echo(rc: &RenderCtx) -> String {
    format!(
        "Feel '{}'... what happens in yourself when you feel '{}'?",
        rc.input, rc.input
    )
}

fn feel_new(rc: &RenderCtx) -> String {
    format!(
        "Feel what it would be like if '{}' were true... what does that feel like?",
        rc.input
    )
}

fn belief_check(rc: &RenderCtx) -> String {
    format!("Does '{}' still feel true to you?", rc.ctx.belief())
}

pub static CATALOG: Lazy<StepCatalog> = Lazy::new(|| {
    StepCatalog::new(
        Modality::BeliefShifting,
        vec![
            Step::fixed(
                "belief_shifting_intro",
                Phase::Intro,
                ExpectedResponse::Auto,
                "Welcome to Belief Shifting. We will work with a belief that limits you \
                 and keep feeling it until it no longer feels true. Please close your \
                 eyes and keep them closed throughout the process.",
            )
            .to("belief_capture"),
            Step::fixed(
                "belief_capture",
                Phase::Discovery,
                ExpectedResponse::Open,
                "What belief would you like to work on? Say it as a short sentence, \
                 like 'I am not good enough'.",
            )
            .with_min_length(3, "Say the belief as a short sentence.")
            .with_trigger(TriggerCondition::MultipleProblems, AssistAction::Focus)
            .with_trigger(TriggerCondition::TooVerbose, AssistAction::Simplify)
            .with_effect(Effect::SetBeliefStatement)
            .to("belief_feel_step"),
            Step::dynamic(
                "belief_feel_step",
                Phase::Working,
                ExpectedResponse::Feeling,
                feel_belief,
            )
            .with_min_length(2, "Let it be true for a moment... what does it feel like?")
            .with_trigger(TriggerCondition::UserStuck, AssistAction::Clarify)
            .to("belief_feel_echo"),
            Step::dynamic(
                "belief_feel_echo",
                Phase::Working,
                ExpectedResponse::Experience,
                feel_echo,
            )
            .with_min_length(2, "Stay with it... what happens in yourself?")
            .to("belief_counter_step"),
            Step::fixed(
                "belief_counter_step",
                Phase::Working,
                ExpectedResponse::Open,
                "What would you rather believe instead?",
            )
            .with_min_length(3, "In your own words... what would you rather believe?")
            .with_trigger(TriggerCondition::UserStuck, AssistAction::Clarify)
            .to("belief_feel_new"),
            Step::dynamic(
                "belief_feel_new",
                Phase::Working,
                ExpectedResponse::Feeling,
                feel_new,
            )
            .with_min_length(2, "Try it on... what does that feel like?")
            .to("belief_check"),
            Step::dynamic(
                "belief_check",
                Phase::Working,
                ExpectedResponse::YesNo,
                belief_check,
            )
            .with_yes_no("Please answer yes or no. Does it still feel true?"),
            Step::fixed(
                "belief_integration_awareness_1",
                Phase::Integration,
                ExpectedResponse::Open,
                "What do you notice now when you think back to the old belief?",
            )
            .with_min_length(2, "Take your time... what do you notice now?")
            .to("belief_integration_action_1"),
            Step::fixed(
                "belief_integration_action_1",
                Phase::Integration,
                ExpectedResponse::Goal,
                "What is one thing you will do differently now?",
            )
            .with_min_length(3, "Name one thing you will do differently.")
            .to("belief_session_complete"),
            Step::fixed(
                "belief_session_complete",
                Phase::Complete,
                ExpectedResponse::Auto,
                "Good. The process is complete. Open your eyes when you're ready.",
            ),
        ],
    )
});

/// Routing for the single computed edge: the loop check.
pub fn route(req: &RouteRequest) -> Option<RouteDecision> {
    match req.step_id {
        "belief_check" => match parse_yes_no(req.input) {
            Some(false) => Some(RouteDecision::to("belief_integration_awareness_1")),
            _ => Some(RouteDecision::to("belief_feel_step").with_effect(Effect::IncrementCycle)),
        },
        _ => None,
    }
}
