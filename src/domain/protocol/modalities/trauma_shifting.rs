//! Trauma Shifting - discharge the felt residue of a past event.
//!
//! Graph shape: an explicit readiness check gates the work; declining routes
//! to a terminal redirect instead of the memory. Otherwise capture the event
//! in a few words and loop feel → echo → check until the memory no longer
//! feels disturbing.

use once_cell::sync::Lazy;

use crate::domain::assistance::trigger::{AssistAction, TriggerCondition};
use crate::domain::protocol::catalog::StepCatalog;
use crate::domain::protocol::modality::Modality;
use crate::domain::protocol::phase::Phase;
use crate::domain::protocol::resolution::parse_yes_no;
use crate::domain::protocol::routing::{RouteDecision, RouteRequest};
use crate::domain::protocol::step::{Effect, ExpectedResponse, RenderCtx, Step};

fn feel_event(rc: &RenderCtx) -> String {
    format!(
        "Recall the worst moment of '{}'... what do you feel now as you remember it?",
        rc.ctx.effective_problem()
    )
}

fn echo(rc: &RenderCtx) -> String {
    format!(
        "Feel '{}'... what happens in yourself when you feel '{}'?",
        rc.input, rc.input
    )
}

pub static CATALOG: Lazy<StepCatalog> = Lazy::new(|| {
    StepCatalog::new(
        Modality::TraumaShifting,
        vec![
            Step::fixed(
                "trauma_shifting_intro",
                Phase::Intro,
                ExpectedResponse::Auto,
                "Welcome to Trauma Shifting. We will work with a past event. You will \
                 not need to describe it in detail, but we will briefly revisit the \
                 memory so the feeling can clear.",
            )
            .to("trauma_readiness_check"),
            Step::fixed(
                "trauma_readiness_check",
                Phase::Discovery,
                ExpectedResponse::YesNo,
                "Are you comfortable briefly revisiting the memory now?",
            )
            .with_yes_no("Please answer yes or no. Are you comfortable continuing?"),
            Step::fixed(
                "trauma_redirect",
                Phase::Complete,
                ExpectedResponse::Auto,
                "That's fine, we won't revisit it. Another process can work with how it \
                 feels in the present instead. This session is complete.",
            ),
            Step::fixed(
                "trauma_event_capture",
                Phase::Discovery,
                ExpectedResponse::Open,
                "In a few words, what happened?",
            )
            .with_min_length(3, "A few words are enough. What happened?")
            .with_trigger(TriggerCondition::TooVerbose, AssistAction::Simplify)
            .with_effect(Effect::SetProblemStatement)
            .to("trauma_feel_step"),
            Step::dynamic(
                "trauma_feel_step",
                Phase::Working,
                ExpectedResponse::Feeling,
                feel_event,
            )
            .with_min_length(2, "Whatever is there now... what do you feel?")
            .with_trigger(TriggerCondition::UserStuck, AssistAction::Clarify)
            .to("trauma_echo_step"),
            Step::dynamic(
                "trauma_echo_step",
                Phase::Working,
                ExpectedResponse::Experience,
                echo,
            )
            .with_min_length(2, "Stay with it... what happens in yourself?")
            .to("trauma_check"),
            Step::fixed(
                "trauma_check",
                Phase::Working,
                ExpectedResponse::YesNo,
                "Bring the memory to mind again... does it still feel disturbing?",
            )
            .with_yes_no("Please answer yes or no. Does it still feel disturbing?"),
            Step::fixed(
                "trauma_integration_awareness_1",
                Phase::Integration,
                ExpectedResponse::Open,
                "What do you know now that you didn't know before?",
            )
            .with_min_length(2, "Take your time... what do you know now?")
            .to("trauma_integration_action_1"),
            Step::fixed(
                "trauma_integration_action_1",
                Phase::Integration,
                ExpectedResponse::Goal,
                "What is one thing you can do now that this feels different?",
            )
            .with_min_length(3, "Name one thing you can do now.")
            .to("trauma_session_complete"),
            Step::fixed(
                "trauma_session_complete",
                Phase::Complete,
                ExpectedResponse::Auto,
                "Good. The process is complete. Open your eyes when you're ready.",
            ),
        ],
    )
});

/// Routing for the readiness gate and the loop check.
pub fn route(req: &RouteRequest) -> Option<RouteDecision> {
    match req.step_id {
        "trauma_readiness_check" => match parse_yes_no(req.input) {
            Some(true) => Some(RouteDecision::to("trauma_event_capture")),
            _ => Some(RouteDecision::to("trauma_redirect")),
        },
        "trauma_check" => match parse_yes_no(req.input) {
            Some(false) => Some(RouteDecision::to("trauma_integration_awareness_1")),
            _ => Some(RouteDecision::to("trauma_feel_step").with_effect(Effect::IncrementCycle)),
        },
        _ => None,
    }
}
