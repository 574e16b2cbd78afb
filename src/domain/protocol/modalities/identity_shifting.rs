//! Identity Shifting - dissolve an unwanted self-identity.
//!
//! Graph shape: name the identity, then loop through embodying and feeling
//! it until `identity_check` reports it can no longer be felt.

use once_cell::sync::Lazy;

use crate::domain::assistance::trigger::{AssistAction, TriggerCondition};
use crate::domain::protocol::catalog::StepCatalog;
use crate::domain::protocol::modality::Modality;
use crate::domain::protocol::phase::Phase;
use crate::domain::protocol::resolution::parse_yes_no;
use crate::domain::protocol::routing::{RouteDecision, RouteRequest};
use crate::domain::protocol::step::{Effect, ExpectedResponse, RenderCtx, Step};

fn embody(rc: &RenderCtx) -> String {
    format!(
        "Be '{}'... feel yourself being it. What does it feel like?",
        rc.ctx.identity()
    )
}

fn dissolve(rc: &RenderCtx) -> String {
    format!(
        "Feel yourself being '{}'... what happens as you keep feeling '{}'?",
        rc.input, rc.input
    )
}

fn identity_check(rc: &RenderCtx) -> String {
    format!("Can you still feel yourself being '{}'?", rc.ctx.identity())
}

pub static CATALOG: Lazy<StepCatalog> = Lazy::new(|| {
    StepCatalog::new(
        Modality::IdentityShifting,
        vec![
            Step::fixed(
                "identity_shifting_intro",
                Phase::Intro,
                ExpectedResponse::Auto,
                "Welcome to Identity Shifting. We will work with an identity: a way of \
                 being you would rather be free of. Please close your eyes and keep \
                 them closed throughout the process.",
            )
            .to("identity_capture"),
            Step::fixed(
                "identity_capture",
                Phase::Discovery,
                ExpectedResponse::Open,
                "Think about the issue. What kind of person are you being when it has \
                 you? Describe the identity in a word or two, like 'a failure'.",
            )
            .with_min_length(2, "A word or two is enough. What kind of person are you being?")
            .with_rule(crate::domain::protocol::step::ValidationRule::MaxWords {
                max: 12,
                message: "Keep it to a word or two. What kind of person are you being?",
            })
            .with_trigger(TriggerCondition::TooVerbose, AssistAction::Simplify)
            .with_trigger(TriggerCondition::UserStuck, AssistAction::Clarify)
            .with_effect(Effect::SetIdentityLabel)
            .to("identity_embody_step"),
            Step::dynamic(
                "identity_embody_step",
                Phase::Working,
                ExpectedResponse::Feeling,
                embody,
            )
            .with_min_length(2, "Step into it for a moment... what does it feel like?")
            .with_trigger(TriggerCondition::UserStuck, AssistAction::Clarify)
            .to("identity_dissolve_step"),
            Step::dynamic(
                "identity_dissolve_step",
                Phase::Working,
                ExpectedResponse::Experience,
                dissolve,
            )
            .with_min_length(2, "Keep feeling it... what happens?")
            .to("identity_check"),
            Step::dynamic(
                "identity_check",
                Phase::Working,
                ExpectedResponse::YesNo,
                identity_check,
            )
            .with_yes_no("Please answer yes or no. Can you still feel yourself being it?"),
            Step::fixed(
                "identity_integration_awareness_1",
                Phase::Integration,
                ExpectedResponse::Open,
                "Who are you without that identity?",
            )
            .with_min_length(2, "Take your time... who are you without it?")
            .to("identity_integration_action_1"),
            Step::fixed(
                "identity_integration_action_1",
                Phase::Integration,
                ExpectedResponse::Goal,
                "What will you do differently as that freer self?",
            )
            .with_min_length(3, "Name one thing you will do differently.")
            .to("identity_session_complete"),
            Step::fixed(
                "identity_session_complete",
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
        "identity_check" => match parse_yes_no(req.input) {
            Some(false) => Some(RouteDecision::to("identity_integration_awareness_1")),
            _ => {
                Some(RouteDecision::to("identity_embody_step").with_effect(Effect::IncrementCycle))
            }
        },
        _ => None,
    }
}
