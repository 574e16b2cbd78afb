//! Blockage Shifting - shift whatever problem is there, round by round,
//! until nothing remains.
//!
//! Graph shape: capture the problem, then loop feel → shift → restate. The
//! restatement step records each round's answer as the override problem, so
//! every pass works the freshest statement; the loop exits when the
//! resolution classifier reads the restatement as "nothing left".

use once_cell::sync::Lazy;

use crate::domain::assistance::trigger::{AssistAction, TriggerCondition};
use crate::domain::protocol::catalog::StepCatalog;
use crate::domain::protocol::modality::Modality;
use crate::domain::protocol::phase::Phase;
use crate::domain::protocol::routing::{RouteDecision, RouteRequest};
use crate::domain::protocol::step::{Effect, ExpectedResponse, RenderCtx, Step};

fn feel_problem(rc: &RenderCtx) -> String {
    format!("Feel '{}'... what does it feel like?", rc.ctx.effective_problem())
}

pub static CATALOG: Lazy<StepCatalog> = Lazy::new(|| {
    StepCatalog::new(
        Modality::BlockageShifting,
        vec![
            Step::fixed(
                "blockage_shifting_intro",
                Phase::Intro,
                ExpectedResponse::Auto,
                "Welcome to Blockage Shifting. We will work with whatever problem is \
                 there, round by round, until nothing remains. Please close your eyes \
                 and keep them closed throughout the process.",
            )
            .to("blockage_capture"),
            Step::fixed(
                "blockage_capture",
                Phase::Discovery,
                ExpectedResponse::Open,
                "What's the problem? Say it in a few words.",
            )
            .with_min_length(3, "Just a few words. What's the problem?")
            .with_trigger(TriggerCondition::MultipleProblems, AssistAction::Focus)
            .with_trigger(TriggerCondition::TooVerbose, AssistAction::Simplify)
            .with_effect(Effect::SetProblemStatement)
            .to("blockage_feel_step"),
            Step::dynamic(
                "blockage_feel_step",
                Phase::Working,
                ExpectedResponse::Feeling,
                feel_problem,
            )
            .with_min_length(2, "Take a moment and feel it... what does it feel like?")
            .with_trigger(TriggerCondition::UserStuck, AssistAction::Clarify)
            .to("blockage_shift_step"),
            Step::fixed(
                "blockage_shift_step",
                Phase::Working,
                ExpectedResponse::Auto,
                "Keep feeling it... and notice it is already beginning to change.",
            )
            .to("blockage_restate_step"),
            Step::fixed(
                "blockage_restate_step",
                Phase::Working,
                ExpectedResponse::Open,
                "And what's the problem now?",
            )
            .with_min_length(2, "Whatever is there now... what's the problem now?")
            .with_trigger(TriggerCondition::NeedsClarification, AssistAction::Clarify),
            Step::fixed(
                "blockage_integration_awareness_1",
                Phase::Integration,
                ExpectedResponse::Open,
                "What are you more aware of now than when we started?",
            )
            .with_min_length(2, "Take your time... what are you more aware of now?")
            .to("blockage_integration_action_1"),
            Step::fixed(
                "blockage_integration_action_1",
                Phase::Integration,
                ExpectedResponse::Goal,
                "What is one action you can take from this clearer place?",
            )
            .with_min_length(3, "Name one concrete action.")
            .to("blockage_session_complete"),
            Step::fixed(
                "blockage_session_complete",
                Phase::Complete,
                ExpectedResponse::Auto,
                "Good. The process is complete. Open your eyes when you're ready.",
            ),
        ],
    )
});

/// Routing for the restatement step: exit when the classifier reads the
/// answer as resolved, otherwise record it and go around again.
pub fn route(req: &RouteRequest) -> Option<RouteDecision> {
    match req.step_id {
        "blockage_restate_step" => {
            if req.resolution.is_resolved(req.input) {
                Some(RouteDecision::to("blockage_integration_awareness_1"))
            } else {
                Some(
                    RouteDecision::to("blockage_feel_step")
                        .with_effect(Effect::SetOverrideProblem)
                        .with_effect(Effect::IncrementCycle),
                )
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{SessionId, UserId};
    use crate::domain::protocol::context::SessionContext;
    use crate::domain::protocol::resolution::ResolutionClassifier;

    fn ctx() -> SessionContext {
        let mut ctx = SessionContext::new(
            SessionId::new("blk-test").unwrap(),
            UserId::new("u-1").unwrap(),
            Modality::BlockageShifting,
        );
        ctx.apply_effect(Effect::SetProblemStatement, "I feel trapped");
        ctx
    }

    fn decide(step_id: &str, input: &str, ctx: &SessionContext) -> Option<RouteDecision> {
        let resolution = ResolutionClassifier::default();
        route(&RouteRequest {
            step_id,
            input,
            ctx,
            resolution: &resolution,
        })
    }

    #[test]
    fn restatement_loops_and_records_override() {
        let ctx = ctx();
        let decision = decide("blockage_restate_step", "now it's more like dread", &ctx).unwrap();
        assert_eq!(decision.next, "blockage_feel_step");
        assert_eq!(
            decision.effects,
            vec![Effect::SetOverrideProblem, Effect::IncrementCycle]
        );
    }

    #[test]
    fn resolution_phrases_exit_the_loop() {
        let ctx = ctx();
        for answer in ["nothing", "no problem", "it's gone"] {
            assert_eq!(
                decide("blockage_restate_step", answer, &ctx).unwrap().next,
                "blockage_integration_awareness_1",
                "answer {:?}",
                answer
            );
        }
    }

    #[test]
    fn feel_step_follows_the_freshest_statement() {
        let mut ctx = ctx();
        ctx.apply_effect(Effect::SetOverrideProblem, "more like dread");
        let step = CATALOG.step("blockage_feel_step").unwrap();
        let text = step.render(&RenderCtx { input: "", ctx: &ctx });
        assert_eq!(text, "Feel 'more like dread'... what does it feel like?");
    }

    #[test]
    fn shift_step_is_the_auto_half_of_the_pair() {
        let step = CATALOG.step("blockage_shift_step").unwrap();
        assert!(step.is_auto());
        assert_eq!(
            step.transition(),
            crate::domain::protocol::step::Transition::To("blockage_restate_step")
        );
    }
}
