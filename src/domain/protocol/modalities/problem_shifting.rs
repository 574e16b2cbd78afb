//! Problem Shifting - dissolve a felt problem by cycling through its body
//! sense until it no longer feels like a problem.
//!
//! Graph shape: capture the problem, then repeat the working loop
//! (`body_sensation_check` ... `check_if_still_problem`) until the check
//! comes back "no", then run the integration questions. The final awareness
//! question can branch into a digging-deeper round that records an override
//! problem and re-enters the loop.

use once_cell::sync::Lazy;

use crate::domain::assistance::trigger::{AssistAction, TriggerCondition};
use crate::domain::protocol::catalog::StepCatalog;
use crate::domain::protocol::modality::Modality;
use crate::domain::protocol::phase::Phase;
use crate::domain::protocol::resolution::parse_yes_no;
use crate::domain::protocol::routing::{RouteDecision, RouteRequest};
use crate::domain::protocol::step::{Effect, ExpectedResponse, RenderCtx, Step};

fn begin(rc: &RenderCtx) -> String {
    format!(
        "We'll work on '{}'. Answer from what you feel in your body, not from what you think.",
        rc.ctx.effective_problem()
    )
}

fn body_sensation(rc: &RenderCtx) -> String {
    format!("Feel '{}'... what does it feel like?", rc.ctx.effective_problem())
}

fn what_happens(rc: &RenderCtx) -> String {
    format!(
        "Feel '{}'... what happens in yourself when you feel '{}'?",
        rc.input, rc.input
    )
}

fn what_needs_to_happen(rc: &RenderCtx) -> String {
    format!(
        "Feel '{}'... what needs to happen for this to not be a problem?",
        rc.ctx.effective_problem()
    )
}

fn feel_good(rc: &RenderCtx) -> String {
    format!("Feel '{}'... what does '{}' feel like?", rc.input, rc.input)
}

fn still_problem(rc: &RenderCtx) -> String {
    format!(
        "Feel '{}'... does it still feel like a problem?",
        rc.ctx.effective_problem()
    )
}

pub static CATALOG: Lazy<StepCatalog> = Lazy::new(|| {
    StepCatalog::new(
        Modality::ProblemShifting,
        vec![
            Step::fixed(
                "problem_shifting_intro",
                Phase::Intro,
                ExpectedResponse::Auto,
                "Welcome to Problem Shifting. We will work with a problem by feeling it \
                 rather than thinking about it. I will ask simple questions, some of them \
                 more than once; answer from whatever you notice. Please close your eyes \
                 and keep them closed throughout the process.",
            )
            .to("problem_capture"),
            Step::fixed(
                "problem_capture",
                Phase::Discovery,
                ExpectedResponse::Open,
                "What would you like to work on? State the problem in a few words.",
            )
            .with_min_length(3, "Please tell me a little more. State the problem in a few words.")
            .with_trigger(TriggerCondition::MultipleProblems, AssistAction::Focus)
            .with_trigger(TriggerCondition::TooVerbose, AssistAction::Simplify)
            .with_trigger(TriggerCondition::UserStuck, AssistAction::Clarify)
            .with_effect(Effect::SetProblemStatement)
            .to("problem_shifting_begin"),
            Step::dynamic(
                "problem_shifting_begin",
                Phase::Working,
                ExpectedResponse::Auto,
                begin,
            )
            .to("body_sensation_check"),
            Step::dynamic(
                "body_sensation_check",
                Phase::Working,
                ExpectedResponse::Feeling,
                body_sensation,
            )
            .with_min_length(2, "Take a moment, notice the feeling, and tell me what it feels like.")
            .with_trigger(TriggerCondition::UserStuck, AssistAction::Clarify)
            .with_trigger(TriggerCondition::NeedsClarification, AssistAction::Clarify)
            .to("what_happens_step"),
            Step::dynamic(
                "what_happens_step",
                Phase::Working,
                ExpectedResponse::Experience,
                what_happens,
            )
            .with_min_length(2, "Stay with it a moment longer... what happens in yourself?")
            .with_trigger(TriggerCondition::UserStuck, AssistAction::Clarify)
            .to("what_needs_to_happen_step"),
            Step::dynamic(
                "what_needs_to_happen_step",
                Phase::Working,
                ExpectedResponse::Open,
                what_needs_to_happen,
            )
            .with_min_length(3, "Whatever comes... what needs to happen for this to not be a problem?")
            .with_trigger(TriggerCondition::UserStuck, AssistAction::Clarify)
            .with_trigger(TriggerCondition::TooVerbose, AssistAction::Simplify)
            .to("feel_solution_state"),
            Step::fixed(
                "feel_solution_state",
                Phase::Working,
                ExpectedResponse::Feeling,
                "What would you feel like if that had already happened?",
            )
            .with_min_length(2, "Imagine it has already happened... what would you feel like?")
            .to("feel_good_state"),
            Step::dynamic(
                "feel_good_state",
                Phase::Working,
                ExpectedResponse::Experience,
                feel_good,
            )
            .with_min_length(2, "Let the feeling be there... what does it feel like?")
            .to("check_if_still_problem"),
            Step::dynamic(
                "check_if_still_problem",
                Phase::Working,
                ExpectedResponse::YesNo,
                still_problem,
            )
            .with_yes_no("Please answer yes or no. Does it still feel like a problem?")
            .with_trigger(TriggerCondition::NeedsClarification, AssistAction::Clarify),
            Step::fixed(
                "problem_integration_awareness_1",
                Phase::Integration,
                ExpectedResponse::Open,
                "What are you more aware of now than before we did this process?",
            )
            .with_min_length(2, "Take your time... what are you more aware of now?")
            .with_trigger(TriggerCondition::TooVerbose, AssistAction::Redirect)
            .to("problem_integration_awareness_2"),
            Step::fixed(
                "problem_integration_awareness_2",
                Phase::Integration,
                ExpectedResponse::Open,
                "How has it helped you to do this process?",
            )
            .with_min_length(2, "In your own words... how has it helped you?")
            .to("problem_integration_awareness_3"),
            Step::fixed(
                "problem_integration_awareness_3",
                Phase::Integration,
                ExpectedResponse::YesNo,
                "Is there anything else about this that is still a problem for you?",
            )
            .with_yes_no("Please answer yes or no. Is anything else still a problem?"),
            Step::fixed(
                "digging_deeper_capture",
                Phase::DiggingDeeper,
                ExpectedResponse::Open,
                "In a few words, what is still a problem for you?",
            )
            .with_min_length(3, "Just a few words. What is still a problem for you?")
            .with_trigger(TriggerCondition::MultipleProblems, AssistAction::Focus)
            .with_trigger(TriggerCondition::TooVerbose, AssistAction::Simplify)
            .with_effect(Effect::SetOverrideProblem)
            .to("problem_shifting_begin"),
            Step::fixed(
                "problem_integration_action_1",
                Phase::Integration,
                ExpectedResponse::Open,
                "What needs to happen for you to keep this change?",
            )
            .with_min_length(2, "Whatever comes to mind... what needs to happen to keep this change?")
            .to("problem_integration_action_2"),
            Step::fixed(
                "problem_integration_action_2",
                Phase::Integration,
                ExpectedResponse::Goal,
                "What is one action you can commit to that will help?",
            )
            .with_min_length(3, "Name one concrete action you can commit to.")
            .to("problem_session_complete"),
            Step::fixed(
                "problem_session_complete",
                Phase::Complete,
                ExpectedResponse::Auto,
                "Good. The process is complete. Take a breath, and open your eyes when \
                 you're ready.",
            ),
        ],
    )
});

/// Routing for the two computed edges: the loop check and the
/// digging-deeper branch.
pub fn route(req: &RouteRequest) -> Option<RouteDecision> {
    match req.step_id {
        "check_if_still_problem" => match parse_yes_no(req.input) {
            Some(false) => Some(RouteDecision::to("problem_integration_awareness_1")),
            _ => Some(
                RouteDecision::to("body_sensation_check").with_effect(Effect::IncrementCycle),
            ),
        },
        "problem_integration_awareness_3" => match parse_yes_no(req.input) {
            Some(true) => Some(RouteDecision::to("digging_deeper_capture")),
            _ => Some(RouteDecision::to("problem_integration_action_1")),
        },
        _ => None,
    }
}
