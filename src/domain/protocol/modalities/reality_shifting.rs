//! Reality Shifting - clear the reasons standing between the user and a
//! stated goal.
//!
//! Graph shape: capture the goal (with optional deadline and a certainty
//! reading), then loop on "why don't you have it yet" until no reason
//! remains. A "no reason" answer short-circuits through a bridge step
//! straight into integration.

use once_cell::sync::Lazy;

use crate::domain::assistance::trigger::{AssistAction, TriggerCondition};
use crate::domain::protocol::catalog::StepCatalog;
use crate::domain::protocol::modality::Modality;
use crate::domain::protocol::phase::Phase;
use crate::domain::protocol::resolution::{no_reason_given, parse_yes_no};
use crate::domain::protocol::routing::{RouteDecision, RouteRequest};
use crate::domain::protocol::step::{Effect, ExpectedResponse, RenderCtx, Step};

fn deadline_check(rc: &RenderCtx) -> String {
    format!("Is there a deadline by which you want '{}'?", rc.ctx.goal())
}

fn certainty_check(rc: &RenderCtx) -> String {
    format!(
        "From 0 to 100 percent, how certain are you that you will get '{}'?",
        rc.ctx.goal()
    )
}

fn why_not(rc: &RenderCtx) -> String {
    format!("Why don't you have '{}' yet? What's in the way?", rc.ctx.goal())
}

fn feel_reason(rc: &RenderCtx) -> String {
    format!("Feel '{}'... what does it feel like?", rc.input)
}

fn feel_reason_echo(rc: &RenderCtx) -> String {
    format!(
        "Feel '{}'... what happens in yourself when you feel '{}'?",
        rc.input, rc.input
    )
}

fn cycle_check(rc: &RenderCtx) -> String {
    format!(
        "Think about '{}' again... is there still a reason you can't have it?",
        rc.ctx.goal()
    )
}

fn no_reason_bridge(rc: &RenderCtx) -> String {
    format!(
        "Good. If there is no reason you can't have '{}', then you can have it. \
         Notice how that feels.",
        rc.ctx.goal()
    )
}

fn first_action(rc: &RenderCtx) -> String {
    format!("What is the first action you will take toward '{}'?", rc.ctx.goal())
}

pub static CATALOG: Lazy<StepCatalog> = Lazy::new(|| {
    StepCatalog::new(
        Modality::RealityShifting,
        vec![
            Step::fixed(
                "reality_shifting_intro",
                Phase::Intro,
                ExpectedResponse::Auto,
                "Welcome to Reality Shifting. We will work with a goal: something you \
                 want that you don't yet have. We'll clear whatever seems to be in the \
                 way. Please close your eyes and keep them closed throughout the process.",
            )
            .to("goal_capture"),
            Step::fixed(
                "goal_capture",
                Phase::Discovery,
                ExpectedResponse::Goal,
                "What do you want? State your goal in a few words.",
            )
            .with_min_length(3, "Just a few words. What do you want?")
            .with_trigger(TriggerCondition::MultipleProblems, AssistAction::Focus)
            .with_trigger(TriggerCondition::TooVerbose, AssistAction::Simplify)
            .with_effect(Effect::SetGoalStatement)
            .to("goal_deadline_check"),
            Step::dynamic(
                "goal_deadline_check",
                Phase::Discovery,
                ExpectedResponse::YesNo,
                deadline_check,
            )
            .with_yes_no("Please answer yes or no. Is there a deadline?"),
            Step::fixed(
                "goal_deadline_date",
                Phase::Discovery,
                ExpectedResponse::Open,
                "By when do you want it?",
            )
            .with_min_length(2, "Roughly is fine. By when do you want it?")
            .with_effect(Effect::SetGoalDeadline)
            .to("goal_certainty_check"),
            Step::dynamic(
                "goal_certainty_check",
                Phase::Discovery,
                ExpectedResponse::Open,
                certainty_check,
            )
            .with_min_length(1, "A number or your best guess is fine.")
            .to("reality_why_not"),
            Step::dynamic(
                "reality_why_not",
                Phase::Working,
                ExpectedResponse::Open,
                why_not,
            )
            .with_min_length(2, "Whatever comes to mind... why don't you have it yet?")
            .with_trigger(TriggerCondition::TooVerbose, AssistAction::Simplify),
            Step::dynamic(
                "reality_feel_reason",
                Phase::Working,
                ExpectedResponse::Feeling,
                feel_reason,
            )
            .with_min_length(2, "Let it be there... what does it feel like?")
            .with_trigger(TriggerCondition::UserStuck, AssistAction::Clarify)
            .to("reality_feel_reason_2"),
            Step::dynamic(
                "reality_feel_reason_2",
                Phase::Working,
                ExpectedResponse::Experience,
                feel_reason_echo,
            )
            .with_min_length(2, "Stay with it... what happens in yourself?")
            .to("reality_cycle_check"),
            Step::dynamic(
                "reality_cycle_check",
                Phase::Working,
                ExpectedResponse::YesNo,
                cycle_check,
            )
            .with_yes_no("Please answer yes or no. Is there still a reason you can't have it?"),
            Step::dynamic(
                "reality_no_reason_bridge",
                Phase::Working,
                ExpectedResponse::Auto,
                no_reason_bridge,
            )
            .to("reality_integration_awareness_1"),
            Step::fixed(
                "reality_integration_awareness_1",
                Phase::Integration,
                ExpectedResponse::Open,
                "What are you more aware of now about your goal?",
            )
            .with_min_length(2, "Take your time... what are you more aware of now?")
            .with_trigger(TriggerCondition::TooVerbose, AssistAction::Redirect)
            .to("reality_integration_action_1"),
            Step::dynamic(
                "reality_integration_action_1",
                Phase::Integration,
                ExpectedResponse::Goal,
                first_action,
            )
            .with_min_length(3, "Name one concrete first action.")
            .to("reality_session_complete"),
            Step::fixed(
                "reality_session_complete",
                Phase::Complete,
                ExpectedResponse::Auto,
                "Good. The process is complete. Open your eyes when you're ready.",
            ),
        ],
    )
});

/// Routing for the deadline branch, the why-not classification, and the
/// loop check.
pub fn route(req: &RouteRequest) -> Option<RouteDecision> {
    match req.step_id {
        "goal_deadline_check" => match parse_yes_no(req.input) {
            Some(true) => Some(RouteDecision::to("goal_deadline_date")),
            _ => Some(RouteDecision::to("goal_certainty_check")),
        },
        "reality_why_not" => {
            if no_reason_given(req.input) {
                Some(RouteDecision::to("reality_no_reason_bridge"))
            } else {
                Some(RouteDecision::to("reality_feel_reason"))
            }
        }
        "reality_cycle_check" => match parse_yes_no(req.input) {
            Some(true) => {
                Some(RouteDecision::to("reality_why_not").with_effect(Effect::IncrementCycle))
            }
            _ => Some(RouteDecision::to("reality_integration_awareness_1")),
        },
        _ => None,
    }
}
