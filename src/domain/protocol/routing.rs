//! Routing - computed transitions for steps with no static edge.
//!
//! Each modality contributes a pure routing function keyed by step id; the
//! dispatch here is the only place that knows which function belongs to
//! which modality. A routed step the function does not handle is the
//! modality's terminal state.

use crate::domain::protocol::context::SessionContext;
use crate::domain::protocol::modalities;
use crate::domain::protocol::modality::Modality;
use crate::domain::protocol::resolution::ResolutionClassifier;
use crate::domain::protocol::step::Effect;

/// Inputs to a routing decision.
pub struct RouteRequest<'a> {
    /// The routed step's id.
    pub step_id: &'a str,
    /// The validated user input for this turn.
    pub input: &'a str,
    /// The session context as of this turn.
    pub ctx: &'a SessionContext,
    /// The resolution classifier in use.
    pub resolution: &'a ResolutionClassifier,
}

/// The outcome of routing: a target step plus effects to apply on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    /// The step to advance to.
    pub next: &'static str,
    /// Effects applied with the current input before advancing.
    pub effects: Vec<Effect>,
}

impl RouteDecision {
    /// A plain transition with no effects.
    pub fn to(next: &'static str) -> Self {
        Self {
            next,
            effects: Vec::new(),
        }
    }

    /// Attaches an effect to the transition.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Computes the next step for a routed step.
///
/// Returns `None` when the modality is complete (terminal state).
pub fn route(modality: Modality, req: &RouteRequest) -> Option<RouteDecision> {
    match modality {
        Modality::ProblemShifting => modalities::problem_shifting::route(req),
        Modality::RealityShifting => modalities::reality_shifting::route(req),
        Modality::BeliefShifting => modalities::belief_shifting::route(req),
        Modality::IdentityShifting => modalities::identity_shifting::route(req),
        Modality::BlockageShifting => modalities::blockage_shifting::route(req),
        Modality::TraumaShifting => modalities::trauma_shifting::route(req),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{SessionId, UserId};
    use crate::domain::protocol::catalog::{all_catalogs, catalog_for};
    use crate::domain::protocol::step::Transition;

    fn ctx(modality: Modality) -> SessionContext {
        SessionContext::new(
            SessionId::new("routing-test").unwrap(),
            UserId::new("u-1").unwrap(),
            modality,
        )
    }

    #[test]
    fn routed_targets_stay_inside_their_catalog() {
        // Drive every routed step with both polarities of answer and check
        // that whatever the router returns exists in the same catalog.
        let resolution = ResolutionClassifier::default();
        for catalog in all_catalogs() {
            let session = ctx(catalog.modality());
            for step in catalog.iter() {
                if step.transition() != Transition::Undefined {
                    continue;
                }
                for input in ["yes", "no", "it still hurts", "nothing"] {
                    let req = RouteRequest {
                        step_id: step.id(),
                        input,
                        ctx: &session,
                        resolution: &resolution,
                    };
                    if let Some(decision) = route(catalog.modality(), &req) {
                        assert!(
                            catalog.step(decision.next).is_some(),
                            "router sent '{}' to missing step '{}'",
                            step.id(),
                            decision.next
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn terminal_steps_have_no_route() {
        let resolution = ResolutionClassifier::default();
        for m in Modality::all() {
            let catalog = catalog_for(m);
            let session = ctx(m);
            let terminal = format!(
                "{}_session_complete",
                match m {
                    Modality::ProblemShifting => "problem",
                    Modality::RealityShifting => "reality",
                    Modality::BeliefShifting => "belief",
                    Modality::IdentityShifting => "identity",
                    Modality::BlockageShifting => "blockage",
                    Modality::TraumaShifting => "trauma",
                }
            );
            assert!(catalog.step(&terminal).is_some(), "{} missing terminal", m.label());
            let req = RouteRequest {
                step_id: &terminal,
                input: "",
                ctx: &session,
                resolution: &resolution,
            };
            assert!(route(m, &req).is_none());
        }
    }
}
