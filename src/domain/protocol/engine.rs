//! The protocol engine - resolves the current step, validates input,
//! computes the next step, and renders the next message.
//!
//! The engine is pure over (context, input): it mutates the context it is
//! handed and returns the rendered turn, but performs no I/O. Loading,
//! migration, persistence, and AI assistance sit in the application layer.

use crate::domain::foundation::StepId;
use crate::domain::protocol::catalog::{catalog_for, StepCatalog};
use crate::domain::protocol::context::SessionContext;
use crate::domain::protocol::errors::ProtocolError;
use crate::domain::protocol::phase::Phase;
use crate::domain::protocol::resolution::ResolutionClassifier;
use crate::domain::protocol::routing::{route, RouteRequest};
use crate::domain::protocol::step::{RenderCtx, Step, Transition};

/// One rendered message segment; auto-chaining can produce several per turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSegment {
    /// The step that produced this segment.
    pub step_id: StepId,
    /// The rendered message text.
    pub text: String,
}

/// The outcome of one engine turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutput {
    /// Rendered message segments, in delivery order.
    pub segments: Vec<RenderedSegment>,
    /// The step the session now rests on.
    pub next_step: StepId,
    /// The phase the session now rests in.
    pub next_phase: Phase,
    /// True when the modality reached its terminal state this turn.
    pub phase_complete: bool,
    /// The failing validation rule's message; state is unchanged when set.
    pub reprompt: Option<String>,
}

impl TurnOutput {
    /// Joins the segments into the client-facing message.
    pub fn message(&self) -> String {
        if let Some(reprompt) = &self.reprompt {
            return reprompt.clone();
        }
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The segment the session rests on, if any was rendered.
    pub fn resting_segment(&self) -> Option<&RenderedSegment> {
        self.segments.last()
    }

    fn reprompt(ctx: &SessionContext, message: &str) -> Self {
        Self {
            segments: Vec::new(),
            next_step: ctx.current_step.clone(),
            next_phase: ctx.current_phase,
            phase_complete: false,
            reprompt: Some(message.to_string()),
        }
    }
}

/// The deterministic state machine over the step catalogs.
#[derive(Debug, Clone, Default)]
pub struct ProtocolEngine {
    resolution: ResolutionClassifier,
}

impl ProtocolEngine {
    /// Creates an engine with a custom resolution classifier.
    pub fn new(resolution: ResolutionClassifier) -> Self {
        Self { resolution }
    }

    /// The classifier routing functions consult.
    pub fn resolution(&self) -> &ResolutionClassifier {
        &self.resolution
    }

    /// Runs one turn against the context.
    ///
    /// Auto steps are chained through within the call, so the session always
    /// comes to rest on an input-expecting step or the terminal step. On a
    /// validation failure the context is untouched and the failing rule's
    /// message is returned as `reprompt`.
    pub fn advance(
        &self,
        ctx: &mut SessionContext,
        input: &str,
    ) -> Result<TurnOutput, ProtocolError> {
        let catalog = catalog_for(ctx.modality);
        let current = self.resolve(catalog, ctx, ctx.current_step.as_str())?;

        if current.is_auto() {
            // Resting on an instructional step only happens at session start;
            // deliver it and chain to the first question.
            return self.chain_from(catalog, ctx, current.id(), input);
        }

        if let Err(message) = current.validate(input) {
            return Ok(TurnOutput::reprompt(ctx, message));
        }

        ctx.record_response(&StepId::new(current.id()), input);
        if let Some(effect) = current.effect() {
            ctx.apply_effect(effect, input);
        }

        match self.resolve_edge(ctx, current, input) {
            Some(next) => self.chain_from(catalog, ctx, next, input),
            None => {
                ctx.touch();
                Ok(TurnOutput {
                    segments: Vec::new(),
                    next_step: ctx.current_step.clone(),
                    next_phase: ctx.current_phase,
                    phase_complete: true,
                    reprompt: None,
                })
            }
        }
    }

    /// Resolves a step id, surfacing catalog mismatches loudly.
    fn resolve<'c>(
        &self,
        catalog: &'c StepCatalog,
        ctx: &SessionContext,
        id: &str,
    ) -> Result<&'c Step, ProtocolError> {
        catalog.step(id).ok_or_else(|| ProtocolError::UnknownStep {
            modality: ctx.modality,
            step: StepId::new(id),
        })
    }

    /// Resolves a step's outgoing edge, applying any routing effects.
    ///
    /// `None` means the modality is complete.
    fn resolve_edge(
        &self,
        ctx: &mut SessionContext,
        step: &Step,
        input: &str,
    ) -> Option<&'static str> {
        match step.transition() {
            Transition::To(next) => Some(next),
            Transition::Undefined => {
                let modality = ctx.modality;
                let decision = {
                    let req = RouteRequest {
                        step_id: step.id(),
                        input,
                        ctx: &*ctx,
                        resolution: &self.resolution,
                    };
                    route(modality, &req)
                };
                let decision = decision?;
                for effect in &decision.effects {
                    ctx.apply_effect(*effect, input);
                }
                Some(decision.next)
            }
        }
    }

    /// Renders from `start`, chaining through auto steps until the session
    /// rests on an input-expecting step or the modality completes.
    fn chain_from(
        &self,
        catalog: &StepCatalog,
        ctx: &mut SessionContext,
        start: &str,
        input: &str,
    ) -> Result<TurnOutput, ProtocolError> {
        let mut segments = Vec::new();
        let mut phase_complete = false;
        let mut step = self.resolve(catalog, ctx, start)?;

        loop {
            let text = step.render(&RenderCtx { input, ctx });
            ctx.advance_to(step.id(), step.phase());
            segments.push(RenderedSegment {
                step_id: StepId::new(step.id()),
                text,
            });

            if !step.is_auto() {
                break;
            }
            match self.resolve_edge(ctx, step, input) {
                Some(next) => step = self.resolve(catalog, ctx, next)?,
                None => {
                    phase_complete = true;
                    break;
                }
            }
        }

        ctx.touch();
        Ok(TurnOutput {
            segments,
            next_step: ctx.current_step.clone(),
            next_phase: ctx.current_phase,
            phase_complete,
            reprompt: None,
        })
    }
}
