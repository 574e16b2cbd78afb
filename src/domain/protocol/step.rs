//! Step definitions - the rows of the per-modality catalog tables.
//!
//! A step is plain data: a message template (static text or a pure function
//! of the last user input and session context), an expected response
//! category, an ordered validation rule list, a transition, optional AI
//! trigger rules, and an optional commit effect. No step closes over mutable
//! state; everything a template needs arrives through [`RenderCtx`].

use crate::domain::assistance::trigger::{AiTriggerRule, AssistAction, TriggerCondition};
use crate::domain::protocol::context::SessionContext;
use crate::domain::protocol::phase::Phase;

/// The kind of reply a step expects from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpectedResponse {
    /// No user input required; the engine advances immediately.
    Auto,
    /// A felt sense ("tight", "heavy in my chest").
    Feeling,
    /// A description of inner experience.
    Experience,
    /// Free-form text.
    Open,
    /// A yes/no answer.
    YesNo,
    /// A goal or committed action statement.
    Goal,
}

impl ExpectedResponse {
    /// Returns true for instructional steps that consume no user turn.
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Short label used when building assistance prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Auto => "none",
            Self::Feeling => "a feeling",
            Self::Experience => "a description of what is happening inside",
            Self::Open => "a short open answer",
            Self::YesNo => "yes or no",
            Self::Goal => "a goal or action statement",
        }
    }
}

/// Everything a response generator may read.
///
/// `input` is the user input of the in-flight call; `ctx` is the session
/// context as of this turn. Generators must be pure over these two values.
pub struct RenderCtx<'a> {
    /// The literal user input of the current call.
    pub input: &'a str,
    /// The session context (scratch fields, problem statement, responses).
    pub ctx: &'a SessionContext,
}

/// A step's message template.
#[derive(Clone, Copy)]
pub enum Render {
    /// Fixed scripted text.
    Static(&'static str),
    /// Pure function of (last user input, context).
    Dynamic(fn(&RenderCtx) -> String),
}

impl Render {
    /// Renders the template for the given input and context.
    pub fn render(&self, rc: &RenderCtx) -> String {
        match self {
            Self::Static(text) => (*text).to_string(),
            Self::Dynamic(f) => f(rc),
        }
    }
}

impl std::fmt::Debug for Render {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(text) => f.debug_tuple("Static").field(text).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// A validation rule; evaluated in order, first failure wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationRule {
    /// Input (trimmed) must be at least `min` characters.
    MinLength {
        min: usize,
        message: &'static str,
    },
    /// Input must be at most `max` words.
    MaxWords {
        max: usize,
        message: &'static str,
    },
    /// Input must read as a yes or a no.
    YesNo { message: &'static str },
}

impl ValidationRule {
    /// Checks the rule against the input, returning the configured message
    /// on failure.
    pub fn check(&self, input: &str) -> Result<(), &'static str> {
        let trimmed = input.trim();
        match self {
            Self::MinLength { min, message } => {
                if trimmed.chars().count() < *min {
                    Err(message)
                } else {
                    Ok(())
                }
            }
            Self::MaxWords { max, message } => {
                if trimmed.split_whitespace().count() > *max {
                    Err(message)
                } else {
                    Ok(())
                }
            }
            Self::YesNo { message } => {
                if super::resolution::parse_yes_no(trimmed).is_some() {
                    Ok(())
                } else {
                    Err(message)
                }
            }
        }
    }
}

/// Evaluates rules in order; the first failing rule's message is returned.
pub fn validate(rules: &[ValidationRule], input: &str) -> Result<(), &'static str> {
    for rule in rules {
        rule.check(input)?;
    }
    Ok(())
}

/// A step's outgoing edge.
///
/// `Undefined` means "consult the modality routing function"; a routed step
/// the router does not handle is the modality's terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Unconditional edge to a step id in the same catalog.
    To(&'static str),
    /// Computed by the modality routing function (or terminal).
    Undefined,
}

/// A typed scratch write applied when a step's input is accepted.
///
/// Effects are the only way steps mutate the context beyond response
/// recording, which keeps every cross-step value a named field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Record the input as the session's problem statement.
    SetProblemStatement,
    /// Record the input as the goal statement.
    SetGoalStatement,
    /// Record the input as the goal deadline.
    SetGoalDeadline,
    /// Record the input as the belief being worked on.
    SetBeliefStatement,
    /// Record the input as the identity label.
    SetIdentityLabel,
    /// Record the input as the override problem for a digging-deeper loop.
    SetOverrideProblem,
    /// Bump the working-loop cycle counter.
    IncrementCycle,
}

/// One row of a modality's step table.
#[derive(Debug, Clone)]
pub struct Step {
    id: &'static str,
    phase: Phase,
    expected: ExpectedResponse,
    render: Render,
    rules: Vec<ValidationRule>,
    transition: Transition,
    triggers: Vec<AiTriggerRule>,
    effect: Option<Effect>,
}

impl Step {
    /// Creates a step with fixed scripted text.
    pub fn fixed(
        id: &'static str,
        phase: Phase,
        expected: ExpectedResponse,
        text: &'static str,
    ) -> Self {
        Self {
            id,
            phase,
            expected,
            render: Render::Static(text),
            rules: Vec::new(),
            transition: Transition::Undefined,
            triggers: Vec::new(),
            effect: None,
        }
    }

    /// Creates a step with a pure template function.
    pub fn dynamic(
        id: &'static str,
        phase: Phase,
        expected: ExpectedResponse,
        f: fn(&RenderCtx) -> String,
    ) -> Self {
        Self {
            id,
            phase,
            expected,
            render: Render::Dynamic(f),
            rules: Vec::new(),
            transition: Transition::Undefined,
            triggers: Vec::new(),
            effect: None,
        }
    }

    /// Sets the unconditional next step.
    pub fn to(mut self, next: &'static str) -> Self {
        self.transition = Transition::To(next);
        self
    }

    /// Appends a validation rule.
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends a minimum-length rule.
    pub fn with_min_length(self, min: usize, message: &'static str) -> Self {
        self.with_rule(ValidationRule::MinLength { min, message })
    }

    /// Appends a yes/no rule.
    pub fn with_yes_no(self, message: &'static str) -> Self {
        self.with_rule(ValidationRule::YesNo { message })
    }

    /// Appends an AI trigger rule.
    pub fn with_trigger(mut self, condition: TriggerCondition, action: AssistAction) -> Self {
        self.triggers.push(AiTriggerRule { condition, action });
        self
    }

    /// Sets the commit effect.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// The step id.
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// The phase this step belongs to.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The expected response category.
    pub fn expected(&self) -> ExpectedResponse {
        self.expected
    }

    /// Returns true for instructional steps that consume no user turn.
    pub fn is_auto(&self) -> bool {
        self.expected.is_auto()
    }

    /// The validation rules, in evaluation order.
    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    /// The outgoing edge.
    pub fn transition(&self) -> Transition {
        self.transition
    }

    /// The commit effect, if any.
    pub fn effect(&self) -> Option<Effect> {
        self.effect
    }

    /// Renders the step's message.
    pub fn render(&self, rc: &RenderCtx) -> String {
        self.render.render(rc)
    }

    /// Returns the first trigger rule whose condition matches the input.
    pub fn first_matching_trigger(&self, input: &str) -> Option<&AiTriggerRule> {
        self.triggers.iter().find(|rule| rule.condition.matches(input))
    }

    /// Validates input against this step's rules.
    pub fn validate(&self, input: &str) -> Result<(), &'static str> {
        validate(&self.rules, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{SessionId, UserId};
    use crate::domain::protocol::modality::Modality;

    fn ctx() -> SessionContext {
        SessionContext::new(
            SessionId::new("s-1").unwrap(),
            UserId::new("u-1").unwrap(),
            Modality::ProblemShifting,
        )
    }

    mod validation_rules {
        use super::*;

        #[test]
        fn min_length_rejects_short_input() {
            let rule = ValidationRule::MinLength {
                min: 3,
                message: "Please say a little more.",
            };
            assert_eq!(rule.check("ab"), Err("Please say a little more."));
            assert_eq!(rule.check("abc"), Ok(()));
        }

        #[test]
        fn min_length_trims_whitespace() {
            let rule = ValidationRule::MinLength {
                min: 3,
                message: "too short",
            };
            assert_eq!(rule.check("  ab  "), Err("too short"));
        }

        #[test]
        fn max_words_rejects_rambling() {
            let rule = ValidationRule::MaxWords {
                max: 3,
                message: "Just a few words, please.",
            };
            assert_eq!(rule.check("one two three four"), Err("Just a few words, please."));
            assert_eq!(rule.check("one two three"), Ok(()));
        }

        #[test]
        fn yes_no_accepts_variants() {
            let rule = ValidationRule::YesNo {
                message: "Please answer yes or no.",
            };
            assert_eq!(rule.check("yes"), Ok(()));
            assert_eq!(rule.check("Nope"), Ok(()));
            assert_eq!(rule.check("purple"), Err("Please answer yes or no."));
        }

        #[test]
        fn first_failing_rule_wins() {
            let rules = vec![
                ValidationRule::MinLength {
                    min: 2,
                    message: "first",
                },
                ValidationRule::MaxWords {
                    max: 1,
                    message: "second",
                },
            ];
            assert_eq!(validate(&rules, "x"), Err("first"));
            assert_eq!(validate(&rules, "two words"), Err("second"));
            assert_eq!(validate(&rules, "one"), Ok(()));
        }
    }

    mod step_builder {
        use super::*;

        #[test]
        fn fixed_step_renders_static_text() {
            let step = Step::fixed(
                "intro",
                Phase::Intro,
                ExpectedResponse::Auto,
                "Close your eyes.",
            );
            let ctx = ctx();
            let rc = RenderCtx { input: "", ctx: &ctx };
            assert_eq!(step.render(&rc), "Close your eyes.");
            assert!(step.is_auto());
            assert_eq!(step.transition(), Transition::Undefined);
        }

        fn echo(rc: &RenderCtx) -> String {
            format!("You said '{}'.", rc.input)
        }

        #[test]
        fn dynamic_step_sees_input() {
            let step = Step::dynamic("echo", Phase::Working, ExpectedResponse::Open, echo);
            let ctx = ctx();
            let rc = RenderCtx {
                input: "heavy",
                ctx: &ctx,
            };
            assert_eq!(step.render(&rc), "You said 'heavy'.");
        }

        #[test]
        fn dynamic_render_is_deterministic() {
            let step = Step::dynamic("echo", Phase::Working, ExpectedResponse::Open, echo);
            let ctx = ctx();
            let rc = RenderCtx {
                input: "heavy",
                ctx: &ctx,
            };
            assert_eq!(step.render(&rc), step.render(&rc));
        }

        #[test]
        fn builder_sets_edge_rules_and_effect() {
            let step = Step::fixed(
                "capture",
                Phase::Discovery,
                ExpectedResponse::Open,
                "What is the problem?",
            )
            .with_min_length(3, "More, please.")
            .with_effect(Effect::SetProblemStatement)
            .to("next_step");

            assert_eq!(step.transition(), Transition::To("next_step"));
            assert_eq!(step.effect(), Some(Effect::SetProblemStatement));
            assert_eq!(step.validate("ab"), Err("More, please."));
            assert_eq!(step.validate("my boss"), Ok(()));
        }

        #[test]
        fn first_matching_trigger_respects_order() {
            let step = Step::fixed("q", Phase::Working, ExpectedResponse::Open, "?")
                .with_trigger(TriggerCondition::UserStuck, AssistAction::Clarify)
                .with_trigger(TriggerCondition::TooVerbose, AssistAction::Simplify);

            let hit = step.first_matching_trigger("I don't know").unwrap();
            assert_eq!(hit.action, AssistAction::Clarify);
            assert!(step.first_matching_trigger("it feels tight").is_none());
        }
    }
}
