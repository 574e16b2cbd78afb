//! AI trigger conditions and actions.
//!
//! A step may declare that certain shapes of user input warrant an
//! AI-assisted reply instead of the scripted path. Conditions are detected
//! with token/phrase heuristics on the literal input - best-effort, same as
//! the routing classifiers.

use serde::{Deserialize, Serialize};

use crate::domain::protocol::step::ExpectedResponse;

/// The canonical simplification sentence.
///
/// Compliance-sensitive scripted text: emitted verbatim on fallback and
/// requested verbatim from the completion service.
pub const SIMPLIFY_SENTENCE: &str =
    "OK, let's simplify this. How would you state it in just a few words?";

/// A shape of user input that warrants assistance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerCondition {
    /// The user signals they cannot answer ("I don't know", "stuck").
    UserStuck,
    /// The user asks what the question means.
    NeedsClarification,
    /// The answer bundles several problems at once.
    MultipleProblems,
    /// The answer is far longer than the script can use.
    TooVerbose,
}

impl TriggerCondition {
    /// Returns true if the input matches this condition's heuristics.
    pub fn matches(&self, input: &str) -> bool {
        let lower = input.trim().to_lowercase();
        if lower.is_empty() {
            return false;
        }
        match self {
            Self::UserStuck => [
                "i don't know",
                "i dont know",
                "don't know",
                "not sure",
                "no idea",
                "stuck",
                "can't think",
                "cannot think",
                "i give up",
            ]
            .iter()
            .any(|p| lower.contains(p)),
            Self::NeedsClarification => {
                lower.ends_with('?')
                    || [
                        "what do you mean",
                        "don't understand",
                        "dont understand",
                        "confused",
                        "can you explain",
                    ]
                    .iter()
                    .any(|p| lower.contains(p))
            }
            Self::MultipleProblems => {
                lower.matches(" and ").count() >= 2
                    || lower.contains(" and also ")
                    || lower.contains("as well as")
            }
            Self::TooVerbose => lower.split_whitespace().count() > 40,
        }
    }

    /// Short tag used in prompts and logs.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::UserStuck => "user_stuck",
            Self::NeedsClarification => "needs_clarification",
            Self::MultipleProblems => "multiple_problems",
            Self::TooVerbose => "too_verbose",
        }
    }
}

/// What the assistance layer should do when a condition fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistAction {
    /// Restate the current question more plainly.
    Clarify,
    /// Help the user pick one problem to work on.
    Focus,
    /// Ask for the canonical few-words restatement.
    Simplify,
    /// Gently steer the user back to the question.
    Redirect,
}

impl AssistAction {
    /// The instruction handed to the completion service for this action.
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Clarify => {
                "Restate the current question in plainer words. One short sentence. \
                 Do not add new questions or advice."
            }
            Self::Focus => {
                "The user named several problems. Ask them to choose the one that \
                 bothers them most right now. One short sentence."
            }
            Self::Simplify => {
                "Reply with exactly this sentence and nothing else: \
                 OK, let's simplify this. How would you state it in just a few words?"
            }
            Self::Redirect => {
                "The user drifted off the question. Bring them back to it kindly. \
                 One short sentence."
            }
        }
    }
}

/// A trigger condition bound to its action on a specific step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AiTriggerRule {
    pub condition: TriggerCondition,
    pub action: AssistAction,
}

/// Builds the minimal assistance prompt: trigger condition, expected
/// response category, and the user's literal text.
pub fn build_assist_prompt(
    rule: &AiTriggerRule,
    expected: ExpectedResponse,
    input: &str,
) -> String {
    format!(
        "A guided session expects {} from the user. The input was flagged as {}. \
         The user wrote: \"{}\"",
        expected.label(),
        rule.condition.tag(),
        input.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    mod conditions {
        use super::*;

        #[test]
        fn user_stuck_detects_dont_know() {
            assert!(TriggerCondition::UserStuck.matches("I don't know"));
            assert!(TriggerCondition::UserStuck.matches("no idea at all"));
            assert!(!TriggerCondition::UserStuck.matches("it feels heavy"));
        }

        #[test]
        fn needs_clarification_detects_questions() {
            assert!(TriggerCondition::NeedsClarification.matches("what do you mean?"));
            assert!(TriggerCondition::NeedsClarification.matches("I'm confused"));
            assert!(!TriggerCondition::NeedsClarification.matches("tight chest"));
        }

        #[test]
        fn multiple_problems_detects_bundles() {
            assert!(TriggerCondition::MultipleProblems
                .matches("my job and my marriage and my health"));
            assert!(TriggerCondition::MultipleProblems.matches("money, and also my sleep"));
            assert!(!TriggerCondition::MultipleProblems.matches("my job"));
        }

        #[test]
        fn too_verbose_counts_words() {
            let long = "word ".repeat(41);
            assert!(TriggerCondition::TooVerbose.matches(&long));
            assert!(!TriggerCondition::TooVerbose.matches("short answer"));
        }

        #[test]
        fn empty_input_matches_nothing() {
            for cond in [
                TriggerCondition::UserStuck,
                TriggerCondition::NeedsClarification,
                TriggerCondition::MultipleProblems,
                TriggerCondition::TooVerbose,
            ] {
                assert!(!cond.matches("   "));
            }
        }
    }

    mod prompts {
        use super::*;

        #[test]
        fn prompt_carries_condition_category_and_text() {
            let rule = AiTriggerRule {
                condition: TriggerCondition::UserStuck,
                action: AssistAction::Clarify,
            };
            let prompt = build_assist_prompt(&rule, ExpectedResponse::Feeling, "I don't know");
            assert!(prompt.contains("a feeling"));
            assert!(prompt.contains("user_stuck"));
            assert!(prompt.contains("I don't know"));
        }

        #[test]
        fn simplify_instruction_embeds_canonical_sentence() {
            assert!(AssistAction::Simplify.instruction().contains(SIMPLIFY_SENTENCE));
        }
    }
}
