//! Heuristic text classifiers used by routing functions.
//!
//! Cycle termination rests on scanning user text for resolution phrases and
//! on coarse yes/no parsing. This is best-effort phrase matching, not
//! language understanding; the phrase sets are explicit data so deployments
//! and tests can substitute their own.

/// Detects answers that indicate a worked problem has dissolved.
///
/// The default phrase set is not canonical — it covers the answers observed
/// in practice ("no problem", "nothing", "gone", ...) and is expected to be
/// extended per deployment.
#[derive(Debug, Clone)]
pub struct ResolutionClassifier {
    phrases: Vec<String>,
}

impl ResolutionClassifier {
    /// Creates a classifier with a custom phrase set.
    pub fn new(phrases: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            phrases: phrases.into_iter().map(|p| p.into().to_lowercase()).collect(),
        }
    }

    /// Returns true if the input reads as "the problem is resolved".
    pub fn is_resolved(&self, input: &str) -> bool {
        let lower = input.trim().to_lowercase();
        if lower.is_empty() {
            return false;
        }
        self.phrases.iter().any(|p| lower.contains(p.as_str()))
    }

    /// The active phrase set.
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

impl Default for ResolutionClassifier {
    fn default() -> Self {
        Self::new([
            "no problem",
            "not a problem",
            "no longer a problem",
            "nothing",
            "gone",
            "it's fine",
            "its fine",
            "fine now",
            "all good",
            "resolved",
            "no more",
        ])
    }
}

/// Parses a free-text answer as yes or no.
///
/// Scans word by word and returns on the first decisive token, so
/// "no, it's still there" reads as no. Returns `None` when nothing
/// decisive appears.
pub fn parse_yes_no(input: &str) -> Option<bool> {
    for word in input.split_whitespace() {
        let token: String = word
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '\'')
            .collect::<String>()
            .to_lowercase();
        match token.as_str() {
            "yes" | "yeah" | "yep" | "yup" | "sure" | "definitely" | "absolutely" | "still" => {
                return Some(true)
            }
            "no" | "nope" | "nah" | "not" | "gone" | "never" => return Some(false),
            _ => {}
        }
    }
    None
}

/// Detects "no reason" style answers to a why-not question.
///
/// Used by Reality Shifting to route to its terminal sub-path when the user
/// can name nothing in the way of the goal.
pub fn no_reason_given(input: &str) -> bool {
    let lower = input.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }
    const PHRASES: [&str; 6] = [
        "no reason",
        "nothing",
        "none",
        "can't think of anything",
        "cannot think of anything",
        "there isn't one",
    ];
    PHRASES.iter().any(|p| lower.contains(p)) || lower == "no"
}
