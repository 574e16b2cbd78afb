//! Linguistic interpretation of echo templates.
//!
//! A fixed set of steps renders the user's raw text twice, quoted
//! ("Feel 'like I am overwhelmed'... what happens in yourself when you feel
//! 'like I am overwhelmed'?"). When budget allows, the assistance layer
//! extracts the core emotion/identity/reason token and substitutes only that
//! token into the unchanged template skeleton ("Feel overwhelmed... what
//! happens in yourself when you feel overwhelmed?"). The skeletons here must
//! stay in lockstep with the catalog templates; the catalog tests hold the
//! two together.

/// Step ids whose templates are eligible for linguistic interpretation.
pub const INTERPRETED_STEPS: [&str; 6] = [
    "what_happens_step",
    "feel_good_state",
    "reality_feel_reason_2",
    "belief_feel_echo",
    "identity_dissolve_step",
    "trauma_echo_step",
];

/// Returns true if the step's template is eligible for interpretation.
pub fn is_interpreted(step_id: &str) -> bool {
    INTERPRETED_STEPS.contains(&step_id)
}

/// Renders the naturalized skeleton for a step with the extracted token.
///
/// Returns `None` for steps outside the interpreted set.
pub fn naturalized(step_id: &str, token: &str) -> Option<String> {
    let text = match step_id {
        "what_happens_step" | "reality_feel_reason_2" | "belief_feel_echo"
        | "trauma_echo_step" => format!(
            "Feel {token}... what happens in yourself when you feel {token}?"
        ),
        "feel_good_state" => format!("Feel {token}... what does {token} feel like?"),
        "identity_dissolve_step" => format!(
            "Feel yourself being {token}... what happens as you keep feeling {token}?"
        ),
        _ => return None,
    };
    Some(text)
}

/// Builds the extraction prompt sent to the completion service.
pub fn build_extraction_prompt(raw_input: &str) -> String {
    format!(
        "The user described a feeling as: \"{}\". Reply with only the core \
         emotion or state, as one word or a very short phrase, lowercase, no \
         punctuation. Example: for \"like I am overwhelmed\" reply \
         \"overwhelmed\".",
        raw_input.trim()
    )
}

/// Cleans a completion reply into a usable token.
///
/// Rejects replies that are empty, multi-line, or too long to be a token -
/// the caller falls back to the deterministic template in that case.
pub fn sanitize_token(reply: &str) -> Option<String> {
    let token = reply
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == ',')
        .trim();
    if token.is_empty() || token.contains('\n') {
        return None;
    }
    if token.split_whitespace().count() > 6 {
        return None;
    }
    Some(token.to_string())
}
