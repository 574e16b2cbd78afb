//! Client-facing request and response shapes.

use serde::{Deserialize, Serialize};

use crate::domain::protocol::Modality;

/// One turn of user input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRequest {
    /// The session to advance.
    pub session_id: String,
    /// The user owning the session.
    pub user_id: String,
    /// The literal user input.
    pub user_input: String,
    /// Modality for a session created by this turn; ignored on resume.
    #[serde(default)]
    pub modality: Option<Modality>,
}

impl TurnRequest {
    /// Creates a request.
    pub fn new(
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        user_input: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            user_input: user_input.into(),
            modality: None,
        }
    }

    /// Sets the modality used if this turn creates the session.
    pub fn with_modality(mut self, modality: Modality) -> Self {
        self.modality = Some(modality);
        self
    }
}

/// Accounting attached to AI-backed turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistanceInfo {
    /// True when the reply is an aside and the scripted question still
    /// stands (trigger-based assistance).
    pub should_return_to_script: bool,
    /// Tokens consumed by this turn's assistance (zero on fallback).
    pub token_count: u32,
    /// Cost of this turn's assistance in cents (zero on fallback).
    pub cost_cents: u32,
}

/// The reply for one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResponse {
    /// The message to present to the user.
    pub message: String,
    /// The step the session now rests on.
    pub next_step_id: String,
    /// True when the modality completed this turn.
    pub phase_complete: bool,
    /// Validation reprompt; the step was not advanced when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Present on AI-backed turns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistance: Option<AssistanceInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips_through_json() {
        let request = TurnRequest::new("s-1", "u-1", "hello")
            .with_modality(Modality::BeliefShifting);
        let json = serde_json::to_string(&request).unwrap();
        let back: TurnRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.session_id, "s-1");
        assert_eq!(back.modality, Some(Modality::BeliefShifting));
    }

    #[test]
    fn request_without_modality_deserializes() {
        let json = r#"{"session_id": "s", "user_id": "u", "user_input": "hi"}"#;
        let request: TurnRequest = serde_json::from_str(json).unwrap();
        assert!(request.modality.is_none());
    }

    #[test]
    fn deterministic_response_omits_optional_fields() {
        let response = TurnResponse {
            message: "Feel it...".into(),
            next_step_id: "body_sensation_check".into(),
            phase_complete: false,
            error: None,
            assistance: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("error"));
        assert!(!json.contains("assistance"));
    }

    #[test]
    fn ai_backed_response_carries_accounting() {
        let response = TurnResponse {
            message: "One thing at a time.".into(),
            next_step_id: "problem_capture".into(),
            phase_complete: false,
            error: None,
            assistance: Some(AssistanceInfo {
                should_return_to_script: true,
                token_count: 15,
                cost_cents: 1,
            }),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("should_return_to_script"));
        assert!(json.contains("token_count"));
    }
}
