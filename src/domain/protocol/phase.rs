//! Session phases within a modality.
//!
//! Phases track where a session sits in the overall arc of a modality.
//! Unlike steps (which are modality-specific), phases are shared vocabulary
//! across all modalities and drive the migration adapter's step→phase
//! correction.

use serde::{Deserialize, Serialize};

/// The lifecycle phase of a guided session.
///
/// Phases flow in a general order but can loop:
/// `Intro` → `Discovery` → `Working` → `Integration` → `Complete`,
/// with `DiggingDeeper` re-entering `Working` when a secondary issue
/// surfaces during integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Scripted instructions before any user material is gathered.
    Intro,
    /// Capturing the material to work on (problem, goal, belief, ...).
    Discovery,
    /// The modality's main repeat loop.
    Working,
    /// A secondary issue recorded during integration, re-entering the loop.
    DiggingDeeper,
    /// The fixed closing question sub-sequence (awareness, then action).
    Integration,
    /// Terminal: the modality has completed.
    Complete,
}

impl Phase {
    /// Returns a short label for the phase, suitable for UI display and
    /// persistence keys.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Discovery => "discovery",
            Self::Working => "working",
            Self::DiggingDeeper => "digging_deeper",
            Self::Integration => "integration",
            Self::Complete => "complete",
        }
    }

    /// Returns all valid next phases from this phase.
    pub fn valid_next_phases(&self) -> Vec<Self> {
        match self {
            Self::Intro => vec![Self::Discovery],
            // Trauma Shifting's readiness check can end the session from
            // Discovery when the user declines to continue.
            Self::Discovery => vec![Self::Working, Self::Complete],
            Self::Working => vec![Self::Working, Self::Integration],
            Self::Integration => {
                vec![Self::Integration, Self::DiggingDeeper, Self::Complete]
            }
            Self::DiggingDeeper => vec![Self::Working],
            Self::Complete => vec![],
        }
    }

    /// Returns true if transition to the target phase is valid.
    pub fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_next_phases().contains(target)
    }

    /// Returns true if this phase has no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        self.valid_next_phases().is_empty()
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::Intro
    }
}
