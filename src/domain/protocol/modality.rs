//! The fixed set of guided-session modalities.

use serde::{Deserialize, Serialize};

/// One complete guided technique, comprising an ordered/cyclic set of steps.
///
/// Each modality owns an independent namespace of step ids; the catalogs in
/// [`super::modalities`] define the graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    /// Dissolve a felt problem by cycling through its body sense.
    ProblemShifting,
    /// Clear the reasons standing between the user and a stated goal.
    RealityShifting,
    /// Loosen a limiting belief until it no longer feels true.
    BeliefShifting,
    /// Dissolve an unwanted self-identity.
    IdentityShifting,
    /// Shift a problem that restates itself each round until nothing remains.
    BlockageShifting,
    /// Discharge the felt residue of a past event.
    TraumaShifting,
}

impl Modality {
    /// Human-readable label, suitable for UI display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ProblemShifting => "Problem Shifting",
            Self::RealityShifting => "Reality Shifting",
            Self::BeliefShifting => "Belief Shifting",
            Self::IdentityShifting => "Identity Shifting",
            Self::BlockageShifting => "Blockage Shifting",
            Self::TraumaShifting => "Trauma Shifting",
        }
    }

    /// The id of the modality's introduction step (the initial state).
    ///
    /// Must name the first step of the modality's catalog; the catalog tests
    /// enforce the agreement.
    pub fn intro_step(&self) -> &'static str {
        match self {
            Self::ProblemShifting => "problem_shifting_intro",
            Self::RealityShifting => "reality_shifting_intro",
            Self::BeliefShifting => "belief_shifting_intro",
            Self::IdentityShifting => "identity_shifting_intro",
            Self::BlockageShifting => "blockage_shifting_intro",
            Self::TraumaShifting => "trauma_shifting_intro",
        }
    }

    /// All modalities, in catalog order.
    pub fn all() -> [Modality; 6] {
        [
            Self::ProblemShifting,
            Self::RealityShifting,
            Self::BeliefShifting,
            Self::IdentityShifting,
            Self::BlockageShifting,
            Self::TraumaShifting,
        ]
    }
}

impl Default for Modality {
    fn default() -> Self {
        Self::ProblemShifting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_snake_case() {
        let json = serde_json::to_string(&Modality::ProblemShifting).unwrap();
        assert_eq!(json, "\"problem_shifting\"");
    }

    #[test]
    fn deserializes_from_snake_case() {
        let m: Modality = serde_json::from_str("\"trauma_shifting\"").unwrap();
        assert_eq!(m, Modality::TraumaShifting);
    }

    #[test]
    fn default_is_problem_shifting() {
        assert_eq!(Modality::default(), Modality::ProblemShifting);
    }

    #[test]
    fn all_modalities_have_labels_and_intros() {
        for m in Modality::all() {
            assert!(!m.label().is_empty());
            assert!(m.intro_step().ends_with("_intro"));
        }
    }
}
