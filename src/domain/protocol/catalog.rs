//! Step catalogs - one declarative graph per modality.

use std::collections::HashMap;

use crate::domain::protocol::modalities;
use crate::domain::protocol::modality::Modality;
use crate::domain::protocol::step::{Step, Transition};

/// The step table for one modality.
///
/// Built once at startup behind `Lazy`; construction panics on structural
/// defects (duplicate ids, dangling edges, wrong entry step) so a broken
/// catalog can never serve a session.
pub struct StepCatalog {
    modality: Modality,
    steps: Vec<Step>,
    index: HashMap<&'static str, usize>,
}

impl StepCatalog {
    /// Builds a catalog, checking structural invariants.
    pub fn new(modality: Modality, steps: Vec<Step>) -> Self {
        let mut index = HashMap::with_capacity(steps.len());
        for (i, step) in steps.iter().enumerate() {
            let previous = index.insert(step.id(), i);
            assert!(
                previous.is_none(),
                "duplicate step id '{}' in {} catalog",
                step.id(),
                modality.label()
            );
        }
        for step in &steps {
            if let Transition::To(target) = step.transition() {
                assert!(
                    index.contains_key(target),
                    "step '{}' points at missing step '{}' in {} catalog",
                    step.id(),
                    target,
                    modality.label()
                );
            }
        }
        assert_eq!(
            steps.first().map(Step::id),
            Some(modality.intro_step()),
            "{} catalog must start at its intro step",
            modality.label()
        );
        Self {
            modality,
            steps,
            index,
        }
    }

    /// The modality this catalog belongs to.
    pub fn modality(&self) -> Modality {
        self.modality
    }

    /// Looks up a step by id.
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.index.get(id).map(|i| &self.steps[*i])
    }

    /// The modality's entry step.
    pub fn entry(&self) -> &Step {
        &self.steps[0]
    }

    /// Number of steps in the catalog.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the catalog has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Iterates the steps in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter()
    }
}

/// Returns the catalog for a modality.
pub fn catalog_for(modality: Modality) -> &'static StepCatalog {
    match modality {
        Modality::ProblemShifting => &modalities::problem_shifting::CATALOG,
        Modality::RealityShifting => &modalities::reality_shifting::CATALOG,
        Modality::BeliefShifting => &modalities::belief_shifting::CATALOG,
        Modality::IdentityShifting => &modalities::identity_shifting::CATALOG,
        Modality::BlockageShifting => &modalities::blockage_shifting::CATALOG,
        Modality::TraumaShifting => &modalities::trauma_shifting::CATALOG,
    }
}

/// All catalogs, in modality order.
pub fn all_catalogs() -> Vec<&'static StepCatalog> {
    Modality::all().iter().map(|m| catalog_for(*m)).collect()
}
