//! Error types for the protocol engine.

use crate::domain::foundation::StepId;
use crate::domain::protocol::modality::Modality;
use thiserror::Error;

/// Errors that end a request.
///
/// Validation failures are not errors at this level: they are a recoverable
/// same-step reprompt carried in [`super::engine::TurnOutput`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The current step id is absent from the catalog even after migration.
    ///
    /// Never silently defaulted: this signals a catalog/version mismatch in
    /// persisted state and must surface to the caller.
    #[error("unknown step '{step}' in {} catalog", modality.label())]
    UnknownStep { modality: Modality, step: StepId },
}
