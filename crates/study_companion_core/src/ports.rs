//! crates/study_companion_core/src/ports.rs
//!
//! Defines the service contract (trait) between the core and the external
//! generation provider. The trait forms the boundary of the hexagonal
//! architecture, keeping the core independent of any particular SDK or transport.

use crate::domain::ContentKind;
use crate::schema::{SchemaDescriptor, ShapeViolation};
use async_trait::async_trait;

//=========================================================================================
// Generation Error and Result Types
//=========================================================================================

/// Every way a generation call can fail.
///
/// Callers outside the core only need `is_caller_error`: anything else is a
/// single opaque "generation failed" outcome.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Provider call failed: {0}")]
    Provider(String),
    #[error("Provider returned malformed JSON: {0}")]
    Malformed(String),
    #[error("Provider response does not match the {kind} schema: {violation}")]
    ShapeMismatch {
        kind: ContentKind,
        violation: String,
    },
}

impl GenerationError {
    pub fn shape_mismatch(kind: ContentKind, violation: impl ToString) -> Self {
        GenerationError::ShapeMismatch {
            kind,
            violation: violation.to_string(),
        }
    }

    /// True when the request was rejected before reaching the provider.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, GenerationError::InvalidRequest(_))
    }
}

impl From<(ContentKind, ShapeViolation)> for GenerationError {
    fn from((kind, violation): (ContentKind, ShapeViolation)) -> Self {
        GenerationError::shape_mismatch(kind, violation)
    }
}

/// A convenience type alias for `Result<T, GenerationError>`.
pub type GenerationResult<T> = Result<T, GenerationError>;

//=========================================================================================
// Service Port
//=========================================================================================

/// Everything the provider needs for one structured-output round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    pub kind: ContentKind,
    pub model: String,
    pub prompt: String,
    pub system_instruction: &'static str,
    pub schema: SchemaDescriptor,
}

#[async_trait]
pub trait StructuredGenerationService: Send + Sync {
    /// Performs exactly one provider call and returns its raw text.
    ///
    /// `Ok(None)` means the provider answered without any text.
    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> GenerationResult<Option<String>>;
}
