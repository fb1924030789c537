//! Error taxonomy for the composition engine.
//!
//! Only malformed input is a genuine failure. Geometric dead ends
//! (`PlacementExhausted`, `SeparationExhausted`) are produced by [`crate::geom`]
//! and absorbed by the engine, which degrades to a flagged-but-usable state.
//! Unknown ids are a silent no-op for mutations and an error only for queries.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::doc::ObjectId;

/// Errors surfaced by engine operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CanvasError {
    /// Content is not a well-formed vector document.
    #[error("invalid vector format: {0}")]
    InvalidFormat(String),

    /// Content parsed but contains nothing drawable.
    #[error("vector document has no drawable elements")]
    UnsupportedContent,

    /// No object with this id is owned by the engine.
    #[error("unknown object id {0}")]
    UnknownObjectId(ObjectId),

    /// An object with this id is live or was removed earlier.
    #[error("object id {0} already used")]
    DuplicateObjectId(ObjectId),

    /// The free-cell search found no non-overlapping position.
    #[error("no free placement found")]
    PlacementExhausted,

    /// No single-axis push separates the rectangles.
    #[error("no separating translation found")]
    SeparationExhausted,

    /// A resource could not be fetched.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Engine configuration could not be parsed.
    #[error("config parse failed: {0}")]
    Config(String),

    /// A surface or size-tier dimension is out of range.
    #[error("invalid size: {0}")]
    InvalidSize(String),
}

impl CanvasError {
    /// Stable machine-readable code for host-side messaging.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) => "E_INVALID_FORMAT",
            Self::UnsupportedContent => "E_UNSUPPORTED_CONTENT",
            Self::UnknownObjectId(_) => "E_UNKNOWN_OBJECT",
            Self::DuplicateObjectId(_) => "E_DUPLICATE_OBJECT",
            Self::PlacementExhausted => "E_PLACEMENT_EXHAUSTED",
            Self::SeparationExhausted => "E_SEPARATION_EXHAUSTED",
            Self::Load(_) => "E_LOAD",
            Self::Config(_) => "E_CONFIG",
            Self::InvalidSize(_) => "E_INVALID_SIZE",
        }
    }

    /// Whether the end user should be shown an actionable message.
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::InvalidFormat(_) | Self::UnsupportedContent | Self::Load(_) | Self::InvalidSize(_))
    }
}

/// A resource fetch failure.
///
/// Cloneable so a single failed font load can be observed by every waiter of
/// the shared future.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to load {reference}: {message}")]
pub struct LoadError {
    /// The path or URL that was requested.
    pub reference: String,
    /// Human-readable cause.
    pub message: String,
}

impl LoadError {
    pub fn new(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self { reference: reference.into(), message: message.into() }
    }
}
