//! Error types for the placement pipeline.
//!
//! None of these are fatal: the app logs them and keeps rendering.

use thiserror::Error;

use crate::types::AnimalKind;

/// Result type for placement pipeline operations
pub type PlacementResult<T> = Result<T, PlacementError>;

#[derive(Error, Debug)]
pub enum PlacementError {
    /// The host refused or failed to grant a hit-test feed. The reticle
    /// stays hidden for the rest of the session.
    #[error("surface tracking unavailable: {0}")]
    SurfaceTrackingUnavailable(String),

    /// Placement attempted before the selected prototype exists.
    #[error("model not ready: {0}")]
    ModelNotReady(AnimalKind),

    /// Placement attempted while no surface is detected.
    #[error("no surface under the reticle")]
    NoSurface,

    /// Selection request for a kind that is not known.
    #[error("unknown selection: {0:?}")]
    UnknownSelection(String),

    /// A prototype asset could not be loaded; the procedural model is used.
    #[error("failed to load {kind} asset: {reason}")]
    AssetLoad { kind: AnimalKind, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
