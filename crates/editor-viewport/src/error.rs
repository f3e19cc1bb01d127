//! Error types of the viewport layer.
//!
//! Only two conditions surface as errors: a mesh whose data the
//! authority could not provide, and a failed startup. Degenerate
//! per-frame geometry (near-parallel projections, points behind the
//! camera) is handled by silently skipping the frame's update instead.

use thiserror::Error;

use crate::authority::MeshId;

/// The error type of the viewport layer.
#[derive(Error, Debug)]
pub enum ViewportError {
    /// The authority could not provide geometry for a mesh.
    ///
    /// Transient and scoped to a single instance: the affected instance
    /// is skipped for the current sync and retried on the next one.
    #[error("mesh data unavailable: {mesh_id:?}")]
    MeshUnavailable { mesh_id: MeshId },

    /// The viewport could not be brought up. Fatal, reported once.
    #[error("viewport initialization failed: {reason}")]
    Init { reason: String },
}

/// Alias for results produced by the viewport layer.
pub type Result<T> = std::result::Result<T, ViewportError>;
