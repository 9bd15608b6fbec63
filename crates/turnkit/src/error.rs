//! Error types for the turning pipeline stages.

use crate::geometry::ChainId;
use thiserror::Error;

/// Errors that abort a pipeline stage.
///
/// Geometric degeneracies are not represented here; those recover in place
/// through documented numeric fallbacks and are only logged.
#[derive(Error, Debug)]
pub enum StageError {
    /// No mesh geometry was available for shape recognition.
    #[error("No mesh geometry selected for profile recognition")]
    EmptyMeshSelection,

    /// The requested section plane does not exist in the document.
    #[error("Section plane '{0}' is not available")]
    MissingPlane(String),

    /// A chain a stage depends on disappeared from the document.
    #[error("Chain {0} is no longer present in the document")]
    ChainMissing(ChainId),

    /// Shape recognition ran but produced no usable chain.
    #[error("Profile recognition produced no chains")]
    NoProfileRecognized,

    /// The host adapter reported a failure.
    #[error("Host operation failed: {0}")]
    Host(String),
}

/// Result type alias for pipeline stages.
pub type StageResult<T> = Result<T, StageError>;

/// Errors reported by a geometry kernel.
///
/// Callers of the intersection utilities treat every variant as
/// "no intersection"; nothing here propagates out of a pairwise test.
#[derive(Error, Debug)]
pub enum KernelError {
    /// The kernel returned its out-of-range sentinel result.
    #[error("Kernel reported an out-of-range result")]
    Sentinel,

    /// An operand could not be retrieved or converted.
    #[error("Kernel operand failure: {0}")]
    Operand(String),
}
