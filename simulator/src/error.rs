use std::io;

use thiserror::Error;

/// Errors surfaced by bench operations.
#[derive(Debug, Error)]
pub enum SimError {
    /// An operation that needs a live model ran before `init`.
    #[error("simulation is not initialized; run init first")]
    Uninitialized,

    /// `init` ran again without an intervening `end`.
    #[error("simulation is already initialized; run end first")]
    AlreadyInitialized,

    /// A trace sink is already open for this session.
    #[error("tracing is already enabled")]
    TraceAlreadyOpen,

    /// The trace sink could not be written.
    #[error("trace i/o failed: {0}")]
    Io(#[from] io::Error),
}
