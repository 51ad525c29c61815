//! Error types for the kernel and the document drivers built on it.

use thiserror::Error;

/// Caller-side contract the permissive kernel assumes but never checks.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    #[error("window is empty")]
    EmptyWindow,

    #[error("output buffer has zero slots")]
    ZeroOutputSize,

    #[error("window has {words} token ids but {weights} weights")]
    LengthMismatch { words: usize, weights: usize },
}

/// Failures reported by [`crate::kernel::accumulate_checked`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelError {
    #[error("precondition violated: {0}")]
    PreconditionViolation(#[from] Precondition),

    /// An aggregated weight that is not strictly positive, or whose
    /// `w * ln(w)` is not finite.
    #[error("aggregated weight {weight} for token {token} has no finite entropy term")]
    NumericDomain { token: i64, weight: f64 },
}

impl KernelError {
    /// Status code used by the C ABI: `1` for preconditions, `2` for numeric domain.
    pub fn code(&self) -> i32 {
        match self {
            Self::PreconditionViolation(_) => 1,
            Self::NumericDomain { .. } => 2,
        }
    }
}

/// Errors from configuring or running the document extractors.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid weighting window: {0}")]
    InvalidWeights(String),

    #[error("unknown weighting scheme: {0}")]
    UnknownWeighting(String),

    #[error("output size must be positive")]
    ZeroOutputSize,

    #[error("window size must be positive")]
    ZeroWindowSize,

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error("accumulator worker disconnected")]
    WorkerDisconnected,

    #[error("accumulator worker panicked")]
    WorkerPanicked,
}

impl ExtractError {
    pub fn invalid_weights(message: impl Into<String>) -> Self {
        Self::InvalidWeights(message.into())
    }
}
