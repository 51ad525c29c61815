//! Native core of the book-classification feature pipeline.
//!
//! [`kernel`] holds the hashed pairwise-entropy accumulator; the remaining
//! modules drive it over whole documents and expose it through a C ABI and,
//! with the `python` feature, a pyo3 extension module.

pub mod config;
pub mod error;
mod event;
pub mod extractor;
pub mod features;
pub mod ffi;
pub mod kernel;
pub mod weighting;
pub mod worker;

#[cfg(feature = "python")]
mod python;

pub use config::ExtractorConfig;
pub use error::{ExtractError, KernelError, Precondition};
pub use extractor::{DocumentAccumulator, Grouping, PairwiseEntropyExtractor};
pub use features::FeatureVec;
pub use kernel::{accumulate, accumulate_checked};
pub use weighting::WeightingWindow;
pub use worker::{WindowSender, WindowWorker};
