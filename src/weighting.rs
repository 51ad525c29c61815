use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::ExtractError;

const SUM_TOLERANCE: f64 = 1e-5;

/// Positional weights applied to every window of a document.
///
/// Always odd-length and normalized to sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightingWindow {
    weights: Vec<f64>,
}

impl WeightingWindow {
    pub fn new(weights: Vec<f64>) -> Result<Self, ExtractError> {
        if weights.is_empty() {
            return Err(ExtractError::invalid_weights("window must not be empty"));
        }
        if weights.len() % 2 == 0 {
            return Err(ExtractError::invalid_weights(format!(
                "window length {} must be odd",
                weights.len()
            )));
        }
        let sum: f64 = weights.iter().sum();
        let off = (1.0 - sum).abs();
        if off.is_nan() || off >= SUM_TOLERANCE {
            return Err(ExtractError::invalid_weights(format!(
                "weights sum to {sum}, expected 1"
            )));
        }
        Ok(Self { weights })
    }

    pub fn uniform(size: usize) -> Result<Self, ExtractError> {
        if size == 0 {
            return Err(ExtractError::ZeroWindowSize);
        }
        Self::new(vec![1.0 / size as f64; size])
    }

    /// Symmetric ramp peaking at the center: `min(i + 1, size - i)`, normalized.
    pub fn triangular(size: usize) -> Result<Self, ExtractError> {
        if size == 0 {
            return Err(ExtractError::ZeroWindowSize);
        }
        let ramp: Vec<f64> = (0..size).map(|i| (i + 1).min(size - i) as f64).collect();
        let total: f64 = ramp.iter().sum();
        Self::new(ramp.into_iter().map(|w| w / total).collect())
    }

    pub fn by_name(name: &str, size: usize) -> Result<Self, ExtractError> {
        let build = REGISTRY
            .get(name)
            .ok_or_else(|| ExtractError::UnknownWeighting(name.to_owned()))?;
        build(size)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }
}

// Registry
type Constructor = fn(usize) -> Result<WeightingWindow, ExtractError>;

pub static REGISTRY: Lazy<HashMap<&'static str, Constructor>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, Constructor> = HashMap::new();
    m.insert("uniform", WeightingWindow::uniform);
    m.insert("triangular", WeightingWindow::triangular);
    m
});
