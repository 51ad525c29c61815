use serde::Deserialize;
use tracing::debug;

use crate::error::ExtractError;
use crate::extractor::{Grouping, PairwiseEntropyExtractor};
use crate::weighting::WeightingWindow;

fn default_weighting() -> String {
    "uniform".to_owned()
}

/// Extractor settings as shipped by the Python pipeline, e.g.
/// `{"output_size": 4096, "window_size": 5, "weighting": "triangular"}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractorConfig {
    pub output_size: usize,
    pub window_size: usize,
    #[serde(default = "default_weighting")]
    pub weighting: String,
    #[serde(default)]
    pub grouping: Grouping,
    #[serde(default)]
    pub strict: bool,
}

impl ExtractorConfig {
    pub fn from_json(raw: &str) -> Result<Self, ExtractError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn build(&self) -> Result<PairwiseEntropyExtractor, ExtractError> {
        if self.output_size == 0 {
            return Err(ExtractError::ZeroOutputSize);
        }
        if self.window_size == 0 {
            return Err(ExtractError::ZeroWindowSize);
        }
        let weighting = WeightingWindow::by_name(&self.weighting, self.window_size)?;
        debug!(
            output_size = self.output_size,
            window_size = self.window_size,
            weighting = %self.weighting,
            grouping = ?self.grouping,
            strict = self.strict,
            "built pairwise entropy extractor"
        );
        Ok(PairwiseEntropyExtractor::new(weighting, self.output_size)?
            .with_grouping(self.grouping)
            .with_strict(self.strict))
    }
}
