use numpy::{PyArray1, PyReadonlyArray1, PyReadwriteArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, KernelError};
use crate::extractor::DocumentAccumulator;
use crate::kernel;

impl From<KernelError> for PyErr {
    fn from(err: KernelError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

impl From<ExtractError> for PyErr {
    fn from(err: ExtractError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

/// Adds one window's entropy terms into `output` in place. Empty inputs are
/// ignored; non-positive weight sums write NaN.
#[pyfunction]
pub fn pairwise_entropies_window<'py>(
    mut output: PyReadwriteArray1<'py, f64>,
    words: PyReadonlyArray1<'py, i64>,
    weights: PyReadonlyArray1<'py, f64>,
) -> PyResult<()> {
    let output = output.as_slice_mut()?;
    let words = words.as_slice()?;
    let weights = weights.as_slice()?;
    if output.is_empty() || words.is_empty() {
        return Ok(());
    }
    kernel::accumulate(output, words, weights);
    Ok(())
}

/// Like `pairwise_entropies_window`, but raises `ValueError` instead of
/// writing NaN; `output` is untouched on error.
#[pyfunction]
pub fn pairwise_entropies_window_checked<'py>(
    mut output: PyReadwriteArray1<'py, f64>,
    words: PyReadonlyArray1<'py, i64>,
    weights: PyReadonlyArray1<'py, f64>,
) -> PyResult<()> {
    let output = output.as_slice_mut()?;
    kernel::accumulate_checked(output, words.as_slice()?, weights.as_slice()?)?;
    Ok(())
}

/// Extracts one vector per document, releasing the GIL while worker threads run.
#[pyfunction]
#[pyo3(signature = (config, documents, workers = 1))]
pub fn extract_documents<'py>(
    py: Python<'py>,
    config: &str,
    documents: Vec<Vec<i64>>,
    workers: usize,
) -> PyResult<Vec<&'py PyArray1<f64>>> {
    let extractor = ExtractorConfig::from_json(config)?.build()?;
    let features = py.allow_threads(|| extractor.extract_parallel(&documents, workers))?;
    Ok(features
        .into_iter()
        .map(|fv| PyArray1::from_vec(py, fv.into_inner()))
        .collect())
}

#[pyclass]
pub struct PairwiseEntropyEngine {
    acc: DocumentAccumulator,
}

#[pymethods]
impl PairwiseEntropyEngine {
    #[new]
    pub fn new(config: &str) -> PyResult<Self> {
        let extractor = ExtractorConfig::from_json(config)?.build()?;
        Ok(Self {
            acc: extractor.accumulator(),
        })
    }

    pub fn push_tokens(&mut self, tokens: Vec<i64>) -> PyResult<()> {
        self.acc.push(&tokens)?;
        Ok(())
    }

    /// Returns the current document's vector and starts a new document.
    pub fn finish<'py>(&mut self, py: Python<'py>) -> PyResult<&'py PyArray1<f64>> {
        let fv = self.acc.finish()?;
        Ok(PyArray1::from_vec(py, fv.into_inner()))
    }

    #[getter]
    pub fn output_size(&self) -> usize {
        self.acc.extractor().output_size()
    }

    #[getter]
    pub fn window_size(&self) -> usize {
        self.acc.extractor().window_size()
    }
}

#[pymodule]
fn bookcore(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add("HASH_MULTIPLIER", kernel::MULTIPLIER)?;
    m.add_class::<PairwiseEntropyEngine>()?;
    m.add_function(wrap_pyfunction!(pairwise_entropies_window, m)?)?;
    m.add_function(wrap_pyfunction!(pairwise_entropies_window_checked, m)?)?;
    m.add_function(wrap_pyfunction!(extract_documents, m)?)?;
    Ok(())
}
