//! Document-level drivers that walk token streams in windows and feed the
//! kernel, one output vector per document.

use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::error::{ExtractError, KernelError};
use crate::features::FeatureVec;
use crate::kernel;
use crate::weighting::WeightingWindow;

/// How a token stream is cut into windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    /// Every full run of `window_size` consecutive tokens, advancing by one.
    #[default]
    Sliding,
    /// Non-overlapping chunks; a trailing partial chunk is kept.
    Fixed,
}

/// Turns a token stream into one hashed pairwise-entropy vector per document.
#[derive(Debug, Clone)]
pub struct PairwiseEntropyExtractor {
    weighting: WeightingWindow,
    output_size: usize,
    grouping: Grouping,
    strict: bool,
}

impl PairwiseEntropyExtractor {
    pub fn new(weighting: WeightingWindow, output_size: usize) -> Result<Self, ExtractError> {
        if output_size == 0 {
            return Err(ExtractError::ZeroOutputSize);
        }
        Ok(Self {
            weighting,
            output_size,
            grouping: Grouping::default(),
            strict: false,
        })
    }

    pub fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }

    /// Route windows through [`kernel::accumulate_checked`] instead of the
    /// permissive kernel.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn window_size(&self) -> usize {
        self.weighting.len()
    }

    pub fn grouping(&self) -> Grouping {
        self.grouping
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn weighting(&self) -> &WeightingWindow {
        &self.weighting
    }

    #[inline(always)]
    fn apply(&self, output: &mut [f64], words: &[i64]) -> Result<(), KernelError> {
        // Partial fixed groups take the leading weights.
        let weights = &self.weighting.as_slice()[..words.len()];
        if self.strict {
            if let Err(err) = kernel::accumulate_checked(output, words, weights) {
                warn!(error = %err, window = words.len(), "rejected window");
                return Err(err);
            }
        } else {
            kernel::accumulate(output, words, weights);
        }
        Ok(())
    }

    pub fn extract_from(&self, tokens: &[i64]) -> Result<FeatureVec, ExtractError> {
        let mut fv = FeatureVec::new(self.output_size);
        let size = self.window_size();
        let mut windows = 0usize;
        match self.grouping {
            Grouping::Sliding => {
                for words in tokens.windows(size) {
                    self.apply(fv.as_mut_slice(), words)?;
                    windows += 1;
                }
            }
            Grouping::Fixed => {
                for words in tokens.chunks(size) {
                    self.apply(fv.as_mut_slice(), words)?;
                    windows += 1;
                }
            }
        }
        trace!(tokens = tokens.len(), windows, "extracted document");
        Ok(fv)
    }

    pub fn extract_many<D: AsRef<[i64]>>(&self, docs: &[D]) -> Result<Vec<FeatureVec>, ExtractError> {
        docs.iter().map(|doc| self.extract_from(doc.as_ref())).collect()
    }

    /// Same result as [`Self::extract_many`], spread over `workers` threads.
    ///
    /// Every document gets its own output vector, so no slot is shared
    /// between threads.
    pub fn extract_parallel<D>(&self, docs: &[D], workers: usize) -> Result<Vec<FeatureVec>, ExtractError>
    where
        D: AsRef<[i64]> + Sync,
    {
        let workers = workers.clamp(1, docs.len().max(1));
        debug!(documents = docs.len(), workers, "parallel extraction");

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<usize>();
        for idx in 0..docs.len() {
            job_tx.send(idx).map_err(|_| ExtractError::WorkerDisconnected)?;
        }
        drop(job_tx);

        let (res_tx, res_rx) = crossbeam_channel::unbounded();
        std::thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let res_tx = res_tx.clone();
                scope.spawn(move || {
                    for idx in job_rx.iter() {
                        let result = self.extract_from(docs[idx].as_ref());
                        if res_tx.send((idx, result)).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(res_tx);

        let mut slots: Vec<Option<FeatureVec>> = vec![None; docs.len()];
        for (idx, result) in res_rx.iter() {
            slots[idx] = Some(result?);
        }
        slots
            .into_iter()
            .map(|slot| slot.ok_or(ExtractError::WorkerDisconnected))
            .collect()
    }

    pub fn accumulator(&self) -> DocumentAccumulator {
        DocumentAccumulator::new(self.clone())
    }
}

/// Streaming form of [`PairwiseEntropyExtractor::extract_from`].
///
/// Tokens may arrive in arbitrary pieces; windows span `push` boundaries.
/// A rejected window fails the whole document: the partial vector is
/// dropped, later pushes are ignored and `finish` returns the error.
#[derive(Debug)]
pub struct DocumentAccumulator {
    extractor: PairwiseEntropyExtractor,
    pending: Vec<i64>,
    fv: FeatureVec,
    failed: Option<KernelError>,
}

impl DocumentAccumulator {
    pub fn new(extractor: PairwiseEntropyExtractor) -> Self {
        let fv = FeatureVec::new(extractor.output_size());
        Self {
            extractor,
            pending: Vec::new(),
            fv,
            failed: None,
        }
    }

    pub fn extractor(&self) -> &PairwiseEntropyExtractor {
        &self.extractor
    }

    pub fn push(&mut self, tokens: &[i64]) -> Result<(), ExtractError> {
        if self.failed.is_some() {
            return Ok(());
        }
        let size = self.extractor.window_size();
        self.pending.extend_from_slice(tokens);

        let (consumed, result) = match self.extractor.grouping() {
            Grouping::Sliding => {
                if self.pending.len() < size {
                    return Ok(());
                }
                let result = self
                    .pending
                    .windows(size)
                    .try_for_each(|words| self.extractor.apply(self.fv.as_mut_slice(), words));
                // Keep the last `size - 1` tokens to start the next window.
                (self.pending.len() + 1 - size, result)
            }
            Grouping::Fixed => {
                let full = self.pending.len() / size * size;
                let result = self.pending[..full]
                    .chunks_exact(size)
                    .try_for_each(|words| self.extractor.apply(self.fv.as_mut_slice(), words));
                (full, result)
            }
        };
        self.pending.drain(..consumed);
        if let Err(err) = result {
            self.pending.clear();
            self.fv.reset();
            self.failed = Some(err.clone());
            return Err(err.into());
        }
        Ok(())
    }

    /// Flushes a trailing fixed group, returns the document's vector and
    /// starts a fresh one.
    pub fn finish(&mut self) -> Result<FeatureVec, ExtractError> {
        let tail = std::mem::take(&mut self.pending);
        let mut fv = std::mem::replace(&mut self.fv, FeatureVec::new(self.extractor.output_size()));
        if let Some(err) = self.failed.take() {
            return Err(err.into());
        }
        if self.extractor.grouping() == Grouping::Fixed && !tail.is_empty() {
            self.extractor.apply(fv.as_mut_slice(), &tail)?;
        }
        Ok(fv)
    }
}
