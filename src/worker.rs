//! Single-writer accumulation for windows produced on several threads.
//!
//! The kernel's scatter-add is not atomic, so one thread owns the output
//! vector and every producer hands it windows over a channel.

use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use tracing::debug;

use crate::error::ExtractError;
use crate::event::Event;
use crate::features::FeatureVec;
use crate::kernel;

pub struct WindowWorker {
    tx: Sender<Event>,
    handle: JoinHandle<FeatureVec>,
}

impl WindowWorker {
    pub fn spawn(output_size: usize) -> Result<Self, ExtractError> {
        if output_size == 0 {
            return Err(ExtractError::ZeroOutputSize);
        }
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = std::thread::spawn(move || run(rx, output_size));
        debug!(output_size, "spawned window worker");
        Ok(Self { tx, handle })
    }

    /// A cloneable handle for producer threads.
    pub fn sender(&self) -> WindowSender {
        WindowSender {
            tx: self.tx.clone(),
        }
    }

    pub fn submit(&self, words: Vec<i64>, weights: Vec<f64>) -> Result<(), ExtractError> {
        send(&self.tx, Event::Window { words, weights })
    }

    /// Blocks until every window submitted before this call has been applied.
    pub fn flush(&self) -> Result<(), ExtractError> {
        let (ack, done) = crossbeam_channel::bounded(1);
        send(&self.tx, Event::Flush { ack })?;
        done.recv().map_err(|_| ExtractError::WorkerDisconnected)
    }

    /// Waits for every outstanding window, including those from live
    /// [`WindowSender`]s, then returns the accumulated vector.
    pub fn finish(self) -> Result<FeatureVec, ExtractError> {
        drop(self.tx);
        let fv = self.handle.join().map_err(|_| ExtractError::WorkerPanicked)?;
        debug!(output_size = fv.len(), "window worker finished");
        Ok(fv)
    }
}

#[derive(Clone)]
pub struct WindowSender {
    tx: Sender<Event>,
}

impl WindowSender {
    pub fn submit(&self, words: Vec<i64>, weights: Vec<f64>) -> Result<(), ExtractError> {
        send(&self.tx, Event::Window { words, weights })
    }
}

fn send(tx: &Sender<Event>, evt: Event) -> Result<(), ExtractError> {
    tx.send(evt).map_err(|_| ExtractError::WorkerDisconnected)
}

fn run(rx: Receiver<Event>, output_size: usize) -> FeatureVec {
    let mut fv = FeatureVec::new(output_size);
    let mut windows = 0u64;
    for evt in rx.iter() {
        match evt {
            Event::Window { words, weights } => {
                // The permissive kernel panics on these; never take the worker down.
                if words.is_empty() {
                    continue;
                }
                kernel::accumulate(fv.as_mut_slice(), &words, &weights);
                windows += 1;
            }
            Event::Flush { ack } => {
                let _ = ack.send(());
            }
        }
    }
    debug!(windows, "window worker drained");
    fv
}
