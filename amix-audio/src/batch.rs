//! Parallel rendering of one buffer under many parameter sets

use std::num::NonZeroUsize;
use std::thread;

use crossbeam_channel::{self, Receiver, Sender};

use crate::buffer::AudioBuffer;
use crate::error::Result;
use crate::params::MainParams;
use crate::pipeline::Pipeline;

/// Renders independent `Pipeline::process` calls on worker threads
///
/// The input buffer is shared read-only; each job owns its output. Results
/// are returned in variant order and equal what sequential calls produce.
#[derive(Debug, Clone, Copy)]
pub struct BatchRenderer {
    pipeline: Pipeline,
    workers: usize,
}

impl BatchRenderer {
    /// Create a renderer with `workers` threads (at least one)
    pub fn new(pipeline: Pipeline, workers: usize) -> Self {
        Self {
            pipeline,
            workers: workers.max(1),
        }
    }

    /// One worker per available CPU
    pub fn with_available_parallelism(pipeline: Pipeline) -> Self {
        let workers = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self::new(pipeline, workers)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Process `buffer` once per entry of `variants`
    pub fn render(&self, buffer: &AudioBuffer, variants: &[MainParams]) -> Vec<Result<AudioBuffer>> {
        if variants.is_empty() {
            return Vec::new();
        }

        let thread_count = self.workers.min(variants.len());
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<usize>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();

        for index in 0..variants.len() {
            // Receiver is alive until the scope below ends
            let _ = job_tx.send(index);
        }
        drop(job_tx);

        tracing::debug!(
            "Rendering {} variants of {} frames on {} workers",
            variants.len(),
            buffer.frames(),
            thread_count
        );

        thread::scope(|scope| {
            for _ in 0..thread_count {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    self.run_worker(buffer, variants, &job_rx, &result_tx);
                });
            }
        });
        drop(result_tx);

        let mut results: Vec<Option<Result<AudioBuffer>>> = Vec::with_capacity(variants.len());
        results.resize_with(variants.len(), || None);
        for (index, result) in result_rx.iter() {
            results[index] = Some(result);
        }

        results.into_iter().flatten().collect()
    }

    fn run_worker(
        &self,
        buffer: &AudioBuffer,
        variants: &[MainParams],
        jobs: &Receiver<usize>,
        results: &Sender<(usize, Result<AudioBuffer>)>,
    ) {
        for index in jobs.iter() {
            let result = self.pipeline.process(buffer, &variants[index]);
            if results.send((index, result)).is_err() {
                break;
            }
        }
    }
}
