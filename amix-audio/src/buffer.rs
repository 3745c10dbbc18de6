//! Owned interleaved sample buffer

use crate::error::{PipelineError, Result};

/// Channel count the pipeline operates on
pub const STEREO: u16 = 2;

/// Interleaved f32 samples (L, R, L, R, ...) with their format
///
/// Invariant: `frames() * channels() == samples().len()`, `sample_rate() > 0`
/// and `channels() > 0`. Fields are private so the invariant holds for the
/// buffer's whole life.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer, checking the frame/channel accounting
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            return Err(PipelineError::invalid_buffer("channel count is zero"));
        }
        if sample_rate == 0 {
            return Err(PipelineError::invalid_buffer("sample rate is zero"));
        }
        if samples.len() % channels as usize != 0 {
            return Err(PipelineError::invalid_buffer(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }

        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    /// Create a stereo buffer from interleaved samples
    pub fn stereo(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::new(samples, STEREO, sample_rate)
    }

    /// Create a stereo buffer from separate left/right channels
    ///
    /// The shorter channel decides the frame count.
    pub fn from_channels(left: &[f32], right: &[f32], sample_rate: u32) -> Result<Self> {
        let samples = left
            .iter()
            .zip(right)
            .flat_map(|(&l, &r)| [l, r])
            .collect();
        Self::stereo(samples, sample_rate)
    }

    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Interleaved samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Mutable interleaved samples (length cannot change through a slice)
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Consume the buffer, returning the interleaved samples
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Samples of one channel, de-interleaved
    pub fn channel(&self, index: usize) -> impl Iterator<Item = f32> + '_ {
        self.samples
            .iter()
            .skip(index)
            .step_by(self.channels as usize)
            .copied()
    }

    /// Check the shape the pipeline requires: stereo and non-empty
    pub(crate) fn ensure_stereo(&self) -> Result<()> {
        if self.channels != STEREO {
            return Err(PipelineError::invalid_buffer(format!(
                "expected {} channels, got {}",
                STEREO, self.channels
            )));
        }
        if self.samples.is_empty() {
            return Err(PipelineError::invalid_buffer("buffer has no frames"));
        }
        Ok(())
    }

    /// Locate the first NaN or infinite sample
    pub(crate) fn ensure_finite(&self) -> Result<()> {
        match self.samples.iter().position(|s| !s.is_finite()) {
            Some(index) => {
                let channels = self.channels as usize;
                Err(PipelineError::NonFiniteSample {
                    frame: index / channels,
                    channel: index % channels,
                })
            }
            None => Ok(()),
        }
    }
}
