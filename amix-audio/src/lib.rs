//! Processing core for AMIX - buffer, parameters, stages and pipeline
//!
//! This crate turns a stereo PCM buffer plus six physical mix parameters
//! into a processed buffer:
//! - Attenuation: distance-derived gain
//! - Tone: one-pole darken / high-frequency emphasis
//! - Width: mid/side scaling
//! - Reverb: five early-reflection taps with optional box diffusion
//! - Limiter: tanh soft clip and peak normalization
//!
//! Everything here is a pure function of (buffer, params, sample rate).
//!
//! ```
//! use amix_audio::{AudioBuffer, MainParams, Pipeline};
//!
//! let samples = vec![0.25f32; 2 * 480];
//! let buffer = AudioBuffer::stereo(samples, 48000).unwrap();
//! let output = Pipeline::default()
//!     .process(&buffer, &MainParams::default())
//!     .unwrap();
//! assert_eq!(output.frames(), buffer.frames());
//! ```

mod batch;
mod buffer;
mod error;
mod params;
mod pipeline;
pub mod stages;

pub use batch::BatchRenderer;
pub use buffer::{AudioBuffer, STEREO};
pub use error::{PipelineError, Result};
pub use params::{MainParams, ParamPolicy, ParamRange};
pub use pipeline::{Pipeline, PipelineConfig};
pub use stages::{
    Attenuation, Limiter, Reverb, ReverbTap, Stage, StereoWidth, ToneFilter, ToneMode,
};
