//! Audio measurement for AMIX
//!
//! Provides level and stereo-image statistics, FFT spectral centroid,
//! waveform overviews, and deterministic test signals. Everything works on
//! plain interleaved stereo `&[f32]` slices.

mod levels;
pub mod signals;
mod spectrum;
mod waveform;

pub use levels::{left_channel, peak, right_channel, rms, LevelStats};
pub use spectrum::{spectral_centroid, CentroidAnalyzer};
pub use waveform::waveform_overview;
