//! Processing stages for AMIX
//!
//! Each stage holds nothing but its resolved parameters. Filter state and
//! scratch buffers live inside a single `process` call, so a stage can be
//! shared between threads and reused in any order.

mod attenuation;
mod limiter;
mod reverb;
mod tone;
mod width;

pub use attenuation::Attenuation;
pub use limiter::{normalize_peak, soft_clip, Limiter, CEILING};
pub use reverb::{Reverb, ReverbTap};
pub use tone::{ToneFilter, ToneMode};
pub use width::StereoWidth;

/// A stereo transform over interleaved samples
pub trait Stage: Send + Sync {
    /// Process interleaved stereo samples (L, R, L, R, ...) in place
    fn process(&self, samples: &mut [f32], sample_rate: u32);

    /// Whether `process` changes the signal at the current settings
    fn is_active(&self) -> bool;

    /// Stage name (for logging)
    fn name(&self) -> &'static str;
}
