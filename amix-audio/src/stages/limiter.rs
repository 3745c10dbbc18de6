//! Output limiter: tanh soft clip, then whole-buffer peak normalization

use super::Stage;

/// Soft clip drive
const DRIVE: f32 = 1.2;

/// Peak the buffer is normalized down to
pub const CEILING: f32 = 0.95;

/// `tanh(x * 1.2) / 1.2`: near unity for small x, smooth above
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    (x * DRIVE).tanh() / DRIVE
}

/// Scale the buffer so its absolute peak does not exceed `ceiling`
///
/// Returns the applied gain (1.0 when the buffer was already below).
pub fn normalize_peak(samples: &mut [f32], ceiling: f32) -> f32 {
    let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
    if peak > ceiling {
        let gain = ceiling / peak;
        for sample in samples.iter_mut() {
            *sample *= gain;
        }
        gain
    } else {
        1.0
    }
}

/// Soft clip followed by peak normalization to `CEILING`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Limiter;

impl Limiter {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Limiter {
    fn process(&self, samples: &mut [f32], _sample_rate: u32) {
        for sample in samples.iter_mut() {
            *sample = soft_clip(*sample);
        }
        normalize_peak(samples, CEILING);
    }

    fn is_active(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "Limiter"
    }
}
