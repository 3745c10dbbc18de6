//! Brightness-driven tone shaping
//!
//! Negative brightness runs a one-pole low-pass, positive brightness adds a
//! scaled one-pole high-pass back onto the signal. Both filters start from
//! zero state on every call.

use super::Stage;

/// Brightness magnitude below which the stage does nothing
const DEAD_ZONE: f32 = 0.05;

/// Resolved filter topology for a brightness value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneMode {
    /// Inside the dead zone
    Neutral,
    /// `y[i] = alpha * x[i] + (1 - alpha) * y[i-1]`
    Darken { alpha: f32 },
    /// `y[i] = x[i] + hp[i] * amount` where `hp` is a one-pole high-pass
    Brighten { hp_alpha: f32, amount: f32 },
}

impl ToneMode {
    pub fn from_brightness(brightness: f32) -> Self {
        if brightness.abs() <= DEAD_ZONE {
            ToneMode::Neutral
        } else if brightness < 0.0 {
            ToneMode::Darken {
                alpha: (0.1 + 0.9 * (1.0 + brightness)).clamp(0.1, 1.0),
            }
        } else {
            ToneMode::Brighten {
                hp_alpha: (0.85 - brightness * 0.3).clamp(0.4, 0.95),
                amount: brightness * 0.5,
            }
        }
    }
}

/// One-pole tone filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneFilter {
    brightness: f32,
    mode: ToneMode,
}

impl ToneFilter {
    pub fn new(brightness: f32) -> Self {
        Self {
            brightness,
            mode: ToneMode::from_brightness(brightness),
        }
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn mode(&self) -> ToneMode {
        self.mode
    }

    fn darken(samples: &mut [f32], alpha: f32) {
        let mut prev = [0.0f32; 2];
        for frame in samples.chunks_exact_mut(2) {
            for (sample, y_prev) in frame.iter_mut().zip(prev.iter_mut()) {
                let y = alpha * *sample + (1.0 - alpha) * *y_prev;
                *sample = y;
                *y_prev = y;
            }
        }
    }

    fn brighten(samples: &mut [f32], hp_alpha: f32, amount: f32) {
        let mut hp_prev = [0.0f32; 2];
        let mut x_prev = [0.0f32; 2];
        for frame in samples.chunks_exact_mut(2) {
            for ch in 0..2 {
                let x = frame[ch];
                let hp = hp_alpha * (hp_prev[ch] + x - x_prev[ch]);
                frame[ch] = x + hp * amount;
                hp_prev[ch] = hp;
                x_prev[ch] = x;
            }
        }
    }
}

impl Stage for ToneFilter {
    fn process(&self, samples: &mut [f32], _sample_rate: u32) {
        match self.mode {
            ToneMode::Neutral => {}
            ToneMode::Darken { alpha } => Self::darken(samples, alpha),
            ToneMode::Brighten { hp_alpha, amount } => Self::brighten(samples, hp_alpha, amount),
        }
    }

    fn is_active(&self) -> bool {
        self.mode != ToneMode::Neutral
    }

    fn name(&self) -> &'static str {
        "Tone"
    }
}
