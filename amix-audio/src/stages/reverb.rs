//! Early-reflection reverb
//!
//! Five discrete taps whose spacing grows with room size, followed by a
//! box-filter blur for larger rooms:
//!
//! ```text
//! dry ─┬──────────────────────────────────── × dry_gain ─┐
//!      └→ Σ taps (delay_k, gain_k) → [box blur] × wet_gain ─┴→ out
//! ```
//!
//! The blur is a cheap stand-in for echo density, not a room model.
//! Changing it changes output values and counts as a behavior change.

use super::Stage;

/// Tap delay multiples of the base delay
const TAP_RATIOS: [f64; 5] = [1.0, 1.7, 2.8, 4.3, 6.0];

/// Tap gains, decreasing with tap index
const TAP_GAINS: [f32; 5] = [0.35, 0.25, 0.18, 0.12, 0.08];

/// Base delay for an empty room, in seconds
const MIN_BASE_DELAY_SECS: f64 = 0.02;

/// Extra base delay at room size 1.0, in seconds
const ROOM_DELAY_SPAN_SECS: f64 = 0.08;

/// Dry/wet mix at or below which the stage is bypassed
const BYPASS_DRY_WET: f32 = 0.05;

/// Room size above which the wet signal is blurred
const DIFFUSION_THRESHOLD: f32 = 0.3;

/// One early reflection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbTap {
    pub delay_seconds: f64,
    pub gain: f32,
}

impl ReverbTap {
    /// Delay rounded to the nearest whole sample
    pub fn delay_samples(&self, sample_rate: u32) -> usize {
        (self.delay_seconds * sample_rate as f64).round() as usize
    }
}

/// Multi-tap reverb with dry/wet crossfade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reverb {
    room_size: f32,
    dry_wet: f32,
    intensity: f32,
}

impl Reverb {
    pub fn new(room_size: f32, dry_wet: f32, intensity: f32) -> Self {
        Self {
            room_size,
            dry_wet,
            intensity,
        }
    }

    pub fn room_size(&self) -> f32 {
        self.room_size
    }

    /// Spacing unit for the taps, in seconds
    pub fn base_delay_secs(&self) -> f64 {
        MIN_BASE_DELAY_SECS + self.room_size as f64 * ROOM_DELAY_SPAN_SECS
    }

    /// The five taps for the configured room size
    pub fn taps(&self) -> [ReverbTap; 5] {
        let base = self.base_delay_secs();
        std::array::from_fn(|i| ReverbTap {
            delay_seconds: base * TAP_RATIOS[i],
            gain: TAP_GAINS[i],
        })
    }

    /// Box kernel length, or `None` when the room is too small to blur
    pub fn diffusion_len(&self) -> Option<usize> {
        if self.room_size > DIFFUSION_THRESHOLD {
            let len = (self.room_size * 100.0).round() as usize;
            (len > 0).then_some(len)
        } else {
            None
        }
    }

    /// Gain applied to the unprocessed signal
    pub fn dry_gain(&self) -> f32 {
        1.0 - self.dry_wet * 0.7
    }

    /// Gain applied to the tap sum
    pub fn wet_gain(&self) -> f32 {
        self.dry_wet * self.intensity
    }

    /// Sum of delayed, scaled copies of `dry`
    fn build_wet(&self, dry: &[f32], sample_rate: u32) -> Vec<f32> {
        let mut wet = vec![0.0f32; dry.len()];
        let frames = dry.len() / 2;

        for tap in self.taps() {
            let delay = tap.delay_samples(sample_rate);
            if delay >= frames {
                continue;
            }
            let offset = delay * 2;
            for (w, &d) in wet[offset..].iter_mut().zip(dry) {
                *w += tap.gain * d;
            }
        }

        wet
    }

    /// Same-length centered moving average on one channel of `wet`
    ///
    /// Output frame `n` averages input frames `n - len/2 ..= n + (len-1)/2`
    /// with zeros beyond the buffer edges; the divisor is always `len`.
    fn diffuse(wet: &mut [f32], channel: usize, len: usize, scratch: &mut Vec<f32>) {
        scratch.clear();
        scratch.extend(wet.iter().skip(channel).step_by(2));
        let frames = scratch.len();

        let behind = len / 2;
        let ahead = (len - 1) / 2;
        let norm = 1.0 / len as f64;

        // Running window sum over [n - behind, n + ahead]
        let mut sum: f64 = scratch[..ahead.min(frames)].iter().map(|&s| s as f64).sum();
        for n in 0..frames {
            if let Some(&entering) = scratch.get(n + ahead) {
                sum += entering as f64;
            }
            if n > behind {
                sum -= scratch[n - behind - 1] as f64;
            }
            wet[n * 2 + channel] = (sum * norm) as f32;
        }
    }
}

impl Stage for Reverb {
    fn process(&self, samples: &mut [f32], sample_rate: u32) {
        if !self.is_active() {
            return;
        }

        let mut wet = self.build_wet(samples, sample_rate);

        if let Some(len) = self.diffusion_len() {
            let mut scratch = Vec::with_capacity(samples.len() / 2);
            for channel in 0..2 {
                Self::diffuse(&mut wet, channel, len, &mut scratch);
            }
        }

        let dry_gain = self.dry_gain();
        let wet_gain = self.wet_gain();
        for (sample, w) in samples.iter_mut().zip(&wet) {
            *sample = dry_gain * *sample + wet_gain * w;
        }
    }

    fn is_active(&self) -> bool {
        self.dry_wet > BYPASS_DRY_WET
    }

    fn name(&self) -> &'static str {
        "Reverb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amix_analysis::signals::{impulse, stereo_sines};

    #[test]
    fn test_tap_delays_at_half_room() {
        let reverb = Reverb::new(0.5, 0.4, 0.6);
        let delays: Vec<usize> = reverb.taps().iter().map(|t| t.delay_samples(48000)).collect();
        assert_eq!(delays, vec![2880, 4896, 8064, 12384, 17280]);

        let gains: Vec<f32> = reverb.taps().iter().map(|t| t.gain).collect();
        assert_eq!(gains, TAP_GAINS.to_vec());
    }

    #[test]
    fn test_bypass_at_low_mix() {
        for dry_wet in [0.0, 0.02, 0.05] {
            let reverb = Reverb::new(0.8, dry_wet, 1.0);
            let mut samples = stereo_sines(440.0, 440.0, 0.5, 48000, 0.1);
            let original = samples.clone();
            reverb.process(&mut samples, 48000);
            assert_eq!(samples, original, "dry_wet {} was not a bypass", dry_wet);
        }
    }

    #[test]
    fn test_impulse_response_without_diffusion() {
        // Small room: taps only, no blur
        let reverb = Reverb::new(0.0, 1.0, 1.0);
        assert_eq!(reverb.diffusion_len(), None);

        let mut samples = impulse(1000, 0, 1.0);
        reverb.process(&mut samples, 1000);

        let dry_gain = reverb.dry_gain();
        assert!((samples[0] - dry_gain).abs() < 1e-6);

        // base delay 20ms at 1 kHz = 20 samples
        let expected = [(20, 0.35), (34, 0.25), (56, 0.18), (86, 0.12), (120, 0.08)];
        for (frame, gain) in expected {
            assert!(
                (samples[frame * 2] - gain).abs() < 1e-6,
                "tap at frame {} = {}, expected {}",
                frame,
                samples[frame * 2],
                gain
            );
            assert_eq!(samples[frame * 2], samples[frame * 2 + 1]);
        }

        let energy_elsewhere: f32 = samples
            .chunks(2)
            .enumerate()
            .filter(|(i, _)| *i != 0 && !expected.iter().any(|(f, _)| f == i))
            .map(|(_, c)| c[0].abs())
            .sum();
        assert_eq!(energy_elsewhere, 0.0);
    }

    #[test]
    fn test_taps_beyond_buffer_are_dropped() {
        let reverb = Reverb::new(0.0, 1.0, 1.0);
        // 30 frames at 1 kHz: only the 20-sample tap fits
        let mut samples = impulse(30, 0, 1.0);
        reverb.process(&mut samples, 1000);

        assert!((samples[40] - 0.35).abs() < 1e-6);
        assert_eq!(samples.len(), 60);
    }

    #[test]
    fn test_diffusion_kernel_length() {
        assert_eq!(Reverb::new(0.3, 0.5, 0.5).diffusion_len(), None);
        assert_eq!(Reverb::new(0.5, 0.5, 0.5).diffusion_len(), Some(50));
        assert_eq!(Reverb::new(1.0, 0.5, 0.5).diffusion_len(), Some(100));
    }

    #[test]
    fn test_diffuse_matches_centered_box() {
        let frames = 40;
        let len = 6;
        let mut wet: Vec<f32> = (0..frames).flat_map(|i| [i as f32, -(i as f32)]).collect();
        let original = wet.clone();
        let mut scratch = Vec::new();
        Reverb::diffuse(&mut wet, 0, len, &mut scratch);

        for n in 0..frames {
            let lo = n as isize - (len / 2) as isize;
            let hi = n as isize + ((len - 1) / 2) as isize;
            let sum: f32 = (lo..=hi)
                .filter(|&j| j >= 0 && (j as usize) < frames)
                .map(|j| original[j as usize * 2])
                .sum();
            let expected = sum / len as f32;
            assert!(
                (wet[n * 2] - expected).abs() < 1e-4,
                "frame {}: {} vs {}",
                n,
                wet[n * 2],
                expected
            );
        }

        // Other channel untouched
        for n in 0..frames {
            assert_eq!(wet[n * 2 + 1], original[n * 2 + 1]);
        }
    }

    #[test]
    fn test_diffusion_spreads_tap_energy() {
        let reverb = Reverb::new(0.5, 1.0, 1.0);
        let mut samples = impulse(2000, 0, 1.0);
        reverb.process(&mut samples, 1000);

        // First tap at round(0.06 * 1000) = 60 frames, blurred over frames 36..=85
        let tap = samples[60 * 2];
        assert!((tap - 0.35 / 50.0).abs() < 1e-6, "blurred tap = {}", tap);
        assert!((samples[36 * 2] - 0.35 / 50.0).abs() < 1e-6);
        assert!(samples[35 * 2].abs() < 1e-6);
    }

    #[test]
    fn test_mix_gains() {
        let reverb = Reverb::new(0.5, 0.4, 0.6);
        assert!((reverb.dry_gain() - 0.72).abs() < 1e-6);
        assert!((reverb.wet_gain() - 0.24).abs() < 1e-6);
    }
}
