//! Level and stereo image statistics

/// Absolute peak of a slice
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}

/// Root mean square of a slice (0.0 for an empty slice)
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64).sqrt() as f32
}

/// Left channel of interleaved stereo
pub fn left_channel(samples: &[f32]) -> Vec<f32> {
    samples.iter().step_by(2).copied().collect()
}

/// Right channel of interleaved stereo
pub fn right_channel(samples: &[f32]) -> Vec<f32> {
    samples.iter().skip(1).step_by(2).copied().collect()
}

/// Summary of an interleaved stereo buffer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LevelStats {
    /// Absolute peak over both channels
    pub peak: f32,
    /// RMS over both channels
    pub rms: f32,
    pub rms_left: f32,
    pub rms_right: f32,
    /// Pearson correlation of L and R (+1 mono, 0 uncorrelated, -1 inverted)
    pub correlation: f32,
    /// Side RMS divided by mid RMS (0 for mono)
    pub side_to_mid: f32,
}

impl LevelStats {
    /// Measure interleaved stereo samples (a trailing odd sample is ignored)
    pub fn measure(samples: &[f32]) -> Self {
        let frames = samples.len() / 2;
        if frames == 0 {
            return Self {
                correlation: 1.0,
                ..Self::default()
            };
        }

        let n = frames as f64;
        let (mut sum_l, mut sum_r) = (0.0f64, 0.0f64);
        let (mut sq_l, mut sq_r, mut cross) = (0.0f64, 0.0f64, 0.0f64);
        let (mut sq_mid, mut sq_side) = (0.0f64, 0.0f64);
        let mut peak = 0.0f32;

        for frame in samples.chunks_exact(2) {
            let (l, r) = (frame[0] as f64, frame[1] as f64);
            sum_l += l;
            sum_r += r;
            sq_l += l * l;
            sq_r += r * r;
            cross += l * r;
            let mid = (l + r) * 0.5;
            let side = (l - r) * 0.5;
            sq_mid += mid * mid;
            sq_side += side * side;
            peak = peak.max(frame[0].abs()).max(frame[1].abs());
        }

        let cov = cross / n - (sum_l / n) * (sum_r / n);
        let var_l = sq_l / n - (sum_l / n).powi(2);
        let var_r = sq_r / n - (sum_r / n).powi(2);
        let correlation = if var_l <= 1e-18 || var_r <= 1e-18 {
            // Silent or DC channel: treat identical channels as mono
            if (sq_side / n) <= 1e-18 {
                1.0
            } else {
                0.0
            }
        } else {
            (cov / (var_l.sqrt() * var_r.sqrt())).clamp(-1.0, 1.0)
        };

        let rms_mid = (sq_mid / n).sqrt();
        let rms_side = (sq_side / n).sqrt();

        Self {
            peak,
            rms: ((sq_l + sq_r) / (2.0 * n)).sqrt() as f32,
            rms_left: (sq_l / n).sqrt() as f32,
            rms_right: (sq_r / n).sqrt() as f32,
            correlation: correlation as f32,
            side_to_mid: if rms_mid > 0.0 {
                (rms_side / rms_mid) as f32
            } else {
                0.0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{stereo_sine, stereo_sines};

    #[test]
    fn test_peak_and_rms() {
        assert_eq!(peak(&[0.1, -0.7, 0.3]), 0.7);
        assert_eq!(rms(&[]), 0.0);
        assert!((rms(&[1.0, -1.0, 1.0, -1.0]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sine_rms() {
        let samples = stereo_sine(1000.0, 0.5, 48000, 1.0);
        let stats = LevelStats::measure(&samples);
        let expected = 0.5 / 2.0f32.sqrt();
        assert!((stats.rms - expected).abs() < 1e-3);
        assert!((stats.peak - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_mono_signal_correlation() {
        let samples = stereo_sine(440.0, 0.5, 48000, 0.1);
        let stats = LevelStats::measure(&samples);
        assert!((stats.correlation - 1.0).abs() < 1e-6);
        assert!(stats.side_to_mid < 1e-6);
    }

    #[test]
    fn test_inverted_channels() {
        let samples: Vec<f32> = stereo_sine(440.0, 0.5, 48000, 0.1)
            .chunks(2)
            .flat_map(|f| [f[0], -f[1]])
            .collect();
        let stats = LevelStats::measure(&samples);
        assert!((stats.correlation + 1.0).abs() < 1e-6);
        assert_eq!(stats.side_to_mid, 0.0);
    }

    #[test]
    fn test_uncorrelated_sines() {
        let samples = stereo_sines(440.0, 1330.0, 0.5, 48000, 1.0);
        let stats = LevelStats::measure(&samples);
        assert!(stats.correlation.abs() < 0.05, "correlation {}", stats.correlation);
        assert!((stats.side_to_mid - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_silence() {
        let stats = LevelStats::measure(&[0.0; 64]);
        assert_eq!(stats.peak, 0.0);
        assert_eq!(stats.correlation, 1.0);
    }

    #[test]
    fn test_channel_split() {
        let samples = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(left_channel(&samples), vec![1.0, 3.0]);
        assert_eq!(right_channel(&samples), vec![2.0, 4.0]);
    }
}
