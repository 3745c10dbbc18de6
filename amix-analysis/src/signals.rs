//! Deterministic interleaved stereo test signals

use std::f32::consts::PI;

fn frame_count(sample_rate: u32, seconds: f32) -> usize {
    (sample_rate as f32 * seconds).round() as usize
}

/// Same sine on both channels
pub fn stereo_sine(freq: f32, amplitude: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
    stereo_sines(freq, freq, amplitude, sample_rate, seconds)
}

/// Independent sine per channel
pub fn stereo_sines(
    freq_left: f32,
    freq_right: f32,
    amplitude: f32,
    sample_rate: u32,
    seconds: f32,
) -> Vec<f32> {
    let frames = frame_count(sample_rate, seconds);
    let mut samples = Vec::with_capacity(frames * 2);

    for i in 0..frames {
        let t = i as f32 / sample_rate as f32;
        samples.push((2.0 * PI * freq_left * t).sin() * amplitude);
        samples.push((2.0 * PI * freq_right * t).sin() * amplitude);
    }

    samples
}

/// Single-frame impulse on both channels
pub fn impulse(frames: usize, at_frame: usize, amplitude: f32) -> Vec<f32> {
    let mut samples = vec![0.0; frames * 2];
    if at_frame < frames {
        samples[at_frame * 2] = amplitude;
        samples[at_frame * 2 + 1] = amplitude;
    }
    samples
}
