//! Downsampled peak envelope for display

/// Peak envelope of `samples` in roughly `target_points` buckets
pub fn waveform_overview(samples: &[f32], target_points: usize) -> Vec<f32> {
    if samples.is_empty() || target_points == 0 {
        return vec![0.0; target_points];
    }

    let chunk_size = samples.len().div_ceil(target_points).max(1);

    samples
        .chunks(chunk_size)
        .map(|chunk| chunk.iter().map(|s| s.abs()).fold(0.0f32, f32::max))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(waveform_overview(&[], 4), vec![0.0; 4]);
    }

    #[test]
    fn test_bucket_peaks() {
        let samples = [0.1, -0.5, 0.2, 0.3, -0.9, 0.0, 0.4, 0.1];
        assert_eq!(waveform_overview(&samples, 4), vec![0.5, 0.3, 0.9, 0.4]);
    }

    #[test]
    fn test_never_exceeds_target() {
        let samples = vec![0.5; 1001];
        assert!(waveform_overview(&samples, 100).len() <= 100);
    }
}
