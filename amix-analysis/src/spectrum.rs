//! FFT spectral centroid (perceived brightness)

use rustfft::{num_complex::Complex, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Frame size used by `spectral_centroid`
const DEFAULT_FFT_SIZE: usize = 2048;

/// Frame-averaged spectral centroid analyzer
pub struct CentroidAnalyzer {
    sample_rate: u32,
    fft_size: usize,
    fft: Arc<dyn rustfft::Fft<f32>>,
    window: Vec<f32>,
    fft_buffer: Vec<Complex<f32>>,
}

impl CentroidAnalyzer {
    /// Create an analyzer with a power-of-two frame size
    pub fn new(sample_rate: u32, fft_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        // Pre-compute Hann window
        let window: Vec<f32> = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / fft_size as f32).cos()))
            .collect();

        Self {
            sample_rate,
            fft_size,
            fft,
            window,
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
        }
    }

    /// Magnitude-weighted mean frequency of one frame, with its total magnitude
    fn frame_centroid(&mut self, frame: &[f32]) -> (f64, f64) {
        for (i, (buf, &sample)) in self.fft_buffer.iter_mut().zip(frame).enumerate() {
            *buf = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.fft_buffer);

        let bin_width = self.sample_rate as f64 / self.fft_size as f64;
        let mut weighted = 0.0f64;
        let mut total = 0.0f64;
        for (bin, c) in self.fft_buffer[..self.fft_size / 2].iter().enumerate() {
            let magnitude = c.norm() as f64;
            weighted += magnitude * bin as f64 * bin_width;
            total += magnitude;
        }
        (weighted, total)
    }

    /// Centroid in Hz over non-overlapping frames of mono `samples`
    ///
    /// Frames are weighted by their spectral magnitude, so quiet frames count
    /// less. Returns `None` for silence or input shorter than one frame.
    pub fn analyze(&mut self, samples: &[f32]) -> Option<f32> {
        let mut weighted = 0.0f64;
        let mut total = 0.0f64;

        for frame in samples.chunks_exact(self.fft_size) {
            let (w, t) = self.frame_centroid(frame);
            weighted += w;
            total += t;
        }

        (total > 1e-9).then(|| (weighted / total) as f32)
    }
}

/// Spectral centroid of mono samples using 2048-point frames
pub fn spectral_centroid(samples: &[f32], sample_rate: u32) -> Option<f32> {
    CentroidAnalyzer::new(sample_rate, DEFAULT_FFT_SIZE).analyze(samples)
}
