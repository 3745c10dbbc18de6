//! Mid/side stereo width

use super::Stage;

/// Width deviation from unity treated as "no change"
const UNITY_TOLERANCE: f32 = 0.01;

/// Scales the side channel of an M/S decomposition
///
/// - width 0.0: mono (both channels carry the mid signal)
/// - width 1.0: unchanged
/// - width 2.0: side doubled
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoWidth {
    width: f32,
}

impl StereoWidth {
    pub fn new(width: f32) -> Self {
        Self { width }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// L/R to M/S encode
    #[inline]
    pub fn encode_ms(left: f32, right: f32) -> (f32, f32) {
        let mid = (left + right) * 0.5;
        let side = (left - right) * 0.5;
        (mid, side)
    }

    /// M/S to L/R decode
    #[inline]
    pub fn decode_ms(mid: f32, side: f32) -> (f32, f32) {
        (mid + side, mid - side)
    }
}

impl Stage for StereoWidth {
    fn process(&self, samples: &mut [f32], _sample_rate: u32) {
        if !self.is_active() {
            return;
        }

        for frame in samples.chunks_exact_mut(2) {
            let (mid, side) = Self::encode_ms(frame[0], frame[1]);
            let (left, right) = Self::decode_ms(mid, side * self.width);
            frame[0] = left;
            frame[1] = right;
        }
    }

    fn is_active(&self) -> bool {
        (self.width - 1.0).abs() > UNITY_TOLERANCE
    }

    fn name(&self) -> &'static str {
        "Width"
    }
}
