//! Distance attenuation

use super::Stage;

/// Scales the whole buffer by `1 / (1 + distance * 0.05)^1.5`
///
/// Precondition: `distance` is already inside its domain; the pipeline
/// resolves parameters before building stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    distance: f32,
}

impl Attenuation {
    const ROLLOFF: f32 = 0.05;
    const EXPONENT: f32 = 1.5;

    pub fn new(distance: f32) -> Self {
        Self { distance }
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Linear gain for the configured distance
    #[inline]
    pub fn factor(&self) -> f32 {
        1.0 / (1.0 + self.distance * Self::ROLLOFF).powf(Self::EXPONENT)
    }
}

impl Stage for Attenuation {
    fn process(&self, samples: &mut [f32], _sample_rate: u32) {
        let factor = self.factor();
        for sample in samples.iter_mut() {
            *sample *= factor;
        }
    }

    fn is_active(&self) -> bool {
        self.factor() != 1.0
    }

    fn name(&self) -> &'static str {
        "Attenuation"
    }
}
