//! Fixed five-stage processing pipeline
//!
//! Signal flow:
//! ```text
//! Input → Attenuation → Tone → Width → Reverb → Limiter → Output
//! ```
//!
//! Width runs before reverb so the reflections inherit the final stereo
//! image; the limiter runs last so nothing after it can exceed the ceiling.

use crate::buffer::AudioBuffer;
use crate::error::Result;
use crate::params::{MainParams, ParamPolicy};
use crate::stages::{Attenuation, Limiter, Reverb, Stage, StereoWidth, ToneFilter};

/// Pipeline behavior that is not part of the mix parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Treatment of out-of-domain parameters at entry
    pub param_policy: ParamPolicy,
}

/// The five stages configured for one parameter set
struct StageChain {
    attenuation: Attenuation,
    tone: ToneFilter,
    width: StereoWidth,
    reverb: Reverb,
    limiter: Limiter,
}

impl StageChain {
    fn from_params(params: &MainParams) -> Self {
        Self {
            attenuation: Attenuation::new(params.distance),
            tone: ToneFilter::new(params.brightness),
            width: StereoWidth::new(params.width),
            reverb: Reverb::new(params.room_size, params.dry_wet, params.intensity),
            limiter: Limiter::new(),
        }
    }

    /// Stages in signal flow order
    fn stages(&self) -> [&dyn Stage; 5] {
        [
            &self.attenuation,
            &self.tone,
            &self.width,
            &self.reverb,
            &self.limiter,
        ]
    }
}

/// Stateless stereo post-processing pipeline
///
/// `process` is a pure function of (buffer, params): no state survives a
/// call, so one `Pipeline` can be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process a copy of `buffer`, leaving the input untouched
    pub fn process(&self, buffer: &AudioBuffer, params: &MainParams) -> Result<AudioBuffer> {
        let mut output = buffer.clone();
        self.process_in_place(&mut output, params)?;
        Ok(output)
    }

    /// Process `buffer` in place
    ///
    /// All checks run before the first stage, so on error the buffer is
    /// unchanged.
    pub fn process_in_place(&self, buffer: &mut AudioBuffer, params: &MainParams) -> Result<()> {
        buffer.ensure_stereo()?;
        buffer.ensure_finite()?;
        let params = params.resolve(self.config.param_policy)?;

        let sample_rate = buffer.sample_rate();
        let chain = StageChain::from_params(&params);

        tracing::debug!(
            "Processing {} frames at {} Hz through [{}]",
            buffer.frames(),
            sample_rate,
            Self::active_names(&chain).join(", ")
        );

        let samples = buffer.samples_mut();
        for stage in chain.stages() {
            stage.process(samples, sample_rate);
        }

        Ok(())
    }

    /// Names of the stages that will change the signal for `params`
    ///
    /// Parameters are resolved with the configured policy first; an
    /// unresolvable set yields the error the pipeline would raise.
    pub fn active_stages(&self, params: &MainParams) -> Result<Vec<&'static str>> {
        let params = params.resolve(self.config.param_policy)?;
        Ok(Self::active_names(&StageChain::from_params(&params)))
    }

    fn active_names(chain: &StageChain) -> Vec<&'static str> {
        chain
            .stages()
            .iter()
            .filter(|stage| stage.is_active())
            .map(|stage| stage.name())
            .collect()
    }
}
