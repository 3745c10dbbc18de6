//! Pipeline errors

use thiserror::Error;

/// Result type alias using `PipelineError`
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised at pipeline entry. Stages themselves never fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Wrong channel count, no samples, zero sample rate or a sample
    /// count that does not divide into whole frames
    #[error("Invalid audio buffer: {reason}")]
    InvalidBuffer { reason: String },

    /// A mix parameter outside its domain (or not finite)
    #[error("Parameter {name} = {value} is outside [{min}, {max}]")]
    ParameterOutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// NaN or infinite sample in the input
    #[error("Non-finite sample at frame {frame}, channel {channel}")]
    NonFiniteSample { frame: usize, channel: usize },
}

impl PipelineError {
    pub(crate) fn invalid_buffer(reason: impl Into<String>) -> Self {
        Self::InvalidBuffer {
            reason: reason.into(),
        }
    }
}
