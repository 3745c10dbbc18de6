//! WAV export of processed buffers

use amix_audio::AudioBuffer;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while writing a file
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

/// Sample encoding of the written file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// 16-bit integer PCM, samples clamped to [-1, 1] and scaled by 32767
    #[default]
    Pcm16,
    /// 32-bit IEEE float, samples written unchanged
    Float32,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Pcm16 => "pcm16",
            ExportFormat::Float32 => "float32",
        }
    }

    fn spec(&self, channels: u16, sample_rate: u32) -> hound::WavSpec {
        let (bits_per_sample, sample_format) = match self {
            ExportFormat::Pcm16 => (16, hound::SampleFormat::Int),
            ExportFormat::Float32 => (32, hound::SampleFormat::Float),
        };
        hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample,
            sample_format,
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pcm16" | "int16" | "s16" => Ok(ExportFormat::Pcm16),
            "float32" | "f32" => Ok(ExportFormat::Float32),
            other => Err(format!("unknown export format: {other}")),
        }
    }
}

/// Quantize one sample to 16-bit PCM
fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}

/// Writes `AudioBuffer`s as WAV files
#[derive(Debug, Clone, Copy, Default)]
pub struct WavExporter {
    format: ExportFormat,
}

impl WavExporter {
    pub fn new(format: ExportFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    /// Write `buffer` to `path`, creating parent directories as needed
    pub fn export(&self, buffer: &AudioBuffer, path: &Path) -> Result<(), ExportError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let spec = self.format.spec(buffer.channels(), buffer.sample_rate());
        let mut writer = hound::WavWriter::create(path, spec)?;

        match self.format {
            ExportFormat::Pcm16 => {
                for &sample in buffer.samples() {
                    writer.write_sample(to_pcm16(sample))?;
                }
            }
            ExportFormat::Float32 => {
                for &sample in buffer.samples() {
                    writer.write_sample(sample)?;
                }
            }
        }
        writer.finalize()?;

        tracing::info!(
            "Exported {} frames @ {} Hz ({}) to {}",
            buffer.frames(),
            buffer.sample_rate(),
            self.format.as_str(),
            path.display()
        );

        Ok(())
    }
}
