//! Audio file loading and decoding

use amix_audio::{AudioBuffer, PipelineError};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CodecParameters, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::{MetadataOptions, StandardTagKey};
use symphonia::core::probe::Hint;
use thiserror::Error;

/// Errors that can occur during file loading
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No audio track found in file")]
    NoAudioTrack,
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Resample error: {0}")]
    Resample(String),
    #[error("File contains no audio frames")]
    Empty,
    #[error("Stream ended after {decoded} of {expected} frames")]
    Truncated { expected: u64, decoded: u64 },
    #[error(transparent)]
    Buffer(#[from] PipelineError),
}

/// What the file looked like before conversion
#[derive(Debug, Clone, Default)]
pub struct SourceInfo {
    /// Title tag, or the file stem when untagged
    pub title: String,
    pub source_sample_rate: u32,
    pub source_channels: u16,
    pub duration_secs: f64,
}

/// A decoded file, converted to stereo
pub struct LoadedAudio {
    pub buffer: AudioBuffer,
    pub info: SourceInfo,
}

/// Audio file loader using Symphonia
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioLoader {
    target_sample_rate: Option<u32>,
}

impl AudioLoader {
    /// Create a loader that keeps the file's sample rate
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader that resamples to `target_sample_rate`
    pub fn with_sample_rate(target_sample_rate: u32) -> Self {
        Self {
            target_sample_rate: Some(target_sample_rate),
        }
    }

    /// Load, decode and convert a file to a stereo buffer
    pub fn load(&self, path: &Path) -> Result<LoadedAudio, LoadError> {
        // Open the file
        let file = std::fs::File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create hint from file extension
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        // Probe the format
        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| LoadError::Decode(e.to_string()))?;

        let mut format = probed.format;

        // Find first audio track
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(LoadError::NoAudioTrack)?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let source_sample_rate = codec_params.sample_rate.unwrap_or(44100);

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| LoadError::Decode(e.to_string()))?;

        let title = Self::read_title(format.as_mut(), path);

        // Decode all samples
        let mut samples: Vec<f32> = Vec::new();
        let mut channels: Option<usize> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => return Err(LoadError::Decode(e.to_string())),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::warn!("Skipping undecodable packet: {}", e);
                    continue;
                }
                Err(e) => return Err(LoadError::Decode(e.to_string())),
            };

            // Convert to f32 interleaved
            let spec = *decoded.spec();
            let count = spec.channels.count();
            match channels {
                None => channels = Some(count),
                Some(c) if c != count => {
                    return Err(LoadError::Decode(format!(
                        "channel count changed from {} to {}",
                        c, count
                    )));
                }
                Some(_) => {}
            }

            let duration = decoded.capacity() as u64;

            let mut sample_buf = SampleBuffer::<f32>::new(duration, spec);
            sample_buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(sample_buf.samples());
        }

        let channels = channels.ok_or(LoadError::Empty)?;
        let decoded_frames = (samples.len() / channels) as u64;
        if let Some(expected) = codec_params.n_frames {
            if decoded_frames < expected && declares_exact_length(&codec_params) {
                return Err(LoadError::Truncated {
                    expected,
                    decoded: decoded_frames,
                });
            }
        }

        let source_channels = channels as u16;
        let stereo = to_stereo(&samples, channels);
        if stereo.is_empty() {
            return Err(LoadError::Empty);
        }
        let duration_secs = (stereo.len() / 2) as f64 / source_sample_rate as f64;

        let (stereo, sample_rate) = match self.target_sample_rate {
            Some(target) if target != source_sample_rate => {
                (resample(&stereo, source_sample_rate, target)?, target)
            }
            _ => (stereo, source_sample_rate),
        };

        let buffer = AudioBuffer::stereo(stereo, sample_rate)?;

        tracing::info!(
            "Loaded {} ({} ch @ {} Hz, {:.2}s) as {} frames @ {} Hz",
            path.display(),
            source_channels,
            source_sample_rate,
            duration_secs,
            buffer.frames(),
            sample_rate
        );

        Ok(LoadedAudio {
            buffer,
            info: SourceInfo {
                title,
                source_sample_rate,
                source_channels,
                duration_secs,
            },
        })
    }

    /// Title tag if present, otherwise the file stem
    fn read_title(format: &mut dyn FormatReader, path: &Path) -> String {
        let mut title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown")
            .to_string();

        if let Some(meta) = format.metadata().current() {
            for tag in meta.tags() {
                if let Some(StandardTagKey::TrackTitle) = tag.std_key {
                    title = tag.value.to_string();
                }
            }
        }

        title
    }
}

/// Whether the stream's frame count is exact rather than estimated
///
/// Uncompressed PCM and FLAC declare their length precisely; compressed
/// formats such as MP3 may only carry an estimate.
fn declares_exact_length(params: &CodecParameters) -> bool {
    symphonia::default::get_codecs()
        .get_codec(params.codec)
        .is_some_and(|d| d.short_name.starts_with("pcm_") || d.short_name == "flac")
}

/// Convert interleaved audio with `channels` channels to interleaved stereo
///
/// Mono is duplicated to both sides; beyond two channels only the first two
/// are kept. A trailing partial frame is dropped.
fn to_stereo(samples: &[f32], channels: usize) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.iter().flat_map(|&s| [s, s]).collect(),
        2 => samples[..samples.len() - samples.len() % 2].to_vec(),
        n => samples
            .chunks_exact(n)
            .flat_map(|frame| [frame[0], frame[1]])
            .collect(),
    }
}

/// Resample interleaved stereo from `source_rate` to `target_rate`
///
/// The output is aligned with the input (resampler latency removed) and holds
/// exactly `frames * target_rate / source_rate` frames.
fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>, LoadError> {
    use rubato::{FftFixedInOut, Resampler};

    const CHANNELS: usize = 2;
    let frames = samples.len() / CHANNELS;
    let expected = (frames as u64 * target_rate as u64 / source_rate as u64) as usize;

    let mut resampler =
        FftFixedInOut::<f32>::new(source_rate as usize, target_rate as usize, 1024, CHANNELS)
            .map_err(|e| LoadError::Resample(e.to_string()))?;
    let delay = resampler.output_delay();

    // Deinterleave
    let deinterleaved: Vec<Vec<f32>> = (0..CHANNELS)
        .map(|ch| samples.iter().skip(ch).step_by(CHANNELS).copied().collect())
        .collect();

    // Process in chunks, feeding zeros past the end until the delayed tail is out
    let chunk_size = resampler.input_frames_next();
    let mut chunk: Vec<Vec<f32>> = vec![vec![0.0; chunk_size]; CHANNELS];
    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(delay + expected); CHANNELS];

    let mut pos = 0;
    while output[0].len() < delay + expected {
        let start = pos.min(frames);
        let end = (pos + chunk_size).min(frames);
        for (buf, ch) in chunk.iter_mut().zip(&deinterleaved) {
            buf[..end - start].copy_from_slice(&ch[start..end]);
            buf[end - start..].fill(0.0);
        }

        let resampled = resampler
            .process(&chunk, None)
            .map_err(|e| LoadError::Resample(e.to_string()))?;

        for (ch, data) in resampled.into_iter().enumerate() {
            output[ch].extend(data);
        }

        pos += chunk_size;
    }

    // Drop the latency, then reinterleave
    let range = delay..delay + expected;
    Ok(output[0][range.clone()]
        .iter()
        .zip(&output[1][range])
        .flat_map(|(&l, &r)| [l, r])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use amix_analysis::signals::{impulse, stereo_sine};
    use amix_analysis::{left_channel, peak};
    use std::path::PathBuf;

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, samples: &[f32]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample((s * 32767.0) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_to_stereo_layouts() {
        assert_eq!(to_stereo(&[0.1, 0.2], 1), vec![0.1, 0.1, 0.2, 0.2]);
        assert_eq!(to_stereo(&[0.1, 0.2, 0.3], 2), vec![0.1, 0.2]);
        assert_eq!(
            to_stereo(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3),
            vec![1.0, 2.0, 4.0, 5.0]
        );
        assert!(to_stereo(&[0.5], 0).is_empty());
    }

    #[test]
    fn test_load_stereo_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let samples = stereo_sine(440.0, 0.5, 48000, 0.1);
        write_wav(&path, 2, 48000, &samples);

        let loaded = AudioLoader::new().load(&path).unwrap();
        assert_eq!(loaded.buffer.frames(), 4800);
        assert_eq!(loaded.buffer.sample_rate(), 48000);
        assert_eq!(loaded.info.source_channels, 2);
        assert_eq!(loaded.info.title, "tone");
        assert!((loaded.info.duration_secs - 0.1).abs() < 1e-6);

        for (a, b) in loaded.buffer.samples().iter().zip(&samples) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn test_load_mono_wav_duplicates_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        let mono: Vec<f32> = (0..1000).map(|i| (i as f32 * 0.01).sin() * 0.4).collect();
        write_wav(&path, 1, 44100, &mono);

        let loaded = AudioLoader::new().load(&path).unwrap();
        assert_eq!(loaded.buffer.channels(), 2);
        assert_eq!(loaded.buffer.frames(), 1000);
        assert_eq!(loaded.info.source_channels, 1);
        for frame in loaded.buffer.samples().chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
    }

    #[test]
    fn test_load_resamples_to_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cd.wav");
        write_wav(&path, 2, 44100, &stereo_sine(440.0, 0.5, 44100, 0.5));

        let loaded = AudioLoader::with_sample_rate(48000).load(&path).unwrap();
        assert_eq!(loaded.buffer.sample_rate(), 48000);
        assert_eq!(loaded.info.source_sample_rate, 44100);

        assert_eq!(loaded.buffer.frames(), 24000);

        // The tail of the file survives resampling
        let tail = &loaded.buffer.samples()[23000 * 2..];
        assert!(peak(tail) > 0.4, "tail peak {}", peak(tail));
    }

    #[test]
    fn test_resample_keeps_timing() {
        // 1 s at 44.1 kHz with a click at 100 ms
        let input = impulse(44100, 4410, 0.8);
        let output = resample(&input, 44100, 48000).unwrap();
        assert_eq!(output.len(), 48000 * 2);

        let left = left_channel(&output);
        let (loudest, _) = left
            .iter()
            .enumerate()
            .fold((0, 0.0f32), |best, (i, &s)| if s.abs() > best.1 { (i, s.abs()) } else { best });
        assert!(
            (loudest as i64 - 4800).abs() <= 2,
            "click moved to frame {} instead of 4800",
            loudest
        );
    }

    #[test]
    fn test_truncated_wav_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cut.wav");
        write_wav(&path, 2, 48000, &stereo_sine(440.0, 0.5, 48000, 0.5));

        // Cut the data chunk short on a frame boundary
        let bytes = std::fs::read(&path).unwrap();
        let keep = bytes.len() - 4 * 10_000;
        std::fs::write(&path, &bytes[..keep]).unwrap();

        match AudioLoader::new().load(&path) {
            Err(LoadError::Truncated { expected, decoded }) => {
                assert_eq!(expected, 24000);
                assert_eq!(decoded, 14000);
            }
            Err(e) => panic!("unexpected error: {}", e),
            Ok(loaded) => panic!(
                "truncated file loaded as {} frames",
                loaded.buffer.frames()
            ),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = AudioLoader::new().load(&PathBuf::from("/nonexistent/amix/none.wav"));
        assert!(matches!(result, Err(LoadError::Io(_))));
    }
}
