//! Simple configuration persistence for AMIX
//!
//! Stores default mix parameters and rendering preferences.

use crate::ExportFormat;
use amix_audio::{MainParams, ParamPolicy, PipelineConfig};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Parameters used when the command line does not override them
    pub params: MainParams,
    pub param_policy: ParamPolicy,
    pub export_format: ExportFormat,
    /// Target rate for loading; `None` keeps the file's rate
    pub sample_rate: Option<u32>,
}

impl Config {
    /// Load config from the default location
    ///
    /// Returns default config if file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        let path = Self::config_path();
        Self::load_from(&path).unwrap_or_default()
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Save config to the default location
    pub fn save(&self) -> io::Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = self.serialize();
        fs::write(path, content)
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("amix")
            .join("config.txt")
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            param_policy: self.param_policy,
        }
    }

    /// Parse config from simple key=value format
    fn parse(content: &str) -> Self {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            let params = &mut config.params;
            let slot = match key {
                "distance" => Some(&mut params.distance),
                "room_size" => Some(&mut params.room_size),
                "brightness" => Some(&mut params.brightness),
                "width" => Some(&mut params.width),
                "dry_wet" => Some(&mut params.dry_wet),
                "intensity" => Some(&mut params.intensity),
                _ => None,
            };
            if let Some(slot) = slot {
                match value.parse::<f32>() {
                    Ok(v) => *slot = v,
                    Err(_) => tracing::warn!("Ignoring malformed {} = {:?}", key, value),
                }
                continue;
            }

            match key {
                "param_policy" => {
                    if let Ok(policy) = value.parse() {
                        config.param_policy = policy;
                    }
                }
                "export_format" => {
                    if let Ok(format) = value.parse() {
                        config.export_format = format;
                    }
                }
                "sample_rate" => {
                    config.sample_rate = value.parse().ok().filter(|&hz: &u32| hz > 0);
                }
                _ => {} // Ignore unknown keys
            }
        }

        config
    }

    /// Serialize config to simple key=value format
    fn serialize(&self) -> String {
        let mut lines = Vec::new();
        lines.push("# AMIX Configuration".to_string());

        let p = &self.params;
        lines.push(format!("distance={}", p.distance));
        lines.push(format!("room_size={}", p.room_size));
        lines.push(format!("brightness={}", p.brightness));
        lines.push(format!("width={}", p.width));
        lines.push(format!("dry_wet={}", p.dry_wet));
        lines.push(format!("intensity={}", p.intensity));
        lines.push(format!("param_policy={}", self.param_policy.as_str()));
        lines.push(format!("export_format={}", self.export_format.as_str()));

        match self.sample_rate {
            Some(hz) => lines.push(format!("sample_rate={}", hz)),
            None => lines.push("sample_rate=".to_string()),
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let config = Config::parse("");
        assert_eq!(config, Config::default());
        assert_eq!(config.params, MainParams::default());
        assert!(config.sample_rate.is_none());
    }

    #[test]
    fn test_parse_params() {
        let config = Config::parse("distance=25\nroom_size = 0.8\nbrightness=-0.3");
        assert_eq!(config.params.distance, 25.0);
        assert_eq!(config.params.room_size, 0.8);
        assert_eq!(config.params.brightness, -0.3);
        assert_eq!(config.params.width, MainParams::default().width);
    }

    #[test]
    fn test_parse_with_comments() {
        let content = "# Comment\nwidth=1.5\n# Another comment\nmystery=1";
        let config = Config::parse(content);
        assert_eq!(config.params.width, 1.5);
    }

    #[test]
    fn test_malformed_values_keep_defaults() {
        let config = Config::parse("distance=far\nparam_policy=maybe\nsample_rate=-4\nexport_format=ogg");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_preferences() {
        let config = Config::parse("param_policy=reject\nexport_format=float32\nsample_rate=48000");
        assert_eq!(config.param_policy, ParamPolicy::Reject);
        assert_eq!(config.export_format, ExportFormat::Float32);
        assert_eq!(config.sample_rate, Some(48000));
        assert_eq!(config.pipeline_config().param_policy, ParamPolicy::Reject);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = Config {
            params: MainParams {
                distance: 3.5,
                room_size: 0.25,
                brightness: 0.75,
                width: 1.25,
                dry_wet: 0.125,
                intensity: 0.9,
            },
            param_policy: ParamPolicy::Reject,
            export_format: ExportFormat::Float32,
            sample_rate: Some(44100),
        };

        let parsed = Config::parse(&config.serialize());
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("amix").join("config.txt");

        let mut config = Config::default();
        config.params.distance = 42.0;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from(&dir.path().join("absent.txt")).is_err());
    }
}
