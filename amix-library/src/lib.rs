//! File handling for AMIX - decoding, export, and configuration
//!
//! These are the collaborators around the processing core: they turn files
//! into `AudioBuffer`s and back, and persist default parameters.

mod config;
mod export;
mod loader;

pub use config::Config;
pub use export::{ExportError, ExportFormat, WavExporter};
pub use loader::{AudioLoader, LoadError, LoadedAudio, SourceInfo};
