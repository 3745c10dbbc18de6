//! AMIX - render audio files through the stereo mix pipeline
//!
//! Loads a file, applies distance, tone, width, reverb and limiting from six
//! physical parameters, and writes a WAV file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use amix_analysis::{
    left_channel, signals, spectral_centroid, waveform_overview, LevelStats,
};
use amix_audio::{AudioBuffer, BatchRenderer, MainParams, ParamPolicy, Pipeline};
use amix_library::{AudioLoader, Config, ExportFormat, WavExporter};

/// Sample rate of the synthesized demo signal
const DEMO_SAMPLE_RATE: u32 = 48000;

/// Points in the printed waveform overview
const OVERVIEW_POINTS: usize = 48;

#[derive(Parser)]
#[command(name = "amix")]
#[command(about = "Stereo post-processing driven by physical mix parameters", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one file and write a WAV
    Render {
        /// Input audio file
        input: PathBuf,
        /// Output WAV path
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        params: ParamArgs,
        #[command(flatten)]
        output_opts: OutputArgs,
    },
    /// Render one file per distance
    Batch {
        /// Input audio file
        input: PathBuf,
        /// Directory for the rendered files
        #[arg(long)]
        out_dir: PathBuf,
        /// Comma-separated distances in meters
        #[arg(long, value_delimiter = ',', required = true)]
        distances: Vec<f32>,
        /// Worker threads (defaults to available parallelism)
        #[arg(long)]
        workers: Option<usize>,
        #[command(flatten)]
        params: ParamArgs,
        #[command(flatten)]
        output_opts: OutputArgs,
    },
    /// Print level, stereo and spectral statistics for a file
    Analyze {
        /// Input audio file
        input: PathBuf,
    },
    /// Render a synthesized 440 Hz test tone through a mid-sized room
    Demo {
        /// Output WAV path
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        output_opts: OutputArgs,
    },
    /// Show the effective configuration
    Config {
        /// Write the defaults to the config file
        #[arg(long)]
        init: bool,
    },
}

/// Mix parameter overrides; unset flags fall back to the config file
#[derive(Args, Default)]
struct ParamArgs {
    /// Source distance in meters (0.1 - 1000)
    #[arg(long, allow_hyphen_values = true)]
    distance: Option<f32>,
    /// Room size (0 - 1)
    #[arg(long, allow_hyphen_values = true)]
    room_size: Option<f32>,
    /// Brightness (-1 dark - 1 bright)
    #[arg(long, allow_hyphen_values = true)]
    brightness: Option<f32>,
    /// Stereo width (0 mono - 2 wide)
    #[arg(long, allow_hyphen_values = true)]
    width: Option<f32>,
    /// Reverb dry/wet mix (0 - 1)
    #[arg(long, allow_hyphen_values = true)]
    dry_wet: Option<f32>,
    /// Reverb intensity (0 - 1)
    #[arg(long, allow_hyphen_values = true)]
    intensity: Option<f32>,
    /// Fail on out-of-range parameters instead of clamping
    #[arg(long)]
    strict: bool,
}

impl ParamArgs {
    fn apply(&self, config: &Config) -> (MainParams, Pipeline) {
        let base = config.params;
        let params = MainParams {
            distance: self.distance.unwrap_or(base.distance),
            room_size: self.room_size.unwrap_or(base.room_size),
            brightness: self.brightness.unwrap_or(base.brightness),
            width: self.width.unwrap_or(base.width),
            dry_wet: self.dry_wet.unwrap_or(base.dry_wet),
            intensity: self.intensity.unwrap_or(base.intensity),
        };

        let mut pipeline_config = config.pipeline_config();
        if self.strict {
            pipeline_config.param_policy = ParamPolicy::Reject;
        }

        (params, Pipeline::new(pipeline_config))
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Sample encoding: pcm16 or float32
    #[arg(long)]
    format: Option<ExportFormat>,
    /// Resample input to this rate before processing
    #[arg(long)]
    sample_rate: Option<u32>,
}

impl OutputArgs {
    fn exporter(&self, config: &Config) -> WavExporter {
        WavExporter::new(self.format.unwrap_or(config.export_format))
    }

    fn loader(&self, config: &Config) -> AudioLoader {
        match self.sample_rate.or(config.sample_rate) {
            Some(hz) => AudioLoader::with_sample_rate(hz),
            None => AudioLoader::new(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "amix=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    let config = load_config(&config_path);

    match cli.command {
        Commands::Render {
            input,
            output,
            params,
            output_opts,
        } => render(&config, &input, &output, &params, &output_opts),
        Commands::Batch {
            input,
            out_dir,
            distances,
            workers,
            params,
            output_opts,
        } => batch(
            &config,
            &input,
            &out_dir,
            &distances,
            workers,
            &params,
            &output_opts,
        ),
        Commands::Analyze { input } => analyze(&input),
        Commands::Demo {
            output,
            output_opts,
        } => demo(&config, &output, &output_opts),
        Commands::Config { init } => show_config(&config_path, init),
    }
}

/// Read the config file, falling back to defaults when it is absent
fn load_config(path: &Path) -> Config {
    match Config::load_from(path) {
        Ok(config) => {
            tracing::debug!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            tracing::debug!("Using default config ({}: {})", path.display(), e);
            Config::default()
        }
    }
}

fn render(
    config: &Config,
    input: &Path,
    output: &Path,
    params: &ParamArgs,
    output_opts: &OutputArgs,
) -> anyhow::Result<()> {
    let loaded = output_opts
        .loader(config)
        .load(input)
        .with_context(|| format!("failed to load {}", input.display()))?;

    let (params, pipeline) = params.apply(config);
    let processed = pipeline
        .process(&loaded.buffer, &params)
        .with_context(|| format!("failed to process {}", loaded.info.title))?;

    output_opts
        .exporter(config)
        .export(&processed, output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    report("input", &loaded.buffer);
    report("output", &processed);
    Ok(())
}

fn batch(
    config: &Config,
    input: &Path,
    out_dir: &Path,
    distances: &[f32],
    workers: Option<usize>,
    params: &ParamArgs,
    output_opts: &OutputArgs,
) -> anyhow::Result<()> {
    let loaded = output_opts
        .loader(config)
        .load(input)
        .with_context(|| format!("failed to load {}", input.display()))?;

    let (base, pipeline) = params.apply(config);
    let variants: Vec<MainParams> = distances
        .iter()
        .map(|&distance| MainParams { distance, ..base })
        .collect();

    let renderer = match workers {
        Some(n) => BatchRenderer::new(pipeline, n),
        None => BatchRenderer::with_available_parallelism(pipeline),
    };
    tracing::info!(
        "Rendering {} variants of {} on {} workers",
        variants.len(),
        loaded.info.title,
        renderer.workers()
    );

    let exporter = output_opts.exporter(config);
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("render");
    let names = batch_file_names(stem, &variants)?;

    let results = renderer.render(&loaded.buffer, &variants);
    for ((variant, name), result) in variants.iter().zip(&names).zip(results) {
        let processed =
            result.with_context(|| format!("failed to render distance {}", variant.distance))?;
        let path = out_dir.join(name);
        exporter
            .export(&processed, &path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        report(&format!("{} m", variant.distance), &processed);
    }

    Ok(())
}

/// One output file name per variant, named by the distance actually rendered
///
/// Distances are clamped into their domain first, so two requests that
/// render the same distance would write the same file; that is an error.
fn batch_file_names(stem: &str, variants: &[MainParams]) -> anyhow::Result<Vec<String>> {
    let mut names: Vec<String> = Vec::with_capacity(variants.len());
    for variant in variants {
        let distance = variant.clamped().distance;
        let name = format!("{}_{}m.wav", stem, distance);
        if names.contains(&name) {
            anyhow::bail!(
                "distance {} renders as {} m, which is already in the batch",
                variant.distance,
                distance
            );
        }
        names.push(name);
    }
    Ok(names)
}

fn analyze(input: &Path) -> anyhow::Result<()> {
    let loaded = AudioLoader::new()
        .load(input)
        .with_context(|| format!("failed to load {}", input.display()))?;
    let info = &loaded.info;

    println!("{}", info.title);
    println!(
        "  source:   {} ch @ {} Hz, {:.2} s",
        info.source_channels, info.source_sample_rate, info.duration_secs
    );
    report("levels", &loaded.buffer);

    let overview = waveform_overview(&left_channel(loaded.buffer.samples()), OVERVIEW_POINTS);
    println!("  envelope: {}", sparkline(&overview));
    Ok(())
}

fn demo(config: &Config, output: &Path, output_opts: &OutputArgs) -> anyhow::Result<()> {
    let samples = signals::stereo_sine(440.0, 0.5, DEMO_SAMPLE_RATE, 1.0);
    let input = AudioBuffer::stereo(samples, DEMO_SAMPLE_RATE)?;
    let params = MainParams {
        distance: 10.0,
        room_size: 0.5,
        brightness: 0.0,
        width: 1.0,
        dry_wet: 0.4,
        intensity: 0.6,
    };

    let processed = Pipeline::new(config.pipeline_config()).process(&input, &params)?;
    output_opts
        .exporter(config)
        .export(&processed, output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    report("input", &input);
    report("output", &processed);
    Ok(())
}

fn show_config(path: &Path, init: bool) -> anyhow::Result<()> {
    if init {
        Config::default()
            .save_to(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Wrote defaults to {}", path.display());
    }

    let config = load_config(path);
    let p = &config.params;
    println!("# {}", path.display());
    println!("distance      = {}", p.distance);
    println!("room_size     = {}", p.room_size);
    println!("brightness    = {}", p.brightness);
    println!("width         = {}", p.width);
    println!("dry_wet       = {}", p.dry_wet);
    println!("intensity     = {}", p.intensity);
    println!("param_policy  = {}", config.param_policy.as_str());
    println!("export_format = {}", config.export_format.as_str());
    match config.sample_rate {
        Some(hz) => println!("sample_rate   = {}", hz),
        None => println!("sample_rate   = (keep source rate)"),
    }
    Ok(())
}

/// Print one line of level and spectral statistics
fn report(label: &str, buffer: &AudioBuffer) {
    let stats = LevelStats::measure(buffer.samples());
    let centroid = spectral_centroid(&left_channel(buffer.samples()), buffer.sample_rate());

    println!(
        "  {:<8} {} frames  peak {:.3}  rms {:.3} (L {:.3} / R {:.3})  corr {:.2}  S/M {:.2}  centroid {}",
        label,
        buffer.frames(),
        stats.peak,
        stats.rms,
        stats.rms_left,
        stats.rms_right,
        stats.correlation,
        stats.side_to_mid,
        centroid.map_or_else(|| "-".to_string(), |hz| format!("{:.0} Hz", hz)),
    );
}

/// Render a peak envelope as block characters
fn sparkline(points: &[f32]) -> String {
    const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    let max = points.iter().copied().fold(0.0f32, f32::max);
    if max <= 0.0 {
        return BLOCKS[0].to_string().repeat(points.len());
    }
    points
        .iter()
        .map(|&p| {
            let level = ((p / max) * (BLOCKS.len() - 1) as f32).round() as usize;
            BLOCKS[level.min(BLOCKS.len() - 1)]
        })
        .collect()
}
