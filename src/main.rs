// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use subtitler::app_config::{Config, LogLevel, TranscriptionMode};
use subtitler::app_controller::{Controller, RunOutcome, TranscriptionRequest};
use subtitler::file_utils::{FileManager, InputKind};
use subtitler::subtitle::{SubtitleFormat, TimingMode};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for SubtitleFormat to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Srt,
    Vtt,
    Text,
    /// Debug listing of raw cue times
    Timestamps,
}

impl From<CliFormat> for SubtitleFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Srt => SubtitleFormat::Srt,
            CliFormat::Vtt => SubtitleFormat::Vtt,
            CliFormat::Text => SubtitleFormat::Text,
            CliFormat::Timestamps => SubtitleFormat::Timestamps,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Transcribe an audio file into subtitles
    Transcribe(TranscribeArgs),

    /// Re-render a segments JSON file or an existing SRT
    Render(RenderArgs),

    /// Generate shell completions for subtitler
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by every subcommand that produces subtitles
#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Output format
    #[arg(long, value_enum)]
    format: Option<CliFormat>,

    /// Maximum characters per cue (0 disables re-chunking)
    #[arg(long)]
    max_chars: Option<usize>,

    /// Translate cues to this language code (e.g., 'fr', 'deu')
    #[arg(short, long)]
    translate_to: Option<String>,

    /// Split segment time by chunk length instead of equally
    #[arg(long)]
    proportional: bool,

    /// Directory for the output file (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force: bool,
}

#[derive(clap::Args, Debug)]
struct TranscribeArgs {
    /// Audio or video file to transcribe
    #[arg(value_name = "AUDIO")]
    input_path: PathBuf,

    /// Transcribe fixed windows instead of asking the engine for segments
    #[arg(long)]
    windowed: bool,

    /// Window length in seconds for --windowed
    #[arg(long)]
    window_seconds: Option<u64>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(clap::Args, Debug)]
struct RenderArgs {
    /// Segments JSON (`[{"start", "end", "text"}]`) or SRT file
    #[arg(value_name = "SEGMENTS_JSON|SRT")]
    input_path: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

/// Subtitler - subtitles from speech recognition output
#[derive(Parser, Debug)]
#[command(name = "subtitler")]
#[command(version)]
#[command(about = "Build subtitle timelines from speech recognition output")]
#[command(long_about = "Subtitler sends audio to a speech recognition server and turns its output into SRT, WebVTT or plain text subtitles, optionally re-chunked and translated.

EXAMPLES:
    subtitler transcribe talk.mp3                         # Segment mode, SRT next to the input
    subtitler transcribe --format vtt -t fr talk.mp3      # French WebVTT subtitles
    subtitler transcribe --windowed --window-seconds 5 talk.mp3
    subtitler render --max-chars 32 segments.json         # Re-chunk existing segments
    subtitler completions bash > subtitler.bash           # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config has been read
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();
    if let Some(level) = cli.log_level {
        log::set_max_level(level_filter(level.into()));
    }

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subtitler", &mut std::io::stdout());
            Ok(())
        }
        Commands::Transcribe(args) => {
            let mut config = load_config(&cli.config)?;
            if args.windowed {
                config.transcription.mode = TranscriptionMode::Windows;
            }
            if let Some(window_seconds) = args.window_seconds {
                config.transcription.window_seconds = window_seconds;
            }
            run(config, cli.log_level, args.input_path, args.output).await
        }
        Commands::Render(args) => {
            match FileManager::detect_input_kind(&args.input_path) {
                InputKind::Segments | InputKind::Subtitle => {}
                _ => return Err(anyhow!("render expects a segments JSON or SRT file, got {:?}", args.input_path)),
            }
            let config = load_config(&cli.config)?;
            run(config, cli.log_level, args.input_path, args.output).await
        }
    }
}

/// Load the config file, writing a default one if it does not exist
fn load_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .with_context(|| format!("Failed to open config file: {}", config_path))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config file: {}", config_path))
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
        Ok(config)
    }
}

fn apply_overrides(config: &mut Config, output: &OutputArgs) {
    if let Some(format) = output.format {
        config.subtitles.format = format.into();
    }
    if let Some(max_chars) = output.max_chars {
        config.subtitles.max_chars = (max_chars > 0).then_some(max_chars);
    }
    if let Some(language) = &output.translate_to {
        config.subtitles.translate_to = Some(language.clone());
    }
    if output.proportional {
        config.subtitles.timing = TimingMode::Proportional;
    }
}

async fn run(mut config: Config, cli_level: Option<CliLogLevel>, input_path: PathBuf, output: OutputArgs) -> Result<()> {
    apply_overrides(&mut config, &output);

    if cli_level.is_none() {
        log::set_max_level(level_filter(config.log_level));
    }

    let controller = Controller::with_config(config)?;

    if !input_path.is_file() {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }
    let output_dir = output.output_dir.clone().unwrap_or_else(|| {
        input_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });

    let request: TranscriptionRequest = controller.request_for(input_path, output_dir, output.force);
    match controller.run(&request).await? {
        RunOutcome::Written(path) => info!("Success: {:?}", path),
        RunOutcome::Skipped(path) => info!("Skipped: {:?}", path),
    }
    Ok(())
}
