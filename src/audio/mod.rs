/*!
 * Audio access through external ffmpeg/ffprobe processes.
 */

pub mod decoder;
pub mod probe;

pub use self::decoder::{FfmpegSliceDecoder, SliceDecoder};
pub use self::probe::{DurationProbe, FfprobeDuration};

/// Sample rate expected by speech recognition engines
pub const SAMPLE_RATE: u32 = 16_000;

/// Filter ffmpeg stderr down to the lines that explain a failure, dropping the
/// version banner, build configuration and stream metadata noise.
pub(crate) fn filter_ffmpeg_stderr(stderr: &str) -> String {
    const NOISE_PREFIXES: [&str; 14] = [
        "ffmpeg version",
        "ffprobe version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
        "encoder",
        "title",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !NOISE_PREFIXES.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "unknown error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
