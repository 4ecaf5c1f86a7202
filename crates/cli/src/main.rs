use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use image::Rgb;

use frameweave_core::pipeline::buffered_accumulator::BufferedAccumulator;
use frameweave_core::pipeline::frame_writer::FrameWriter;
use frameweave_core::pipeline::writer_config::WriterConfig;
use frameweave_core::shared::constants::{DEFAULT_FLUSH_THRESHOLD, IMAGE_EXTENSIONS};
use frameweave_core::smoothing::infrastructure::eased_crossfade::{Ease, EasedCrossfade};
use frameweave_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use frameweave_core::video::infrastructure::image_file_reader::ImageFileReader;
use frameweave_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Assemble a sequence of images into a video, with optional cross-fades.
#[derive(Parser)]
#[command(name = "frameweave")]
struct Cli {
    /// Output video file; the container is inferred from the extension.
    output: PathBuf,

    /// Input images, in frame order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Frames per second of the output.
    #[arg(long, default_value = "5")]
    fps: f64,

    /// Frame width and height are rounded up to a multiple of this.
    #[arg(long, default_value = "16")]
    block_size: u32,

    /// Fixed output size as WIDTHxHEIGHT (default: size of the first image).
    #[arg(long)]
    size: Option<String>,

    /// Cross-fade between consecutive images.
    #[arg(long)]
    smooth: bool,

    /// Number of transition frames per cross-fade.
    #[arg(long)]
    smoothing_frames: Option<usize>,

    /// Cross-fade duration in seconds (overrides --smoothing-frames).
    #[arg(long)]
    smoothing_time: Option<f64>,

    /// Cross-fade easing: linear, in-quad, out-quad, in-out-quad, in-cubic,
    /// out-cubic, in-out-cubic.
    #[arg(long, default_value = "linear")]
    easing: String,

    /// Also save the last frame as <output>_FinalFrame.png.
    #[arg(long)]
    save_final_frame: bool,

    /// Queue images and hand them to the encoder in batches
    /// (`--buffer` or `--buffer=N`; N defaults to 10).
    #[arg(long, num_args = 0..=1, require_equals = true, value_name = "N")]
    buffer: Option<Option<usize>>,

    /// Report progress while encoding.
    #[arg(long)]
    progress: bool,

    /// Background color (RRGGBB) behind transparent pixels.
    #[arg(long, default_value = "ffffff")]
    background: String,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let background = parse_color(&cli.background)?;
    let config = build_config(&cli)?;
    let reader = ImageFileReader::new();

    match cli.buffer {
        Some(threshold) => {
            let threshold = threshold.unwrap_or(DEFAULT_FLUSH_THRESHOLD);
            run_buffered(&cli.inputs, config, threshold, background, &reader)?
        }
        None => run_direct(&cli.inputs, config, cli.progress, background, &reader)?,
    }

    log::info!("Output written to {}", cli.output.display());
    Ok(())
}

fn run_direct(
    inputs: &[PathBuf],
    config: WriterConfig,
    progress: bool,
    background: Rgb<u8>,
    reader: &ImageFileReader,
) -> Result<(), Box<dyn std::error::Error>> {
    let total = inputs.len();
    // Unreadable inputs end the run like any other error, but the writer
    // still closes normally first.
    let frames_encoded = FrameWriter::scoped(
        config,
        Box::new(FfmpegWriter::new()),
        Box::new(ImageFileWriter::new()),
        |writer| {
            for (i, input) in inputs.iter().enumerate() {
                let frame = match reader.read(input) {
                    Ok(frame) => frame,
                    Err(e) => return Ok(Err(format!("{}: {e}", input.display()))),
                };
                writer.write_frame(frame, background)?;
                if progress {
                    eprint!("\rProcessing frame {}/{total}", i + 1);
                }
            }
            Ok(Ok(writer.frames_encoded()))
        },
    )??;
    if progress {
        eprintln!();
    }
    log::info!("Encoded {frames_encoded} frames from {total} images");
    Ok(())
}

fn run_buffered(
    inputs: &[PathBuf],
    config: WriterConfig,
    threshold: usize,
    background: Rgb<u8>,
    reader: &ImageFileReader,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut accumulator = BufferedAccumulator::from_config(
        config,
        Box::new(FfmpegWriter::new()),
        Box::new(ImageFileWriter::new()),
        inputs.len(),
        threshold,
    )?
    .with_background(background);

    for input in inputs {
        let frame = reader
            .read(input)
            .map_err(|e| format!("{}: {e}", input.display()))?;
        accumulator.add_frame(frame)?;
    }
    accumulator.close()?;
    log::info!(
        "Encoded {} frames from {} images",
        accumulator.writer().frames_encoded(),
        accumulator.len()
    );
    Ok(())
}

fn build_config(cli: &Cli) -> Result<WriterConfig, Box<dyn std::error::Error>> {
    let ease = Ease::parse(&cli.easing)
        .ok_or_else(|| format!("Unknown easing '{}'", cli.easing))?;

    let mut builder = WriterConfig::builder(&cli.output)
        .fps(cli.fps)
        .block_size(cli.block_size)
        .progress(cli.progress)
        .auto_smooth(cli.smooth)
        .save_final_frame(cli.save_final_frame)
        .interpolator(EasedCrossfade::new(ease));

    if let Some(frames) = cli.smoothing_frames {
        builder = builder.smoothing_frames(frames);
    }
    if let Some(seconds) = cli.smoothing_time {
        builder = builder.smoothing_time(seconds);
    }
    if let Some(size) = &cli.size {
        let (w, h) = parse_size(size)?;
        builder = builder.size(w, h);
    }

    Ok(builder.build()?)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    for input in &cli.inputs {
        if !input.exists() {
            return Err(format!("Input file not found: {}", input.display()).into());
        }
        if !is_image(input) {
            return Err(format!("Not a supported image file: {}", input.display()).into());
        }
    }
    let smoothing_options = cli.smoothing_frames.is_some() || cli.smoothing_time.is_some();
    if smoothing_options && !cli.smooth {
        return Err("--smoothing-frames and --smoothing-time require --smooth".into());
    }
    if cli.buffer == Some(Some(0)) {
        return Err(format!(
            "Buffer size must be a positive integer (default {DEFAULT_FLUSH_THRESHOLD})"
        )
        .into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn parse_size(size: &str) -> Result<(u32, u32), String> {
    let (w, h) = size
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("Size must look like WIDTHxHEIGHT, got '{size}'"))?;
    let w = w
        .trim()
        .parse()
        .map_err(|_| format!("Invalid width in '{size}'"))?;
    let h = h
        .trim()
        .parse()
        .map_err(|_| format!("Invalid height in '{size}'"))?;
    Ok((w, h))
}

fn parse_color(hex: &str) -> Result<Rgb<u8>, String> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("Background must be RRGGBB, got '{hex}'"));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| format!("Background must be RRGGBB, got '{hex}'"))
    };
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("640x480"), Ok((640, 480)));
        assert_eq!(parse_size("101X57"), Ok((101, 57)));
        assert!(parse_size("640").is_err());
        assert!(parse_size("ax480").is_err());
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("ffffff"), Ok(Rgb([255, 255, 255])));
        assert_eq!(parse_color("#0a1B2c"), Ok(Rgb([10, 27, 44])));
        assert!(parse_color("fff").is_err());
        assert!(parse_color("gggggg").is_err());
    }

    #[test]
    fn test_is_image() {
        assert!(is_image(Path::new("frame_001.PNG")));
        assert!(is_image(Path::new("a/b.jpeg")));
        assert!(!is_image(Path::new("clip.mp4")));
        assert!(!is_image(Path::new("noext")));
    }

    #[test]
    fn test_smoothing_options_require_smooth() {
        let cli = Cli::try_parse_from(["frameweave", "out.mp4", "a.png", "--smoothing-frames", "3"])
            .unwrap();
        assert!(validate(&Cli { inputs: Vec::new(), ..cli }).is_err());
    }

    #[test]
    fn test_buffer_flag_without_value() {
        let cli = Cli::try_parse_from(["frameweave", "out.mp4", "a.png", "--buffer"]).unwrap();
        assert_eq!(cli.buffer, Some(None));
    }

    #[test]
    fn test_buffer_flag_does_not_swallow_inputs() {
        let cli =
            Cli::try_parse_from(["frameweave", "out.mp4", "--buffer", "a.png", "b.png"]).unwrap();
        assert_eq!(cli.buffer, Some(None));
        assert_eq!(cli.inputs, vec![PathBuf::from("a.png"), PathBuf::from("b.png")]);
    }

    #[test]
    fn test_buffer_flag_with_value() {
        let cli = Cli::try_parse_from(["frameweave", "out.mp4", "a.png", "--buffer=4"]).unwrap();
        assert_eq!(cli.buffer, Some(Some(4)));
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let cli = Cli::try_parse_from(["frameweave", "out.mp4", "a.png", "--buffer=0"]).unwrap();
        assert!(validate(&Cli { inputs: Vec::new(), ..cli }).is_err());
    }
}
