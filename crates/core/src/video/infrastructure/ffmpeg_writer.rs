use std::path::{Path, PathBuf};

use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;
use ffmpeg_next::Rational;

use crate::shared::error::BoxError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Encodes RGB frames to MPEG-4 via ffmpeg-next.
///
/// The container is inferred from the output path's extension.
pub struct FfmpegWriter {
    session: Option<Session>,
    frame_count: usize,
}

/// Everything that lives between `open` and `close`.
struct Session {
    path: PathBuf,
    octx: ffmpeg_next::format::context::Output,
    encoder: ffmpeg_next::codec::encoder::video::Encoder,
    scaler: scaling::Context,
    width: u32,
    height: u32,
    time_base: Rational,
    stream_index: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self {
            session: None,
            frame_count: 0,
        }
    }

    /// Number of frames handed to the encoder since `open`.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    fn drain_packets(&mut self) -> Result<(), BoxError> {
        let stream_time_base = self
            .octx
            .stream(self.stream_index)
            .ok_or("FfmpegWriter: output stream missing")?
            .time_base();

        let mut packet = ffmpeg_next::Packet::empty();
        while self.encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(self.stream_index);
            packet.rescale_ts(self.time_base, stream_time_base);
            packet.write_interleaved(&mut self.octx)?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<(), BoxError> {
        self.encoder.send_eof()?;
        self.drain_packets()?;
        self.octx.write_trailer()?;
        Ok(())
    }
}

fn integral_fps(fps: f64) -> i32 {
    let fps = fps.round() as i32;
    if fps <= 0 {
        30
    } else {
        fps
    }
}

/// Copies tightly packed RGB rows into an ffmpeg frame, which may pad rows.
fn rgb_video_frame(frame: &Frame) -> Video {
    let (width, height) = frame.dimensions();
    let mut video = Video::new(Pixel::RGB24, width, height);
    let stride = video.stride(0);
    let row_bytes = width as usize * 3;
    let dst = video.data_mut(0);

    for (row, src) in frame.data().chunks_exact(row_bytes).enumerate() {
        let start = row * stride;
        dst[start..start + row_bytes].copy_from_slice(src);
    }
    video
}

impl VideoWriter for FfmpegWriter {
    fn open(&mut self, path: &Path, metadata: &VideoMetadata) -> Result<(), BoxError> {
        if self.session.is_some() {
            return Err("FfmpegWriter: already open".into());
        }
        if !metadata.is_block_aligned() {
            return Err(format!(
                "frame size {}x{} is not a multiple of block size {}",
                metadata.width, metadata.height, metadata.block_size
            )
            .into());
        }

        ffmpeg_next::init()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let fps = integral_fps(metadata.fps);
        let time_base = Rational(1, fps);
        let mut octx = ffmpeg_next::format::output(path)?;
        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        // MPEG4 ships with every ffmpeg build
        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
            .ok_or("MPEG4 encoder not found")?;
        let mut stream = octx.add_stream(Some(codec))?;
        let stream_index = stream.index();

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;
        encoder_ctx.set_width(metadata.width);
        encoder_ctx.set_height(metadata.height);
        encoder_ctx.set_format(Pixel::YUV420P);
        encoder_ctx.set_time_base(time_base);
        encoder_ctx.set_frame_rate(Some(Rational(fps, 1)));
        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        stream.set_parameters(&encoder);
        octx.write_header()?;

        let scaler = scaling::Context::get(
            Pixel::RGB24,
            metadata.width,
            metadata.height,
            Pixel::YUV420P,
            metadata.width,
            metadata.height,
            scaling::Flags::BILINEAR,
        )?;

        log::debug!(
            "Opened {} ({}x{} @ {fps} fps)",
            path.display(),
            metadata.width,
            metadata.height
        );

        self.session = Some(Session {
            path: path.to_path_buf(),
            octx,
            encoder,
            scaler,
            width: metadata.width,
            height: metadata.height,
            time_base,
            stream_index,
        });
        self.frame_count = 0;
        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), BoxError> {
        let session = self.session.as_mut().ok_or("FfmpegWriter: not opened")?;
        if frame.dimensions() != (session.width, session.height) || frame.channels() != 3 {
            return Err(format!(
                "FfmpegWriter expects {}x{} RGB frames, got {}x{}x{}",
                session.width,
                session.height,
                frame.width(),
                frame.height(),
                frame.channels()
            )
            .into());
        }

        let rgb = rgb_video_frame(frame);
        let mut yuv = Video::empty();
        session.scaler.run(&rgb, &mut yuv)?;
        yuv.set_pts(Some(self.frame_count as i64));

        session.encoder.send_frame(&yuv)?;
        session.drain_packets()?;

        self.frame_count += 1;
        Ok(())
    }

    /// Flushes the encoder and writes the trailer. The session is released
    /// even when finalizing fails, so later calls are no-ops.
    fn close(&mut self) -> Result<(), BoxError> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        let path = session.path.clone();
        session.finish()?;
        log::debug!("Finalized {} ({} frames)", path.display(), self.frame_count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(w: u32, h: u32, fps: f64) -> VideoMetadata {
        VideoMetadata {
            width: w,
            height: h,
            fps,
            block_size: 16,
        }
    }

    fn solid_frame(w: u32, h: u32, value: u8) -> Frame {
        let data = vec![value; (w * h * 3) as usize];
        Frame::new(data, w, h, 3)
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        let meta = metadata(160, 128, 5.0);

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &meta).unwrap();
        for _ in 0..3 {
            writer.write(&solid_frame(160, 128, 128)).unwrap();
        }
        assert_eq!(writer.frame_count(), 3);
        writer.close().unwrap();

        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_written_video_has_correct_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        let meta = metadata(112, 64, 5.0);

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &meta).unwrap();
        writer.write(&solid_frame(112, 64, 128)).unwrap();
        writer.close().unwrap();

        ffmpeg_next::init().unwrap();
        let ictx = ffmpeg_next::format::input(&path).unwrap();
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .unwrap();
        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(stream.parameters()).unwrap();
        let decoder = codec_ctx.decoder().video().unwrap();
        assert_eq!(decoder.width(), 112);
        assert_eq!(decoder.height(), 64);
    }

    #[test]
    fn test_open_rejects_unaligned_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        let mut writer = FfmpegWriter::new();
        assert!(writer.open(&path, &metadata(101, 57, 5.0)).is_err());
    }

    #[test]
    fn test_write_rejects_wrong_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        let mut writer = FfmpegWriter::new();
        writer.open(&path, &metadata(64, 64, 5.0)).unwrap();
        assert!(writer.write(&solid_frame(32, 32, 0)).is_err());
        writer.close().unwrap();
    }

    #[test]
    fn test_open_twice_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        let mut writer = FfmpegWriter::new();
        writer.open(&path, &metadata(32, 32, 5.0)).unwrap();
        assert!(writer.open(&path, &metadata(32, 32, 5.0)).is_err());
        writer.close().unwrap();
    }

    #[test]
    fn test_write_without_open_returns_error() {
        let mut writer = FfmpegWriter::new();
        let result = writer.write(&solid_frame(160, 128, 128));
        assert!(result.is_err());
    }

    #[test]
    fn test_close_without_open_is_ok() {
        let mut writer = FfmpegWriter::new();
        assert!(writer.close().is_ok());
    }

    #[test]
    fn test_close_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        let meta = metadata(160, 128, 5.0);

        let mut writer = FfmpegWriter::new();
        writer.open(&path, &meta).unwrap();
        writer.write(&solid_frame(160, 128, 128)).unwrap();
        writer.close().unwrap();
        assert!(writer.close().is_ok());
    }

    #[test]
    fn test_integral_fps_falls_back_for_non_positive() {
        assert_eq!(integral_fps(0.0), 30);
        assert_eq!(integral_fps(-2.0), 30);
        assert_eq!(integral_fps(5.0), 5);
        assert_eq!(integral_fps(29.97), 30);
    }
}
