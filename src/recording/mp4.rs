//! MP4 sink combining the H.264 encoder and the muxide muxer

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use muxide::api::{Metadata, MuxerBuilder, VideoCodec};

use super::config::{EncoderSettings, RecordingStats};
use super::encoder::H264Encoder;
use super::sink::{SinkFactory, VideoSink};
use crate::errors::{RecorderError, Result};

/// Writes encoded square frames into an MP4 container
pub struct Mp4Sink {
    encoder: H264Encoder,
    muxer: muxide::api::Muxer<BufWriter<File>>,
    output_path: String,
    frame_count: u64,
    dropped_frames: u64,
    last_pts_secs: Option<f64>,
}

impl Mp4Sink {
    /// Create the output file and open encoder and muxer for it
    pub fn create<P: AsRef<Path>>(output_path: P, settings: &EncoderSettings) -> Result<Self> {
        let output_path = output_path.as_ref();
        let output_path_str = output_path.to_string_lossy().to_string();

        let encoder = H264Encoder::new(settings)?;

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(output_path)?;
        let writer = BufWriter::new(file);

        let side = settings.output_side;
        let mut metadata = Metadata::new().with_current_time();
        if let Some(ref title) = settings.title {
            metadata = metadata.with_title(title);
        }

        let muxer = MuxerBuilder::new(writer)
            .video(VideoCodec::H264, side, side, settings.fps)
            .with_fast_start(settings.fast_start)
            .with_metadata(metadata)
            .build()
            .map_err(|e| RecorderError::Muxing(format!("Failed to create muxer: {}", e)))?;

        log::debug!("Opened MP4 sink {} ({}x{} @ {} fps)", output_path_str, side, side, settings.fps);

        Ok(Self {
            encoder,
            muxer,
            output_path: output_path_str,
            frame_count: 0,
            dropped_frames: 0,
            last_pts_secs: None,
        })
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }
}

impl VideoSink for Mp4Sink {
    fn write_frame(&mut self, pixels: &[u32], side: u32, pts_us: u64) -> Result<()> {
        if side != self.encoder.side() {
            return Err(RecorderError::Encoding(format!(
                "Frame side {} doesn't match encoder side {}",
                side,
                self.encoder.side()
            )));
        }

        let pts = pts_us as f64 / 1_000_000.0;
        if self.last_pts_secs.is_some_and(|last| pts <= last) {
            return Err(RecorderError::Muxing(format!(
                "Non-increasing timestamp {}us",
                pts_us
            )));
        }

        let encoded = self.encoder.encode_bgr(pixels)?;
        self.last_pts_secs = Some(pts);

        // The encoder may emit nothing for a frame (rate control skip)
        if encoded.data.is_empty() {
            self.dropped_frames += 1;
            return Ok(());
        }

        self.muxer
            .write_video(pts, &encoded.data, encoded.is_keyframe)
            .map_err(|e| RecorderError::Muxing(format!("Failed to write frame: {}", e)))?;

        self.frame_count += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<RecordingStats> {
        let sink = *self;
        let muxer_stats = sink
            .muxer
            .finish_with_stats()
            .map_err(|e| RecorderError::Muxing(format!("Failed to finalize recording: {}", e)))?;

        Ok(RecordingStats {
            video_frames: muxer_stats.video_frames,
            duration_secs: muxer_stats.duration_secs,
            bytes_written: muxer_stats.bytes_written,
            dropped_frames: sink.dropped_frames,
            output_path: sink.output_path,
        })
    }
}

/// Factory producing [`Mp4Sink`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct Mp4SinkFactory;

impl SinkFactory for Mp4SinkFactory {
    fn open(&self, path: &Path, settings: &EncoderSettings) -> Result<Box<dyn VideoSink>> {
        Ok(Box::new(Mp4Sink::create(path, settings)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::pack;

    #[test]
    fn test_sink_writes_playable_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("clip.mp4");
        let settings = EncoderSettings::new(64).with_title("Sink Test");

        let mut sink = Mp4Sink::create(&output, &settings).expect("sink creation failed");
        for i in 0..15u64 {
            let shade = (i * 16) as u8;
            let pixels = vec![pack(shade, 128, 255 - shade); 64 * 64];
            sink.write_frame(&pixels, 64, i * 33_333).expect("write should succeed");
        }
        assert_eq!(sink.frame_count() + sink.dropped_frames(), 15);

        let written = sink.frame_count();
        let stats = Box::new(sink).finish().expect("finish should succeed");
        assert_eq!(stats.video_frames, written);
        assert!(stats.bytes_written > 0);
        assert!(std::fs::metadata(&output).unwrap().len() > 0);
    }

    #[test]
    fn test_sink_rejects_wrong_side() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = Mp4Sink::create(dir.path().join("a.mp4"), &EncoderSettings::new(32)).unwrap();
        let pixels = vec![0u32; 16 * 16];
        assert!(sink.write_frame(&pixels, 16, 0).is_err());
    }

    #[test]
    fn test_sink_rejects_repeated_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = Mp4Sink::create(dir.path().join("b.mp4"), &EncoderSettings::new(32)).unwrap();
        let pixels = vec![pack(10, 20, 30); 32 * 32];
        sink.write_frame(&pixels, 32, 1_000).unwrap();
        assert!(sink.write_frame(&pixels, 32, 1_000).is_err());
        assert!(sink.write_frame(&pixels, 32, 2_000).is_ok());
    }

    #[test]
    fn test_factory_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file cannot act as a parent directory
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let result = Mp4SinkFactory.open(&blocker.join("out.mp4"), &EncoderSettings::default());
        assert!(result.is_err());
    }
}
