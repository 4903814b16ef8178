use std::path::Path;

use image::imageops::{self, FilterType};
use tracing::{debug, info};

use crate::error::AssemblyError;
use crate::video::{
    types::{EncodedVideo, Frame, VideoOutputSpec},
    writer::{EncoderSettings, FfmpegWriter, FrameSink},
};

/// Composites frames of varying size onto one canvas size and writes them as a video
pub struct VideoAssembler {
    settings: EncoderSettings,
}

impl VideoAssembler {
    pub fn new(settings: EncoderSettings) -> Self {
        Self { settings }
    }

    /// Write `frames` to `output_path` at `fps`.
    ///
    /// Fails with `EmptyFrameSet` before touching the filesystem when there is
    /// nothing to write.
    pub fn assemble<P: AsRef<Path>>(
        &self,
        frames: &[Frame],
        fps: u32,
        output_path: P,
    ) -> Result<EncodedVideo, AssemblyError> {
        let output_path = output_path.as_ref();
        let spec = Self::output_spec(frames, fps)?;

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| AssemblyError::writer(output_path, e.to_string()))?;
        }

        let writer = FfmpegWriter::open(output_path, &spec, &self.settings)?;
        let frame_count = self.assemble_into(frames, &spec, writer)?;

        let file_size = std::fs::metadata(output_path)
            .map(|m| m.len())
            .map_err(|e| AssemblyError::writer(output_path, e.to_string()))?;

        info!(
            "Video written: {} frames, {:.1}s, {} KB",
            frame_count,
            spec.duration_for(frame_count),
            file_size / 1024
        );

        Ok(EncodedVideo {
            path: output_path.to_path_buf(),
            spec,
            frame_count,
            duration: spec.duration_for(frame_count),
            file_size,
        })
    }

    /// Canvas size for `frames`, or `EmptyFrameSet`
    pub fn output_spec(frames: &[Frame], fps: u32) -> Result<VideoOutputSpec, AssemblyError> {
        VideoOutputSpec::from_frames(frames, fps).ok_or(AssemblyError::EmptyFrameSet)
    }

    /// Normalise every frame and push it into `sink`, in order.
    ///
    /// The sink is finished on success and dropped (closing it) on the first error.
    pub fn assemble_into<S: FrameSink>(
        &self,
        frames: &[Frame],
        spec: &VideoOutputSpec,
        mut sink: S,
    ) -> Result<usize, AssemblyError> {
        if frames.is_empty() {
            return Err(AssemblyError::EmptyFrameSet);
        }

        for (i, frame) in frames.iter().enumerate() {
            let canvas = fit_to_canvas(frame, spec.width, spec.height);
            debug!(
                "Frame {}: {}x{} -> canvas {}x{}",
                i,
                frame.width(),
                frame.height(),
                spec.width,
                spec.height
            );
            sink.write_frame(&canvas)?;
        }

        sink.finish()?;
        Ok(frames.len())
    }
}

impl Default for VideoAssembler {
    fn default() -> Self {
        Self::new(EncoderSettings::default())
    }
}

/// Scale `frame` uniformly to fit inside `width`x`height` and center it on black
pub fn fit_to_canvas(frame: &Frame, width: u32, height: u32) -> Frame {
    let mut canvas = Frame::new_black(width, height);
    if frame.is_empty() || width == 0 || height == 0 {
        return canvas;
    }

    let scale = f64::min(
        f64::from(width) / f64::from(frame.width()),
        f64::from(height) / f64::from(frame.height()),
    );
    let new_w = ((f64::from(frame.width()) * scale).round() as u32).clamp(1, width);
    let new_h = ((f64::from(frame.height()) * scale).round() as u32).clamp(1, height);

    let resized;
    let source = if (new_w, new_h) == frame.dimensions() {
        frame.as_image()
    } else {
        resized = imageops::resize(frame.as_image(), new_w, new_h, FilterType::Lanczos3);
        &resized
    };

    let x = (width - new_w) / 2;
    let y = (height - new_h) / 2;
    imageops::replace(canvas.as_image_mut(), source, i64::from(x), i64::from(y));
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Keeps every canvas in memory
    #[derive(Default)]
    struct CollectingSink {
        frames: Vec<Frame>,
        fail_at: Option<usize>,
        finished: bool,
    }

    impl FrameSink for &mut CollectingSink {
        fn write_frame(&mut self, frame: &Frame) -> Result<(), AssemblyError> {
            if self.fail_at == Some(self.frames.len()) {
                return Err(AssemblyError::writer("memory", "disk full"));
            }
            self.frames.push(frame.clone());
            Ok(())
        }

        fn finish(self) -> Result<(), AssemblyError> {
            self.finished = true;
            Ok(())
        }
    }

    fn sized(sizes: &[(u32, u32)]) -> Vec<Frame> {
        sizes
            .iter()
            .map(|&(w, h)| Frame::new_filled(w, h, [250, 250, 250]))
            .collect()
    }

    #[test]
    fn test_empty_frame_set_touches_nothing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("nested").join("reel.mp4");

        let result = VideoAssembler::default().assemble(&[], 12, &output);

        assert!(matches!(result, Err(AssemblyError::EmptyFrameSet)));
        assert!(!output.exists());
        assert!(!dir.path().join("nested").exists());
    }

    #[test]
    fn test_mixed_sizes_share_one_canvas() {
        let frames = sized(&[(100, 200), (110, 190), (90, 210), (100, 200), (105, 195)]);
        let spec = VideoAssembler::output_spec(&frames, 12).unwrap();
        assert_eq!((spec.width, spec.height), (100, 200));

        let mut sink = CollectingSink::default();
        let written = VideoAssembler::default()
            .assemble_into(&frames, &spec, &mut sink)
            .unwrap();

        assert_eq!(written, 5);
        assert!(sink.finished);
        assert!(sink.frames.iter().all(|f| f.dimensions() == (100, 200)));
    }

    #[test]
    fn test_wide_frame_is_letterboxed() {
        // 110x190 scales by 100/110 to 100x173, leaving black above and below
        let canvas = fit_to_canvas(&Frame::new_filled(110, 190, [250, 250, 250]), 100, 200);

        assert_eq!(canvas.get_pixel(50, 2), [0, 0, 0]);
        assert_eq!(canvas.get_pixel(50, 197), [0, 0, 0]);
        assert!(canvas.get_pixel(50, 100)[0] > 200);
        assert!(canvas.get_pixel(0, 100)[0] > 200);
        assert!(canvas.get_pixel(99, 100)[0] > 200);
    }

    #[test]
    fn test_tall_frame_is_pillarboxed() {
        // 90x210 scales by 200/210 to 86x200, leaving black at the sides
        let canvas = fit_to_canvas(&Frame::new_filled(90, 210, [250, 250, 250]), 100, 200);

        assert_eq!(canvas.get_pixel(1, 100), [0, 0, 0]);
        assert_eq!(canvas.get_pixel(98, 100), [0, 0, 0]);
        assert!(canvas.get_pixel(50, 0)[0] > 200);
        assert!(canvas.get_pixel(50, 199)[0] > 200);
    }

    #[test]
    fn test_exact_fit_is_copied_unchanged() {
        let frame = Frame::new(image::RgbImage::from_fn(100, 200, |x, y| {
            image::Rgb([x as u8, y as u8, 7])
        }));
        assert_eq!(fit_to_canvas(&frame, 100, 200), frame);
    }

    #[test]
    fn test_small_frames_are_scaled_up() {
        let canvas = fit_to_canvas(&Frame::new_filled(10, 20, [250, 250, 250]), 100, 200);
        assert!(canvas.get_pixel(0, 0)[0] > 200);
        assert!(canvas.get_pixel(99, 199)[0] > 200);
    }

    #[test]
    fn test_sink_error_aborts_without_finishing() {
        let frames = sized(&[(100, 200), (100, 200), (100, 200)]);
        let spec = VideoAssembler::output_spec(&frames, 12).unwrap();

        let mut sink = CollectingSink {
            fail_at: Some(1),
            ..CollectingSink::default()
        };
        let result = VideoAssembler::default().assemble_into(&frames, &spec, &mut sink);

        assert!(matches!(result, Err(AssemblyError::WriterFailure { .. })));
        assert_eq!(sink.frames.len(), 1);
        assert!(!sink.finished);
    }

    #[test]
    fn test_assemble_writes_mp4() {
        let settings = EncoderSettings::default();
        if !FfmpegWriter::check_ffmpeg_available(&settings.ffmpeg) {
            return;
        }

        let dir = tempdir().unwrap();
        let output = dir.path().join("reel.mp4");
        let frames = sized(&[(100, 200), (110, 190), (90, 210), (100, 200), (105, 195)]);

        let video = VideoAssembler::new(settings).assemble(&frames, 12, &output).unwrap();

        assert_eq!(video.frame_count, 5);
        assert_eq!((video.spec.width, video.spec.height), (100, 200));
        assert!(video.file_size > 0);
    }
}
