use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use tracing::{debug, info, warn};

use crate::error::AssemblyError;
use crate::video::types::{Frame, VideoOutputSpec};

/// Destination for assembled video frames.
///
/// Implementations own their output for the duration of one assembly and must
/// release it in `finish` and, when dropped early, in `Drop`.
pub trait FrameSink {
    /// Append one canvas. Every frame has exactly the output dimensions.
    fn write_frame(&mut self, frame: &Frame) -> Result<(), AssemblyError>;

    /// Flush and close the output
    fn finish(self) -> Result<(), AssemblyError>
    where
        Self: Sized;
}

/// Encoder settings passed through to ffmpeg
#[derive(Debug, Clone)]
pub struct EncoderSettings {
    /// ffmpeg binary name or path
    pub ffmpeg: String,

    pub codec: String,

    /// 0-100, higher is better
    pub quality: u8,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            codec: "libx264".to_string(),
            quality: 85,
        }
    }
}

impl EncoderSettings {
    fn crf(&self) -> u8 {
        (51 - ((self.quality.min(100) as f32 / 100.0) * 51.0) as u8).clamp(0, 51)
    }
}

/// Streams raw RGB24 frames into an ffmpeg child process that encodes an mp4
pub struct FfmpegWriter {
    child: Child,
    stdin: Option<ChildStdin>,
    /// Drains ffmpeg's stderr so a chatty encoder never blocks on a full pipe
    stderr: Option<JoinHandle<String>>,
    path: PathBuf,
    spec: VideoOutputSpec,
    frames_written: usize,
}

impl FfmpegWriter {
    pub fn check_ffmpeg_available(binary: &str) -> bool {
        Command::new(binary)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Spawn ffmpeg ready to receive frames of the output size
    pub fn open<P: AsRef<Path>>(
        path: P,
        spec: &VideoOutputSpec,
        settings: &EncoderSettings,
    ) -> Result<Self, AssemblyError> {
        let path = path.as_ref().to_path_buf();

        if spec.fps == 0 {
            return Err(AssemblyError::writer(&path, "frame rate must be positive"));
        }

        let size = format!("{}x{}", spec.width, spec.height);
        let fps = spec.fps.to_string();
        let crf = settings.crf().to_string();

        let mut cmd = Command::new(&settings.ffmpeg);
        cmd.args(["-hide_banner", "-loglevel", "error", "-y"])
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24"])
            .args(["-s", size.as_str(), "-framerate", fps.as_str(), "-i", "-"])
            .args(["-c:v", settings.codec.as_str(), "-pix_fmt", "yuv420p"])
            .args(["-crf", crf.as_str(), "-r", fps.as_str()])
        .arg(&path)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

        debug!("Spawning {:?}", cmd);

        let mut child = cmd.spawn().map_err(|e| {
            AssemblyError::writer(&path, format!("failed to start {}: {}", settings.ffmpeg, e))
        })?;
        let stdin = child.stdin.take();
        let stderr = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut text = String::new();
                let _ = pipe.read_to_string(&mut text);
                text
            })
        });

        info!("Writing {}x{} @ {} fps to {:?}", spec.width, spec.height, spec.fps, path);

        Ok(Self {
            child,
            stdin,
            stderr,
            path,
            spec: *spec,
            frames_written: 0,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Everything ffmpeg printed. Only call once the child has exited.
    fn stderr_text(&mut self) -> String {
        self.stderr
            .take()
            .and_then(|reader| reader.join().ok())
            .map(|text| text.trim().to_string())
            .unwrap_or_default()
    }

    /// Close stdin and reap the child; ffmpeg finalises whatever it received
    fn close(&mut self) -> Result<std::process::ExitStatus, std::io::Error> {
        drop(self.stdin.take());
        self.child.wait()
    }
}

impl FrameSink for FfmpegWriter {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), AssemblyError> {
        if frame.dimensions() != (self.spec.width, self.spec.height) {
            return Err(AssemblyError::writer(
                &self.path,
                format!(
                    "frame is {}x{}, expected {}x{}",
                    frame.width(),
                    frame.height(),
                    self.spec.width,
                    self.spec.height
                ),
            ));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(AssemblyError::writer(&self.path, "writer already closed"));
        };

        if let Err(e) = stdin.write_all(frame.as_rgb_bytes()) {
            let _ = self.close();
            let stderr = self.stderr_text();
            return Err(AssemblyError::writer(
                &self.path,
                format!("ffmpeg stopped accepting frames ({}): {}", e, stderr),
            ));
        }

        self.frames_written += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<(), AssemblyError> {
        let status = self
            .close()
            .map_err(|e| AssemblyError::writer(&self.path, format!("waiting for ffmpeg: {}", e)))?;

        if !status.success() {
            let stderr = self.stderr_text();
            return Err(AssemblyError::writer(
                &self.path,
                format!("ffmpeg exited with {}: {}", status, stderr),
            ));
        }

        debug!("ffmpeg finished after {} frames", self.frames_written);
        Ok(())
    }
}

impl Drop for FfmpegWriter {
    fn drop(&mut self) {
        if self.stdin.is_some() {
            warn!("Closing {:?} early after {} frames", self.path, self.frames_written);
            if let Err(e) = self.close() {
                warn!("Failed to reap ffmpeg: {}", e);
            }
        }
    }
}
