use std::fs::create_dir_all;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use tracing::{debug, warn};

use crate::error::{Result, VideoError};
use crate::video::types::{ClipPlan, EncoderParams, Frame};

/// Destination for the frames of one clip, written strictly in index order.
///
/// A sink owns its output resource until `finish` or `abort` is called;
/// implementations release it on drop as well.
pub trait FrameSink {
    /// Append the next frame
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Flush and close the output
    fn finish(&mut self) -> Result<()>;

    /// Release the output without producing a result, discarding partial data
    fn abort(&mut self);
}

fn check_frame(plan: &ClipPlan, frame: &Frame) -> Result<()> {
    if frame.width() != plan.width || frame.height() != plan.height {
        return Err(VideoError::FrameMismatch {
            got_width: frame.width(),
            got_height: frame.height(),
            expected_width: plan.width,
            expected_height: plan.height,
        }
        .into());
    }
    Ok(())
}

pub fn check_ffmpeg_available(ffmpeg: &str) -> bool {
    Command::new(ffmpeg)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Streams raw RGB frames into an `ffmpeg` child process
pub struct FfmpegEncoder {
    output: PathBuf,
    plan: ClipPlan,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    frames_written: u32,
}

impl FfmpegEncoder {
    /// Start an encoder writing a silent video to `output`, replacing any existing file
    pub fn new<P: AsRef<Path>>(output: P, plan: ClipPlan, params: &EncoderParams) -> Result<Self> {
        let output = output.as_ref().to_path_buf();
        ensure_parent_dir(&output)?;

        if !check_ffmpeg_available(&params.ffmpeg) {
            return Err(VideoError::Encode {
                reason: format!("FFmpeg not found ({}). Please install FFmpeg.", params.ffmpeg),
            }
            .into());
        }

        let odd = plan.width % 2 != 0 || plan.height % 2 != 0;
        let pixel_format = if odd && params.pixel_format == "yuv420p" {
            warn!(
                "{}x{} is not even; encoding {:?} as yuv444p instead of yuv420p",
                plan.width, plan.height, output
            );
            "yuv444p"
        } else {
            params.pixel_format.as_str()
        };

        let mut cmd = Command::new(&params.ffmpeg);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .args([
                "-y",
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-s",
                &format!("{}x{}", plan.width, plan.height),
                "-r",
                &plan.fps.to_string(),
                "-i",
                "pipe:0",
                "-an",
                "-c:v",
                &params.codec,
                "-pix_fmt",
                pixel_format,
            ]);

        if params.codec.starts_with("libx26") {
            cmd.args(["-crf", &params.crf().to_string()]);
        }
        cmd.args(["-movflags", "+faststart"]).arg(&output);

        let mut child = cmd.spawn().map_err(|e| VideoError::Encode {
            reason: format!("Failed to spawn FFmpeg process: {}", e),
        })?;

        let stdin = child.stdin.take().ok_or_else(|| VideoError::Encode {
            reason: "FFmpeg stdin unavailable".to_string(),
        })?;

        debug!(
            "Encoding {:?}: {}x{} @ {} fps, {} frames",
            output, plan.width, plan.height, plan.fps, plan.total_frames
        );

        Ok(Self {
            output,
            plan,
            child: Some(child),
            stdin: Some(stdin),
            frames_written: 0,
        })
    }
}

impl FrameSink for FfmpegEncoder {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        check_frame(&self.plan, frame)?;

        let stdin = self.stdin.as_mut().ok_or_else(|| VideoError::Encode {
            reason: "encoder is already finalized".to_string(),
        })?;

        stdin
            .write_all(frame.as_rgb_bytes())
            .map_err(|e| VideoError::Encode {
                reason: format!("Failed to write frame {} to FFmpeg: {}", self.frames_written, e),
            })?;

        self.frames_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        drop(self.stdin.take());

        let child = self.child.take().ok_or_else(|| VideoError::Encode {
            reason: "encoder is already finalized".to_string(),
        })?;

        let output = child.wait_with_output().map_err(|e| VideoError::Encode {
            reason: format!("FFmpeg execution failed: {}", e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let _ = std::fs::remove_file(&self.output);
            return Err(VideoError::Encode {
                reason: format!("FFmpeg exited with {}: {}", output.status, stderr.trim()),
            }
            .into());
        }

        if self.frames_written != self.plan.total_frames {
            let _ = std::fs::remove_file(&self.output);
            return Err(VideoError::Encode {
                reason: format!(
                    "expected {} frames, wrote {}",
                    self.plan.total_frames, self.frames_written
                ),
            }
            .into());
        }

        debug!("Finished {:?} ({} frames)", self.output, self.frames_written);
        Ok(())
    }

    fn abort(&mut self) {
        drop(self.stdin.take());

        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            if let Err(e) = std::fs::remove_file(&self.output) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove partial output {:?}: {}", self.output, e);
                }
            }
        }
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

/// Writes each frame as a numbered PNG (`frame_000000.png`, ...) in a directory
pub struct PngSequenceSink {
    dir: PathBuf,
    plan: ClipPlan,
    written: Vec<PathBuf>,
    finished: bool,
}

impl PngSequenceSink {
    pub fn new<P: AsRef<Path>>(dir: P, plan: ClipPlan) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        create_dir_all(&dir)?;
        Ok(Self {
            dir,
            plan,
            written: Vec::with_capacity(plan.total_frames as usize),
            finished: false,
        })
    }

    pub fn frame_paths(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        check_frame(&self.plan, frame)?;
        if self.finished {
            return Err(VideoError::Encode {
                reason: "frame sequence is already finalized".to_string(),
            }
            .into());
        }

        let path = self.dir.join(format!("frame_{:06}.png", self.written.len()));
        frame.save_png(&path).map_err(|e| VideoError::Encode {
            reason: format!("Failed to save frame {:?}: {}", path, e),
        })?;
        self.written.push(path);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        for path in self.written.drain(..) {
            let _ = std::fs::remove_file(path);
        }
        self.finished = true;
    }
}

/// Collects frames in memory
#[derive(Debug)]
pub struct MemorySink {
    plan: ClipPlan,
    frames: Vec<Frame>,
    finished: bool,
}

impl MemorySink {
    pub fn new(plan: ClipPlan) -> Self {
        Self {
            plan,
            frames: Vec::with_capacity(plan.total_frames as usize),
            finished: false,
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for MemorySink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        check_frame(&self.plan, frame)?;
        if self.finished {
            return Err(VideoError::Encode {
                reason: "sink is already finalized".to_string(),
            }
            .into());
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.frames.clear();
        self.finished = true;
    }
}
