use image::{ImageBuffer, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VideoError};

/// Represents a single video frame
///
/// This is a thin wrapper around an RGB image buffer. Still images are loaded
/// into a `Frame` once and effects derive new frames from it.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with black
    pub fn new_black(width: u32, height: u32) -> Self {
        Self {
            buffer: ImageBuffer::new(width, height),
        }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgb(color));
        Self { buffer }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.buffer.get_pixel(x, y).0
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Get a mutable reference to the underlying image buffer
    pub fn as_image_mut(&mut self) -> &mut RgbImage {
        &mut self.buffer
    }

    /// Raw interleaved RGB bytes, row-major
    pub fn as_rgb_bytes(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> std::result::Result<(), image::ImageError> {
        self.buffer.save(path)
    }
}

/// Number of frames in a clip: `round(duration * fps)`, never less than one
pub fn frame_count(duration: f64, fps: u32) -> u32 {
    let frames = (duration * fps as f64).round();
    if frames < 1.0 {
        1
    } else {
        frames.min(u32::MAX as f64) as u32
    }
}

/// Position of one frame within its clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTiming {
    pub index: u32,
    pub total: u32,
}

impl FrameTiming {
    pub fn new(index: u32, total: u32) -> Self {
        Self { index, total }
    }

    /// Progress fraction `index / total`, in `[0, 1)`.
    ///
    /// The last frame never reaches 1.0; ramps stop one step short of their
    /// end value.
    pub fn progress(&self) -> f64 {
        self.index as f64 / self.total.max(1) as f64
    }
}

/// Resolution, rate and length of one effect clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipPlan {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub total_frames: u32,
}

impl ClipPlan {
    /// Plan a clip at the given resolution, validating the timing parameters
    pub fn new(width: u32, height: u32, duration: f64, fps: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(VideoError::InvalidParameters {
                details: format!("resolution must be non-zero, got {}x{}", width, height),
            }
            .into());
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(VideoError::InvalidParameters {
                details: format!("duration must be positive, got {}", duration),
            }
            .into());
        }
        if fps == 0 {
            return Err(VideoError::InvalidParameters {
                details: "fps must be positive".to_string(),
            }
            .into());
        }

        Ok(Self {
            width,
            height,
            fps,
            total_frames: frame_count(duration, fps),
        })
    }

    pub fn timing(&self, index: u32) -> FrameTiming {
        FrameTiming::new(index, self.total_frames)
    }

    pub fn timings(&self) -> impl Iterator<Item = FrameTiming> + '_ {
        (0..self.total_frames).map(move |index| self.timing(index))
    }

    /// Actual clip length after rounding to whole frames
    pub fn duration(&self) -> f64 {
        self.total_frames as f64 / self.fps as f64
    }
}

/// Encoder parameters for the output video stream
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderParams {
    /// ffmpeg executable name or path
    pub ffmpeg: String,

    /// Video codec to use for output
    pub codec: String,

    /// Output pixel format
    pub pixel_format: String,

    /// Quality setting (0-100, higher is better)
    pub quality: u8,
}

impl Default for EncoderParams {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            codec: "libx264".to_string(),
            pixel_format: "yuv420p".to_string(),
            quality: 85,
        }
    }
}

impl EncoderParams {
    /// Map the 0-100 quality scale onto x264/x265 CRF (0-51, lower is better)
    pub fn crf(&self) -> u8 {
        51 - ((self.quality.min(100) as f32 / 100.0) * 51.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count_rounds_and_clamps() {
        assert_eq!(frame_count(5.0, 24), 120);
        assert_eq!(frame_count(1.26, 10), 13);
        assert_eq!(frame_count(1.24, 10), 12);
        assert_eq!(frame_count(0.01, 24), 1);
    }

    #[test]
    fn test_progress_never_reaches_one() {
        let plan = ClipPlan::new(4, 4, 1.0, 10).unwrap();
        let last = plan.timing(plan.total_frames - 1);
        assert!((last.progress() - 0.9).abs() < 1e-12);
        assert_eq!(plan.timing(0).progress(), 0.0);
    }

    #[test]
    fn test_clip_plan_rejects_bad_timing() {
        assert!(ClipPlan::new(4, 4, 0.0, 24).is_err());
        assert!(ClipPlan::new(4, 4, -1.0, 24).is_err());
        assert!(ClipPlan::new(4, 4, f64::NAN, 24).is_err());
        assert!(ClipPlan::new(4, 4, 1.0, 0).is_err());
        assert!(ClipPlan::new(0, 4, 1.0, 24).is_err());
    }

    #[test]
    fn test_quality_to_crf() {
        let mut params = EncoderParams::default();
        params.quality = 100;
        assert_eq!(params.crf(), 0);
        params.quality = 0;
        assert_eq!(params.crf(), 51);
    }

    #[test]
    fn test_frame_bytes_are_row_major_rgb() {
        let mut frame = Frame::new_filled(3, 2, [1, 2, 3]);
        frame.as_image_mut().put_pixel(1, 0, Rgb([9, 8, 7]));
        assert_eq!(frame.as_rgb_bytes().len(), 18);
        assert_eq!(&frame.as_rgb_bytes()[3..6], &[9, 8, 7]);
    }
}
