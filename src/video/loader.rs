use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use crate::error::{Result, VideoError};
use crate::video::types::Frame;

/// Loads still images into RGB frames
pub struct ImageLoader;

impl ImageLoader {
    /// Decode an image file into an RGB8 frame.
    ///
    /// Alpha is dropped and grayscale is expanded, so every frame has three
    /// channels in R, G, B order.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Frame> {
        let path = path.as_ref();

        let image = image::open(path).map_err(|e| VideoError::ImageDecode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let rgb_image = match image {
            DynamicImage::ImageRgb8(img) => img,
            other => other.to_rgb8(),
        };

        if rgb_image.width() == 0 || rgb_image.height() == 0 {
            return Err(VideoError::ImageDecode {
                path: path.display().to_string(),
                reason: "image has no pixels".to_string(),
            }
            .into());
        }

        debug!("Loaded {:?} ({}x{})", path, rgb_image.width(), rgb_image.height());
        Ok(Frame::new(rgb_image))
    }
}
