//! Software-rendered frame sink

use hc_abi::{ImageData, PixelFormat, RendererType, VideoInfo};
use hc_core::{HydraError, Result};
use tracing::trace;

/// A copied video frame, rows packed to `width * bytes_per_pixel`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

impl Frame {
    pub fn row_len(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel() as usize
    }

    /// Bytes of the pixel at (`x`, `y`)
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.format.bytes_per_pixel() as usize;
        let start = y as usize * self.row_len() + x as usize * bpp;
        self.pixels.get(start..start + bpp)
    }
}

#[derive(Default)]
pub struct FrameSink {
    video: Option<VideoInfo>,
    latest: Option<Frame>,
    frames: u64,
}

impl FrameSink {
    pub fn configure(&mut self, video: Option<VideoInfo>) {
        self.video = video;
        self.latest = None;
    }

    pub fn reset(&mut self) {
        self.video = None;
        self.latest = None;
        self.frames = 0;
    }

    /// Copy a pushed frame. Only software-rendered cores may push frames.
    pub fn push(&mut self, image: &ImageData<'_>) -> Result<()> {
        match self.video {
            Some(video) if video.renderer == RendererType::Software => {}
            _ => return Err(HydraError::NotSoftwareRendered),
        }

        let row_len = image.width as usize * image.format.bytes_per_pixel() as usize;
        let stride = image.stride as usize;
        if stride < row_len {
            return Err(HydraError::Core(format!(
                "stride {} is smaller than a packed row of {} bytes",
                stride, row_len
            )));
        }

        let mut pixels = Vec::with_capacity(row_len * image.height as usize);
        for row in image.data.chunks(stride).take(image.height as usize) {
            let row = row.get(..row_len).ok_or_else(|| {
                HydraError::Core("image data ends inside a row".to_string())
            })?;
            pixels.extend_from_slice(row);
        }

        self.frames += 1;
        trace!(
            "Frame {} received: {}x{} {:?}",
            self.frames,
            image.width,
            image.height,
            image.format
        );
        self.latest = Some(Frame {
            width: image.width,
            height: image.height,
            format: image.format,
            pixels,
        });
        Ok(())
    }

    pub fn latest(&self) -> Option<&Frame> {
        self.latest.as_ref()
    }

    pub fn take_latest(&mut self) -> Option<Frame> {
        self.latest.take()
    }

    pub fn frames_received(&self) -> u64 {
        self.frames
    }
}
