use crate::foundation::core::{FrameIndex, Size};
use crate::foundation::error::{OverlayerError, OverlayerResult};

/// Channel layout of a frame buffer (8 bits per channel).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelLayout {
    /// Packed RGB, 3 bytes per pixel.
    Rgb8,
    /// Packed straight-alpha RGBA, 4 bytes per pixel.
    Rgba8,
}

impl PixelLayout {
    /// Bytes per pixel.
    pub fn channels(self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }

    /// ffmpeg `-pix_fmt` name for raw pipes.
    pub fn ffmpeg_pix_fmt(self) -> &'static str {
        match self {
            Self::Rgb8 => "rgb24",
            Self::Rgba8 => "rgba",
        }
    }

    /// Byte length of a tightly packed `width`x`height` buffer.
    pub fn frame_len(self, width: u32, height: u32) -> OverlayerResult<usize> {
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(self.channels()))
            .ok_or_else(|| OverlayerError::decode("frame buffer size overflow"))
    }
}

/// One decoded video frame, row-major and tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Ordinal position in the source.
    pub index: FrameIndex,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Channel layout of `data`.
    pub layout: PixelLayout,
    /// Pixel bytes.
    pub data: Vec<u8>,
}

impl Frame {
    /// Wrap an existing buffer, checking its length against the dimensions.
    pub fn new(
        index: FrameIndex,
        width: u32,
        height: u32,
        layout: PixelLayout,
        data: Vec<u8>,
    ) -> OverlayerResult<Self> {
        let expected = layout.frame_len(width, height)?;
        if data.len() != expected {
            return Err(OverlayerError::decode(format!(
                "frame buffer has {} bytes, expected {expected} for {width}x{height} {layout:?}",
                data.len()
            )));
        }
        Ok(Self {
            index,
            width,
            height,
            layout,
            data,
        })
    }

    /// A frame filled with a single pixel value. `px` must match the layout's channel count.
    pub fn filled(index: FrameIndex, width: u32, height: u32, px: &[u8]) -> OverlayerResult<Self> {
        let layout = match px.len() {
            3 => PixelLayout::Rgb8,
            4 => PixelLayout::Rgba8,
            n => {
                return Err(OverlayerError::input(format!(
                    "fill pixel must have 3 or 4 channels, got {n}"
                )));
            }
        };
        let pixels = (width as usize) * (height as usize);
        Self::new(index, width, height, layout, px.repeat(pixels))
    }

    /// Frame dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Borrow the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let ch = self.layout.channels();
        let off = ((y as usize) * (self.width as usize) + (x as usize)) * ch;
        &self.data[off..off + ch]
    }

    /// Return `true` when `data` length matches `width * height * channels`.
    pub fn is_consistent(&self) -> bool {
        self.layout
            .frame_len(self.width, self.height)
            .is_ok_and(|len| len == self.data.len())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/frame.rs"]
mod tests;
