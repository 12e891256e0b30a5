use std::path::Path;

use anyhow::Context as _;
use image::imageops::FilterType;
use image::{ImageFormat, Rgba32FImage, RgbaImage};

use crate::foundation::core::Size;
use crate::foundation::error::{OverlayerError, OverlayerResult};
use crate::foundation::math::round_to_u8;

/// Raw overlay bytes plus their declared format (`None` = sniff from content).
#[derive(Clone, Debug)]
pub struct OverlayImage {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// Declared format, if known.
    pub format: Option<ImageFormat>,
}

impl OverlayImage {
    /// Wrap in-memory bytes with an optional declared format.
    pub fn from_bytes(bytes: Vec<u8>, format: Option<ImageFormat>) -> Self {
        Self { bytes, format }
    }

    /// Read a file, inferring the format from its extension when possible.
    pub fn from_path(path: &Path) -> OverlayerResult<Self> {
        if !path.is_file() {
            return Err(OverlayerError::input(format!(
                "overlay image '{}' does not exist",
                path.display()
            )));
        }
        let bytes =
            std::fs::read(path).with_context(|| format!("read overlay '{}'", path.display()))?;
        Ok(Self {
            bytes,
            format: ImageFormat::from_path(path).ok(),
        })
    }
}

/// Straight-alpha RGBA8 pixels, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaBuffer {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

impl RgbaBuffer {
    fn from_image(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            rgba: img.into_raw(),
        }
    }

    fn empty(size: Size) -> Self {
        Self {
            width: size.width,
            height: size.height,
            rgba: Vec::new(),
        }
    }
}

/// A decoded, sized overlay ready for compositing.
///
/// Whether the overlay carries meaningful alpha is decided once at load time; the compositor
/// dispatches on the variant instead of inspecting pixels per frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverlayAsset {
    /// Every pixel is fully opaque (alpha synthesized or uniformly 255).
    Opaque(RgbaBuffer),
    /// Per-pixel alpha must be honored.
    Alpha(RgbaBuffer),
}

impl OverlayAsset {
    /// Borrow the pixel buffer.
    pub fn buffer(&self) -> &RgbaBuffer {
        match self {
            Self::Opaque(b) | Self::Alpha(b) => b,
        }
    }

    /// Overlay width in pixels.
    pub fn width(&self) -> u32 {
        self.buffer().width
    }

    /// Overlay height in pixels.
    pub fn height(&self) -> u32 {
        self.buffer().height
    }

    /// Overlay size.
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Return `true` for the opaque variant.
    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque(_))
    }

    /// Return `true` when the overlay covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }
}

/// Overlay decoded at its natural size, before the mapper picks a target size.
#[derive(Clone, Debug)]
pub struct DecodedOverlay {
    image: RgbaImage,
    opaque: bool,
}

impl DecodedOverlay {
    /// Natural pixel size of the decoded image.
    pub fn natural_size(&self) -> Size {
        let (w, h) = self.image.dimensions();
        Size::new(w, h)
    }

    /// Return `true` when no pixel is translucent.
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    /// Resample to `target` with a Lanczos3 filter and freeze into an [`OverlayAsset`].
    pub fn into_asset(self, target: Size) -> OverlayAsset {
        let Self { image: img, opaque } = self;

        let buffer = if target.is_empty() {
            RgbaBuffer::empty(target)
        } else if img.dimensions() == (target.width, target.height) {
            RgbaBuffer::from_image(img)
        } else if opaque {
            let resized =
                image::imageops::resize(&img, target.width, target.height, FilterType::Lanczos3);
            RgbaBuffer::from_image(resized)
        } else {
            RgbaBuffer::from_image(resize_premultiplied(&img, target))
        };

        if opaque {
            let mut buffer = buffer;
            // Resampling must not introduce translucency into an opaque overlay.
            for px in buffer.rgba.chunks_exact_mut(4) {
                px[3] = u8::MAX;
            }
            OverlayAsset::Opaque(buffer)
        } else {
            OverlayAsset::Alpha(buffer)
        }
    }
}

/// Lanczos3 resample in premultiplied `f32`, so color hidden under zero alpha never bleeds into
/// visible edges. Returns straight-alpha RGBA8.
fn resize_premultiplied(img: &RgbaImage, target: Size) -> RgbaImage {
    let mut premul = Rgba32FImage::new(img.width(), img.height());
    for (src, dst) in img.pixels().zip(premul.pixels_mut()) {
        let a = f32::from(src.0[3]) / 255.0;
        let c = |v: u8| f32::from(v) / 255.0 * a;
        dst.0 = [c(src.0[0]), c(src.0[1]), c(src.0[2]), a];
    }

    let resized =
        image::imageops::resize(&premul, target.width, target.height, FilterType::Lanczos3);

    let mut out = RgbaImage::new(target.width, target.height);
    for (src, dst) in resized.pixels().zip(out.pixels_mut()) {
        // Lanczos lobes can ring below zero or above one.
        let a = src.0[3].clamp(0.0, 1.0);
        if a <= 0.0 {
            dst.0 = [0, 0, 0, 0];
            continue;
        }
        let c = |v: f32| round_to_u8(v / a * 255.0);
        dst.0 = [c(src.0[0]), c(src.0[1]), c(src.0[2]), round_to_u8(a * 255.0)];
    }
    out
}

/// Decode overlay bytes into RGBA, synthesizing a fully opaque alpha channel when the source
/// format has none.
#[tracing::instrument(skip(overlay), fields(bytes = overlay.bytes.len(), format = ?overlay.format))]
pub fn decode_overlay(overlay: &OverlayImage) -> OverlayerResult<DecodedOverlay> {
    if overlay.bytes.is_empty() {
        return Err(OverlayerError::input("overlay image is empty"));
    }

    let dyn_img = match overlay.format {
        Some(format) => image::load_from_memory_with_format(&overlay.bytes, format),
        None => image::load_from_memory(&overlay.bytes),
    }
    .map_err(|e| OverlayerError::decode(format!("decode overlay image: {e}")))?;

    let has_alpha_channel = dyn_img.color().has_alpha();
    let rgba = dyn_img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(OverlayerError::decode("overlay image has zero size"));
    }

    let opaque = !has_alpha_channel || rgba.pixels().all(|p| p.0[3] == u8::MAX);
    tracing::debug!(
        width = rgba.width(),
        height = rgba.height(),
        has_alpha_channel,
        opaque,
        "decoded overlay"
    );

    Ok(DecodedOverlay {
        image: rgba,
        opaque,
    })
}

/// Decode and size an overlay in one step.
pub fn load_overlay(overlay: &OverlayImage, target: Size) -> OverlayerResult<OverlayAsset> {
    Ok(decode_overlay(overlay)?.into_asset(target))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/overlay.rs"]
mod tests;
