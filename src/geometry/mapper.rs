use crate::config::engine::{Baseline, SizingPolicy};
use crate::config::placement::PlacementSpec;
use crate::foundation::core::Size;
use crate::foundation::error::{OverlayerError, OverlayerResult};

/// Overlay rectangle in video pixel space: `[x, x + width) × [y, y + height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OverlayGeometry {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Overlay width in pixels.
    pub width: u32,
    /// Overlay height in pixels.
    pub height: u32,
}

impl OverlayGeometry {
    /// Return `true` when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Overlay size.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }

    /// Return `true` when the rectangle lies fully inside a `video` sized frame.
    pub fn fits_within(&self, video: Size) -> bool {
        self.right() <= u64::from(video.width) && self.bottom() <= u64::from(video.height)
    }
}

/// Compute the overlay's pixel size in the video from its natural size.
///
/// The baseline decides the size at 100% scale; the user scale multiplies on top and aspect ratio
/// is preserved. A result larger than the frame is shrunk uniformly until it fits.
pub fn overlay_size(
    natural: Size,
    video: Size,
    scale: f64,
    policy: &SizingPolicy,
) -> OverlayerResult<Size> {
    if natural.is_empty() {
        return Err(OverlayerError::input(format!(
            "overlay has empty natural size {natural}"
        )));
    }
    if video.is_empty() {
        return Err(OverlayerError::input(format!(
            "video has empty size {video}"
        )));
    }
    if !(scale.is_finite() && scale >= 0.0) {
        return Err(OverlayerError::input(format!("invalid scale {scale}")));
    }

    let nat_w = f64::from(natural.width);
    let nat_h = f64::from(natural.height);
    let baseline_w = match policy.baseline {
        Baseline::VideoWidthFraction(f) => f64::from(video.width) * f,
        Baseline::Natural => nat_w,
    };

    let mut w = baseline_w * scale;
    let mut h = w * nat_h / nat_w;

    let fit = (f64::from(video.width) / w).min(f64::from(video.height) / h);
    if fit < 1.0 {
        w *= fit;
        h *= fit;
    }

    let width = (w.round() as u32).min(video.width);
    let height = (h.round() as u32).min(video.height);
    Ok(Size::new(width, height))
}

/// Map a validated preview-space placement into clamped video-pixel geometry.
///
/// The returned rectangle always satisfies [`OverlayGeometry::fits_within`] for `video`.
pub fn map_placement(
    spec: &PlacementSpec,
    natural: Size,
    video: Size,
    policy: &SizingPolicy,
) -> OverlayerResult<OverlayGeometry> {
    if !(spec.container_width > 0.0 && spec.container_height > 0.0) {
        return Err(OverlayerError::input(format!(
            "container dimensions must be > 0, got {}x{}",
            spec.container_width, spec.container_height
        )));
    }

    let size = overlay_size(natural, video, spec.scale, policy)?;

    let relative_x = spec.pos_x / spec.container_width;
    let relative_y = spec.pos_y / spec.container_height;
    let real_x = relative_x * f64::from(video.width);
    let real_y = relative_y * f64::from(video.height);

    let geom = OverlayGeometry {
        x: clamp_axis(real_x, video.width, size.width),
        y: clamp_axis(real_y, video.height, size.height),
        width: size.width,
        height: size.height,
    };
    debug_assert!(geom.fits_within(video));

    tracing::debug!(
        real_x,
        real_y,
        x = geom.x,
        y = geom.y,
        width = geom.width,
        height = geom.height,
        "mapped overlay placement"
    );
    Ok(geom)
}

/// `max(0, min(pos, extent - len))`, truncated to a whole pixel.
pub fn clamp_axis(pos: f64, extent: u32, len: u32) -> u32 {
    let max_start = extent.saturating_sub(len);
    if !pos.is_finite() || pos <= 0.0 {
        return 0;
    }
    let p = pos.floor();
    if p >= f64::from(max_start) {
        max_start
    } else {
        p as u32
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/mapper.rs"]
mod tests;
