use crate::assets::overlay::{OverlayAsset, RgbaBuffer};
use crate::foundation::error::{OverlayerError, OverlayerResult};
use crate::foundation::math::{blend_channel, effective_alpha, round_to_u8};
use crate::geometry::mapper::OverlayGeometry;
use crate::media::frame::{Frame, PixelLayout};

/// Outcome of blending the overlay into one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlendReport {
    /// The ROI had to be clipped to the frame bounds.
    pub clipped: bool,
    /// Number of frame pixels written.
    pub pixels: u64,
}

/// Clipped ROI in frame coordinates, `[x0, x1) × [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Roi {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

/// Blend `overlay` into `frame` at `geom` with `opacity` in `[0, 1]`.
///
/// `alpha_eff = overlay.alpha / 255 * opacity` and each color channel becomes
/// `alpha_eff * overlay + (1 - alpha_eff) * frame`, rounded to u8. Pixels outside the ROI are left
/// untouched. An ROI that extends past the frame is clipped to the valid region and reported; an
/// ROI that misses the frame entirely, or buffers inconsistent with their dimensions, fail with
/// [`OverlayerError::Blend`] and leave the frame unmodified.
pub fn composite_frame(
    frame: &mut Frame,
    overlay: &OverlayAsset,
    geom: OverlayGeometry,
    opacity: f32,
) -> OverlayerResult<BlendReport> {
    let opacity = if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if opacity <= 0.0 || geom.is_empty() {
        return Ok(BlendReport::default());
    }

    if !frame.is_consistent() {
        return Err(OverlayerError::blend(format!(
            "frame {} buffer does not match {}x{} {:?}",
            frame.index.0, frame.width, frame.height, frame.layout
        )));
    }
    let buf = overlay.buffer();
    if (buf.width, buf.height) != (geom.width, geom.height) {
        return Err(OverlayerError::blend(format!(
            "overlay is {}x{} but geometry expects {}x{}",
            buf.width, buf.height, geom.width, geom.height
        )));
    }
    if buf.rgba.len() != (buf.width as usize) * (buf.height as usize) * 4 {
        return Err(OverlayerError::blend("overlay buffer does not match its size"));
    }

    let roi = clip_roi(geom, frame.width, frame.height).ok_or_else(|| {
        OverlayerError::blend(format!(
            "overlay rect {}x{}+{}+{} lies outside {}x{} frame {}",
            geom.width, geom.height, geom.x, geom.y, frame.width, frame.height, frame.index.0
        ))
    })?;
    let clipped = u64::from(roi.x1) != geom.right() || u64::from(roi.y1) != geom.bottom();
    if clipped {
        tracing::warn!(
            frame = frame.index.0,
            x = geom.x,
            y = geom.y,
            width = geom.width,
            height = geom.height,
            frame_width = frame.width,
            frame_height = frame.height,
            "overlay ROI exceeds frame bounds; clipping"
        );
    }

    match overlay {
        OverlayAsset::Opaque(buf) if opacity >= 1.0 => copy_opaque(frame, buf, geom, roi),
        OverlayAsset::Opaque(buf) => blend_rows(frame, buf, geom, roi, |_| opacity),
        OverlayAsset::Alpha(buf) => {
            blend_rows(frame, buf, geom, roi, |a| effective_alpha(a, opacity))
        }
    }

    Ok(BlendReport {
        clipped,
        pixels: u64::from(roi.x1 - roi.x0) * u64::from(roi.y1 - roi.y0),
    })
}

fn clip_roi(geom: OverlayGeometry, width: u32, height: u32) -> Option<Roi> {
    let x1 = geom.right().min(u64::from(width)) as u32;
    let y1 = geom.bottom().min(u64::from(height)) as u32;
    if geom.x >= x1 || geom.y >= y1 {
        return None;
    }
    Some(Roi {
        x0: geom.x,
        y0: geom.y,
        x1,
        y1,
    })
}

/// Row slices `(frame_row, overlay_row)` covering the ROI.
fn roi_rows<'a>(
    frame: &'a mut Frame,
    overlay: &'a RgbaBuffer,
    geom: OverlayGeometry,
    roi: Roi,
) -> impl Iterator<Item = (&'a mut [u8], &'a [u8])> + 'a {
    let ch = frame.layout.channels();
    let frame_stride = frame.width as usize * ch;
    let ov_stride = overlay.width as usize * 4;
    let cols = (roi.x1 - roi.x0) as usize;
    let fx = roi.x0 as usize * ch;
    let ox = (roi.x0 - geom.x) as usize * 4;
    let oy0 = (roi.y0 - geom.y) as usize;

    frame
        .data
        .chunks_exact_mut(frame_stride)
        .skip(roi.y0 as usize)
        .take((roi.y1 - roi.y0) as usize)
        .zip(overlay.rgba.chunks_exact(ov_stride).skip(oy0))
        .map(move |(frow, orow)| (&mut frow[fx..fx + cols * ch], &orow[ox..ox + cols * 4]))
}

fn copy_opaque(frame: &mut Frame, overlay: &RgbaBuffer, geom: OverlayGeometry, roi: Roi) {
    let layout = frame.layout;
    let ch = layout.channels();
    for (frow, orow) in roi_rows(frame, overlay, geom, roi) {
        for (d, s) in frow.chunks_exact_mut(ch).zip(orow.chunks_exact(4)) {
            d[..3].copy_from_slice(&s[..3]);
            if layout == PixelLayout::Rgba8 {
                d[3] = u8::MAX;
            }
        }
    }
}

fn blend_rows(
    frame: &mut Frame,
    overlay: &RgbaBuffer,
    geom: OverlayGeometry,
    roi: Roi,
    alpha_of: impl Fn(u8) -> f32,
) {
    let layout = frame.layout;
    let ch = layout.channels();
    for (frow, orow) in roi_rows(frame, overlay, geom, roi) {
        for (d, s) in frow.chunks_exact_mut(ch).zip(orow.chunks_exact(4)) {
            let a = alpha_of(s[3]);
            if a <= 0.0 {
                continue;
            }
            d[0] = blend_channel(s[0], d[0], a);
            d[1] = blend_channel(s[1], d[1], a);
            d[2] = blend_channel(s[2], d[2], a);
            if layout == PixelLayout::Rgba8 {
                d[3] = round_to_u8(a * 255.0 + (1.0 - a) * f32::from(d[3]));
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
