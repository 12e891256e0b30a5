use crate::foundation::error::{OverlayerError, OverlayerResult};

/// Placement parameters as reported by the caller's preview UI.
///
/// Positions are in preview-container pixels; `scale_percent` is relative to the sizing
/// policy's baseline and `opacity_percent` runs from 0 (invisible) to 100 (as authored).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlacementRequest {
    /// Preview container width in pixels.
    pub container_width: f64,
    /// Preview container height in pixels.
    pub container_height: f64,
    /// Horizontal position inside the container.
    #[serde(default)]
    pub pos_x: f64,
    /// Vertical position inside the container.
    #[serde(default)]
    pub pos_y: f64,
    /// Scale relative to the baseline size (100 = baseline).
    #[serde(default = "default_percent")]
    pub scale_percent: f64,
    /// Overlay opacity in percent.
    #[serde(default = "default_percent")]
    pub opacity_percent: f64,
}

fn default_percent() -> f64 {
    100.0
}

impl PlacementRequest {
    /// Request with the container at `width`x`height` and default position/scale/opacity.
    pub fn new(container_width: f64, container_height: f64) -> Self {
        Self {
            container_width,
            container_height,
            pos_x: 0.0,
            pos_y: 0.0,
            scale_percent: 100.0,
            opacity_percent: 100.0,
        }
    }

    /// Builder-style position setter.
    pub fn at(mut self, pos_x: f64, pos_y: f64) -> Self {
        self.pos_x = pos_x;
        self.pos_y = pos_y;
        self
    }

    /// Builder-style scale setter.
    pub fn scaled(mut self, scale_percent: f64) -> Self {
        self.scale_percent = scale_percent;
        self
    }

    /// Builder-style opacity setter.
    pub fn with_opacity(mut self, opacity_percent: f64) -> Self {
        self.opacity_percent = opacity_percent;
        self
    }

    /// Validate at ingress and convert percentages to ratios.
    pub fn validate(&self) -> OverlayerResult<PlacementSpec> {
        check_finite("container_width", self.container_width)?;
        check_finite("container_height", self.container_height)?;
        check_finite("pos_x", self.pos_x)?;
        check_finite("pos_y", self.pos_y)?;
        check_finite("scale_percent", self.scale_percent)?;
        check_finite("opacity_percent", self.opacity_percent)?;

        if self.container_width <= 0.0 || self.container_height <= 0.0 {
            return Err(OverlayerError::input(format!(
                "container dimensions must be > 0, got {}x{}",
                self.container_width, self.container_height
            )));
        }
        if self.scale_percent < 0.0 {
            return Err(OverlayerError::input(format!(
                "scale_percent must be >= 0, got {}",
                self.scale_percent
            )));
        }
        if !(0.0..=100.0).contains(&self.opacity_percent) {
            return Err(OverlayerError::input(format!(
                "opacity_percent must be within 0..=100, got {}",
                self.opacity_percent
            )));
        }

        Ok(PlacementSpec {
            container_width: self.container_width,
            container_height: self.container_height,
            pos_x: self.pos_x,
            pos_y: self.pos_y,
            scale: self.scale_percent / 100.0,
            opacity: (self.opacity_percent / 100.0) as f32,
        })
    }
}

fn check_finite(field: &str, v: f64) -> OverlayerResult<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(OverlayerError::input(format!("{field} must be a finite number")))
    }
}

/// Validated placement: preview-space position, scale ratio and opacity in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PlacementSpec {
    /// Preview container width in pixels (> 0).
    pub container_width: f64,
    /// Preview container height in pixels (> 0).
    pub container_height: f64,
    /// Horizontal position inside the container.
    pub pos_x: f64,
    /// Vertical position inside the container.
    pub pos_y: f64,
    /// Scale ratio relative to the baseline (1.0 = baseline).
    pub scale: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
}

#[cfg(test)]
#[path = "../../tests/unit/config/placement.rs"]
mod tests;
