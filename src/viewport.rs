//! Viewport state for the plot: cursor-centered zoom, content-locked pan,
//! and the cell/data coordinate geometry used by pointer gestures.

use ratatui::layout::Rect;

/// Zoom factor applied per wheel step.
pub const ZOOM_STEP: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Current x/y data-coordinate limits of the plot. Mutated in place by zoom
/// and pan; copied out and restored verbatim to preserve the view across a
/// re-render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

/// Shrink or grow `lims` around `center` so the data point at `center`
/// stays at the same coordinate after the transform.
fn zoom_limits(lims: (f64, f64), center: f64, scale: f64) -> (f64, f64) {
    let (left, right) = lims;
    let new_left = center - (center - left) / scale;
    let new_right = center + (right - center) / scale;
    (new_left, new_right)
}

impl Viewport {
    pub fn new(x: (f64, f64), y: (f64, f64)) -> Self {
        Self { x, y }
    }

    /// Zoom the x-limits around `focal`. A missing focal coordinate (pointer
    /// outside the plot area) falls back to the midpoint of the current
    /// limits.
    pub fn zoom_x(&mut self, focal: Option<f64>, direction: ZoomDirection) {
        let center = focal.unwrap_or((self.x.0 + self.x.1) / 2.0);
        self.x = zoom_limits(self.x, center, Self::scale(direction));
    }

    /// Zoom the y-limits around `focal`, midpoint fallback as for `zoom_x`.
    pub fn zoom_y(&mut self, focal: Option<f64>, direction: ZoomDirection) {
        let center = focal.unwrap_or((self.y.0 + self.y.1) / 2.0);
        self.y = zoom_limits(self.y, center, Self::scale(direction));
    }

    fn scale(direction: ZoomDirection) -> f64 {
        match direction {
            ZoomDirection::In => ZOOM_STEP,
            ZoomDirection::Out => 1.0 / ZOOM_STEP,
        }
    }

    /// Shift both limit pairs by the pointer's data-space delta, so the
    /// content under the cursor follows the drag.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.x = (self.x.0 - dx, self.x.1 - dx);
        self.y = (self.y.0 - dy, self.y.1 - dy);
    }
}

/// Full-extent viewport for a segment: x spans the row axis with half-cell
/// padding, y spans the series values with a small margin.
pub fn full_extent(segment_len: usize, y_min: f64, y_max: f64) -> Viewport {
    let x = if segment_len == 0 {
        (-0.5, 0.5)
    } else {
        (-0.5, segment_len as f64 - 0.5)
    };
    let (y_min, y_max) = if y_max > y_min {
        (y_min, y_max)
    } else {
        (y_min - 0.5, y_min + 0.5)
    };
    let margin = (y_max - y_min) * 0.05;
    Viewport::new(x, (y_min - margin, y_max + margin))
}

/// Conversion between terminal cells of the plot area and data coordinates
/// under a given viewport. This is the only place pixel/cell arithmetic
/// happens; everything downstream works in data space.
#[derive(Debug, Clone, Copy)]
pub struct PlotGeometry {
    area: Rect,
    viewport: Viewport,
}

impl PlotGeometry {
    pub fn new(area: Rect, viewport: Viewport) -> Self {
        Self { area, viewport }
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.area.x
            && column < self.area.x + self.area.width
            && row >= self.area.y
            && row < self.area.y + self.area.height
    }

    /// Data coordinates at the center of the terminal cell, or None when the
    /// cell lies outside the plot area.
    pub fn data_coords(&self, column: u16, row: u16) -> Option<(f64, f64)> {
        if !self.contains(column, row) || self.area.width == 0 || self.area.height == 0 {
            return None;
        }
        let fx = (column - self.area.x) as f64 + 0.5;
        let fy = (row - self.area.y) as f64 + 0.5;
        let (x0, x1) = self.viewport.x;
        let (y0, y1) = self.viewport.y;
        let x = x0 + fx / self.area.width as f64 * (x1 - x0);
        // Terminal rows grow downward; data y grows upward.
        let y = y1 - fy / self.area.height as f64 * (y1 - y0);
        Some((x, y))
    }

    /// Terminal column whose cell covers data coordinate `x`, or None when
    /// `x` is outside the current x-limits.
    pub fn column_for_x(&self, x: f64) -> Option<u16> {
        let (x0, x1) = self.viewport.x;
        if self.area.width == 0 || x1 <= x0 || x < x0 || x >= x1 {
            return None;
        }
        let frac = (x - x0) / (x1 - x0);
        let col = (frac * self.area.width as f64).floor() as u16;
        Some(self.area.x + col.min(self.area.width - 1))
    }
}

/// Convert a pair of drag x-coordinates (data space) into a row-index
/// selection local to the segment: round to the nearest row, order the
/// endpoints, and clamp to `[0, segment_len)`. Empty segments select
/// nothing.
pub fn selection_from_drag(x0: f64, x1: f64, segment_len: usize) -> Option<(usize, usize)> {
    if segment_len == 0 {
        return None;
    }
    let a = x0.round() as i64;
    let b = x1.round() as i64;
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let max = segment_len as i64 - 1;
    let lo = lo.clamp(0, max);
    let hi = hi.clamp(0, max);
    Some((lo as usize, hi as usize))
}
