// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Figure geometry, in figure fractions with the origin at the bottom
//! left.

use serde::{Deserialize, Serialize};

/// Figure width is divided by this when a shared colour bar is drawn.
pub const CBAR_SCALE: f64 = 0.8;
/// Right edge of the subplot grid when a shared colour bar is drawn.
pub const CBAR_GRID_RIGHT: f64 = 0.8;
pub const CBAR_AXES: Rect = Rect {
    left: 0.81,
    bottom: 0.01,
    width: 0.03,
    height: 0.98,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn top(&self) -> f64 {
        self.bottom + self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
    /// Gap between columns as a fraction of the panel width.
    pub wspace: f64,
    /// Gap between rows as a fraction of the panel height.
    pub hspace: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Margins {
            left: 0.01,
            bottom: 0.01,
            right: 0.99,
            top: 0.99,
            wspace: 0.01,
            hspace: 0.01,
        }
    }
}

/// Global look of every figure.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FigureStyle {
    /// Inches per panel.
    pub scale: f64,
    /// Font size is `font_scaling * scale` points.
    pub font_scaling: f64,
    pub font_family: String,
    pub dpi: f64,
    /// Images are resampled to at most this many cells per side.
    pub max_cells: usize,
}

impl Default for FigureStyle {
    fn default() -> Self {
        FigureStyle {
            scale: 5.0,
            font_scaling: 4.0,
            font_family: "serif".to_string(),
            dpi: 72.0,
            max_cells: 160,
        }
    }
}

impl FigureStyle {
    pub fn font_size(&self) -> f64 {
        self.font_scaling * self.scale
    }
}

/// Size in inches.
pub fn figure_size(
    nrows: usize,
    ncols: usize,
    scale: f64,
    shared_colorbar: bool,
) -> (f64, f64) {
    let cbar_scale = if shared_colorbar { CBAR_SCALE } else { 1.0 };
    (ncols as f64 * scale / cbar_scale, nrows as f64 * scale)
}

pub fn margins(shared_colorbar: bool) -> Margins {
    let m = Margins::default();
    if shared_colorbar {
        Margins {
            right: CBAR_GRID_RIGHT,
            ..m
        }
    } else {
        m
    }
}

/// Panel rectangles, `[row][column]`, row 0 at the top.
pub fn grid(nrows: usize, ncols: usize, m: &Margins) -> Vec<Vec<Rect>> {
    let w = (m.right - m.left) / (ncols as f64 + m.wspace * (ncols as f64 - 1.0));
    let h = (m.top - m.bottom) / (nrows as f64 + m.hspace * (nrows as f64 - 1.0));
    (0..nrows)
        .map(|r| {
            (0..ncols)
                .map(|c| Rect {
                    left: m.left + c as f64 * w * (1.0 + m.wspace),
                    bottom: m.top - (r + 1) as f64 * h - r as f64 * h * m.hspace,
                    width: w,
                    height: h,
                })
                .collect()
        })
        .collect()
}

/// Integer tick locations in `[lo, hi]` (either order), at most
/// `max_ticks` of them, spaced 1, 2 or 5 times a power of ten.
pub fn integer_ticks(lo: f64, hi: f64, max_ticks: usize) -> Vec<f64> {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    if !(hi - lo).is_finite() || max_ticks == 0 {
        return vec![];
    }
    let mut magnitude = 1.0;
    let step = loop {
        let found = [1.0, 2.0, 5.0].iter().map(|s| s * magnitude).find(|&s| {
            ((hi / s).floor() - (lo / s).ceil()) as usize + 1 <= max_ticks
        });
        if let Some(s) = found {
            break s;
        }
        magnitude *= 10.0;
    };
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

/// Most decades labelled on a log colour bar.
pub const MAX_DECADES: i32 = 60;

/// Ticks for a colour bar range: decades on a log scale, otherwise
/// "nice" linear steps. None for limits that cannot be shown.
pub fn colorbar_ticks(vmin: f64, vmax: f64, log: bool) -> Vec<f64> {
    if !vmin.is_finite() || !vmax.is_finite() || (log && vmin <= 0.0) {
        return vec![];
    }
    if vmax <= vmin {
        return vec![vmin];
    }
    if log {
        let first = (vmin.log10() - 1e-9).ceil() as i32;
        let last = ((vmax.log10() + 1e-9).floor() as i32).min(first + MAX_DECADES);
        return (first..=last).map(|e| 10f64.powi(e)).collect();
    }
    let raw = (vmax - vmin) / 5.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|s| s * magnitude)
        .find(|&s| s >= raw)
        .unwrap_or(10.0 * magnitude);
    let first = (vmin / step).ceil() as i64;
    let last = (vmax / step + 1e-9).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}
