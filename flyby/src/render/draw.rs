// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Draws a `Figure` as SVG, straight onto the root drawing area in
//! pixel coordinates, and saves it as PDF.

use crate::errors::RenderError;
use crate::render::annotate::HAlign;
use crate::render::colormap::Scale;
use crate::render::layout::Rect;
use crate::render::{Colorbar, Figure, MapImage, Mappable, Panel};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Share of a panel's width given to its own colour bar.
const PANEL_CBAR_SHARE: f64 = 0.22;
const COLORBAR_STEPS: usize = 128;

fn draw_err<E: fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

fn rgb((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

/// Pixel box with the origin at the top left.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Frame {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl Frame {
    fn w(&self) -> f64 {
        self.x1 - self.x0
    }

    fn h(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Pixel at axes fraction `(fx, fy)`, measured from the bottom
    /// left.
    fn at(&self, fx: f64, fy: f64) -> (i32, i32) {
        (
            (self.x0 + fx * self.w()).round() as i32,
            (self.y1 - fy * self.h()).round() as i32,
        )
    }

    /// Largest box of the given width/height ratio centred in this one.
    fn fit(&self, aspect: f64) -> Frame {
        if !aspect.is_finite() || aspect <= 0.0 {
            return *self;
        }
        let (w, h) = if self.w() / self.h() > aspect {
            (self.h() * aspect, self.h())
        } else {
            (self.w(), self.w() / aspect)
        };
        let (cx, cy) = (0.5 * (self.x0 + self.x1), 0.5 * (self.y0 + self.y1));
        Frame {
            x0: cx - 0.5 * w,
            y0: cy - 0.5 * h,
            x1: cx + 0.5 * w,
            y1: cy + 0.5 * h,
        }
    }

    fn corners(&self) -> [(i32, i32); 2] {
        [
            (self.x0.round() as i32, self.y0.round() as i32),
            (self.x1.round() as i32, self.y1.round() as i32),
        ]
    }
}

/// Figure pixels plus room for the outer tick and axis labels.
struct Canvas<'f> {
    width: f64,
    height: f64,
    left: f64,
    top: f64,
    bottom: f64,
    dpi: f64,
    font_px: f64,
    family: &'f str,
    max_cells: usize,
}

impl<'f> Canvas<'f> {
    fn new(fig: &'f Figure) -> Canvas<'f> {
        let dpi = fig.style.dpi;
        let font_px = fig.style.font_size() * dpi / 72.0;
        Canvas {
            width: fig.size.0 * dpi,
            height: fig.size.1 * dpi,
            left: 4.0 * font_px,
            top: 0.5 * font_px,
            bottom: 3.5 * font_px,
            dpi,
            font_px,
            family: &fig.style.font_family,
            max_cells: fig.style.max_cells.max(1),
        }
    }

    fn size(&self) -> (u32, u32) {
        (
            (self.left + self.width + 0.5 * self.font_px).ceil() as u32,
            (self.top + self.height + self.bottom).ceil() as u32,
        )
    }

    fn frame(&self, r: &Rect) -> Frame {
        Frame {
            x0: self.left + r.left * self.width,
            y0: self.top + (1.0 - r.top()) * self.height,
            x1: self.left + r.right() * self.width,
            y1: self.top + (1.0 - r.bottom) * self.height,
        }
    }

    fn points(&self, pt: f64) -> f64 {
        pt * self.dpi / 72.0
    }

    fn text(
        &self,
        area: &Area,
        s: &str,
        at: (i32, i32),
        pos: (HPos, VPos),
        color: &RGBColor,
        vertical: bool,
    ) -> Result<(), RenderError> {
        let mut style = (self.family, self.font_px)
            .into_font()
            .color(color)
            .pos(Pos::new(pos.0, pos.1));
        if vertical {
            style = style.transform(FontTransform::Rotate270);
        }
        area.draw(&Text::new(s.to_string(), at, style))
            .map_err(draw_err)
    }

    fn line(
        &self,
        area: &Area,
        from: (i32, i32),
        to: (i32, i32),
        color: &RGBColor,
        width: f64,
    ) -> Result<(), RenderError> {
        let style = color.stroke_width(width.round().max(1.0) as u32);
        area.draw(&PathElement::new(vec![from, to], style))
            .map_err(draw_err)
    }

    fn draw_image(
        &self,
        area: &Area,
        im: &MapImage,
        m: &Mappable,
        f: Frame,
    ) -> Result<(), RenderError> {
        if im.nx == 0 || im.ny == 0 {
            return Ok(());
        }
        let cx = im.nx.min(self.max_cells);
        let cy = im.ny.min(self.max_cells);
        let xs = |i: usize| (f.x0 + i as f64 * f.w() / cx as f64).round() as i32;
        let ys = |j: usize| (f.y0 + j as f64 * f.h() / cy as f64).round() as i32;
        for j in 0..cy {
            let y = ((cy - 1 - j) as f64 + 0.5) * im.ny as f64 / cy as f64;
            let y = (y as usize).min(im.ny - 1);
            let colors = (0..cx)
                .map(|i| {
                    let x = ((i as f64 + 0.5) * im.nx as f64 / cx as f64) as usize;
                    m.color(im.get(x.min(im.nx - 1), y))
                        .unwrap_or((255, 255, 255))
                })
                .collect::<Vec<(u8, u8, u8)>>();
            let mut start = 0;
            for i in 1..=cx {
                if i == cx || colors[i] != colors[start] {
                    area.draw(&Rectangle::new(
                        [(xs(start), ys(j)), (xs(i), ys(j + 1))],
                        rgb(colors[start]).filled(),
                    ))
                    .map_err(draw_err)?;
                    start = i;
                }
            }
        }
        Ok(())
    }

    fn draw_panel(&self, area: &Area, panel: &Panel, cell: Frame) -> Result<(), RenderError> {
        let cell = if panel.colorbar.is_some() {
            Frame {
                x1: cell.x1 - PANEL_CBAR_SHARE * cell.w(),
                ..cell
            }
        } else {
            cell
        };
        let (im, m) = match (&panel.image, &panel.mappable) {
            (Some(im), Some(m)) => (im, m),
            _ => return Ok(()),
        };
        let e = im.extent;
        let f = cell.fit(e.width() / e.height());
        self.draw_image(area, im, m, f)?;
        area.draw(&Rectangle::new(f.corners(), BLACK.stroke_width(1)))
            .map_err(draw_err)?;

        let tick = rgb(panel.ticks.color);
        let len = self.points(panel.ticks.length);
        let sign = if panel.ticks.inward { 1.0 } else { -1.0 };
        for u in panel.x_ticks() {
            let (x, _) = f.at((u - e.left) / (e.right - e.left), 0.0);
            let (bottom, top) = (f.y1, f.y0);
            self.line(area, (x, bottom as i32), (x, (bottom - sign * len) as i32), &tick, panel.ticks.width)?;
            if panel.ticks.mirrored {
                self.line(area, (x, top as i32), (x, (top + sign * len) as i32), &tick, panel.ticks.width)?;
            }
            if panel.x_tick_labels {
                let at = (x, (f.y1 + 0.3 * self.font_px) as i32);
                self.text(area, &format_tick(u, 0), at, (HPos::Center, VPos::Top), &BLACK, false)?;
            }
        }
        for u in panel.y_ticks() {
            let (_, y) = f.at(0.0, (u - e.bottom) / (e.top - e.bottom));
            let (left, right) = (f.x0, f.x1);
            self.line(area, (left as i32, y), ((left + sign * len) as i32, y), &tick, panel.ticks.width)?;
            if panel.ticks.mirrored {
                self.line(area, (right as i32, y), ((right - sign * len) as i32, y), &tick, panel.ticks.width)?;
            }
            if panel.y_tick_labels {
                let at = ((f.x0 - 0.3 * self.font_px) as i32, y);
                self.text(area, &format_tick(u, 0), at, (HPos::Right, VPos::Center), &BLACK, false)?;
            }
        }
        if let Some(label) = &panel.x_label {
            let at = f.at(0.5, 0.0);
            let at = (at.0, (f.y1 + 1.6 * self.font_px) as i32);
            self.text(area, label, at, (HPos::Center, VPos::Top), &BLACK, false)?;
        }
        if let Some(label) = &panel.y_label {
            let at = f.at(0.0, 0.5);
            let at = ((f.x0 - 2.8 * self.font_px) as i32, at.1);
            self.text(area, label, at, (HPos::Center, VPos::Center), &BLACK, true)?;
        }

        if let Some(fwhm) = panel.beam {
            let r = 0.5 * fwhm / e.width() * f.w();
            let offset = (0.08 * f.w()).max(r + 2.0);
            let centre = ((f.x0 + offset) as i32, (f.y1 - offset) as i32);
            area.draw(&Circle::new(
                centre,
                r.round().max(1.0) as i32,
                RGBColor(200, 200, 200).filled(),
            ))
            .map_err(draw_err)?;
        }

        for t in panel.texts.iter() {
            let h = match t.align {
                HAlign::Left => HPos::Left,
                HAlign::Center => HPos::Center,
                HAlign::Right => HPos::Right,
            };
            let at = f.at(t.position.0, t.position.1);
            self.text(area, &t.text, at, (h, VPos::Center), &WHITE, false)?;
        }

        if let Some(cb) = &panel.colorbar {
            let bar = Frame {
                x0: cell.x1 + 0.1 * self.font_px,
                x1: cell.x1 + 0.1 * self.font_px + 0.04 * cell.w(),
                ..f
            };
            self.draw_colorbar(area, cb, bar)?;
        }
        Ok(())
    }

    fn draw_colorbar(&self, area: &Area, cb: &Colorbar, f: Frame) -> Result<(), RenderError> {
        let m = &cb.mappable;
        for k in 0..COLORBAR_STEPS {
            let t0 = k as f64 / COLORBAR_STEPS as f64;
            let t1 = (k + 1) as f64 / COLORBAR_STEPS as f64;
            let color = rgb(m.cmap.rgb(0.5 * (t0 + t1)));
            area.draw(&Rectangle::new(
                [f.at(0.0, t1), f.at(1.0, t0)],
                color.filled(),
            ))
            .map_err(draw_err)?;
        }
        area.draw(&Rectangle::new(f.corners(), BLACK.stroke_width(1)))
            .map_err(draw_err)?;

        let decimals = tick_decimals(&cb.ticks);
        let len = 0.3 * self.font_px;
        for v in cb.ticks.iter() {
            let t = match m.norm.normalize(*v) {
                Some(t) => t,
                None => continue,
            };
            let (x, y) = f.at(1.0, t);
            self.line(area, (x, y), ((x as f64 - len) as i32, y), &BLACK, 1.0)?;
            let label = match m.norm.scale {
                Scale::Log => format_power(*v),
                Scale::Lin => format_tick(*v, decimals),
            };
            let at = ((f.x1 + 0.3 * self.font_px) as i32, y);
            self.text(area, &label, at, (HPos::Left, VPos::Center), &BLACK, false)?;
        }
        let (_, y) = f.at(1.0, 0.5);
        let at = ((f.x1 + 3.6 * self.font_px) as i32, y);
        self.text(area, &cb.label, at, (HPos::Center, VPos::Center), &BLACK, true)
    }
}

impl Figure {
    /// The figure as an SVG document.
    pub fn svg(&self) -> Result<String, RenderError> {
        let canvas = Canvas::new(self);
        let mut out = String::new();
        {
            let root = SVGBackend::with_string(&mut out, canvas.size())
                .into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;
            for (row, rects) in self.panels.iter().zip(self.rects.iter()) {
                for (panel, rect) in row.iter().zip(rects.iter()) {
                    canvas.draw_panel(&root, panel, canvas.frame(rect))?;
                }
            }
            if let Some((rect, cb)) = &self.colorbar {
                canvas.draw_colorbar(&root, cb, canvas.frame(rect))?;
            }
            root.present().map_err(draw_err)?;
        }
        Ok(out)
    }

    /// Write the figure to `path` as a one page PDF.
    pub fn save(&self, path: &Path) -> Result<(), RenderError> {
        let pdf = svg2pdf::convert_str(&self.svg()?, svg2pdf::Options::default())
            .map_err(draw_err)?;
        fs::write(path, pdf).map_err(|e| RenderError::Io(path.to_path_buf(), e))?;
        debug!("saved {}", path.display());
        Ok(())
    }
}

/// Decimals needed to tell apart evenly spaced ticks.
fn tick_decimals(ticks: &[f64]) -> usize {
    let step = match ticks {
        [a, b, ..] => (b - a).abs(),
        _ => return 0,
    };
    if step == 0.0 || !step.is_finite() {
        return 0;
    }
    let mut d = (-step.log10().floor()).max(0.0) as usize;
    let scaled = step * 10f64.powi(d as i32);
    if (scaled - scaled.round()).abs() > 1e-6 {
        d += 1;
    }
    d
}

fn format_tick(v: f64, decimals: usize) -> String {
    let s = format!("{:.*}", decimals, v);
    // "-0" and "-0.0"
    if s.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        s.trim_start_matches('-').to_string()
    } else {
        s
    }
}

/// `1e-5` as `10⁻⁵`.
fn format_power(v: f64) -> String {
    let e = v.log10().round() as i32;
    let sup = e
        .to_string()
        .chars()
        .map(|c| match c {
            '-' => '\u{207b}',
            '0' => '\u{2070}',
            '1' => '\u{b9}',
            '2' => '\u{b2}',
            '3' => '\u{b3}',
            d => char::from_u32(0x2070 + d.to_digit(10).unwrap_or(0)).unwrap_or(d),
        })
        .collect::<String>();
    format!("10{}", sup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::ProductKind;
    use crate::render::annotate::Positions;
    use crate::render::layout::FigureStyle;
    use crate::render::options::{DisplayOptions, THERMAL};
    use crate::render::plot_figure;
    use crate::render::tests::ramp_grid;

    #[test]
    fn fitted_box_keeps_aspect() {
        let f = Frame {
            x0: 0.0,
            y0: 0.0,
            x1: 200.0,
            y1: 100.0,
        };
        let g = f.fit(1.0);
        assert_eq!((g.x0, g.x1, g.y0, g.y1), (50.0, 150.0, 0.0, 100.0));
        assert_eq!(g.at(0.0, 0.0), (50, 100));
        assert_eq!(g.at(1.0, 1.0), (150, 0));
    }

    #[test]
    fn tick_text() {
        assert_eq!(format_tick(-0.0, 0), "0");
        assert_eq!(format_tick(2.0, 0), "2");
        assert_eq!(tick_decimals(&[0.0, 0.5, 1.0]), 1);
        assert_eq!(tick_decimals(&[0.0, 0.25, 0.5]), 2);
        assert_eq!(tick_decimals(&[0.0, 0.0004, 0.0008]), 4);
        assert_eq!(format_tick(0.30000000000000004, 1), "0.3");
        assert_eq!(format_power(1e-5), "10\u{207b}\u{2075}");
        assert_eq!(format_power(1e-19), "10\u{207b}\u{b9}\u{2079}");
    }

    #[test]
    fn saves_pdf() {
        let tmp = tempfile::tempdir().unwrap();
        let g = ramp_grid(&["100", "110"], &["00"], ProductKind::Image, "W.m-2.pixel-1");
        let fig = plot_figure(
            &g,
            &DisplayOptions::Image(THERMAL.clone()),
            None,
            None,
            &Positions::default(),
            true,
            &FigureStyle::default(),
        )
        .unwrap();
        let svg = fig.svg().unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Flux density"));

        let path = tmp.path().join("thermal_b45_850.pdf");
        fig.save(&path).unwrap();
        let pdf = std::fs::read(&path).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }
}
