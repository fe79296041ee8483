// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Grid figures: one panel per (column, row) product, axes shared by
//! convention, optionally one colour bar for the whole figure.
//!
//! `plot_figure` only builds a `Figure`; nothing touches the disk until
//! `Figure::save`.

pub mod annotate;
pub mod colormap;
pub mod draw;
pub mod layout;
pub mod options;

use crate::errors::RenderError;
use crate::products::Product;
use crate::render::annotate::{Annotations, HAlign, Positions};
use crate::render::colormap::{ColorMap, Norm, Scale};
use crate::render::layout::{
    colorbar_ticks, figure_size, grid, integer_ticks, margins, FigureStyle,
    Rect, CBAR_AXES,
};
use crate::render::options::DisplayOptions;

pub const SKY_X_LABEL: &str = "\u{394} RA (\")";
pub const SKY_Y_LABEL: &str = "\u{394} Dec (\")";

/// Axis limits of an image in arcsec from the centre. East is to the
/// left, so `left > right` for sky images.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl Extent {
    pub fn sky(nx: usize, ny: usize, pixelscale: f64) -> Extent {
        let hx = 0.5 * nx as f64 * pixelscale;
        let hy = 0.5 * ny as f64 * pixelscale;
        Extent {
            left: hx,
            right: -hx,
            bottom: -hy,
            top: hy,
        }
    }

    pub fn width(&self) -> f64 {
        (self.right - self.left).abs()
    }

    pub fn height(&self) -> f64 {
        (self.top - self.bottom).abs()
    }
}

/// A map ready to be coloured: row major, `x` fastest, row 0 at the
/// bottom.
#[derive(Clone, Debug, PartialEq)]
pub struct MapImage {
    pub nx: usize,
    pub ny: usize,
    pub values: Vec<f64>,
    pub extent: Extent,
}

impl MapImage {
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.values[x + self.nx * y]
    }
}

/// How values become colours.
#[derive(Clone, Debug, PartialEq)]
pub struct Mappable {
    pub norm: Norm,
    pub cmap: ColorMap,
    pub unit: String,
}

impl Mappable {
    pub fn color(&self, v: f64) -> Option<(u8, u8, u8)> {
        self.norm.normalize(v).map(|t| self.cmap.rgb(t))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Colorbar {
    pub mappable: Mappable,
    pub label: String,
    pub ticks: Vec<f64>,
}

impl Colorbar {
    pub fn new(mappable: Mappable, label: String) -> Colorbar {
        let Norm { vmin, vmax, scale } = mappable.norm;
        Colorbar {
            ticks: colorbar_ticks(vmin, vmax, scale == Scale::Log),
            mappable,
            label,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickStyle {
    pub color: (u8, u8, u8),
    /// In points.
    pub length: f64,
    pub width: f64,
    pub inward: bool,
    /// Ticks on the top and right spines as well.
    pub mirrored: bool,
    pub max_ticks: usize,
}

impl Default for TickStyle {
    fn default() -> Self {
        TickStyle {
            color: (255, 255, 255),
            length: 12.0,
            width: 1.0,
            inward: true,
            mirrored: true,
            max_ticks: 7,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PanelText {
    /// Axes fraction, from the bottom left.
    pub position: (f64, f64),
    pub align: HAlign,
    pub text: String,
}

/// One cell of a figure.
#[derive(Clone, Debug, PartialEq)]
pub struct Panel {
    pub image: Option<MapImage>,
    pub mappable: Option<Mappable>,
    /// Beam FWHM in arcsec, drawn in the bottom left corner.
    pub beam: Option<f64>,
    pub colorbar: Option<Colorbar>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub x_tick_labels: bool,
    pub y_tick_labels: bool,
    pub ticks: TickStyle,
    pub texts: Vec<PanelText>,
}

impl Default for Panel {
    fn default() -> Self {
        Panel::new()
    }
}

impl Panel {
    pub fn new() -> Panel {
        Panel {
            image: None,
            mappable: None,
            beam: None,
            colorbar: None,
            x_label: None,
            y_label: None,
            x_tick_labels: true,
            y_tick_labels: true,
            ticks: TickStyle::default(),
            texts: vec![],
        }
    }

    /// Show a sky image.
    pub fn imshow(&mut self, image: MapImage, mappable: Mappable) {
        self.image = Some(image);
        self.mappable = Some(mappable);
        self.x_label = Some(SKY_X_LABEL.to_string());
        self.y_label = Some(SKY_Y_LABEL.to_string());
    }

    pub fn x_ticks(&self) -> Vec<f64> {
        self.image.as_ref().map_or(vec![], |im| {
            integer_ticks(im.extent.left, im.extent.right, self.ticks.max_ticks)
        })
    }

    pub fn y_ticks(&self) -> Vec<f64> {
        self.image.as_ref().map_or(vec![], |im| {
            integer_ticks(im.extent.bottom, im.extent.top, self.ticks.max_ticks)
        })
    }

    fn hide_x_labels(&mut self) {
        self.x_label = None;
        self.x_tick_labels = false;
    }

    fn hide_y_labels(&mut self) {
        self.y_label = None;
        self.y_tick_labels = false;
    }
}

pub struct Figure {
    /// Width and height in inches.
    pub size: (f64, f64),
    pub style: FigureStyle,
    pub columns: Vec<String>,
    pub rows: Vec<String>,
    /// `[row][column]`, matching `panels`.
    pub rects: Vec<Vec<Rect>>,
    pub panels: Vec<Vec<Panel>>,
    pub colorbar: Option<(Rect, Colorbar)>,
}

impl Figure {
    pub fn nrows(&self) -> usize {
        self.panels.len()
    }

    pub fn ncols(&self) -> usize {
        self.panels.first().map_or(0, |r| r.len())
    }

    pub fn axes(&self) -> &[Vec<Panel>] {
        &self.panels
    }

    pub fn panel(&self, row: usize, column: usize) -> Option<&Panel> {
        self.panels.get(row).and_then(|r| r.get(column))
    }
}

/// Products keyed by column and then by row, both in insertion order.
#[derive(Default)]
pub struct ProductGrid {
    columns: Vec<(String, Vec<(String, Box<dyn Product>)>)>,
}

impl ProductGrid {
    pub fn new() -> ProductGrid {
        ProductGrid::default()
    }

    /// Replaces any product already at (column, row).
    pub fn insert(&mut self, column: &str, row: &str, product: Box<dyn Product>) {
        let ix = match self.columns.iter().position(|(c, _)| c == column) {
            Some(ix) => ix,
            None => {
                self.columns.push((column.to_string(), vec![]));
                self.columns.len() - 1
            }
        };
        let cells = &mut self.columns[ix].1;
        match cells.iter_mut().find(|(r, _)| r == row) {
            Some(cell) => cell.1 = product,
            None => cells.push((row.to_string(), product)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_keys(&self) -> Vec<String> {
        self.columns.iter().map(|(c, _)| c.clone()).collect()
    }

    /// Rows of the first column.
    pub fn row_keys(&self) -> Vec<String> {
        self.columns.first().map_or(vec![], |(_, cells)| {
            cells.iter().map(|(r, _)| r.clone()).collect()
        })
    }

    pub fn get(&self, column: &str, row: &str) -> Option<&dyn Product> {
        self.columns
            .iter()
            .find(|(c, _)| c == column)
            .and_then(|(_, cells)| cells.iter().find(|(r, _)| r == row))
            .map(|(_, p)| p.as_ref())
    }
}

/// Unit string as it should read on a label.
pub fn format_unit(unit: &str) -> String {
    unit.replace("-1", "\u{207b}\u{b9}")
        .replace("-2", "\u{207b}\u{b2}")
        .replace("JY", "Jy")
        .replace("PIXEL", "pixel")
}

/// Colour bar label for a product drawn with `options`, `unit` being
/// the unit of the drawn values.
pub fn colorbar_label(
    options: &DisplayOptions,
    moment: Option<usize>,
    unit: &str,
) -> String {
    let unit = format_unit(unit);
    match options {
        DisplayOptions::Image(o) => format!("{} [{}]", o.flux.flux_name(), unit),
        DisplayOptions::Line(_) => match moment {
            Some(1) => "Velocity [km.s\u{207b}\u{b9}]".to_string(),
            Some(2) => "Velocity dispersion [km.s\u{207b}\u{b9}]".to_string(),
            _ => format!("Flux [{} km.s\u{207b}\u{b9}]", unit),
        },
    }
}

/// Lay `products` out on a grid, columns being the outer keys and rows
/// the inner keys of the first column.
///
/// Each product draws its own panel. With `colorbar_figure` a single
/// colour bar, keyed to the last panel drawn, is placed right of the
/// grid; otherwise every panel gets its own.
pub fn plot_figure(
    products: &ProductGrid,
    options: &DisplayOptions,
    moment: Option<usize>,
    text: Option<&Annotations>,
    positions: &Positions,
    colorbar_figure: bool,
    style: &FigureStyle,
) -> Result<Figure, RenderError> {
    let columns = products.column_keys();
    let rows = products.row_keys();
    if columns.is_empty() || rows.is_empty() {
        return Err(RenderError::EmptyGrid);
    }
    if let DisplayOptions::Line(o) = options {
        if moment.and_then(|m| o.moment(m)).is_none() {
            return Err(RenderError::MissingMomentOptions(moment));
        }
    }
    let (nrows, ncols) = (rows.len(), columns.len());

    let mut panels = Vec::with_capacity(nrows);
    let mut last = None;
    for (r, row) in rows.iter().enumerate() {
        let mut line = Vec::with_capacity(ncols);
        for (c, column) in columns.iter().enumerate() {
            let product = products.get(column, row).ok_or_else(|| {
                RenderError::MissingCell {
                    column: column.clone(),
                    row: row.clone(),
                }
            })?;
            if product.kind() != options.kind() {
                return Err(RenderError::OptionsMismatch);
            }
            let mut panel = Panel::new();
            let mappable =
                product.draw(&mut panel, !colorbar_figure, options, moment)?;
            panel.ticks = TickStyle::default();
            if r + 1 < nrows {
                panel.hide_x_labels();
            }
            if c > 0 {
                panel.hide_y_labels();
            }
            if let Some(cell) = text.and_then(|t| t.get(column, row)) {
                for (label, s) in cell {
                    let position = positions.get(label).ok_or_else(|| {
                        RenderError::UnknownPosition(label.clone())
                    })?;
                    panel.texts.push(PanelText {
                        position,
                        align: HAlign::for_label(label),
                        text: s.clone(),
                    });
                }
            }
            last = Some(mappable);
            line.push(panel);
        }
        panels.push(line);
    }

    let colorbar = match last {
        Some(m) if colorbar_figure => {
            let label = colorbar_label(options, moment, &m.unit);
            Some((CBAR_AXES, Colorbar::new(m, label)))
        }
        _ => None,
    };

    Ok(Figure {
        size: figure_size(nrows, ncols, style.scale, colorbar_figure),
        style: style.clone(),
        rects: grid(nrows, ncols, &margins(colorbar_figure)),
        columns,
        rows,
        panels,
        colorbar,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::products::ProductKind;
    use crate::render::annotate::AnnotationStyle;
    use crate::render::colormap::Palette;
    use crate::render::options::{MOLECULAR, THERMAL};

    /// A 4 by 4 ramp that records nothing but its unit.
    pub(crate) struct Ramp {
        pub kind: ProductKind,
        pub unit: String,
    }

    impl Product for Ramp {
        fn kind(&self) -> ProductKind {
            self.kind
        }

        fn unit(&self) -> &str {
            &self.unit
        }

        fn draw(
            &self,
            panel: &mut Panel,
            colorbar: bool,
            options: &DisplayOptions,
            moment: Option<usize>,
        ) -> Result<Mappable, RenderError> {
            let m = Mappable {
                norm: Norm {
                    vmin: 0.0,
                    vmax: 15.0,
                    scale: Scale::Lin,
                },
                cmap: ColorMap::new(Palette::Viridis),
                unit: self.unit.clone(),
            };
            panel.imshow(
                MapImage {
                    nx: 4,
                    ny: 4,
                    values: (0..16).map(|v| v as f64).collect(),
                    extent: Extent::sky(4, 4, 1.0),
                },
                m.clone(),
            );
            if colorbar {
                panel.colorbar = Some(Colorbar::new(
                    m.clone(),
                    colorbar_label(options, moment, &self.unit),
                ));
            }
            Ok(m)
        }
    }

    pub(crate) fn ramp_grid(
        columns: &[&str],
        rows: &[&str],
        kind: ProductKind,
        unit: &str,
    ) -> ProductGrid {
        let mut g = ProductGrid::new();
        for c in columns {
            for r in rows {
                g.insert(
                    c,
                    r,
                    Box::new(Ramp {
                        kind,
                        unit: unit.to_string(),
                    }),
                );
            }
        }
        g
    }

    fn thermal() -> DisplayOptions {
        DisplayOptions::Image(THERMAL.clone())
    }

    #[test]
    fn grid_shape_follows_keys() {
        let g = ramp_grid(&["100", "110", "120"], &["00", "90"], ProductKind::Image, "W.m-2.pixel-1");
        let fig = plot_figure(
            &g,
            &thermal(),
            None,
            None,
            &Positions::default(),
            true,
            &FigureStyle::default(),
        )
        .unwrap();
        assert_eq!((fig.nrows(), fig.ncols()), (2, 3));
        assert_eq!(fig.columns, vec!["100", "110", "120"]);
        assert_eq!(fig.size, (15.0 / 0.8, 10.0));
    }

    #[test]
    fn tick_labels_only_on_outer_panels() {
        let g = ramp_grid(&["100", "110"], &["00", "45", "90"], ProductKind::Image, "Jy");
        let fig = plot_figure(
            &g,
            &thermal(),
            None,
            None,
            &Positions::default(),
            true,
            &FigureStyle::default(),
        )
        .unwrap();
        for (r, row) in fig.axes().iter().enumerate() {
            for (c, p) in row.iter().enumerate() {
                assert_eq!(p.x_tick_labels, r == 2);
                assert_eq!(p.x_label.is_some(), r == 2);
                assert_eq!(p.y_tick_labels, c == 0);
                assert_eq!(p.y_label.is_some(), c == 0);
                assert_eq!(p.ticks, TickStyle::default());
            }
        }
        assert_eq!(fig.panel(0, 0).unwrap().x_ticks(), vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn missing_cell_is_an_error() {
        let mut g = ramp_grid(&["100"], &["00", "90"], ProductKind::Image, "Jy");
        g.insert(
            "110",
            "00",
            Box::new(Ramp {
                kind: ProductKind::Image,
                unit: "Jy".into(),
            }),
        );
        let r = plot_figure(
            &g,
            &thermal(),
            None,
            None,
            &Positions::default(),
            true,
            &FigureStyle::default(),
        );
        match r {
            Err(RenderError::MissingCell { column, row }) => {
                assert_eq!((column.as_str(), row.as_str()), ("110", "90"))
            }
            _ => panic!("expected a missing cell"),
        }
        let empty = plot_figure(
            &ProductGrid::new(),
            &thermal(),
            None,
            None,
            &Positions::default(),
            true,
            &FigureStyle::default(),
        );
        assert!(matches!(empty, Err(RenderError::EmptyGrid)));
    }

    #[test]
    fn shared_colorbar_label_uses_unit_substitutions() {
        let g = ramp_grid(&["100"], &["00"], ProductKind::Image, "W.m-2.PIXEL-1");
        let fig = plot_figure(
            &g,
            &thermal(),
            None,
            None,
            &Positions::default(),
            true,
            &FigureStyle::default(),
        )
        .unwrap();
        let (rect, cbar) = fig.colorbar.as_ref().unwrap();
        assert_eq!(*rect, CBAR_AXES);
        assert_eq!(cbar.label, "Flux density [W.m\u{207b}\u{b2}.pixel\u{207b}\u{b9}]");
        assert!(fig.panel(0, 0).unwrap().colorbar.is_none());
    }

    #[test]
    fn per_panel_colorbars_without_shared_one() {
        let g = ramp_grid(&["100", "110"], &["00"], ProductKind::Line, "JY/BEAM");
        let line = DisplayOptions::Line(MOLECULAR.clone());
        let fig = plot_figure(
            &g,
            &line,
            Some(0),
            None,
            &Positions::default(),
            false,
            &FigureStyle::default(),
        )
        .unwrap();
        assert!(fig.colorbar.is_none());
        assert_eq!(fig.size, (10.0, 5.0));
        for p in fig.axes()[0].iter() {
            assert_eq!(
                p.colorbar.as_ref().unwrap().label,
                "Flux [Jy/BEAM km.s\u{207b}\u{b9}]"
            );
        }
    }

    #[test]
    fn line_figures_need_moment_options() {
        let g = ramp_grid(&["100"], &["00"], ProductKind::Line, "Jy");
        let line = DisplayOptions::Line(MOLECULAR.clone());
        for moment in [None, Some(3)].iter() {
            let r = plot_figure(
                &g,
                &line,
                *moment,
                None,
                &Positions::default(),
                true,
                &FigureStyle::default(),
            );
            assert!(matches!(r, Err(RenderError::MissingMomentOptions(_))));
        }
    }

    #[test]
    fn annotations_are_aligned_by_label() {
        let g = ramp_grid(&["100", "110"], &["00"], ProductKind::Image, "Jy");
        let text = Annotations::build(
            &AnnotationStyle::default(),
            "45",
            &["100".to_string(), "110".to_string()],
            &["00".to_string()],
        );
        let fig = plot_figure(
            &g,
            &thermal(),
            None,
            Some(&text),
            &Positions::default(),
            true,
            &FigureStyle::default(),
        )
        .unwrap();
        let texts = &fig.panel(0, 1).unwrap().texts;
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0].align, HAlign::Left);
        assert_eq!(texts[0].position, (0.05, 0.90));
        assert_eq!(texts[0].text, "t = 550 yr");
        assert_eq!(texts[1].align, HAlign::Right);

        let mut odd = Annotations::default();
        odd.insert("100", "00", "middle", "x".to_string());
        let r = plot_figure(
            &g,
            &thermal(),
            None,
            Some(&odd),
            &Positions::default(),
            true,
            &FigureStyle::default(),
        );
        assert!(matches!(r, Err(RenderError::UnknownPosition(_))));
    }

    #[test]
    fn options_must_match_product_kind() {
        let g = ramp_grid(&["100"], &["00"], ProductKind::Line, "Jy");
        let r = plot_figure(
            &g,
            &thermal(),
            None,
            None,
            &Positions::default(),
            true,
            &FigureStyle::default(),
        );
        assert!(matches!(r, Err(RenderError::OptionsMismatch)));
    }

    #[test]
    fn moment_labels() {
        let line = DisplayOptions::Line(MOLECULAR.clone());
        assert_eq!(colorbar_label(&line, Some(1), "km.s-1"), "Velocity [km.s\u{207b}\u{b9}]");
        assert_eq!(
            colorbar_label(&line, Some(2), "km.s-1"),
            "Velocity dispersion [km.s\u{207b}\u{b9}]"
        );
    }
}
