// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Line cubes and their velocity moments.

use crate::errors::{LoadError, RenderError};
use crate::products::beam::convolve;
use crate::products::fits::Hdu;
use crate::products::image::ARCSEC_PER_DEG;
use crate::products::{finite_range, Product, ProductKind};
use crate::render::colormap::{Norm, Scale};
use crate::render::options::{DisplayOptions, MomentOptions};
use crate::render::{colorbar_label, Colorbar, Extent, MapImage, Mappable, Panel};
use std::path::{Path, PathBuf};

pub const VELOCITY_UNIT: &str = "km.s-1";

#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub path: PathBuf,
    pub nx: usize,
    pub ny: usize,
    pub nv: usize,
    /// `[v][y][x]` of the first transition, inclination and azimuth.
    pub cube: Vec<f64>,
    /// Channel velocities in km/s.
    pub velocities: Vec<f64>,
    /// Arcsec per pixel.
    pub pixelscale: f64,
    pub unit: String,
}

impl Line {
    pub fn from_hdu(hdu: Hdu, path: &Path) -> Result<Line, LoadError> {
        if hdu.shape.len() < 3 {
            return Err(LoadError::Shape(format!(
                "line cube has {} axes, expected at least 3",
                hdu.shape.len()
            )));
        }
        let (nx, ny, nv) = (hdu.shape[0], hdu.shape[1], hdu.shape[2]);
        let h = &hdu.header;
        let cdelt = h.require_f64("CDELT3")?;
        let crval = h.get_f64("CRVAL3").unwrap_or(0.0);
        let crpix = h.get_f64("CRPIX3").unwrap_or((nv as f64 + 1.0) / 2.0);
        let velocities = (0..nv)
            .map(|k| crval + (k as f64 + 1.0 - crpix) * cdelt)
            .collect();
        let pixelscale = h.require_f64("CDELT2")?.abs() * ARCSEC_PER_DEG;
        let unit = h.get_str("BUNIT").unwrap_or("").to_string();
        let mut cube = hdu.data;
        cube.truncate(nx * ny * nv);
        Ok(Line {
            path: path.to_path_buf(),
            nx,
            ny,
            nv,
            cube,
            velocities,
            pixelscale,
            unit,
        })
    }

    fn channel(&self, k: usize) -> &[f64] {
        let n = self.nx * self.ny;
        &self.cube[k * n..(k + 1) * n]
    }

    /// Channel width in km/s.
    pub fn dv(&self) -> f64 {
        match self.velocities.as_slice() {
            [a, b, ..] => (b - a).abs(),
            _ => 1.0,
        }
    }

    /// Moment `order` of the continuum subtracted cube, the first
    /// channel being taken as continuum. Moments 1 and 2 are NaN where
    /// moment 0 is not positive.
    pub fn moment(&self, order: usize, psf_fwhm: Option<f64>) -> Result<Vec<f64>, LoadError> {
        if order > 2 {
            return Err(LoadError::Shape(format!("no moment {}", order)));
        }
        let channels = (0..self.nv)
            .map(|k| match psf_fwhm {
                Some(fwhm) => convolve(self.channel(k), self.nx, self.ny, fwhm / self.pixelscale),
                None => self.channel(k).to_vec(),
            })
            .collect::<Vec<Vec<f64>>>();
        let dv = self.dv();
        let n = self.nx * self.ny;
        let r = (0..n)
            .map(|i| {
                let line = channels
                    .iter()
                    .zip(self.velocities.iter())
                    .map(|(c, v)| (c[i] - channels[0][i], *v))
                    .collect::<Vec<(f64, f64)>>();
                let m0: f64 = line.iter().map(|(f, _)| f * dv).sum();
                if order == 0 {
                    return m0;
                }
                if m0 <= 0.0 {
                    return f64::NAN;
                }
                let m1 = line.iter().map(|(f, v)| f * v * dv).sum::<f64>() / m0;
                if order == 1 {
                    return m1;
                }
                let var = line
                    .iter()
                    .map(|(f, v)| f * (v - m1) * (v - m1) * dv)
                    .sum::<f64>()
                    / m0;
                var.max(0.0).sqrt()
            })
            .collect();
        Ok(r)
    }
}

pub fn moment_norm(values: &[f64], o: &MomentOptions) -> Norm {
    let range = finite_range(values, o.scale == Scale::Log);
    Norm::new(
        o.fmin.or_else(|| range.map(|(lo, _)| lo)).unwrap_or(0.0),
        o.fmax.or_else(|| range.map(|(_, hi)| hi)).unwrap_or(1.0),
        o.scale,
    )
}

impl Product for Line {
    fn kind(&self) -> ProductKind {
        ProductKind::Line
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
        let lo = match options {
            DisplayOptions::Line(lo) => lo,
            _ => return Err(RenderError::OptionsMismatch),
        };
        let (order, o) = moment
            .and_then(|m| lo.moment(m).map(|o| (m, o)))
            .ok_or(RenderError::MissingMomentOptions(moment))?;
        let values = self
            .moment(order, o.psf_fwhm)
            .map_err(|e| RenderError::Load(self.path.clone(), e))?;
        let unit = if order == 0 {
            self.unit.clone()
        } else {
            VELOCITY_UNIT.to_string()
        };
        let mappable = Mappable {
            norm: moment_norm(&values, o),
            cmap: o.cmap,
            unit,
        };
        panel.imshow(
            MapImage {
                nx: self.nx,
                ny: self.ny,
                values,
                extent: Extent::sky(self.nx, self.ny, self.pixelscale),
            },
            mappable.clone(),
        );
        if o.plot_beam {
            panel.beam = o.psf_fwhm;
        }
        if colorbar {
            let label = colorbar_label(options, moment, &mappable.unit);
            panel.colorbar = Some(Colorbar::new(mappable.clone(), label));
        }
        Ok(mappable)
    }
}
