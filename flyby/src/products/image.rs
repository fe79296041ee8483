// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::errors::{LoadError, RenderError};
use crate::products::beam::{beam_area, convolve};
use crate::products::fits::Hdu;
use crate::products::{finite_range, Product, ProductKind};
use crate::render::colormap::{Norm, Scale};
use crate::render::options::{DisplayOptions, ImageOptions, Stokes};
use crate::render::{colorbar_label, Colorbar, Extent, MapImage, Mappable, Panel};
use std::path::{Path, PathBuf};

pub const ARCSEC_PER_DEG: f64 = 3600.0;

/// Continuum image. Data are `[stokes][azimuth][inclination][y][x]`
/// with `x` fastest; only the first azimuth and inclination are shown.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub path: PathBuf,
    pub nx: usize,
    pub ny: usize,
    pub n_incl: usize,
    pub n_az: usize,
    pub n_stokes: usize,
    pub data: Vec<f64>,
    /// Arcsec per pixel.
    pub pixelscale: f64,
    pub unit: String,
}

impl Image {
    pub fn from_hdu(hdu: Hdu, path: &Path) -> Result<Image, LoadError> {
        if hdu.shape.len() < 2 || hdu.shape.len() > 5 {
            return Err(LoadError::Shape(format!(
                "image has {} axes, expected 2 to 5",
                hdu.shape.len()
            )));
        }
        let axis = |i: usize| hdu.shape.get(i).copied().unwrap_or(1);
        let pixelscale = hdu.header.require_f64("CDELT2")?.abs() * ARCSEC_PER_DEG;
        Ok(Image {
            path: path.to_path_buf(),
            nx: axis(0),
            ny: axis(1),
            n_incl: axis(2),
            n_az: axis(3),
            n_stokes: axis(4),
            pixelscale,
            unit: hdu.header.get_str("BUNIT").unwrap_or("").to_string(),
            data: hdu.data,
        })
    }

    fn plane(&self, stokes: usize) -> Result<&[f64], LoadError> {
        if stokes >= self.n_stokes {
            return Err(LoadError::Shape(format!(
                "Stokes component {} requested, image has {}",
                stokes, self.n_stokes
            )));
        }
        let n = self.nx * self.ny;
        let start = n * self.n_incl * self.n_az * stokes;
        Ok(&self.data[start..start + n])
    }

    /// Values of the requested Stokes component.
    pub fn stokes(&self, flux: Stokes) -> Result<Vec<f64>, LoadError> {
        Ok(match flux {
            Stokes::I => self.plane(0)?.to_vec(),
            Stokes::Q => self.plane(1)?.to_vec(),
            Stokes::U => self.plane(2)?.to_vec(),
            Stokes::V => self.plane(3)?.to_vec(),
            Stokes::Pi => self
                .plane(1)?
                .iter()
                .zip(self.plane(2)?)
                .map(|(q, u)| (q * q + u * u).sqrt())
                .collect(),
        })
    }

    /// The map as displayed with `o`, and its unit.
    ///
    /// The PSF is applied first, then the per beam rescaling, then the
    /// coronagraph.
    pub fn map(&self, o: &ImageOptions) -> Result<(MapImage, String), LoadError> {
        let mut values = self.stokes(o.flux)?;
        let mut unit = self.unit.clone();
        if let Some(fwhm) = o.psf_fwhm {
            values = convolve(&values, self.nx, self.ny, fwhm / self.pixelscale);
            if o.per_beam {
                let factor = beam_area(fwhm) / (self.pixelscale * self.pixelscale);
                values.iter_mut().for_each(|v| *v *= factor);
                unit = unit.replace("pixel", "beam").replace("PIXEL", "BEAM");
            }
        }
        let extent = Extent::sky(self.nx, self.ny, self.pixelscale);
        if let Some(radius) = o.coronagraph {
            for y in 0..self.ny {
                for x in 0..self.nx {
                    let dx = (x as f64 + 0.5) * self.pixelscale - 0.5 * extent.width();
                    let dy = (y as f64 + 0.5) * self.pixelscale - 0.5 * extent.height();
                    if dx.hypot(dy) < radius {
                        values[x + self.nx * y] = f64::NAN;
                    }
                }
            }
        }
        Ok((
            MapImage {
                nx: self.nx,
                ny: self.ny,
                values,
                extent,
            },
            unit,
        ))
    }
}

/// Colour limits: explicit values win, then `fpeak` and
/// `dynamic_range`, then the data range. See `Norm::new` for log scales
/// without positive limits.
pub fn image_norm(values: &[f64], o: &ImageOptions) -> Norm {
    let log = o.scale == Scale::Log;
    let range = finite_range(values, log);
    let vmax = o
        .vmax
        .or_else(|| {
            let peak = range.map(|(_, hi)| hi)?;
            Some(o.fpeak.map_or(peak, |f| f * peak))
        })
        .unwrap_or(1.0);
    let vmin = o
        .vmin
        .or_else(|| o.dynamic_range.map(|d| vmax / d))
        .or_else(|| range.map(|(lo, _)| lo))
        .unwrap_or(0.0);
    Norm::new(vmin, vmax, o.scale)
}

impl Product for Image {
    fn kind(&self) -> ProductKind {
        ProductKind::Image
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
        let o = match options {
            DisplayOptions::Image(o) => o,
            _ => return Err(RenderError::OptionsMismatch),
        };
        let (map, unit) = self
            .map(o)
            .map_err(|e| RenderError::Load(self.path.clone(), e))?;
        let mappable = Mappable {
            norm: image_norm(&map.values, o),
            cmap: o.cmap,
            unit,
        };
        panel.imshow(map, mappable.clone());
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
