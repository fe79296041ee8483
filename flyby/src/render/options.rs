// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Display options per radiation class. Defaults are the values used
//! for the flyby paper figures.

use crate::products::ProductKind;
use crate::render::colormap::{ColorMap, Palette, Scale};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Which Stokes component (or derived quantity) an image shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Stokes {
    I,
    Q,
    U,
    V,
    /// Polarized intensity, sqrt(Q^2 + U^2).
    #[serde(rename = "PI")]
    Pi,
}

impl Stokes {
    /// Quantity name used in colour bar labels.
    pub fn flux_name(&self) -> &'static str {
        match self {
            Stokes::I => "Flux density",
            Stokes::Q => "Q",
            Stokes::U => "U",
            Stokes::V => "V",
            Stokes::Pi => "PI",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ImageOptions {
    pub flux: Stokes,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    /// vmin = vmax / dynamic_range when vmin is not given.
    pub dynamic_range: Option<f64>,
    /// vmax = fpeak * peak when vmax is not given.
    pub fpeak: Option<f64>,
    /// Gaussian PSF FWHM in arcsec.
    pub psf_fwhm: Option<f64>,
    pub plot_beam: bool,
    /// Express fluxes per beam rather than per pixel.
    pub per_beam: bool,
    pub scale: Scale,
    pub cmap: ColorMap,
    /// Radius in arcsec of a central mask.
    pub coronagraph: Option<f64>,
}

/// Options for one moment map.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MomentOptions {
    pub fmin: Option<f64>,
    pub fmax: Option<f64>,
    pub psf_fwhm: Option<f64>,
    #[serde(default)]
    pub plot_beam: bool,
    #[serde(default)]
    pub scale: Scale,
    pub cmap: ColorMap,
}

/// Indexed by moment.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct LineOptions {
    pub moments: Vec<MomentOptions>,
}

impl LineOptions {
    pub fn moment(&self, moment: usize) -> Option<&MomentOptions> {
        self.moments.get(moment)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub enum DisplayOptions {
    Image(ImageOptions),
    Line(LineOptions),
}

impl DisplayOptions {
    pub fn kind(&self) -> ProductKind {
        match self {
            DisplayOptions::Image(_) => ProductKind::Image,
            DisplayOptions::Line(_) => ProductKind::Line,
        }
    }
}

/// The three kinds of figures the paper has.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RadiationClass {
    Thermal,
    Scattered,
    Molecular,
}

impl RadiationClass {
    pub fn name(&self) -> &'static str {
        match self {
            RadiationClass::Thermal => "thermal",
            RadiationClass::Scattered => "scattered",
            RadiationClass::Molecular => "molecular",
        }
    }

    pub fn kind(&self) -> ProductKind {
        match self {
            RadiationClass::Molecular => ProductKind::Line,
            _ => ProductKind::Image,
        }
    }
}

pub static THERMAL: Lazy<ImageOptions> = Lazy::new(|| ImageOptions {
    flux: Stokes::I,
    vmin: Some(1e-7),
    vmax: Some(1e-4),
    dynamic_range: None,
    fpeak: None,
    psf_fwhm: Some(0.20),
    plot_beam: true,
    per_beam: true,
    scale: Scale::Log,
    cmap: ColorMap::new(Palette::Inferno),
    coronagraph: None,
});

pub static SCATTERED: Lazy<ImageOptions> = Lazy::new(|| ImageOptions {
    flux: Stokes::I,
    vmin: Some(1e-19),
    vmax: Some(1e-16),
    dynamic_range: None,
    fpeak: None,
    psf_fwhm: Some(0.05),
    plot_beam: true,
    per_beam: true,
    scale: Scale::Log,
    cmap: ColorMap::new(Palette::GistHeat),
    coronagraph: None,
});

/// Moments 0, 1 and 2 of CO emission.
pub static MOLECULAR: Lazy<LineOptions> = Lazy::new(|| LineOptions {
    moments: vec![
        MomentOptions {
            fmin: Some(0.0),
            fmax: Some(0.002),
            psf_fwhm: Some(0.20),
            plot_beam: true,
            scale: Scale::Lin,
            cmap: ColorMap::new(Palette::Blues).reversed(),
        },
        MomentOptions {
            fmin: Some(-2.5),
            fmax: Some(2.5),
            psf_fwhm: None,
            plot_beam: false,
            scale: Scale::Lin,
            cmap: ColorMap::new(Palette::RdBu),
        },
        MomentOptions {
            fmin: Some(0.0),
            fmax: Some(5.0),
            psf_fwhm: None,
            plot_beam: false,
            scale: Scale::Lin,
            cmap: ColorMap::new(Palette::Viridis),
        },
    ],
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_options_parse_from_json() {
        let json = r#"{
            "flux": "I", "vmin": 1e-19, "vmax": 1e-16,
            "dynamic_range": null, "fpeak": null, "psf_fwhm": 0.05,
            "plot_beam": true, "per_beam": true, "scale": "log",
            "cmap": "gist_heat", "coronagraph": null
        }"#;
        let o: ImageOptions = serde_json::from_str(json).unwrap();
        assert_eq!(o, *SCATTERED);
    }

    #[test]
    fn molecular_defaults_have_three_moments() {
        assert_eq!(MOLECULAR.moments.len(), 3);
        assert!(MOLECULAR.moment(3).is_none());
        assert_eq!(MOLECULAR.moment(1).unwrap().cmap.to_string(), "RdBu");
        assert_eq!(RadiationClass::Molecular.kind(), ProductKind::Line);
    }
}
