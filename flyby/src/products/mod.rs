// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Data products MCFOST leaves in a leaf directory, and how they put
//! themselves on a panel.

pub mod beam;
pub mod fits;
pub mod image;
pub mod line;

use crate::errors::{LoadError, RenderError};
use crate::products::image::Image;
use crate::products::line::Line;
use crate::render::options::DisplayOptions;
use crate::render::{Mappable, Panel};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const IMAGE_FILE: &str = "RT.fits";
pub const LINE_FILE: &str = "lines.fits";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProductKind {
    /// Continuum image, thermal or scattered.
    Image,
    /// Spectral line cube.
    Line,
}

impl ProductKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            ProductKind::Image => IMAGE_FILE,
            ProductKind::Line => LINE_FILE,
        }
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductKind::Image => write!(f, "Image"),
            ProductKind::Line => write!(f, "Line"),
        }
    }
}

pub trait Product {
    fn kind(&self) -> ProductKind;

    /// Physical unit of the stored data, as written by MCFOST.
    fn unit(&self) -> &str;

    /// Draw onto `panel`. `colorbar` asks for a colour bar on the panel
    /// itself. Returns the mapping used for the pixels so that a
    /// figure level colour bar can be keyed to it.
    fn draw(
        &self,
        panel: &mut Panel,
        colorbar: bool,
        options: &DisplayOptions,
        moment: Option<usize>,
    ) -> Result<Mappable, RenderError>;
}

pub trait Loader {
    fn load(
        &self,
        dir: &Path,
        kind: ProductKind,
    ) -> Result<Box<dyn Product>, LoadError>;
}

/// Reads `RT.fits` or `lines.fits`, gzipped or not.
#[derive(Clone, Copy, Debug, Default)]
pub struct FitsLoader;

impl Loader for FitsLoader {
    fn load(
        &self,
        dir: &Path,
        kind: ProductKind,
    ) -> Result<Box<dyn Product>, LoadError> {
        let path = find_fits(dir, kind.file_name())?;
        debug!("reading {}", path.display());
        let hdu = fits::read_primary(&path)?;
        Ok(match kind {
            ProductKind::Image => Box::new(Image::from_hdu(hdu, &path)?),
            ProductKind::Line => Box::new(Line::from_hdu(hdu, &path)?),
        })
    }
}

/// `dir/name`, or else `dir/name.gz`.
pub fn find_fits(dir: &Path, name: &str) -> Result<PathBuf, LoadError> {
    let plain = dir.join(name);
    if plain.is_file() {
        return Ok(plain);
    }
    let gz = dir.join(format!("{}.gz", name));
    if gz.is_file() {
        return Ok(gz);
    }
    Err(LoadError::NotFound(dir.to_path_buf()))
}

/// Largest and smallest finite values, ignoring non-positive ones when
/// `positive` is set.
pub(crate) fn finite_range(values: &[f64], positive: bool) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && (!positive || *v > 0.0))
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
