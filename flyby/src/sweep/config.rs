// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::errors::ConfigError;
use crate::params::ParameterSpace;
use crate::{read_json, Directories};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::path::PathBuf;

/// Wavelength (microns) below which images are computed as
/// scattered light.
pub const IMAGE_MODE_THRESHOLD: f64 = 10.0;

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ParsedSweepArgs {
    dirs: Directories,
    space: ParameterSpace,
    threshold: Option<f64>,
    setup: Option<bool>,
    run: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SweepArgs {
    pub dirs: Directories,
    pub space: ParameterSpace,
    pub threshold: f64,
    /// Create the output tree.
    pub setup: bool,
    /// Run MCFOST.
    pub run: bool,
}

impl SweepArgs {
    pub fn new(dirs: Directories, space: ParameterSpace) -> SweepArgs {
        SweepArgs {
            dirs,
            space,
            threshold: IMAGE_MODE_THRESHOLD,
            setup: true,
            run: true,
        }
    }
}

impl From<ParsedSweepArgs> for SweepArgs {
    fn from(parsed: ParsedSweepArgs) -> Self {
        let ParsedSweepArgs {
            dirs,
            space,
            threshold,
            setup,
            run,
        } = parsed;
        SweepArgs {
            dirs,
            space,
            threshold: threshold.unwrap_or(IMAGE_MODE_THRESHOLD),
            setup: setup.unwrap_or(true),
            run: run.unwrap_or(true),
        }
    }
}

impl TryFrom<&PathBuf> for SweepArgs {
    type Error = ConfigError;

    fn try_from(json_path: &PathBuf) -> Result<SweepArgs, ConfigError> {
        let parsed: ParsedSweepArgs = read_json(json_path)?;
        Ok(parsed.into())
    }
}
