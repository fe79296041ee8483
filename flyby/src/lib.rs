// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

pub mod errors;
pub mod figures;
pub mod params;
pub mod products;
pub mod render;
pub mod sweep;
pub mod sync;

use crate::errors::ConfigError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fs::OpenOptions;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Default location of the sweep configuration, relative to the
/// current directory.
pub const DEFAULT_SWEEP_CFG: &str = "cfg/sweep.json";
/// Default location of the figure configuration, relative to the
/// current directory.
pub const DEFAULT_FIGURES_CFG: &str = "cfg/figures.json";

/// Root paths shared by a sweep.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Directories {
    /// Holds the `.para` files and the limits file.
    pub config: PathBuf,
    /// Path to the MCFOST executable.
    pub mcfost: PathBuf,
    /// Holds the phantom dumps, named `b{angle}-{time}_`.
    pub dumps: PathBuf,
    /// Root of the output tree. Must not exist before setup.
    pub output: PathBuf,
}

impl Directories {
    pub fn logs(&self) -> PathBuf {
        self.output.join("logs")
    }

    pub fn limits(&self) -> PathBuf {
        self.config.join("flyby-limits")
    }
}

impl TryFrom<&PathBuf> for Directories {
    type Error = ConfigError;

    fn try_from(json_path: &PathBuf) -> Result<Self, ConfigError> {
        read_json(json_path)
    }
}

/// Read a JSON file and deserialize it into `T`.
pub fn read_json<T: DeserializeOwned>(
    json_path: &Path,
) -> Result<T, ConfigError> {
    let mut f = OpenOptions::new()
        .read(true)
        .open(json_path)
        .map_err(|e| ConfigError::Io(json_path.to_path_buf(), e))?;
    let mut json_out = String::new();
    f.read_to_string(&mut json_out)
        .map_err(|e| ConfigError::Io(json_path.to_path_buf(), e))?;
    serde_json::from_str(&json_out)
        .map_err(|e| ConfigError::Json(json_path.to_path_buf(), e))
}
