// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::params::{data_dir_name, Dump};
use crate::Directories;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

pub const PHANTOM_FLAG: &str = "-phantom";
pub const LIMITS_FLAG: &str = "-limits";
pub const IMG_FLAG: &str = "-img";
pub const MOL_FLAG: &str = "-mol";
pub const CASA_FLAG: &str = "-casa";
pub const IGNORE_DUST_FLAG: &str = "-ignore_dust";

/// Extra flag used for an image calculation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageMode {
    /// Scattered light: dust emission is ignored.
    IgnoreDust,
    /// Thermal emission: output suitable for CASA simulations.
    Casa,
}

impl ImageMode {
    /// Wavelengths strictly below `threshold` (microns) are treated as
    /// scattered light.
    pub fn for_wavelength(wavelength: f64, threshold: f64) -> Self {
        if wavelength < threshold {
            ImageMode::IgnoreDust
        } else {
            ImageMode::Casa
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            ImageMode::IgnoreDust => IGNORE_DUST_FLAG,
            ImageMode::Casa => CASA_FLAG,
        }
    }
}

/// A physical stage of the calculation for one dump.
#[derive(Clone, Debug, PartialEq)]
pub enum Stage {
    Temperature,
    Image {
        inclination: String,
        wavelength: String,
        mode: ImageMode,
    },
    Line {
        inclination: String,
        molecule: String,
    },
}

impl Stage {
    /// Short label used in log file names.
    pub fn label(&self) -> String {
        match self {
            Stage::Temperature => "th".to_string(),
            Stage::Image {
                inclination,
                wavelength,
                ..
            } => format!("i{}_{}", inclination, wavelength),
            Stage::Line {
                inclination,
                molecule,
            } => format!("i{}_{}", inclination, molecule),
        }
    }

    pub fn para_file(&self) -> String {
        match self {
            Stage::Temperature => "flyby-temperature.para".to_string(),
            Stage::Image { inclination, .. } => {
                format!("flyby-scat-i{}.para", inclination)
            }
            Stage::Line { inclination, .. } => {
                format!("flyby-alma-i{}.para", inclination)
            }
        }
    }

    fn flags(&self) -> Vec<OsString> {
        match self {
            Stage::Temperature => vec![],
            Stage::Image {
                wavelength, mode, ..
            } => vec![
                IMG_FLAG.into(),
                wavelength.into(),
                mode.flag().into(),
            ],
            Stage::Line { .. } => vec![
                MOL_FLAG.into(),
                CASA_FLAG.into(),
                IGNORE_DUST_FLAG.into(),
            ],
        }
    }

    /// Name of the directory MCFOST leaves in the working directory.
    pub fn output_dir_name(&self) -> String {
        match self {
            Stage::Temperature => "data_th".to_string(),
            Stage::Image { wavelength, .. } => {
                data_dir_name(wavelength)
            }
            Stage::Line { molecule, .. } => data_dir_name(molecule),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Temperature => write!(f, "temperature"),
            Stage::Image {
                inclination,
                wavelength,
                ..
            } => write!(
                f,
                "image at {} um (i = {})",
                wavelength, inclination
            ),
            Stage::Line {
                inclination,
                molecule,
            } => write!(f, "{} emission (i = {})", molecule, inclination),
        }
    }
}

/// Everything needed to launch MCFOST once.
#[derive(Clone, Debug, PartialEq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Working directory; MCFOST writes its `data_*` directories here.
    pub cwd: PathBuf,
    /// Receives both stdout and stderr.
    pub log: PathBuf,
    pub stage: Stage,
}

impl Invocation {
    pub fn new(dirs: &Directories, dump: &Dump, stage: Stage) -> Self {
        let mut args: Vec<OsString> = vec![
            dirs.config.join(stage.para_file()).into(),
            PHANTOM_FLAG.into(),
            dirs.dumps.join(dump.file_name()).into(),
            LIMITS_FLAG.into(),
            dirs.limits().into(),
        ];
        args.extend(stage.flags());
        Invocation {
            program: dirs.mcfost.clone(),
            args,
            cwd: dump.dir(&dirs.output),
            log: dirs.logs().join(dump.log_name(&stage.label())),
            stage,
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for a in self.args.iter() {
            write!(f, " {}", a.to_string_lossy())?;
        }
        Ok(())
    }
}
