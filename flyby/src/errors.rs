// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::io;
use std::path::PathBuf;

macro_rules! debug_as_display {
    ($($ty:ty),*) => {
        $(
            impl Debug for $ty {
                fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                    Display::fmt(self, f)
                }
            }
        )*
    };
}

pub enum ConfigError {
    Io(PathBuf, io::Error),
    Json(PathBuf, serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(p, e) => {
                write!(f, "could not read {}: {}", p.display(), e)
            }
            ConfigError::Json(p, e) => {
                write!(f, "could not parse {}: {}", p.display(), e)
            }
        }
    }
}

impl error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Json(_, e) => Some(e),
        }
    }
}

pub enum SweepError {
    /// The MCFOST executable does not exist.
    MissingBinary(PathBuf),
    /// A wavelength label that does not parse as a number.
    BadWavelength(String),
    CreateDir(PathBuf, io::Error),
    /// The log file for an invocation could not be opened.
    Log(PathBuf, io::Error),
    Spawn(PathBuf, io::Error),
    NonZeroExit {
        stage: String,
        code: Option<i32>,
        log: PathBuf,
    },
    /// An invocation succeeded but did not leave the expected output.
    MissingOutput(PathBuf),
    Relocate {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

impl Display for SweepError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::MissingBinary(p) => {
                write!(f, "mcfost binary not found: {}", p.display())
            }
            SweepError::BadWavelength(w) => {
                write!(f, "wavelength is not a number: {}", w)
            }
            SweepError::CreateDir(p, e) => write!(
                f,
                "could not create directory {}: {}",
                p.display(),
                e
            ),
            SweepError::Log(p, e) => {
                write!(f, "could not open log {}: {}", p.display(), e)
            }
            SweepError::Spawn(p, e) => {
                write!(f, "could not launch {}: {}", p.display(), e)
            }
            SweepError::NonZeroExit { stage, code, log } => {
                let code = code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                write!(
                    f,
                    "mcfost failed during {} (exit code: {}), see {}",
                    stage,
                    code,
                    log.display()
                )
            }
            SweepError::MissingOutput(p) => write!(
                f,
                "expected mcfost output not found: {}",
                p.display()
            ),
            SweepError::Relocate { from, to, source } => write!(
                f,
                "could not move {} to {}: {}",
                from.display(),
                to.display(),
                source
            ),
        }
    }
}

impl error::Error for SweepError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            SweepError::CreateDir(_, e)
            | SweepError::Log(_, e)
            | SweepError::Spawn(_, e) => Some(e),
            SweepError::Relocate { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub enum LoadError {
    NotFound(PathBuf),
    Io(PathBuf, io::Error),
    BadHeader(String),
    UnsupportedBitpix(i64),
    MissingKey(String),
    Shape(String),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::NotFound(p) => {
                write!(f, "no data product in {}", p.display())
            }
            LoadError::Io(p, e) => {
                write!(f, "could not read {}: {}", p.display(), e)
            }
            LoadError::BadHeader(s) => {
                write!(f, "malformed FITS header: {}", s)
            }
            LoadError::UnsupportedBitpix(b) => {
                write!(f, "unsupported BITPIX: {}", b)
            }
            LoadError::MissingKey(k) => {
                write!(f, "FITS header key not found: {}", k)
            }
            LoadError::Shape(s) => {
                write!(f, "unexpected data shape: {}", s)
            }
        }
    }
}

impl error::Error for LoadError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            LoadError::Io(_, e) => Some(e),
            _ => None,
        }
    }
}

pub enum RenderError {
    EmptyGrid,
    MissingCell { column: String, row: String },
    /// Radiation label is not in the thermal, scattered or molecular
    /// lists.
    UnknownRadiation(String),
    /// Line figures need a moment with configured options.
    MissingMomentOptions(Option<usize>),
    /// Display options do not match the product kind.
    OptionsMismatch,
    /// Annotation placed at a position label with no coordinates.
    UnknownPosition(String),
    Load(PathBuf, LoadError),
    Draw(String),
    Io(PathBuf, io::Error),
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::EmptyGrid => {
                write!(f, "cannot plot an empty grid")
            }
            RenderError::MissingCell { column, row } => write!(
                f,
                "no data for column {}, row {}",
                column, row
            ),
            RenderError::UnknownRadiation(r) => write!(
                f,
                "{} not in thermal, scattered, molecular lists",
                r
            ),
            RenderError::MissingMomentOptions(m) => match m {
                Some(m) => {
                    write!(f, "no display options for moment {}", m)
                }
                None => write!(f, "line data needs a moment"),
            },
            RenderError::OptionsMismatch => write!(
                f,
                "display options do not match the data kind"
            ),
            RenderError::UnknownPosition(l) => {
                write!(f, "no coordinates for text position {}", l)
            }
            RenderError::Load(p, e) => {
                write!(f, "loading {}: {}", p.display(), e)
            }
            RenderError::Draw(s) => write!(f, "drawing failed: {}", s),
            RenderError::Io(p, e) => {
                write!(f, "could not write {}: {}", p.display(), e)
            }
        }
    }
}

impl error::Error for RenderError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            RenderError::Load(_, e) => Some(e),
            RenderError::Io(_, e) => Some(e),
            _ => None,
        }
    }
}

debug_as_display!(ConfigError, SweepError, LoadError, RenderError);
