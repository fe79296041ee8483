// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The parameter space of a flyby sweep, and the directory naming
//! convention shared by the sweep and the figure pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Ordered label sequences whose Cartesian product defines every run.
///
/// Labels are kept as strings: they are used verbatim as command
/// arguments and path segments (`"00"` and `"0"` are different
/// inclinations).
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ParameterSpace {
    /// Flyby angles (beta), in degrees.
    pub angles: Vec<String>,
    /// Dump times, 100 is periastron.
    pub times: Vec<String>,
    /// Observer inclinations, in degrees.
    pub inclinations: Vec<String>,
    /// Image wavelengths, in microns.
    #[serde(default)]
    pub wavelengths: Vec<String>,
    /// Molecules for line emission.
    #[serde(default)]
    pub molecules: Vec<String>,
}

impl ParameterSpace {
    /// One entry per (angle, time) pair, angle-major.
    pub fn dumps(&self) -> Vec<Dump> {
        self.angles
            .iter()
            .flat_map(|angle| {
                self.times.iter().map(move |time| Dump {
                    angle: angle.clone(),
                    time: time.clone(),
                })
            })
            .collect()
    }

    /// One entry per (angle, time, inclination) triple.
    pub fn runs(&self) -> Vec<RunDescriptor> {
        self.dumps()
            .into_iter()
            .flat_map(|dump| {
                self.inclinations
                    .iter()
                    .map(|inc| dump.run(inc))
                    .collect::<Vec<RunDescriptor>>()
            })
            .collect()
    }
}

/// A single phantom dump: one (angle, time) pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Dump {
    pub angle: String,
    pub time: String,
}

impl Dump {
    pub fn new(angle: &str, time: &str) -> Dump {
        Dump {
            angle: angle.into(),
            time: time.into(),
        }
    }

    /// File name of the phantom dump, e.g. `b45-100_`.
    pub fn file_name(&self) -> String {
        format!("b{}-{}_", self.angle, self.time)
    }

    /// `root/b{angle}/t{time}`. MCFOST is run from here.
    pub fn dir(&self, root: &Path) -> PathBuf {
        root.join(format!("b{}", self.angle))
            .join(format!("t{}", self.time))
    }

    /// Log file name for a stage, e.g. `b45-100_th.log` or
    /// `b45-100_i00_1.6.log`.
    pub fn log_name(&self, stage: &str) -> String {
        format!("{}{}.log", self.file_name(), stage)
    }

    pub fn run(&self, inclination: &str) -> RunDescriptor {
        RunDescriptor {
            angle: self.angle.clone(),
            time: self.time.clone(),
            inclination: inclination.into(),
        }
    }
}

/// One point of the (angle, time, inclination) space.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RunDescriptor {
    pub angle: String,
    pub time: String,
    pub inclination: String,
}

impl RunDescriptor {
    pub fn new(angle: &str, time: &str, inclination: &str) -> Self {
        RunDescriptor {
            angle: angle.into(),
            time: time.into(),
            inclination: inclination.into(),
        }
    }

    pub fn dump(&self) -> Dump {
        Dump::new(&self.angle, &self.time)
    }

    /// `root/b{angle}/t{time}/i{inclination}`
    pub fn leaf(&self, root: &Path) -> PathBuf {
        self.dump()
            .dir(root)
            .join(format!("i{}", self.inclination))
    }

    /// `leaf/data_{quantity}`, where quantity is a wavelength or a
    /// molecule.
    pub fn data(&self, root: &Path, quantity: &str) -> PathBuf {
        self.leaf(root).join(data_dir_name(quantity))
    }

    /// `leaf/data_th_{molecule}`, holding the thermal byproducts of a
    /// line calculation.
    pub fn thermal_byproducts(
        &self,
        root: &Path,
        molecule: &str,
    ) -> PathBuf {
        self.leaf(root).join(format!("data_th_{}", molecule))
    }
}

/// Name of the directory MCFOST writes a quantity's output into.
pub fn data_dir_name(quantity: &str) -> String {
    format!("data_{}", quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> ParameterSpace {
        ParameterSpace {
            angles: vec!["45".into(), "135".into()],
            times: vec!["100".into(), "110".into()],
            inclinations: vec!["00".into(), "90".into()],
            wavelengths: vec!["1.6".into()],
            molecules: vec!["CO".into()],
        }
    }

    #[test]
    fn runs_cover_the_product_once() {
        let runs = space().runs();
        assert_eq!(runs.len(), 8);
        let mut leaves = runs
            .iter()
            .map(|r| r.leaf(Path::new("out")))
            .collect::<Vec<PathBuf>>();
        leaves.sort();
        leaves.dedup();
        assert_eq!(leaves.len(), 8);
        assert_eq!(runs[0], RunDescriptor::new("45", "100", "00"));
        assert_eq!(runs[7], RunDescriptor::new("135", "110", "90"));
    }

    #[test]
    fn naming() {
        let root = Path::new("out");
        let run = RunDescriptor::new("45", "100", "00");
        assert_eq!(
            run.data(root, "CO"),
            PathBuf::from("out/b45/t100/i00/data_CO")
        );
        assert_eq!(
            run.thermal_byproducts(root, "CO"),
            PathBuf::from("out/b45/t100/i00/data_th_CO")
        );
        let dump = run.dump();
        assert_eq!(dump.file_name(), "b45-100_");
        assert_eq!(dump.log_name("th"), "b45-100_th.log");
        assert_eq!(dump.log_name("i00_1.6"), "b45-100_i00_1.6.log");
    }
}
