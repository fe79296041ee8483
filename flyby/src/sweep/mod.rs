// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Runs MCFOST over every (angle, time, inclination, quantity) of a
//! flyby sweep.
//!
//! For each dump the temperature is computed first, then an image per
//! inclination and wavelength, then line emission per inclination and
//! molecule. Everything is sequential and the first failure aborts the
//! sweep: a failed sweep has to be restarted from a clean output tree.

pub mod command;
pub mod config;
pub mod launcher;

use crate::errors::SweepError;
use crate::params::{Dump, ParameterSpace};
use crate::sweep::command::{ImageMode, Invocation, Stage};
use crate::sweep::config::SweepArgs;
use crate::sweep::launcher::Launcher;
use crate::Directories;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extension of the intermediate files MCFOST leaves behind.
pub const TMP_EXTENSION: &str = "tmp";

pub struct Orchestrator<L: Launcher> {
    dirs: Directories,
    space: ParameterSpace,
    /// Wavelength labels paired with the image mode they select.
    images: Vec<(String, ImageMode)>,
    launcher: L,
}

impl<L: Launcher> Orchestrator<L> {
    /// Fails if any wavelength label is not a positive finite number.
    pub fn new(args: SweepArgs, launcher: L) -> Result<Self, SweepError> {
        let SweepArgs {
            dirs,
            space,
            threshold,
            ..
        } = args;
        let images = space
            .wavelengths
            .iter()
            .map(|wl| {
                match wl.trim().parse::<f64>() {
                    Ok(x) if x.is_finite() && x > 0.0 => Ok((
                        wl.clone(),
                        ImageMode::for_wavelength(x, threshold),
                    )),
                    _ => Err(SweepError::BadWavelength(wl.clone())),
                }
            })
            .collect::<Result<Vec<(String, ImageMode)>, SweepError>>()?;
        Ok(Orchestrator {
            dirs,
            space,
            images,
            launcher,
        })
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Create the output root, the log directory and one leaf
    /// directory per (angle, time, inclination).
    ///
    /// The output root must not exist yet.
    pub fn setup(&self) -> Result<(), SweepError> {
        create_dir(&self.dirs.output)?;
        create_dir(&self.dirs.logs())?;
        for run in self.space.runs() {
            let leaf = run.leaf(&self.dirs.output);
            fs::create_dir_all(&leaf)
                .map_err(|e| SweepError::CreateDir(leaf.clone(), e))?;
            debug!("created {}", leaf.display());
        }
        Ok(())
    }

    /// Run every stage for every dump.
    pub fn run(&mut self) -> Result<(), SweepError> {
        if !self.dirs.mcfost.is_file() {
            return Err(SweepError::MissingBinary(self.dirs.mcfost.clone()));
        }
        for dump in self.space.dumps() {
            self.run_dump(&dump)?;
        }
        Ok(())
    }

    fn run_dump(&mut self, dump: &Dump) -> Result<(), SweepError> {
        info!("+{}+", "=".repeat(20));
        info!("|  DUMP = {:9}  |", dump.file_name());
        info!("+{}+", "=".repeat(20));

        info!("---- Calculating temperature ----");
        self.invoke(Stage::Temperature, dump)?;

        let inclinations = self.space.inclinations.clone();
        let images = self.images.clone();
        for inclination in inclinations.iter() {
            info!("---- Inclination is {} degrees ----", inclination);
            for (wavelength, mode) in images.iter() {
                info!("  >>  Calculating image at {} um  <<", wavelength);
                let stage = Stage::Image {
                    inclination: inclination.clone(),
                    wavelength: wavelength.clone(),
                    mode: *mode,
                };
                let leaf = dump.run(inclination).leaf(&self.dirs.output);
                let output = self.invoke(stage, dump)?;
                relocate_into(&output, &leaf)?;
            }
        }

        let molecules = self.space.molecules.clone();
        for inclination in inclinations.iter() {
            info!("---- Inclination is {} degrees ----", inclination);
            for molecule in molecules.iter() {
                info!("  >>  Calculating {} emission  <<", molecule);
                let run = dump.run(inclination);
                let stage = Stage::Line {
                    inclination: inclination.clone(),
                    molecule: molecule.clone(),
                };
                let output = self.invoke(stage, dump)?;
                relocate_into(&output, &run.leaf(&self.dirs.output))?;

                let byproducts =
                    run.thermal_byproducts(&self.dirs.output, molecule);
                create_dir(&byproducts)?;
                let workdir = dump.dir(&self.dirs.output);
                for tmp in tmp_files(&workdir)? {
                    relocate_into(&tmp, &byproducts)?;
                }
            }
        }
        Ok(())
    }

    /// Launch one stage and check its exit code. Returns the path of
    /// the output directory MCFOST is expected to have written.
    fn invoke(
        &mut self,
        stage: Stage,
        dump: &Dump,
    ) -> Result<PathBuf, SweepError> {
        let invocation = Invocation::new(&self.dirs, dump, stage);
        let code = self.launcher.launch(&invocation)?;
        if code != Some(0) {
            return Err(SweepError::NonZeroExit {
                stage: format!(
                    "{} of {}",
                    invocation.stage,
                    dump.file_name()
                ),
                code,
                log: invocation.log,
            });
        }
        Ok(invocation.cwd.join(invocation.stage.output_dir_name()))
    }
}

fn create_dir(path: &Path) -> Result<(), SweepError> {
    fs::create_dir(path)
        .map_err(|e| SweepError::CreateDir(path.to_path_buf(), e))
}

/// Move `src` (file or directory) into `dest_dir`, keeping its name.
fn relocate_into(src: &Path, dest_dir: &Path) -> Result<(), SweepError> {
    let name = match src.file_name() {
        Some(name) if src.exists() => name,
        _ => return Err(SweepError::MissingOutput(src.to_path_buf())),
    };
    let dest = dest_dir.join(name);
    fs::rename(src, &dest).map_err(|e| SweepError::Relocate {
        from: src.to_path_buf(),
        to: dest.clone(),
        source: e,
    })?;
    debug!("moved {} to {}", src.display(), dest.display());
    Ok(())
}

/// Intermediate files in `dir`, sorted by name.
fn tmp_files(dir: &Path) -> Result<Vec<PathBuf>, SweepError> {
    let unreadable = |e: std::io::Error| SweepError::Relocate {
        from: dir.to_path_buf(),
        to: dir.to_path_buf(),
        source: e,
    };
    let mut r = vec![];
    for entry in fs::read_dir(dir).map_err(unreadable)? {
        let p = entry.map_err(unreadable)?.path();
        if p.is_file()
            && p.extension().map_or(false, |ext| ext == TMP_EXTENSION)
        {
            r.push(p);
        }
    }
    r.sort();
    Ok(r)
}
