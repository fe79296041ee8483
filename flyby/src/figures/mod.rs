// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The paper figures: for every flyby angle and radiation, a grid of
//! times (columns) by inclinations (rows).

pub mod config;

use crate::errors::RenderError;
use crate::figures::config::FiguresArgs;
use crate::params::RunDescriptor;
use crate::products::{Loader, ProductKind};
use crate::render::annotate::Annotations;
use crate::render::options::{DisplayOptions, RadiationClass};
use crate::render::{plot_figure, ProductGrid};
use crate::sync::{sync_copy, PostStep};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// `{class}_b{angle}_{radiation}[_m{moment}].pdf`
pub fn figure_name(
    class: RadiationClass,
    angle: &str,
    radiation: &str,
    moment: Option<usize>,
) -> String {
    match moment {
        Some(m) => {
            format!("{}_b{}_{}_m{}.pdf", class.name(), angle, radiation, m)
        }
        None => format!("{}_b{}_{}.pdf", class.name(), angle, radiation),
    }
}

impl FiguresArgs {
    /// Radiations to plot: thermal, then scattered, then molecular,
    /// unless given explicitly.
    pub fn radiations(&self) -> Vec<String> {
        if let Some(r) = &self.radiations {
            return r.clone();
        }
        let mut r = vec![];
        if self.do_thermal {
            r.extend(self.thermal.iter().cloned());
        }
        if self.do_scattered {
            r.extend(self.scattered.iter().cloned());
        }
        if self.do_lines {
            r.extend(self.molecular.iter().cloned());
        }
        r
    }

    pub fn classify(&self, radiation: &str) -> Result<RadiationClass, RenderError> {
        let is = |list: &[String]| list.iter().any(|r| r == radiation);
        if is(&self.thermal) {
            Ok(RadiationClass::Thermal)
        } else if is(&self.scattered) {
            Ok(RadiationClass::Scattered)
        } else if is(&self.molecular) {
            Ok(RadiationClass::Molecular)
        } else {
            Err(RenderError::UnknownRadiation(radiation.to_string()))
        }
    }

    pub fn options(&self, class: RadiationClass) -> DisplayOptions {
        match class {
            RadiationClass::Thermal => DisplayOptions::Image(self.thermal_options.clone()),
            RadiationClass::Scattered => {
                DisplayOptions::Image(self.scattered_options.clone())
            }
            RadiationClass::Molecular => {
                DisplayOptions::Line(self.molecular_options.clone())
            }
        }
    }

    /// Moments to draw, `None` standing for the single image figure.
    fn figure_moments(&self, kind: ProductKind) -> Vec<Option<usize>> {
        match kind {
            ProductKind::Image => vec![None],
            ProductKind::Line => self.moments.iter().map(|m| Some(*m)).collect(),
        }
    }
}

/// Load `data_{radiation}` of every (time, inclination) of `angle`.
pub fn load_grid<L: Loader>(
    loader: &L,
    root: &Path,
    angle: &str,
    times: &[String],
    inclinations: &[String],
    radiation: &str,
    kind: ProductKind,
) -> Result<ProductGrid, RenderError> {
    let mut grid = ProductGrid::new();
    for time in times {
        for inc in inclinations {
            let dir = RunDescriptor::new(angle, time, inc).data(root, radiation);
            let product = loader
                .load(&dir, kind)
                .map_err(|e| RenderError::Load(dir.clone(), e))?;
            grid.insert(time, inc, product);
        }
    }
    Ok(grid)
}

/// Render every figure of `args`, returning the files written.
pub fn render_all<L: Loader>(
    args: &FiguresArgs,
    loader: &L,
) -> Result<Vec<PathBuf>, RenderError> {
    if args.savefig {
        fs::create_dir_all(&args.figure_dir)
            .map_err(|e| RenderError::Io(args.figure_dir.clone(), e))?;
    }
    let mut saved = vec![];
    for angle in args.angles.iter() {
        info!("=== beta = {} ===", angle);
        let text = Annotations::build(
            &args.annotations,
            angle,
            &args.times,
            &args.inclinations,
        );
        for radiation in args.radiations() {
            info!("--- radiation = {} ---", radiation);
            let class = args.classify(&radiation)?;
            let grid = load_grid(
                loader,
                &args.root,
                angle,
                &args.times,
                &args.inclinations,
                &radiation,
                class.kind(),
            )?;
            let options = args.options(class);
            for moment in args.figure_moments(class.kind()) {
                let figure = plot_figure(
                    &grid,
                    &options,
                    moment,
                    Some(&text),
                    &args.positions,
                    args.colorbar_figure,
                    &args.style,
                )?;
                if !args.savefig {
                    continue;
                }
                let path = args
                    .figure_dir
                    .join(figure_name(class, angle, &radiation, moment));
                figure.save(&path)?;
                info!("saved {}", path.display());
                match sync_copy(&path, args.sync_dir.as_deref()) {
                    PostStep::Skipped => {}
                    PostStep::Copied(to) => debug!("copied to {}", to.display()),
                    PostStep::Failed(reason) => warn!("{}", reason),
                }
                saved.push(path);
            }
        }
    }
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LoadError;
    use crate::products::Product;
    use crate::render::tests::Ramp;
    use std::cell::RefCell;

    /// Hands out ramps and remembers where it was asked to look.
    #[derive(Default)]
    struct Recorder {
        dirs: RefCell<Vec<PathBuf>>,
    }

    impl Loader for Recorder {
        fn load(&self, dir: &Path, kind: ProductKind) -> Result<Box<dyn Product>, LoadError> {
            self.dirs.borrow_mut().push(dir.to_path_buf());
            Ok(Box::new(Ramp {
                kind,
                unit: "W.m-2.pixel-1".to_string(),
            }))
        }
    }

    fn args(out: &Path) -> FiguresArgs {
        let mut a = FiguresArgs::new(
            PathBuf::from("runs"),
            vec!["45".to_string()],
            vec!["100".to_string(), "110".to_string()],
            vec!["00".to_string()],
        );
        a.figure_dir = out.to_path_buf();
        a
    }

    #[test]
    fn names() {
        assert_eq!(
            figure_name(RadiationClass::Thermal, "45", "850", None),
            "thermal_b45_850.pdf"
        );
        assert_eq!(
            figure_name(RadiationClass::Molecular, "135", "CO", Some(2)),
            "molecular_b135_CO_m2.pdf"
        );
    }

    #[test]
    fn radiations_follow_switches() {
        let mut a = args(Path::new("f"));
        assert_eq!(a.radiations(), vec!["850", "2100", "1.6", "CO"]);
        a.do_thermal = false;
        a.do_lines = false;
        assert_eq!(a.radiations(), vec!["1.6"]);
        assert_eq!(a.classify("1.6").unwrap(), RadiationClass::Scattered);
        assert_eq!(a.classify("2100").unwrap(), RadiationClass::Thermal);
    }

    #[test]
    fn unknown_radiation_fails_before_loading() {
        let tmp = tempfile::tempdir().unwrap();
        let mut a = args(tmp.path());
        a.radiations = Some(vec!["9000".to_string()]);
        let loader = Recorder::default();
        match render_all(&a, &loader) {
            Err(RenderError::UnknownRadiation(r)) => assert_eq!(r, "9000"),
            _ => panic!("expected an unknown radiation"),
        }
        assert!(loader.dirs.borrow().is_empty());
    }

    #[test]
    fn one_figure_per_moment_from_one_load() {
        let tmp = tempfile::tempdir().unwrap();
        let mut a = args(tmp.path());
        a.radiations = Some(vec!["CO".to_string()]);
        a.sync_dir = Some(tmp.path().join("missing"));
        let loader = Recorder::default();
        let saved = render_all(&a, &loader).unwrap();
        let names = saved
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect::<Vec<String>>();
        assert_eq!(
            names,
            vec!["molecular_b45_CO_m0.pdf", "molecular_b45_CO_m1.pdf", "molecular_b45_CO_m2.pdf"]
        );
        assert!(saved.iter().all(|p| p.is_file()));
        assert_eq!(
            *loader.dirs.borrow(),
            vec![
                PathBuf::from("runs/b45/t100/i00/data_CO"),
                PathBuf::from("runs/b45/t110/i00/data_CO"),
            ]
        );
    }

    #[test]
    fn nothing_written_without_savefig() {
        let tmp = tempfile::tempdir().unwrap();
        let mut a = args(&tmp.path().join("figs"));
        a.savefig = false;
        a.radiations = Some(vec!["850".to_string()]);
        assert!(render_all(&a, &Recorder::default()).unwrap().is_empty());
        assert!(!tmp.path().join("figs").exists());
    }
}
