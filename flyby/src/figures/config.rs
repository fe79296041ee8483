// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::errors::ConfigError;
use crate::read_json;
use crate::render::annotate::{AnnotationStyle, Positions};
use crate::render::layout::FigureStyle;
use crate::render::options::{
    ImageOptions, LineOptions, MOLECULAR, SCATTERED, THERMAL,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::path::PathBuf;

pub const MOMENTS: [usize; 3] = [0, 1, 2];
pub const FIGURE_DIR: &str = "figures";

pub static THERMAL_WAVELENGTHS: Lazy<Vec<String>> =
    Lazy::new(|| vec!["850".to_string(), "2100".to_string()]);
pub static SCATTERED_WAVELENGTHS: Lazy<Vec<String>> =
    Lazy::new(|| vec!["1.6".to_string()]);
pub static MOLECULES: Lazy<Vec<String>> =
    Lazy::new(|| vec!["CO".to_string()]);

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ParsedFiguresArgs {
    root: PathBuf,
    figure_dir: Option<PathBuf>,
    angles: Vec<String>,
    times: Vec<String>,
    inclinations: Vec<String>,
    moments: Option<Vec<usize>>,
    thermal: Option<Vec<String>>,
    scattered: Option<Vec<String>>,
    molecular: Option<Vec<String>>,
    do_thermal: Option<bool>,
    do_scattered: Option<bool>,
    do_lines: Option<bool>,
    radiations: Option<Vec<String>>,
    colorbar_figure: Option<bool>,
    savefig: Option<bool>,
    sync_dir: Option<PathBuf>,
    annotations: Option<AnnotationStyle>,
    positions: Option<Positions>,
    thermal_options: Option<ImageOptions>,
    scattered_options: Option<ImageOptions>,
    molecular_options: Option<LineOptions>,
    style: Option<FigureStyle>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FiguresArgs {
    /// Root of the sweep output tree.
    pub root: PathBuf,
    pub figure_dir: PathBuf,
    pub angles: Vec<String>,
    /// One column per time.
    pub times: Vec<String>,
    /// One row per inclination.
    pub inclinations: Vec<String>,
    pub moments: Vec<usize>,
    /// Wavelengths shown as thermal emission.
    pub thermal: Vec<String>,
    /// Wavelengths shown as scattered light.
    pub scattered: Vec<String>,
    pub molecular: Vec<String>,
    pub do_thermal: bool,
    pub do_scattered: bool,
    pub do_lines: bool,
    /// Replaces the list built from the `do_*` switches.
    pub radiations: Option<Vec<String>>,
    pub colorbar_figure: bool,
    pub savefig: bool,
    pub sync_dir: Option<PathBuf>,
    pub annotations: AnnotationStyle,
    pub positions: Positions,
    pub thermal_options: ImageOptions,
    pub scattered_options: ImageOptions,
    pub molecular_options: LineOptions,
    pub style: FigureStyle,
}

impl FiguresArgs {
    pub fn new(
        root: PathBuf,
        angles: Vec<String>,
        times: Vec<String>,
        inclinations: Vec<String>,
    ) -> FiguresArgs {
        FiguresArgs {
            root,
            figure_dir: PathBuf::from(FIGURE_DIR),
            angles,
            times,
            inclinations,
            moments: MOMENTS.to_vec(),
            thermal: THERMAL_WAVELENGTHS.clone(),
            scattered: SCATTERED_WAVELENGTHS.clone(),
            molecular: MOLECULES.clone(),
            do_thermal: true,
            do_scattered: true,
            do_lines: true,
            radiations: None,
            colorbar_figure: true,
            savefig: true,
            sync_dir: None,
            annotations: AnnotationStyle::default(),
            positions: Positions::default(),
            thermal_options: THERMAL.clone(),
            scattered_options: SCATTERED.clone(),
            molecular_options: MOLECULAR.clone(),
            style: FigureStyle::default(),
        }
    }
}

impl From<ParsedFiguresArgs> for FiguresArgs {
    fn from(p: ParsedFiguresArgs) -> Self {
        let d = FiguresArgs::new(p.root, p.angles, p.times, p.inclinations);
        FiguresArgs {
            figure_dir: p.figure_dir.unwrap_or(d.figure_dir),
            moments: p.moments.unwrap_or(d.moments),
            thermal: p.thermal.unwrap_or(d.thermal),
            scattered: p.scattered.unwrap_or(d.scattered),
            molecular: p.molecular.unwrap_or(d.molecular),
            do_thermal: p.do_thermal.unwrap_or(d.do_thermal),
            do_scattered: p.do_scattered.unwrap_or(d.do_scattered),
            do_lines: p.do_lines.unwrap_or(d.do_lines),
            radiations: p.radiations,
            colorbar_figure: p.colorbar_figure.unwrap_or(d.colorbar_figure),
            savefig: p.savefig.unwrap_or(d.savefig),
            sync_dir: p.sync_dir,
            annotations: p.annotations.unwrap_or(d.annotations),
            positions: p.positions.unwrap_or(d.positions),
            thermal_options: p.thermal_options.unwrap_or(d.thermal_options),
            scattered_options: p
                .scattered_options
                .unwrap_or(d.scattered_options),
            molecular_options: p
                .molecular_options
                .unwrap_or(d.molecular_options),
            style: p.style.unwrap_or(d.style),
            ..d
        }
    }
}

impl TryFrom<&PathBuf> for FiguresArgs {
    type Error = ConfigError;

    fn try_from(json_path: &PathBuf) -> Result<FiguresArgs, ConfigError> {
        let parsed: ParsedFiguresArgs = read_json(json_path)?;
        Ok(parsed.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::colormap::Scale;

    #[test]
    fn minimal_config_gets_paper_defaults() {
        let json = r#"{
            "root": "runs/flyby/output",
            "angles": ["45", "135"],
            "times": ["100", "110", "120", "150"],
            "inclinations": ["00", "45", "90"]
        }"#;
        let args: FiguresArgs =
            serde_json::from_str::<ParsedFiguresArgs>(json).unwrap().into();
        assert_eq!(args.moments, vec![0, 1, 2]);
        assert_eq!(args.thermal, vec!["850", "2100"]);
        assert_eq!(args.scattered_options, *SCATTERED);
        assert!(args.colorbar_figure && args.savefig);
        assert_eq!(args.figure_dir, PathBuf::from("figures"));
        assert_eq!(args.style.font_size(), 20.0);
    }

    #[test]
    fn overrides_are_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("figures.json");
        std::fs::write(
            &path,
            r#"{
                "root": "out",
                "angles": ["45"],
                "times": ["100"],
                "inclinations": ["00"],
                "do_scattered": false,
                "sync_dir": "/home/me/Dropbox/swap",
                "annotations": "margins",
                "thermal_options": {
                    "flux": "I", "vmin": null, "vmax": null,
                    "dynamic_range": 1000.0, "fpeak": 0.5, "psf_fwhm": null,
                    "plot_beam": false, "per_beam": false, "scale": "lin",
                    "cmap": "magma", "coronagraph": 0.1
                },
                "style": {"scale": 3.0}
            }"#,
        )
        .unwrap();
        let args = FiguresArgs::try_from(&path).unwrap();
        assert!(!args.do_scattered);
        assert_eq!(args.annotations, AnnotationStyle::Margins);
        assert_eq!(args.thermal_options.scale, Scale::Lin);
        assert_eq!(args.thermal_options.coronagraph, Some(0.1));
        assert_eq!(args.style.scale, 3.0);
        assert_eq!(args.style.font_scaling, 4.0);
        assert_eq!(
            args.sync_dir,
            Some(PathBuf::from("/home/me/Dropbox/swap"))
        );
    }
}
