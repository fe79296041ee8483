// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use clap::{Arg, ArgMatches, Command};
use flyby::figures::config::FiguresArgs;
use flyby::products::FitsLoader;
use flyby::sweep::config::SweepArgs;
use flyby::sweep::launcher::ProcessLauncher;
use flyby::sweep::Orchestrator;
use flyby::{figures, DEFAULT_FIGURES_CFG, DEFAULT_SWEEP_CFG};
use std::convert::TryFrom;
use std::env::current_dir;
use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};

fn config_arg() -> Arg<'static> {
    Arg::new("config")
        .short('c')
        .long("cfg")
        .takes_value(true)
        .help("JSON configuration file")
}

/// The `--cfg` value, or `default` under the current directory.
fn cfg_path(
    matches: &ArgMatches,
    default: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    Ok(match matches.value_of("config") {
        Some(p) => PathBuf::from(p),
        None => current_dir()?.join(default),
    })
}

fn sweep(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let cfg = cfg_path(matches, DEFAULT_SWEEP_CFG)?;
    let mut args = SweepArgs::try_from(&cfg)?;
    if matches.is_present("skip-setup") {
        args.setup = false;
    }
    if matches.is_present("skip-run") {
        args.run = false;
    }
    let (setup, run) = (args.setup, args.run);
    let mut orchestrator = Orchestrator::new(args, ProcessLauncher)?;
    if setup {
        orchestrator.setup()?;
    }
    if run {
        let now = Instant::now();
        orchestrator.run()?;
        info!("Sweep complete. {} s.", now.elapsed().as_secs());
    }
    Ok(())
}

fn plot(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let cfg = cfg_path(matches, DEFAULT_FIGURES_CFG)?;
    let args = FiguresArgs::try_from(&cfg)?;
    let now = Instant::now();
    let saved = figures::render_all(&args, &FitsLoader)?;
    info!(
        "{} figures written in {} s.",
        saved.len(),
        now.elapsed().as_secs()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .compact()
        .with_max_level(Level::INFO)
        .init();

    let parsed_args = Command::new("flyby executor")
        .version("0.1")
        .about("Run the flyby MCFOST sweep and plot its results.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("sweep")
                .about("Set up the output tree and run MCFOST.")
                .arg(config_arg())
                .arg(
                    Arg::new("skip-setup")
                        .long("skip-setup")
                        .help("Use an existing output tree"),
                )
                .arg(
                    Arg::new("skip-run")
                        .long("skip-run")
                        .help("Only create the output tree"),
                ),
        )
        .subcommand(
            Command::new("figures")
                .about("Render the grid figures.")
                .arg(config_arg()),
        )
        .get_matches();

    match parsed_args.subcommand() {
        Some(("sweep", m)) => sweep(m),
        Some(("figures", m)) => plot(m),
        _ => unreachable!("a subcommand is required"),
    }
}
