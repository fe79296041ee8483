// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Drives a shell script standing in for MCFOST.
#![cfg(unix)]

use flyby::errors::SweepError;
use flyby::params::ParameterSpace;
use flyby::sweep::config::SweepArgs;
use flyby::sweep::launcher::ProcessLauncher;
use flyby::sweep::Orchestrator;
use flyby::Directories;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Writes the directories MCFOST would for each kind of run.
const FAKE_MCFOST: &str = r#"#!/bin/sh
echo "mcfost $*"
case " $* " in
    *" -img 850 "*) exit $FAIL_850 ;;
esac
case " $* " in
    *" -img "*)
        wl=$(echo "$*" | sed 's/.*-img \([^ ]*\).*/\1/')
        mkdir "data_$wl" ;;
    *" -mol "*)
        mkdir data_CO
        touch a.tmp b.tmp ;;
    *)
        mkdir data_th ;;
esac
"#;

fn fake_mcfost(dir: &Path, fail_850: i32) -> PathBuf {
    let path = dir.join("mcfost");
    let script = FAKE_MCFOST.replace("$FAIL_850", &fail_850.to_string());
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn labels(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn args(root: &Path, mcfost: PathBuf, wavelengths: &[&str]) -> SweepArgs {
    SweepArgs::new(
        Directories {
            config: root.join("config"),
            mcfost,
            dumps: root.join("dumps"),
            output: root.join("output"),
        },
        ParameterSpace {
            angles: labels(&["45"]),
            times: labels(&["100", "110"]),
            inclinations: labels(&["00"]),
            wavelengths: labels(wavelengths),
            molecules: labels(&["CO"]),
        },
    )
}

#[test]
fn real_process_populates_tree() {
    let tmp = tempfile::tempdir().unwrap();
    let mcfost = fake_mcfost(tmp.path(), 0);
    let mut o =
        Orchestrator::new(args(tmp.path(), mcfost, &["1.6"]), ProcessLauncher)
            .unwrap();
    o.setup().unwrap();
    o.run().unwrap();

    let out = tmp.path().join("output");
    for t in ["t100", "t110"].iter() {
        let leaf = out.join("b45").join(t).join("i00");
        assert!(leaf.join("data_1.6").is_dir());
        assert!(leaf.join("data_CO").is_dir());
        assert!(leaf.join("data_th_CO").join("a.tmp").is_file());
        assert!(leaf.join("data_th_CO").join("b.tmp").is_file());
        assert!(out.join("b45").join(t).join("data_th").is_dir());
        assert!(!out.join("b45").join(t).join("a.tmp").exists());
    }
    let log = fs::read_to_string(out.join("logs").join("b45-100_i00_1.6.log"))
        .unwrap();
    assert!(log.contains("-img 1.6 -ignore_dust"));
    assert!(!log.contains("-casa"));
    assert_eq!(fs::read_dir(out.join("logs")).unwrap().count(), 6);
}

#[test]
fn failing_process_stops_the_sweep() {
    let tmp = tempfile::tempdir().unwrap();
    let mcfost = fake_mcfost(tmp.path(), 3);
    let mut o = Orchestrator::new(
        args(tmp.path(), mcfost, &["850", "1.6"]),
        ProcessLauncher,
    )
    .unwrap();
    o.setup().unwrap();
    match o.run() {
        Err(SweepError::NonZeroExit { code, log, .. }) => {
            assert_eq!(code, Some(3));
            assert!(log.ends_with("b45-100_i00_850.log"));
        }
        _ => panic!("expected a non-zero exit"),
    }
    let logs = tmp.path().join("output").join("logs");
    assert_eq!(fs::read_dir(&logs).unwrap().count(), 2);
    assert!(!logs.join("b45-100_i00_1.6.log").exists());
}
