// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.
use crate::errors::SweepError;
use crate::sweep::command::Invocation;
use std::fs::OpenOptions;
use std::process::{Command, Stdio};
use tracing::info;

/// Runs an invocation to completion.
pub trait Launcher {
    /// Blocks until the process exits and returns its exit code
    /// (`None` if it was killed by a signal).
    fn launch(
        &mut self,
        invocation: &Invocation,
    ) -> Result<Option<i32>, SweepError>;
}

/// Launches MCFOST as a child process, with stdout and stderr both
/// written to the invocation's log file.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessLauncher;

impl Launcher for ProcessLauncher {
    fn launch(
        &mut self,
        invocation: &Invocation,
    ) -> Result<Option<i32>, SweepError> {
        let log = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&invocation.log)
            .map_err(|e| SweepError::Log(invocation.log.clone(), e))?;
        let log_err = log
            .try_clone()
            .map_err(|e| SweepError::Log(invocation.log.clone(), e))?;

        info!("executing command: {}", invocation);
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err))
            .status()
            .map_err(|e| {
                SweepError::Spawn(invocation.program.clone(), e)
            })?;
        Ok(status.code())
    }
}
