// Copyright © 2020 Brian Merchant.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Copies saved figures into a sync folder. Never fails the caller.

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PostStep {
    /// No sync folder configured.
    Skipped,
    Copied(PathBuf),
    Failed(String),
}

/// Copy `file` into `dir`, keeping its name.
pub fn sync_copy(file: &Path, dir: Option<&Path>) -> PostStep {
    let dir = match dir {
        Some(dir) => dir,
        None => return PostStep::Skipped,
    };
    let name = match file.file_name() {
        Some(name) => name,
        None => {
            return PostStep::Failed(format!(
                "{} has no file name",
                file.display()
            ))
        }
    };
    let to = dir.join(name);
    match fs::copy(file, &to) {
        Ok(_) => PostStep::Copied(to),
        Err(e) => PostStep::Failed(format!(
            "could not copy {} to {}: {}",
            file.display(),
            dir.display(),
            e
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_into_folder() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("thermal_b45_850.pdf");
        fs::write(&file, "%PDF-1.7").unwrap();
        let swap = tmp.path().join("swap");
        fs::create_dir(&swap).unwrap();

        assert_eq!(sync_copy(&file, None), PostStep::Skipped);
        let to = swap.join("thermal_b45_850.pdf");
        assert_eq!(sync_copy(&file, Some(&swap)), PostStep::Copied(to.clone()));
        assert_eq!(fs::read_to_string(to).unwrap(), "%PDF-1.7");
    }

    #[test]
    fn missing_folder_is_reported_not_raised() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("a.pdf");
        fs::write(&file, "").unwrap();
        let r = sync_copy(&file, Some(&tmp.path().join("nope")));
        assert!(matches!(r, PostStep::Failed(_)));
    }
}
