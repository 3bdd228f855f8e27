// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::{
    env,
    path::{Path, PathBuf},
};

use thiserror::Error;

const ROOT_ENV: &str = "RPM_BUILD_ROOT";
/// Where the CI container keeps its build tree
const CONTAINER_ROOT: &str = "/root/rpmbuild";

/// Layout of an rpmbuild `_topdir`
#[derive(Debug, Clone)]
pub struct Paths {
    root: PathBuf,
    spec: String,
}

impl Paths {
    pub fn new(root: impl Into<PathBuf>, spec: impl ToString) -> Self {
        Self {
            root: root.into(),
            spec: spec.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn specs(&self) -> PathBuf {
        self.root.join("SPECS")
    }

    pub fn spec_file(&self) -> PathBuf {
        self.specs().join(&self.spec)
    }

    pub fn sources(&self) -> PathBuf {
        self.root.join("SOURCES")
    }

    pub fn srpms(&self) -> PathBuf {
        self.root.join("SRPMS")
    }
}

/// Resolve the build tree root, first match wins:
///
/// - explicit `custom` path (CLI flag, then config)
/// - `$RPM_BUILD_ROOT`
/// - `/root/rpmbuild` if it exists
/// - `$HOME/rpmbuild`
pub fn resolve_root(custom: Option<PathBuf>) -> Result<PathBuf, Error> {
    if let Some(dir) = custom {
        return Ok(dir);
    }

    if let Some(dir) = env::var_os(ROOT_ENV).filter(|dir| !dir.is_empty()) {
        return Ok(dir.into());
    }

    let container = Path::new(CONTAINER_ROOT);
    if container.is_dir() {
        return Ok(container.to_path_buf());
    }

    Ok(dirs::home_dir().ok_or(Error::UserHome)?.join("rpmbuild"))
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot find home dir, $HOME env not set")]
    UserHome,
}
