// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::path::PathBuf;

use thiserror::Error;

use crate::{paths, util, Paths, Project};

const PROGRAM: &str = "quarry";

pub struct Env {
    pub config: config::Manager,
    pub project: Project,
    pub paths: Paths,
}

impl Env {
    pub async fn new(config_dir: Option<PathBuf>, rpmbuild_root: Option<PathBuf>) -> Result<Self, Error> {
        let config = if let Some(dir) = config_dir {
            config::Manager::custom(dir)
        } else if util::is_root() {
            config::Manager::system("/", PROGRAM)
        } else {
            config::Manager::user(PROGRAM)?
        };

        let project = config.load::<Project>().await.unwrap_or_default();

        let root = paths::resolve_root(rpmbuild_root.or_else(|| project.rpmbuild_root.clone()))?;
        let paths = Paths::new(root, project.spec());

        Ok(Self { config, project, paths })
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot find config dir, $XDG_CONFIG_HOME or $HOME env not set")]
    UserConfig,
    #[error("resolve rpmbuild root")]
    Paths(#[from] paths::Error),
}

impl From<config::CreateUserError> for Error {
    fn from(_: config::CreateUserError) -> Self {
        Error::UserConfig
    }
}
