// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Layered YAML configuration
//!
//! A [`Config`] type is identified by its domain. Documents for a domain are
//! read from `{domain}.yaml` and then every `*.yaml` drop-in found in
//! `{domain}.d/`, in file name order, and folded together with
//! [`Config::merge`]. System scope reads vendor (`usr/share`) before admin
//! (`etc`) so the administrator always has the last word.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use fs_err::tokio as fs;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

const EXTENSION: &str = "yaml";

pub trait Config: DeserializeOwned {
    fn domain() -> String;

    /// Fold `other` on top of `self`, `other` taking precedence
    fn merge(self, other: Self) -> Self;
}

#[derive(Debug, Clone)]
pub struct Manager {
    scope: Scope,
}

impl Manager {
    /// Config is loaded / merged from `usr/share` & `etc` relative to `root`
    /// and saved to `etc/{program}/{domain}.d/{name}.yaml`
    pub fn system(root: impl Into<PathBuf>, program: impl ToString) -> Self {
        Self {
            scope: Scope::System {
                root: root.into(),
                program: program.to_string(),
            },
        }
    }

    /// Config is loaded from $XDG_CONFIG_HOME and saved to
    /// $XDG_CONFIG_HOME/{program}/{domain}.d/{name}.yaml
    pub fn user(program: impl ToString) -> Result<Self, CreateUserError> {
        Ok(Self {
            scope: Scope::User {
                config: dirs::config_dir().ok_or(CreateUserError)?,
                program: program.to_string(),
            },
        })
    }

    /// Config is loaded from `path` and saved to
    /// `path`/{domain}.d/{name}.yaml
    pub fn custom(path: impl Into<PathBuf>) -> Self {
        Self {
            scope: Scope::Custom(path.into()),
        }
    }

    /// Every existing document for `T`, in merge order
    pub async fn sources<T: Config>(&self) -> Vec<PathBuf> {
        let domain = T::domain();

        let mut paths = vec![];

        for (entry, resolve) in self.scope.load_with() {
            paths.extend(enumerate_paths(entry, resolve, &domain).await);
        }

        paths
    }

    /// Load and merge all documents for `T`. Unreadable or
    /// malformed documents are reported to the log and skipped.
    pub async fn load<T: Config>(&self) -> Option<T> {
        let mut configs = vec![];

        for path in self.sources::<T>().await {
            match read_config(&path).await {
                Ok(config) => configs.push(config),
                Err(error) => log::warn!("ignoring config {path:?}: {error}"),
            }
        }

        configs.into_iter().reduce(T::merge)
    }

    /// Write `config` as drop-in `name` and return its path
    pub async fn save<T: Config + Serialize>(&self, name: impl fmt::Display, config: &T) -> Result<PathBuf, SaveError> {
        let domain = T::domain();

        let dir = self.scope.save_dir(&domain);

        fs::create_dir_all(&dir).await.map_err(SaveError::CreateDir)?;

        let path = dir.join(format!("{name}.{EXTENSION}"));

        let serialized = serde_yaml::to_string(config)?;

        fs::write(&path, serialized).await.map_err(SaveError::Write)?;

        Ok(path)
    }
}

#[derive(Debug, Error)]
#[error("$HOME or $XDG_CONFIG_HOME env not set")]
pub struct CreateUserError;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("create config dir")]
    CreateDir(#[source] std::io::Error),
    #[error("serialize config")]
    Yaml(#[from] serde_yaml::Error),
    #[error("write config file")]
    Write(#[source] std::io::Error),
}

#[derive(Debug, Error)]
enum ReadError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),
}

async fn enumerate_paths(entry: Entry, resolve: Resolve<'_>, domain: &str) -> Vec<PathBuf> {
    match entry {
        Entry::File => {
            let file = resolve.file(domain);

            if file.exists() {
                vec![file]
            } else {
                vec![]
            }
        }
        Entry::Directory => {
            let Ok(mut read_dir) = fs::read_dir(resolve.dir(domain)).await else {
                return vec![];
            };

            let mut paths = vec![];

            while let Ok(Some(entry)) = read_dir.next_entry().await {
                let path = entry.path();
                let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();

                if path.is_file() && extension == EXTENSION {
                    paths.push(path);
                }
            }

            // Drop-ins apply in a stable order
            paths.sort();
            paths
        }
    }
}

async fn read_config<T: Config>(path: &Path) -> Result<T, ReadError> {
    let bytes = fs::read(path).await?;
    Ok(serde_yaml::from_slice(&bytes)?)
}

#[derive(Debug, Clone)]
enum Scope {
    System { program: String, root: PathBuf },
    User { program: String, config: PathBuf },
    Custom(PathBuf),
}

impl Scope {
    fn save_dir(&self, domain: &str) -> PathBuf {
        match &self {
            Scope::System { root, program } => Resolve::System {
                root,
                base: SystemBase::Admin,
                program,
            },
            Scope::User { config, program } => Resolve::User { config, program },
            Scope::Custom(dir) => Resolve::Custom(dir),
        }
        .dir(domain)
    }

    fn load_with(&self) -> Vec<(Entry, Resolve<'_>)> {
        match &self {
            Scope::System { root, program } => [SystemBase::Vendor, SystemBase::Admin]
                .into_iter()
                .flat_map(move |base| {
                    [Entry::File, Entry::Directory]
                        .into_iter()
                        .map(move |entry| (entry, Resolve::System { root, base, program }))
                })
                .collect(),
            Scope::User { config, program } => vec![
                (Entry::File, Resolve::User { config, program }),
                (Entry::Directory, Resolve::User { config, program }),
            ],
            Scope::Custom(root) => vec![
                (Entry::File, Resolve::Custom(root)),
                (Entry::Directory, Resolve::Custom(root)),
            ],
        }
    }
}

#[derive(Clone, Copy)]
enum SystemBase {
    Admin,
    Vendor,
}

impl SystemBase {
    fn path(&self) -> &'static str {
        match self {
            SystemBase::Admin => "etc",
            SystemBase::Vendor => "usr/share",
        }
    }
}

#[derive(Clone, Copy)]
enum Entry {
    File,
    Directory,
}

enum Resolve<'a> {
    System {
        root: &'a Path,
        base: SystemBase,
        program: &'a str,
    },
    User {
        config: &'a Path,
        program: &'a str,
    },
    Custom(&'a Path),
}

impl Resolve<'_> {
    fn config_dir(&self) -> PathBuf {
        match self {
            Resolve::System { root, base, program } => root.join(base.path()).join(program),
            Resolve::User { config, program } => config.join(program),
            Resolve::Custom(dir) => dir.to_path_buf(),
        }
    }

    fn file(&self, domain: &str) -> PathBuf {
        self.config_dir().join(format!("{domain}.{EXTENSION}"))
    }

    fn dir(&self, domain: &str) -> PathBuf {
        self.config_dir().join(format!("{domain}.d"))
    }
}
