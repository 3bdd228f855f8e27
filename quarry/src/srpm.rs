// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Source package builds with `rpmbuild -bs`

use std::{
    ffi::OsStr,
    io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use fs_err as fs;
use thiserror::Error;

use crate::{tool, Paths};

const EXTENSION: &str = ".src.rpm";
const WROTE_PREFIX: &str = "Wrote: ";

/// Build a source package from the descriptor in `paths` with
/// `program`, normally `rpmbuild`
///
/// `dist` expands `%{?dist}` when the artifact has to be located by
/// name, it is queried from rpm when not given.
pub async fn build(paths: &Paths, program: &str, dist: Option<&str>) -> Result<PathBuf, Error> {
    let spec_file = paths.spec_file();
    let topdir = format!("_topdir {}", paths.root().display());

    let args = [
        OsStr::new("-bs"),
        spec_file.as_os_str(),
        OsStr::new("--define"),
        OsStr::new(&topdir),
    ];
    let output = tool::run(program, args).await?;

    if let Some(path) = find_in_output(&output.stdout, &output.stderr) {
        log::debug!("srpm reported by rpmbuild: {path:?}");
        return Ok(path);
    }

    let dist = match dist {
        Some(dist) => Some(dist.to_owned()),
        None => query_dist().await,
    };
    if let Some(dist) = dist {
        let source = fs::read_to_string(&spec_file).map_err(Error::ReadSpec)?;
        if let Some(path) = expected_path(&source, &paths.srpms(), &dist).filter(|path| path.exists()) {
            log::debug!("srpm found by name: {path:?}");
            return Ok(path);
        }
    }

    if let Some(path) = newest_in_dir(&paths.srpms()).map_err(Error::ScanDir)? {
        log::debug!("srpm found by scanning: {path:?}");
        return Ok(path);
    }

    Err(Error::NotFound {
        stdout: output.stdout,
        stderr: output.stderr,
    })
}

/// Strip the `Wrote: ` prefix rpmbuild reports artifacts with
pub fn strip_wrote(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix(WROTE_PREFIX).unwrap_or(line)
}

/// First `.src.rpm` line in stderr, then stdout
pub fn find_in_output(stdout: &str, stderr: &str) -> Option<PathBuf> {
    [stderr, stdout]
        .into_iter()
        .flat_map(str::lines)
        .find(|line| line.trim_end().ends_with(EXTENSION))
        .map(|line| PathBuf::from(strip_wrote(line)))
}

/// Where rpmbuild writes the package for `source`'s
/// `Name`-`Version`-`Release`
pub fn expected_path(source: &str, srpms: &Path, dist: &str) -> Option<PathBuf> {
    let name = rpmspec::tag(source, "Name")?;
    let version = rpmspec::tag(source, "Version")?;
    let release = rpmspec::expand_dist(rpmspec::tag(source, "Release")?, dist);

    Some(srpms.join(format!("{name}-{version}-{release}{EXTENSION}")))
}

/// Most recently modified `.src.rpm` in `dir`, creating `dir` when absent
pub fn newest_in_dir(dir: &Path) -> io::Result<Option<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if !path.to_string_lossy().ends_with(EXTENSION) {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        if newest.as_ref().map_or(true, |(time, _)| modified > *time) {
            newest = Some((modified, path));
        }
    }

    Ok(newest.map(|(_, path)| path))
}

/// Value of `%{?dist}` on this host, `None` if rpm isn't usable
async fn query_dist() -> Option<String> {
    match tool::run("rpm", ["--eval", "%{?dist}"]).await {
        Ok(output) => Some(output.stdout.trim().to_owned()),
        Err(error) => {
            log::warn!("unable to query dist: {error}");
            None
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("rpmbuild")]
    Build(#[from] tool::Error),
    #[error("reading spec file")]
    ReadSpec(#[source] io::Error),
    #[error("scanning SRPMS directory")]
    ScanDir(#[source] io::Error),
    #[error("could not find built SRPM path in output\nstdout: {stdout}\nstderr: {stderr}")]
    NotFound { stdout: String, stderr: String },
}
