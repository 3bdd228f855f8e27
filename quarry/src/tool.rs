// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Invocation of external command line tools

use std::{ffi::OsStr, io, process::ExitStatus};

use thiserror::Error;
use tokio::process;

/// Captured output of a successful run
#[derive(Debug, Clone)]
pub struct Output {
    pub stdout: String,
    pub stderr: String,
}

/// Run `program` to completion, capturing its output
///
/// A non-zero exit is an [`Error::Failed`] carrying stderr.
pub async fn run<I, S>(program: &str, args: I) -> Result<Output, Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = process::Command::new(program);
    command.args(args);

    log::debug!("running {command:?}");

    let output = command.output().await.map_err(|source| Error::Spawn {
        program: program.to_owned(),
        source,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(Error::Failed {
            program: program.to_owned(),
            status: output.status,
            stderr,
        });
    }

    Ok(Output { stdout, stderr })
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} {status}\nstderr: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Write an executable shell script standing in for a real tool
#[cfg(test)]
pub(crate) fn stand_in(dir: &std::path::Path, name: &str, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

    path.to_string_lossy().into_owned()
}
