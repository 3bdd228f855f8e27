// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Build submission through `copr-cli`

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use thiserror::Error;

use crate::{srpm, tool};

static BUILD_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Created builds: (\d+)").expect("valid regex"));

#[derive(Debug, Clone)]
pub struct Submission {
    /// Absent when copr-cli output doesn't report one
    pub build_id: Option<u64>,
    pub output: String,
}

/// Queue source `package` for building in `project` (`owner/name`)
/// through `program`, normally `copr-cli`
///
/// Without `nowait` copr-cli follows the build until it finishes.
pub async fn submit(program: &str, project: &str, package: &Path, nowait: bool) -> Result<Submission, Error> {
    let package = PathBuf::from(srpm::strip_wrote(&package.to_string_lossy()));

    let mut args = vec![OsStr::new("build")];
    if nowait {
        args.push(OsStr::new("--nowait"));
    }
    args.extend([OsStr::new(project), package.as_os_str()]);

    let output = tool::run(program, args).await?;

    Ok(Submission {
        build_id: build_id(&output.stdout),
        output: output.stdout,
    })
}

pub fn build_id(output: &str) -> Option<u64> {
    BUILD_ID.captures(output)?.get(1)?.as_str().parse().ok()
}

/// Frontend page tracking build `id`
pub fn status_url(frontend: &str, id: u64) -> String {
    format!("{}/coprs/build/{id}/", frontend.trim_end_matches('/'))
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("copr-cli")]
    Submit(#[from] tool::Error),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tool::stand_in;

    /// copr-cli stand-in recording its arguments to `args`
    fn copr_cli(dir: &Path) -> String {
        let args = dir.join("args");
        stand_in(
            dir,
            "copr-cli",
            &format!(
                r#"printf '%s\n' "$@" > {args:?}
echo "Created builds: 42""#
            ),
        )
    }

    #[tokio::test]
    async fn submits_without_waiting() {
        let dir = tempfile::tempdir().unwrap();
        let program = copr_cli(dir.path());

        let submission = submit(
            &program,
            "owner/zen-browser",
            Path::new("Wrote: /build/SRPMS/zen-browser-1.12.3b-1.fc41.src.rpm"),
            true,
        )
        .await
        .unwrap();

        assert_eq!(submission.build_id, Some(42));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("args")).unwrap(),
            "build\n--nowait\nowner/zen-browser\n/build/SRPMS/zen-browser-1.12.3b-1.fc41.src.rpm\n"
        );
    }

    #[tokio::test]
    async fn waits_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let program = copr_cli(dir.path());

        submit(&program, "owner/zen-browser", Path::new("/build/zen.src.rpm"), false)
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("args")).unwrap(),
            "build\nowner/zen-browser\n/build/zen.src.rpm\n"
        );
    }

    #[tokio::test]
    async fn rejected_submission_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let program = stand_in(dir.path(), "copr-cli", "echo 'Error: not logged in' >&2; exit 1");

        let error = submit(&program, "owner/zen-browser", Path::new("/build/zen.src.rpm"), true)
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            Error::Submit(tool::Error::Failed { ref stderr, .. }) if stderr == "Error: not logged in\n"
        ));
    }

    #[tokio::test]
    async fn missing_build_id_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let program = stand_in(dir.path(), "copr-cli", "echo queued");

        let submission = submit(&program, "owner/zen-browser", Path::new("/build/zen.src.rpm"), true)
            .await
            .unwrap();

        assert_eq!(submission.build_id, None);
        assert_eq!(submission.output, "queued\n");
    }

    #[test]
    fn parses_build_id() {
        let output = "Uploading package zen-browser-1.12.3b-1.fc41.src.rpm\n\
                      100% |################################| 88.0 MB  12.1 MB/s eta 0:00:00\n\
                      Build was added to zen-browser:\n  \
                      https://copr.fedorainfracloud.org/coprs/build/8712345\n\
                      Created builds: 8712345\n";

        assert_eq!(build_id(output), Some(8_712_345));
        assert_eq!(build_id("Error: project not found\n"), None);
    }

    #[test]
    fn status_url_format() {
        assert_eq!(
            status_url("https://copr.fedorainfracloud.org/", 42),
            "https://copr.fedorainfracloud.org/coprs/build/42/"
        );
    }
}
