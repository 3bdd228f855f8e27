// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! The check → fetch → patch → build → submit sequence
//!
//! Each step runs to completion before the next starts and the
//! first failure aborts the run.

use std::{io, path::PathBuf};

use chrono::Local;
use fs_err::tokio as fs;
use thiserror::Error;
use tui::Styled;

use crate::{
    copr, descriptor, fetch,
    release::{self, Lookup, Release, SkipReason},
    srpm, Env,
};

/// Result of comparing upstream against the packaged descriptor
#[derive(Debug)]
pub enum Status {
    Skipped { tag: String, reason: SkipReason },
    UpToDate { release: Release },
    Outdated { current: String, release: Release },
}

#[derive(Debug)]
pub enum Outcome {
    Skipped { tag: String, reason: SkipReason },
    UpToDate { version: String },
    Built { version: String, srpm: PathBuf },
    Submitted {
        version: String,
        srpm: PathBuf,
        build_id: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Rebuild even when the descriptor is already current
    pub force: bool,
    /// Stop once the source package is built
    pub no_submit: bool,
    /// Don't wait on the COPR build to finish
    pub nowait: bool,
}

/// Steps 1-4: look up upstream and compare with the descriptor
pub async fn check(env: &Env) -> Result<Status, Error> {
    let release = match release::latest(&env.project).await? {
        Lookup::Skipped { tag, reason } => return Ok(Status::Skipped { tag, reason }),
        Lookup::Found(release) => release,
    };

    let spec_file = env.paths.spec_file();
    let source = fs::read_to_string(&spec_file).await.map_err(Error::ReadSpec)?;
    let current = descriptor::current_version(&source)?;

    log::debug!("upstream {}, packaged {current}", release.version);

    if current == release.version {
        Ok(Status::UpToDate { release })
    } else {
        Ok(Status::Outdated {
            current: current.to_owned(),
            release,
        })
    }
}

/// The full pipeline
pub async fn run(env: &Env, options: Options) -> Result<Outcome, Error> {
    let (current, release) = match check(env).await? {
        Status::Skipped { tag, reason } => return Ok(Outcome::Skipped { tag, reason }),
        Status::UpToDate { release } if !options.force => {
            return Ok(Outcome::UpToDate {
                version: release.version,
            })
        }
        Status::UpToDate { release } => (release.version.clone(), release),
        Status::Outdated { current, release } => (current, release),
    };

    if current == release.version {
        println!("{} {}", "Rebuilding".yellow(), release.version.as_str().bold());
    } else {
        println!(
            "{} {} {} {}",
            "New version found:".green(),
            current.as_str().dim(),
            "→".dim(),
            release.version.as_str().bold()
        );
    }

    let fetched = fetch::archive(&release.asset, &env.paths.sources()).await?;
    println!(
        "{} {} {}",
        "Fetched".green(),
        release.asset.name.as_str().bold(),
        format!("(sha256 {})", fetched.sha256).dim()
    );

    let spec_file = env.paths.spec_file();
    let source = fs::read_to_string(&spec_file).await.map_err(Error::ReadSpec)?;
    let patched = descriptor::patch(&source, &release, &env.project, Local::now().date_naive());
    fs::write(&spec_file, patched).await.map_err(Error::WriteSpec)?;
    println!("{} {}", "Updated".green(), spec_file.display());

    let result = build_and_submit(env, release.version, options).await;

    // Leave the old version in place so the next run retries
    if result.is_err() {
        match fs::write(&spec_file, &source).await {
            Ok(()) => log::warn!("restored {spec_file:?} after failure"),
            Err(error) => log::error!("unable to restore {spec_file:?}: {error}"),
        }
    }

    result
}

async fn build_and_submit(env: &Env, version: String, options: Options) -> Result<Outcome, Error> {
    let pb = tui::spinner(format!("{} {}", "Building".blue(), "SRPM".bold()));
    let built = srpm::build(&env.paths, env.project.rpmbuild(), env.project.dist.as_deref()).await;
    pb.finish_and_clear();
    let srpm = built?;
    println!("{} {}", "Found SRPM:".green(), srpm.display());

    if options.no_submit {
        return Ok(Outcome::Built { version, srpm });
    }

    let project = env.project.copr_project();
    println!("{} {} to {}", "Submitting".blue(), srpm.display(), project.bold());

    let submission = copr::submit(env.project.copr_cli(), project, &srpm, options.nowait).await?;
    log::debug!("copr-cli output:\n{}", submission.output);

    Ok(Outcome::Submitted {
        version,
        srpm,
        build_id: submission.build_id,
    })
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("release")]
    Release(#[from] release::Error),
    #[error("reading spec file")]
    ReadSpec(#[source] io::Error),
    #[error("writing spec file")]
    WriteSpec(#[source] io::Error),
    #[error("descriptor")]
    Descriptor(#[from] descriptor::Error),
    #[error("download source")]
    Fetch(#[from] fetch::Error),
    #[error("build SRPM")]
    Srpm(#[from] srpm::Error),
    #[error("submit to COPR")]
    Copr(#[from] copr::Error),
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use url::Url;

    use super::*;
    use crate::{tool::stand_in, Paths, Project};

    const SPEC: &str = include_str!("../../data/zen-browser.spec");

    /// A build tree plus a `file://` API mirror serving `tag`
    fn fixture(dir: &Path, tag: &str) -> Env {
        let archive = dir.join("upstream.tar.xz");
        std::fs::write(&archive, b"not really xz").unwrap();

        let releases = dir.join("api/repos/zen-browser/desktop/releases");
        std::fs::create_dir_all(&releases).unwrap();
        std::fs::write(
            releases.join("latest"),
            format!(
                r#"{{"tag_name": "{tag}", "assets": [{{"name": "zen.linux-x86_64.tar.xz", "browser_download_url": "{}"}}]}}"#,
                Url::from_file_path(&archive).unwrap()
            ),
        )
        .unwrap();

        let root = dir.join("rpmbuild");
        std::fs::create_dir_all(root.join("SPECS")).unwrap();
        std::fs::write(root.join("SPECS/zen-browser.spec"), SPEC).unwrap();

        let bin = dir.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let rpmbuild = stand_in(
            &bin,
            "rpmbuild",
            r#"topdir="${4#_topdir }"
mkdir -p "$topdir/SRPMS"
: > "$topdir/SRPMS/zen-browser-built.src.rpm"
echo "Wrote: $topdir/SRPMS/zen-browser-built.src.rpm" >&2"#,
        );
        let copr_cli = stand_in(
            &bin,
            "copr-cli",
            &format!(
                r#"printf '%s\n' "$@" > {:?}
echo "Created builds: 42""#,
                bin.join("copr-args")
            ),
        );

        let project = Project {
            api_url: Some(Url::from_directory_path(dir.join("api")).unwrap()),
            dist: Some(".fc41".into()),
            rpmbuild: Some(rpmbuild),
            copr_cli: Some(copr_cli),
            ..Default::default()
        };

        Env {
            config: config::Manager::custom(dir.join("config")),
            paths: Paths::new(root, project.spec()),
            project,
        }
    }

    #[tokio::test]
    async fn reports_new_version() {
        let dir = tempfile::tempdir().unwrap();
        let env = fixture(dir.path(), "1.12.3b");

        let Status::Outdated { current, release } = check(&env).await.unwrap() else {
            panic!("expected outdated");
        };

        assert_eq!(current, "1.11.5b");
        assert_eq!(release.version, "1.12.3b");
    }

    #[tokio::test]
    async fn up_to_date_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let env = fixture(dir.path(), "1.11.5b");

        let outcome = run(&env, Options::default()).await.unwrap();

        assert!(matches!(outcome, Outcome::UpToDate { ref version } if version == "1.11.5b"));
        assert!(!env.paths.sources().exists());
        assert_eq!(std::fs::read_to_string(env.paths.spec_file()).unwrap(), SPEC);
    }

    #[tokio::test]
    async fn nightly_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let env = fixture(dir.path(), "twilight");

        let outcome = run(&env, Options::default()).await.unwrap();

        assert!(matches!(
            outcome,
            Outcome::Skipped {
                reason: SkipReason::Nightly,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn missing_descriptor_fails() {
        let dir = tempfile::tempdir().unwrap();
        let env = fixture(dir.path(), "1.12.3b");
        std::fs::remove_file(env.paths.spec_file()).unwrap();

        assert!(matches!(check(&env).await, Err(Error::ReadSpec(_))));
    }

    #[tokio::test]
    async fn update_fetches_and_patches_before_building() {
        let dir = tempfile::tempdir().unwrap();
        let env = fixture(dir.path(), "1.12.3b");

        let options = Options {
            no_submit: true,
            ..Default::default()
        };

        let Outcome::Built { version, srpm } = run(&env, options).await.unwrap() else {
            panic!("expected built");
        };

        assert_eq!(version, "1.12.3b");
        assert_eq!(srpm, env.paths.srpms().join("zen-browser-built.src.rpm"));
        assert_eq!(
            std::fs::read(env.paths.sources().join("zen.linux-x86_64.tar.xz")).unwrap(),
            b"not really xz"
        );
        assert!(!dir.path().join("bin/copr-args").exists());

        let patched = std::fs::read_to_string(env.paths.spec_file()).unwrap();
        assert_eq!(descriptor::current_version(&patched).unwrap(), "1.12.3b");
        assert_eq!(
            rpmspec::tag(&patched, "Source0"),
            Some("https://github.com/zen-browser/desktop/releases/download/1.12.3b/zen.linux-x86_64.tar.xz")
        );
    }

    #[tokio::test]
    async fn update_submits_built_package() {
        let dir = tempfile::tempdir().unwrap();
        let env = fixture(dir.path(), "1.12.3b");

        let options = Options {
            nowait: true,
            ..Default::default()
        };

        let Outcome::Submitted { version, srpm, build_id } = run(&env, options).await.unwrap() else {
            panic!("expected submitted");
        };

        assert_eq!(version, "1.12.3b");
        assert_eq!(build_id, Some(42));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("bin/copr-args")).unwrap(),
            format!("build\n--nowait\n51ddh4r7h/zen-browser\n{}\n", srpm.display())
        );
    }

    #[tokio::test]
    async fn forced_rebuild_of_current_version() {
        let dir = tempfile::tempdir().unwrap();
        let env = fixture(dir.path(), "1.11.5b");

        let options = Options {
            force: true,
            no_submit: true,
            ..Default::default()
        };

        assert!(matches!(
            run(&env, options).await.unwrap(),
            Outcome::Built { ref version, .. } if version == "1.11.5b"
        ));
    }

    #[tokio::test]
    async fn failed_build_restores_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = fixture(dir.path(), "1.12.3b");
        env.project.rpmbuild = Some(stand_in(dir.path(), "broken-rpmbuild", "echo 'error: bad' >&2; exit 1"));

        assert!(matches!(run(&env, Options::default()).await, Err(Error::Srpm(_))));
        assert_eq!(std::fs::read_to_string(env.paths.spec_file()).unwrap(), SPEC);

        // Still reported as outdated so the next run retries
        assert!(matches!(check(&env).await.unwrap(), Status::Outdated { .. }));
    }

    #[tokio::test]
    async fn failed_submit_restores_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let mut env = fixture(dir.path(), "1.12.3b");
        env.project.copr_cli = Some(stand_in(dir.path(), "broken-copr", "exit 1"));

        assert!(matches!(run(&env, Options::default()).await, Err(Error::Copr(_))));
        assert_eq!(std::fs::read_to_string(env.paths.spec_file()).unwrap(), SPEC);
    }
}
