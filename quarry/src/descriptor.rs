// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use chrono::NaiveDate;
use thiserror::Error;

use crate::{release::Release, Project};

/// Release number a fresh upstream version starts at
const FIRST_RELEASE: &str = "1";

/// The version currently packaged by `source`
pub fn current_version(source: &str) -> Result<&str, Error> {
    rpmspec::tag(source, "Version")
        .filter(|version| !version.is_empty())
        .ok_or(Error::MissingVersion)
}

/// Rewrite `source` for `release`
///
/// Updates `Version`, `Source0` and the embedded desktop entry and
/// records a changelog entry by the configured author dated `today`.
/// `Release` restarts at 1 only when the version changes, a forced
/// rebuild keeps it.
pub fn patch(source: &str, release: &Release, project: &Project, today: NaiveDate) -> String {
    let version = &release.version;
    let current_release = rpmspec::tag(source, "Release");

    let mut updater = rpmspec::Updater::new();
    updater.update_tag("Version", version);
    updater.update_tag("Source0", project.source_url(version, &release.asset.name));

    let entry_release = if rpmspec::tag(source, "Version") == Some(version.as_str()) {
        current_release
            .map(release_number)
            .filter(|number| !number.is_empty())
            .unwrap_or(FIRST_RELEASE)
    } else {
        match current_release.and_then(rpmspec::reset_release) {
            Some(reset) => updater.update_tag("Release", reset),
            None => log::warn!("Release tag is missing or not numeric, leaving it untouched"),
        }
        FIRST_RELEASE
    };

    if rpmspec::tag(source, "Source0").is_none() {
        log::warn!("descriptor has no Source0 tag to update");
    }

    updater.update_desktop_entry("Version", version);
    updater.add_changelog(
        rpmspec::Entry::new(today, project.changelog_author(), version, entry_release)
            .line(format!("Update to {version}")),
    );

    updater.apply(source)
}

/// Leading `N` or `N.M` of a release, without macros
fn release_number(release: &str) -> &str {
    let end = release
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(release.len());
    release[..end].trim_end_matches('.')
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not find Version in spec file")]
    MissingVersion,
}

#[cfg(test)]
mod test {
    use crate::release::Asset;

    use super::*;

    const SPEC: &str = include_str!("../../data/zen-browser.spec");

    fn release(version: &str) -> Release {
        Release {
            version: version.to_owned(),
            published_at: None,
            asset: Asset {
                name: "zen.linux-x86_64.tar.xz".into(),
                browser_download_url: format!("https://mirror.example.org/zen/{version}/zen.linux-x86_64.tar.xz")
                    .parse()
                    .unwrap(),
                size: 0,
            },
        }
    }

    fn project() -> Project {
        Project {
            changelog_author: Some("Packager <p@example.com>".into()),
            ..Default::default()
        }
    }

    #[test]
    fn reads_packaged_version() {
        assert_eq!(current_version(SPEC).unwrap(), "1.11.5b");
        assert!(matches!(current_version("Name: x\n"), Err(Error::MissingVersion)));
        assert!(matches!(current_version("Version:\n"), Err(Error::MissingVersion)));
    }

    #[test]
    fn patches_shipped_descriptor() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
        let patched = patch(SPEC, &release("1.12.3b"), &project(), today);

        assert_eq!(current_version(&patched).unwrap(), "1.12.3b");
        assert_eq!(
            rpmspec::tag(&patched, "Source0"),
            Some("https://github.com/zen-browser/desktop/releases/download/1.12.3b/zen.linux-x86_64.tar.xz")
        );
        assert_eq!(rpmspec::tag(&patched, "Release"), Some("1%{?dist}"));
        assert!(patched.contains("[Desktop Entry]\nVersion=1.12.3b\n"));
        assert!(patched.contains(
            "%changelog\n* Fri May 02 2025 Packager <p@example.com> - 1.12.3b-1\n- Update to 1.12.3b\n\n* "
        ));
        // Older history is kept
        assert!(patched.contains("- Update to 1.11.5b"));
        // Untouched lines survive
        assert!(patched.contains("Name:           zen-browser\n"));
        assert!(patched.ends_with('\n'));
    }

    #[test]
    fn source_follows_configured_base_not_download_location() {
        let project = Project {
            source_base: Some("https://ghe.example.com".parse().unwrap()),
            ..project()
        };
        let today = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();

        let patched = patch(SPEC, &release("1.12.3b"), &project, today);

        assert_eq!(
            rpmspec::tag(&patched, "Source0"),
            Some("https://ghe.example.com/zen-browser/desktop/releases/download/1.12.3b/zen.linux-x86_64.tar.xz")
        );
        assert!(!patched.contains("mirror.example.org"));
    }

    #[test]
    fn forced_rebuild_keeps_release() {
        let source = SPEC.replace("Release:        2%{?dist}", "Release:        3%{?dist}");
        let today = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();

        let patched = patch(&source, &release("1.11.5b"), &project(), today);

        assert_eq!(rpmspec::tag(&patched, "Release"), Some("3%{?dist}"));
        assert!(patched.contains("* Fri May 02 2025 Packager <p@example.com> - 1.11.5b-3\n"));
    }

    #[test]
    fn release_numbers() {
        assert_eq!(release_number("3%{?dist}"), "3");
        assert_eq!(release_number("0.2.beta"), "0.2");
        assert_eq!(release_number("%autorelease"), "");
    }
}
