// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_REPOSITORY: &str = "zen-browser/desktop";
const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_ASSET: &str = "linux-x86_64.tar.xz";
const DEFAULT_NIGHTLY_MARKER: &str = "t";
const DEFAULT_SOURCE_BASE: &str = "https://github.com";
const DEFAULT_SPEC: &str = "zen-browser.spec";
const DEFAULT_COPR_PROJECT: &str = "51ddh4r7h/zen-browser";
const DEFAULT_COPR_FRONTEND: &str = "https://copr.fedorainfracloud.org";
const DEFAULT_CHANGELOG_AUTHOR: &str = "COPR Build System <copr-build@fedoraproject.org>";
const DEFAULT_RPMBUILD: &str = "rpmbuild";
const DEFAULT_COPR_CLI: &str = "copr-cli";

/// What to track upstream and where to send the rebuilt package
///
/// Every field is optional so drop-ins only need to state what they
/// change, unset fields fall back to the Zen Browser defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nightly_marker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_base: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copr_project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copr_frontend: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changelog_author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpmbuild_root: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpmbuild: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copr_cli: Option<String>,
}

impl config::Config for Project {
    fn domain() -> String {
        "project".into()
    }

    fn merge(self, other: Self) -> Self {
        Self {
            repository: other.repository.or(self.repository),
            api_url: other.api_url.or(self.api_url),
            asset: other.asset.or(self.asset),
            nightly_marker: other.nightly_marker.or(self.nightly_marker),
            source_base: other.source_base.or(self.source_base),
            spec: other.spec.or(self.spec),
            copr_project: other.copr_project.or(self.copr_project),
            copr_frontend: other.copr_frontend.or(self.copr_frontend),
            changelog_author: other.changelog_author.or(self.changelog_author),
            dist: other.dist.or(self.dist),
            rpmbuild_root: other.rpmbuild_root.or(self.rpmbuild_root),
            rpmbuild: other.rpmbuild.or(self.rpmbuild),
            copr_cli: other.copr_cli.or(self.copr_cli),
        }
    }
}

impl Project {
    /// Every field populated with its effective value
    pub fn defaults() -> Self {
        Self {
            repository: Some(DEFAULT_REPOSITORY.to_owned()),
            api_url: DEFAULT_API_URL.parse().ok(),
            asset: Some(DEFAULT_ASSET.to_owned()),
            nightly_marker: Some(DEFAULT_NIGHTLY_MARKER.to_owned()),
            source_base: DEFAULT_SOURCE_BASE.parse().ok(),
            spec: Some(DEFAULT_SPEC.to_owned()),
            copr_project: Some(DEFAULT_COPR_PROJECT.to_owned()),
            copr_frontend: DEFAULT_COPR_FRONTEND.parse().ok(),
            changelog_author: Some(DEFAULT_CHANGELOG_AUTHOR.to_owned()),
            dist: None,
            rpmbuild_root: None,
            rpmbuild: Some(DEFAULT_RPMBUILD.to_owned()),
            copr_cli: Some(DEFAULT_COPR_CLI.to_owned()),
        }
    }

    /// `owner/name` of the upstream GitHub repository
    pub fn repository(&self) -> &str {
        self.repository.as_deref().unwrap_or(DEFAULT_REPOSITORY)
    }

    /// The `releases/latest` endpoint for [`Self::repository`]
    pub fn latest_release_url(&self) -> Result<Url, url::ParseError> {
        let base = match &self.api_url {
            Some(url) => url.as_str().trim_end_matches('/').to_owned(),
            None => DEFAULT_API_URL.to_owned(),
        };

        format!("{base}/repos/{}/releases/latest", self.repository()).parse()
    }

    /// Substring identifying the archive among release assets
    pub fn asset(&self) -> &str {
        self.asset.as_deref().unwrap_or(DEFAULT_ASSET)
    }

    /// Tags containing this are nightly builds; empty disables the check
    pub fn nightly_marker(&self) -> &str {
        self.nightly_marker.as_deref().unwrap_or(DEFAULT_NIGHTLY_MARKER)
    }

    /// `Source0` of the descriptor for `asset` of release `version`
    ///
    /// Always points at the public release page rather than wherever
    /// the API served the asset from, so local mirrors never leak into
    /// the packaged descriptor.
    pub fn source_url(&self, version: &str, asset: &str) -> String {
        let base = self
            .source_base
            .as_ref()
            .map(Url::as_str)
            .unwrap_or(DEFAULT_SOURCE_BASE)
            .trim_end_matches('/');

        format!("{base}/{}/releases/download/{version}/{asset}", self.repository())
    }

    /// File name of the descriptor under `SPECS/`
    pub fn spec(&self) -> &str {
        self.spec.as_deref().unwrap_or(DEFAULT_SPEC)
    }

    pub fn copr_project(&self) -> &str {
        self.copr_project.as_deref().unwrap_or(DEFAULT_COPR_PROJECT)
    }

    pub fn copr_frontend(&self) -> &str {
        self.copr_frontend
            .as_ref()
            .map(Url::as_str)
            .unwrap_or(DEFAULT_COPR_FRONTEND)
            .trim_end_matches('/')
    }

    pub fn changelog_author(&self) -> &str {
        self.changelog_author.as_deref().unwrap_or(DEFAULT_CHANGELOG_AUTHOR)
    }

    /// Program invoked to build the source package
    pub fn rpmbuild(&self) -> &str {
        self.rpmbuild.as_deref().unwrap_or(DEFAULT_RPMBUILD)
    }

    /// Program invoked to submit builds
    pub fn copr_cli(&self) -> &str {
        self.copr_cli.as_deref().unwrap_or(DEFAULT_COPR_CLI)
    }
}
