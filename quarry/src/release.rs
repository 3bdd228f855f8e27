// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

//! Upstream release discovery via the GitHub releases API

use std::env;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::{request, Project};

/// Token used to lift anonymous API rate limits, never persisted
const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Subset of the `releases/latest` response we consume
#[derive(Debug, Deserialize)]
pub struct Latest {
    pub tag_name: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: Url,
    #[serde(default)]
    pub size: u64,
}

/// A stable release with its matching archive
#[derive(Debug, Clone)]
pub struct Release {
    pub version: String,
    pub published_at: Option<String>,
    pub asset: Asset,
}

#[derive(Debug)]
pub enum Lookup {
    /// Latest tag is a nightly / pre-release build
    Skipped { tag: String, reason: SkipReason },
    Found(Release),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SkipReason {
    Nightly,
    Prerelease,
}

/// Query the configured repository for its latest release
pub async fn latest(project: &Project) -> Result<Lookup, Error> {
    let url = project.latest_release_url()?;
    let token = env::var(TOKEN_ENV).ok().filter(|token| !token.is_empty());

    log::debug!("querying {url} (authenticated: {})", token.is_some());

    let latest = request::json::<Latest>(url, token.as_deref()).await?;

    select(latest, project)
}

/// Filter nightly builds and pick the archive asset
pub fn select(latest: Latest, project: &Project) -> Result<Lookup, Error> {
    let Latest {
        tag_name,
        published_at,
        prerelease,
        assets,
    } = latest;

    let marker = project.nightly_marker();
    if !marker.is_empty() && tag_name.contains(marker) {
        return Ok(Lookup::Skipped {
            tag: tag_name,
            reason: SkipReason::Nightly,
        });
    }
    if prerelease {
        return Ok(Lookup::Skipped {
            tag: tag_name,
            reason: SkipReason::Prerelease,
        });
    }

    let pattern = project.asset();
    let asset = assets
        .into_iter()
        .find(|asset| asset.name.contains(pattern))
        .ok_or_else(|| Error::MissingAsset {
            tag: tag_name.clone(),
            pattern: pattern.to_owned(),
        })?;

    Ok(Lookup::Found(Release {
        version: tag_name,
        published_at,
        asset,
    }))
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid api url")]
    Url(#[from] url::ParseError),
    #[error("query latest release")]
    Request(#[from] request::Error),
    #[error("release {tag} has no asset matching {pattern:?}")]
    MissingAsset { tag: String, pattern: String },
}
