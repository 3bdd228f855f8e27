// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use std::{
    io,
    path::{Path, PathBuf},
};

use fs_err::tokio as fs;
use futures_util::StreamExt;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tui::{ProgressBar, Styled};

use crate::{release::Asset, request, util};

/// A downloaded release archive
#[derive(Debug, Clone)]
pub struct Fetched {
    pub path: PathBuf,
    pub sha256: String,
    pub size: u64,
}

/// Download `asset` into `dir`, replacing any previous copy
///
/// Bytes land in a `.part` file first so an interrupted
/// transfer never leaves a truncated archive behind.
pub async fn archive(asset: &Asset, dir: &Path) -> Result<Fetched, Error> {
    util::ensure_dir_exists(dir).await.map_err(Error::CreateDir)?;

    let path = dir.join(&asset.name);
    let partial_path = dir.join(format!("{}.part", asset.name));

    let pb = tui::transfer(
        format!("{} {}", "Downloading".blue(), asset.name.as_str().bold()),
        (asset.size > 0).then_some(asset.size),
    );

    let result = download(asset, &partial_path, &pb).await;
    pb.finish_and_clear();

    let (sha256, size) = match result {
        Ok(done) => done,
        Err(error) => {
            let _ = fs::remove_file(&partial_path).await;
            return Err(error);
        }
    };

    if asset.size > 0 && size != asset.size {
        let _ = fs::remove_file(&partial_path).await;
        return Err(Error::SizeMismatch {
            name: asset.name.clone(),
            expected: asset.size,
            got: size,
        });
    }

    fs::rename(&partial_path, &path).await?;

    log::info!("fetched {path:?} ({size} bytes, sha256 {sha256})");

    Ok(Fetched { path, sha256, size })
}

async fn download(asset: &Asset, partial_path: &Path, pb: &ProgressBar) -> Result<(String, u64), Error> {
    let mut stream = request::get(asset.browser_download_url.clone()).await?;

    let mut hasher = Sha256::new();
    let mut out = fs::File::create(partial_path).await?;
    let mut size = 0;

    while let Some(chunk) = stream.next().await {
        let bytes = &chunk?;
        pb.inc(bytes.len() as u64);
        hasher.update(bytes);
        out.write_all(bytes).await?;
        size += bytes.len() as u64;
    }

    out.flush().await?;

    Ok((hex::encode(hasher.finalize()), size))
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("creating sources directory")]
    CreateDir(#[source] io::Error),
    #[error("size mismatch for {name}, expected {expected} bytes got {got}")]
    SizeMismatch { name: String, expected: u64, got: u64 },
    #[error("request")]
    Request(#[from] request::Error),
    #[error("io")]
    Io(#[from] io::Error),
}
