// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use clap::Parser;
use quarry::{
    pipeline::{self, Status},
    Env,
};
use thiserror::Error;
use tui::Styled;

#[derive(Debug, Parser)]
#[command(about = "Report whether upstream has a newer release, without changing anything")]
pub struct Command {}

pub async fn handle(_command: Command, env: Env) -> Result<(), Error> {
    println!("Checking for new {} releases...", env.project.repository().bold());

    match pipeline::check(&env).await? {
        Status::Skipped { tag, reason } => {
            println!("{} {reason} build version: {tag}", "Skipping".yellow());
        }
        Status::UpToDate { release } => {
            println!("Already at the latest version: {}", release.version.as_str().bold());
        }
        Status::Outdated { current, release } => {
            println!(
                "{} {} {} {}",
                "New version available:".green(),
                current.as_str().dim(),
                "→".dim(),
                release.version.as_str().bold()
            );
            if let Some(published) = &release.published_at {
                println!("  published {published}");
            }
            println!("  {}", release.asset.browser_download_url);
        }
    }

    Ok(())
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("pipeline")]
    Pipeline(#[from] pipeline::Error),
}
