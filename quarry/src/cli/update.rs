// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use clap::Parser;
use quarry::{
    copr,
    pipeline::{self, Options, Outcome},
    Env,
};
use thiserror::Error;
use tui::Styled;

#[derive(Debug, Parser)]
#[command(about = "Download a new release, refresh the spec, build the SRPM and submit it to COPR")]
pub struct Command {
    #[arg(long, default_value = "false", help = "Rebuild even if the spec is already at the latest version")]
    force: bool,
    #[arg(long, default_value = "false", help = "Stop after building the SRPM")]
    no_submit: bool,
    #[arg(long, default_value = "false", help = "Don't wait for the COPR build to finish")]
    nowait: bool,
}

pub async fn handle(command: Command, env: Env) -> Result<(), Error> {
    let Command {
        force,
        no_submit,
        nowait,
    } = command;

    println!("Checking for new {} releases...", env.project.repository().bold());

    let outcome = pipeline::run(
        &env,
        Options {
            force,
            no_submit,
            nowait,
        },
    )
    .await?;

    match outcome {
        Outcome::Skipped { tag, reason } => {
            println!("{} {reason} build version: {tag}", "Skipping".yellow());
        }
        Outcome::UpToDate { version } => {
            println!("Already at the latest version: {}", version.bold());
        }
        Outcome::Built { version, srpm } => {
            println!("{} {version}: {}", "Built".green(), srpm.display());
        }
        Outcome::Submitted {
            version,
            srpm,
            build_id,
        } => {
            println!("{} {version}: {}", "Submitted".green(), srpm.display());
            if let Some(id) = build_id {
                println!("Build ID: {}", id.to_string().bold());
                println!(
                    "Build status URL: {}",
                    copr::status_url(env.project.copr_frontend(), id)
                );
            }
        }
    }

    println!("Done!");

    Ok(())
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("pipeline")]
    Pipeline(#[from] pipeline::Error),
}
