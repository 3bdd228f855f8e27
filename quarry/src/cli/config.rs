// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0

use clap::Parser;
use quarry::{Env, Project};
use thiserror::Error;
use tui::Styled;

#[derive(Debug, Parser)]
#[command(about = "Inspect or seed project configuration")]
pub struct Command {
    #[command(subcommand)]
    subcommand: Subcommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    #[command(about = "Print the effective configuration and where it was loaded from")]
    Show,
    #[command(about = "Write the default configuration as an editable drop-in")]
    Init {
        #[arg(long, default_value = "00-defaults", help = "Name of the drop-in file")]
        name: String,
    },
}

pub async fn handle(command: Command, env: Env) -> Result<(), Error> {
    match command.subcommand {
        Subcommand::Show => show(env).await,
        Subcommand::Init { name } => init(env, name).await,
    }
}

async fn show(env: Env) -> Result<(), Error> {
    let sources = env.config.sources::<Project>().await;

    if sources.is_empty() {
        println!("{}", "# no configuration files found, using defaults".dim());
    }
    for path in sources {
        println!("{}", format!("# {}", path.display()).dim());
    }

    let effective = ::config::Config::merge(Project::defaults(), env.project);
    print!("{}", serde_yaml::to_string(&effective)?);

    Ok(())
}

async fn init(env: Env, name: String) -> Result<(), Error> {
    let path = env.config.save(name, &Project::defaults()).await?;

    println!("{} {}", "Wrote".green(), path.display());

    Ok(())
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("save config")]
    Save(#[from] ::config::SaveError),
    #[error("serialize config")]
    Yaml(#[from] serde_yaml::Error),
}
