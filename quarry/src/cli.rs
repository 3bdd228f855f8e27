// SPDX-FileCopyrightText: Copyright © 2020-2025 Serpent OS Developers
//
// SPDX-License-Identifier: MPL-2.0
use std::{io, path::PathBuf};

use clap::{Args, CommandFactory, Parser};
use clap_complete::{
    generate_to,
    shells::{Bash, Fish, Zsh},
};
use clap_mangen::Man;
use fs_err::{self as fs, File};
use log::LevelFilter;
use quarry::{env, Env};
use thiserror::Error;

mod check;
mod config;
mod update;
mod version;

#[derive(Debug, Parser)]
#[command(about = "Poll upstream releases and queue refreshed source packages on COPR")]
pub struct Command {
    #[command(flatten)]
    pub global: Global,
    #[command(subcommand)]
    pub subcommand: Option<Subcommand>,
}

#[derive(Debug, Args)]
pub struct Global {
    #[arg(
        short,
        long = "verbose",
        help = "Prints additional information about what quarry is doing",
        default_value = "false",
        global = true
    )]
    pub verbose: bool,
    #[arg(long, global = true, help = "Load configuration from this directory only")]
    pub config_dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "rpmbuild top directory, defaults to $RPM_BUILD_ROOT, /root/rpmbuild or ~/rpmbuild"
    )]
    pub rpmbuild_root: Option<PathBuf>,
    #[arg(long, global = true, hide = true)]
    pub generate_manpages: Option<PathBuf>,
    #[arg(long, global = true, hide = true)]
    pub generate_completions: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    Check(check::Command),
    Update(update::Command),
    Config(config::Command),
    Version(version::Command),
}

pub async fn process() -> Result<(), Error> {
    let Command { global, subcommand } = Command::parse();

    init_logging(global.verbose);

    if let Some(dir) = global.generate_manpages {
        fs::create_dir_all(&dir)?;
        let main_cmd = Command::command();
        let main_man = Man::new(main_cmd.clone());
        let mut buffer = File::create(dir.join("quarry.1"))?;
        main_man.render(&mut buffer)?;

        for sub in main_cmd.get_subcommands() {
            let sub_man = Man::new(sub.clone());
            let name = format!("quarry-{}.1", sub.get_name());
            let mut buffer = File::create(dir.join(&name))?;
            sub_man.render(&mut buffer)?;
        }
        return Ok(());
    }

    if let Some(dir) = global.generate_completions {
        fs::create_dir_all(&dir)?;
        let mut cmd = Command::command();
        generate_to(Bash, &mut cmd, "quarry", &dir)?;
        generate_to(Fish, &mut cmd, "quarry", &dir)?;
        generate_to(Zsh, &mut cmd, "quarry", &dir)?;
        return Ok(());
    }

    // Version needs no build tree
    if let Some(Subcommand::Version(command)) = subcommand {
        version::handle(command);
        return Ok(());
    }

    let env = Env::new(global.config_dir, global.rpmbuild_root).await?;

    if global.verbose {
        version::print();
        println!("{:?}", env.config);
        println!("rpmbuild root: {:?}", env.paths.root());
        println!("spec file: {:?}", env.paths.spec_file());
    }

    match subcommand {
        Some(Subcommand::Check(command)) => check::handle(command, env).await?,
        Some(Subcommand::Update(command)) => update::handle(command, env).await?,
        Some(Subcommand::Config(command)) => config::handle(command, env).await?,
        Some(Subcommand::Version(_)) | None => (),
    }

    Ok(())
}

/// `RUST_LOG` takes precedence, `--verbose` only raises the default
fn init_logging(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let _ = pretty_env_logger::formatted_builder()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("check")]
    Check(#[from] check::Error),
    #[error("update")]
    Update(#[from] update::Error),
    #[error("config")]
    Config(#[from] config::Error),
    #[error("environment")]
    Env(#[from] env::Error),
    #[error("io")]
    Io(#[from] io::Error),
}
