/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
mod cli;
mod commands;
use clap::Parser;
use cli::{Action, Cli, interpreter_config};
use env_logger::Builder;
use log::LevelFilter;
use somcfg::Identity;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    let eeprom = cli.eeprom_config();
    match cli.command {
        Action::Info { image, raw } => commands::info(&image, raw, eeprom).await,
        Action::Replay {
            image,
            presets,
            spin_limit,
            timeout_ms,
            max_commands,
        } => {
            let config = interpreter_config(spin_limit, timeout_ms, max_commands);
            commands::replay(&image, &presets, config, eeprom).await
        }
        Action::Identity {
            image,
            part_number,
            assembly,
            date,
            som_info,
        } => {
            let identity = Identity::new(&part_number, &assembly, &date, som_info);
            commands::identity(&image, identity, eeprom).await
        }
    }
}
