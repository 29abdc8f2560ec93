/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
use log::info;
use somcfg::core::record::ConfigRecord;
use somcfg::core::tables::{BaselineTables, OverrideTables};
use somcfg::interpreter::bus::SimulatedBus;
use somcfg::interpreter::program::CommandProgram;
use somcfg::loader::BootReport;
use somcfg::storage::{Eeprom, FileEepromBus};
use somcfg::{ConfigurationLoader, EepromConfig, Fault, Identity, InterpreterConfig, TableKind};
use std::error::Error;
use std::path::Path;
use strum::IntoEnumIterator;

type Result<T> = std::result::Result<T, Box<dyn Error>>;

async fn read_image(image: &Path, config: EepromConfig) -> Result<ConfigRecord> {
    let mut eeprom = Eeprom::new(FileEepromBus::new(image, config.chip), config);
    Ok(eeprom.read_record().await?)
}

pub async fn info(image: &Path, raw: bool, config: EepromConfig) -> Result<()> {
    let record = read_image(image, config).await?;
    let identity = &record.identity;

    println!("Part number: {}", identity.part_number());
    println!("Assembly: {}", identity.assembly());
    println!("Date of production: {}", identity.date());
    println!(
        "SOM Configuration: 0x{:x}: {}",
        identity.som_info.raw(),
        identity.som_info
    );

    let mut overrides = OverrideTables::new();
    let report = overrides.load(&record.overrides);
    let rom = BaselineTables::builtin();
    for kind in TableKind::iter() {
        let base = rom.len(kind);
        for (i, word) in overrides.table(kind)[..overrides.active(kind)].iter().enumerate() {
            println!("Override {} [{}] = 0x{:08X}", kind, base + i, word);
        }
    }
    for warning in &report.warnings {
        println!("Warning: {}", warning);
    }

    match CommandProgram::decode(&record.commands, somcfg::config::MAX_COMMANDS) {
        Ok(program) => {
            for step in program.steps() {
                println!("{:03}: {}", step.pc, step.command);
            }
        }
        Err(e) => println!("Command table unusable: {}", e),
    }

    if raw {
        for (i, line) in record.to_bytes().chunks(16).enumerate() {
            println!("{:03X}: {}", i * 16, hex::encode(line));
        }
    }

    Ok(())
}

pub async fn replay(
    image: &Path,
    presets: &[(u32, u32)],
    interpreter: InterpreterConfig,
    config: EepromConfig,
) -> Result<()> {
    let record = read_image(image, config).await?;
    let mut bus = SimulatedBus::new();
    bus.preload(presets.iter().copied());

    let mut loader = ConfigurationLoader::builtin(interpreter);
    let outcome = loader.apply_record(&record, &mut bus).await;

    for (addr, val) in bus.writes() {
        println!("0x{:08X} <- 0x{:08X}", addr, val);
    }

    match outcome {
        Ok(BootReport { overrides, run }) => {
            for warning in &overrides.warnings {
                println!("Warning: {}", warning);
            }
            println!(
                "Done: {} commands, {} writes, {} polls ({} spins), {}us of delays",
                run.commands, run.writes, run.polls, run.spins, run.delayed_us
            );
            Ok(())
        }
        Err(Fault::PollTimeout { pc, addr, spins }) => Err(format!(
            "command {} never saw the expected value at 0x{:08X} ({} reads); try --preset",
            pc, addr, spins
        )
        .into()),
        Err(e) => Err(e.into()),
    }
}

pub async fn identity(image: &Path, identity: Identity, config: EepromConfig) -> Result<()> {
    println!("Part number: {}", identity.part_number());
    println!("Assembly: {}", identity.assembly());
    println!("Date of production: {}", identity.date());
    println!(
        "SOM Configuration: 0x{:x}: {}",
        identity.som_info.raw(),
        identity.som_info
    );

    let mut eeprom = Eeprom::new(FileEepromBus::new(image, config.chip), config);
    eeprom.write_identity(&identity).await?;
    info!("Identity written to {}", image.display());
    Ok(())
}
