/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
use clap::{Parser, Subcommand};
use somcfg::{EepromConfig, InterpreterConfig, PollLimit};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "somcfg")]
#[command(about = "Inspect, program and dry-run SOM configuration EEPROM images")]
#[command(version)]
pub struct Cli {
    /// Verbose logging (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Bus address of the EEPROM's first page
    #[arg(long, global = true, default_value = "0x56", value_parser = parse_u8)]
    pub chip: u8,

    #[command(subcommand)]
    pub command: Action,
}

#[derive(Subcommand, Debug)]
pub enum Action {
    /// Show identity, overrides and the embedded command program
    Info {
        image: PathBuf,
        /// Also hex-dump the raw record
        #[arg(long)]
        raw: bool,
    },
    /// Replay the embedded program against a simulated register file
    Replay {
        image: PathBuf,
        /// Register contents before the run, as ADDR=VALUE (hex)
        #[arg(long = "preset", value_name = "ADDR=VALUE", value_parser = parse_preset)]
        presets: Vec<(u32, u32)>,
        /// Give up on a poll after this many unsatisfied reads
        #[arg(long, default_value_t = 1_000_000)]
        spin_limit: u64,
        /// Give up on a poll after this many milliseconds instead
        #[arg(long, conflicts_with = "spin_limit")]
        timeout_ms: Option<u64>,
        #[arg(long, default_value_t = somcfg::config::MAX_COMMANDS)]
        max_commands: usize,
    },
    /// Program the identity fields of an image
    Identity {
        image: PathBuf,
        part_number: String,
        assembly: String,
        date: String,
        /// SOM info byte in hex: bits 0-1 boot media, bit 2 WiFi, bits 3-4 revision
        #[arg(value_parser = parse_u8)]
        som_info: u8,
    },
}

impl Cli {
    pub fn eeprom_config(&self) -> EepromConfig {
        EepromConfig::new(self.chip)
    }
}

pub fn interpreter_config(spin_limit: u64, timeout_ms: Option<u64>, max_commands: usize) -> InterpreterConfig {
    let poll_limit = match timeout_ms {
        Some(ms) => PollLimit::Timeout(Duration::from_millis(ms)),
        None => PollLimit::Spins(spin_limit),
    };
    InterpreterConfig::new()
        .with_max_commands(max_commands)
        .with_poll_limit(poll_limit)
}

fn parse_hex(text: &str) -> Result<u32, String> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u32::from_str_radix(&digits.replace('_', ""), 16)
        .map_err(|e| format!("'{}' is not a hex number: {}", text, e))
}

fn parse_u8(text: &str) -> Result<u8, String> {
    let val = parse_hex(text)?;
    u8::try_from(val).map_err(|_| format!("'{}' does not fit in a byte", text))
}

fn parse_preset(text: &str) -> Result<(u32, u32), String> {
    let (addr, val) = text
        .split_once('=')
        .ok_or_else(|| format!("'{}' is not ADDR=VALUE", text))?;
    Ok((parse_hex(addr.trim())?, parse_hex(val.trim())?))
}
