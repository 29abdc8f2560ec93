/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
use crate::config::MAX_COMMANDS;
use crate::core::overrides::SCAN_LIMIT;
use crate::interpreter::program::RawCommand;
use std::fmt;
use std::io::{Error, ErrorKind};
use strum_macros::Display;

pub const RECORD_SIZE: usize = 0x200;

// Record layout
// 0x000	part_number	[u8; 16]
// 0x010	assembly	[u8; 16]
// 0x020	date	[u8; 12]
// 0x02C	som_info	u8
// 0x02D	reserved	[u8; 3]
// 0x030	override words	[u32; 32] (LE)
// 0x0B0	commands	[(u8, u8); 150]
// 0x1DC	reserved	[u8; 36]
pub const PART_NUMBER_OFFSET: usize = 0x000;
pub const PART_NUMBER_LEN: usize = 16;
pub const ASSEMBLY_OFFSET: usize = 0x010;
pub const ASSEMBLY_LEN: usize = 16;
pub const DATE_OFFSET: usize = 0x020;
pub const DATE_LEN: usize = 12;
pub const SOM_INFO_OFFSET: usize = 0x02C;
pub const OVERRIDES_OFFSET: usize = 0x030;
pub const COMMANDS_OFFSET: usize = OVERRIDES_OFFSET + SCAN_LIMIT * 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BootMedia {
    #[strum(to_string = "SD card only")]
    Sd,
    #[strum(to_string = "NAND")]
    Nand,
    #[strum(to_string = "eMMC")]
    Emmc,
    #[strum(to_string = "Illegal boot media")]
    Illegal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SomRevision {
    #[strum(to_string = "SOM Rev 1")]
    Rev1,
    #[strum(to_string = "SOM Rev 2 (5G)")]
    Rev2,
    #[strum(to_string = "SOM Rev illegal")]
    Illegal,
}

/// The packed SOM configuration byte.
///
/// bits 0-1: boot media, bit 2: WiFi fitted, bits 3-4: SOM revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SomInfo(u8);

impl SomInfo {
    pub fn from_byte(raw: u8) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u8 {
        self.0
    }

    pub fn boot_media(&self) -> BootMedia {
        match self.0 & 0x3 {
            0 => BootMedia::Sd,
            1 => BootMedia::Nand,
            2 => BootMedia::Emmc,
            _ => BootMedia::Illegal,
        }
    }

    pub fn wifi(&self) -> bool {
        self.0 & 0x4 != 0
    }

    pub fn revision(&self) -> SomRevision {
        match (self.0 >> 3) & 0x3 {
            0 => SomRevision::Rev1,
            1 => SomRevision::Rev2,
            _ => SomRevision::Illegal,
        }
    }
}

impl fmt::Display for SomInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.boot_media())?;
        if self.wifi() {
            write!(f, ", WiFi")?;
        }
        write!(f, ", {}", self.revision())
    }
}

/// Board identity fields, stored as NUL-terminated fixed-width text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub part_number: [u8; PART_NUMBER_LEN],
    pub assembly: [u8; ASSEMBLY_LEN],
    pub date: [u8; DATE_LEN],
    pub som_info: SomInfo,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            part_number: [0; PART_NUMBER_LEN],
            assembly: [0; ASSEMBLY_LEN],
            date: [0; DATE_LEN],
            som_info: SomInfo::default(),
        }
    }
}

impl Identity {
    /// Text longer than a field is truncated, the last byte is always NUL.
    pub fn new(part_number: &str, assembly: &str, date: &str, som_info: u8) -> Self {
        Self {
            part_number: fixed_text(part_number),
            assembly: fixed_text(assembly),
            date: fixed_text(date),
            som_info: SomInfo::from_byte(som_info),
        }
    }

    pub fn part_number(&self) -> String {
        field_text(&self.part_number)
    }

    pub fn assembly(&self) -> String {
        field_text(&self.assembly)
    }

    pub fn date(&self) -> String {
        field_text(&self.date)
    }
}

fn fixed_text<const N: usize>(text: &str) -> [u8; N] {
    let mut field = [0u8; N];
    let len = text.len().min(N - 1);
    field[..len].copy_from_slice(&text.as_bytes()[..len]);
    field
}

fn field_text(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).to_string()
}

/// The persisted per-unit configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigRecord {
    pub identity: Identity,
    pub overrides: [u32; SCAN_LIMIT],
    pub commands: [RawCommand; MAX_COMMANDS],
}

impl Default for ConfigRecord {
    fn default() -> Self {
        Self {
            identity: Identity::default(),
            overrides: [0; SCAN_LIMIT],
            commands: [RawCommand::default(); MAX_COMMANDS],
        }
    }
}

impl ConfigRecord {
    pub fn parse(data: &[u8]) -> Result<ConfigRecord, Error> {
        if data.len() < RECORD_SIZE {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!(
                    "Configuration record too short: {} bytes, expected {}",
                    data.len(),
                    RECORD_SIZE
                ),
            ));
        }

        let mut identity = Identity::default();
        identity
            .part_number
            .copy_from_slice(&data[PART_NUMBER_OFFSET..PART_NUMBER_OFFSET + PART_NUMBER_LEN]);
        identity
            .assembly
            .copy_from_slice(&data[ASSEMBLY_OFFSET..ASSEMBLY_OFFSET + ASSEMBLY_LEN]);
        identity
            .date
            .copy_from_slice(&data[DATE_OFFSET..DATE_OFFSET + DATE_LEN]);
        identity.som_info = SomInfo::from_byte(data[SOM_INFO_OFFSET]);

        let mut overrides = [0u32; SCAN_LIMIT];
        for (word, bytes) in overrides
            .iter_mut()
            .zip(data[OVERRIDES_OFFSET..COMMANDS_OFFSET].chunks_exact(4))
        {
            *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }

        let mut commands = [RawCommand::default(); MAX_COMMANDS];
        for (cmd, bytes) in commands
            .iter_mut()
            .zip(data[COMMANDS_OFFSET..COMMANDS_OFFSET + MAX_COMMANDS * 2].chunks_exact(2))
        {
            *cmd = RawCommand::new(bytes[0], bytes[1]);
        }

        Ok(ConfigRecord {
            identity,
            overrides,
            commands,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = vec![0u8; RECORD_SIZE];

        data[PART_NUMBER_OFFSET..PART_NUMBER_OFFSET + PART_NUMBER_LEN]
            .copy_from_slice(&self.identity.part_number);
        data[ASSEMBLY_OFFSET..ASSEMBLY_OFFSET + ASSEMBLY_LEN]
            .copy_from_slice(&self.identity.assembly);
        data[DATE_OFFSET..DATE_OFFSET + DATE_LEN].copy_from_slice(&self.identity.date);
        data[SOM_INFO_OFFSET] = self.identity.som_info.raw();

        for (i, word) in self.overrides.iter().enumerate() {
            let at = OVERRIDES_OFFSET + i * 4;
            data[at..at + 4].copy_from_slice(&word.to_le_bytes());
        }

        for (i, cmd) in self.commands.iter().enumerate() {
            let at = COMMANDS_OFFSET + i * 2;
            data[at] = cmd.address_index;
            data[at + 1] = cmd.value_index;
        }

        data
    }

    /// Copies `words` into the override area, zero-filling the rest.
    pub fn with_overrides(mut self, words: &[u32]) -> Self {
        self.overrides = [0; SCAN_LIMIT];
        let len = words.len().min(SCAN_LIMIT);
        self.overrides[..len].copy_from_slice(&words[..len]);
        self
    }

    /// Copies `program` into the command table, zero-filling the rest.
    pub fn with_program(mut self, program: &[RawCommand]) -> Self {
        self.commands = [RawCommand::default(); MAX_COMMANDS];
        let len = program.len().min(MAX_COMMANDS);
        self.commands[..len].copy_from_slice(&program[..len]);
        self
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }
}
