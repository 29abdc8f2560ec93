/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
use std::time::Duration;

/// Maximum number of command slots in a program (and in the record's table).
pub const MAX_COMMANDS: usize = 150;

pub const EEPROM_CHIP: u8 = 0x56;
pub const EEPROM_WRITE_CHUNK: usize = 16;
// The part does not ACK while it commits a page.
pub const EEPROM_SETTLE: Duration = Duration::from_millis(11);

/// How long a polling opcode may spin before the run is faulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollLimit {
    /// Spin until the hardware satisfies the condition, however long it takes.
    #[default]
    Unbounded,
    /// Give up after this many register reads that did not satisfy the condition.
    Spins(u64),
    /// Give up once this much wall-clock time has passed.
    Timeout(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    pub max_commands: usize,
    pub poll_limit: PollLimit,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_commands: MAX_COMMANDS,
            poll_limit: PollLimit::Unbounded,
        }
    }
}

impl InterpreterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_commands(mut self, max_commands: usize) -> Self {
        self.max_commands = max_commands;
        self
    }

    pub fn with_poll_limit(mut self, poll_limit: PollLimit) -> Self {
        self.poll_limit = poll_limit;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EepromConfig {
    /// Bus address of the first 256-byte page. The second page answers at `chip + 1`.
    pub chip: u8,
    pub write_chunk: usize,
    pub settle: Duration,
}

impl Default for EepromConfig {
    fn default() -> Self {
        Self {
            chip: EEPROM_CHIP,
            write_chunk: EEPROM_WRITE_CHUNK,
            settle: EEPROM_SETTLE,
        }
    }
}

impl EepromConfig {
    pub fn new(chip: u8) -> Self {
        Self {
            chip,
            ..Self::default()
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }
}
