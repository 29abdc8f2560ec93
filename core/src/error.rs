/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
use crate::core::tables::TableKind;
use thiserror::Error;

/// Everything that can abort a configuration run.
///
/// A fault always ends the run; nothing after the faulting command executes.
#[derive(Debug, Error)]
pub enum Fault {
    #[error("{kind} index {index} is outside the baseline and override tables (limit {limit})")]
    IndexOutOfRange {
        kind: TableKind,
        index: u8,
        limit: usize,
    },
    #[error("illegal opcode 0x{code:02X} at command {pc}")]
    IllegalOpcode { pc: usize, code: u8 },
    #[error("program ran past {limit} commands without a terminator")]
    ProgramOverrun { limit: usize },
    #[error("poll at command {pc} on 0x{addr:08X} gave up after {spins} reads")]
    PollTimeout { pc: usize, addr: u32, spins: u64 },
    #[error("register bus error: {0}")]
    Bus(std::io::Error),
    #[error("configuration storage error: {0}")]
    Transport(#[from] std::io::Error),
}
