/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
use crate::error::Fault;
use std::fmt;

/// Lowest address index that is reserved for opcodes.
pub const FIRST_RESERVED_CODE: u8 = 0xF1;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    // Polling opcodes take their (address, value) pair from the next slot
    WhileNotEqual = 0xF1,
    WhileEqual = 0xF2,
    WhileAnd = 0xF3,
    WhileNotAnd = 0xF4,

    Delay10Usec = 0xF5,
    LastCommand = 0xFF,
}

impl Opcode {
    pub fn from_code(code: u8) -> Option<Opcode> {
        match code {
            0xF1 => Some(Opcode::WhileNotEqual),
            0xF2 => Some(Opcode::WhileEqual),
            0xF3 => Some(Opcode::WhileAnd),
            0xF4 => Some(Opcode::WhileNotAnd),
            0xF5 => Some(Opcode::Delay10Usec),
            0xFF => Some(Opcode::LastCommand),
            _ => None,
        }
    }
}

/// One two-byte slot of the command table as it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawCommand {
    pub address_index: u8,
    pub value_index: u8,
}

impl RawCommand {
    pub const fn new(address_index: u8, value_index: u8) -> Self {
        Self {
            address_index,
            value_index,
        }
    }

    pub const fn op(opcode: Opcode, value_index: u8) -> Self {
        Self::new(opcode as u8, value_index)
    }

    pub const fn last() -> Self {
        Self::op(Opcode::LastCommand, 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Write { addr: u8, value: u8 },
    WaitUntilEqual { addr: u8, value: u8 },
    WaitUntilNotEqual { addr: u8, value: u8 },
    /// Spin while `word & value` has any bit set.
    WaitWhileMasked { addr: u8, value: u8 },
    /// Spin until `word & value` has any bit set.
    WaitUntilMasked { addr: u8, value: u8 },
    /// Sleep `units * 10` microseconds.
    Delay { units: u8 },
    Terminate,
}

impl Command {
    /// Number of table slots the command occupies.
    pub fn width(&self) -> usize {
        match self {
            Command::WaitUntilEqual { .. }
            | Command::WaitUntilNotEqual { .. }
            | Command::WaitWhileMasked { .. }
            | Command::WaitUntilMasked { .. } => 2,
            _ => 1,
        }
    }

    /// True while the polled `word` has not yet reached the wanted state.
    pub fn keeps_waiting(&self, word: u32, value: u32) -> bool {
        match self {
            Command::WaitUntilEqual { .. } => word != value,
            Command::WaitUntilNotEqual { .. } => word == value,
            Command::WaitWhileMasked { .. } => word & value != 0,
            Command::WaitUntilMasked { .. } => word & value == 0,
            _ => false,
        }
    }

    pub fn encode(&self, out: &mut Vec<RawCommand>) {
        let (opcode, addr, value) = match *self {
            Command::Write { addr, value } => {
                out.push(RawCommand::new(addr, value));
                return;
            }
            Command::Delay { units } => {
                out.push(RawCommand::op(Opcode::Delay10Usec, units));
                return;
            }
            Command::Terminate => {
                out.push(RawCommand::last());
                return;
            }
            Command::WaitUntilEqual { addr, value } => (Opcode::WhileNotEqual, addr, value),
            Command::WaitUntilNotEqual { addr, value } => (Opcode::WhileEqual, addr, value),
            Command::WaitWhileMasked { addr, value } => (Opcode::WhileAnd, addr, value),
            Command::WaitUntilMasked { addr, value } => (Opcode::WhileNotAnd, addr, value),
        };
        out.push(RawCommand::op(opcode, 0));
        out.push(RawCommand::new(addr, value));
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Write { addr, value } => write!(f, "write  a[{}] <- v[{}]", addr, value),
            Command::WaitUntilEqual { addr, value } => {
                write!(f, "wait   a[{}] == v[{}]", addr, value)
            }
            Command::WaitUntilNotEqual { addr, value } => {
                write!(f, "wait   a[{}] != v[{}]", addr, value)
            }
            Command::WaitWhileMasked { addr, value } => {
                write!(f, "wait   a[{}] & v[{}] == 0", addr, value)
            }
            Command::WaitUntilMasked { addr, value } => {
                write!(f, "wait   a[{}] & v[{}] != 0", addr, value)
            }
            Command::Delay { units } => write!(f, "delay  {}us", *units as u32 * 10),
            Command::Terminate => write!(f, "end"),
        }
    }
}

/// A decoded command and the table slot it started at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub pc: usize,
    pub command: Command,
}

/// A command table decoded up to and including its terminator.
///
/// Slots after the terminator are never looked at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandProgram {
    steps: Vec<Step>,
}

impl CommandProgram {
    pub fn decode(raw: &[RawCommand], max_commands: usize) -> Result<CommandProgram, Fault> {
        let limit = raw.len().min(max_commands);
        let mut steps = Vec::new();
        let mut pc = 0;

        while pc < limit {
            let slot = raw[pc];
            let command = match Opcode::from_code(slot.address_index) {
                Some(Opcode::LastCommand) => {
                    steps.push(Step {
                        pc,
                        command: Command::Terminate,
                    });
                    return Ok(CommandProgram { steps });
                }
                Some(Opcode::Delay10Usec) => Command::Delay {
                    units: slot.value_index,
                },
                Some(opcode) => {
                    if pc + 1 >= limit {
                        return Err(Fault::ProgramOverrun { limit });
                    }
                    let operand = raw[pc + 1];
                    let (addr, value) = (operand.address_index, operand.value_index);
                    match opcode {
                        Opcode::WhileNotEqual => Command::WaitUntilEqual { addr, value },
                        Opcode::WhileEqual => Command::WaitUntilNotEqual { addr, value },
                        Opcode::WhileAnd => Command::WaitWhileMasked { addr, value },
                        _ => Command::WaitUntilMasked { addr, value },
                    }
                }
                None if slot.address_index >= FIRST_RESERVED_CODE => {
                    return Err(Fault::IllegalOpcode {
                        pc,
                        code: slot.address_index,
                    });
                }
                None => Command::Write {
                    addr: slot.address_index,
                    value: slot.value_index,
                },
            };

            steps.push(Step { pc, command });
            pc += command.width();
        }

        Err(Fault::ProgramOverrun { limit })
    }

    pub fn from_commands(commands: &[Command], max_commands: usize) -> Result<CommandProgram, Fault> {
        let mut raw = Vec::new();
        for command in commands {
            command.encode(&mut raw);
        }
        Self::decode(&raw, max_commands)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn to_raw(&self) -> Vec<RawCommand> {
        let mut raw = Vec::new();
        for step in &self.steps {
            step.command.encode(&mut raw);
        }
        raw
    }
}
