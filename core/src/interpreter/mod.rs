/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
pub mod bus;
pub mod program;
use crate::config::{InterpreterConfig, PollLimit};
use crate::core::resolver::IndexResolver;
use crate::core::tables::{BaselineTables, OverrideTables};
use crate::error::Fault;
use crate::interpreter::bus::RegisterIO;
use crate::interpreter::program::{Command, CommandProgram, RawCommand};
use log::{debug, error, info, warn};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Commands executed, the terminator included.
    pub commands: usize,
    pub writes: usize,
    pub polls: usize,
    /// Register reads that did not yet satisfy a poll condition.
    pub spins: u64,
    pub delayed_us: u64,
}

/// Replays a command program against a register bus.
pub struct Interpreter<'a> {
    resolver: IndexResolver<'a>,
    config: InterpreterConfig,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        baseline: BaselineTables<'a>,
        overrides: &'a OverrideTables,
        config: InterpreterConfig,
    ) -> Self {
        Self {
            resolver: IndexResolver::new(baseline, overrides),
            config,
        }
    }

    pub fn resolver(&self) -> &IndexResolver<'a> {
        &self.resolver
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Decodes `raw` with the configured command limit, then runs it.
    pub async fn run_raw(
        &self,
        raw: &[RawCommand],
        bus: &mut dyn RegisterIO,
    ) -> Result<RunSummary, Fault> {
        let program = CommandProgram::decode(raw, self.config.max_commands).inspect_err(|e| {
            error!("Command table rejected: {}", e);
        })?;
        self.run(&program, bus).await
    }

    pub async fn run(
        &self,
        program: &CommandProgram,
        bus: &mut dyn RegisterIO,
    ) -> Result<RunSummary, Fault> {
        info!(
            "Running configuration program ({} commands)",
            program.steps().len()
        );

        let mut summary = RunSummary::default();
        for step in program.steps() {
            summary.commands += 1;
            match self.execute(step.pc, &step.command, bus, &mut summary).await {
                Ok(true) => {}
                Ok(false) => {
                    info!(
                        "Configuration program done: {} writes, {} polls, {}us delayed",
                        summary.writes, summary.polls, summary.delayed_us
                    );
                    return Ok(summary);
                }
                Err(e) => {
                    error!("Command {:03} ({}) failed: {}", step.pc, step.command, e);
                    return Err(e);
                }
            }
        }

        Err(Fault::ProgramOverrun {
            limit: self.config.max_commands,
        })
    }

    /// Returns `false` once the program has terminated.
    async fn execute(
        &self,
        pc: usize,
        command: &Command,
        bus: &mut dyn RegisterIO,
        summary: &mut RunSummary,
    ) -> Result<bool, Fault> {
        match *command {
            Command::Write { addr, value } => {
                let address = self.resolver.resolve_address(addr)?;
                let val = self.resolver.resolve_value(value)?;
                if address == 0 {
                    warn!("Command {:03} writes to address 0, override slot empty?", pc);
                }
                debug!("[{:03}] 0x{:08X} <- 0x{:08X}", pc, address, val);
                bus.write32(address, val).await.map_err(Fault::Bus)?;
                summary.writes += 1;
            }
            Command::WaitUntilEqual { addr, value }
            | Command::WaitUntilNotEqual { addr, value }
            | Command::WaitWhileMasked { addr, value }
            | Command::WaitUntilMasked { addr, value } => {
                let address = self.resolver.resolve_address(addr)?;
                let val = self.resolver.resolve_value(value)?;
                debug!("[{:03}] {} (0x{:08X}, 0x{:08X})", pc, command, address, val);
                summary.spins += self.poll(pc, command, address, val, bus).await?;
                summary.polls += 1;
            }
            Command::Delay { units } => {
                let us = units as u32 * 10;
                debug!("[{:03}] delay {}us", pc, us);
                bus.delay_us(us).await;
                summary.delayed_us += us as u64;
            }
            Command::Terminate => {
                debug!("[{:03}] end", pc);
                return Ok(false);
            }
        }

        Ok(true)
    }

    async fn poll(
        &self,
        pc: usize,
        command: &Command,
        addr: u32,
        value: u32,
        bus: &mut dyn RegisterIO,
    ) -> Result<u64, Fault> {
        let started = Instant::now();
        let mut spins = 0u64;

        loop {
            let word = bus.read32(addr).await.map_err(Fault::Bus)?;
            if !command.keeps_waiting(word, value) {
                return Ok(spins);
            }
            spins += 1;

            let expired = match self.config.poll_limit {
                PollLimit::Unbounded => false,
                PollLimit::Spins(max) => spins >= max,
                PollLimit::Timeout(limit) => started.elapsed() >= limit,
            };
            if expired {
                return Err(Fault::PollTimeout { pc, addr, spins });
            }
        }
    }
}
