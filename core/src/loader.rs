/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
use crate::config::InterpreterConfig;
use crate::core::overrides::LoadReport;
use crate::core::record::ConfigRecord;
use crate::core::tables::{BaselineTables, OverrideTables};
use crate::error::Fault;
use crate::interpreter::bus::RegisterIO;
use crate::interpreter::program::RawCommand;
use crate::interpreter::{Interpreter, RunSummary};
use crate::storage::{Eeprom, EepromBus};
use log::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootReport {
    pub overrides: LoadReport,
    pub run: RunSummary,
}

/// Drives one configuration pass: install overrides, then run the program.
///
/// The loader owns the override store, so each loader (and each test) gets
/// its own. Overrides are always installed before the program starts.
pub struct ConfigurationLoader<'a> {
    baseline: BaselineTables<'a>,
    overrides: OverrideTables,
    config: InterpreterConfig,
}

impl ConfigurationLoader<'static> {
    pub fn builtin(config: InterpreterConfig) -> Self {
        Self::new(BaselineTables::builtin(), config)
    }
}

impl<'a> ConfigurationLoader<'a> {
    pub fn new(baseline: BaselineTables<'a>, config: InterpreterConfig) -> Self {
        Self {
            baseline,
            overrides: OverrideTables::new(),
            config,
        }
    }

    pub fn baseline(&self) -> &BaselineTables<'a> {
        &self.baseline
    }

    pub fn overrides(&self) -> &OverrideTables {
        &self.overrides
    }

    pub async fn apply(
        &mut self,
        override_words: &[u32],
        program: &[RawCommand],
        bus: &mut dyn RegisterIO,
    ) -> Result<BootReport, Fault> {
        let load = self.overrides.load(override_words);
        if !load.is_clean() {
            warn!(
                "Continuing with {} override addresses and {} override values",
                load.addresses, load.values
            );
        }

        let interpreter = Interpreter::new(self.baseline, &self.overrides, self.config);
        let run = interpreter.run_raw(program, bus).await?;

        Ok(BootReport {
            overrides: load,
            run,
        })
    }

    /// Runs the command table stored in the record itself.
    pub async fn apply_record(
        &mut self,
        record: &ConfigRecord,
        bus: &mut dyn RegisterIO,
    ) -> Result<BootReport, Fault> {
        self.apply(&record.overrides, &record.commands, bus).await
    }

    /// Reads the record from the EEPROM and applies it.
    pub async fn boot<B: EepromBus>(
        &mut self,
        eeprom: &mut Eeprom<B>,
        bus: &mut dyn RegisterIO,
    ) -> Result<BootReport, Fault> {
        let record = eeprom.read_record().await?;
        info!(
            "Part number: {}, Assembly: {}, Date: {}, {}",
            record.identity.part_number(),
            record.identity.assembly(),
            record.identity.date(),
            record.identity.som_info
        );
        self.apply_record(&record, bus).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tables::TableKind;
    use crate::interpreter::bus::SimulatedBus;
    use crate::interpreter::program::Opcode;

    const ADDRS: [u32; 1] = [0x0200_0000];
    const VALS: [u32; 1] = [0xDEAD_BEEF];

    #[tokio::test]
    async fn loads_overrides_before_running() {
        let mut loader =
            ConfigurationLoader::new(BaselineTables::new(&ADDRS, &VALS), InterpreterConfig::new());
        let mut bus = SimulatedBus::new();

        let report = loader
            .apply(
                &[0x3000_0000, 0, 0x1234_5678, 0],
                &[RawCommand::new(1, 1), RawCommand::last()],
                &mut bus,
            )
            .await
            .unwrap();

        assert_eq!(bus.writes(), &[(0x3000_0000, 0x1234_5678)]);
        assert_eq!(report.overrides.addresses, 1);
        assert_eq!(report.run.writes, 1);
    }

    #[tokio::test]
    async fn second_apply_replaces_overrides() {
        let mut loader =
            ConfigurationLoader::new(BaselineTables::new(&ADDRS, &VALS), InterpreterConfig::new());
        let mut bus = SimulatedBus::new();
        let program = [RawCommand::last()];

        loader.apply(&[5, 6, 0, 7], &program, &mut bus).await.unwrap();
        loader.apply(&[0], &program, &mut bus).await.unwrap();

        assert!(loader.overrides().is_empty());
        assert_eq!(loader.overrides().active(TableKind::Address), 0);
    }

    #[tokio::test]
    async fn fault_is_surfaced() {
        let mut loader =
            ConfigurationLoader::new(BaselineTables::new(&ADDRS, &VALS), InterpreterConfig::new());
        let mut bus = SimulatedBus::new();

        let result = loader
            .apply(&[0], &[RawCommand::op(Opcode::Delay10Usec, 1)], &mut bus)
            .await;
        assert!(matches!(result, Err(Fault::ProgramOverrun { limit: 1 })));
    }
}
