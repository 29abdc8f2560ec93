use somcfg::config::MAX_COMMANDS;
use somcfg::core::overrides::OverrideWarning;
use somcfg::interpreter::bus::SimulatedBus;
use somcfg::interpreter::program::{Command, CommandProgram, Opcode, RawCommand};
use somcfg::storage::{Eeprom, MemoryEepromBus};
use somcfg::{
    BaselineTables, ConfigRecord, ConfigurationLoader, EepromConfig, Fault, Identity,
    InterpreterConfig, PollLimit, TableKind,
};
use std::time::Duration;

const ADDRS: [u32; 1] = [0x0200_0000];
const VALS: [u32; 1] = [0xDEAD_BEEF];

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn eeprom_with(record: &ConfigRecord) -> Eeprom<MemoryEepromBus> {
    let config = EepromConfig::default().with_settle(Duration::ZERO);
    Eeprom::new(
        MemoryEepromBus::with_image(config.chip, record.to_bytes()),
        config,
    )
}

#[tokio::test]
async fn blank_overrides_single_write() {
    init_logs();
    let record = ConfigRecord::default()
        .with_program(&[RawCommand::new(0, 0), RawCommand::new(Opcode::LastCommand as u8, 0)]);
    let mut eeprom = eeprom_with(&record);
    let mut loader =
        ConfigurationLoader::new(BaselineTables::new(&ADDRS, &VALS), InterpreterConfig::new());
    let mut bus = SimulatedBus::new();

    let report = loader.boot(&mut eeprom, &mut bus).await.unwrap();

    assert_eq!(bus.writes(), &[(0x0200_0000, 0xDEAD_BEEF)]);
    assert!(report.overrides.is_clean());
    assert_eq!(report.run.commands, 2);
}

#[tokio::test]
async fn calibrated_unit_writes_through_override_slots() {
    init_logs();
    // One extra register and two tuned values, the second overriding a read-back target.
    let program = CommandProgram::from_commands(
        &[
            Command::Write { addr: 1, value: 1 },
            Command::Delay { units: 5 },
            Command::WaitUntilEqual { addr: 1, value: 2 },
            Command::Terminate,
        ],
        MAX_COMMANDS,
    )
    .unwrap();
    let record = ConfigRecord::default()
        .with_identity(Identity::new("VSM-DT6", "AS01", "2015Jun", 0x0D))
        .with_overrides(&[0x021B_0848, 0, 0x4040_3A3E, 0x4040_3A3E])
        .with_program(&program.to_raw());
    let mut eeprom = eeprom_with(&record);
    let mut loader =
        ConfigurationLoader::new(BaselineTables::new(&ADDRS, &VALS), InterpreterConfig::new());
    let mut bus = SimulatedBus::new();

    let report = loader.boot(&mut eeprom, &mut bus).await.unwrap();

    assert_eq!(bus.writes(), &[(0x021B_0848, 0x4040_3A3E)]);
    assert_eq!(bus.delays(), &[50]);
    assert_eq!(report.run.spins, 0);
    assert_eq!(report.overrides.values, 2);
    assert_eq!(loader.overrides().table(TableKind::Address)[0], 0x021B_0848);
    assert_eq!(loader.overrides().table(TableKind::Value)[..3], [0x4040_3A3E, 0x4040_3A3E, 0]);
}

#[tokio::test]
async fn hung_poll_becomes_a_fault() {
    init_logs();
    let raw = [
        RawCommand::op(Opcode::WhileNotAnd, 0),
        RawCommand::new(0, 0),
        RawCommand::last(),
    ];
    let config = InterpreterConfig::new().with_poll_limit(PollLimit::Spins(100));
    let mut loader = ConfigurationLoader::new(BaselineTables::new(&ADDRS, &VALS), config);
    let mut bus = SimulatedBus::new();

    let err = loader.apply(&[0], &raw, &mut bus).await.unwrap_err();
    assert!(matches!(err, Fault::PollTimeout { pc: 0, addr: 0x0200_0000, spins: 100 }));
    assert_eq!(bus.reads_of(0x0200_0000), 100);
}

#[tokio::test]
async fn guard_trip_runs_without_overrides() {
    init_logs();
    let words: Vec<u32> = (1..=32).collect();
    let mut loader =
        ConfigurationLoader::new(BaselineTables::new(&ADDRS, &VALS), InterpreterConfig::new());
    let mut bus = SimulatedBus::new();

    let report = loader
        .apply(&words, &[RawCommand::new(1, 0), RawCommand::last()], &mut bus)
        .await
        .unwrap();

    assert!(report
        .overrides
        .warnings
        .contains(&OverrideWarning::CursorGuardTripped { cursor: 33 }));
    // Override slot 0 is empty, so the write goes to address 0.
    assert_eq!(bus.writes(), &[(0, 0xDEAD_BEEF)]);
}

#[tokio::test]
async fn missing_eeprom_is_a_transport_fault() {
    init_logs();
    let config = EepromConfig::default().with_settle(Duration::ZERO);
    let mut eeprom_bus = MemoryEepromBus::new(config.chip);
    eeprom_bus.set_present(false);
    let mut eeprom = Eeprom::new(eeprom_bus, config);
    let mut loader = ConfigurationLoader::builtin(InterpreterConfig::new());
    let mut bus = SimulatedBus::new();

    let err = loader.boot(&mut eeprom, &mut bus).await.unwrap_err();
    assert!(matches!(err, Fault::Transport(_)));
    assert!(bus.writes().is_empty());
}

#[tokio::test]
async fn builtin_tables_drive_a_blank_record() {
    init_logs();
    let rom = BaselineTables::builtin();
    let last_addr = (rom.len(TableKind::Address) - 1) as u8;
    let record = ConfigRecord::default().with_program(&[
        RawCommand::new(0, 0),
        RawCommand::new(last_addr, 1),
        RawCommand::last(),
    ]);
    let mut eeprom = eeprom_with(&record);
    let mut loader = ConfigurationLoader::builtin(InterpreterConfig::new());
    let mut bus = SimulatedBus::new();

    loader.boot(&mut eeprom, &mut bus).await.unwrap();

    let addrs = rom.table(TableKind::Address);
    let vals = rom.table(TableKind::Value);
    assert_eq!(
        bus.writes(),
        &[(addrs[0], vals[0]), (addrs[last_addr as usize], vals[1])]
    );
}
