/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
pub mod backend;
pub use backend::{FileEepromBus, MemoryEepromBus};
use crate::config::EepromConfig;
use crate::core::record::{
    ASSEMBLY_OFFSET, ConfigRecord, DATE_OFFSET, Identity, PART_NUMBER_OFFSET, RECORD_SIZE,
    SOM_INFO_OFFSET,
};
use log::{debug, error, info, trace};
use std::fmt::Debug;
use std::io::{Error, ErrorKind, Result};

/// Raw access to the configuration EEPROM.
///
/// The device answers on two consecutive bus addresses, one per 256-byte
/// page, with 8-bit in-page addressing.
#[async_trait::async_trait]
pub trait EepromBus: Send + Debug {
    async fn probe(&mut self, chip: u8) -> Result<()>;
    async fn read(&mut self, chip: u8, addr: u8, buf: &mut [u8]) -> Result<()>;
    async fn write(&mut self, chip: u8, addr: u8, data: &[u8]) -> Result<()>;
}

#[derive(Debug)]
pub struct Eeprom<B: EepromBus> {
    bus: B,
    config: EepromConfig,
}

impl<B: EepromBus> Eeprom<B> {
    pub fn new(bus: B, config: EepromConfig) -> Self {
        Self { bus, config }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn into_inner(self) -> B {
        self.bus
    }

    pub async fn read_record(&mut self) -> Result<ConfigRecord> {
        let chip = self.config.chip;
        if let Err(e) = self.bus.probe(chip).await {
            error!("Couldn't find EEPROM device at 0x{:02X}", chip);
            return Err(Error::new(
                ErrorKind::NotFound,
                format!("No EEPROM at 0x{:02X}: {}", chip, e),
            ));
        }

        let mut buf = vec![0u8; RECORD_SIZE];
        if let Err(e) = self.bus.read(chip, 0, &mut buf).await {
            error!("Reading configuration record failed: {}", e);
            return Err(e);
        }
        trace!("[RX] Record: {}", hex::encode(&buf));

        ConfigRecord::parse(&buf)
    }

    /// Writes `data` at `offset`, one page-bounded chunk at a time.
    ///
    /// Stops at the first failing chunk. Bytes written before it stay written.
    pub async fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        if offset + data.len() > RECORD_SIZE {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "Write of {} bytes at 0x{:03X} runs past the end of the EEPROM",
                    data.len(),
                    offset
                ),
            ));
        }

        let chunk = self.config.write_chunk.max(1);
        let mut written = 0;
        while written < data.len() {
            let at = offset + written;
            let len = (chunk - at % chunk).min(data.len() - written);
            let chip = self.config.chip + (at > 0xFF) as u8;
            let addr = (at & 0xFF) as u8;

            debug!(
                "[TX] chip 0x{:02X} addr 0x{:02X}: {}",
                chip,
                addr,
                hex::encode(&data[written..written + len])
            );
            self.bus.write(chip, addr, &data[written..written + len]).await?;

            // The part ignores us until the page is committed
            tokio::time::sleep(self.config.settle).await;
            written += len;
        }

        Ok(())
    }

    pub async fn write_record(&mut self, record: &ConfigRecord) -> Result<()> {
        self.write(0, &record.to_bytes()).await
    }

    /// Programs the identity fields, leaving calibration data untouched.
    pub async fn write_identity(&mut self, identity: &Identity) -> Result<()> {
        let som_info = [identity.som_info.raw()];
        let fields: [(&str, usize, &[u8]); 4] = [
            ("Part Number", PART_NUMBER_OFFSET, &identity.part_number),
            ("Assembly", ASSEMBLY_OFFSET, &identity.assembly),
            ("date", DATE_OFFSET, &identity.date),
            ("Som Info", SOM_INFO_OFFSET, &som_info),
        ];

        for (name, offset, bytes) in fields {
            if let Err(e) = self.write(offset, bytes).await {
                error!("Error writing {} to EEPROM!", name);
                return Err(Error::new(
                    e.kind(),
                    format!("Error writing {} to EEPROM: {}", name, e),
                ));
            }
        }

        info!("EEPROM updated successfully");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::record::SomInfo;
    use std::time::Duration;

    fn eeprom() -> Eeprom<MemoryEepromBus> {
        let config = EepromConfig::default().with_settle(Duration::ZERO);
        Eeprom::new(MemoryEepromBus::new(config.chip), config)
    }

    #[tokio::test]
    async fn chunks_never_cross_a_page() {
        let mut eeprom = eeprom();
        eeprom.write(0x0A, &[0xAB; 40]).await.unwrap();

        let ops: Vec<(u8, u8, usize)> = eeprom
            .bus()
            .writes()
            .iter()
            .map(|op| (op.chip, op.addr, op.data.len()))
            .collect();
        assert_eq!(ops, vec![(0x56, 0x0A, 6), (0x56, 0x10, 16), (0x56, 0x20, 16), (0x56, 0x30, 2)]);
        assert_eq!(&eeprom.bus().image()[0x0A..0x32], &[0xAB; 40]);
        assert_eq!(eeprom.bus().image()[0x32], 0);
    }

    #[tokio::test]
    async fn upper_half_goes_to_second_chip_address() {
        let mut eeprom = eeprom();
        eeprom.write(0xF8, &[1; 16]).await.unwrap();

        let ops: Vec<(u8, u8)> = eeprom.bus().writes().iter().map(|op| (op.chip, op.addr)).collect();
        assert_eq!(ops, vec![(0x56, 0xF8), (0x57, 0x00)]);
        assert_eq!(&eeprom.bus().image()[0xF8..0x108], &[1; 16]);
    }

    #[tokio::test]
    async fn failing_chunk_stops_the_write() {
        let config = EepromConfig::default().with_settle(Duration::ZERO);
        let mut eeprom_bus = MemoryEepromBus::new(config.chip);
        eeprom_bus.fail_write(1);
        let mut eeprom = Eeprom::new(eeprom_bus, config);

        assert!(eeprom.write(0, &[7; 48]).await.is_err());
        assert_eq!(eeprom.bus().writes().len(), 1);
        assert_eq!(&eeprom.bus().image()[..16], &[7; 16]);
        assert_eq!(eeprom.bus().image()[16], 0);
    }

    #[tokio::test]
    async fn rejects_writes_past_the_end() {
        let mut eeprom = eeprom();
        let err = eeprom.write(RECORD_SIZE - 2, &[0; 4]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(eeprom.bus().writes().is_empty());
    }

    #[tokio::test]
    async fn record_round_trips_through_the_device() {
        let mut eeprom = eeprom();
        let record = ConfigRecord::default()
            .with_identity(Identity::new("VSM-MX6", "AS1512", "2016 Jan 01", 0x0A))
            .with_overrides(&[0x021B_0848, 0, 0x4040_3A3E]);
        eeprom.write_record(&record).await.unwrap();

        assert_eq!(eeprom.read_record().await.unwrap(), record);
    }

    #[tokio::test]
    async fn identity_update_leaves_calibration_alone() {
        let mut eeprom = eeprom();
        let record = ConfigRecord::default().with_overrides(&[0x1111_1111, 0, 0x2222_2222]);
        eeprom.write_record(&record).await.unwrap();

        eeprom
            .write_identity(&Identity::new("VSM-DT6", "AS01", "2015Jun", 0x09))
            .await
            .unwrap();

        let read = eeprom.read_record().await.unwrap();
        assert_eq!(read.identity.part_number(), "VSM-DT6");
        assert_eq!(read.identity.som_info, SomInfo::from_byte(0x09));
        assert_eq!(read.overrides, record.overrides);
    }

    #[tokio::test]
    async fn identity_failure_names_the_field() {
        let config = EepromConfig::default().with_settle(Duration::ZERO);
        let mut eeprom_bus = MemoryEepromBus::new(config.chip);
        // Part number takes one chunk, assembly is the second write.
        eeprom_bus.fail_write(1);
        let mut eeprom = Eeprom::new(eeprom_bus, config);

        let err = eeprom
            .write_identity(&Identity::new("P", "A", "D", 0))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Assembly"), "{err}");
    }

    #[tokio::test]
    async fn missing_device_is_reported() {
        let config = EepromConfig::default().with_settle(Duration::ZERO);
        let mut eeprom_bus = MemoryEepromBus::new(config.chip);
        eeprom_bus.set_present(false);
        let mut eeprom = Eeprom::new(eeprom_bus, config);

        assert_eq!(
            eeprom.read_record().await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
