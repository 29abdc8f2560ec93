/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
use crate::core::record::RECORD_SIZE;
use crate::storage::EepromBus;
use crate::storage::backend::PAGE_SIZE;
use std::io::{Error, ErrorKind, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOp {
    pub chip: u8,
    pub addr: u8,
    pub data: Vec<u8>,
}

/// An EEPROM held in memory, with every accepted write kept for inspection.
#[derive(Debug)]
pub struct MemoryEepromBus {
    base_chip: u8,
    image: Vec<u8>,
    writes: Vec<WriteOp>,
    attempts: usize,
    fail_at: Option<usize>,
    present: bool,
}

impl MemoryEepromBus {
    pub fn new(base_chip: u8) -> Self {
        Self::with_image(base_chip, vec![0u8; RECORD_SIZE])
    }

    pub fn with_image(base_chip: u8, mut image: Vec<u8>) -> Self {
        image.resize(RECORD_SIZE, 0);
        Self {
            base_chip,
            image,
            writes: Vec::new(),
            attempts: 0,
            fail_at: None,
            present: true,
        }
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }

    pub fn writes(&self) -> &[WriteOp] {
        &self.writes
    }

    /// Makes the `nth` write attempt (counting from zero) fail with no effect.
    pub fn fail_write(&mut self, nth: usize) {
        self.fail_at = Some(nth);
    }

    pub fn set_present(&mut self, present: bool) {
        self.present = present;
    }

    fn offset(&self, chip: u8, addr: u8) -> Result<usize> {
        match chip.checked_sub(self.base_chip) {
            Some(page @ 0..=1) => Ok(page as usize * PAGE_SIZE + addr as usize),
            _ => Err(Error::new(
                ErrorKind::NotFound,
                format!("No device answers at 0x{:02X}", chip),
            )),
        }
    }
}

#[async_trait::async_trait]
impl EepromBus for MemoryEepromBus {
    async fn probe(&mut self, chip: u8) -> Result<()> {
        if !self.present {
            return Err(Error::new(ErrorKind::NotFound, "No ACK"));
        }
        self.offset(chip, 0).map(|_| ())
    }

    async fn read(&mut self, chip: u8, addr: u8, buf: &mut [u8]) -> Result<()> {
        let start = self.offset(chip, addr)?;
        let end = start + buf.len();
        if !self.present || end > self.image.len() {
            return Err(Error::new(ErrorKind::UnexpectedEof, "Read past end of device"));
        }
        buf.copy_from_slice(&self.image[start..end]);
        Ok(())
    }

    async fn write(&mut self, chip: u8, addr: u8, data: &[u8]) -> Result<()> {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.fail_at == Some(attempt) || !self.present {
            return Err(Error::new(ErrorKind::Other, "Write not acknowledged"));
        }

        let start = self.offset(chip, addr)?;
        if addr as usize + data.len() > PAGE_SIZE {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Write would wrap inside the page",
            ));
        }
        self.image[start..start + data.len()].copy_from_slice(data);
        self.writes.push(WriteOp {
            chip,
            addr,
            data: data.to_vec(),
        });
        Ok(())
    }
}
