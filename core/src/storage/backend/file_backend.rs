/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
use crate::storage::EepromBus;
use crate::storage::backend::PAGE_SIZE;
use log::info;
use std::io::{Error, ErrorKind, Result, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

/// An EEPROM dump on disk standing in for the device.
#[derive(Debug)]
pub struct FileEepromBus {
    path: PathBuf,
    base_chip: u8,
}

impl FileEepromBus {
    pub fn new(path: impl AsRef<Path>, base_chip: u8) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            base_chip,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn offset(&self, chip: u8, addr: u8) -> Result<u64> {
        match chip.checked_sub(self.base_chip) {
            Some(page @ 0..=1) => Ok((page as usize * PAGE_SIZE + addr as usize) as u64),
            _ => Err(Error::new(
                ErrorKind::NotFound,
                format!("No device answers at 0x{:02X}", chip),
            )),
        }
    }
}

#[async_trait::async_trait]
impl EepromBus for FileEepromBus {
    async fn probe(&mut self, chip: u8) -> Result<()> {
        self.offset(chip, 0)?;
        tokio::fs::metadata(&self.path).await.map(|_| ())
    }

    async fn read(&mut self, chip: u8, addr: u8, buf: &mut [u8]) -> Result<()> {
        let offset = self.offset(chip, addr)?;
        let mut file = OpenOptions::new().read(true).open(&self.path).await?;
        file.seek(SeekFrom::Start(offset)).await?;
        file.read_exact(buf).await?;
        Ok(())
    }

    async fn write(&mut self, chip: u8, addr: u8, data: &[u8]) -> Result<()> {
        let offset = self.offset(chip, addr)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .await?;
        if file.metadata().await?.len() == 0 {
            info!("Creating EEPROM image {}", self.path.display());
        }
        file.seek(SeekFrom::Start(offset)).await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }
}
