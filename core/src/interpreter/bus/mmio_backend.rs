/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
use crate::interpreter::bus::RegisterIO;
use std::io::{Error, ErrorKind, Result};
use std::time::Duration;

/// Volatile loads and stores straight to physical addresses.
#[derive(Debug)]
pub struct MmioBus {
    _owned: (),
}

impl MmioBus {
    /// # Safety
    ///
    /// Every address a program can resolve to must be a mapped register, and
    /// the caller must own the register space exclusively until the bus is
    /// dropped. Nothing else may touch those registers during a run.
    pub unsafe fn new() -> Self {
        Self { _owned: () }
    }

    fn check(addr: u32) -> Result<usize> {
        if addr == 0 || addr % 4 != 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Refusing register access at 0x{:08X}", addr),
            ));
        }
        Ok(addr as usize)
    }
}

#[async_trait::async_trait(?Send)]
impl RegisterIO for MmioBus {
    async fn read32(&mut self, addr: u32) -> Result<u32> {
        let ptr = Self::check(addr)? as *const u32;
        // SAFETY: aligned, non-null, and mapped per the contract of `MmioBus::new`.
        Ok(unsafe { ptr.read_volatile() })
    }

    async fn write32(&mut self, addr: u32, val: u32) -> Result<()> {
        let ptr = Self::check(addr)? as *mut u32;
        // SAFETY: aligned, non-null, and mapped per the contract of `MmioBus::new`.
        unsafe { ptr.write_volatile(val) };
        Ok(())
    }

    async fn delay_us(&mut self, us: u32) {
        tokio::time::sleep(Duration::from_micros(us as u64)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_null_and_unaligned_addresses() {
        let mut bus = unsafe { MmioBus::new() };
        assert_eq!(
            bus.read32(0).await.unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            bus.write32(0x0200_0002, 1).await.unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[tokio::test]
    async fn reads_and_writes_real_memory() {
        // A heap word stands in for a register; only valid where pointers fit in 32 bits.
        let cell = Box::new(0u32);
        let ptr = Box::into_raw(cell);
        if let Ok(addr) = u32::try_from(ptr as usize) {
            let mut bus = unsafe { MmioBus::new() };
            bus.write32(addr, 0xDEAD_BEEF).await.unwrap();
            assert_eq!(bus.read32(addr).await.unwrap(), 0xDEAD_BEEF);
        }
        drop(unsafe { Box::from_raw(ptr) });
    }
}
