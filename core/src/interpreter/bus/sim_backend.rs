/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
use crate::interpreter::bus::RegisterIO;
use log::trace;
use std::collections::{HashMap, VecDeque};
use std::io::Result;

/// A sparse register file for dry runs and tests.
///
/// Unwritten registers read as zero. Scripted reads model hardware that
/// changes on its own: each read of a scripted address pops the next value,
/// and once the script runs dry the stored value is returned.
#[derive(Debug, Default)]
pub struct SimulatedBus {
    registers: HashMap<u32, u32>,
    scripted: HashMap<u32, VecDeque<u32>>,
    reads: HashMap<u32, u64>,
    writes: Vec<(u32, u32)>,
    delays: Vec<u32>,
}

impl SimulatedBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preload(&mut self, pairs: impl IntoIterator<Item = (u32, u32)>) {
        for (addr, val) in pairs {
            self.registers.insert(addr, val);
        }
    }

    pub fn script(&mut self, addr: u32, values: impl IntoIterator<Item = u32>) {
        self.scripted.entry(addr).or_default().extend(values);
    }

    pub fn peek(&self, addr: u32) -> u32 {
        self.registers.get(&addr).copied().unwrap_or(0)
    }

    pub fn reads_of(&self, addr: u32) -> u64 {
        self.reads.get(&addr).copied().unwrap_or(0)
    }

    /// Every write in program order.
    pub fn writes(&self) -> &[(u32, u32)] {
        &self.writes
    }

    pub fn delays(&self) -> &[u32] {
        &self.delays
    }
}

#[async_trait::async_trait(?Send)]
impl RegisterIO for SimulatedBus {
    async fn read32(&mut self, addr: u32) -> Result<u32> {
        *self.reads.entry(addr).or_default() += 1;
        let val = match self.scripted.get_mut(&addr).and_then(|q| q.pop_front()) {
            Some(val) => val,
            None => self.peek(addr),
        };
        trace!("[SIM] read32 0x{:08X} -> 0x{:08X}", addr, val);
        Ok(val)
    }

    async fn write32(&mut self, addr: u32, val: u32) -> Result<()> {
        trace!("[SIM] write32 0x{:08X} <- 0x{:08X}", addr, val);
        self.registers.insert(addr, val);
        self.writes.push((addr, val));
        Ok(())
    }

    async fn delay_us(&mut self, us: u32) {
        self.delays.push(us);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_reads_drain_then_fall_back() {
        let mut bus = SimulatedBus::new();
        bus.preload([(0x10, 7)]);
        bus.script(0x10, [1, 2]);

        assert_eq!(bus.read32(0x10).await.unwrap(), 1);
        assert_eq!(bus.read32(0x10).await.unwrap(), 2);
        assert_eq!(bus.read32(0x10).await.unwrap(), 7);
        assert_eq!(bus.reads_of(0x10), 3);
        assert_eq!(bus.read32(0x20).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn writes_are_traced_in_order() {
        let mut bus = SimulatedBus::new();
        bus.write32(0x4, 1).await.unwrap();
        bus.write32(0x8, 2).await.unwrap();
        bus.write32(0x4, 3).await.unwrap();

        assert_eq!(bus.writes(), &[(0x4, 1), (0x8, 2), (0x4, 3)]);
        assert_eq!(bus.peek(0x4), 3);
    }
}
