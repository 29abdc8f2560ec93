/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
pub mod mmio_backend;
pub mod sim_backend;
pub use mmio_backend::MmioBus;
pub use sim_backend::SimulatedBus;
use std::io::Result;

/// Access to the 32-bit register space a configuration program drives.
#[async_trait::async_trait(?Send)]
pub trait RegisterIO {
    async fn read32(&mut self, addr: u32) -> Result<u32>;
    async fn write32(&mut self, addr: u32, val: u32) -> Result<()>;
    async fn delay_us(&mut self, us: u32);
}
