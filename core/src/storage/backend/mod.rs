/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
pub mod file_backend;
pub mod memory_backend;
pub use file_backend::FileEepromBus;
pub use memory_backend::{MemoryEepromBus, WriteOp};

pub const PAGE_SIZE: usize = 0x100;
