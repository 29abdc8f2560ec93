/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
pub mod config;
pub mod core;
pub mod error;
pub mod interpreter;
pub mod loader;
pub mod storage;

pub use config::{EepromConfig, InterpreterConfig, PollLimit};
pub use crate::core::record::{ConfigRecord, Identity, SomInfo};
pub use crate::core::tables::{BaselineTables, OverrideTables, TableKind};
pub use error::Fault;
pub use interpreter::{Interpreter, RunSummary};
pub use loader::ConfigurationLoader;
