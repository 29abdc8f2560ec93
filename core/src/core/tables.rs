/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
use crate::core::baseline::{ROM_ADDRESSES, ROM_VALUES};
use strum_macros::{Display, EnumIter};

pub const OVERRIDE_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum TableKind {
    Address,
    Value,
}

/// The read-only tables compiled into the firmware.
///
/// Indices below each table's length always resolve here. Everything above
/// falls through to [`OverrideTables`].
#[derive(Debug, Clone, Copy)]
pub struct BaselineTables<'a> {
    addresses: &'a [u32],
    values: &'a [u32],
}

impl BaselineTables<'static> {
    pub fn builtin() -> Self {
        Self::new(ROM_ADDRESSES, ROM_VALUES)
    }
}

impl<'a> BaselineTables<'a> {
    pub const fn new(addresses: &'a [u32], values: &'a [u32]) -> Self {
        Self { addresses, values }
    }

    pub fn table(&self, kind: TableKind) -> &'a [u32] {
        match kind {
            TableKind::Address => self.addresses,
            TableKind::Value => self.values,
        }
    }

    pub fn len(&self, kind: TableKind) -> usize {
        self.table(kind).len()
    }
}

/// Per-unit calibration entries loaded at runtime.
///
/// Owned by whoever drives the boot sequence and handed to the resolver by
/// reference, so a fresh set can be built for every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideTables {
    pub(crate) addresses: [u32; OVERRIDE_CAPACITY],
    pub(crate) values: [u32; OVERRIDE_CAPACITY],
}

impl Default for OverrideTables {
    fn default() -> Self {
        Self::new()
    }
}

impl OverrideTables {
    pub fn new() -> Self {
        Self {
            addresses: [0; OVERRIDE_CAPACITY],
            values: [0; OVERRIDE_CAPACITY],
        }
    }

    pub fn table(&self, kind: TableKind) -> &[u32; OVERRIDE_CAPACITY] {
        match kind {
            TableKind::Address => &self.addresses,
            TableKind::Value => &self.values,
        }
    }

    pub fn capacity(&self) -> usize {
        OVERRIDE_CAPACITY
    }

    pub fn clear(&mut self) {
        self.addresses.fill(0);
        self.values.fill(0);
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.iter().chain(self.values.iter()).all(|&w| w == 0)
    }

    /// Number of leading non-zero entries, i.e. how many overrides are in use.
    pub fn active(&self, kind: TableKind) -> usize {
        self.table(kind).iter().take_while(|&&w| w != 0).count()
    }
}
