/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
use crate::core::tables::{OVERRIDE_CAPACITY, OverrideTables};
use log::{debug, warn};
use std::fmt;

/// Words of the override record that are ever looked at.
pub const SCAN_LIMIT: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideWarning {
    /// No zero word ended the address segment before the scan limit.
    AddressSegmentUnterminated { scanned: usize },
    /// The value segment would start past the override capacity, nothing was installed.
    CursorGuardTripped { cursor: usize },
}

impl fmt::Display for OverrideWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideWarning::AddressSegmentUnterminated { scanned } => write!(
                f,
                "address segment has no terminator within {} words",
                scanned
            ),
            OverrideWarning::CursorGuardTripped { cursor } => write!(
                f,
                "value segment would start at word {} (capacity {}), overrides dropped",
                cursor, OVERRIDE_CAPACITY
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub addresses: usize,
    pub values: usize,
    pub warnings: Vec<OverrideWarning>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl OverrideTables {
    /// Replaces the override set with the one described by `record`.
    ///
    /// The record is a zero-terminated address list followed by a
    /// zero-terminated value list, both within the first [`SCAN_LIMIT`] words.
    /// Missing words count as zero. Malformed records never fail the load,
    /// they degrade to fewer (or no) overrides and are listed in the report.
    pub fn load(&mut self, record: &[u32]) -> LoadReport {
        self.clear();

        let mut report = LoadReport::default();
        let limit = record.len().min(SCAN_LIMIT);

        let mut cursor = 0;
        let mut terminated = false;
        while cursor < limit {
            let word = record[cursor];
            if word == 0 {
                terminated = true;
                break;
            }
            self.addresses[report.addresses] = word;
            report.addresses += 1;
            cursor += 1;
        }

        if !terminated && report.addresses > 0 {
            report
                .warnings
                .push(OverrideWarning::AddressSegmentUnterminated { scanned: cursor });
        }

        // Step over the terminator. The guard looks at the scan position, not at
        // how many addresses were copied: both tables are sized together.
        cursor += 1;
        if cursor > OVERRIDE_CAPACITY {
            self.clear();
            report.addresses = 0;
            report
                .warnings
                .push(OverrideWarning::CursorGuardTripped { cursor });
            for warning in &report.warnings {
                warn!("Override record malformed: {}", warning);
            }
            return report;
        }

        while cursor < limit {
            let word = record[cursor];
            if word == 0 {
                break;
            }
            self.values[report.values] = word;
            report.values += 1;
            cursor += 1;
        }

        for warning in &report.warnings {
            warn!("Override record malformed: {}", warning);
        }
        debug!(
            "Loaded {} override addresses and {} override values",
            report.addresses, report.values
        );

        report
    }
}
