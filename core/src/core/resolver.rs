/*
    SPDX-License-Identifier: AGPL-3.0-or-later
    SPDX-FileCopyrightText: 2025 Shomy
*/
use crate::core::tables::{BaselineTables, OverrideTables, TableKind};
use crate::error::Fault;

/// Maps a command's raw table index onto the baseline or override tables.
#[derive(Debug, Clone, Copy)]
pub struct IndexResolver<'a> {
    baseline: BaselineTables<'a>,
    overrides: &'a OverrideTables,
}

impl<'a> IndexResolver<'a> {
    pub fn new(baseline: BaselineTables<'a>, overrides: &'a OverrideTables) -> Self {
        Self {
            baseline,
            overrides,
        }
    }

    /// One past the highest index that resolves for `kind`.
    pub fn limit(&self, kind: TableKind) -> usize {
        self.baseline.len(kind) + self.overrides.capacity()
    }

    pub fn resolve(&self, kind: TableKind, index: u8) -> Result<u32, Fault> {
        let rom = self.baseline.table(kind);
        let index_usize = index as usize;

        if index_usize < rom.len() {
            return Ok(rom[index_usize]);
        }

        self.overrides
            .table(kind)
            .get(index_usize - rom.len())
            .copied()
            .ok_or(Fault::IndexOutOfRange {
                kind,
                index,
                limit: self.limit(kind),
            })
    }

    pub fn resolve_address(&self, index: u8) -> Result<u32, Fault> {
        self.resolve(TableKind::Address, index)
    }

    pub fn resolve_value(&self, index: u8) -> Result<u32, Fault> {
        self.resolve(TableKind::Value, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRS: [u32; 3] = [0x100, 0x200, 0x300];
    const VALS: [u32; 2] = [0xA, 0xB];

    fn overrides() -> OverrideTables {
        let mut ram = OverrideTables::new();
        ram.load(&[0x1000, 0x2000, 0, 0xC, 0xD, 0xE]);
        ram
    }

    #[test]
    fn baseline_indices_hit_baseline() {
        let ram = overrides();
        let resolver = IndexResolver::new(BaselineTables::new(&ADDRS, &VALS), &ram);

        for (i, &addr) in ADDRS.iter().enumerate() {
            assert_eq!(resolver.resolve_address(i as u8).unwrap(), addr);
        }
        for (i, &val) in VALS.iter().enumerate() {
            assert_eq!(resolver.resolve_value(i as u8).unwrap(), val);
        }
    }

    #[test]
    fn indices_past_baseline_fall_through_to_overrides() {
        let ram = overrides();
        let resolver = IndexResolver::new(BaselineTables::new(&ADDRS, &VALS), &ram);

        for i in ADDRS.len()..resolver.limit(TableKind::Address) {
            assert_eq!(
                resolver.resolve_address(i as u8).unwrap(),
                ram.table(TableKind::Address)[i - ADDRS.len()]
            );
        }
        assert_eq!(resolver.resolve_address(3).unwrap(), 0x1000);
        assert_eq!(resolver.resolve_value(2).unwrap(), 0xC);
        assert_eq!(resolver.resolve_value(4).unwrap(), 0xE);
        assert_eq!(resolver.resolve_value(5).unwrap(), 0);
    }

    #[test]
    fn every_u8_either_resolves_or_faults() {
        let ram = overrides();
        let resolver = IndexResolver::new(BaselineTables::new(&ADDRS, &VALS), &ram);
        let limit = resolver.limit(TableKind::Value);

        for i in 0..=u8::MAX {
            match resolver.resolve_value(i) {
                Ok(_) => assert!((i as usize) < limit),
                Err(Fault::IndexOutOfRange { kind, index, limit: l }) => {
                    assert_eq!(kind, TableKind::Value);
                    assert_eq!(index, i);
                    assert_eq!(l, limit);
                    assert!((i as usize) >= limit);
                }
                Err(e) => panic!("unexpected fault {e}"),
            }
        }
    }
}
