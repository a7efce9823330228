// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-source time-of-day memory, shared by reference across category handlers.

use dashmap::DashMap;

/// System Area Code / System Identification Code pair identifying a sensor.
///
/// Ordering is lexicographic on `(sac, sic)`, matching spec §3.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId {
    pub sac: u8,
    pub sic: u8,
}

impl SourceId {
    pub fn new(sac: u8, sic: u8) -> Self {
        Self { sac, sic }
    }
}

/// Concurrent map from [`SourceId`] to the most recent full 32-bit
/// time-of-day seen from that source (units of 1/128 s since local midnight).
///
/// Backed by [`DashMap`], a sharded lock-free-read concurrent map — the
/// same concurrency primitive the teacher repo uses for its shared discovery
/// and reader-matching tables. Entries live for the lifetime of the process;
/// there is no eviction because the source population is bounded by the
/// number of physical sensors feeding the decoder.
#[derive(Debug, Default)]
pub struct SourceStateStore {
    last_tod: DashMap<SourceId, u32>,
}

impl SourceStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently recorded full TOD for `id`, if any record from that
    /// source has been seen.
    pub fn get(&self, id: SourceId) -> Option<u32> {
        self.last_tod.get(&id).map(|entry| *entry)
    }

    /// Records `tod` as the latest known full TOD for `id`, overwriting any
    /// prior value.
    pub fn insert_or_update(&self, id: SourceId, tod: u32) {
        self.last_tod.insert(id, tod);
    }
}
