// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-lifetime decode counters.
//!
//! All counters are [`AtomicU64`] with `Relaxed` ordering: they exist purely
//! for observation, never for control flow, so a snapshot is a set of
//! point-in-time unsynchronized reads rather than an atomic transaction.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::error::DecodeError;

/// Shared, thread-safe decode counters. Cheap to clone as an `Arc` handle;
/// the struct itself holds no interior pointers, so it is usually wrapped in
/// an `Arc` by callers that fan it out to multiple category handlers.
#[derive(Debug, Default)]
pub struct Diagnostics {
    total_packets: AtomicU64,
    trailing_bytes_count: AtomicU64,
    unhandled_categories: AtomicU64,
    malformed_blocks: AtomicU64,
    malformed_records: AtomicU64,
    record_parse_errors: AtomicU64,
    protocol_violations: AtomicU64,
    unhandled_items: AtomicU64,
}

/// Point-in-time copy of every counter, returned by [`Diagnostics::snapshot`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticsSnapshot {
    pub total_packets: u64,
    pub trailing_bytes_count: u64,
    pub unhandled_categories: u64,
    pub malformed_blocks: u64,
    pub malformed_records: u64,
    pub record_parse_errors: u64,
    pub protocol_violations: u64,
    pub unhandled_items: u64,
}

impl Diagnostics {
    /// A fresh set of counters, all zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr_total_packets(&self) {
        self.total_packets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_trailing_bytes(&self, n: u64) {
        self.trailing_bytes_count.fetch_add(n, Ordering::Relaxed);
    }

    pub fn incr_unhandled_categories(&self) {
        self.unhandled_categories.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_malformed_blocks(&self) {
        self.malformed_blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_malformed_records(&self) {
        self.malformed_records.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_record_parse_errors(&self) {
        self.record_parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_protocol_violations(&self) {
        self.protocol_violations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn incr_unhandled_items(&self) {
        self.unhandled_items.fetch_add(1, Ordering::Relaxed);
    }

    /// Translates a [`DecodeError`] from an internal parse stage into the
    /// matching counter bump, so call sites share one failure vocabulary
    /// instead of picking a counter by hand.
    pub fn record(&self, err: DecodeError) {
        match err {
            DecodeError::NotEnoughData | DecodeError::MalformedRecord => {
                self.incr_malformed_records()
            }
            DecodeError::MalformedBlock => self.incr_malformed_blocks(),
            DecodeError::ProtocolViolation => self.incr_protocol_violations(),
            DecodeError::UnhandledCategory => self.incr_unhandled_categories(),
            DecodeError::UnhandledItem => self.incr_unhandled_items(),
        }
    }

    /// Snapshots every counter with an unsynchronized relaxed load.
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            total_packets: self.total_packets.load(Ordering::Relaxed),
            trailing_bytes_count: self.trailing_bytes_count.load(Ordering::Relaxed),
            unhandled_categories: self.unhandled_categories.load(Ordering::Relaxed),
            malformed_blocks: self.malformed_blocks.load(Ordering::Relaxed),
            malformed_records: self.malformed_records.load(Ordering::Relaxed),
            record_parse_errors: self.record_parse_errors.load(Ordering::Relaxed),
            protocol_violations: self.protocol_violations.load(Ordering::Relaxed),
            unhandled_items: self.unhandled_items.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let d = Diagnostics::new();
        assert_eq!(d.snapshot(), DiagnosticsSnapshot::default());
    }

    #[test]
    fn increments_are_independent() {
        let d = Diagnostics::new();
        d.incr_total_packets();
        d.incr_total_packets();
        d.incr_malformed_blocks();
        let snap = d.snapshot();
        assert_eq!(snap.total_packets, 2);
        assert_eq!(snap.malformed_blocks, 1);
        assert_eq!(snap.unhandled_categories, 0);
    }

    #[test]
    fn trailing_bytes_accumulate() {
        let d = Diagnostics::new();
        d.add_trailing_bytes(3);
        d.add_trailing_bytes(4);
        assert_eq!(d.snapshot().trailing_bytes_count, 7);
    }

    #[test]
    fn record_routes_each_decode_error_to_its_counter() {
        let d = Diagnostics::new();
        d.record(DecodeError::NotEnoughData);
        d.record(DecodeError::MalformedRecord);
        d.record(DecodeError::MalformedBlock);
        d.record(DecodeError::ProtocolViolation);
        d.record(DecodeError::UnhandledCategory);
        d.record(DecodeError::UnhandledItem);

        let snap = d.snapshot();
        assert_eq!(snap.malformed_records, 2);
        assert_eq!(snap.malformed_blocks, 1);
        assert_eq!(snap.protocol_violations, 1);
        assert_eq!(snap.unhandled_categories, 1);
        assert_eq!(snap.unhandled_items, 1);
    }
}
