// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-category FSPEC walker: applies a table of FRN-indexed field handlers
//! to a record's payload, validates the mandatory mask, and fans the
//! resulting report out to listeners.

use std::sync::Arc;

use crate::core::constants::MAX_FRNS;
use crate::core::diagnostics::Diagnostics;
use crate::core::error::DecodeError;
use crate::core::field::FieldHandler;
use crate::core::listener::{Listener, ListenerRegistry};
use crate::core::source_state::SourceStateStore;

/// Type-erased entry point the packet dispatcher calls for every record,
/// regardless of which report type the category decodes into.
pub trait RecordProcessor: Send + Sync {
    /// Decodes one record's FSPEC + payload. Returns the number of payload
    /// bytes consumed (matching spec §4.2's return contract), or `0` on any
    /// failure.
    fn process_record(&self, fspec: &[u8], payload: &[u8], receive_tod: u32) -> usize;
}

/// Category-specific bookkeeping run once a record decodes successfully,
/// before fan-out — e.g. CAT 002 writes its TOD straight into the source
/// state, CAT 001 reconciles a truncated clock first.
pub type Bookkeeping<R> = Box<dyn Fn(&mut R, &SourceStateStore, u32) + Send + Sync>;

/// Builds a [`CategoryHandler`] by registering one field handler per FRN.
///
/// Registration is idempotent-replace (spec §4.2): registering the same FRN
/// twice keeps only the most recent handler, and the mandatory mask is
/// recomputed from the final table rather than accumulated incrementally, so
/// replacing a mandatory handler with a non-mandatory one correctly clears
/// its bit.
pub struct CategoryHandlerBuilder<R> {
    slots: Vec<Option<Arc<dyn FieldHandler<R>>>>,
}

impl<R> Default for CategoryHandlerBuilder<R> {
    fn default() -> Self {
        Self {
            slots: (0..MAX_FRNS).map(|_| None).collect(),
        }
    }
}

impl<R> CategoryHandlerBuilder<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` at `frn` (1-based). Panics only on the
    /// out-of-range FRNs the spec calls a programmer error (`0` or
    /// `> MAX_FRNS`); a live FSPEC can never reference those, since the
    /// dispatcher independently bounds FRNs to 128 before this table is
    /// consulted.
    pub fn add_handler(mut self, frn: usize, handler: Arc<dyn FieldHandler<R>>) -> Self {
        assert!(frn >= 1 && frn <= MAX_FRNS, "FRN {frn} out of range");
        self.slots[frn - 1] = Some(handler);
        self
    }

    /// Finishes construction, wiring in the shared source-state store,
    /// diagnostics handle, and category-specific bookkeeping.
    pub fn build(
        self,
        source_state: Arc<SourceStateStore>,
        diagnostics: Arc<Diagnostics>,
        bookkeeping: Bookkeeping<R>,
    ) -> CategoryHandler<R>
    where
        R: Default,
    {
        let (mandatory_fspec, mandatory_fspec_size) = compute_mandatory_mask(&self.slots);
        CategoryHandler {
            item_lookup: self.slots,
            mandatory_fspec,
            mandatory_fspec_size,
            source_state,
            diagnostics,
            listeners: ListenerRegistry::new(),
            bookkeeping,
        }
    }
}

/// Precomputes the mandatory FSPEC mask (spec §3): for every mandatory FRN
/// `f`, sets bit `7 - ((f-1) % 7)` of byte `(f-1) / 7`.
fn compute_mandatory_mask<R>(
    slots: &[Option<Arc<dyn FieldHandler<R>>>],
) -> ([u8; 20], usize) {
    let mut mask = [0u8; 20];
    let mut size = 0;
    for (idx, slot) in slots.iter().enumerate() {
        let Some(handler) = slot else { continue };
        if !handler.mandatory() {
            continue;
        }
        let frn = idx + 1;
        let byte_idx = (frn - 1) / 7;
        let bit = 7 - ((frn - 1) % 7);
        mask[byte_idx] |= 1 << bit;
        size = size.max(byte_idx + 1);
    }
    (mask, size)
}

/// Owns the FRN table, mandatory mask, listener registry, and shared
/// source-state/diagnostics handles for one ASTERIX category.
pub struct CategoryHandler<R> {
    item_lookup: Vec<Option<Arc<dyn FieldHandler<R>>>>,
    mandatory_fspec: [u8; 20],
    mandatory_fspec_size: usize,
    source_state: Arc<SourceStateStore>,
    diagnostics: Arc<Diagnostics>,
    listeners: ListenerRegistry<R>,
    bookkeeping: Bookkeeping<R>,
}

impl<R> CategoryHandler<R>
where
    R: Default,
{
    /// Registers a listener that will receive every successfully decoded report.
    pub fn add_listener(&self, subscriber: std::sync::Weak<dyn Listener<R>>) {
        self.listeners.add(subscriber);
    }

    /// Highest byte index the mandatory mask touches, for tests/diagnostics.
    pub fn mandatory_fspec_size(&self) -> usize {
        self.mandatory_fspec_size
    }

    /// Walks `fspec` against `payload`, decoding every set bit's field into a
    /// fresh report. Returns the number of payload bytes consumed, or `0` on
    /// any failure (the caller discards the record either way).
    pub fn process_record(&self, fspec: &[u8], payload: &[u8], receive_tod: u32) -> usize {
        if fspec.len() < self.mandatory_fspec_size {
            self.diagnostics.record(DecodeError::ProtocolViolation);
            return 0;
        }
        for i in 0..self.mandatory_fspec_size {
            if self.mandatory_fspec[i] & !fspec[i] != 0 {
                self.diagnostics.record(DecodeError::ProtocolViolation);
                return 0;
            }
        }

        let mut report = R::default();
        let mut frn_base = 1usize;
        let mut remaining = payload;

        for &b in fspec {
            let mut item_bits = b & 0xFE;
            while item_bits != 0 {
                let k = item_bits.leading_zeros() as usize;
                let current_frn = frn_base + k;
                let Some(handler) = self
                    .item_lookup
                    .get(current_frn - 1)
                    .and_then(|slot| slot.as_ref())
                else {
                    self.diagnostics.record(DecodeError::UnhandledItem);
                    return 0;
                };

                let size = handler.size(remaining);
                if size == 0 {
                    self.diagnostics.record(DecodeError::MalformedRecord);
                    return 0;
                }
                if size > remaining.len() {
                    self.diagnostics.record(DecodeError::NotEnoughData);
                    return 0;
                }
                let data = &remaining[..size];
                if !handler.decode(data, &mut report) {
                    self.diagnostics.record(DecodeError::ProtocolViolation);
                    return 0;
                }
                remaining = &remaining[size..];
                item_bits &= !(0x80u8 >> k);
            }

            if b & 0x01 == 0 {
                let consumed = payload.len() - remaining.len();
                (self.bookkeeping)(&mut report, &self.source_state, receive_tod);
                self.listeners.fan_out(&report);
                return consumed;
            }
            frn_base += 7;
        }

        self.diagnostics.record(DecodeError::MalformedRecord);
        0
    }
}

impl<R> RecordProcessor for CategoryHandler<R>
where
    R: Default + Send + Sync,
{
    fn process_record(&self, fspec: &[u8], payload: &[u8], receive_tod: u32) -> usize {
        CategoryHandler::process_record(self, fspec, payload, receive_tod)
    }
}
