// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Top-level entry point: splits a raw buffer into ASTERIX blocks and routes
//! each block's records to its registered category handler.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::core::byte_view::ByteView;
use crate::core::category::RecordProcessor;
use crate::core::constants::{HEADER_SIZE, MAX_FSPEC_BYTES, MIN_BLOCK_SIZE};
use crate::core::diagnostics::{Diagnostics, DiagnosticsSnapshot};
use crate::core::error::DecodeError;

/// Splits an input buffer into ASTERIX blocks and dispatches each block's
/// records to the registered category handler.
///
/// Safe to share across threads: category registration uses
/// [`arc_swap::ArcSwapOption`] for lock-free, atomically-replaced lookups, and
/// every category handler's own shared state (diagnostics, source-state
/// store, listener registry) is independently synchronized.
pub struct PacketDispatcher {
    categories: Vec<ArcSwapOption<dyn RecordProcessor>>,
    diagnostics: Arc<Diagnostics>,
}

impl Default for PacketDispatcher {
    fn default() -> Self {
        Self {
            categories: (0..crate::core::constants::MAX_CATEGORIES)
                .map(|_| ArcSwapOption::from(None))
                .collect(),
            diagnostics: Arc::new(Diagnostics::new()),
        }
    }
}

impl PacketDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared diagnostics handle. Category handlers built against this
    /// dispatcher should be constructed with a clone of this `Arc` so every
    /// counter lands in the same place.
    pub fn diagnostics(&self) -> Arc<Diagnostics> {
        self.diagnostics.clone()
    }

    /// Installs `handler` for `cat`, atomically replacing any previous
    /// handler for that category. The dispatcher's diagnostics are expected
    /// to already be linked into `handler` (via [`Self::diagnostics`]) before
    /// this call, so the handler is fully wired before it becomes reachable.
    pub fn register_category(&self, cat: u8, handler: Arc<dyn RecordProcessor>) {
        self.categories[cat as usize].store(Some(handler));
    }

    /// Processes `bytes` as a stream of ASTERIX blocks, each holding one or
    /// more records. `receive_tod` is the caller's best estimate of the
    /// current time-of-day (1/128 s since local midnight), used by category
    /// handlers that fall back to a system-clock-derived reference when no
    /// prior record from a source has been seen (spec §4.2, CAT 001
    /// bookkeeping) — the core never reads the system clock itself.
    pub fn handle_packet(&self, bytes: &[u8], receive_tod: u32) {
        if bytes.is_empty() {
            return;
        }
        self.diagnostics.incr_total_packets();

        let mut offset = 0usize;
        while bytes.len() - offset >= MIN_BLOCK_SIZE {
            match self.parse_block(&bytes[offset..], receive_tod) {
                Some(consumed) => offset += consumed,
                None => {
                    self.diagnostics.record(DecodeError::MalformedBlock);
                    return;
                }
            }
        }

        let trailing = bytes.len() - offset;
        if trailing > 0 {
            self.diagnostics.add_trailing_bytes(trailing as u64);
        }
    }

    /// Snapshots the current diagnostic counters.
    pub fn stats_snapshot(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    /// Parses and fully processes one block starting at `block[0]`. Returns
    /// the block's declared length (to advance the caller's offset) on a
    /// structurally valid header, or `None` if the header itself is
    /// malformed.
    fn parse_block(&self, block: &[u8], receive_tod: u32) -> Option<usize> {
        let header = ByteView::new(block).take(HEADER_SIZE)?;
        let category = header[0];
        let declared_length = u16::from_be_bytes([header[1], header[2]]) as usize;
        if declared_length < HEADER_SIZE || declared_length > block.len() {
            return None;
        }

        let Some(handler) = self.categories[category as usize].load_full() else {
            self.diagnostics.record(DecodeError::UnhandledCategory);
            crate::decoder_trace!("asterix: no handler registered for category {category}");
            return Some(declared_length);
        };

        let mut offset = HEADER_SIZE;
        while offset < declared_length {
            let consumed = dispatch_record(
                handler.as_ref(),
                &block[offset..declared_length],
                receive_tod,
                &self.diagnostics,
            );
            if consumed == 0 {
                self.diagnostics.incr_record_parse_errors();
                break;
            }
            offset += consumed;
        }

        Some(declared_length)
    }
}

/// Scans the FSPEC prefix of `record`, validates its FRN bound, and hands the
/// FSPEC plus remaining payload to `handler`.
///
/// Returns the total bytes consumed (FSPEC length + handler-reported payload
/// bytes), or `0` on any failure.
fn dispatch_record(
    handler: &dyn RecordProcessor,
    record: &[u8],
    receive_tod: u32,
    diagnostics: &Diagnostics,
) -> usize {
    let view = ByteView::new(record);
    let mut fspec_len = 0usize;
    let mut last_data_idx: Option<usize> = None;
    let mut last_data_value = 0u8;

    loop {
        if fspec_len >= MAX_FSPEC_BYTES {
            diagnostics.record(DecodeError::MalformedRecord);
            return 0;
        }
        let Some(b) = view.byte_at(fspec_len) else {
            diagnostics.record(DecodeError::MalformedRecord);
            return 0;
        };
        if b & 0xFE != 0 {
            last_data_idx = Some(fspec_len);
            last_data_value = b;
        }
        fspec_len += 1;
        if b & 0x01 == 0 {
            break;
        }
    }

    if let Some(idx) = last_data_idx {
        if idx > 18 {
            diagnostics.record(DecodeError::ProtocolViolation);
            return 0;
        }
        if idx == 18 && last_data_value & 0x3E != 0 {
            diagnostics.record(DecodeError::ProtocolViolation);
            return 0;
        }
    }

    let fspec = &record[..fspec_len];
    let payload = &record[fspec_len..];
    let item_bytes = handler.process_record(fspec, payload, receive_tod);
    if item_bytes == 0 {
        return 0;
    }
    fspec_len + item_bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::category::CategoryHandlerBuilder;
    use crate::core::field::FieldHandler;
    use crate::core::source_state::SourceStateStore;

    #[derive(Debug, Default)]
    struct Report {
        value: u8,
    }

    struct OneByteField;
    impl FieldHandler<Report> for OneByteField {
        fn name(&self) -> &'static str {
            "X"
        }
        fn mandatory(&self) -> bool {
            false
        }
        fn size(&self, _data: &[u8]) -> usize {
            1
        }
        fn decode(&self, data: &[u8], report: &mut Report) -> bool {
            report.value = data[0];
            true
        }
    }

    fn build_dispatcher() -> PacketDispatcher {
        let dispatcher = PacketDispatcher::new();
        let handler = CategoryHandlerBuilder::<Report>::new()
            .add_handler(1, Arc::new(OneByteField))
            .build(
                Arc::new(SourceStateStore::new()),
                dispatcher.diagnostics(),
                Box::new(|_, _, _| {}),
            );
        dispatcher.register_category(1, Arc::new(handler));
        dispatcher
    }

    #[test]
    fn empty_buffer_is_a_no_op() {
        let dispatcher = build_dispatcher();
        dispatcher.handle_packet(&[], 0);
        assert_eq!(dispatcher.stats_snapshot().total_packets, 0);
    }

    #[test]
    fn single_block_single_record() {
        let dispatcher = build_dispatcher();
        // CAT=1, LEN=5 (header 3 + fspec 1 + payload 1).
        let packet = [0x01, 0x00, 0x05, 0b1000_0000, 0xAB];
        dispatcher.handle_packet(&packet, 0);
        let snap = dispatcher.stats_snapshot();
        assert_eq!(snap.total_packets, 1);
        assert_eq!(snap.malformed_blocks, 0);
        assert_eq!(snap.record_parse_errors, 0);
    }

    #[test]
    fn unhandled_category_is_counted_and_skipped() {
        let dispatcher = build_dispatcher();
        let packet = [0x2A, 0x00, 0x05, 0x80, 0x00];
        dispatcher.handle_packet(&packet, 0);
        let snap = dispatcher.stats_snapshot();
        assert_eq!(snap.unhandled_categories, 1);
        assert_eq!(snap.total_packets, 1);
    }

    #[test]
    fn malformed_block_length_stops_the_packet() {
        let dispatcher = build_dispatcher();
        let packet = [0x01, 0x00, 0x02, 0x80, 0x00, 0x00];
        dispatcher.handle_packet(&packet, 0);
        let snap = dispatcher.stats_snapshot();
        assert_eq!(snap.malformed_blocks, 1);
        assert_eq!(snap.trailing_bytes_count, 0);
    }

    #[test]
    fn trailing_bytes_below_min_block_size_are_counted() {
        let dispatcher = build_dispatcher();
        let mut packet = vec![0x01, 0x00, 0x05, 0b1000_0000, 0xAB];
        packet.extend_from_slice(&[0xFF, 0xFF]);
        dispatcher.handle_packet(&packet, 0);
        assert_eq!(dispatcher.stats_snapshot().trailing_bytes_count, 2);
    }

    #[test]
    fn replacing_category_handler_is_idempotent() {
        let dispatcher = build_dispatcher();
        let handler = CategoryHandlerBuilder::<Report>::new()
            .add_handler(1, Arc::new(OneByteField))
            .build(
                Arc::new(SourceStateStore::new()),
                dispatcher.diagnostics(),
                Box::new(|_, _, _| {}),
            );
        dispatcher.register_category(1, Arc::new(handler));
        let packet = [0x01, 0x00, 0x05, 0b1000_0000, 0xAB];
        dispatcher.handle_packet(&packet, 0);
        assert_eq!(dispatcher.stats_snapshot().malformed_blocks, 0);
    }
}
