// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end scenarios run against a fully wired [`PacketDispatcher`].

use std::sync::{Arc, Mutex};

use asterix_decode::cat001::{self, Asterix1Report, SsrPsrDetection};
use asterix_decode::cat002::{self, Asterix2Report};
use asterix_decode::core::{Listener, PacketDispatcher, SourceId, SourceStateStore};

struct Recorder<R> {
    reports: Mutex<Vec<R>>,
}

impl<R> Recorder<R> {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            reports: Mutex::new(Vec::new()),
        })
    }
}

impl<R: Clone + Send + Sync> Listener<R> for Recorder<R> {
    fn on_report(&self, report: &R) {
        self.reports.lock().unwrap().push(report.clone());
    }
}

fn build_dispatcher() -> (
    PacketDispatcher,
    Arc<Recorder<Asterix1Report>>,
    Arc<Recorder<Asterix2Report>>,
) {
    let dispatcher = PacketDispatcher::new();
    let source_state = Arc::new(SourceStateStore::new());

    let cat1_recorder = Recorder::<Asterix1Report>::new();
    let cat1 = cat001::register(source_state.clone(), dispatcher.diagnostics());
    cat1.add_listener(Arc::downgrade(&cat1_recorder) as std::sync::Weak<dyn Listener<Asterix1Report>>);
    dispatcher.register_category(1, Arc::new(cat1));

    let cat2_recorder = Recorder::<Asterix2Report>::new();
    let cat2 = cat002::register(source_state, dispatcher.diagnostics());
    cat2.add_listener(Arc::downgrade(&cat2_recorder) as std::sync::Weak<dyn Listener<Asterix2Report>>);
    dispatcher.register_category(2, Arc::new(cat2));

    (dispatcher, cat1_recorder, cat2_recorder)
}

#[test]
fn s2_single_cat001_block_with_a_subset_of_items() {
    let (dispatcher, cat1_recorder, _cat2_recorder) = build_dispatcher();
    let packet = [
        0x01, 0x00, 0x0F, // header: CAT 1, LEN 15
        0xF8, // FSPEC: FRN 1..5
        0x01, 0x02, // I001/010
        0x20, // I001/020
        0x00, 0x80, 0x40, 0x00, // I001/040
        0x00, 0x00, // I001/070
        0x00, 0x00, // I001/090
    ];
    dispatcher.handle_packet(&packet, 0);

    let snap = dispatcher.stats_snapshot();
    assert_eq!(snap.total_packets, 1);
    assert_eq!(snap.malformed_blocks, 0);
    assert_eq!(snap.malformed_records, 0);
    assert_eq!(snap.protocol_violations, 0);
    assert_eq!(snap.unhandled_items, 0);

    let reports = cat1_recorder.reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.source_id, SourceId::new(1, 2));
    assert!((report.range_m - 1852.0).abs() < 0.1);
    assert!((report.azimuth_rad - std::f64::consts::FRAC_PI_2).abs() < 1e-4);
    let descriptor = report.descriptor.unwrap();
    assert_eq!(descriptor.ssr_psr, SsrPsrDetection::SoleSecondaryDetection);
    let mode_3a = report.mode_3a.unwrap();
    assert_eq!(mode_3a.code, 0);
    assert!(!mode_3a.validated && !mode_3a.garbled && !mode_3a.local);
    let mode_c = report.mode_c.unwrap();
    assert_eq!(mode_c.height_m, 0.0);
}

#[test]
fn s3_unhandled_category_consumes_the_whole_block() {
    let (dispatcher, _cat1, _cat2) = build_dispatcher();
    let packet = [0x2A, 0x00, 0x05, 0x80, 0x00];
    dispatcher.handle_packet(&packet, 0);

    let snap = dispatcher.stats_snapshot();
    assert_eq!(snap.unhandled_categories, 1);
    assert_eq!(snap.total_packets, 1);
    assert_eq!(snap.trailing_bytes_count, 0);
}

#[test]
fn s4_malformed_block_length_is_rejected() {
    let (dispatcher, _cat1, _cat2) = build_dispatcher();
    let packet = [0x01, 0x00, 0x02, 0x80, 0x00, 0x00];
    dispatcher.handle_packet(&packet, 0);

    let snap = dispatcher.stats_snapshot();
    assert_eq!(snap.malformed_blocks, 1);
    assert_eq!(snap.trailing_bytes_count, 0);
}

#[test]
fn s5_missing_mandatory_item_is_a_protocol_violation() {
    let (dispatcher, cat1_recorder, _cat2) = build_dispatcher();
    // FSPEC 0x40 sets FRN 2 (target report descriptor) but clears FRN 1
    // (source identifier, mandatory) -> rejected before any item is decoded.
    let packet = [0x01, 0x00, 0x05, 0x40, 0x00];
    dispatcher.handle_packet(&packet, 0);

    let snap = dispatcher.stats_snapshot();
    assert_eq!(snap.protocol_violations, 1);
    assert!(cat1_recorder.reports.lock().unwrap().is_empty());
}

#[test]
fn s6_truncated_time_expansion_across_two_records() {
    let (dispatcher, cat1_recorder, _cat2) = build_dispatcher();

    // First record establishes a reference TOD via the caller-supplied receive timestamp.
    let seed = [0x01, 0x00, 0x06, 0b1000_0000, 0x01, 0x02];
    dispatcher.handle_packet(&seed, 0x0012_3456);

    // Second record: source identifier + truncated clock (FRN 1 + FRN 8).
    let packet = [
        0x01, 0x00, 0x09, // header: CAT 1, LEN 9
        0b1000_0001, 0b1000_0000, // FSPEC: FRN1, continues; FRN8
        0x01, 0x02, // I001/010
        0x56, 0x78, // I001/141
    ];
    dispatcher.handle_packet(&packet, 0);

    let reports = cat1_recorder.reports.lock().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[1].tod, 0x0012_5678);
}

#[test]
fn multiple_blocks_in_one_buffer_are_all_processed() {
    let (dispatcher, cat1_recorder, cat2_recorder) = build_dispatcher();
    let mut packet = Vec::new();
    packet.extend_from_slice(&[0x01, 0x00, 0x06, 0b1000_0000, 0x01, 0x02]);
    packet.extend_from_slice(&[0x02, 0x00, 0x06, 0b1000_0000, 0x03, 0x04]);
    dispatcher.handle_packet(&packet, 0);

    assert_eq!(dispatcher.stats_snapshot().total_packets, 1);
    assert_eq!(cat1_recorder.reports.lock().unwrap().len(), 1);
    assert_eq!(cat2_recorder.reports.lock().unwrap().len(), 1);
    assert_eq!(
        cat2_recorder.reports.lock().unwrap()[0].source_id,
        SourceId::new(3, 4)
    );
}

#[test]
fn trailing_bytes_below_min_block_size_are_recorded() {
    let (dispatcher, _cat1, _cat2) = build_dispatcher();
    let mut packet = vec![0x01, 0x00, 0x06, 0b1000_0000, 0x01, 0x02];
    packet.extend_from_slice(&[0xAA, 0xBB]);
    dispatcher.handle_packet(&packet, 0);
    assert_eq!(dispatcher.stats_snapshot().trailing_bytes_count, 2);
}
