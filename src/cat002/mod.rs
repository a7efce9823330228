// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CAT 002 — Monoradar Service Messages.
//!
//! The second worked category (spec §4.3): unlike [`crate::cat001`], its TOD
//! arrives already expanded, so its bookkeeping writes the decoded value
//! straight into the source-state store rather than reconciling anything.

use std::sync::Arc;

use crate::core::{
    CategoryHandler, CategoryHandlerBuilder, Diagnostics, FieldHandler, SizeRule, SourceId,
    SourceStateStore,
};

/// A single CAT 002 monoradar service message.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Asterix2Report {
    pub source_id: SourceId,
    pub tod: u32,
    pub antenna_rotation_rpm: f64,
}

/// I002/010 — source identifier, FRN 1, mandatory.
struct SourceIdentifier;
impl FieldHandler<Asterix2Report> for SourceIdentifier {
    fn name(&self) -> &'static str {
        "I002/010"
    }
    fn mandatory(&self) -> bool {
        true
    }
    fn size(&self, data: &[u8]) -> usize {
        SizeRule::Fixed(2).size(data)
    }
    fn decode(&self, data: &[u8], report: &mut Asterix2Report) -> bool {
        report.source_id = SourceId::new(data[0], data[1]);
        true
    }
}

/// I002/000 — message type, FRN 2. Size-only.
struct MessageType;
impl FieldHandler<Asterix2Report> for MessageType {
    fn name(&self) -> &'static str {
        "I002/000"
    }
    fn mandatory(&self) -> bool {
        false
    }
    fn size(&self, data: &[u8]) -> usize {
        SizeRule::Fixed(1).size(data)
    }
    fn decode(&self, _data: &[u8], _report: &mut Asterix2Report) -> bool {
        true
    }
}

/// I002/020 — sector number, FRN 3. Size-only.
struct SectorNumber;
impl FieldHandler<Asterix2Report> for SectorNumber {
    fn name(&self) -> &'static str {
        "I002/020"
    }
    fn mandatory(&self) -> bool {
        false
    }
    fn size(&self, data: &[u8]) -> usize {
        SizeRule::Fixed(1).size(data)
    }
    fn decode(&self, _data: &[u8], _report: &mut Asterix2Report) -> bool {
        true
    }
}

/// I002/030 — time of day, FRN 4: a 24-bit big-endian counter in 1/128 s units.
struct TimeOfDay;
impl FieldHandler<Asterix2Report> for TimeOfDay {
    fn name(&self) -> &'static str {
        "I002/030"
    }
    fn mandatory(&self) -> bool {
        false
    }
    fn size(&self, data: &[u8]) -> usize {
        SizeRule::Fixed(3).size(data)
    }
    fn decode(&self, data: &[u8], report: &mut Asterix2Report) -> bool {
        report.tod = u32::from_be_bytes([0, data[0], data[1], data[2]]);
        true
    }
}

/// I002/041 — antenna rotation speed, FRN 5.
struct AntennaRotationSpeed;
impl FieldHandler<Asterix2Report> for AntennaRotationSpeed {
    fn name(&self) -> &'static str {
        "I002/041"
    }
    fn mandatory(&self) -> bool {
        false
    }
    fn size(&self, data: &[u8]) -> usize {
        SizeRule::Fixed(2).size(data)
    }
    fn decode(&self, data: &[u8], report: &mut Asterix2Report) -> bool {
        let raw = u16::from_be_bytes([data[0], data[1]]);
        report.antenna_rotation_rpm = raw as f64 / 128.0;
        true
    }
}

/// I002/050 — station configuration status, FRN 6. Size-only.
struct StationConfigurationStatus;
impl FieldHandler<Asterix2Report> for StationConfigurationStatus {
    fn name(&self) -> &'static str {
        "I002/050"
    }
    fn mandatory(&self) -> bool {
        false
    }
    fn size(&self, data: &[u8]) -> usize {
        SizeRule::Fixed(2).size(data)
    }
    fn decode(&self, _data: &[u8], _report: &mut Asterix2Report) -> bool {
        true
    }
}

/// CAT 002 bookkeeping: the TOD carried on the wire is already a full value,
/// so it is written straight into the source-state store (spec §4.2).
fn bookkeeping(report: &mut Asterix2Report, source_state: &SourceStateStore, _receive_tod: u32) {
    source_state.insert_or_update(report.source_id, report.tod);
}

/// Builds a fully wired CAT 002 category handler.
pub fn register(
    source_state: Arc<SourceStateStore>,
    diagnostics: Arc<Diagnostics>,
) -> CategoryHandler<Asterix2Report> {
    CategoryHandlerBuilder::new()
        .add_handler(1, Arc::new(SourceIdentifier))
        .add_handler(2, Arc::new(MessageType))
        .add_handler(3, Arc::new(SectorNumber))
        .add_handler(4, Arc::new(TimeOfDay))
        .add_handler(5, Arc::new(AntennaRotationSpeed))
        .add_handler(6, Arc::new(StationConfigurationStatus))
        .build(source_state, diagnostics, Box::new(bookkeeping))
}
