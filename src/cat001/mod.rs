// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CAT 001 — Monoradar Target Reports.
//!
//! One of the two worked categories (spec §4.3): demonstrates a category
//! whose bookkeeping reconciles a truncated on-wire clock against the
//! source-state store rather than trusting it verbatim (contrast
//! [`crate::cat002`]).

use std::sync::Arc;

use crate::core::bit_walker::BitWalker;
use crate::core::{
    reconcile_tod, CategoryHandler, CategoryHandlerBuilder, Diagnostics, FieldHandler, SizeRule,
    SourceId, SourceStateStore,
};

/// Detection type carried by the target report descriptor (I001/020 bits 5..4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsrPsrDetection {
    NoDetection,
    SolePrimaryDetection,
    SoleSecondaryDetection,
    CombinedDetection,
}

/// I001/020: target report descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetReportDescriptor {
    pub ssr_psr: SsrPsrDetection,
    /// Raw DS1/DS2 bits (octet 2, present only when octet 1's FX bit is set).
    pub ds1_ds2: Option<u8>,
    pub spi: bool,
}

/// I001/070: Mode-3/A code and its three status flags, preserved verbatim
/// rather than collapsed or inverted (spec §9, open question i).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode3A {
    pub code: u16,
    pub validated: bool,
    pub garbled: bool,
    pub local: bool,
}

/// I001/090: Mode-C barometric height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeC {
    pub height_m: f64,
    pub validated: bool,
    pub garbled: bool,
}

/// A single CAT 001 monoradar target report.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Asterix1Report {
    pub source_id: SourceId,
    pub tod: u32,
    pub lsp_clock: u16,
    pub has_lsp_clock: bool,
    pub range_m: f64,
    pub azimuth_rad: f64,
    pub descriptor: Option<TargetReportDescriptor>,
    pub mode_3a: Option<Mode3A>,
    pub mode_c: Option<ModeC>,
}

/// I001/010 — source identifier, FRN 1, mandatory.
struct SourceIdentifier;
impl FieldHandler<Asterix1Report> for SourceIdentifier {
    fn name(&self) -> &'static str {
        "I001/010"
    }
    fn mandatory(&self) -> bool {
        true
    }
    fn size(&self, data: &[u8]) -> usize {
        SizeRule::Fixed(2).size(data)
    }
    fn decode(&self, data: &[u8], report: &mut Asterix1Report) -> bool {
        report.source_id = SourceId::new(data[0], data[1]);
        true
    }
}

/// I001/020 — target report descriptor, FRN 2.
///
/// Extended(1, 1), but capped at two octets: `size` always consumes exactly
/// two octets once the first octet's FX bit is set, and `decode` rejects a
/// request for a third extension octet (FX set on the second octet too) as a
/// protocol violation rather than chaining further (spec §4.3).
struct TargetReportDescriptorField;
impl FieldHandler<Asterix1Report> for TargetReportDescriptorField {
    fn name(&self) -> &'static str {
        "I001/020"
    }
    fn mandatory(&self) -> bool {
        false
    }
    fn size(&self, data: &[u8]) -> usize {
        let Some(&b0) = data.first() else { return 0 };
        if b0 & 0x01 == 0 {
            return 1;
        }
        if data.len() < 2 {
            return 0;
        }
        2
    }
    fn decode(&self, data: &[u8], report: &mut Asterix1Report) -> bool {
        let octet1 = BitWalker::new(data[0]);
        if octet1.flag(7) || octet1.flag(6) {
            return false;
        }
        let ssr_psr = match octet1.bits(5, 2) {
            0 => SsrPsrDetection::NoDetection,
            1 => SsrPsrDetection::SolePrimaryDetection,
            2 => SsrPsrDetection::SoleSecondaryDetection,
            _ => SsrPsrDetection::CombinedDetection,
        };
        let spi = octet1.flag(2);
        let ds1_ds2 = if octet1.flag(0) {
            let octet2 = BitWalker::new(data[1]);
            if octet2.flag(7) || octet2.flag(4) || octet2.flag(3) || octet2.flag(0) {
                return false;
            }
            Some(octet2.bits(6, 2))
        } else {
            None
        };
        report.descriptor = Some(TargetReportDescriptor {
            ssr_psr,
            ds1_ds2,
            spi,
        });
        true
    }
}

/// I001/040 — polar position, FRN 3.
struct PolarPosition;
impl FieldHandler<Asterix1Report> for PolarPosition {
    fn name(&self) -> &'static str {
        "I001/040"
    }
    fn mandatory(&self) -> bool {
        false
    }
    fn size(&self, data: &[u8]) -> usize {
        SizeRule::Fixed(4).size(data)
    }
    fn decode(&self, data: &[u8], report: &mut Asterix1Report) -> bool {
        let range_raw = u16::from_be_bytes([data[0], data[1]]);
        let azimuth_raw = u16::from_be_bytes([data[2], data[3]]);
        report.range_m = (range_raw as f64 / 128.0) * 1852.0;
        report.azimuth_rad = azimuth_raw as f64 * (std::f64::consts::PI / 32768.0);
        true
    }
}

/// I001/070 — Mode-3/A code, FRN 4.
struct Mode3AField;
impl FieldHandler<Asterix1Report> for Mode3AField {
    fn name(&self) -> &'static str {
        "I001/070"
    }
    fn mandatory(&self) -> bool {
        false
    }
    fn size(&self, data: &[u8]) -> usize {
        SizeRule::Fixed(2).size(data)
    }
    fn decode(&self, data: &[u8], report: &mut Asterix1Report) -> bool {
        let raw = u16::from_be_bytes([data[0], data[1]]);
        report.mode_3a = Some(Mode3A {
            code: raw & 0x0FFF,
            validated: raw & 0x8000 != 0,
            garbled: raw & 0x4000 != 0,
            local: raw & 0x2000 != 0,
        });
        true
    }
}

/// I001/090 — Mode-C height, FRN 5.
struct ModeCField;
impl FieldHandler<Asterix1Report> for ModeCField {
    fn name(&self) -> &'static str {
        "I001/090"
    }
    fn mandatory(&self) -> bool {
        false
    }
    fn size(&self, data: &[u8]) -> usize {
        SizeRule::Fixed(2).size(data)
    }
    fn decode(&self, data: &[u8], report: &mut Asterix1Report) -> bool {
        let raw = u16::from_be_bytes([data[0], data[1]]);
        let low14 = raw & 0x3FFF;
        let signed = if low14 & 0x2000 != 0 {
            (low14 | 0xC000) as i16
        } else {
            low14 as i16
        };
        report.mode_c = Some(ModeC {
            height_m: signed as f64 * (25.0 * 0.3048),
            validated: raw & 0x8000 != 0,
            garbled: raw & 0x4000 != 0,
        });
        true
    }
}

/// I001/130 — radar plot characteristics, FRN 6. Recognised but not
/// interpreted: a compound field whose subfields we don't decode, so we only
/// need to consume its declared extent.
struct RadarPlotCharacteristics;
impl FieldHandler<Asterix1Report> for RadarPlotCharacteristics {
    fn name(&self) -> &'static str {
        "I001/130"
    }
    fn mandatory(&self) -> bool {
        false
    }
    fn size(&self, data: &[u8]) -> usize {
        SizeRule::Extended {
            initial: 1,
            increment: 1,
        }
        .size(data)
    }
    fn decode(&self, _data: &[u8], _report: &mut Asterix1Report) -> bool {
        true
    }
}

/// I001/131 — received power, FRN 7. Size-only.
struct ReceivedPower;
impl FieldHandler<Asterix1Report> for ReceivedPower {
    fn name(&self) -> &'static str {
        "I001/131"
    }
    fn mandatory(&self) -> bool {
        false
    }
    fn size(&self, data: &[u8]) -> usize {
        SizeRule::Fixed(1).size(data)
    }
    fn decode(&self, _data: &[u8], _report: &mut Asterix1Report) -> bool {
        true
    }
}

/// I001/141 — truncated time of day, FRN 8.
struct TruncatedTimeOfDay;
impl FieldHandler<Asterix1Report> for TruncatedTimeOfDay {
    fn name(&self) -> &'static str {
        "I001/141"
    }
    fn mandatory(&self) -> bool {
        false
    }
    fn size(&self, data: &[u8]) -> usize {
        SizeRule::Fixed(2).size(data)
    }
    fn decode(&self, data: &[u8], report: &mut Asterix1Report) -> bool {
        report.lsp_clock = u16::from_be_bytes([data[0], data[1]]);
        report.has_lsp_clock = true;
        true
    }
}

/// I001/150 — mode of movement, FRN 9. Size-only.
struct ModeOfMovement;
impl FieldHandler<Asterix1Report> for ModeOfMovement {
    fn name(&self) -> &'static str {
        "I001/150"
    }
    fn mandatory(&self) -> bool {
        false
    }
    fn size(&self, data: &[u8]) -> usize {
        SizeRule::Fixed(1).size(data)
    }
    fn decode(&self, _data: &[u8], _report: &mut Asterix1Report) -> bool {
        true
    }
}

/// I001/050 — Mode-2 code in octal representation, FRN 10. Size-only.
struct Mode2Code;
impl FieldHandler<Asterix1Report> for Mode2Code {
    fn name(&self) -> &'static str {
        "I001/050"
    }
    fn mandatory(&self) -> bool {
        false
    }
    fn size(&self, data: &[u8]) -> usize {
        SizeRule::Fixed(2).size(data)
    }
    fn decode(&self, _data: &[u8], _report: &mut Asterix1Report) -> bool {
        true
    }
}

/// Reconciles a reference TOD from the source-state store (falling back to
/// the caller-supplied receive timestamp for a never-seen source), expands
/// the truncated clock against it when present, and records the result
/// (spec §4.2).
fn bookkeeping(report: &mut Asterix1Report, source_state: &SourceStateStore, receive_tod: u32) {
    let reference = source_state.get(report.source_id).unwrap_or(receive_tod);
    let tod = if report.has_lsp_clock {
        reconcile_tod(report.lsp_clock, reference)
    } else {
        reference
    };
    report.tod = tod;
    source_state.insert_or_update(report.source_id, tod);
}

/// Builds a fully wired CAT 001 category handler: every FRN from the table
/// above, sharing `source_state` and `diagnostics` with the rest of the
/// dispatcher.
pub fn register(
    source_state: Arc<SourceStateStore>,
    diagnostics: Arc<Diagnostics>,
) -> CategoryHandler<Asterix1Report> {
    CategoryHandlerBuilder::new()
        .add_handler(1, Arc::new(SourceIdentifier))
        .add_handler(2, Arc::new(TargetReportDescriptorField))
        .add_handler(3, Arc::new(PolarPosition))
        .add_handler(4, Arc::new(Mode3AField))
        .add_handler(5, Arc::new(ModeCField))
        .add_handler(6, Arc::new(RadarPlotCharacteristics))
        .add_handler(7, Arc::new(ReceivedPower))
        .add_handler(8, Arc::new(TruncatedTimeOfDay))
        .add_handler(9, Arc::new(ModeOfMovement))
        .add_handler(10, Arc::new(Mode2Code))
        .build(source_state, diagnostics, Box::new(bookkeeping))
}
