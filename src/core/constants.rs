// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire-level constants shared by every category (ASTERIX Part 1, Annex A).

/// Bytes in a block header: category (1) + declared length (2, big-endian).
pub const HEADER_SIZE: usize = 3;

/// Smallest buffer that could possibly hold a block (header + 1-byte FSPEC + 1 payload byte).
pub const MIN_BLOCK_SIZE: usize = 5;

/// Upper bound on FSPEC extension bytes per record (permits FRNs up to 70).
pub const MAX_FSPEC_BYTES: usize = 10;

/// Upper bound on field record numbers addressable within a single record.
///
/// The tighter of this and [`MAX_FSPEC_BYTES`] applies; see
/// [`crate::core::dispatcher::dispatch_record`] for the 19-byte check that enforces it.
pub const MAX_FRNS: usize = 128;

/// Number of distinct ASTERIX categories (`u8` range).
pub const MAX_CATEGORIES: usize = 256;
