// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decoder for ASTERIX surveillance feeds.
//!
//! Turns concatenated binary blocks emitted by air-traffic radar and service
//! sensors into typed, category-specific reports. The crate is a decoder
//! only: callers own network receive, logging configuration, and whatever
//! they do with decoded reports. See [`core::PacketDispatcher`] for the
//! top-level entry point and [`cat001`]/[`cat002`] for the two categories
//! shipped as worked examples.
//!
//! ```no_run
//! use std::sync::Arc;
//! use asterix_decode::core::{PacketDispatcher, SourceStateStore};
//!
//! let dispatcher = PacketDispatcher::new();
//! let source_state = Arc::new(SourceStateStore::new());
//! dispatcher.register_category(1, Arc::new(asterix_decode::cat001::register(source_state.clone(), dispatcher.diagnostics())));
//! dispatcher.handle_packet(&[0x01, 0x00, 0x05, 0x80, 0x00], 0);
//! ```

pub mod cat001;
pub mod cat002;
pub mod core;
pub mod logging;
