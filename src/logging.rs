// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Optional decoder-internal tracing, layered over the `log` facade.
//!
//! Gated behind the `logging` feature so callers who don't want any logging
//! dependency pulled into their trace output don't pay for it: with the
//! feature off, every macro call compiles to nothing.

#[macro_export]
macro_rules! decoder_trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        log::trace!($($arg)*);
    };
}

#[macro_export]
macro_rules! decoder_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        log::debug!($($arg)*);
    };
}

#[macro_export]
macro_rules! decoder_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "logging")]
        log::warn!($($arg)*);
    };
}
