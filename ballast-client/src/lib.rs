/*
 * Copyright Ballast Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Retry and failure classification for a client-side load-balancing layer.
//!
//! Given a failed attempt against a remote server, the policies in this crate
//! decide whether the failure may be retried against the same server or a
//! different one, how many attempts each direction allows, and whether the
//! failure should count against the failing server's health. The crate
//! performs no I/O and holds no mutable state: every policy is a frozen value
//! queried by an external retry loop.

#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod box_error;
pub mod client;
