/*
 * Copyright Ballast Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Retry policies for the load-balancing client.
//!
//! A policy answers four questions about a failed attempt: may it be retried
//! on the server that just failed, may it be retried on a different server,
//! how many attempts does each direction allow, and should the failure count
//! against the failing server's health so the balancer can avoid it. The
//! last question is deliberately independent of the first two: a caller may
//! decline to retry and still want the server marked unhealthy.
//!
//! Policies are frozen at construction and every query is a `&self` read, so
//! a single policy may be consulted from any number of call sites without
//! locking.

pub mod cause;
pub mod policy;

use crate::client::retries::policy::DefaultRetryPolicy;
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Decides whether a failure is retriable for the load balancer, and whether
/// it should be treated as circuit related so the balancer can avoid the
/// server.
pub trait RetryPolicy: Send + Sync + fmt::Debug {
    /// Test if a failure is retriable.
    ///
    /// If `same_server` is true, the method determines whether retry can be
    /// done on the server that just failed. Otherwise, it tests whether the
    /// request may fall through to a different server. An absent failure is
    /// never retriable.
    fn is_retriable(&self, failure: Option<&(dyn StdError + 'static)>, same_server: bool) -> bool;

    /// Test if a failure should count against the failing server's health.
    ///
    /// Successive failures of this class should trip the circuit breaker to
    /// a particular host. The answer does not depend on whether the caller
    /// chooses to retry.
    fn is_circuit_tripping(&self, failure: Option<&(dyn StdError + 'static)>) -> bool;

    /// Number of retries allowed against the server that just failed.
    fn max_retries_same_server(&self) -> u32;

    /// Number of different servers the request may move on to.
    fn max_retries_next_server(&self) -> u32;
}

/// Shared retry policy.
///
/// The handle is cheap to clone, and many request-scoped policies may hold
/// the same fallback through it concurrently.
#[derive(Clone, Debug)]
pub struct SharedRetryPolicy(Arc<dyn RetryPolicy>);

impl SharedRetryPolicy {
    /// Given a [`RetryPolicy`] trait object, create a new `SharedRetryPolicy`.
    pub fn new(policy: impl RetryPolicy + 'static) -> Self {
        Self(Arc::new(policy))
    }
}

static DEFAULT_POLICY: LazyLock<SharedRetryPolicy> =
    LazyLock::new(|| SharedRetryPolicy::new(DefaultRetryPolicy::default()));

impl Default for SharedRetryPolicy {
    /// A handle to the process-wide [`DefaultRetryPolicy`] with retry
    /// disabled. Every request-scoped policy constructed without an explicit
    /// fallback shares this one instance.
    fn default() -> Self {
        DEFAULT_POLICY.clone()
    }
}

impl RetryPolicy for SharedRetryPolicy {
    fn is_retriable(&self, failure: Option<&(dyn StdError + 'static)>, same_server: bool) -> bool {
        self.0.is_retriable(failure, same_server)
    }

    fn is_circuit_tripping(&self, failure: Option<&(dyn StdError + 'static)>) -> bool {
        self.0.is_circuit_tripping(failure)
    }

    fn max_retries_same_server(&self) -> u32 {
        self.0.max_retries_same_server()
    }

    fn max_retries_next_server(&self) -> u32 {
        self.0.max_retries_next_server()
    }
}
