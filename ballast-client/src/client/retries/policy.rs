/*
 * Copyright Ballast Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The two built-in retry policies: a configuration-driven base policy and a
//! per-request policy that overrides it.

use crate::client::error::{ClientError, ClientErrorKind};
use crate::client::retries::cause::is_present_as_cause;
use crate::client::retries::{RetryPolicy, SharedRetryPolicy};
use ballast_types::retry::{FailureKind, RetryConfig};
use std::error::Error as StdError;
use tracing::{debug, trace};

/// Failure classes that may be retried against the server that raised them.
const RETRIABLE_KINDS: &[FailureKind] = &[FailureKind::ConnectionRefused, FailureKind::Timeout];

/// Failure classes that count against a server's health.
const CIRCUIT_TRIP_KINDS: &[FailureKind] = &[FailureKind::Io, FailureKind::Timeout];

/// Failure classes treated as connection-related by request-scoped policies.
const CONNECTION_RELATED_KINDS: &[FailureKind] = &[FailureKind::Io];

/// A default [`RetryPolicy`] driven by client-level configuration.
///
/// Classification is limited to the transport-level failure classes; clients
/// with a richer taxonomy should provide their own policy. With the policy
/// enabled, a retry on the same server requires the failure to have a
/// retriable cause, while a retry on a different server is always permitted:
/// the failing server's problem does not necessarily apply to a peer.
///
/// # Examples
/// ```
/// use ballast_client::client::error::TransportError;
/// use ballast_client::client::retries::policy::DefaultRetryPolicy;
/// use ballast_client::client::retries::RetryPolicy;
///
/// let policy = DefaultRetryPolicy::new(2, 1, true);
/// let failure = TransportError::timeout("read timed out");
/// assert!(policy.is_retriable(Some(&failure), true));
/// assert!(policy.is_circuit_tripping(Some(&failure)));
/// assert_eq!(2, policy.max_retries_same_server());
/// ```
#[derive(Clone, Debug)]
pub struct DefaultRetryPolicy {
    max_retries_same_server: u32,
    max_retries_next_server: u32,
    retry_enabled: bool,
}

impl Default for DefaultRetryPolicy {
    /// A policy with retry disabled and no attempts allowed.
    fn default() -> Self {
        Self::new(0, 0, false)
    }
}

impl DefaultRetryPolicy {
    /// Create a policy from explicit values.
    pub fn new(max_retries_same_server: u32, max_retries_next_server: u32, retry_enabled: bool) -> Self {
        Self {
            max_retries_same_server,
            max_retries_next_server,
            retry_enabled,
        }
    }

    /// Create a policy from resolved client configuration, applying the
    /// documented defaults for unset values.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries_same_server: config.max_retries_same_server_or_default(),
            max_retries_next_server: config.max_retries_next_server_or_default(),
            retry_enabled: config.retry_enabled_or_default(),
        }
    }
}

impl RetryPolicy for DefaultRetryPolicy {
    fn is_retriable(&self, failure: Option<&(dyn StdError + 'static)>, same_server: bool) -> bool {
        if !self.retry_enabled {
            return false;
        }
        let Some(failure) = failure else {
            return false;
        };
        if same_server {
            is_present_as_cause(Some(failure), RETRIABLE_KINDS)
        } else {
            true
        }
    }

    fn is_circuit_tripping(&self, failure: Option<&(dyn StdError + 'static)>) -> bool {
        // Not gated on `retry_enabled`: server health is classified whether
        // or not the caller retries.
        is_present_as_cause(failure, CIRCUIT_TRIP_KINDS)
    }

    fn max_retries_same_server(&self) -> u32 {
        self.max_retries_same_server
    }

    fn max_retries_next_server(&self) -> u32 {
        self.max_retries_next_server
    }
}

/// A [`RetryPolicy`] created for each request, allowing request-specific
/// overrides of the client-level policy it wraps.
///
/// The overrides reach retry eligibility and the two retry limits only;
/// circuit-trip classification always comes from the fallback, so a request
/// can never change how server health is judged.
#[derive(Debug)]
pub struct RequestRetryPolicy {
    fallback: SharedRetryPolicy,
    max_retries_same_server: Option<u32>,
    max_retries_next_server: Option<u32>,
    ok_to_retry_on_connect_errors: bool,
    ok_to_retry_on_all_errors: bool,
}

impl RequestRetryPolicy {
    /// Create a policy over the shared default fallback with no limit
    /// overrides.
    pub fn new(ok_to_retry_on_connect_errors: bool, ok_to_retry_on_all_errors: bool) -> Self {
        Self::with_fallback(
            ok_to_retry_on_connect_errors,
            ok_to_retry_on_all_errors,
            SharedRetryPolicy::default(),
            None,
        )
    }

    /// Create a policy over an explicit fallback.
    ///
    /// Limit values set in `request_config` become overrides for this one
    /// request; unset values defer to the fallback at query time.
    pub fn with_fallback(
        ok_to_retry_on_connect_errors: bool,
        ok_to_retry_on_all_errors: bool,
        fallback: SharedRetryPolicy,
        request_config: Option<&RetryConfig>,
    ) -> Self {
        let max_retries_same_server = request_config.and_then(RetryConfig::max_retries_same_server);
        let max_retries_next_server = request_config.and_then(RetryConfig::max_retries_next_server);
        if max_retries_same_server.is_some() || max_retries_next_server.is_some() {
            debug!(
                ?max_retries_same_server,
                ?max_retries_next_server,
                "request overrides retry limits"
            );
        }
        Self {
            fallback,
            max_retries_same_server,
            max_retries_next_server,
            ok_to_retry_on_connect_errors,
            ok_to_retry_on_all_errors,
        }
    }

    /// Create a policy whose switches and limit overrides all come from
    /// request configuration, applying the documented defaults for the
    /// switches when unset.
    pub fn from_config(request_config: &RetryConfig, fallback: SharedRetryPolicy) -> Self {
        Self::with_fallback(
            request_config.ok_to_retry_on_connect_errors_or_default(),
            request_config.ok_to_retry_on_all_errors_or_default(),
            fallback,
            Some(request_config),
        )
    }

    /// Test whether `failure` has a connection-related cause.
    pub fn is_connection_related(&self, failure: Option<&(dyn StdError + 'static)>) -> bool {
        is_present_as_cause(failure, CONNECTION_RELATED_KINDS)
    }
}

impl RetryPolicy for RequestRetryPolicy {
    fn is_retriable(&self, failure: Option<&(dyn StdError + 'static)>, same_server: bool) -> bool {
        let Some(failure) = failure else {
            return false;
        };
        if self.ok_to_retry_on_all_errors {
            return true;
        }
        // Only the outermost error is considered here: a structured client
        // error wrapping a transport cause is still the client reporting a
        // condition, not the transport failing.
        if let Some(client_error) = failure.downcast_ref::<ClientError>() {
            return match client_error.kind() {
                // A throttled server gets no immediate second chance; the
                // request may only move on to a different one.
                ClientErrorKind::ServerThrottled => !same_server,
                kind => {
                    trace!(%kind, "structured client error is not retriable");
                    false
                }
            };
        }
        self.ok_to_retry_on_connect_errors && self.is_connection_related(Some(failure))
    }

    fn is_circuit_tripping(&self, failure: Option<&(dyn StdError + 'static)>) -> bool {
        self.fallback.is_circuit_tripping(failure)
    }

    fn max_retries_same_server(&self) -> u32 {
        match self.max_retries_same_server {
            Some(max_retries) => max_retries,
            None => self.fallback.max_retries_same_server(),
        }
    }

    fn max_retries_next_server(&self) -> u32 {
        match self.max_retries_next_server {
            Some(max_retries) => max_retries,
            None => self.fallback.max_retries_next_server(),
        }
    }
}
