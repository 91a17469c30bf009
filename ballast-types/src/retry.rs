/*
 * Copyright Ballast Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! This module defines types that describe which failures may be retried and
//! how many attempts a load-balancing client is allowed to make.

use std::fmt;

/// A recognized class of failure.
///
/// Kinds are compared by identity, never by message text. The one containment
/// edge in the taxonomy is expressed by [`FailureKind::is_within`]: a refused
/// connection is itself a socket-level I/O failure.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FailureKind {
    /// The remote host actively refused the connection.
    ConnectionRefused,

    /// A connect or read deadline elapsed before the server responded.
    Timeout,

    /// A socket-level I/O failure such as a reset or a broken pipe.
    Io,

    /// The server explicitly rejected the request to shed load.
    Throttling,
}

impl FailureKind {
    /// Returns true if `self` is `other` or a specialization of it.
    ///
    /// `ConnectionRefused` is within `Io`. `Timeout` is not: a request that
    /// timed out may still be running on the server, which matters to callers
    /// deciding whether the server itself is unhealthy.
    pub fn is_within(self, other: FailureKind) -> bool {
        self == other
            || matches!(
                (self, other),
                (FailureKind::ConnectionRefused, FailureKind::Io)
            )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::ConnectionRefused => write!(f, "connection refused"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Io => write!(f, "I/O failure"),
            FailureKind::Throttling => write!(f, "throttled by server"),
        }
    }
}

/// Implemented by error types that can advertise the failure class they
/// belong to.
pub trait ProvideFailureKind {
    /// Returns the [`FailureKind`], or `None` when the error is unclassified.
    fn failure_kind(&self) -> Option<FailureKind>;
}

/// Resolved retry configuration for a load-balancing client.
///
/// Every field is optional so that the same type serves two roles: as
/// client-level configuration, read with the documented defaults when a
/// policy is constructed, and as a request-level override source, where only
/// explicitly set values take effect. Values arrive already typed — this
/// crate never reads a configuration source.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RetryConfig {
    retry_enabled: Option<bool>,
    max_retries_same_server: Option<u32>,
    max_retries_next_server: Option<u32>,
    ok_to_retry_on_connect_errors: Option<bool>,
    ok_to_retry_on_all_errors: Option<bool>,
}

impl RetryConfig {
    /// Default for [`RetryConfig::retry_enabled`].
    pub const DEFAULT_RETRY_ENABLED: bool = false;
    /// Default for [`RetryConfig::max_retries_same_server`].
    pub const DEFAULT_MAX_RETRIES_SAME_SERVER: u32 = 0;
    /// Default for [`RetryConfig::max_retries_next_server`].
    pub const DEFAULT_MAX_RETRIES_NEXT_SERVER: u32 = 1;
    /// Default for [`RetryConfig::ok_to_retry_on_connect_errors`].
    pub const DEFAULT_OK_TO_RETRY_ON_CONNECT_ERRORS: bool = false;
    /// Default for [`RetryConfig::ok_to_retry_on_all_errors`].
    pub const DEFAULT_OK_TO_RETRY_ON_ALL_ERRORS: bool = false;

    /// Create a new `RetryConfig` with no values set.
    pub fn new() -> Self {
        Default::default()
    }

    /// Create a new [`RetryConfigBuilder`].
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Whether failed requests may be retried at all, if set.
    pub fn retry_enabled(&self) -> Option<bool> {
        self.retry_enabled
    }

    /// Whether failed requests may be retried at all, applying the default
    /// (`false`) when unset.
    pub fn retry_enabled_or_default(&self) -> bool {
        self.retry_enabled.unwrap_or(Self::DEFAULT_RETRY_ENABLED)
    }

    /// The number of retries allowed against the server that just failed, if
    /// set.
    pub fn max_retries_same_server(&self) -> Option<u32> {
        self.max_retries_same_server
    }

    /// The number of retries allowed against the server that just failed,
    /// applying the default (`0`) when unset.
    pub fn max_retries_same_server_or_default(&self) -> u32 {
        self.max_retries_same_server
            .unwrap_or(Self::DEFAULT_MAX_RETRIES_SAME_SERVER)
    }

    /// The number of different servers the request may move on to, if set.
    pub fn max_retries_next_server(&self) -> Option<u32> {
        self.max_retries_next_server
    }

    /// The number of different servers the request may move on to, applying
    /// the default (`1`) when unset.
    pub fn max_retries_next_server_or_default(&self) -> u32 {
        self.max_retries_next_server
            .unwrap_or(Self::DEFAULT_MAX_RETRIES_NEXT_SERVER)
    }

    /// Whether connection-related transport failures may be retried, if set.
    pub fn ok_to_retry_on_connect_errors(&self) -> Option<bool> {
        self.ok_to_retry_on_connect_errors
    }

    /// Whether connection-related transport failures may be retried, applying
    /// the default (`false`) when unset.
    pub fn ok_to_retry_on_connect_errors_or_default(&self) -> bool {
        self.ok_to_retry_on_connect_errors
            .unwrap_or(Self::DEFAULT_OK_TO_RETRY_ON_CONNECT_ERRORS)
    }

    /// Whether every failure may be retried regardless of its class, if set.
    pub fn ok_to_retry_on_all_errors(&self) -> Option<bool> {
        self.ok_to_retry_on_all_errors
    }

    /// Whether every failure may be retried regardless of its class, applying
    /// the default (`false`) when unset.
    pub fn ok_to_retry_on_all_errors_or_default(&self) -> bool {
        self.ok_to_retry_on_all_errors
            .unwrap_or(Self::DEFAULT_OK_TO_RETRY_ON_ALL_ERRORS)
    }
}

/// A builder for [`RetryConfig`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RetryConfigBuilder {
    retry_enabled: Option<bool>,
    max_retries_same_server: Option<u32>,
    max_retries_next_server: Option<u32>,
    ok_to_retry_on_connect_errors: Option<bool>,
    ok_to_retry_on_all_errors: Option<bool>,
}

impl RetryConfigBuilder {
    /// Create a new builder with no values set.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets whether failed requests may be retried at all.
    pub fn retry_enabled(mut self, retry_enabled: bool) -> Self {
        self.set_retry_enabled(Some(retry_enabled));
        self
    }

    /// Sets whether failed requests may be retried at all.
    pub fn set_retry_enabled(&mut self, retry_enabled: Option<bool>) -> &mut Self {
        self.retry_enabled = retry_enabled;
        self
    }

    /// Sets the number of retries allowed against the server that just
    /// failed.
    pub fn max_retries_same_server(mut self, max_retries: u32) -> Self {
        self.set_max_retries_same_server(Some(max_retries));
        self
    }

    /// Sets the number of retries allowed against the server that just
    /// failed.
    pub fn set_max_retries_same_server(&mut self, max_retries: Option<u32>) -> &mut Self {
        self.max_retries_same_server = max_retries;
        self
    }

    /// Sets the number of different servers the request may move on to.
    pub fn max_retries_next_server(mut self, max_retries: u32) -> Self {
        self.set_max_retries_next_server(Some(max_retries));
        self
    }

    /// Sets the number of different servers the request may move on to.
    pub fn set_max_retries_next_server(&mut self, max_retries: Option<u32>) -> &mut Self {
        self.max_retries_next_server = max_retries;
        self
    }

    /// Sets whether connection-related transport failures may be retried.
    pub fn ok_to_retry_on_connect_errors(mut self, ok: bool) -> Self {
        self.set_ok_to_retry_on_connect_errors(Some(ok));
        self
    }

    /// Sets whether connection-related transport failures may be retried.
    pub fn set_ok_to_retry_on_connect_errors(&mut self, ok: Option<bool>) -> &mut Self {
        self.ok_to_retry_on_connect_errors = ok;
        self
    }

    /// Sets whether every failure may be retried regardless of its class.
    pub fn ok_to_retry_on_all_errors(mut self, ok: bool) -> Self {
        self.set_ok_to_retry_on_all_errors(Some(ok));
        self
    }

    /// Sets whether every failure may be retried regardless of its class.
    pub fn set_ok_to_retry_on_all_errors(&mut self, ok: Option<bool>) -> &mut Self {
        self.ok_to_retry_on_all_errors = ok;
        self
    }

    /// Build a [`RetryConfig`].
    pub fn build(self) -> RetryConfig {
        RetryConfig {
            retry_enabled: self.retry_enabled,
            max_retries_same_server: self.max_retries_same_server,
            max_retries_next_server: self.max_retries_next_server,
            ok_to_retry_on_connect_errors: self.ok_to_retry_on_connect_errors,
            ok_to_retry_on_all_errors: self.ok_to_retry_on_all_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FailureKind, RetryConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn unset_config_applies_documented_defaults() {
        let config = RetryConfig::new();
        assert_eq!(None, config.retry_enabled());
        assert_eq!(None, config.max_retries_same_server());
        assert_eq!(None, config.max_retries_next_server());
        assert!(!config.retry_enabled_or_default());
        assert_eq!(0, config.max_retries_same_server_or_default());
        assert_eq!(1, config.max_retries_next_server_or_default());
        assert!(!config.ok_to_retry_on_connect_errors_or_default());
        assert!(!config.ok_to_retry_on_all_errors_or_default());
    }

    #[test]
    fn set_values_shadow_defaults() {
        let config = RetryConfig::builder()
            .retry_enabled(true)
            .max_retries_same_server(2)
            .max_retries_next_server(3)
            .build();
        assert_eq!(Some(true), config.retry_enabled());
        assert_eq!(Some(2), config.max_retries_same_server());
        assert_eq!(2, config.max_retries_same_server_or_default());
        assert_eq!(3, config.max_retries_next_server_or_default());
    }

    #[test]
    fn explicit_zero_is_distinct_from_unset() {
        let config = RetryConfig::builder().max_retries_next_server(0).build();
        assert_eq!(Some(0), config.max_retries_next_server());
        assert_eq!(0, config.max_retries_next_server_or_default());
    }

    #[test]
    fn fluent_and_setter_forms_agree() {
        let fluent = RetryConfig::builder().retry_enabled(true).build();
        let mut builder = RetryConfig::builder();
        builder.set_retry_enabled(Some(true));
        assert_eq!(fluent, builder.build());
    }

    #[test]
    fn connection_refused_is_within_io() {
        assert!(FailureKind::ConnectionRefused.is_within(FailureKind::Io));
        assert!(!FailureKind::Io.is_within(FailureKind::ConnectionRefused));
        assert!(!FailureKind::Timeout.is_within(FailureKind::Io));
        for kind in [
            FailureKind::ConnectionRefused,
            FailureKind::Timeout,
            FailureKind::Io,
            FailureKind::Throttling,
        ] {
            assert!(kind.is_within(kind));
        }
    }
}
