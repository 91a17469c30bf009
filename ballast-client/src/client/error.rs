/*
 * Copyright Ballast Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The failure taxonomy the retry policies classify.
//!
//! Two families of errors exist: [`TransportError`], a raw transport-level
//! failure raised below the client (refused connections, timeouts, socket
//! I/O), and [`ClientError`], a structured failure raised by the client
//! framework itself (throttling, exhausted retries, misconfiguration). Both
//! advertise a [`FailureKind`] through [`ProvideFailureKind`] so that
//! policies can match them by class rather than by message text.

use crate::box_error::BoxError;
use ballast_types::retry::{FailureKind, ProvideFailureKind};
use std::error::Error as StdError;
use std::fmt;

/// A raw transport-level failure.
///
/// Wraps the underlying error from the connection layer and tags it with the
/// failure class the policies understand. Unrecognized transport failures are
/// constructed with [`TransportError::other`], optionally carrying an
/// explicit class chosen by the caller.
#[derive(Debug)]
pub struct TransportError {
    kind: TransportErrorKind,
    source: BoxError,
}

#[derive(Debug)]
enum TransportErrorKind {
    ConnectionRefused,
    Timeout,
    Io,
    Other(Option<FailureKind>),
}

impl TransportError {
    /// The remote host actively refused the connection.
    pub fn connection_refused(source: impl Into<BoxError>) -> Self {
        Self {
            kind: TransportErrorKind::ConnectionRefused,
            source: source.into(),
        }
    }

    /// A connect or read deadline elapsed before the server responded.
    pub fn timeout(source: impl Into<BoxError>) -> Self {
        Self {
            kind: TransportErrorKind::Timeout,
            source: source.into(),
        }
    }

    /// A socket-level I/O failure such as a reset or a broken pipe.
    pub fn io(source: impl Into<BoxError>) -> Self {
        Self {
            kind: TransportErrorKind::Io,
            source: source.into(),
        }
    }

    /// A transport failure outside the recognized classes.
    ///
    /// `kind` lets the caller attach a failure class when it knows better
    /// than the transport did.
    pub fn other(source: impl Into<BoxError>, kind: Option<FailureKind>) -> Self {
        Self {
            kind: TransportErrorKind::Other(kind),
            source: source.into(),
        }
    }

    /// Returns true if this is a refused-connection failure.
    pub fn is_connection_refused(&self) -> bool {
        matches!(self.kind, TransportErrorKind::ConnectionRefused)
    }

    /// Returns true if this is a timeout failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, TransportErrorKind::Timeout)
    }

    /// Returns true if this is a socket-level I/O failure.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, TransportErrorKind::Io)
    }
}

impl ProvideFailureKind for TransportError {
    fn failure_kind(&self) -> Option<FailureKind> {
        match self.kind {
            TransportErrorKind::ConnectionRefused => Some(FailureKind::ConnectionRefused),
            TransportErrorKind::Timeout => Some(FailureKind::Timeout),
            TransportErrorKind::Io => Some(FailureKind::Io),
            TransportErrorKind::Other(kind) => kind,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TransportErrorKind::ConnectionRefused => write!(f, "connection refused"),
            TransportErrorKind::Timeout => write!(f, "timeout"),
            TransportErrorKind::Io => write!(f, "io error"),
            TransportErrorKind::Other(_) => write!(f, "transport error"),
        }
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

/// A structured failure raised by the client framework itself.
///
/// Policies treat these as non-transient: a structured error is the client
/// reporting a condition, not the network misbehaving. The one exception is
/// [`ClientErrorKind::ServerThrottled`], which request-scoped policies
/// recognize as "retry, but only somewhere else".
#[derive(Debug)]
pub struct ClientError {
    kind: ClientErrorKind,
    message: Option<String>,
    source: Option<BoxError>,
}

/// The kind of [`ClientError`].
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ClientErrorKind {
    /// A failure with no more specific classification.
    General,

    /// The client was misconfigured.
    Configuration,

    /// The server explicitly rejected the request to shed load.
    ServerThrottled,

    /// The client rejected the request before sending it to bound its own
    /// outbound rate.
    ClientThrottled,

    /// Allowed retries on the same server were exhausted without success.
    RetriesExceeded,

    /// Allowed retries on different servers were exhausted without success.
    NextServerRetriesExceeded,

    /// The load balancer had no server to offer.
    NoAvailableServers,
}

impl ClientError {
    /// Create a new `ClientError` of the given kind.
    pub fn new(kind: ClientErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Attach a human-readable message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The kind of this error.
    pub fn kind(&self) -> ClientErrorKind {
        self.kind
    }

    /// The attached message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl ProvideFailureKind for ClientError {
    fn failure_kind(&self) -> Option<FailureKind> {
        match self.kind {
            ClientErrorKind::ServerThrottled => Some(FailureKind::Throttling),
            _ => None,
        }
    }
}

impl fmt::Display for ClientErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientErrorKind::General => write!(f, "general failure"),
            ClientErrorKind::Configuration => write!(f, "client misconfigured"),
            ClientErrorKind::ServerThrottled => write!(f, "throttled by server"),
            ClientErrorKind::ClientThrottled => write!(f, "throttled by client"),
            ClientErrorKind::RetriesExceeded => write!(f, "retries on same server exceeded"),
            ClientErrorKind::NextServerRetriesExceeded => {
                write!(f, "retries on next server exceeded")
            }
            ClientErrorKind::NoAvailableServers => write!(f, "no available servers"),
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.kind, message),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl StdError for ClientError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_deref().map(|err| err as _)
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientError, ClientErrorKind, TransportError};
    use ballast_types::retry::{FailureKind, ProvideFailureKind};
    use std::error::Error as StdError;

    #[test]
    fn transport_errors_advertise_their_class() {
        assert_eq!(
            Some(FailureKind::ConnectionRefused),
            TransportError::connection_refused("ECONNREFUSED").failure_kind()
        );
        assert_eq!(
            Some(FailureKind::Timeout),
            TransportError::timeout("read timed out").failure_kind()
        );
        assert_eq!(
            Some(FailureKind::Io),
            TransportError::io("connection reset by peer").failure_kind()
        );
        assert_eq!(
            None,
            TransportError::other("tls alert", None).failure_kind()
        );
        assert_eq!(
            Some(FailureKind::Timeout),
            TransportError::other("deadline elapsed", Some(FailureKind::Timeout)).failure_kind()
        );
    }

    #[test]
    fn only_server_throttling_is_a_throttling_class() {
        assert_eq!(
            Some(FailureKind::Throttling),
            ClientError::new(ClientErrorKind::ServerThrottled).failure_kind()
        );
        assert_eq!(
            None,
            ClientError::new(ClientErrorKind::ClientThrottled).failure_kind()
        );
        assert_eq!(None, ClientError::new(ClientErrorKind::General).failure_kind());
    }

    #[test]
    fn sources_chain() {
        let err = ClientError::new(ClientErrorKind::General)
            .with_source(TransportError::io("broken pipe"));
        let source = err.source().expect("source attached");
        assert!(source.downcast_ref::<TransportError>().is_some());
        assert!(ClientError::new(ClientErrorKind::General).source().is_none());
    }

    #[test]
    fn display_includes_kind_and_message() {
        let err = ClientError::new(ClientErrorKind::ServerThrottled).with_message("429 from peer");
        assert_eq!("throttled by server: 429 from peer", err.to_string());
        assert_eq!("no available servers", ClientError::new(ClientErrorKind::NoAvailableServers).to_string());
        assert_eq!("timeout", TransportError::timeout("x").to_string());
    }
}
