/*
 * Copyright Ballast Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The common client request object.

use ballast_types::retry::RetryConfig;
use http::Uri;

/// A common client request, suitable for any communication protocol.
///
/// The value is immutable: the `with_*` methods are used while assembling a
/// request, and [`ClientRequest::replace_uri`] produces the copy the load
/// balancer needs once it has chosen a concrete server. A request may carry
/// its own [`RetryConfig`], which a request-scoped retry policy reads as its
/// override source.
#[derive(Clone, Debug)]
pub struct ClientRequest {
    uri: Uri,
    load_balancer_key: Option<String>,
    retriable: Option<bool>,
    override_config: Option<RetryConfig>,
}

impl ClientRequest {
    /// Create a request for `uri`.
    pub fn new(uri: Uri) -> Self {
        Self {
            uri,
            load_balancer_key: None,
            retriable: None,
            override_config: None,
        }
    }

    /// Sets the key the load balancer uses when choosing a server for this
    /// request.
    pub fn with_load_balancer_key(mut self, key: impl Into<String>) -> Self {
        self.load_balancer_key = Some(key.into());
        self
    }

    /// Sets whether the operation behind this request is safe to retry.
    pub fn with_retriable(mut self, retriable: bool) -> Self {
        self.retriable = Some(retriable);
        self
    }

    /// Sets retry configuration that applies to this request only.
    pub fn with_override_config(mut self, config: RetryConfig) -> Self {
        self.override_config = Some(config);
        self
    }

    /// The request URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The key the load balancer uses when choosing a server, if any.
    pub fn load_balancer_key(&self) -> Option<&str> {
        self.load_balancer_key.as_deref()
    }

    /// Whether the operation behind this request is known to be safe to
    /// retry. Unset means it is not.
    pub fn is_retriable(&self) -> bool {
        self.retriable == Some(true)
    }

    /// Retry configuration that applies to this request only, if any.
    pub fn override_config(&self) -> Option<&RetryConfig> {
        self.override_config.as_ref()
    }

    /// Create a copy of this request with a new URI.
    ///
    /// Used after server selection to point the request at the chosen
    /// server; every other field is preserved.
    pub fn replace_uri(&self, uri: Uri) -> Self {
        let mut request = self.clone();
        request.uri = uri;
        request
    }
}
