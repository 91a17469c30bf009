/*
 * Copyright Ballast Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Response contract for the client framework.

use http::Uri;

/// A response as seen by the client framework, independent of the wire
/// protocol.
///
/// There is deliberately no status-code surface here: an HTTP client maps
/// its status line onto [`ClientResponse::is_success`], and other protocols
/// map whatever success notion they have.
pub trait ClientResponse {
    /// True if the response is deemed a success, for example a `200` for
    /// HTTP.
    fn is_success(&self) -> bool;

    /// The URI the request that produced this response was sent to, when the
    /// protocol tracks it.
    fn requested_uri(&self) -> Option<&Uri>;

    /// True if the response arrived with an entity.
    fn has_payload(&self) -> bool;

    /// Look up a response header by name, for protocols that have headers.
    fn header(&self, name: &str) -> Option<&str> {
        let _ = name;
        None
    }
}
