/*
 * Copyright Ballast Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Cause-chain inspection.
//!
//! A failure handed to a retry policy is usually several layers of wrapping
//! away from the error that actually describes what went wrong. The matcher
//! here walks the chain from the outermost error to the root cause and
//! reports whether any link belongs to a set of failure classes.

use crate::client::error::{ClientError, TransportError};
use ballast_types::retry::{FailureKind, ProvideFailureKind};
use std::error::Error as StdError;
use std::iter::successors;
use tracing::trace;

/// Upper bound on cause-chain traversal.
///
/// Well-formed chains are far shallower; the cap keeps a degenerate
/// self-referential chain from looping forever.
const MAX_CAUSE_DEPTH: usize = 32;

/// Classify a single error by the failure class it advertises.
///
/// Returns `None` for error types the client does not recognize.
pub fn failure_kind_of(err: &(dyn StdError + 'static)) -> Option<FailureKind> {
    if let Some(transport) = err.downcast_ref::<TransportError>() {
        return transport.failure_kind();
    }
    if let Some(client) = err.downcast_ref::<ClientError>() {
        return client.failure_kind();
    }
    None
}

/// Test whether any error in `failure`'s cause chain belongs to one of
/// `kinds`.
///
/// The chain is walked from the outermost error to the root cause and the
/// first classified link that is within any member of `kinds` wins. An
/// absent failure matches nothing.
pub fn is_present_as_cause(
    failure: Option<&(dyn StdError + 'static)>,
    kinds: &[FailureKind],
) -> bool {
    let matched = successors(failure, |&err| err.source())
        .take(MAX_CAUSE_DEPTH)
        .filter_map(failure_kind_of)
        .find(|found| kinds.iter().any(|kind| found.is_within(*kind)));
    if let Some(found) = matched {
        trace!(%found, "failure cause matched");
    }
    matched.is_some()
}

#[cfg(test)]
mod tests {
    use super::{failure_kind_of, is_present_as_cause, MAX_CAUSE_DEPTH};
    use crate::box_error::BoxError;
    use crate::client::error::{ClientError, ClientErrorKind, TransportError};
    use ballast_types::retry::FailureKind;
    use proptest::prelude::*;
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    struct Wrapper(BoxError);

    impl fmt::Display for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "wrapper")
        }
    }

    impl StdError for Wrapper {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(self.0.as_ref())
        }
    }

    fn wrap_n(err: impl Into<BoxError>, layers: usize) -> BoxError {
        let mut err = err.into();
        for _ in 0..layers {
            err = Box::new(Wrapper(err));
        }
        err
    }

    fn as_failure(err: &BoxError) -> &(dyn StdError + 'static) {
        err.as_ref()
    }

    #[test]
    fn match_three_levels_deep_is_found() {
        let failure = wrap_n(TransportError::timeout("read timed out"), 3);
        assert!(is_present_as_cause(
            Some(as_failure(&failure)),
            &[FailureKind::Timeout]
        ));
    }

    #[test]
    fn chain_without_match_is_rejected() {
        let failure = wrap_n(ClientError::new(ClientErrorKind::General), 3);
        assert!(!is_present_as_cause(
            Some(as_failure(&failure)),
            &[FailureKind::Timeout, FailureKind::Io]
        ));
    }

    #[test]
    fn absent_failure_matches_nothing() {
        assert!(!is_present_as_cause(None, &[FailureKind::Timeout]));
        assert!(!is_present_as_cause(None, &[]));
    }

    #[test]
    fn refused_connection_is_within_io() {
        let failure = wrap_n(TransportError::connection_refused("ECONNREFUSED"), 1);
        assert!(is_present_as_cause(
            Some(as_failure(&failure)),
            &[FailureKind::Io]
        ));
        // the reverse containment does not hold
        let failure = wrap_n(TransportError::io("connection reset"), 1);
        assert!(!is_present_as_cause(
            Some(as_failure(&failure)),
            &[FailureKind::ConnectionRefused]
        ));
    }

    #[test]
    fn traversal_stops_at_the_depth_cap() {
        let failure = wrap_n(TransportError::timeout("read timed out"), MAX_CAUSE_DEPTH + 8);
        assert!(!is_present_as_cause(
            Some(as_failure(&failure)),
            &[FailureKind::Timeout]
        ));
    }

    #[test]
    fn unclassified_nodes_are_skipped_not_fatal() {
        let failure: BoxError = Box::new(Wrapper(Box::new(Wrapper(Box::new(
            TransportError::io("broken pipe"),
        )))));
        assert_eq!(None, failure_kind_of(as_failure(&failure)));
        assert!(is_present_as_cause(
            Some(as_failure(&failure)),
            &[FailureKind::Io]
        ));
    }

    proptest! {
        #[test]
        fn match_is_found_at_any_depth_under_the_cap(layers in 0usize..MAX_CAUSE_DEPTH) {
            let failure = wrap_n(TransportError::timeout("read timed out"), layers);
            prop_assert!(is_present_as_cause(
                Some(as_failure(&failure)),
                &[FailureKind::Timeout]
            ));
            prop_assert!(!is_present_as_cause(
                Some(as_failure(&failure)),
                &[FailureKind::Throttling]
            ));
        }
    }
}
