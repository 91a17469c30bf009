/*
 * Copyright Ballast Contributors. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Resolution of logical VIP addresses.
//!
//! A VIP address is a logical name for a target server farm, for example
//! `${env}-billing.${region}.example.internal:7001`. Resolution substitutes
//! deployment values into the macros; it never touches a name service.

use std::collections::HashMap;

/// Resolves a VIP address into its concrete form.
pub trait ResolveVipAddress {
    /// Resolve `vip_address`, substituting values from `substitutions`.
    fn resolve(&self, vip_address: &str, substitutions: &HashMap<String, String>) -> String;
}

/// A resolver that replaces `${name}` macros with values from the
/// substitution map.
///
/// Unknown macros are left intact so a missing deployment value surfaces in
/// the resolved address instead of silently vanishing. Comma-separated VIP
/// lists resolve element-wise for free, since substitution is positional.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimpleVipAddressResolver;

impl ResolveVipAddress for SimpleVipAddressResolver {
    fn resolve(&self, vip_address: &str, substitutions: &HashMap<String, String>) -> String {
        let mut resolved = String::with_capacity(vip_address.len());
        let mut rest = vip_address;
        while let Some(start) = rest.find("${") {
            resolved.push_str(&rest[..start]);
            let macro_body = &rest[start + 2..];
            match macro_body.find('}') {
                Some(end) => {
                    let name = &macro_body[..end];
                    match substitutions.get(name) {
                        Some(value) => resolved.push_str(value),
                        None => {
                            resolved.push_str("${");
                            resolved.push_str(name);
                            resolved.push('}');
                        }
                    }
                    rest = &macro_body[end + 1..];
                }
                None => {
                    // unterminated macro, emit as-is
                    resolved.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        resolved.push_str(rest);
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::{ResolveVipAddress, SimpleVipAddressResolver};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn substitutions() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("env".to_string(), "prod".to_string());
        map.insert("region".to_string(), "us-east-1".to_string());
        map
    }

    #[test]
    fn macros_are_substituted() {
        let resolver = SimpleVipAddressResolver;
        assert_eq!(
            "prod-billing.us-east-1.example.internal:7001",
            resolver.resolve(
                "${env}-billing.${region}.example.internal:7001",
                &substitutions()
            )
        );
    }

    #[test]
    fn unknown_macros_are_left_intact() {
        let resolver = SimpleVipAddressResolver;
        assert_eq!(
            "prod-billing.${zone}.example.internal",
            resolver.resolve("${env}-billing.${zone}.example.internal", &substitutions())
        );
    }

    #[test]
    fn vip_lists_resolve_element_wise() {
        let resolver = SimpleVipAddressResolver;
        assert_eq!(
            "billing.us-east-1.internal:7001,billing-prod:7001",
            resolver.resolve("billing.${region}.internal:7001,billing-${env}:7001", &substitutions())
        );
    }

    #[test]
    fn plain_addresses_and_unterminated_macros_pass_through() {
        let resolver = SimpleVipAddressResolver;
        assert_eq!(
            "billing.internal:7001",
            resolver.resolve("billing.internal:7001", &substitutions())
        );
        assert_eq!(
            "billing-${env.internal",
            resolver.resolve("billing-${env.internal", &substitutions())
        );
    }
}
