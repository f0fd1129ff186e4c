//! Fixed product-name to origin-region lookup
//!
//! The trading business sources each fruit from a fixed region; when a
//! product name is recognized the origin is derived automatically and any
//! caller-supplied value is ignored. Unknown products fall back to the
//! caller-supplied value.

/// Known product origins. Immutable; extend here when a new product line is
/// sourced.
const PRODUCT_ORIGINS: &[(&str, &str)] = &[
    ("Apple", "Kashmir"),
    ("Banana", "Kerala"),
    ("Orange", "Nagpur"),
    ("Mango", "Uttar Pradesh"),
    ("Grapes", "Maharashtra"),
    ("Pomegranate", "Maharashtra"),
];

/// Look up the fixed origin region for a product name.
///
/// Matching is exact and case-sensitive.
pub fn origin_for(product_name: &str) -> Option<&'static str> {
    PRODUCT_ORIGINS
        .iter()
        .find(|(name, _)| *name == product_name)
        .map(|(_, origin)| *origin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_products_resolve() {
        assert_eq!(origin_for("Apple"), Some("Kashmir"));
        assert_eq!(origin_for("Banana"), Some("Kerala"));
        assert_eq!(origin_for("Orange"), Some("Nagpur"));
        assert_eq!(origin_for("Mango"), Some("Uttar Pradesh"));
        assert_eq!(origin_for("Grapes"), Some("Maharashtra"));
        assert_eq!(origin_for("Pomegranate"), Some("Maharashtra"));
    }

    #[test]
    fn unknown_products_fall_through() {
        assert_eq!(origin_for("Durian"), None);
        // Lookup is case-sensitive
        assert_eq!(origin_for("apple"), None);
    }
}
