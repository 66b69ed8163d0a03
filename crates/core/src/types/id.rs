//! Newtype IDs for type-safe catalog references.
//!
//! The menu backend assigns ids itself and is not consistent about their
//! JSON type: rows come back with numeric ids, hand-edited entries with
//! string ids. [`RawId`] keeps whichever form arrived so that the id is sent
//! back to the backend unchanged.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A source-assigned identifier, numeric or textual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around [`RawId`] with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Constructors `numeric()` and `text()`
/// - `matches()` for comparing against a form value
/// - `From<i64>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use comanda_core::define_id;
/// define_id!(TableId);
///
/// let id = TableId::numeric(7);
/// assert!(id.matches("7"));
/// assert_eq!(id.to_string(), "7");
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name($crate::types::id::RawId);

        impl $name {
            /// Create an ID from a numeric value.
            #[must_use]
            pub const fn numeric(id: i64) -> Self {
                Self($crate::types::id::RawId::Numeric(id))
            }

            /// Create an ID from a textual value.
            #[must_use]
            pub fn text(id: impl Into<String>) -> Self {
                Self($crate::types::id::RawId::Text(id.into()))
            }

            /// Get the underlying raw value.
            #[must_use]
            pub const fn as_raw(&self) -> &$crate::types::id::RawId {
                &self.0
            }

            /// Whether this ID renders as `raw`.
            ///
            /// Form fields carry ids as text, so a numeric id and its decimal
            /// rendering are considered the same reference.
            #[must_use]
            pub fn matches(&self, raw: &str) -> bool {
                match &self.0 {
                    $crate::types::id::RawId::Numeric(id) => {
                        raw.trim().parse::<i64>().is_ok_and(|parsed| parsed == *id)
                    }
                    $crate::types::id::RawId::Text(id) => id == raw,
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self::numeric(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::text(id)
            }
        }
    };
}

define_id!(CategoryId);
define_id!(ProductId);
define_id!(PromotionId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_and_text_ids_keep_their_json_form() {
        let numeric: ProductId = serde_json::from_str("12").unwrap();
        let text: ProductId = serde_json::from_str("\"Pizza Muzza\"").unwrap();

        assert_eq!(numeric, ProductId::numeric(12));
        assert_eq!(text, ProductId::text("Pizza Muzza"));
        assert_eq!(serde_json::to_string(&numeric).unwrap(), "12");
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"Pizza Muzza\"");
    }

    #[test]
    fn test_matches_form_values() {
        assert!(CategoryId::numeric(3).matches("3"));
        assert!(CategoryId::numeric(3).matches(" 3 "));
        assert!(!CategoryId::numeric(3).matches("03a"));
        assert!(CategoryId::text("pizzas").matches("pizzas"));
        assert!(!CategoryId::text("pizzas").matches("Pizzas"));
    }

    #[test]
    fn test_display() {
        assert_eq!(PromotionId::numeric(5).to_string(), "5");
        assert_eq!(PromotionId::text("jueves").to_string(), "jueves");
    }
}
