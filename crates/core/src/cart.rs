//! Cart engine.
//!
//! A cart is an ordered list of lines. Insertion order is both display and
//! submission order. Lines always have quantity 1, so a line's price is also
//! its line total.

use serde::{Deserialize, Serialize};

use crate::catalog::{Product, Promotion};
use crate::types::{Price, ProductId};

/// The two flavors of a half & half pizza.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalfPair {
    pub first: String,
    pub second: String,
}

/// Input to [`Cart::add_line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCandidate {
    /// Catalog product, `None` for promotions and composites.
    pub product_id: Option<ProductId>,
    pub name: String,
    pub price: Price,
    pub variant: Option<String>,
    /// Set only for half & half composites.
    pub halves: Option<HalfPair>,
}

impl LineCandidate {
    /// Candidate for a catalog product with an already validated variant.
    #[must_use]
    pub fn product(product: &Product, variant: Option<String>) -> Self {
        Self {
            product_id: Some(product.id.clone()),
            name: product.name.clone(),
            price: product.price,
            variant,
            halves: None,
        }
    }

    /// Candidate for a featured promotion.
    #[must_use]
    pub fn promotion(promotion: &Promotion) -> Self {
        Self {
            product_id: None,
            name: promotion.title.clone(),
            price: promotion.price,
            variant: None,
            halves: None,
        }
    }
}

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: Option<ProductId>,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub variant: Option<String>,
    pub is_custom: bool,
    pub halves: Option<HalfPair>,
}

impl CartLine {
    /// Name as shown in the cart, with the variant in parentheses.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.variant {
            Some(variant) => format!("{} ({variant})", self.name),
            None => self.name.clone(),
        }
    }
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Append a line with quantity 1.
    ///
    /// Never fails; variant validation happens before a candidate is built.
    pub fn add_line(&mut self, candidate: LineCandidate) {
        let line = CartLine {
            product_id: candidate.product_id,
            name: candidate.name,
            price: candidate.price,
            quantity: 1,
            variant: candidate.variant,
            is_custom: candidate.halves.is_some(),
            halves: candidate.halves,
        };
        self.lines.push(line);
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of line prices, recomputed on every call.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(|line| line.price).sum()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::product;

    fn candidate(name: &str, price: u64) -> LineCandidate {
        LineCandidate {
            product_id: None,
            name: name.to_string(),
            price: Price::new(price),
            variant: None,
            halves: None,
        }
    }

    #[test]
    fn test_add_line_fixes_quantity_and_appends_in_order() {
        let mut cart = Cart::new();
        cart.add_line(candidate("Muzza", 8000));
        cart.add_line(candidate("Completa", 6500));
        let line = cart.lines().last().unwrap();
        assert_eq!(line.quantity, 1);
        assert!(!line.is_custom);

        let names: Vec<_> = cart.lines().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Muzza", "Completa"]);
    }

    #[test]
    fn test_zero_price_is_accepted() {
        let mut cart = Cart::new();
        cart.add_line(candidate("Agua de cortesía", 0));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_add_then_clear_is_empty() {
        let mut cart = Cart::new();
        cart.add_line(candidate("Muzza", 8000));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_total_matches_sum_after_every_addition() {
        let mut cart = Cart::new();
        let prices = [8000, 6500, 0, 11000, 9000, 1];
        for (i, price) in prices.iter().enumerate() {
            cart.add_line(candidate("Item", *price));
            let expected: u64 = prices.iter().take(i + 1).sum();
            assert_eq!(cart.total(), Price::new(expected));
        }
    }

    #[test]
    fn test_halves_mark_line_custom() {
        let mut cart = Cart::new();
        cart.add_line(LineCandidate {
            halves: Some(HalfPair {
                first: "Muzza".to_string(),
                second: "Criolla".to_string(),
            }),
            ..candidate("Pizza Mitad y Mitad: Muzza / Criolla", 9500)
        });
        let line = cart.lines().first().unwrap();
        assert!(line.is_custom);
        assert!(line.product_id.is_none());
    }

    #[test]
    fn test_product_candidate_carries_catalog_fields() {
        let napolitana = product(7, 1, "Napolitana", 9000);
        let mut cart = Cart::new();
        cart.add_line(LineCandidate::product(&napolitana, Some("Con jamón".to_string())));
        let line = cart.lines().first().unwrap();
        assert_eq!(line.product_id, Some(ProductId::numeric(7)));
        assert_eq!(line.price, Price::new(9000));
        assert_eq!(line.display_name(), "Napolitana (Con jamón)");
    }
}
