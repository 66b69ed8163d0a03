//! Bundled menu used until the backend answers.

use comanda_core::{Category, Product};
use serde::Deserialize;

use crate::backend::types::{WireCategory, WireProduct};

const FALLBACK_MENU: &str = include_str!("../../content/fallback-menu.json");

/// The bundled menu failed to parse.
#[derive(Debug, thiserror::Error)]
#[error("Invalid fallback menu: {0}")]
pub struct FallbackError(#[from] serde_json::Error);

#[derive(Deserialize)]
struct FallbackMenu {
    categories: Vec<WireCategory>,
    products: Vec<WireProduct>,
}

/// Categories and products of the bundled menu, in the backend wire format.
///
/// # Errors
///
/// Returns `FallbackError` if the bundled JSON is malformed.
pub fn fallback_catalog() -> Result<(Vec<Category>, Vec<Product>), FallbackError> {
    let menu: FallbackMenu = serde_json::from_str(FALLBACK_MENU)?;
    Ok((
        menu.categories.into_iter().map(Category::from).collect(),
        menu.products.into_iter().map(Product::from).collect(),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use comanda_core::{HalfHalfMenu, build_sections};

    use super::*;

    #[test]
    fn test_fallback_menu_parses() {
        let (categories, products) = fallback_catalog().unwrap();
        let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Hamburguesas", "Pizzas", "Sandwiches"]);
        assert!(products.iter().all(|p| p.price.is_positive()));
    }

    #[test]
    fn test_fallback_menu_has_no_orphans_and_offers_half_half() {
        let (categories, products) = fallback_catalog().unwrap();
        let sections = build_sections(&categories, &products);
        let placed: usize = sections.iter().map(|s| s.products.len()).sum();
        assert_eq!(placed, products.len());
        assert!(HalfHalfMenu::from_sections(&sections).flavors().len() >= 2);
    }
}
