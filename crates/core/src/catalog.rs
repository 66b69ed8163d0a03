//! Catalog records and the per-category menu projection.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Price, ProductId, PromotionId};

/// Substring that marks a category as the pizza section.
const PIZZA_MARKER: &str = "pizza";

/// Substring that marks a promotion as a half & half offer.
const HALF_HALF_PROMO_MARKER: &str = "mitad";

/// A menu category. Display order is the order the backend returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    /// Whether this is the pizza section (the one offering half & half).
    #[must_use]
    pub fn is_pizzas(&self) -> bool {
        self.name.to_lowercase().contains(PIZZA_MARKER)
    }
}

/// Error selecting a product variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VariantError {
    /// The product has variants and none was chosen.
    #[error("Por favor elegí una opción")]
    Missing,
    /// The chosen label is not one the product offers.
    #[error("Opción no disponible: {0}")]
    Unknown(String),
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub price: Price,
    pub description: Option<String>,
    /// Variant names, in display order.
    pub variants: Vec<String>,
    pub is_new: bool,
    pub images: Vec<String>,
}

impl Product {
    /// Whether the visitor must choose a variant before adding.
    #[must_use]
    pub fn has_variants(&self) -> bool {
        !self.variants.is_empty()
    }

    /// Labels offered in the variant select.
    ///
    /// The description (the base ingredients) comes first when present,
    /// followed by the named variants. Empty for products without variants.
    #[must_use]
    pub fn variant_options(&self) -> Vec<&str> {
        if !self.has_variants() {
            return Vec::new();
        }

        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        description
            .into_iter()
            .chain(self.variants.iter().map(String::as_str))
            .collect()
    }

    /// Validate a variant choice for this product.
    ///
    /// Products without variants ignore the label and yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`VariantError::Missing`] if the product has variants and the
    /// label is absent or blank, and [`VariantError::Unknown`] if the label is
    /// not one of [`Self::variant_options`].
    pub fn select_variant(&self, label: Option<&str>) -> Result<Option<String>, VariantError> {
        if !self.has_variants() {
            return Ok(None);
        }

        let label = label.map(str::trim).filter(|l| !l.is_empty());
        let Some(label) = label else {
            return Err(VariantError::Missing);
        };

        if self.variant_options().contains(&label) {
            Ok(Some(label.to_string()))
        } else {
            Err(VariantError::Unknown(label.to_string()))
        }
    }

    /// First image reference, if any.
    #[must_use]
    pub fn first_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A promotion as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: PromotionId,
    pub title: String,
    pub description: Option<String>,
    pub price: Price,
    /// Restricts the promotion to one weekday, Sunday = 0.
    pub day_of_week: Option<i64>,
    pub savings_badge: Option<String>,
    pub active: bool,
}

impl Promotion {
    /// Whether the promotion is shown on `weekday`.
    ///
    /// Only active, day-limited promotions are ever shown: a promotion with
    /// no day restriction is hidden on every day.
    #[must_use]
    pub fn is_featured_on(&self, weekday: Weekday) -> bool {
        self.active
            && self
                .day_of_week
                .is_some_and(|day| day == i64::from(weekday.num_days_from_sunday()))
    }

    /// Whether adding this promotion opens the half & half composer.
    #[must_use]
    pub fn opens_half_half(&self) -> bool {
        self.title.to_lowercase().contains(HALF_HALF_PROMO_MARKER)
    }
}

/// Promotions shown on `weekday`, in backend order.
#[must_use]
pub fn featured_promotions(promotions: &[Promotion], weekday: Weekday) -> Vec<Promotion> {
    promotions
        .iter()
        .filter(|promo| promo.is_featured_on(weekday))
        .cloned()
        .collect()
}

/// A category with its products, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSection {
    pub category: Category,
    pub products: Vec<Product>,
}

impl MenuSection {
    /// Whether the section offers the half & half composer.
    #[must_use]
    pub fn is_pizzas(&self) -> bool {
        self.category.is_pizzas()
    }
}

/// Group products under their categories.
///
/// Sections follow category order; within a section products keep the order
/// the backend listed them in. Products whose category is not in
/// `categories` have no section to land in and are dropped. A textual
/// `"7"` and a numeric `7` refer to the same category.
#[must_use]
pub fn build_sections(categories: &[Category], products: &[Product]) -> Vec<MenuSection> {
    categories
        .iter()
        .map(|category| {
            let key = category.id.to_string();
            MenuSection {
                category: category.clone(),
                products: products
                    .iter()
                    .filter(|p| p.category_id.matches(&key))
                    .cloned()
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn category(id: i64, name: &str) -> Category {
        Category {
            id: CategoryId::numeric(id),
            name: name.to_string(),
        }
    }

    pub fn product(id: i64, category_id: i64, name: &str, price: u64) -> Product {
        Product {
            id: ProductId::numeric(id),
            category_id: CategoryId::numeric(category_id),
            name: name.to_string(),
            price: Price::new(price),
            description: None,
            variants: Vec::new(),
            is_new: false,
            images: Vec::new(),
        }
    }

    pub fn promotion(id: i64, day_of_week: Option<i64>, active: bool) -> Promotion {
        Promotion {
            id: PromotionId::numeric(id),
            title: format!("Promo {id}"),
            description: None,
            price: Price::new(12000),
            day_of_week,
            savings_badge: None,
            active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{category, product, promotion};
    use super::*;

    #[test]
    fn test_is_pizzas_is_case_insensitive() {
        assert!(category(1, "Pizzas").is_pizzas());
        assert!(category(1, "PIZZAS A LA PIEDRA").is_pizzas());
        assert!(!category(2, "Hamburguesas").is_pizzas());
    }

    #[test]
    fn test_variant_options_put_description_first() {
        let mut napolitana = product(3, 1, "Napolitana", 9000);
        napolitana.description = Some("Muzza, tomate y ajo".to_string());
        napolitana.variants = vec!["Con albahaca".to_string(), "Con jamón".to_string()];

        assert_eq!(
            napolitana.variant_options(),
            vec!["Muzza, tomate y ajo", "Con albahaca", "Con jamón"]
        );
    }

    #[test]
    fn test_variant_options_empty_without_variants() {
        let mut muzza = product(2, 1, "Muzza", 8000);
        muzza.description = Some("Queso mozzarella".to_string());
        assert!(muzza.variant_options().is_empty());
    }

    #[test]
    fn test_select_variant_requires_label() {
        let mut calabresa = product(4, 1, "Calabresa", 10000);
        calabresa.variants = vec!["Muzza y calabresa".to_string()];

        assert_eq!(calabresa.select_variant(None), Err(VariantError::Missing));
        assert_eq!(calabresa.select_variant(Some("  ")), Err(VariantError::Missing));
        assert_eq!(
            calabresa.select_variant(Some("Con ananá")),
            Err(VariantError::Unknown("Con ananá".to_string()))
        );
        assert_eq!(
            calabresa.select_variant(Some("Muzza y calabresa")),
            Ok(Some("Muzza y calabresa".to_string()))
        );
    }

    #[test]
    fn test_select_variant_ignored_without_variants() {
        let muzza = product(2, 1, "Muzza", 8000);
        assert_eq!(muzza.select_variant(Some("anything")), Ok(None));
    }

    #[test]
    fn test_promotion_without_day_is_never_featured() {
        let promo = promotion(1, None, true);
        for weekday in [
            Weekday::Sun,
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
        ] {
            assert!(!promo.is_featured_on(weekday));
        }
    }

    #[test]
    fn test_promotion_featured_only_on_its_day() {
        let thursday = promotion(1, Some(4), true);
        assert!(thursday.is_featured_on(Weekday::Thu));
        assert!(!thursday.is_featured_on(Weekday::Wed));
        assert!(!thursday.is_featured_on(Weekday::Sun));

        let sunday = promotion(2, Some(0), true);
        assert!(sunday.is_featured_on(Weekday::Sun));
    }

    #[test]
    fn test_inactive_promotion_is_never_featured() {
        assert!(!promotion(1, Some(4), false).is_featured_on(Weekday::Thu));
    }

    #[test]
    fn test_featured_promotions_keeps_order() {
        let promos = vec![
            promotion(1, Some(4), true),
            promotion(2, None, true),
            promotion(3, Some(4), true),
            promotion(4, Some(5), true),
        ];
        let ids: Vec<_> = featured_promotions(&promos, Weekday::Thu)
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![PromotionId::numeric(1), PromotionId::numeric(3)]);
    }

    #[test]
    fn test_opens_half_half() {
        let mut promo = promotion(1, Some(4), true);
        promo.title = "Jueves de MITAD y mitad".to_string();
        assert!(promo.opens_half_half());
        promo.title = "2x1 en hamburguesas".to_string();
        assert!(!promo.opens_half_half());
    }

    #[test]
    fn test_build_sections_groups_in_order_and_drops_orphans() {
        let categories = vec![category(2, "Pizzas"), category(1, "Hamburguesas")];
        let products = vec![
            product(10, 1, "Completa", 6500),
            product(11, 2, "Muzza", 8000),
            product(12, 9, "Huérfano", 100),
            product(13, 2, "Criolla", 9500),
        ];

        let sections = build_sections(&categories, &products);

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].category.name, "Pizzas");
        let pizza_names: Vec<_> = sections[0].products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(pizza_names, vec!["Muzza", "Criolla"]);
        assert_eq!(sections[1].products.len(), 1);
        assert!(sections[0].is_pizzas());
        assert!(!sections[1].is_pizzas());
    }

    #[test]
    fn test_build_sections_matches_textual_category_ids() {
        let categories = vec![category(7, "Sandwiches")];
        let mut lomo = product(1, 0, "Lomo", 9000);
        lomo.category_id = CategoryId::text("7");

        let sections = build_sections(&categories, &[lomo]);
        assert_eq!(sections[0].products.len(), 1);
    }
}
