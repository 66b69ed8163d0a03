//! Wire records for the menu backend.
//!
//! The backend is loose about JSON types: prices arrive as numbers, numeric
//! strings or `null`; flags as booleans, `1`/`0` or `"1"`/`"0"`; variants
//! as `{ "name": .. }` objects or plain strings. Everything is normalized
//! here so the core types stay strict.

use comanda_core::{
    CartLine, Category, CategoryId, OrderRecord, Price, Product, ProductId, Promotion,
    PromotionId, SiteConfig,
};
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Lenient scalars
// =============================================================================

/// A JSON scalar the backend may send in place of a number or flag.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
}

impl Loose {
    /// Numeric reading; `None` for text that is not a number.
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            #[allow(clippy::cast_precision_loss)]
            Self::Unsigned(n) => Some(*n as f64),
            #[allow(clippy::cast_precision_loss)]
            Self::Signed(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Whole-unit price; fractional parts are truncated.
    fn as_price(&self) -> Price {
        match self {
            Self::Unsigned(n) => Price::new(*n),
            other => other
                .as_f64()
                .filter(|f| f.is_finite() && *f > 0.0)
                .map_or(Price::ZERO, |f| {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    Price::new(f.trunc() as u64)
                }),
        }
    }

    /// Loose equality with `1`: `true`, `1`, `"1"`.
    fn is_one(&self) -> bool {
        self.as_f64().is_some_and(|f| (f - 1.0).abs() < f64::EPSILON)
    }

    /// Truthiness: `true`, any non-zero number, any non-empty string but `"0"`.
    fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(s) => {
                let s = s.trim();
                !s.is_empty() && s != "0" && !s.eq_ignore_ascii_case("false")
            }
            other => other.as_f64().is_some_and(|f| f != 0.0),
        }
    }

    fn as_day(&self) -> Option<i64> {
        match self {
            Self::Bool(_) => None,
            Self::Unsigned(n) => i64::try_from(*n).ok(),
            Self::Signed(n) => Some(*n),
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => {
                #[allow(clippy::cast_possible_truncation)]
                Some(*f as i64)
            }
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

fn price_or_zero<'de, D>(deserializer: D) -> Result<Price, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Loose>::deserialize(deserializer)?.map_or(Price::ZERO, |v| v.as_price()))
}

fn flag<'de, D>(deserializer: D) -> Result<Option<Loose>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Loose>::deserialize(deserializer)
}

fn optional_day<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Loose>::deserialize(deserializer)?.and_then(|v| v.as_day()))
}

fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A variant is either `{ "name": "Con jamón" }` or just `"Con jamón"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireVariant {
    Named { name: String },
    Plain(String),
}

impl WireVariant {
    fn into_label(self) -> String {
        match self {
            Self::Named { name } | Self::Plain(name) => name,
        }
    }
}

fn variant_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<WireVariant>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(WireVariant::into_label)
        .filter(|label| !label.trim().is_empty())
        .collect())
}

fn day_list<'de, D>(deserializer: D) -> Result<Option<Vec<u32>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Loose>>::deserialize(deserializer)?.map(|days| {
        days.iter()
            .filter_map(Loose::as_day)
            .filter_map(|day| u32::try_from(day).ok())
            .filter(|day| *day < 7)
            .collect()
    }))
}

// =============================================================================
// Catalog records
// =============================================================================

/// `GET /categories` element.
#[derive(Debug, Clone, Deserialize)]
pub struct WireCategory {
    pub id: CategoryId,
    pub name: String,
}

impl From<WireCategory> for Category {
    fn from(wire: WireCategory) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
        }
    }
}

/// `GET /products` element.
#[derive(Debug, Clone, Deserialize)]
pub struct WireProduct {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    #[serde(default, deserialize_with = "price_or_zero")]
    pub price: Price,
    #[serde(default, deserialize_with = "optional_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "variant_list")]
    pub variants: Vec<String>,
    #[serde(default, deserialize_with = "flag")]
    is_new: Option<Loose>,
    #[serde(default, rename = "isNew", deserialize_with = "flag")]
    is_new_camel: Option<Loose>,
    #[serde(default, deserialize_with = "string_list")]
    pub images: Vec<String>,
}

impl From<WireProduct> for Product {
    fn from(wire: WireProduct) -> Self {
        let is_new = [wire.is_new.as_ref(), wire.is_new_camel.as_ref()]
            .into_iter()
            .flatten()
            .any(Loose::is_truthy);

        Self {
            id: wire.id,
            category_id: wire.category_id,
            name: wire.name,
            price: wire.price,
            description: wire.description,
            variants: wire.variants,
            is_new,
            images: wire.images,
        }
    }
}

/// `GET /promos` element.
#[derive(Debug, Clone, Deserialize)]
pub struct WirePromotion {
    pub id: PromotionId,
    pub title: String,
    #[serde(default, deserialize_with = "optional_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "price_or_zero")]
    pub price: Price,
    #[serde(default, deserialize_with = "optional_day")]
    pub day_of_week: Option<i64>,
    #[serde(default, deserialize_with = "optional_text")]
    pub savings_badge: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    active: Option<Loose>,
}

impl From<WirePromotion> for Promotion {
    fn from(wire: WirePromotion) -> Self {
        Self {
            id: wire.id,
            title: wire.title,
            description: wire.description,
            price: wire.price,
            day_of_week: wire.day_of_week,
            savings_badge: wire.savings_badge,
            active: wire.active.as_ref().is_some_and(Loose::is_one),
        }
    }
}

/// `GET /site-config` body.
#[derive(Debug, Clone, Deserialize)]
pub struct WireSiteConfig {
    #[serde(default, deserialize_with = "optional_text")]
    pub open_time: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub close_time: Option<String>,
    #[serde(default, deserialize_with = "day_list")]
    pub open_days: Option<Vec<u32>>,
    #[serde(default, deserialize_with = "string_list")]
    pub closed_dates: Vec<String>,
}

impl From<WireSiteConfig> for SiteConfig {
    fn from(wire: WireSiteConfig) -> Self {
        Self {
            open_time: wire.open_time,
            close_time: wire.close_time,
            open_days: wire.open_days,
            closed_dates: wire.closed_dates,
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// `POST /orders` body.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPayload {
    pub items: Vec<OrderItemPayload>,
    pub total: Price,
    pub delivery_type: &'static str,
    pub address: Option<String>,
}

/// One cart line as the backend stores it.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemPayload {
    pub product_id: Option<ProductId>,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub variant: Option<String>,
    pub is_custom: bool,
}

impl From<&CartLine> for OrderItemPayload {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            price: line.price,
            quantity: line.quantity,
            variant: line.variant.clone(),
            is_custom: line.is_custom,
        }
    }
}

impl From<&OrderRecord> for OrderPayload {
    fn from(order: &OrderRecord) -> Self {
        Self {
            items: order.items.iter().map(OrderItemPayload::from).collect(),
            total: order.total,
            delivery_type: order.delivery.as_str(),
            address: order.address.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use comanda_core::{Cart, DeliveryMethod, LineCandidate, OrderRequest};
    use serde_json::json;

    use super::*;

    fn product(value: serde_json::Value) -> Product {
        serde_json::from_value::<WireProduct>(value).unwrap().into()
    }

    fn promotion(value: serde_json::Value) -> Promotion {
        serde_json::from_value::<WirePromotion>(value).unwrap().into()
    }

    #[test]
    fn test_price_accepts_number_string_and_null() {
        let base = |price: serde_json::Value| {
            product(json!({"id": 1, "category_id": 2, "name": "Muzza", "price": price})).price
        };
        assert_eq!(base(json!(8000)), Price::new(8000));
        assert_eq!(base(json!("8000")), Price::new(8000));
        assert_eq!(base(json!("8000.00")), Price::new(8000));
        assert_eq!(base(json!("8000.60")), Price::new(8000));
        assert_eq!(base(json!(8999.99)), Price::new(8999));
        assert_eq!(base(json!(null)), Price::ZERO);
        assert_eq!(base(json!("consultar")), Price::ZERO);
        assert_eq!(base(json!(-10)), Price::ZERO);

        let missing = product(json!({"id": 1, "category_id": 2, "name": "Muzza"}));
        assert_eq!(missing.price, Price::ZERO);
    }

    #[test]
    fn test_ids_accept_numbers_and_strings() {
        let p = product(json!({"id": "Completa", "category_id": "7", "name": "Completa"}));
        assert!(p.id.matches("Completa"));
        assert!(p.category_id.matches("7"));

        let p = product(json!({"id": 12, "category_id": 7, "name": "Completa"}));
        assert!(p.id.matches("12"));
    }

    #[test]
    fn test_variants_accept_objects_and_strings() {
        let p = product(json!({
            "id": 1, "category_id": 2, "name": "Napolitana",
            "variants": [{"name": "Con jamón"}, "Sin jamón", {"name": "  "}]
        }));
        assert_eq!(p.variants, vec!["Con jamón", "Sin jamón"]);

        let p = product(json!({"id": 1, "category_id": 2, "name": "Muzza", "variants": null}));
        assert!(p.variants.is_empty());
    }

    #[test]
    fn test_is_new_accepts_either_spelling() {
        let snake = product(json!({"id": 1, "category_id": 2, "name": "A", "is_new": 1}));
        let camel = product(json!({"id": 1, "category_id": 2, "name": "A", "isNew": true}));
        let both = product(json!({"id": 1, "category_id": 2, "name": "A", "is_new": 0, "isNew": "1"}));
        let neither = product(json!({"id": 1, "category_id": 2, "name": "A", "is_new": false}));
        assert!(snake.is_new);
        assert!(camel.is_new);
        assert!(both.is_new);
        assert!(!neither.is_new);
    }

    #[test]
    fn test_promotion_active_and_day_are_lenient() {
        let p = promotion(json!({"id": 1, "title": "2x1", "active": "1", "day_of_week": "3"}));
        assert!(p.active);
        assert_eq!(p.day_of_week, Some(3));

        let p = promotion(json!({"id": 1, "title": "2x1", "active": 0, "day_of_week": null}));
        assert!(!p.active);
        assert_eq!(p.day_of_week, None);

        let p = promotion(json!({"id": 1, "title": "2x1", "active": true, "day_of_week": ""}));
        assert!(p.active);
        assert_eq!(p.day_of_week, None);
    }

    #[test]
    fn test_site_config_normalizes_days() {
        let wire: WireSiteConfig = serde_json::from_value(json!({
            "open_time": "20:00",
            "close_time": "02:00",
            "open_days": [1, "2", 9],
            "closed_dates": null
        }))
        .unwrap();
        let cfg = SiteConfig::from(wire);
        assert_eq!(cfg.open_days, Some(vec![1, 2]));
        assert!(cfg.closed_dates.is_empty());
    }

    #[test]
    fn test_order_payload_shape() {
        let mut cart = Cart::new();
        cart.add_line(LineCandidate {
            product_id: Some(ProductId::numeric(4)),
            name: "Muzza".to_string(),
            price: Price::new(8000),
            variant: None,
            halves: None,
        });
        let request = OrderRequest {
            delivery: Some(DeliveryMethod::Pickup),
            address: None,
        };
        let order = OrderRecord::prepare(&cart, &request).unwrap();

        let body = serde_json::to_value(OrderPayload::from(&order)).unwrap();
        assert_eq!(
            body,
            json!({
                "items": [{
                    "product_id": 4,
                    "name": "Muzza",
                    "price": 8000,
                    "quantity": 1,
                    "variant": null,
                    "is_custom": false
                }],
                "total": 8000,
                "delivery_type": "retiro",
                "address": null
            })
        );
    }
}
