//! Order validation and the WhatsApp hand-off message.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartLine};
use crate::half_half::HALF_HALF_LABEL;
use crate::types::Price;

/// Base of the WhatsApp click-to-chat link.
const WHATSAPP_BASE_URL: &str = "https://wa.me";

const GREETING: &str = "Hola! quiero hacer este pedido:";

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryMethod {
    #[serde(rename = "domicilio")]
    HomeDelivery,
    #[serde(rename = "retiro")]
    Pickup,
}

impl DeliveryMethod {
    /// Wire value, also used as the form value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HomeDelivery => "domicilio",
            Self::Pickup => "retiro",
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryMethod {
    type Err = OrderValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "domicilio" => Ok(Self::HomeDelivery),
            "retiro" => Ok(Self::Pickup),
            _ => Err(OrderValidationError::MissingDelivery),
        }
    }
}

/// Reasons an order is rejected before it is sent anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OrderValidationError {
    #[error("Tu carrito está vacío")]
    EmptyCart,
    #[error("Por favor seleccioná si querés envío o retiro")]
    MissingDelivery,
    #[error("Por favor ingresá tu dirección para el envío")]
    MissingAddress,
}

/// What the visitor filled in at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderRequest {
    pub delivery: Option<DeliveryMethod>,
    pub address: Option<String>,
}

/// A validated order, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub items: Vec<CartLine>,
    pub total: Price,
    pub delivery: DeliveryMethod,
    /// Trimmed address, present only for home delivery.
    pub address: Option<String>,
}

impl OrderRecord {
    /// Validate the checkout input against the cart.
    ///
    /// # Errors
    ///
    /// Returns the first failing precondition: empty cart, no delivery
    /// method, or home delivery without an address.
    pub fn prepare(cart: &Cart, request: &OrderRequest) -> Result<Self, OrderValidationError> {
        if cart.is_empty() {
            return Err(OrderValidationError::EmptyCart);
        }

        let delivery = request
            .delivery
            .ok_or(OrderValidationError::MissingDelivery)?;

        let address = match delivery {
            DeliveryMethod::HomeDelivery => {
                let address = request
                    .address
                    .as_deref()
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .ok_or(OrderValidationError::MissingAddress)?;
                Some(address.to_string())
            }
            DeliveryMethod::Pickup => None,
        };

        Ok(Self {
            items: cart.lines().to_vec(),
            total: cart.total(),
            delivery,
            address,
        })
    }

    /// Plain-text message summarizing the order.
    #[must_use]
    pub fn message(&self) -> String {
        let mut message = format!("{GREETING}\n\n");

        for line in &self.items {
            message.push_str(&bullet(line));
            message.push('\n');
        }

        message.push_str(&format!("\nTotal: ${}\n", self.total));

        match (self.delivery, self.address.as_deref()) {
            (DeliveryMethod::HomeDelivery, Some(address)) => {
                message.push_str(&format!("\nEnvío a domicilio • Dirección: {address}"));
            }
            (DeliveryMethod::HomeDelivery, None) => message.push_str("\nEnvío a domicilio"),
            (DeliveryMethod::Pickup, _) => message.push_str("\nRetiro en el local"),
        }

        message
    }

    /// Message plus the click-to-chat link that carries it.
    #[must_use]
    pub fn hand_off(&self, phone: &str) -> HandOff {
        let message = self.message();
        let url = format!(
            "{WHATSAPP_BASE_URL}/{phone}?text={}",
            urlencoding::encode(&message)
        );
        HandOff { message, url }
    }
}

/// Message draft and deep link produced after the order is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandOff {
    pub message: String,
    pub url: String,
}

/// One message bullet for a cart line.
fn bullet(line: &CartLine) -> String {
    match &line.halves {
        Some(halves) => format!(
            "• {HALF_HALF_LABEL} (mitad {} / mitad {}) - ${}",
            sanitize(&halves.first),
            sanitize(&halves.second),
            line.price
        ),
        None => match &line.variant {
            Some(variant) => format!(
                "• {} ({}) - ${}",
                sanitize(&line.name),
                sanitize(variant),
                line.price
            ),
            None => format!("• {} - ${}", sanitize(&line.name), line.price),
        },
    }
}

/// Replace characters that URL fragments and queries treat specially.
fn sanitize(text: &str) -> String {
    text.replace('&', "y")
        .replace('%', "por ciento")
        .replace('#', "num")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::{HalfPair, LineCandidate};
    use crate::types::ProductId;

    fn line(name: &str, price: u64, variant: Option<&str>) -> LineCandidate {
        LineCandidate {
            product_id: Some(ProductId::numeric(1)),
            name: name.to_string(),
            price: Price::new(price),
            variant: variant.map(String::from),
            halves: None,
        }
    }

    fn pickup() -> OrderRequest {
        OrderRequest {
            delivery: Some(DeliveryMethod::Pickup),
            address: None,
        }
    }

    #[test]
    fn test_empty_cart_rejected() {
        assert_eq!(
            OrderRecord::prepare(&Cart::new(), &pickup()),
            Err(OrderValidationError::EmptyCart)
        );
    }

    #[test]
    fn test_missing_delivery_rejected() {
        let mut cart = Cart::new();
        cart.add_line(line("Muzza", 8000, None));
        assert_eq!(
            OrderRecord::prepare(&cart, &OrderRequest::default()),
            Err(OrderValidationError::MissingDelivery)
        );
    }

    #[test]
    fn test_home_delivery_requires_address() {
        let mut cart = Cart::new();
        cart.add_line(line("Muzza", 8000, None));
        let mut request = OrderRequest {
            delivery: Some(DeliveryMethod::HomeDelivery),
            address: Some("   ".to_string()),
        };
        assert_eq!(
            OrderRecord::prepare(&cart, &request),
            Err(OrderValidationError::MissingAddress)
        );

        request.address = Some("  San Martín 123 ".to_string());
        let record = OrderRecord::prepare(&cart, &request).unwrap();
        assert_eq!(record.address.as_deref(), Some("San Martín 123"));
    }

    #[test]
    fn test_pickup_drops_address() {
        let mut cart = Cart::new();
        cart.add_line(line("Muzza", 8000, None));
        let request = OrderRequest {
            delivery: Some(DeliveryMethod::Pickup),
            address: Some("San Martín 123".to_string()),
        };
        assert!(OrderRecord::prepare(&cart, &request).unwrap().address.is_none());
    }

    #[test]
    fn test_pickup_message() {
        let mut cart = Cart::new();
        cart.add_line(line("Muzza", 8000, None));
        let record = OrderRecord::prepare(&cart, &pickup()).unwrap();

        assert_eq!(record.total, Price::new(8000));
        let message = record.message();
        assert!(message.starts_with("Hola! quiero hacer este pedido:\n\n"));
        assert!(message.contains("• Muzza - $8000\n"));
        assert!(message.contains("\nTotal: $8000\n"));
        assert!(message.ends_with("\nRetiro en el local"));
    }

    #[test]
    fn test_delivery_message_with_variant_and_half_half() {
        let mut cart = Cart::new();
        cart.add_line(line("Napolitana", 9000, Some("Con jamón")));
        cart.add_line(LineCandidate {
            product_id: None,
            name: "Pizza Mitad y Mitad: Muzza / Panceta".to_string(),
            price: Price::new(11000),
            variant: None,
            halves: Some(HalfPair {
                first: "Muzza".to_string(),
                second: "Panceta".to_string(),
            }),
        });
        let request = OrderRequest {
            delivery: Some(DeliveryMethod::HomeDelivery),
            address: Some("San Martín 123".to_string()),
        };

        let message = OrderRecord::prepare(&cart, &request).unwrap().message();
        assert!(message.contains("• Napolitana (Con jamón) - $9000\n"));
        assert!(message.contains("• Pizza Mitad y Mitad (mitad Muzza / mitad Panceta) - $11000\n"));
        assert!(message.contains("Total: $20000"));
        assert!(message.ends_with("Envío a domicilio • Dirección: San Martín 123"));
    }

    #[test]
    fn test_special_characters_replaced() {
        let mut cart = Cart::new();
        cart.add_line(line("Papas & Cheddar 100% #1", 5000, None));
        let message = OrderRecord::prepare(&cart, &pickup()).unwrap().message();
        assert!(message.contains("• Papas y Cheddar 100por ciento num1 - $5000"));
    }

    #[test]
    fn test_hand_off_url_is_percent_encoded() {
        let mut cart = Cart::new();
        cart.add_line(line("Muzza", 8000, None));
        let hand_off = OrderRecord::prepare(&cart, &pickup())
            .unwrap()
            .hand_off("5493755415870");

        assert!(hand_off.url.starts_with("https://wa.me/5493755415870?text="));
        assert!(hand_off.url.contains("%0A"));
        assert!(!hand_off.url.contains(' '));
        assert!(!hand_off.url.contains('\n'));
        assert!(hand_off.message.contains("• Muzza - $8000"));
    }

    #[test]
    fn test_delivery_method_round_trip() {
        assert_eq!("domicilio".parse::<DeliveryMethod>().unwrap(), DeliveryMethod::HomeDelivery);
        assert_eq!("retiro".parse::<DeliveryMethod>().unwrap(), DeliveryMethod::Pickup);
        assert!("".parse::<DeliveryMethod>().is_err());
        assert_eq!(
            serde_json::to_string(&DeliveryMethod::HomeDelivery).unwrap(),
            "\"domicilio\""
        );
    }
}
