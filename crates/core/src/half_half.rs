//! Half & half pizza composer.
//!
//! A half & half pizza combines two different pizza flavors into one cart
//! line. The line is priced at the more expensive of the two halves.

use crate::cart::{HalfPair, LineCandidate};
use crate::catalog::MenuSection;
use crate::types::Price;

/// Label used for composite lines in the cart and in order messages.
pub const HALF_HALF_LABEL: &str = "Pizza Mitad y Mitad";

/// Name of the placeholder entry rendered at the top of the pizza section.
pub const HALF_HALF_PLACEHOLDER: &str = "Pizza Mitad & Mitad";

/// Description shown while the preview has no valid pair.
pub const PREVIEW_PLACEHOLDER: &str = "Elegí dos sabores diferentes";

/// Rejections when composing a half & half pizza.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HalfHalfError {
    #[error("Por favor seleccioná ambos sabores para la pizza mitad y mitad")]
    MissingSelection,
    #[error("Elegí dos sabores diferentes")]
    SameFlavor,
    /// The flavor left the menu after the selection was rendered.
    #[error("El sabor {0} ya no está disponible")]
    UnknownFlavor(String),
}

/// An eligible pizza flavor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flavor {
    pub name: String,
    pub price: Price,
}

/// The flavors currently offered by the composer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HalfHalfMenu {
    flavors: Vec<Flavor>,
}

impl HalfHalfMenu {
    /// Collect eligible flavors from rendered sections.
    ///
    /// Eligible: listed in a pizza section, not the placeholder itself, and
    /// priced above zero.
    #[must_use]
    pub fn from_sections(sections: &[MenuSection]) -> Self {
        let flavors = sections
            .iter()
            .filter(|section| section.is_pizzas())
            .flat_map(|section| section.products.iter())
            .filter(|product| product.name != HALF_HALF_PLACEHOLDER && product.price.is_positive())
            .map(|product| Flavor {
                name: product.name.clone(),
                price: product.price,
            })
            .collect();

        Self { flavors }
    }

    /// Eligible flavors in menu order.
    #[must_use]
    pub fn flavors(&self) -> &[Flavor] {
        &self.flavors
    }

    /// Look up a flavor by name.
    #[must_use]
    pub fn flavor(&self, name: &str) -> Option<&Flavor> {
        self.flavors.iter().find(|flavor| flavor.name == name)
    }

    /// Build the composite cart line for two selected flavor names.
    ///
    /// # Errors
    ///
    /// - [`HalfHalfError::MissingSelection`] if either name is empty
    /// - [`HalfHalfError::SameFlavor`] if both names are equal
    /// - [`HalfHalfError::UnknownFlavor`] if a name is not eligible
    pub fn compose(&self, first: &str, second: &str) -> Result<LineCandidate, HalfHalfError> {
        if first.is_empty() || second.is_empty() {
            return Err(HalfHalfError::MissingSelection);
        }
        if first == second {
            return Err(HalfHalfError::SameFlavor);
        }

        let first = self
            .flavor(first)
            .ok_or_else(|| HalfHalfError::UnknownFlavor(first.to_string()))?;
        let second = self
            .flavor(second)
            .ok_or_else(|| HalfHalfError::UnknownFlavor(second.to_string()))?;

        Ok(compose_pair(first, second))
    }

    /// Preview for the current (possibly partial) selection.
    #[must_use]
    pub fn preview(&self, first: Option<&str>, second: Option<&str>) -> HalfHalfPreview {
        HalfHalfPreview::derive(
            first.and_then(|name| self.flavor(name)),
            second.and_then(|name| self.flavor(name)),
        )
    }
}

/// Composite line for two distinct flavors.
fn compose_pair(first: &Flavor, second: &Flavor) -> LineCandidate {
    LineCandidate {
        product_id: None,
        name: format!("{HALF_HALF_LABEL}: {} / {}", first.name, second.name),
        price: first.price.max(second.price),
        variant: None,
        halves: Some(HalfPair {
            first: first.name.clone(),
            second: second.name.clone(),
        }),
    }
}

/// Price and description shown while the visitor picks flavors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HalfHalfPreview {
    pub total: Price,
    pub description: String,
}

impl HalfHalfPreview {
    /// Derive the preview from the current selections.
    ///
    /// Shows the placeholder state until both halves are selected with a
    /// positive price.
    #[must_use]
    pub fn derive(first: Option<&Flavor>, second: Option<&Flavor>) -> Self {
        match (first, second) {
            (Some(a), Some(b)) if a.price.is_positive() && b.price.is_positive() => Self {
                total: a.price.max(b.price),
                description: format!("Mitad {} + Mitad {}", a.name, b.name),
            },
            _ => Self::placeholder(),
        }
    }

    /// The zero state.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            total: Price::ZERO,
            description: PREVIEW_PLACEHOLDER.to_string(),
        }
    }
}
