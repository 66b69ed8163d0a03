//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use comanda_core::Price;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a whole-unit amount with `.` thousands separators.
///
/// Non-numeric input is passed through unchanged.
///
/// Usage in templates: `$ {{ product.price|money }}` renders `$ 8.000`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn money(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let raw = value.to_string();
    Ok(raw
        .trim()
        .parse::<u64>()
        .map_or(raw, |amount| Price::new(amount).grouped()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use askama::Template;
    use comanda_core::Price;

    use crate::filters;

    #[derive(Template)]
    #[template(source = "$ {{ price|money }} / {{ label|money }}", ext = "txt")]
    struct MoneyTemplate<'a> {
        price: Price,
        label: &'a str,
    }

    #[test]
    fn test_money_groups_thousands() {
        let rendered = MoneyTemplate {
            price: Price::new(1_250_000),
            label: "Elegí sabores",
        }
        .render()
        .unwrap();
        assert_eq!(rendered, "$ 1.250.000 / Elegí sabores");
    }
}
