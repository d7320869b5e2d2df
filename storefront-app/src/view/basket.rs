//! Basket rendering.

use rust_decimal::Decimal;
use storefront_sdk::objects::{BasketItem, CardId};

use super::card::price_label;

pub const EMPTY_BASKET: &str = "Basket is empty";

/// One rendered basket line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketRow {
    pub id: CardId,
    /// 1-based position label.
    pub index: String,
    pub title: String,
    pub price: String,
}

impl BasketRow {
    pub fn render(item: &BasketItem) -> Self {
        Self {
            id: item.id.clone(),
            index: (item.index + 1).to_string(),
            title: item.title.clone(),
            price: price_label(item.price),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketView {
    pub rows: Vec<BasketRow>,
    pub total: String,
    /// Shown instead of rows when the basket is empty.
    pub placeholder: Option<&'static str>,
    pub checkout_disabled: bool,
}

impl BasketView {
    pub fn render(items: &[BasketItem], total: Decimal) -> Self {
        Self {
            rows: items.iter().map(BasketRow::render).collect(),
            total: price_label(Some(total)),
            placeholder: items.is_empty().then_some(EMPTY_BASKET),
            checkout_disabled: items.is_empty(),
        }
    }
}

impl Default for BasketView {
    fn default() -> Self {
        Self::render(&[], Decimal::ZERO)
    }
}
