//! Card rendering.
//!
//! Catalog tiles, the preview and basket rows all draw from one descriptor;
//! which parts appear depends only on which optional fields are present.

use rust_decimal::Decimal;
use storefront_sdk::objects::Card;

/// Unit shown after every price.
pub const CURRENCY: &str = "synapses";

/// Label shown for cards without a price.
pub const PRICELESS: &str = "Priceless";

/// Format a nullable price for display.
pub fn price_label(price: Option<Decimal>) -> String {
    match price {
        Some(price) => format!("{price} {CURRENCY}"),
        None => PRICELESS.to_string(),
    }
}

/// Category labels the backend uses and their badge modifiers.
const CATEGORIES: &[(&str, &str)] = &[
    ("софт-скил", "soft"),
    ("хард-скил", "hard"),
    ("другое", "other"),
    ("дополнительное", "additional"),
    ("кнопка", "button"),
];

/// Badge modifier for a category label; unknown labels fall back to `other`.
pub fn category_modifier(category: &str) -> &'static str {
    CATEGORIES
        .iter()
        .find(|(label, _)| *label == category)
        .map(|(_, modifier)| *modifier)
        .unwrap_or("other")
}

/// Everything a card rendering may need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub title: String,
    pub price: Option<Decimal>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// `Some(in_basket)` when the card shows a basket button.
    pub in_basket: Option<bool>,
}

impl CardView {
    /// Catalog tile: no description, no button.
    pub fn catalog(card: &Card) -> Self {
        Self {
            title: card.title.clone(),
            price: card.price,
            image: Some(card.image.clone()),
            category: Some(card.category.clone()),
            description: None,
            in_basket: None,
        }
    }

    /// Modal preview with description and basket button.
    pub fn preview(card: &Card, in_basket: bool) -> Self {
        Self {
            description: Some(card.description.clone()),
            in_basket: Some(in_basket),
            ..Self::catalog(card)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBadge {
    pub label: String,
    pub modifier: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonState {
    pub label: &'static str,
    pub disabled: bool,
}

/// Result of [`render_card`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCard {
    pub title: String,
    pub price: String,
    pub image: Option<String>,
    pub category: Option<CategoryBadge>,
    pub description: Option<String>,
    pub button: Option<ButtonState>,
}

pub fn render_card(view: &CardView) -> RenderedCard {
    let button = view.in_basket.map(|in_basket| ButtonState {
        label: if in_basket { "In basket" } else { "Add to basket" },
        // Priceless items cannot be bought.
        disabled: in_basket || view.price.is_none(),
    });

    RenderedCard {
        title: view.title.clone(),
        price: price_label(view.price),
        image: view.image.clone(),
        category: view.category.as_ref().map(|label| CategoryBadge {
            label: label.clone(),
            modifier: category_modifier(label),
        }),
        description: view.description.clone(),
        button,
    }
}
