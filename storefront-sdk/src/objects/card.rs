//! Catalog card and basket item types.

use compact_str::CompactString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of a catalog card as issued by the product API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(CompactString);

impl CardId {
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A catalog entry returned by `GET /product`.
///
/// Cards are immutable once fetched; a re-fetch replaces the whole catalog.
/// A `null` price on the wire means the item cannot be bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
}

impl Card {
    /// Prefix the image path with a CDN base.
    ///
    /// Plain concatenation: the API returns paths such as `/5_Dots.svg`
    /// that are relative to the CDN root including its path segments.
    pub fn with_cdn(mut self, cdn: &str) -> Self {
        self.image = format!("{cdn}{}", self.image);
        self
    }

    /// Project this card into a basket entry at the given position.
    pub fn to_basket_item(&self, index: usize) -> BasketItem {
        BasketItem {
            id: self.id.clone(),
            title: self.title.clone(),
            price: self.price,
            index,
        }
    }
}

/// A card as it sits in the basket.
///
/// `index` is positional and recomputed on every basket render; it is not
/// an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketItem {
    pub id: CardId,
    pub title: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub index: usize,
}
