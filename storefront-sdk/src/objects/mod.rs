pub mod card;
pub mod order;

pub use card::{BasketItem, Card, CardId};
pub use order::{FormField, Order, OrderForm, OrderResult};

use serde::{Deserialize, Serialize};

/// Envelope used by list endpoints such as `GET /product`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiListResponse<T> {
    #[serde(default)]
    pub total: usize,
    pub items: Vec<T>,
}
