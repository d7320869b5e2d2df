//! Network seam used by the composition layer.

use async_trait::async_trait;
use storefront_sdk::client::{ClientError, ShopClient};
use storefront_sdk::objects::{Card, Order, OrderResult};

/// The two backend calls the storefront makes.
///
/// Futures are not `Send`: everything runs on the single UI thread.
#[async_trait(?Send)]
pub trait ShopApi {
    /// Fetch the catalog with image URLs already made absolute.
    async fn get_item_list(&self) -> Result<Vec<Card>, ClientError>;

    /// Submit a checkout snapshot.
    async fn order_items(&self, order: &Order) -> Result<OrderResult, ClientError>;
}

#[async_trait(?Send)]
impl ShopApi for ShopClient {
    async fn get_item_list(&self) -> Result<Vec<Card>, ClientError> {
        ShopClient::get_item_list(self).await
    }

    async fn order_items(&self, order: &Order) -> Result<OrderResult, ClientError> {
        ShopClient::order_items(self, order).await
    }
}
