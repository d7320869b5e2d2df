//! Product and order API client (storefront → backend).
//!
//! Requests are one-shot: no retry, no timeout beyond what the supplied
//! `reqwest::Client` is configured with.

use reqwest::Client;
use tracing::debug;

use super::ClientError;
use crate::config::ApiConfig;
use crate::objects::{ApiListResponse, Card, Order, OrderResult};

/// Typed HTTP client for the storefront **product and order API**.
#[derive(Debug, Clone)]
pub struct ShopClient {
    http: Client,
    config: ApiConfig,
}

impl ShopClient {
    /// Create a new `ShopClient` for the given endpoints.
    pub fn new(config: ApiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /product` – fetch the whole catalog.
    ///
    /// Every card's `image` comes back prefixed with the configured CDN base.
    pub async fn get_item_list(&self) -> Result<Vec<Card>, ClientError> {
        let url = self.config.endpoint("/product")?;
        debug!(%url, "Fetching catalog");

        let resp = self.http.get(url).send().await?;
        let list: ApiListResponse<Card> = parse_response(resp).await?;

        Ok(list
            .items
            .into_iter()
            .map(|card| card.with_cdn(&self.config.cdn_url))
            .collect())
    }

    /// `POST /order` – submit a checkout snapshot.
    pub async fn order_items(&self, order: &Order) -> Result<OrderResult, ClientError> {
        let url = self.config.endpoint("/order")?;
        debug!(%url, items = order.items.len(), total = %order.total, "Submitting order");

        let resp = self.http.post(url).json(order).send().await?;

        parse_response(resp).await
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{CardId, OrderForm};
    use reqwest::StatusCode;
    use rust_decimal::Decimal;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;
    use url::Url;

    const CDN: &str = "https://cdn.example.com/content/weblarek";

    /// Answer a single request with a canned response and hand back the raw
    /// request text.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (ShopClient, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });

        let base_url = Url::parse(&format!("http://{addr}/api/weblarek")).unwrap();
        let http = Client::builder().no_proxy().build().unwrap();
        let client = ShopClient::new(ApiConfig::new(base_url, CDN)).with_http_client(http);
        (client, handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    fn request_body(request: &str) -> serde_json::Value {
        let (_, body) = request.split_once("\r\n\r\n").unwrap();
        serde_json::from_str(body).unwrap()
    }

    #[tokio::test]
    async fn test_item_list_gets_cdn_prefix() {
        let (client, server) = serve_once(
            "200 OK",
            r#"{"total":2,"items":[
                {"id":"a","title":"Shell","description":"d","image":"/Shell.svg","category":"другое","price":750},
                {"id":"b","title":"Dots","description":"d","image":"/5_Dots.svg","category":"кнопка","price":null}
            ]}"#,
        )
        .await;

        let cards = client.get_item_list().await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("GET /api/weblarek/product "));
        let images: Vec<&str> = cards.iter().map(|c| c.image.as_str()).collect();
        assert_eq!(
            images,
            vec![
                "https://cdn.example.com/content/weblarek/Shell.svg",
                "https://cdn.example.com/content/weblarek/5_Dots.svg",
            ]
        );
        assert_eq!(cards[0].price, Some(Decimal::from(750)));
        assert_eq!(cards[1].price, None);
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let (client, server) = serve_once("503 Service Unavailable", "maintenance").await;

        let err = client.get_item_list().await.unwrap_err();
        server.await.unwrap();

        match err {
            ClientError::Api { status, body } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_order_posts_flat_body() {
        let (client, server) = serve_once("200 OK", r#"{"id":"order-1","total":2200}"#).await;
        let order = Order {
            form: OrderForm {
                payment: "online".to_string(),
                address: "Main st. 1".to_string(),
                email: "buyer@example.com".to_string(),
                phone: "+71234567890".to_string(),
            },
            items: vec![CardId::from("a"), CardId::from("c")],
            total: Decimal::from(2200),
        };

        let result = client.order_items(&order).await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(result.id, "order-1");
        assert_eq!(result.total, Decimal::from(2200));
        assert!(request.starts_with("POST /api/weblarek/order "));
        let body = request_body(&request);
        assert_eq!(body["payment"], "online");
        assert_eq!(body["email"], "buyer@example.com");
        assert_eq!(body["items"], serde_json::json!(["a", "c"]));
        assert_eq!(body["total"].as_f64(), Some(2200.0));
        assert!(body.get("form").is_none());
    }
}
