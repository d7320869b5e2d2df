//! Runtime API configuration.
//!
//! The file format and loading live in the app crate; this is the validated
//! result shared with the HTTP client.

use url::Url;

/// Path under the API origin that serves the storefront endpoints.
pub const API_PATH: &str = "/api/weblarek";
/// Path under the API origin that serves product images.
pub const CDN_PATH: &str = "/content/weblarek";

/// Endpoints of the storefront backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL the endpoint paths (`/product`, `/order`) are appended to.
    pub base_url: Url,
    /// Prefix prepended to every card image path.
    pub cdn_url: String,
}

impl ApiConfig {
    pub fn new(base_url: Url, cdn_url: impl Into<String>) -> Self {
        Self {
            base_url,
            cdn_url: cdn_url.into(),
        }
    }

    /// Derive both endpoints from a bare API origin such as
    /// `https://larek-api.nomoreparties.co`.
    pub fn from_origin(origin: &Url) -> Result<Self, url::ParseError> {
        let origin = origin.as_str().trim_end_matches('/');
        Ok(Self {
            base_url: Url::parse(&format!("{origin}{API_PATH}"))?,
            cdn_url: format!("{origin}{CDN_PATH}"),
        })
    }

    /// Append an endpoint path to the base URL.
    ///
    /// `Url::join` would drop the base path for absolute paths, so the
    /// path is appended textually.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}"))
    }
}
