//! TOML file configuration structures.
//!
//! These structs directly map to the `storefront.toml` file format.

use serde::{Deserialize, Serialize};
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiSection,
}

/// Backend location.
///
/// Either `origin` or `base_url` must be given. `base_url` and `cdn_url`
/// override the paths derived from `origin`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSection {
    /// Bare API origin (e.g., "https://larek-api.nomoreparties.co").
    pub origin: Option<Url>,
    /// Full base URL of the storefront endpoints.
    pub base_url: Option<Url>,
    /// Prefix for card image paths.
    pub cdn_url: Option<String>,
}
