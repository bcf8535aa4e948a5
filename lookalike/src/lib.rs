use bon::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Resource path of the image search endpoint, relative to the base URL.
pub const PROCESS_PATH: &str = "/process";

/// Resource path of the backend health check.
pub const HEALTH_PATH: &str = "/health/";

/// Multipart field names expected by the search endpoint.
pub mod fields {
    pub const FILE: &str = "file";
    pub const GARMENT_TYPE: &str = "garment_type";
    pub const GARMENT_LAYER: &str = "garment_layer";
}

/// Envelope returned by a successful search.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SearchResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    pub data: SearchData,
}

fn default_success() -> bool {
    true
}

/// Payload of a search. `results` is left as raw JSON here so that a
/// shape mismatch can be handled where the results get rendered instead of
/// failing the whole response.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SearchData {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub results: Value,
}

impl SearchData {
    /// Decode `results` element by element, keeping input order. Returns
    /// `None` only if `results` isn't an array; elements that don't decode
    /// are returned as errors so the caller can decide what to do with them.
    pub fn items(&self) -> Option<Vec<serde_json::Result<ResultItem>>> {
        match &self.results {
            Value::Array(values) => Some(
                values
                    .iter()
                    .map(|value| ResultItem::deserialize(value))
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// Ratings come back either as a number or as scraped text such as
/// "4.3 out of 5 stars".
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Rating {
    Number(f64),
    Text(String),
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(rating) => write!(f, "{rating}"),
            Self::Text(rating) => write!(f, "{rating}"),
        }
    }
}

/// One similar item. Only the similarity score is required; anything the
/// scrapers couldn't find may be missing or `null`.
#[derive(Builder, Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ResultItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    pub cosine_similarity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,
}

/// Response of the backend health check.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
