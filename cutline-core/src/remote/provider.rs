//! Nutrition provider clients.
//!
//! Each provider returns per-100g records from a free-text search; one
//! of them can also resolve a scanned barcode. A barcode miss is an
//! explicit outcome, not a failure.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{FoodSource, RemoteFoodRecord};

/// Errors from one provider. Always scoped to that provider; the
/// gateway never lets them touch the other provider's results.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request to {provider} failed: {message}")]
    Request { provider: String, message: String },

    #[error("{provider} returned HTTP {status}")]
    Status { provider: String, status: u16 },

    #[error("failed to parse {provider} response: {message}")]
    Parse { provider: String, message: String },
}

/// Result of a barcode lookup. `NotFound` means the provider answered
/// and doesn't know the code; the UI should suggest searching by name
/// instead of showing an error.
#[derive(Debug, Clone, PartialEq)]
pub enum BarcodeOutcome {
    Found(RemoteFoodRecord),
    NotFound,
}

/// Per-provider policy and identity.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Short name used in logs and error notices.
    pub name: String,
    pub base_url: String,
    /// Search endpoint path, e.g. "/foods/search" or "/foods/alt-search".
    pub search_path: String,
    /// Which source category this provider's records carry.
    pub source: FoodSource,
    /// Whether this provider's failures produce a user-visible notice.
    /// Exactly one provider should report, so one search failure never
    /// shows two toasts.
    pub report_errors: bool,
    /// Whether this provider serves the barcode endpoint.
    pub supports_barcode: bool,
}

impl ProviderConfig {
    /// The primary free-text provider. Reports errors.
    pub fn primary(base_url: impl Into<String>) -> Self {
        Self {
            name: "db-a".to_string(),
            base_url: base_url.into(),
            search_path: "/foods/search".to_string(),
            source: FoodSource::RemoteDbA,
            report_errors: true,
            supports_barcode: false,
        }
    }

    /// The secondary branded/packaged-food provider. Fails silently
    /// and serves barcode lookups.
    pub fn secondary(base_url: impl Into<String>) -> Self {
        Self {
            name: "db-b".to_string(),
            base_url: base_url.into(),
            search_path: "/foods/alt-search".to_string(),
            source: FoodSource::RemoteDbB,
            report_errors: false,
            supports_barcode: true,
        }
    }
}

/// A remote nutrition source.
#[async_trait]
pub trait NutritionProvider: Send + Sync {
    fn config(&self) -> &ProviderConfig;

    async fn search(&self, query: &str) -> Result<Vec<RemoteFoodRecord>, ProviderError>;

    async fn barcode(&self, code: &str) -> Result<BarcodeOutcome, ProviderError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFood {
    name: String,
    #[serde(default)]
    calories: f64,
    #[serde(default)]
    protein: f64,
    #[serde(default)]
    carbs: f64,
    #[serde(default)]
    fat: f64,
    #[serde(default)]
    fiber: f64,
    #[serde(default)]
    sugar: f64,
    #[serde(default)]
    sodium: f64,
    serving_size: Option<f64>,
    serving_size_unit: Option<String>,
}

impl WireFood {
    fn into_record(self, source: FoodSource) -> RemoteFoodRecord {
        RemoteFoodRecord {
            name: self.name,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            fiber: self.fiber,
            sugar: self.sugar,
            sodium: self.sodium,
            serving_size: self.serving_size,
            serving_size_unit: self.serving_size_unit,
            source,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    foods: Vec<WireFood>,
}

#[derive(Debug, Deserialize)]
struct BarcodeResponse {
    found: bool,
    food: Option<WireFood>,
}

/// HTTP implementation over the provider's JSON endpoints.
pub struct HttpProvider {
    config: ProviderConfig,
    http: reqwest::Client,
}

impl HttpProvider {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn request_error(&self, e: reqwest::Error) -> ProviderError {
        ProviderError::Request {
            provider: self.config.name.clone(),
            message: e.to_string(),
        }
    }

    fn parse_error(&self, e: reqwest::Error) -> ProviderError {
        ProviderError::Parse {
            provider: self.config.name.clone(),
            message: e.to_string(),
        }
    }

    fn check_status(&self, response: &reqwest::Response) -> Result<(), ProviderError> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::Status {
                provider: self.config.name.clone(),
                status: response.status().as_u16(),
            })
        }
    }
}

#[async_trait]
impl NutritionProvider for HttpProvider {
    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn search(&self, query: &str) -> Result<Vec<RemoteFoodRecord>, ProviderError> {
        let url = format!("{}{}", self.config.base_url, self.config.search_path);
        let response = self
            .http
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        self.check_status(&response)?;

        let body: SearchResponse = response.json().await.map_err(|e| self.parse_error(e))?;
        Ok(body
            .foods
            .into_iter()
            .map(|f| f.into_record(self.config.source))
            .collect())
    }

    async fn barcode(&self, code: &str) -> Result<BarcodeOutcome, ProviderError> {
        let url = format!("{}/foods/barcode", self.config.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("code", code)])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        self.check_status(&response)?;

        let body: BarcodeResponse = response.json().await.map_err(|e| self.parse_error(e))?;
        match body.food {
            Some(food) if body.found => Ok(BarcodeOutcome::Found(
                food.into_record(self.config.source),
            )),
            _ => Ok(BarcodeOutcome::NotFound),
        }
    }
}
