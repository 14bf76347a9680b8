use std::time::Duration;

use err_derive::Error;
use log::*;
use serde::Deserialize;
use url::Url;

use crate::menu::Product;
use crate::orders::OrderPayload;

pub const PRODUCTS_PATH: &str = "/api/products";
pub const ORDER_PATH: &str = "/api/order";

/// The order API the front end talks to.
pub trait Backend {
    /// `path` is origin-relative, e.g. `/api/products?categoria=Bebidas`.
    fn fetch_products(&self, path: &str) -> Result<Vec<Product>, ApiError>;
    fn submit_order(&self, order: &OrderPayload) -> Result<serde_json::Value, ApiError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error(display = "invalid url {:?}: {}", _0, _1)]
    Url(String, String),
    #[error(display = "request to {} failed: {}", _0, _1)]
    Transport(Url, String),
    #[error(display = "{} returned {}", _0, _1)]
    Status(Url, u16),
    #[error(display = "invalid response from {}: {}", _0, _1)]
    Decode(Url, String),
}

#[derive(Debug, Deserialize)]
struct ProductsEnvelope {
    result: Vec<Product>,
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::blocking::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: Url, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        debug!("API client rooted at {}", base_url);
        Ok(HttpBackend { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Url(path.to_string(), e.to_string()))
    }

    fn check(url: &Url, resp: &reqwest::blocking::Response) -> Result<(), ApiError> {
        let status = resp.status();
        if !status.is_success() {
            warn!("{} answered {}", url, status);
            return Err(ApiError::Status(url.clone(), status.as_u16()));
        }
        Ok(())
    }
}

impl Backend for HttpBackend {
    fn fetch_products(&self, path: &str) -> Result<Vec<Product>, ApiError> {
        let url = self.url_for(path)?;
        debug!("GET {}", url);
        let resp = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| ApiError::Transport(url.clone(), e.to_string()))?;
        Self::check(&url, &resp)?;
        let envelope = resp
            .json::<ProductsEnvelope>()
            .map_err(|e| ApiError::Decode(url.clone(), e.to_string()))?;
        debug!("GET {} -> {} products", url, envelope.result.len());
        Ok(envelope.result)
    }

    fn submit_order(&self, order: &OrderPayload) -> Result<serde_json::Value, ApiError> {
        let url = self.url_for(ORDER_PATH)?;
        debug!("POST {} {:?}", url, order);
        let resp = self
            .client
            .post(url.clone())
            .json(order)
            .send()
            .map_err(|e| ApiError::Transport(url.clone(), e.to_string()))?;
        Self::check(&url, &resp)?;
        resp.json::<serde_json::Value>()
            .map_err(|e| ApiError::Decode(url.clone(), e.to_string()))
    }
}
