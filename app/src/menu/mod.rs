use anyhow::{Context, Result};
use infra::ids::Id;
use log::*;

use crate::api::{Backend, PRODUCTS_PATH};
use crate::services::{Queryable, Request};

mod models;

pub use self::models::Product;

/// Which slice of the menu to show; the category bar switches between
/// these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductQuery {
    All,
    Category(String),
}

impl ProductQuery {
    pub fn path(&self) -> String {
        match self {
            ProductQuery::All => PRODUCTS_PATH.to_string(),
            ProductQuery::Category(name) => {
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("categoria", name)
                    .finish();
                format!("{}?{}", PRODUCTS_PATH, query)
            }
        }
    }
}

impl Default for ProductQuery {
    fn default() -> Self {
        ProductQuery::All
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListProducts {
    pub query: ProductQuery,
}

impl Request for ListProducts {
    type Resp = Vec<Product>;
}

#[derive(Debug, Clone)]
pub struct Menu<B> {
    backend: B,
}

impl<B: Backend> Menu<B> {
    pub fn new(backend: B) -> Self {
        Menu { backend }
    }

    pub fn find(&self, id: Id<Product>) -> Result<Option<Product>> {
        let products = self.query(ListProducts {
            query: ProductQuery::All,
        })?;
        Ok(products.into_iter().find(|p| p.id == id))
    }
}

impl<B: Backend> Queryable<ListProducts> for Menu<B> {
    fn query(&self, req: ListProducts) -> Result<Vec<Product>> {
        let path = req.query.path();
        info!("Load menu from {}", path);
        let products = self
            .backend
            .fetch_products(&path)
            .with_context(|| format!("fetch products from {}", path))?;
        debug!("Menu has {} products", products.len());
        Ok(products)
    }
}

/// Distinct categories in the order they first appear.
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen = Vec::new();
    for cat in products.iter().filter_map(|p| p.categoria.as_ref()) {
        if !seen.contains(cat) {
            seen.push(cat.clone());
        }
    }
    seen
}
