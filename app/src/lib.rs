use anyhow::{anyhow, Context, Result};
use log::*;

use infra::ids::Id;
use infra::persistence::Storage;

pub mod api;
pub mod cart;
pub mod config;
pub mod menu;
pub mod navigation;
pub mod notifications;
pub mod orders;
pub mod page;
pub mod services;
pub mod session;

#[cfg(test)]
mod test;

use crate::api::{Backend, HttpBackend};
use crate::cart::{Cart, CartStore};
use crate::config::ConfiguredStorage;
use crate::menu::{Menu, Product, ProductQuery};
use crate::orders::Checkout;
use crate::page::MenuPage;
use crate::session::Session;

/// One till: where its cart and session are kept, and the order API it
/// talks to.
#[derive(Debug, Clone)]
pub struct Pos<S, B> {
    storage: S,
    backend: B,
}

impl Pos<ConfiguredStorage, HttpBackend> {
    pub fn new(config: &config::Config) -> Result<Self> {
        let backend = config.api.build()?;
        let storage = config.storage.build();
        info!("Till talking to {}", backend.base_url());
        Ok(Pos::with_parts(storage, backend))
    }
}

impl<S: Storage + Clone, B: Backend + Clone> Pos<S, B> {
    pub fn with_parts(storage: S, backend: B) -> Self {
        Pos { storage, backend }
    }

    pub fn menu(&self) -> Menu<B> {
        Menu::new(self.backend.clone())
    }

    pub fn cart(&self) -> Cart<S> {
        Cart::new(self.storage.clone())
    }

    pub fn session(&self) -> Session<S> {
        Session::new(self.storage.clone())
    }

    pub fn checkout(&self) -> Checkout<S, B> {
        Checkout::new(self.cart(), self.backend.clone())
    }

    /// Looks the product up on the menu and puts `cantidad` of it in the
    /// cart.
    pub fn add_product(&self, id: Id<Product>, cantidad: u32) -> Result<Product> {
        let product = self
            .menu()
            .find(id)?
            .ok_or_else(|| anyhow!("no such product on the menu: {}", id))?;
        self.cart()
            .add_to_cart(product.to_cart_line(cantidad).into())
            .with_context(|| format!("add {} to cart", id))?;
        Ok(product)
    }

    pub fn menu_page(&self, query: ProductQuery) -> Result<MenuPage> {
        let role = self.session().get_user_data()?;
        MenuPage::load(&self.menu(), &self.cart(), role, query)
    }
}
