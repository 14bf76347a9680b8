use std::fmt;

use anyhow::Result;
use log::*;

use infra::persistence::Storage;

use crate::api::Backend;
use crate::cart::{self, Cart, CartEntry, CartStore, CartSummary};
use crate::menu::{self, ListProducts, Menu, Product, ProductQuery};
use crate::navigation::{self, NavBar};
use crate::services::Queryable;
use crate::session::Role;

#[derive(Debug, Clone)]
pub struct MenuPage {
    pub role: Role,
    pub nav: Vec<NavBar>,
    pub query: ProductQuery,
    pub categories: Vec<String>,
    pub cart_count: usize,
    pub products: Vec<Product>,
}

impl MenuPage {
    pub fn load<B: Backend, S: Storage>(
        menu: &Menu<B>,
        cart: &Cart<S>,
        role: Role,
        query: ProductQuery,
    ) -> Result<Self> {
        let nav = navigation::nav_bars(&role);
        let mut page = MenuPage {
            role,
            nav,
            query: query.clone(),
            categories: Vec::new(),
            cart_count: 0,
            products: Vec::new(),
        };
        page.fetch(menu)?;
        page.refresh_cart(cart)?;
        Ok(page)
    }

    /// Switches category; the product grid is fetched again only when the
    /// query actually changes.
    pub fn set_query<B: Backend>(&mut self, menu: &Menu<B>, query: ProductQuery) -> Result<bool> {
        if query == self.query {
            debug!("Query unchanged: {:?}", query);
            return Ok(false);
        }
        self.query = query;
        self.fetch(menu)?;
        Ok(true)
    }

    pub fn refresh_cart<S: Storage>(&mut self, cart: &Cart<S>) -> Result<()> {
        self.cart_count = cart::item_count(&cart.get_cart()?);
        Ok(())
    }

    fn fetch<B: Backend>(&mut self, menu: &Menu<B>) -> Result<()> {
        self.products = menu.query(ListProducts {
            query: self.query.clone(),
        })?;
        // Keep categories seen on earlier loads so the option bar doesn't
        // shrink to one entry once a category is picked.
        for cat in menu::categories(&self.products) {
            if !self.categories.contains(&cat) {
                self.categories.push(cat);
            }
        }
        Ok(())
    }
}

impl fmt::Display for MenuPage {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for bar in self.nav.iter() {
            writeln!(fmt, "{}", bar)?;
        }
        write!(fmt, "Categorías: Todos")?;
        for cat in self.categories.iter() {
            write!(fmt, " · {}", cat)?;
        }
        writeln!(fmt)?;
        if self.cart_count > 0 {
            writeln!(fmt, "🛒 ({})", self.cart_count)?;
        } else {
            writeln!(fmt, "🛒")?;
        }
        writeln!(fmt)?;
        for p in self.products.iter() {
            write!(fmt, "{:>4}  {:<30} ${}", p.id.get(), p.nombre, format_price(p.precio))?;
            if let Some(cat) = p.categoria.as_ref() {
                write!(fmt, "  ({})", cat)?;
            }
            writeln!(fmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for CartSummary {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        writeln!(fmt, "Resumen de compra")?;
        for (index, entry) in self.entries.iter().enumerate() {
            match entry {
                CartEntry::Table(marker) => writeln!(fmt, "[{}] Mesa: {}", index, marker.id_mesa.get())?,
                CartEntry::Line(line) => writeln!(
                    fmt,
                    "[{}] {} - Cantidad: {}  Precio: ${}",
                    index,
                    line.nombre,
                    line.cantidad,
                    format_price(line.precio)
                )?,
            }
        }
        write!(fmt, "Subtotal: ${}", format_price(self.subtotal))
    }
}

/// `2000` → `2,000`, `2500.5` → `2,500.5`.
pub fn format_price(value: f64) -> String {
    let rounded = (value.abs() * 1000.0).round() / 1000.0;
    let whole = rounded.trunc();
    let thousandths = ((rounded - whole) * 1000.0).round() as u64;

    let digits = format!("{:.0}", whole);
    let mut out = String::new();
    if value < 0.0 && rounded != 0.0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if thousandths > 0 {
        let frac = format!("{:03}", thousandths);
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out
}
