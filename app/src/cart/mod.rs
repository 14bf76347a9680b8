use anyhow::{anyhow, Context, Result};
use log::*;

use infra::ids::Id;
use infra::persistence::Storage;

use crate::services::{Queryable, Request};

mod models;

use self::models::CartContents;
pub use self::models::{CartEntry, CartLine, Mesa, TableMarker};

/// The cart as the rest of the front end sees it. Entries keep their
/// insertion order and are addressed by position.
pub trait CartStore {
    fn get_cart(&self) -> Result<Vec<CartEntry>>;
    fn add_to_cart(&self, entry: CartEntry) -> Result<()>;
    fn remove_from_cart(&self, index: usize) -> Result<Option<CartEntry>>;
    fn clear_cart(&self) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct Cart<S> {
    docs: S,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowCart;

#[derive(Debug, Clone, PartialEq)]
pub struct CartSummary {
    pub entries: Vec<CartEntry>,
    pub subtotal: f64,
    pub mesa: Option<Id<Mesa>>,
}

impl Request for ShowCart {
    type Resp = CartSummary;
}

impl<S: Storage> Cart<S> {
    pub fn new(docs: S) -> Self {
        Cart { docs }
    }

    pub fn select_table(&self, mesa: Id<Mesa>) -> Result<()> {
        self.add_to_cart(CartEntry::table(mesa))
    }

    pub fn keep_only_tables(&self) -> Result<()> {
        let mut entries = self.load()?;
        entries.retain(CartEntry::is_table);
        self.store(entries)
    }

    fn load(&self) -> Result<Vec<CartEntry>> {
        let contents = self
            .docs
            .load::<CartContents>()
            .context("load cart")?
            .unwrap_or_default();
        Ok(contents.0)
    }

    fn store(&self, entries: Vec<CartEntry>) -> Result<()> {
        debug!("Store cart with {} entries", entries.len());
        self.docs
            .save(&CartContents(entries))
            .context("save cart")
    }
}

impl<S: Storage> CartStore for Cart<S> {
    fn get_cart(&self) -> Result<Vec<CartEntry>> {
        self.load()
    }

    fn add_to_cart(&self, entry: CartEntry) -> Result<()> {
        let mut entries = self.load()?;
        match entry {
            CartEntry::Table(marker) => {
                entries.retain(|e| !e.is_table());
                debug!("Select table {}", marker.id_mesa);
                entries.push(CartEntry::Table(marker));
            }
            CartEntry::Line(line) => {
                let existing = entries.iter_mut().find_map(|e| match e {
                    CartEntry::Line(l) if l.id == line.id => Some(l),
                    _ => None,
                });
                match existing {
                    Some(l) => {
                        l.cantidad = l.cantidad.checked_add(line.cantidad).ok_or_else(|| {
                            anyhow!(
                                "quantity of {} would overflow: {} + {}",
                                l.id,
                                l.cantidad,
                                line.cantidad
                            )
                        })?;
                        debug!("Bump {} to {}", l.id, l.cantidad);
                    }
                    None => {
                        debug!("Add {} x{}", line.id, line.cantidad);
                        entries.push(CartEntry::Line(line));
                    }
                }
            }
        }
        self.store(entries)
    }

    fn remove_from_cart(&self, index: usize) -> Result<Option<CartEntry>> {
        let mut entries = self.load()?;
        if index >= entries.len() {
            warn!(
                "Ignoring removal of cart entry {}; cart has {}",
                index,
                entries.len()
            );
            return Ok(None);
        }
        let removed = entries.remove(index);
        debug!("Removed {:?}", removed);
        self.store(entries)?;
        Ok(Some(removed))
    }

    fn clear_cart(&self) -> Result<()> {
        debug!("Clear cart");
        self.docs.remove::<CartContents>().context("clear cart")
    }
}

impl<S: Storage> Queryable<ShowCart> for Cart<S> {
    fn query(&self, _: ShowCart) -> Result<CartSummary> {
        let entries = self.get_cart()?;
        let subtotal = subtotal(&entries);
        let mesa = table(&entries);
        Ok(CartSummary {
            entries,
            subtotal,
            mesa,
        })
    }
}

pub fn lines<'a>(entries: &'a [CartEntry]) -> impl 'a + Iterator<Item = &'a CartLine> {
    entries.iter().filter_map(CartEntry::as_line)
}

pub fn subtotal(entries: &[CartEntry]) -> f64 {
    lines(entries).map(CartLine::total).sum()
}

pub fn table(entries: &[CartEntry]) -> Option<Id<Mesa>> {
    entries.iter().find_map(CartEntry::as_table)
}

/// What the cart badge shows: every entry, the table selection included.
pub fn item_count(entries: &[CartEntry]) -> usize {
    entries.len()
}
