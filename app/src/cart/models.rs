use serde::{Deserialize, Serialize};

use infra::ids::{Entity, Id};
use infra::persistence::Document;

use crate::menu::Product;

/// A physical table in the dining room.
#[derive(Debug)]
pub enum Mesa {}

impl Entity for Mesa {
    const PREFIX: &'static str = "mesa";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: Id<Product>,
    #[serde(default)]
    pub nombre: String,
    pub precio: f64,
    pub cantidad: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMarker {
    pub id_mesa: Id<Mesa>,
}

/// One slot in the cart. Stored untagged so the JSON keeps the plain
/// `{"id", ...}` / `{"id_mesa"}` object shapes; anything carrying an
/// `id_mesa` key is a table selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CartEntry {
    Table(TableMarker),
    Line(CartLine),
}

impl CartLine {
    pub fn total(&self) -> f64 {
        self.precio * f64::from(self.cantidad)
    }
}

impl CartEntry {
    pub fn table(id_mesa: Id<Mesa>) -> Self {
        CartEntry::Table(TableMarker { id_mesa })
    }

    pub fn as_line(&self) -> Option<&CartLine> {
        match self {
            CartEntry::Line(line) => Some(line),
            CartEntry::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<Id<Mesa>> {
        match self {
            CartEntry::Table(marker) => Some(marker.id_mesa),
            CartEntry::Line(_) => None,
        }
    }

    pub fn is_table(&self) -> bool {
        self.as_table().is_some()
    }
}

impl From<CartLine> for CartEntry {
    fn from(line: CartLine) -> Self {
        CartEntry::Line(line)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub(super) struct CartContents(pub(super) Vec<CartEntry>);

impl Document for CartContents {
    const KEY: &'static str = "cart";
}
