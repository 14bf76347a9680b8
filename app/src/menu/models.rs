use serde::{Deserialize, Serialize};

use infra::ids::{Entity, Id};

use crate::cart::CartLine;

/// A sellable item as listed by `GET /api/products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(alias = "id_producto")]
    pub id: Id<Product>,
    pub nombre: String,
    pub precio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categoria: Option<String>,
}

impl Product {
    pub fn to_cart_line(&self, cantidad: u32) -> CartLine {
        CartLine {
            id: self.id,
            nombre: self.nombre.clone(),
            precio: self.precio,
            cantidad,
        }
    }
}

impl Entity for Product {
    const PREFIX: &'static str = "producto";
}
