use serde::{Deserialize, Serialize};

use infra::ids::Id;

use crate::cart::{self, CartEntry, Mesa};
use crate::menu::Product;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id_producto: Id<Product>,
    pub cantidad_producto: u32,
    pub valor_unitario: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pagado,
}

/// Body of `POST /api/order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub productos: Vec<OrderLine>,
    pub valor_total: f64,
    pub estado: OrderStatus,
    pub mesa_id: Id<Mesa>,
    pub valor_pagado: f64,
}

impl OrderPayload {
    /// Lines with a zero id, quantity or price are left out of `productos`;
    /// `valor_total` is taken as given.
    pub(super) fn paid(
        entries: &[CartEntry],
        valor_total: f64,
        mesa_id: Id<Mesa>,
        valor_pagado: f64,
    ) -> Self {
        let productos = cart::lines(entries)
            .filter(|l| !l.id.is_zero() && l.cantidad != 0 && l.precio != 0.0)
            .map(|l| OrderLine {
                id_producto: l.id,
                cantidad_producto: l.cantidad,
                valor_unitario: l.precio,
            })
            .collect();
        OrderPayload {
            productos,
            valor_total,
            estado: OrderStatus::Pagado,
            mesa_id,
            valor_pagado,
        }
    }
}
