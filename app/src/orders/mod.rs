use err_derive::Error;
use log::*;

use infra::persistence::Storage;

use crate::api::{ApiError, Backend};
use crate::cart::{self, Cart, CartStore};
use crate::notifications::{Level, Notice, SHORT};
use crate::services::{Commandable, Request};

mod models;

pub use self::models::{OrderLine, OrderPayload, OrderStatus};

/// Reasons a checkout attempt stops. All but `Storage` are things the
/// person at the till can fix and try again.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(display = "not an amount: {:?}", _0)]
    InvalidAmount(String),
    #[error(display = "no products in the cart")]
    EmptyCart,
    #[error(display = "no table selected")]
    NoTableSelected,
    #[error(display = "paid {} but the subtotal is {}", paid, subtotal)]
    InsufficientPayment { subtotal: f64, paid: f64 },
    #[error(display = "order request failed: {}", _0)]
    RequestFailed(ApiError),
    #[error(display = "order was not accepted")]
    Rejected,
    #[error(display = "cart storage: {:#}", _0)]
    Storage(anyhow::Error),
}

/// What a successful checkout sent, plus the change to hand back.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub payload: OrderPayload,
    pub change: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelOrder;

impl Request for CancelOrder {
    type Resp = ();
}

#[derive(Debug, Clone)]
pub struct Checkout<S, B> {
    cart: Cart<S>,
    backend: B,
}

impl<S: Storage, B: Backend> Checkout<S, B> {
    pub fn new(cart: Cart<S>, backend: B) -> Self {
        Checkout { cart, backend }
    }

    /// Validates the cart against the tendered amount and, if everything
    /// checks out, sends the order once. Nothing reaches the backend
    /// unless all the guards pass.
    pub fn submit(&self, raw_amount: &str) -> Result<Receipt, CheckoutError> {
        let paid = parse_amount(raw_amount)
            .ok_or_else(|| CheckoutError::InvalidAmount(raw_amount.to_string()))?;

        let entries = self.cart.get_cart().map_err(CheckoutError::Storage)?;
        let subtotal = cart::subtotal(&entries);
        if subtotal == 0.0 {
            warn!("Checkout with empty cart");
            return Err(CheckoutError::EmptyCart);
        }

        let mesa = cart::table(&entries).ok_or_else(|| {
            warn!("Checkout without a table");
            CheckoutError::NoTableSelected
        })?;

        if paid < subtotal {
            warn!("Checkout short: paid {} of {}", paid, subtotal);
            return Err(CheckoutError::InsufficientPayment { subtotal, paid });
        }

        let payload = OrderPayload::paid(&entries, subtotal, mesa, paid);
        let reply = self.backend.submit_order(&payload).map_err(|e| {
            error!("Error al enviar el pedido: {}", e);
            CheckoutError::RequestFailed(e)
        })?;

        if !is_truthy(&reply) {
            warn!("Order for {} refused; reply: {}", mesa, reply);
            return Err(CheckoutError::Rejected);
        }

        // Placed by now; a cart that will not clear is only logged.
        if let Err(e) = self.cart.keep_only_tables() {
            error!("Order for {} placed but the cart was not cleared: {:#}", mesa, e);
        }
        info!(
            "Order placed for {}: {} lines, total {}, paid {}",
            mesa,
            payload.productos.len(),
            subtotal,
            paid
        );

        Ok(Receipt {
            payload,
            change: paid - subtotal,
        })
    }

    /// Drops every product line; the table selection survives.
    pub fn cancel(&self) -> anyhow::Result<()> {
        self.cart.keep_only_tables()
    }
}

impl<S: Storage, B: Backend> Commandable<CancelOrder> for Checkout<S, B> {
    fn execute(&self, _: CancelOrder) -> anyhow::Result<()> {
        info!("Cancel order");
        self.cancel()
    }
}

impl CheckoutError {
    pub fn notice(&self) -> Notice {
        match self {
            CheckoutError::InvalidAmount(_) => Notice {
                level: Level::Error,
                title: Some("Caracteres no válidos".to_string()),
                text: None,
                timer: SHORT,
            },
            CheckoutError::EmptyCart => Notice::error("No hay productos en el carrito"),
            CheckoutError::NoTableSelected => {
                Notice::error("Debe seleccionar una mesa antes de realizar el pedido")
            }
            CheckoutError::InsufficientPayment { .. } => Notice::error("Saldo insuficiente"),
            CheckoutError::RequestFailed(_)
            | CheckoutError::Rejected
            | CheckoutError::Storage(_) => {
                Notice::error("Se ha detectado un error").with_title("Error")
            }
        }
    }
}

impl Receipt {
    pub fn notice(&self) -> Notice {
        Notice::success("Pedido realizado con éxito")
    }
}

/// Reads a tendered amount the way a browser number field hands it over:
/// leading whitespace is skipped and the longest numeric prefix wins, so
/// `"4000abc"` is 4000. Non-finite results count as unparseable.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_end = digits_from(end);
    let mut ndigits = int_end - end;
    end = int_end;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_end = digits_from(end + 1);
        ndigits += frac_end - (end + 1);
        end = frac_end;
    }
    if ndigits == 0 {
        return None;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_truthy(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
