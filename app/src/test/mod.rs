//! Guarded with `#[cfg(test)]` from `lib.rs`

use anyhow::Result;
use infra::ids::Id;
use infra::persistence::MemoryStorage;
use url::Url;

use crate::api::ApiError;
use crate::cart::{CartEntry, CartStore, TableMarker};
use crate::orders::{CheckoutError, OrderStatus};
use crate::services::Commandable;
use crate::Pos;


use self::fakes::{product, BrokenDisk, RecordingBackend, Reply};

fn till(backend: RecordingBackend) -> Pos<MemoryStorage, RecordingBackend> {
    env_logger::try_init().unwrap_or_default();
    Pos::with_parts(MemoryStorage::new(), backend)
}

fn menu_backend() -> RecordingBackend {
    RecordingBackend::with_products(vec![
        product(1, "Soda", 2000.0, "Bebidas"),
        product(2, "Arepa", 4500.0, "Comidas"),
    ])
}

#[test]
fn soda_for_table_five_as_transaction_script() -> Result<()> {
    let backend = menu_backend();
    let pos = till(backend.clone());

    pos.add_product(Id::new(1), 2)?;
    pos.cart().select_table(Id::new(5))?;

    let receipt = pos.checkout().submit("4000")?;

    let sent = backend.orders();
    assert_eq!(sent.len(), 1);
    let order = &sent[0];
    assert_eq!(order.valor_total, 4000.0);
    assert_eq!(order.mesa_id, Id::new(5));
    assert_eq!(order.valor_pagado, 4000.0);
    assert_eq!(order.estado, OrderStatus::Pagado);
    assert_eq!(order.productos.len(), 1);
    assert_eq!(order.productos[0].id_producto, Id::new(1));
    assert_eq!(order.productos[0].cantidad_producto, 2);
    assert_eq!(order.productos[0].valor_unitario, 2000.0);

    assert_eq!(receipt.payload, *order);
    assert_eq!(receipt.change, 0.0);
    assert_eq!(
        pos.cart().get_cart()?,
        vec![CartEntry::Table(TableMarker { id_mesa: Id::new(5) })]
    );
    Ok(())
}

#[test]
fn overpayment_reports_change() -> Result<()> {
    let pos = till(menu_backend());
    pos.add_product(Id::new(2), 1)?;
    pos.cart().select_table(Id::new(1))?;

    let receipt = pos.checkout().submit("5000")?;

    assert_eq!(receipt.change, 500.0);
    assert_eq!(receipt.payload.valor_pagado, 5000.0);
    assert_eq!(receipt.payload.valor_total, 4500.0);
    Ok(())
}

#[test]
fn non_numeric_amount_is_refused_without_calling_the_api() -> Result<()> {
    let backend = menu_backend();
    let pos = till(backend.clone());
    pos.add_product(Id::new(1), 1)?;
    pos.cart().select_table(Id::new(5))?;

    let err = pos.checkout().submit("mucho").expect_err("should refuse");

    assert!(matches!(err, CheckoutError::InvalidAmount(_)), "{:?}", err);
    assert!(backend.orders().is_empty());
    Ok(())
}

#[test]
fn empty_cart_is_refused() -> Result<()> {
    let backend = menu_backend();
    let pos = till(backend.clone());
    pos.cart().select_table(Id::new(5))?;

    let err = pos.checkout().submit("1000").expect_err("should refuse");

    assert!(matches!(err, CheckoutError::EmptyCart), "{:?}", err);
    assert!(backend.orders().is_empty());
    Ok(())
}

#[test]
fn missing_table_is_refused() -> Result<()> {
    let backend = menu_backend();
    let pos = till(backend.clone());
    pos.add_product(Id::new(1), 1)?;

    let err = pos.checkout().submit("2000").expect_err("should refuse");

    assert!(matches!(err, CheckoutError::NoTableSelected), "{:?}", err);
    assert!(backend.orders().is_empty());
    assert_eq!(pos.cart().get_cart()?.len(), 1);
    Ok(())
}

#[test]
fn short_payment_is_refused() -> Result<()> {
    let backend = menu_backend();
    let pos = till(backend.clone());
    pos.add_product(Id::new(1), 2)?;
    pos.cart().select_table(Id::new(5))?;

    let err = pos.checkout().submit("3999.99").expect_err("should refuse");

    match err {
        CheckoutError::InsufficientPayment { subtotal, paid } => {
            assert_eq!(subtotal, 4000.0);
            assert_eq!(paid, 3999.99);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(backend.orders().is_empty());
    Ok(())
}

#[test]
fn empty_cart_is_reported_before_missing_table() -> Result<()> {
    let backend = menu_backend();
    let pos = till(backend.clone());

    let err = pos.checkout().submit("1000").expect_err("should refuse");

    assert!(matches!(err, CheckoutError::EmptyCart), "{:?}", err);
    assert!(backend.orders().is_empty());
    Ok(())
}

#[test]
fn missing_table_is_reported_before_short_payment() -> Result<()> {
    let backend = menu_backend();
    let pos = till(backend.clone());
    pos.add_product(Id::new(1), 2)?;

    let err = pos.checkout().submit("10").expect_err("should refuse");

    assert!(matches!(err, CheckoutError::NoTableSelected), "{:?}", err);
    assert!(backend.orders().is_empty());
    Ok(())
}

#[test]
fn accepted_order_stays_accepted_when_cart_cannot_be_cleared() -> Result<()> {
    env_logger::try_init().unwrap_or_default();
    let backend = menu_backend();
    let disk = BrokenDisk::default();
    let pos = Pos::with_parts(disk.clone(), backend.clone());
    pos.add_product(Id::new(1), 2)?;
    pos.cart().select_table(Id::new(5))?;
    disk.fail_writes();

    let receipt = pos.checkout().submit("4000")?;

    assert_eq!(receipt.payload.mesa_id, Id::new(5));
    assert!(!receipt.notice().is_error());
    assert_eq!(backend.orders().len(), 1);
    assert_eq!(pos.cart().get_cart()?.len(), 2);
    Ok(())
}

#[test]
fn invalid_amount_is_checked_before_anything_else() -> Result<()> {
    let pos = till(menu_backend());

    let err = pos.checkout().submit("").expect_err("should refuse");

    assert!(matches!(err, CheckoutError::InvalidAmount(_)), "{:?}", err);
    Ok(())
}

#[test]
fn falsy_reply_keeps_the_cart() -> Result<()> {
    let backend = menu_backend().replying(Reply::Body(serde_json::Value::Null));
    let pos = till(backend.clone());
    pos.add_product(Id::new(1), 1)?;
    pos.cart().select_table(Id::new(5))?;

    let err = pos.checkout().submit("2000").expect_err("should be rejected");

    assert!(matches!(err, CheckoutError::Rejected), "{:?}", err);
    assert_eq!(backend.orders().len(), 1);
    assert_eq!(pos.cart().get_cart()?.len(), 2);
    Ok(())
}

#[test]
fn failed_request_keeps_the_cart() -> Result<()> {
    let url = Url::parse("http://localhost/api/order")?;
    let backend = menu_backend().replying(Reply::Fail(ApiError::Status(url, 500)));
    let pos = till(backend.clone());
    pos.add_product(Id::new(1), 1)?;
    pos.cart().select_table(Id::new(5))?;

    let err = pos.checkout().submit("2000").expect_err("should fail");

    assert!(matches!(err, CheckoutError::RequestFailed(_)), "{:?}", err);
    assert_eq!(err.notice().text.as_deref(), Some("Se ha detectado un error"));
    assert_eq!(pos.cart().get_cart()?.len(), 2);
    Ok(())
}

#[test]
fn cancel_keeps_only_the_table() -> Result<()> {
    let pos = till(menu_backend());
    pos.add_product(Id::new(1), 1)?;
    pos.cart().select_table(Id::new(8))?;
    pos.add_product(Id::new(2), 3)?;

    pos.checkout().execute(crate::orders::CancelOrder)?;

    assert_eq!(pos.cart().get_cart()?, vec![CartEntry::table(Id::new(8))]);
    Ok(())
}

#[test]
fn adding_unknown_product_fails() -> Result<()> {
    let pos = till(menu_backend());

    let err = pos.add_product(Id::new(99), 1).expect_err("unknown product");

    assert!(format!("{:#}", err).contains("producto-99"), "{:#}", err);
    assert!(pos.cart().get_cart()?.is_empty());
    Ok(())
}

#[test]
fn menu_page_uses_signed_in_role() -> Result<()> {
    let pos = till(menu_backend());
    pos.session().login("admin")?;
    pos.add_product(Id::new(1), 1)?;

    let page = pos.menu_page(crate::menu::ProductQuery::All)?;

    assert_eq!(page.nav, vec![crate::navigation::NavBar::Admin]);
    assert_eq!(page.cart_count, 1);
    Ok(())
}
