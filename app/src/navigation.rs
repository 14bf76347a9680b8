use std::fmt;

use anyhow::Result;
use log::*;

use infra::persistence::Storage;

use crate::session::{Role, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Href(&'static str),
    Logout,
    /// Shown but not yet wired to anything.
    Nowhere,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub target: Target,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavBar {
    Admin,
    Cliente,
    Cashier,
}

const fn link(label: &'static str, target: Target) -> NavLink {
    NavLink { label, target }
}

const ADMIN_LINKS: &[NavLink] = &[
    link("Caja", Target::Href("/cashier")),
    link("Producto", Target::Href("#")),
    link("Menú", Target::Href("/menu")),
    link("Mesa", Target::Href("#")),
    link("Empleados", Target::Nowhere),
    link("Cerrar sesión", Target::Logout),
];

const CLIENTE_LINKS: &[NavLink] = &[
    link("Menú", Target::Href("/menu")),
    link("Carrito", Target::Href("#carrito")),
];

const CASHIER_LINKS: &[NavLink] = &[
    link("Caja", Target::Href("/cashier")),
    link("Mesas", Target::Href("#")),
    link("Cerrar sesión", Target::Logout),
];

impl NavBar {
    pub fn links(&self) -> &'static [NavLink] {
        match self {
            NavBar::Admin => ADMIN_LINKS,
            NavBar::Cliente => CLIENTE_LINKS,
            NavBar::Cashier => CASHIER_LINKS,
        }
    }

    pub fn find(&self, label: &str) -> Option<&'static NavLink> {
        self.links()
            .iter()
            .find(|l| l.label.eq_ignore_ascii_case(label))
    }
}

/// Bars to show for a role, top to bottom. Cashiers get the customer bar
/// with their own underneath.
pub fn nav_bars(role: &Role) -> Vec<NavBar> {
    let mut bars = Vec::new();
    match role {
        Role::Admin => bars.push(NavBar::Admin),
        _ => bars.push(NavBar::Cliente),
    }
    if *role == Role::Cajero {
        bars.push(NavBar::Cashier);
    }
    bars
}

/// Follows a link. Returns the path to navigate to, if any; the logout
/// entry ends the session first.
pub fn activate<S: Storage>(link: &NavLink, session: &Session<S>) -> Result<Option<&'static str>> {
    debug!("Activate {:?}", link);
    match link.target {
        Target::Href(href) => Ok(Some(href)),
        Target::Logout => session.logout().map(Some),
        Target::Nowhere => Ok(None),
    }
}

impl fmt::Display for NavBar {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let labels = self
            .links()
            .iter()
            .map(|l| l.label)
            .collect::<Vec<_>>();
        write!(fmt, "[ {} ]", labels.join(" | "))
    }
}
