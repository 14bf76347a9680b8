use std::fmt;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::*;
use serde::{Deserialize, Serialize};

use infra::persistence::{Document, Storage};

/// Where the client goes after signing out.
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    Cajero,
    /// Anyone else, including nobody signed in (empty name).
    Cliente(String),
}

impl Role {
    pub fn from_name(name: &str) -> Self {
        match name {
            "admin" => Role::Admin,
            "cajero" => Role::Cajero,
            other => Role::Cliente(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Cajero => "cajero",
            Role::Cliente(name) => name,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Role::Cliente(name) if name.is_empty() => write!(fmt, "invitado"),
            role => write!(fmt, "{}", role.name()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionData {
    role: String,
    since: DateTime<Utc>,
}

impl Document for SessionData {
    const KEY: &'static str = "session";
}

#[derive(Debug, Clone)]
pub struct Session<S> {
    docs: S,
}

impl<S: Storage> Session<S> {
    pub fn new(docs: S) -> Self {
        Session { docs }
    }

    /// The signed-in role; a missing session reads as an anonymous customer.
    pub fn get_user_data(&self) -> Result<Role> {
        let data = self.docs.load::<SessionData>().context("load session")?;
        let role = data
            .map(|d| Role::from_name(&d.role))
            .unwrap_or_else(|| Role::Cliente(String::new()));
        debug!("Session role: {:?}", role);
        Ok(role)
    }

    pub fn since(&self) -> Result<Option<DateTime<Utc>>> {
        let data = self.docs.load::<SessionData>().context("load session")?;
        Ok(data.map(|d| d.since))
    }

    pub fn login(&self, role: &str) -> Result<Role> {
        let data = SessionData {
            role: role.to_string(),
            since: Utc::now(),
        };
        self.docs.save(&data).context("save session")?;
        info!("Signed in as {:?}", role);
        Ok(Role::from_name(role))
    }

    /// Forgets the session and returns where the client should go next.
    pub fn logout(&self) -> Result<&'static str> {
        self.docs.remove::<SessionData>().context("clear session")?;
        info!("Signed out");
        Ok(LOGIN_PATH)
    }
}
