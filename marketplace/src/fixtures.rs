//! Fixture Bootstrap
//!
//! Seed data read once at startup from a data directory containing
//! `users.json`, `orders.json` and `offers.json`. Each file is a JSON array of
//! records whose keys match the entity fields.

use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FixtureError;
use crate::models::{Offer, Order, User};

pub const USERS_FILE: &str = "users.json";
pub const ORDERS_FILE: &str = "orders.json";
pub const OFFERS_FILE: &str = "offers.json";

#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    pub users: Vec<User>,
    pub orders: Vec<Order>,
    pub offers: Vec<Offer>,
}

impl Fixtures {
    pub async fn load(dir: &Path) -> Result<Self, FixtureError> {
        Ok(Self {
            users: read_array(&dir.join(USERS_FILE)).await?,
            orders: read_array(&dir.join(ORDERS_FILE)).await?,
            offers: read_array(&dir.join(OFFERS_FILE)).await?,
        })
    }
}

async fn read_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, FixtureError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| FixtureError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let records: Vec<T> = serde_json::from_slice(&bytes).map_err(|source| FixtureError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), records = records.len(), "Read fixture file");
    Ok(records)
}
