//! Domain Models
//!
//! The three record types the store owns, plus the rendered form of an offer.
//! Records map one-to-one onto their table rows and onto the JSON the API
//! accepts and returns (snake_case keys, field order as declared).

use std::fmt;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{Result, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Order,
    Offer,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "User",
            EntityKind::Order => "Order",
            EntityKind::Offer => "Offer",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A storable entity with a fixed set of fields that a full replacement must carry.
pub trait Record: DeserializeOwned + Send + Unpin + 'static {
    const KIND: EntityKind;

    /// Every field, in the order an update payload is checked.
    const FIELDS: &'static [&'static str];

    /// Builds a record from an update payload.
    ///
    /// Each field must be present as a key (a `null` value counts as present);
    /// the first absent one is reported. Type mismatches are reported after
    /// the presence check.
    fn from_payload(payload: Value) -> Result<Self> {
        let object = payload.as_object();

        if let Some(&field) = Self::FIELDS
            .iter()
            .find(|field| !object.is_some_and(|o| o.contains_key(**field)))
        {
            return Err(StoreError::MissingField {
                kind: Self::KIND,
                field,
            });
        }

        serde_json::from_value(payload).map_err(|e| StoreError::InvalidRecord {
            kind: Self::KIND,
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
    pub email: String,
    pub role: String,
    pub phone: String,
}

impl Record for User {
    const KIND: EntityKind = EntityKind::User;
    const FIELDS: &'static [&'static str] = &[
        "id",
        "first_name",
        "last_name",
        "age",
        "email",
        "role",
        "phone",
    ];
}

/// A job posting. `executor_id` stays empty until someone is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub address: String,
    pub price: i64,
    pub customer_id: i64,
    pub executor_id: Option<i64>,
}

impl Record for Order {
    const KIND: EntityKind = EntityKind::Order;
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "start_date",
        "end_date",
        "address",
        "price",
        "customer_id",
        "executor_id",
    ];
}

/// A bid by an executor on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Offer {
    pub id: i64,
    pub order_id: i64,
    pub executor_id: i64,
}

impl Record for Offer {
    const KIND: EntityKind = EntityKind::Offer;
    const FIELDS: &'static [&'static str] = &["id", "order_id", "executor_id"];
}

/// How an offer is returned to clients: the referenced order and executor are
/// embedded in full. A reference that points nowhere renders as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferView {
    pub id: i64,
    pub order: Option<Order>,
    pub executor: Option<User>,
}

impl OfferView {
    pub fn render(offer: &Offer, order: Option<Order>, executor: Option<User>) -> Self {
        Self {
            id: offer.id,
            order,
            executor,
        }
    }
}
