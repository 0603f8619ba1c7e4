mod config;
mod database;
mod error;
mod fixtures;
mod models;
mod store;
mod web;

pub use config::Config;
pub use database::Database;
pub use error::{FixtureError, StoreError};
pub use fixtures::Fixtures;
pub use models::{EntityKind, Offer, OfferView, Order, Record, User};
pub use store::EntityStore;
pub use web::{AppState, routes};
