//! Entity Store
//!
//! Owns the users, orders and offers collections and performs every read and
//! mutation on them. Each collection has its own lock: reads share it, writes
//! take it exclusively, so two writes to the same collection never interleave.
//! Offers are rendered with their order and executor looked up at read time.

mod offers;
mod orders;
mod users;

use tokio::sync::RwLock;
use tracing::info;

use crate::config::Config;
use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::fixtures::Fixtures;
use crate::models::EntityKind;

pub struct EntityStore {
    db: Database,
    users: RwLock<()>,
    orders: RwLock<()>,
    offers: RwLock<()>,
}

impl EntityStore {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            users: RwLock::new(()),
            orders: RwLock::new(()),
            offers: RwLock::new(()),
        }
    }

    /// Opens the database described by `config` and wraps it in a store.
    pub async fn open(config: &Config) -> Result<Self> {
        let db = Database::new(config).await?;
        Ok(Self::new(db))
    }

    /// Bulk-inserts fixture data. Users go in first since orders and offers
    /// refer to them; each collection is committed as one transaction.
    pub async fn seed(&self, fixtures: &Fixtures) -> Result<()> {
        {
            let _guard = self.users.write().await;
            let mut tx = self.db.begin().await?;
            for user in &fixtures.users {
                users::upsert(&mut *tx, user).await?;
            }
            tx.commit().await?;
        }

        {
            let _guard = self.orders.write().await;
            let mut tx = self.db.begin().await?;
            for order in &fixtures.orders {
                orders::upsert(&mut *tx, order).await?;
            }
            tx.commit().await?;
        }

        {
            let _guard = self.offers.write().await;
            let mut tx = self.db.begin().await?;
            for offer in &fixtures.offers {
                offers::upsert(&mut *tx, offer).await?;
            }
            tx.commit().await?;
        }

        info!(
            users = fixtures.users.len(),
            orders = fixtures.orders.len(),
            offers = fixtures.offers.len(),
            "Fixtures seeded"
        );
        Ok(())
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

/// Turns a failed write into a `DuplicateKey` when it collided with another
/// record's id.
fn write_error(kind: EntityKind, id: i64) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |err| match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::DuplicateKey { kind, id }
        }
        _ => StoreError::Database(err),
    }
}

fn not_found(kind: EntityKind, id: i64) -> StoreError {
    StoreError::NotFound { kind, id }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::{Offer, Order, User};

    pub(crate) async fn store() -> EntityStore {
        EntityStore::open(&Config::default()).await.unwrap()
    }

    pub(crate) fn user(id: i64) -> User {
        User {
            id,
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            age: 30,
            email: "a@b.com".to_string(),
            role: "customer".to_string(),
            phone: "123".to_string(),
        }
    }

    pub(crate) fn order(id: i64, customer_id: i64, executor_id: Option<i64>) -> Order {
        Order {
            id,
            name: "Paint the fence".to_string(),
            description: "Two coats, white".to_string(),
            start_date: "02/08/2013".to_string(),
            end_date: "03/08/2013".to_string(),
            address: "4759 William Haven Apt. 194".to_string(),
            price: 500,
            customer_id,
            executor_id,
        }
    }

    #[tokio::test]
    async fn test_seed_loads_every_collection() {
        let store = store().await;
        let fixtures = Fixtures {
            users: vec![user(1), user(2)],
            orders: vec![order(10, 1, Some(2))],
            offers: vec![Offer {
                id: 100,
                order_id: 10,
                executor_id: 2,
            }],
        };

        store.seed(&fixtures).await.unwrap();

        assert_eq!(store.list_users().await.unwrap().len(), 2);
        assert_eq!(store.list_orders().await.unwrap(), vec![order(10, 1, Some(2))]);

        let offer = store.get_offer(100).await.unwrap();
        assert_eq!(offer.order, Some(order(10, 1, Some(2))));
        assert_eq!(offer.executor, Some(user(2)));
    }

    #[tokio::test]
    async fn test_cancelled_operations_keep_in_memory_data() {
        let store = store().await;
        let fixtures = Fixtures {
            users: (1..=200).map(user).collect(),
            ..Fixtures::default()
        };
        store.seed(&fixtures).await.unwrap();

        for i in 0..2000u64 {
            let budget = Duration::from_micros(i % 50);
            let _ = tokio::time::timeout(budget, store.create_user(&user(1000 + i as i64))).await;
            let _ = tokio::time::timeout(budget, store.list_users()).await;
        }

        let users = store.list_users().await.unwrap();
        assert!(users.len() >= 200);
        assert_eq!(&users[..200], &fixtures.users[..]);
        assert!(users[200..].iter().all(|u| u.id >= 1000));
    }
}
