//! Database Infrastructure Layer
//!
//! Handles the SQLite connection and schema. Queries live with the store;
//! this layer is only responsible for getting a usable pool.

use std::{ops::Deref, str::FromStr, sync::Arc};

use sqlx::{
    ConnectOptions, SqliteConnection, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    /// Outside the pool, so no dropped pool connection can take the
    /// in-memory database down with it.
    anchor: Option<Arc<Mutex<SqliteConnection>>>,
}

impl Deref for Database {
    type Target = SqlitePool;
    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}

impl Database {
    pub async fn new(config: &Config) -> Result<Self> {
        let database_config =
            SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);

        // `:memory:` is a named shared-cache database that sqlite frees as soon
        // as its last connection closes. A cancelled query can make the pool
        // drop a connection, so one connection is held open for as long as
        // `Database` lives.
        let (pool_options, anchor) = if config.is_in_memory() {
            let anchor = database_config.clone().connect().await?;
            debug!("In-memory database anchored");
            (
                SqlitePoolOptions::new().max_connections(1),
                Some(Arc::new(Mutex::new(anchor))),
            )
        } else {
            (
                SqlitePoolOptions::new().max_connections(config.max_connections),
                None,
            )
        };

        let pool = pool_options.connect_lazy_with(database_config);

        let db = Self { pool, anchor };
        db.initialize_tables().await?;

        info!("Database initialized at {}", config.database_url);
        Ok(db)
    }

    async fn initialize_tables(&self) -> Result<()> {
        // References between tables are plain integers: nothing stops an order
        // from pointing at a user that was deleted or never existed.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                age INTEGER NOT NULL,
                email TEXT NOT NULL,
                role TEXT NOT NULL,
                phone TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                address TEXT NOT NULL,
                price INTEGER NOT NULL,
                customer_id INTEGER NOT NULL,
                executor_id INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS offers (
                id INTEGER PRIMARY KEY,
                order_id INTEGER NOT NULL,
                executor_id INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_customer_id ON orders(customer_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_offers_order_id ON offers(order_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
