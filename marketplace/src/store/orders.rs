use serde_json::Value;
use sqlx::{Executor, Sqlite, SqlitePool};

use super::{EntityStore, not_found, write_error};
use crate::error::Result;
use crate::models::{EntityKind, Order, Record};

const SELECT_ORDERS: &str = r#"
    SELECT id, name, description, start_date, end_date, address, price, customer_id, executor_id
    FROM orders
"#;

pub(super) async fn fetch_all(pool: &SqlitePool) -> sqlx::Result<Vec<Order>> {
    sqlx::query_as::<_, Order>(&format!("{SELECT_ORDERS} ORDER BY id"))
        .fetch_all(pool)
        .await
}

pub(super) async fn fetch_one(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Order>> {
    sqlx::query_as::<_, Order>(&format!("{SELECT_ORDERS} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(super) async fn upsert<'e, E>(executor: E, order: &Order) -> sqlx::Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO orders (id, name, description, start_date, end_date, address, price, customer_id, executor_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            description = excluded.description,
            start_date = excluded.start_date,
            end_date = excluded.end_date,
            address = excluded.address,
            price = excluded.price,
            customer_id = excluded.customer_id,
            executor_id = excluded.executor_id
        "#,
    )
    .bind(order.id)
    .bind(&order.name)
    .bind(&order.description)
    .bind(&order.start_date)
    .bind(&order.end_date)
    .bind(&order.address)
    .bind(order.price)
    .bind(order.customer_id)
    .bind(order.executor_id)
    .execute(executor)
    .await?;

    Ok(())
}

// ========== Order Operations ==========

impl EntityStore {
    pub async fn list_orders(&self) -> Result<Vec<Order>> {
        let _guard = self.orders.read().await;
        Ok(fetch_all(&self.db).await?)
    }

    pub async fn create_order(&self, order: &Order) -> Result<()> {
        let _guard = self.orders.write().await;
        upsert(&*self.db, order).await?;
        Ok(())
    }

    pub async fn get_order(&self, id: i64) -> Result<Order> {
        let _guard = self.orders.read().await;
        fetch_one(&self.db, id)
            .await?
            .ok_or_else(|| not_found(EntityKind::Order, id))
    }

    pub async fn update_order(&self, id: i64, payload: Value) -> Result<()> {
        let order = Order::from_payload(payload)?;

        let _guard = self.orders.write().await;
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET id = ?, name = ?, description = ?, start_date = ?, end_date = ?,
                address = ?, price = ?, customer_id = ?, executor_id = ?
            WHERE id = ?
            "#,
        )
        .bind(order.id)
        .bind(&order.name)
        .bind(&order.description)
        .bind(&order.start_date)
        .bind(&order.end_date)
        .bind(&order.address)
        .bind(order.price)
        .bind(order.customer_id)
        .bind(order.executor_id)
        .bind(id)
        .execute(&*self.db)
        .await
        .map_err(write_error(EntityKind::Order, order.id))?;

        if result.rows_affected() == 0 {
            return Err(not_found(EntityKind::Order, id));
        }
        Ok(())
    }

    pub async fn delete_order(&self, id: i64) -> Result<()> {
        let _guard = self.orders.write().await;
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(EntityKind::Order, id));
        }
        Ok(())
    }
}
