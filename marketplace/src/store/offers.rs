use std::collections::HashMap;

use serde_json::Value;
use sqlx::{Executor, Sqlite, SqlitePool};

use super::{EntityStore, not_found, orders, users, write_error};
use crate::error::Result;
use crate::models::{EntityKind, Offer, OfferView, Record};

pub(super) async fn fetch_all(pool: &SqlitePool) -> sqlx::Result<Vec<Offer>> {
    sqlx::query_as::<_, Offer>("SELECT id, order_id, executor_id FROM offers ORDER BY id")
        .fetch_all(pool)
        .await
}

pub(super) async fn fetch_one(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Offer>> {
    sqlx::query_as::<_, Offer>("SELECT id, order_id, executor_id FROM offers WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(super) async fn upsert<'e, E>(executor: E, offer: &Offer) -> sqlx::Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO offers (id, order_id, executor_id)
        VALUES (?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            order_id = excluded.order_id,
            executor_id = excluded.executor_id
        "#,
    )
    .bind(offer.id)
    .bind(offer.order_id)
    .bind(offer.executor_id)
    .execute(executor)
    .await?;

    Ok(())
}

// ========== Offer Operations ==========

impl EntityStore {
    /// Every offer with its order and executor embedded as they are right now.
    pub async fn list_offers(&self) -> Result<Vec<OfferView>> {
        let _users = self.users.read().await;
        let _orders = self.orders.read().await;
        let _offers = self.offers.read().await;

        let offers = fetch_all(&self.db).await?;
        if offers.is_empty() {
            return Ok(Vec::new());
        }

        let orders: HashMap<i64, _> = orders::fetch_all(&self.db)
            .await?
            .into_iter()
            .map(|order| (order.id, order))
            .collect();
        let users: HashMap<i64, _> = users::fetch_all(&self.db)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        Ok(offers
            .iter()
            .map(|offer| {
                OfferView::render(
                    offer,
                    orders.get(&offer.order_id).cloned(),
                    users.get(&offer.executor_id).cloned(),
                )
            })
            .collect())
    }

    pub async fn create_offer(&self, offer: &Offer) -> Result<()> {
        let _guard = self.offers.write().await;
        upsert(&*self.db, offer).await?;
        Ok(())
    }

    pub async fn get_offer(&self, id: i64) -> Result<OfferView> {
        let _users = self.users.read().await;
        let _orders = self.orders.read().await;
        let _offers = self.offers.read().await;

        let offer = fetch_one(&self.db, id)
            .await?
            .ok_or_else(|| not_found(EntityKind::Offer, id))?;

        let order = orders::fetch_one(&self.db, offer.order_id).await?;
        let executor = users::fetch_one(&self.db, offer.executor_id).await?;

        Ok(OfferView::render(&offer, order, executor))
    }

    pub async fn update_offer(&self, id: i64, payload: Value) -> Result<()> {
        let offer = Offer::from_payload(payload)?;

        let _guard = self.offers.write().await;
        let result = sqlx::query("UPDATE offers SET id = ?, order_id = ?, executor_id = ? WHERE id = ?")
            .bind(offer.id)
            .bind(offer.order_id)
            .bind(offer.executor_id)
            .bind(id)
            .execute(&*self.db)
            .await
            .map_err(write_error(EntityKind::Offer, offer.id))?;

        if result.rows_affected() == 0 {
            return Err(not_found(EntityKind::Offer, id));
        }
        Ok(())
    }

    pub async fn delete_offer(&self, id: i64) -> Result<()> {
        let _guard = self.offers.write().await;
        let result = sqlx::query("DELETE FROM offers WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(EntityKind::Offer, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::models::Offer;
    use crate::store::tests::{order, store, user};

    fn offer(id: i64, order_id: i64, executor_id: i64) -> Offer {
        Offer {
            id,
            order_id,
            executor_id,
        }
    }

    #[tokio::test]
    async fn test_get_embeds_order_and_executor() {
        let store = store().await;
        store.create_user(&user(1)).await.unwrap();
        store.create_user(&user(2)).await.unwrap();
        store.create_order(&order(10, 1, Some(2))).await.unwrap();
        store.create_offer(&offer(100, 10, 2)).await.unwrap();

        let rendered = serde_json::to_value(store.get_offer(100).await.unwrap()).unwrap();
        assert_eq!(
            rendered,
            json!({
                "id": 100,
                "order": serde_json::to_value(order(10, 1, Some(2))).unwrap(),
                "executor": serde_json::to_value(user(2)).unwrap(),
            })
        );
    }

    #[tokio::test]
    async fn test_embedding_reflects_later_updates() {
        let store = store().await;
        store.create_user(&user(2)).await.unwrap();
        store.create_order(&order(10, 1, Some(2))).await.unwrap();
        store.create_offer(&offer(100, 10, 2)).await.unwrap();

        let mut payload = serde_json::to_value(user(2)).unwrap();
        payload["phone"] = json!("555");
        store.update_user(2, payload).await.unwrap();

        let mut payload = serde_json::to_value(order(10, 1, Some(2))).unwrap();
        payload["price"] = json!(900);
        store.update_order(10, payload).await.unwrap();

        let view = store.get_offer(100).await.unwrap();
        assert_eq!(view.executor.unwrap().phone, "555");
        assert_eq!(view.order.unwrap().price, 900);
    }

    #[tokio::test]
    async fn test_dangling_references_render_null() {
        let store = store().await;
        store.create_user(&user(2)).await.unwrap();
        store.create_offer(&offer(100, 10, 2)).await.unwrap();
        store.delete_user(2).await.unwrap();

        let view = store.get_offer(100).await.unwrap();
        assert_eq!(view.order, None);
        assert_eq!(view.executor, None);
    }

    #[tokio::test]
    async fn test_list_renders_each_offer() {
        let store = store().await;
        store.create_user(&user(2)).await.unwrap();
        store.create_user(&user(3)).await.unwrap();
        store.create_order(&order(10, 1, None)).await.unwrap();
        store.create_offer(&offer(101, 10, 3)).await.unwrap();
        store.create_offer(&offer(100, 10, 2)).await.unwrap();

        let views = store.list_offers().await.unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].id, 100);
        assert_eq!(views[0].executor.as_ref().unwrap().id, 2);
        assert_eq!(views[1].executor.as_ref().unwrap().id, 3);
        assert!(views.iter().all(|v| v.order.as_ref().unwrap().id == 10));
    }

    #[tokio::test]
    async fn test_update_missing_order_id() {
        let store = store().await;
        store.create_offer(&offer(100, 10, 2)).await.unwrap();

        let err = store
            .update_offer(100, json!({ "id": 100, "executor_id": 3 }))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Field order_id is required");

        store
            .update_offer(100, json!({ "id": 100, "order_id": 11, "executor_id": 3 }))
            .await
            .unwrap();
        let view = store.get_offer(100).await.unwrap();
        assert_eq!(view.id, 100);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let store = store().await;
        store.create_offer(&offer(100, 10, 2)).await.unwrap();
        store.delete_offer(100).await.unwrap();

        let err = store.get_offer(100).await.unwrap_err();
        assert_eq!(err.to_string(), "Offer not found");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_leave_one_whole_payload() {
        let store = Arc::new(store().await);
        store.create_offer(&offer(1, 0, 0)).await.unwrap();

        let handles: Vec<_> = (1..=50)
            .map(|k| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .update_offer(1, json!({"id": 1, "order_id": k, "executor_id": k}))
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // Fields from two different payloads must never end up mixed.
        let stored = store.list_offers().await.unwrap();
        assert_eq!(stored.len(), 1);
        let (order_id, executor_id): (i64, i64) =
            sqlx::query_as("SELECT order_id, executor_id FROM offers WHERE id = 1")
                .fetch_one(&**store.database())
                .await
                .unwrap();
        assert_eq!(order_id, executor_id);
        assert!((1..=50).contains(&order_id));
    }
}
