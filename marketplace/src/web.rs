//! HTTP API Handlers
//!
//! Maps each route straight onto an entity store operation:
//! - `GET /users`, `GET /orders`, `GET /offers` - List records
//! - `POST /users`, `POST /orders`, `POST /offers` - Create a record
//! - `GET /{collection}/{id}` - Get one record
//! - `PUT /{collection}/{id}` - Replace every field of a record
//! - `DELETE /{collection}/{id}` - Delete a record
//! - `GET /health` - Liveness check
//!
//! JSON is pretty-printed with a four-space indent. Failures are plain text.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde_json::{Value, ser::PrettyFormatter};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    error::StoreError,
    models::{Offer, OfferView, Order, User},
    store::EntityStore,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EntityStore>,
}

impl AppState {
    pub fn new(store: EntityStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// JSON body rendered with a four-space indent.
pub struct PrettyJson<T>(pub T);

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        let mut body = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut body, PrettyFormatter::with_indent(b"    "));

        match self.0.serialize(&mut serializer) {
            Ok(()) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
            Err(err) => {
                error!("Serialization error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Serialization error: {}", err),
                )
                    .into_response()
            }
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::MissingField { .. } | StoreError::InvalidRecord { .. } => {
                StatusCode::BAD_REQUEST
            }
            StoreError::DuplicateKey { .. } => StatusCode::CONFLICT,
            StoreError::Database(err) => {
                error!(error = %err, "Database operation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}

type ApiResult<T> = Result<T, StoreError>;

const OK: &str = "OK";

// ========== Users ==========

async fn list_users(State(state): State<AppState>) -> ApiResult<PrettyJson<Vec<User>>> {
    Ok(PrettyJson(state.store.list_users().await?))
}

async fn create_user(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> ApiResult<&'static str> {
    state.store.create_user(&user).await?;
    info!(user_id = user.id, "User created");
    Ok(OK)
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<PrettyJson<User>> {
    Ok(PrettyJson(state.store.get_user(id).await?))
}

async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<PrettyJson<&'static str>> {
    state.store.update_user(id, payload).await?;
    info!(user_id = id, "User updated");
    Ok(PrettyJson(OK))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<PrettyJson<&'static str>> {
    state.store.delete_user(id).await?;
    info!(user_id = id, "User deleted");
    Ok(PrettyJson(OK))
}

// ========== Orders ==========

async fn list_orders(State(state): State<AppState>) -> ApiResult<PrettyJson<Vec<Order>>> {
    Ok(PrettyJson(state.store.list_orders().await?))
}

async fn create_order(
    State(state): State<AppState>,
    Json(order): Json<Order>,
) -> ApiResult<&'static str> {
    state.store.create_order(&order).await?;
    info!(order_id = order.id, customer_id = order.customer_id, "Order created");
    Ok(OK)
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<PrettyJson<Order>> {
    Ok(PrettyJson(state.store.get_order(id).await?))
}

async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<PrettyJson<&'static str>> {
    state.store.update_order(id, payload).await?;
    info!(order_id = id, "Order updated");
    Ok(PrettyJson(OK))
}

async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<PrettyJson<&'static str>> {
    state.store.delete_order(id).await?;
    info!(order_id = id, "Order deleted");
    Ok(PrettyJson(OK))
}

// ========== Offers ==========

async fn list_offers(State(state): State<AppState>) -> ApiResult<PrettyJson<Vec<OfferView>>> {
    Ok(PrettyJson(state.store.list_offers().await?))
}

async fn create_offer(
    State(state): State<AppState>,
    Json(offer): Json<Offer>,
) -> ApiResult<&'static str> {
    state.store.create_offer(&offer).await?;
    info!(
        offer_id = offer.id,
        order_id = offer.order_id,
        executor_id = offer.executor_id,
        "Offer created"
    );
    Ok(OK)
}

async fn get_offer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<PrettyJson<OfferView>> {
    Ok(PrettyJson(state.store.get_offer(id).await?))
}

async fn update_offer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<PrettyJson<&'static str>> {
    state.store.update_offer(id, payload).await?;
    info!(offer_id = id, "Offer updated");
    Ok(PrettyJson(OK))
}

async fn delete_offer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<PrettyJson<&'static str>> {
    state.store.delete_offer(id).await?;
    info!(offer_id = id, "Offer deleted");
    Ok(PrettyJson(OK))
}

/// Build the API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/offers", get(list_offers).post(create_offer))
        .route(
            "/offers/{id}",
            get(get_offer).put(update_offer).delete(delete_offer),
        )
        .route("/health", get(|| async { OK }))
        .layer(TraceLayer::new_for_http())
}
