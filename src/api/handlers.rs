use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::codec::WireFormat;
use crate::errors::{factory, ErrorContainer, ErrorMap, Errors, Failure};

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub default_format: WireFormat,
    pub instance_id: String,
    pub users: RwLock<HashMap<u64, User>>,
    pub inventory: HashMap<String, u32>,
}

impl AppStateInner {
    pub fn new(default_format: WireFormat, instance_id: impl Into<String>) -> Self {
        Self {
            default_format,
            instance_id: instance_id.into(),
            users: RwLock::new(HashMap::new()),
            inventory: HashMap::new(),
        }
    }

    pub fn with_inventory<I, S>(mut self, stock: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        self.inventory
            .extend(stock.into_iter().map(|(sku, qty)| (sku.into(), qty)));
        self
    }

    fn negotiate(&self, headers: &HeaderMap) -> WireFormat {
        WireFormat::from_accept(headers, self.default_format)
    }
}

/// A failure rendered in the format the client asked for.
pub struct ApiError {
    failure: Failure,
    format: WireFormat,
}

impl ApiError {
    pub fn new(failure: Failure, format: WireFormat) -> Self {
        Self { failure, format }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.failure.into_error_response() {
            Ok(response) => match response.render(self.format) {
                Ok(rendered) => rendered,
                Err(failure) => failure.into_response(),
            },
            Err(other) => other.into_response(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

/// New user payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Single order line in a batch
#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderRequest {
    pub id: String,
    pub sku: String,
    pub quantity: u32,
}

/// Batch of orders to accept or reject item by item
#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderBatchRequest {
    pub orders: Vec<OrderRequest>,
}

/// Accepted batch
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderBatchResponse {
    pub accepted: Vec<String>,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = serde_json::Value)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "structured-errors",
        "version": env!("CARGO_PKG_VERSION"),
        "instance_id": state.instance_id,
        "default_format": state.default_format,
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}

/// Create a user, reporting every invalid field at once
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid fields", body = crate::api::openapi::WireErrors),
        (status = 409, description = "Email already registered", body = crate::api::openapi::WireErrors)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let format = state.negotiate(&headers);
    register_user(&state, payload)
        .await
        .map(|user| (StatusCode::CREATED, Json(user)))
        .map_err(|failure| ApiError::new(failure, format))
}

async fn register_user(
    state: &AppStateInner,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<User, Failure> {
    let Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return factory::throw_bad_request("body.invalid", rejection.body_text()),
    };
    validate_user(&request)?;

    let mut users = state.users.write().await;
    if users.values().any(|u| u.email == request.email) {
        return factory::throw_conflict("email.taken", "email is already registered");
    }

    let user = User {
        id: users.keys().max().map_or(1, |id| id + 1),
        name: request.name,
        email: request.email,
    };
    users.insert(user.id, user.clone());
    info!(user_id = user.id, "User created");
    Ok(user)
}

fn validate_user(request: &CreateUserRequest) -> Result<(), Failure> {
    let mut errors = Errors::with_status(StatusCode::BAD_REQUEST);
    if request.name.trim().is_empty() {
        errors.add_at("field.required", "name is required", "name")?;
    }
    if request.email.trim().is_empty() {
        errors.add_at("field.required", "email is required", "email")?;
    } else if !request.email.contains('@') {
        errors.add_at("field.invalid", "email must contain '@'", "email")?;
    }

    if errors.has_errors() {
        warn!(count = errors.error_count(), "Rejected user payload");
        return Err(errors.into_failure());
    }
    Ok(())
}

/// Fetch a user by id
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = u64, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "No such user", body = crate::api::openapi::WireErrors)
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<User>, ApiError> {
    let format = state.negotiate(&headers);
    let users = state.users.read().await;
    let user = match users.get(&id) {
        Some(user) => Ok(user.clone()),
        None => factory::throw_not_found("user.missing", format!("user {} does not exist", id)),
    };
    user.map(Json).map_err(|failure| ApiError::new(failure, format))
}

/// Accept a batch of orders; failures are reported per order id
#[utoipa::path(
    post,
    path = "/orders/batch",
    tag = "orders",
    request_body = OrderBatchRequest,
    responses(
        (status = 200, description = "All orders accepted", body = OrderBatchResponse),
        (status = 409, description = "Some orders rejected", body = crate::api::openapi::WireErrorMap)
    )
)]
pub async fn batch_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<OrderBatchRequest>,
) -> Result<Json<OrderBatchResponse>, ApiError> {
    let format = state.negotiate(&headers);
    check_orders(&state.inventory, &request.orders)
        .map(|accepted| Json(OrderBatchResponse { accepted }))
        .map_err(|failure| ApiError::new(failure, format))
}

fn check_orders(
    inventory: &HashMap<String, u32>,
    orders: &[OrderRequest],
) -> Result<Vec<String>, Failure> {
    let mut error_map = ErrorMap::with_status(StatusCode::CONFLICT);
    for order in orders {
        match inventory.get(&order.sku) {
            _ if order.quantity == 0 => {
                error_map.put_at(&order.id, "quantity.invalid", "quantity must be positive", "quantity")?;
            }
            None => {
                error_map.put_at(&order.id, "sku.unknown", format!("unknown sku {}", order.sku), "sku")?;
            }
            Some(&stock) if stock < order.quantity => {
                error_map.put(
                    &order.id,
                    "stock.unavailable",
                    format!("only {} left of {}", stock, order.sku),
                )?;
            }
            Some(_) => {}
        }
    }

    if error_map.has_errors() {
        warn!(
            rejected = error_map.error_count(),
            total = orders.len(),
            "Rejected orders in batch"
        );
        return Err(error_map.into_failure());
    }
    Ok(orders.iter().map(|o| o.id.clone()).collect())
}

/// Sample payload showing the negotiated wire format
#[utoipa::path(
    get,
    path = "/errors/sample",
    tag = "errors",
    responses(
        (status = 400, description = "Sample list-form error", body = crate::api::openapi::WireErrors)
    )
)]
pub async fn sample_error(State(state): State<AppState>, headers: HeaderMap) -> ApiError {
    let format = state.negotiate(&headers);
    let failure = match Errors::single_at(400, "field.required", "name is required", "name") {
        Ok(errors) => errors.into_failure(),
        Err(failure) => failure,
    };
    ApiError::new(failure, format)
}
