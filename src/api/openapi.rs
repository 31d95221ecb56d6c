use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::{OpenApi, ToSchema};

use crate::api::handlers::{
    CreateUserRequest, OrderBatchRequest, OrderBatchResponse, OrderRequest, User,
};

/// One structured error
#[derive(Serialize, ToSchema)]
pub struct WireError {
    /// Machine-readable error code
    #[schema(example = "field.required")]
    pub key: String,
    /// Human-readable description, omitted when absent
    pub description: Option<String>,
    /// Field or parameter the error refers to, omitted when absent
    pub location: Option<String>,
}

/// List-form container; XML root element `errors` with `code` as attribute
#[derive(Serialize, ToSchema)]
pub struct WireErrors {
    /// HTTP status code
    #[schema(example = 400)]
    pub code: u16,
    /// Errors in insertion order. Readers also accept the legacy name `errors`.
    pub error: Vec<WireError>,
}

/// Map-form container keyed by entity; XML root element `errorMap`
#[derive(Serialize, ToSchema)]
pub struct WireErrorMap {
    /// HTTP status code
    #[schema(example = 409)]
    pub code: u16,
    /// Error per failed entity key
    #[serde(rename = "errorMap")]
    pub error_map: BTreeMap<String, WireError>,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Structured Errors Demo",
        version = "0.1.0",
        description = "Demo service returning structured error payloads as JSON or XML, chosen by the Accept header.",
    ),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::create_user,
        crate::api::handlers::get_user,
        crate::api::handlers::batch_orders,
        crate::api::handlers::sample_error,
    ),
    components(
        schemas(
            WireError,
            WireErrors,
            WireErrorMap,
            User,
            CreateUserRequest,
            OrderRequest,
            OrderBatchRequest,
            OrderBatchResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Single-entity validation errors"),
        (name = "orders", description = "Per-item batch errors"),
        (name = "errors", description = "Wire format samples"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_error_schemas() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let schemas = &doc["components"]["schemas"];
        assert!(schemas["WireErrors"]["properties"]["error"].is_object());
        assert!(schemas["WireErrorMap"]["properties"]["errorMap"].is_object());
        assert!(doc["paths"]["/orders/batch"].is_object());
    }
}
