//! JSON API over the pricing runtime.
//!
//! - `GET  /api/v1/products`: list products, optional `?category=`
//! - `GET  /api/v1/products/{id}`: one product
//! - `GET  /api/v1/categories`: distinct product categories
//! - `GET  /api/v1/rules`: rule table in evaluation order
//! - `POST /api/v1/validate`: validate one configuration
//! - `POST /api/v1/validate/batch`: validate several configurations
//! - `POST /api/v1/pricing/calculate`: price one configuration in context
//! - `POST /api/v1/quotes`: assemble a quote

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use pricebook_core::cpq::assembler::check_configurations;
use pricebook_core::{
    ApplicationError, BatchValidation, ConfigurationItem, CpqRuntime, CustomFields,
    InterfaceError, ItemPricing, OptionId, Product, ProductId, Quote, QuoteRequest, RuleSummary,
    ValidationResult,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<dyn CpqRuntime>,
    pub max_configurations: usize,
}

impl AppState {
    pub fn new(runtime: Arc<dyn CpqRuntime>, max_configurations: usize) -> Self {
        Self { runtime, max_configurations }
    }
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub selected_options: Vec<OptionId>,
}

#[derive(Debug, Deserialize)]
pub struct BatchValidateRequest {
    pub configurations: Vec<ConfigurationItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRequest {
    pub configuration: ConfigurationItem,
    pub customer_tier: Option<String>,
    pub region: Option<String>,
    pub custom_fields: Option<CustomFields>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResponse {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(flatten)]
    pub pricing: ItemPricing,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub correlation_id: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/{id}", get(get_product))
        .route("/api/v1/categories", get(list_categories))
        .route("/api/v1/rules", get(list_rules))
        .route("/api/v1/validate", post(validate_configuration))
        .route("/api/v1/validate/batch", post(validate_batch))
        .route("/api/v1/pricing/calculate", post(calculate_pricing))
        .route("/api/v1/quotes", post(create_quote))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Catalog handlers
// ---------------------------------------------------------------------------

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Json<Vec<Product>> {
    let catalog = state.runtime.catalog();
    let products = match query.category.as_deref().map(str::trim) {
        Some(category) if !category.is_empty() => {
            catalog.by_category(category).into_iter().cloned().collect()
        }
        _ => catalog.products().to_vec(),
    };
    Json(products)
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Product> {
    let correlation_id = new_correlation_id();
    state
        .runtime
        .catalog()
        .get(&ProductId(id))
        .cloned()
        .map(Json)
        .map_err(|error| application_error(ApplicationError::from(error), &correlation_id))
}

pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.runtime.catalog().categories())
}

pub async fn list_rules(State(state): State<AppState>) -> Json<Vec<RuleSummary>> {
    Json(state.runtime.describe_rules())
}

// ---------------------------------------------------------------------------
// Validation handlers
// ---------------------------------------------------------------------------

pub async fn validate_configuration(
    State(state): State<AppState>,
    body: Result<Json<ValidateRequest>, JsonRejection>,
) -> ApiResult<ValidationResult> {
    let correlation_id = new_correlation_id();
    let Json(body) = body.map_err(|rejection| malformed_json(rejection, &correlation_id))?;
    if body.product_id.0.trim().is_empty() {
        return Err(malformed("productId must not be blank", &correlation_id));
    }

    let result = state.runtime.validate(&body.product_id, &body.selected_options);
    info!(
        event_name = "api.validate.completed",
        correlation_id = %correlation_id,
        product_id = %body.product_id,
        is_valid = result.is_valid,
        errors = result.errors.len(),
        "configuration validated"
    );

    if result.is_valid {
        Ok(Json(result))
    } else {
        Err(invalid_configuration(serde_json::to_value(&result).ok(), &correlation_id))
    }
}

pub async fn validate_batch(
    State(state): State<AppState>,
    body: Result<Json<BatchValidateRequest>, JsonRejection>,
) -> ApiResult<BatchValidation> {
    let correlation_id = new_correlation_id();
    let Json(body) = body.map_err(|rejection| malformed_json(rejection, &correlation_id))?;
    check_configurations(&body.configurations, state.max_configurations)
        .map_err(|message| malformed(&message, &correlation_id))?;

    let result = state.runtime.validate_batch(&body.configurations);
    info!(
        event_name = "api.validate.completed",
        correlation_id = %correlation_id,
        items = result.items.len(),
        is_valid = result.is_valid,
        "configuration batch validated"
    );

    if result.is_valid {
        Ok(Json(result))
    } else {
        Err(invalid_configuration(serde_json::to_value(&result).ok(), &correlation_id))
    }
}

// ---------------------------------------------------------------------------
// Pricing handlers
// ---------------------------------------------------------------------------

pub async fn calculate_pricing(
    State(state): State<AppState>,
    body: Result<Json<PricingRequest>, JsonRejection>,
) -> ApiResult<PricingResponse> {
    let correlation_id = new_correlation_id();
    let Json(body) = body.map_err(|rejection| malformed_json(rejection, &correlation_id))?;
    check_configurations(std::slice::from_ref(&body.configuration), state.max_configurations)
        .map_err(|message| malformed(&message, &correlation_id))?;

    let validation = state
        .runtime
        .validate(&body.configuration.product_id, &body.configuration.selected_options);
    if !validation.is_valid {
        return Err(invalid_configuration(serde_json::to_value(&validation).ok(), &correlation_id));
    }

    let request = QuoteRequest {
        configurations: vec![body.configuration],
        customer_tier: body.customer_tier,
        region: body.region,
        custom_fields: body.custom_fields,
        tax_rate: None,
    };
    let item = &request.configurations[0];
    let pricing = state
        .runtime
        .price_item(item, &request)
        .map_err(|error| application_error(ApplicationError::from(error), &correlation_id))?;

    info!(
        event_name = "api.pricing.calculated",
        correlation_id = %correlation_id,
        product_id = %item.product_id,
        base_price = pricing.base_price,
        final_price = pricing.final_price,
        "item priced"
    );

    Ok(Json(PricingResponse {
        product_id: item.product_id.clone(),
        quantity: item.quantity,
        pricing,
    }))
}

pub async fn create_quote(
    State(state): State<AppState>,
    body: Result<Json<QuoteRequest>, JsonRejection>,
) -> ApiResult<Quote> {
    let correlation_id = new_correlation_id();
    let Json(request) = body.map_err(|rejection| malformed_json(rejection, &correlation_id))?;
    request
        .check_shape(state.max_configurations)
        .map_err(|message| malformed(&message, &correlation_id))?;

    match state.runtime.generate_quote(&request) {
        Ok(quote) => {
            info!(
                event_name = "api.quote.generated",
                correlation_id = %correlation_id,
                quote_id = %quote.id,
                items = quote.items.len(),
                total = quote.total,
                "quote generated"
            );
            Ok(Json(quote))
        }
        Err(error) => {
            warn!(
                event_name = "api.quote.rejected",
                correlation_id = %correlation_id,
                error = %error,
                "quote request rejected"
            );
            Err(application_error(ApplicationError::from(error), &correlation_id))
        }
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

fn malformed(message: &str, correlation_id: &str) -> (StatusCode, Json<ApiError>) {
    warn!(
        event_name = "api.request.malformed",
        correlation_id = %correlation_id,
        reason = %message,
        "request rejected before evaluation"
    );
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            error: message.to_string(),
            details: None,
            correlation_id: correlation_id.to_string(),
        }),
    )
}

fn malformed_json(rejection: JsonRejection, correlation_id: &str) -> (StatusCode, Json<ApiError>) {
    malformed(&format!("invalid request body: {}", rejection.body_text()), correlation_id)
}

fn invalid_configuration(
    details: Option<serde_json::Value>,
    correlation_id: &str,
) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            error: "Configuration is invalid".to_string(),
            details,
            correlation_id: correlation_id.to_string(),
        }),
    )
}

fn application_error(error: ApplicationError, correlation_id: &str) -> (StatusCode, Json<ApiError>) {
    match error.into_interface(correlation_id) {
        InterfaceError::BadRequest { message, details, correlation_id } => (
            StatusCode::BAD_REQUEST,
            Json(ApiError { error: message, details, correlation_id }),
        ),
        InterfaceError::NotFound { message, correlation_id } => (
            StatusCode::NOT_FOUND,
            Json(ApiError { error: message, details: None, correlation_id }),
        ),
        internal @ InterfaceError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: internal.user_message().to_string(),
                details: None,
                correlation_id: internal.correlation_id().to_string(),
            }),
        ),
    }
}
