//! Product CRUD and filter route handlers.
//!
//! The mutating routes identify their target by the body `productID` field,
//! never a path parameter, matching create and delete. Handlers accept either
//! form-encoded or JSON bodies through [`ProductInput`]; form strings are
//! normalized into typed JSON before validation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json, RequestExt,
    extract::{FromRequest, Query, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::{Map, Value, json};

use bramble_core::{ProductDoc, fields};

use crate::config::ResponseMode;
use crate::db::UpsertOutcome;
use crate::error::AppError;
use crate::filters;
use crate::routes::auth::MessageQuery;
use crate::services::validate::{FILTER_VALUE_FIELD, coerce_known_fields};
use crate::state::AppState;

// =============================================================================
// Input Extraction
// =============================================================================

/// A product document extracted from the request body.
///
/// JSON bodies are taken verbatim; form bodies are collected into an object
/// of strings and run through [`coerce_known_fields`].
pub struct ProductInput(pub ProductDoc);

impl FromRequest<AppState> for ProductInput {
    type Rejection = AppError;

    async fn from_request(req: Request, _state: &AppState) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));

        if is_json {
            let Json(value) = req
                .extract::<Json<Value>, _>()
                .await
                .map_err(|e| AppError::BadRequest(format!("invalid JSON body: {e}")))?;
            let doc = ProductDoc::try_from(value)
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            Ok(Self(doc))
        } else {
            let axum::Form(pairs) = req
                .extract::<axum::Form<Vec<(String, String)>>, _>()
                .await
                .map_err(|e| AppError::BadRequest(format!("invalid form body: {e}")))?;
            let map: Map<String, Value> = pairs
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            Ok(Self(ProductDoc::from_map(coerce_known_fields(map))))
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// One row of the rendered product table.
pub struct ProductRow {
    pub product_id: String,
    pub price: String,
    pub rating: String,
    pub featured: bool,
    pub extra: String,
}

impl ProductRow {
    fn from_doc(doc: &ProductDoc) -> Self {
        let extra: Map<String, Value> = doc
            .as_map()
            .iter()
            .filter(|(key, _)| {
                ![
                    fields::PRODUCT_ID,
                    fields::PRICE,
                    fields::RATING,
                    fields::FEATURED,
                ]
                .contains(&key.as_str())
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            product_id: doc.product_id().unwrap_or("-").to_string(),
            price: doc.price().map_or_else(|| "-".to_string(), |p| p.to_string()),
            rating: doc.rating().map_or_else(|| "-".to_string(), |r| r.to_string()),
            featured: doc.featured(),
            extra: if extra.is_empty() {
                String::new()
            } else {
                Value::Object(extra).to_string()
            },
        }
    }
}

/// Product listing template, shared by list-all, featured, and the filters.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub title: String,
    pub products: Vec<ProductRow>,
}

/// Create form page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/add.html")]
pub struct AddItemTemplate {
    pub error: Option<String>,
}

/// Update form page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/update.html")]
pub struct UpdateItemTemplate {
    pub error: Option<String>,
}

/// Delete form page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/delete.html")]
pub struct DeleteItemTemplate {
    pub error: Option<String>,
}

/// Threshold filter form page template, shared by both filter routes.
#[derive(Template, WebTemplate)]
#[template(path = "products/filter.html")]
pub struct FilterTemplate {
    pub title: &'static str,
    pub action: &'static str,
    pub label: &'static str,
    pub error: Option<String>,
}

// =============================================================================
// Listing Handlers
// =============================================================================

/// List every product.
pub async fn list_all(State(state): State<AppState>) -> Result<Response, AppError> {
    let docs = state.products().find_all().await?;
    Ok(list_response(&state, "All products", docs))
}

/// List featured products.
pub async fn list_featured(State(state): State<AppState>) -> Result<Response, AppError> {
    let docs = state.products().find_featured().await?;
    Ok(list_response(&state, "Featured products", docs))
}

/// Shape a document list for the configured response mode.
fn list_response(state: &AppState, title: &str, docs: Vec<ProductDoc>) -> Response {
    match state.config().response_mode {
        ResponseMode::Pages => ProductsTemplate {
            title: title.to_string(),
            products: docs.iter().map(ProductRow::from_doc).collect(),
        }
        .into_response(),
        ResponseMode::Json => Json(docs).into_response(),
    }
}

// =============================================================================
// Mutation Handlers
// =============================================================================

/// Create a product from the full request body.
pub async fn create(
    State(state): State<AppState>,
    ProductInput(doc): ProductInput,
) -> Result<Response, AppError> {
    let mode = state.config().response_mode;

    if let Err(e) = state.validator().validate_product(&doc) {
        if mode == ResponseMode::Pages {
            return Ok(Redirect::to("/addItem?error=invalid_product").into_response());
        }
        return Err(e.into());
    }

    state.products().insert(doc).await?;

    Ok(match mode {
        ResponseMode::Pages => Redirect::to("/products").into_response(),
        ResponseMode::Json => {
            (StatusCode::CREATED, Json(json!({ "status": "created" }))).into_response()
        }
    })
}

/// Upsert a product by its body `productID`.
///
/// Replaces the first matching document outright, or inserts the document
/// when nothing matches.
pub async fn update(
    State(state): State<AppState>,
    ProductInput(doc): ProductInput,
) -> Result<Response, AppError> {
    let mode = state.config().response_mode;

    if let Err(e) = state.validator().validate_product(&doc) {
        if mode == ResponseMode::Pages {
            return Ok(Redirect::to("/updateItem?error=invalid_product").into_response());
        }
        return Err(e.into());
    }

    // The validator guarantees a non-empty string id
    let product_id = doc
        .product_id()
        .ok_or_else(|| AppError::Internal("validated product lost its id".to_string()))?
        .to_string();

    let outcome = state.products().upsert_by_product_id(&product_id, doc).await?;

    Ok(match mode {
        ResponseMode::Pages => Redirect::to("/products").into_response(),
        ResponseMode::Json => match outcome {
            UpsertOutcome::Replaced => Json(json!({ "status": "replaced" })).into_response(),
            UpsertOutcome::Inserted => {
                (StatusCode::CREATED, Json(json!({ "status": "inserted" }))).into_response()
            }
        },
    })
}

/// Delete the first product matching the body `productID`.
///
/// A missing match is a success, not an error.
pub async fn delete(
    State(state): State<AppState>,
    ProductInput(doc): ProductInput,
) -> Result<Response, AppError> {
    let mode = state.config().response_mode;

    let Some(product_id) = doc.product_id().filter(|id| !id.is_empty()) else {
        if mode == ResponseMode::Pages {
            return Ok(Redirect::to("/deleteItem?error=missing_product_id").into_response());
        }
        return Err(AppError::BadRequest("missing required field 'productID'".to_string()));
    };

    let deleted = state.products().delete_by_product_id(product_id).await?;

    Ok(match mode {
        ResponseMode::Pages => Redirect::to("/products").into_response(),
        ResponseMode::Json => Json(json!({ "deleted": deleted })).into_response(),
    })
}

// =============================================================================
// Filter Handlers
// =============================================================================

/// List products whose price is strictly below the body `value`.
pub async fn filter_price_below(
    State(state): State<AppState>,
    ProductInput(doc): ProductInput,
) -> Result<Response, AppError> {
    let Some(threshold) = filter_threshold(&doc) else {
        return Ok(invalid_threshold(&state, "/lessItem"));
    };

    let docs = state.products().find_price_below(threshold).await?;
    Ok(list_response(&state, &format!("Products under {threshold}"), docs))
}

/// List products whose rating is strictly above the body `value`.
pub async fn filter_rating_above(
    State(state): State<AppState>,
    ProductInput(doc): ProductInput,
) -> Result<Response, AppError> {
    let Some(threshold) = filter_threshold(&doc) else {
        return Ok(invalid_threshold(&state, "/greaterItem"));
    };

    let docs = state.products().find_rating_above(threshold).await?;
    Ok(list_response(&state, &format!("Products rated above {threshold}"), docs))
}

fn filter_threshold(doc: &ProductDoc) -> Option<f64> {
    doc.get(FILTER_VALUE_FIELD).and_then(Value::as_f64)
}

fn invalid_threshold(state: &AppState, form_path: &str) -> Response {
    match state.config().response_mode {
        ResponseMode::Pages => {
            Redirect::to(&format!("{form_path}?error=invalid_value")).into_response()
        }
        ResponseMode::Json => AppError::BadRequest(format!(
            "field '{FILTER_VALUE_FIELD}' must be a number"
        ))
        .into_response(),
    }
}

// =============================================================================
// Form Pages
// =============================================================================

/// Display the create form.
pub async fn add_item_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    AddItemTemplate { error: query.error }
}

/// Display the update form.
pub async fn update_item_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    UpdateItemTemplate { error: query.error }
}

/// Display the delete form.
pub async fn delete_item_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    DeleteItemTemplate { error: query.error }
}

/// Display the price filter form.
pub async fn less_item_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    FilterTemplate {
        title: "Products under a price",
        action: "/lessItem",
        label: "Maximum price (exclusive)",
        error: query.error,
    }
}

/// Display the rating filter form.
pub async fn greater_item_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    FilterTemplate {
        title: "Products above a rating",
        action: "/greaterItem",
        label: "Minimum rating (exclusive)",
        error: query.error,
    }
}
