//! HTTP handlers for `/products`

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};

use crate::crud::{Envelope, PageEnvelope, UniquenessRule};
use crate::handlers::{ApiError, ApiOperation, Created, NoContent};
use crate::repository::{Condition, EntityStore};
use crate::state::AppState;

use super::{
    name_conflict_message, parse_id, CreateProductDto, Product, ProductListQuery,
    UpdateProductDto,
};

/// Routes for the products resource
///
/// | Method | Path             | Success |
/// |--------|------------------|---------|
/// | GET    | `/products`      | 200     |
/// | POST   | `/products`      | 201     |
/// | GET    | `/products/{id}` | 200     |
/// | PATCH  | `/products/{id}` | 200     |
/// | DELETE | `/products/{id}` | 204     |
pub fn router<S>() -> Router<AppState<S>>
where
    S: EntityStore<Product> + Clone + 'static,
{
    Router::new()
        .route(
            "/products",
            get(list_products::<S>).post(create_product::<S>),
        )
        .route(
            "/products/{id}",
            get(get_product::<S>)
                .patch(update_product::<S>)
                .delete(delete_product::<S>),
        )
}

/// OpenAPI description of the products routes
#[cfg(feature = "openapi")]
#[derive(utoipa::OpenApi)]
#[openapi(
    paths(list_products, create_product, get_product, update_product, delete_product),
    components(schemas(Product, CreateProductDto, UpdateProductDto)),
    tags((name = "Products", description = "Product catalog"))
)]
pub struct ProductsApi;

fn by_id(id: i64) -> Condition {
    Condition::eq("id", id)
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/products",
    tag = "Products",
    summary = "List products",
    params(
        ("page" = Option<u64>, Query, description = "Page number, starting at 1"),
        ("perPage" = Option<u64>, Query, description = "Page size, at most `pagination.max_per_page`"),
        ("orderName" = Option<String>, Query, description = "Field to order by; needs `orderDirection`"),
        ("orderDirection" = Option<String>, Query, description = "`ASC` or `DESC`; needs `orderName`"),
        ("name" = Option<String>, Query, description = "Case-sensitive substring of the name"),
        ("minPrice" = Option<f64>, Query, description = "Lower price bound; needs `maxPrice`"),
        ("maxPrice" = Option<f64>, Query, description = "Upper price bound; needs `minPrice`"),
        ("minQuantity" = Option<i64>, Query, description = "Lower stock bound; needs `maxQuantity`"),
        ("maxQuantity" = Option<i64>, Query, description = "Upper stock bound; needs `minQuantity`"),
    ),
    responses(
        (status = 200, description = "One page of matching products", body = PageEnvelope<Product>),
        (status = 400, description = "Invalid query parameters"),
        (status = 500, description = "Storage failure"),
    )
))]
#[tracing::instrument(skip_all)]
async fn list_products<S>(
    State(state): State<AppState<S>>,
    query: Result<Query<ProductListQuery>, QueryRejection>,
) -> Result<PageEnvelope<Product>, ApiError>
where
    S: EntityStore<Product>,
{
    let operation = ApiOperation::List;
    let Query(query) = query.map_err(|r| ApiError::malformed_query(operation, &r))?;
    let params = query
        .validate(state.config().pagination.max_per_page)
        .map_err(|messages| ApiError::validation(operation, messages))?;

    state
        .products()
        .find_all(params)
        .await
        .map_err(|e| ApiError::from_crud(e, operation, state.messages()))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/products",
    tag = "Products",
    summary = "Create a product",
    request_body = CreateProductDto,
    responses(
        (status = 201, description = "Product created; `Location` points at it", body = Envelope<Product>),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "A product with this name already exists"),
        (status = 500, description = "Storage failure"),
    )
))]
#[tracing::instrument(skip_all)]
async fn create_product<S>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreateProductDto>, JsonRejection>,
) -> Result<Created<Product>, ApiError>
where
    S: EntityStore<Product>,
{
    let operation = ApiOperation::Create;
    let Json(dto) = payload.map_err(|r| ApiError::malformed_body(operation, &r))?;
    let product = dto
        .validate()
        .map_err(|messages| ApiError::validation(operation, messages))?;

    let unique_name = UniquenessRule::new(
        Condition::eq("name", product.name.as_str()),
        name_conflict_message(state.messages().locale),
    );

    let envelope = state
        .products()
        .create(&product, true, &[unique_name])
        .await
        .map_err(|e| ApiError::from_crud(e, operation, state.messages()))?;

    let location = envelope
        .data
        .as_ref()
        .map(|created| format!("/products/{}", created.id));
    tracing::info!(location = ?location, "product created");

    let response = Created::new(envelope);
    Ok(match location {
        Some(location) => response.with_location(location),
        None => response,
    })
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/products/{id}",
    tag = "Products",
    summary = "Get a product",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product", body = Envelope<Product>),
        (status = 400, description = "Id is not a positive integer"),
        (status = 404, description = "No product with this id"),
        (status = 500, description = "Storage failure"),
    )
))]
#[tracing::instrument(skip(state))]
async fn get_product<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Envelope<Product>, ApiError>
where
    S: EntityStore<Product>,
{
    let operation = ApiOperation::Get;
    let id = parse_id(&id, operation)?;

    state
        .products()
        .find_one(&by_id(id), &[])
        .await
        .map_err(|e| ApiError::from_crud(e, operation, state.messages()))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/products/{id}",
    tag = "Products",
    summary = "Update a product",
    params(("id" = i64, Path, description = "Product id")),
    request_body = UpdateProductDto,
    responses(
        (status = 200, description = "The updated product", body = Envelope<Product>),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "No product with this id"),
        (status = 500, description = "Storage failure"),
    )
))]
#[tracing::instrument(skip(state, payload))]
async fn update_product<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProductDto>, JsonRejection>,
) -> Result<Envelope<Product>, ApiError>
where
    S: EntityStore<Product>,
{
    let operation = ApiOperation::Update;
    let id = parse_id(&id, operation)?;
    let Json(dto) = payload.map_err(|r| ApiError::malformed_body(operation, &r))?;
    let changes = dto
        .validate()
        .map_err(|messages| ApiError::validation(operation, messages))?;

    state
        .products()
        .update(&by_id(id), &changes)
        .await
        .map_err(|e| ApiError::from_crud(e, operation, state.messages()))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "Products",
    summary = "Delete a product",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, description = "Id is not a positive integer"),
        (status = 404, description = "No product with this id"),
        (status = 500, description = "Storage failure"),
    )
))]
#[tracing::instrument(skip(state))]
async fn delete_product<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<NoContent, ApiError>
where
    S: EntityStore<Product>,
{
    let operation = ApiOperation::Delete;
    let id = parse_id(&id, operation)?;

    state
        .products()
        .remove(&by_id(id))
        .await
        .map_err(|e| ApiError::from_crud(e, operation, state.messages()))?;

    Ok(NoContent)
}
