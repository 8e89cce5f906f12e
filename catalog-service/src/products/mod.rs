//! The `/products` resource
//!
//! - [`Product`]: the stored record and its [`Entity`](crate::repository::Entity) description
//! - [`CreateProductDto`], [`UpdateProductDto`], [`ProductListQuery`]: request
//!   payloads with validation
//! - [`router`]: the axum routes

mod dto;
mod entity;
mod routes;

pub use dto::{CreateProductDto, ProductListQuery, UpdateProductDto};
pub use entity::{column_for_field, NewProduct, Product, ProductChanges};
pub use routes::router;
#[cfg(feature = "openapi")]
pub use routes::ProductsApi;

use crate::crud::Locale;
use crate::handlers::{ApiError, ApiOperation};

/// Alias the products table is queried under
pub const TABLE_ALIAS: &str = "products";

/// Conflict message when a product name is already taken
pub fn name_conflict_message(locale: Locale) -> &'static str {
    match locale {
        Locale::PtBr => "Já existe um produto cadastrado com esse nome",
        Locale::En => "A product with this name already exists",
    }
}

/// Parse a path id; only positive integers are accepted
///
/// ```rust
/// use catalog_service::handlers::ApiOperation;
/// use catalog_service::products::parse_id;
///
/// assert_eq!(parse_id("42", ApiOperation::Get).unwrap(), 42);
/// assert!(parse_id("0", ApiOperation::Get).is_err());
/// assert!(parse_id("abc", ApiOperation::Get).is_err());
/// ```
pub fn parse_id(raw: &str, operation: ApiOperation) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::validation(
            operation,
            vec!["Id deve ser um número inteiro positivo".to_string()],
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ApiErrorKind;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("7", ApiOperation::Update).unwrap(), 7);

        for raw in ["0", "-3", "1.5", "", "9223372036854775808"] {
            let err = parse_id(raw, ApiOperation::Delete).unwrap_err();
            assert_eq!(err.kind, ApiErrorKind::ValidationFailed, "{raw}");
            assert_eq!(err.operation, ApiOperation::Delete);
        }
    }

    #[test]
    fn test_name_conflict_message_is_localized() {
        assert_eq!(
            name_conflict_message(Locale::PtBr),
            "Já existe um produto cadastrado com esse nome"
        );
        assert_eq!(
            name_conflict_message(Locale::En),
            "A product with this name already exists"
        );
    }
}
