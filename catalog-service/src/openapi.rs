//! OpenAPI document and Swagger UI
//!
//! Enabled by the `openapi` feature. The document is generated from the
//! `utoipa` annotations on the product handlers and served next to a Swagger
//! UI:
//!
//! - `GET /api-docs/openapi.json`: the OpenAPI 3.1 document
//! - `GET /swagger-ui`: the interactive UI

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::products::ProductsApi;

/// Where the Swagger UI is mounted
pub const SWAGGER_UI_PATH: &str = "/swagger-ui";

/// Where the generated document is served
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// Build the document, titled after the configured service name
pub fn api_docs(config: &Config) -> utoipa::openapi::OpenApi {
    let mut openapi = ProductsApi::openapi();
    openapi.info.title = config.service.name.clone();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description = Some(format!(
        "Product catalog. Responses are wrapped in `{{message, data}}` envelopes; messages are in {}.",
        config.service.locale
    ));
    openapi
}

/// Router serving the Swagger UI and the document it reads
pub fn swagger_ui(openapi: utoipa::openapi::OpenApi) -> Router {
    SwaggerUi::new(SWAGGER_UI_PATH)
        .url(OPENAPI_JSON_PATH, openapi)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_follows_service_name() {
        let mut config = Config::default();
        config.service.name = "catalog".to_string();

        let openapi = api_docs(&config);
        assert_eq!(openapi.info.title, "catalog");
        assert_eq!(openapi.info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_every_product_route_is_documented() {
        let openapi = api_docs(&Config::default());
        let paths: Vec<_> = openapi.paths.paths.keys().map(String::as_str).collect();
        assert_eq!(paths, ["/products", "/products/{id}"]);

        let schemas = openapi.components.expect("components").schemas;
        for name in ["Product", "CreateProductDto", "UpdateProductDto"] {
            assert!(schemas.contains_key(name), "{name}");
        }
    }
}
