//! HTTP responses for envelopes
//!
//! - **200 OK**: [`Envelope`] and [`PageEnvelope`] respond with themselves
//! - **201 Created**: [`Created`], optionally with a `Location` header
//! - **204 No Content**: [`NoContent`]

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::crud::{Envelope, PageEnvelope};

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

impl<T: Serialize> IntoResponse for PageEnvelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// HTTP 201 Created wrapping an envelope
#[derive(Debug)]
pub struct Created<T> {
    envelope: Envelope<T>,
    location: Option<String>,
}

impl<T> Created<T> {
    /// Create a new 201 Created response
    pub fn new(envelope: Envelope<T>) -> Self {
        Self {
            envelope,
            location: None,
        }
    }

    /// Add a Location header pointing to the created resource
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::CREATED, Json(&self.envelope)).into_response();

        if let Some(location) = self.location {
            if let Ok(header_value) = HeaderValue::from_str(&location) {
                response.headers_mut().insert(header::LOCATION, header_value);
            }
        }

        response
    }
}

/// HTTP 204 No Content
#[derive(Debug, Clone, Copy)]
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_created_sets_status_and_location() {
        let response = Created::new(Envelope::new("Criado com sucesso.", Some(1)))
            .with_location("/products/1")
            .into_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/products/1"
        );
    }

    #[tokio::test]
    async fn test_no_content_has_empty_body() {
        let response = NoContent.into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_page_envelope_is_ok() {
        let page: PageEnvelope<u8> = PageEnvelope::new(Vec::new(), 0, 1, 10, "ok");
        assert_eq!(page.into_response().status(), StatusCode::OK);
    }
}
