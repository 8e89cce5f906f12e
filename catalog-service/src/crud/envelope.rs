//! Uniform response envelopes
//!
//! Every CRUD result, success or failure, reaches the client wrapped in one of
//! these shapes. They are built per call and never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::repository::paginate;

/// `{ message: [...], data: T | null }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Envelope<T> {
    /// Human-readable status messages
    pub message: Vec<String>,
    /// Payload, serialized as `null` when absent
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Envelope with a single message
    pub fn new(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            message: vec![message.into()],
            data,
        }
    }

    /// Envelope with several messages and no data
    pub fn messages<I, M>(messages: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        Self {
            message: messages.into_iter().map(Into::into).collect(),
            data: None,
        }
    }
}

/// Paginated envelope
///
/// ```rust
/// use catalog_service::crud::PageEnvelope;
///
/// let empty: PageEnvelope<()> = PageEnvelope::new(Vec::new(), 0, 1, 10, "ok");
/// assert_eq!(empty.last_page, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    /// Records on this page
    pub data: Vec<T>,
    /// Records matching the filter across all pages
    pub total: u64,
    /// 1-indexed page number
    pub page: u64,
    /// Page size
    pub per_page: u64,
    /// Last page holding data, 0 when `total` is 0
    pub last_page: u64,
    /// Human-readable status messages
    pub message: Vec<String>,
}

impl<T> PageEnvelope<T> {
    /// Build the envelope, deriving `last_page` from `total` and `per_page`
    pub fn new(
        data: Vec<T>,
        total: u64,
        page: u64,
        per_page: u64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            data,
            total,
            page,
            per_page,
            last_page: paginate(total, page, per_page).last_page,
            message: vec![message.into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_serializes_null_data() {
        let envelope: Envelope<u32> = Envelope::new("Deletado com sucesso.", None);
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "message": ["Deletado com sucesso."], "data": null })
        );
    }

    #[test]
    fn test_envelope_with_many_messages() {
        let envelope: Envelope<()> = Envelope::messages(["a", "b"]);
        assert_eq!(envelope.message, vec!["a".to_string(), "b".to_string()]);
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_page_envelope_shape() {
        let envelope: PageEnvelope<u32> =
            PageEnvelope::new(Vec::new(), 0, 1, 10, "Consulta realizada com sucesso.");
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "data": [],
                "total": 0,
                "page": 1,
                "perPage": 10,
                "lastPage": 0,
                "message": ["Consulta realizada com sucesso."],
            })
        );
    }

    #[test]
    fn test_page_envelope_last_page() {
        let envelope = PageEnvelope::new(vec![1, 2, 3], 23, 3, 10, "ok");
        assert_eq!(envelope.last_page, 3);
    }
}
