use serde::{Deserialize, Serialize};

/// Normalized success shape returned by the API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
    /// Validation warnings attached to a 2xx response.
    ///
    /// Non-2xx responses never populate this; they fail with
    /// [`ClientError`](crate::ClientError) instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T> ApiResponse<T> {
    /// Wraps a bare payload with no pagination or warnings.
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: None,
            errors: None,
        }
    }

    /// Returns `true` when the server reported more pages.
    pub fn has_more(&self) -> bool {
        self.meta
            .as_ref()
            .and_then(|meta| meta.has_more)
            .unwrap_or(false)
    }
}

/// Pagination hints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value as JsonValue};

    use super::{ApiResponse, FieldError, PageMeta};

    #[test]
    fn decodes_camel_case_meta() {
        let envelope: ApiResponse<JsonValue> = serde_json::from_value(json!({
            "data": [{"id": "L-1"}],
            "meta": {"nextCursor": "abc", "hasMore": true, "pageSize": 25}
        }))
        .expect("envelope must decode");

        assert!(envelope.has_more());
        assert_eq!(
            envelope.meta,
            Some(PageMeta {
                next_cursor: Some("abc".to_owned()),
                has_more: Some(true),
                page_size: Some(25),
                ..PageMeta::default()
            })
        );
        assert_eq!(envelope.errors, None);
    }

    #[test]
    fn reserializes_without_added_fields() {
        let body = json!({"data": {"id": "1"}, "meta": {"hasMore": false}});
        let envelope: ApiResponse<JsonValue> =
            serde_json::from_value(body.clone()).expect("envelope must decode");
        assert_eq!(serde_json::to_value(&envelope).expect("must encode"), body);
    }

    #[test]
    fn decodes_validation_warnings() {
        let envelope: ApiResponse<JsonValue> = serde_json::from_value(json!({
            "data": null,
            "errors": [{"field": "pickupDate", "message": "in the past"}, {"message": "stale"}]
        }))
        .expect("envelope must decode");

        let errors = envelope.errors.expect("errors must be present");
        assert_eq!(
            errors[0],
            FieldError {
                field: Some("pickupDate".to_owned()),
                message: "in the past".to_owned(),
                code: None,
            }
        );
        assert_eq!(errors[1].field, None);
    }

    #[test]
    fn missing_meta_means_no_more_pages() {
        assert!(!ApiResponse::new(1).has_more());
    }
}
