use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::filter::{Page, Pagination};

/// Success envelope: `{success: true, data, count?, pagination?, total?}`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
    pub count: Option<usize>,
    pub pagination: Option<Pagination>,
    pub total: Option<u64>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
            count: None,
            pagination: None,
            total: None,
        }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            status_code: Some(status_code),
            ..Self::success(data)
        }
    }

    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// One page of a filtered list.
    pub fn page(page: Page<T>) -> Self {
        Self {
            count: Some(page.data.len()),
            pagination: Some(page.pagination),
            total: Some(page.total),
            ..Self::success(page.data)
        }
    }
}

/// `data: {}` for deletes and logout.
pub fn empty() -> ApiResponse<Map<String, Value>> {
    ApiResponse::success(Map::new())
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Failed to serialize response data"
                    })),
                )
                    .into_response();
            }
        };

        let mut envelope = json!({ "success": true });
        if let Some(count) = self.count {
            envelope["count"] = json!(count);
        }
        if let Some(pagination) = self.pagination {
            envelope["pagination"] = json!(pagination);
        }
        if let Some(total) = self.total {
            envelope["total"] = json!(total);
        }
        envelope["data"] = data_value;

        (status, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
