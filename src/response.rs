use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Field name → message, one entry per offending field.
pub type FieldErrors = BTreeMap<String, String>;

/// Uniform response envelope shared by every JSON endpoint.
#[derive(Debug)]
pub enum ApiResponse<T: Serialize> {
    Success {
        status: StatusCode,
        message: String,
        data: Option<T>,
    },
    Paginated {
        message: String,
        items: Vec<T>,
        pagination: Pagination,
    },
    Failure {
        status: StatusCode,
        message: String,
        error: ErrorDetail,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Text(String),
    Fields(FieldErrors),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuccessBody<'a, T: Serialize> {
    status_code: u16,
    message: &'a str,
    data: &'a Option<T>,
}

#[derive(Serialize)]
struct PageData<'a, T: Serialize> {
    items: &'a [T],
    pagination: &'a Pagination,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaginatedBody<'a, T: Serialize> {
    status_code: u16,
    message: &'a str,
    data: PageData<'a, T>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FailureBody<'a> {
    status_code: u16,
    message: &'a str,
    error: &'a ErrorDetail,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        ApiResponse::Success {
            status: StatusCode::OK,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn paginated(items: Vec<T>, pagination: Pagination, message: impl Into<String>) -> Self {
        ApiResponse::Paginated {
            message: message.into(),
            items,
            pagination,
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload; serialized with `"data": null`.
    pub fn empty(status: StatusCode, message: impl Into<String>) -> Self {
        ApiResponse::Success {
            status,
            message: message.into(),
            data: None,
        }
    }

    pub fn failure(status: StatusCode, message: impl Into<String>, error: ErrorDetail) -> Self {
        ApiResponse::Failure {
            status,
            message: message.into(),
            error,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            ApiResponse::Success {
                status,
                message,
                data,
            } => {
                let body = SuccessBody {
                    status_code: status.as_u16(),
                    message: &message,
                    data: &data,
                };
                (status, Json(body)).into_response()
            }
            ApiResponse::Paginated {
                message,
                items,
                pagination,
            } => {
                let body = PaginatedBody {
                    status_code: StatusCode::OK.as_u16(),
                    message: &message,
                    data: PageData {
                        items: &items,
                        pagination: &pagination,
                    },
                };
                (StatusCode::OK, Json(body)).into_response()
            }
            ApiResponse::Failure {
                status,
                message,
                error,
            } => {
                let body = FailureBody {
                    status_code: status.as_u16(),
                    message: &message,
                    error: &error,
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

/// Slices one page out of the full result set.
///
/// `page` and `page_size` must already be clamped to at least 1. A page past
/// the end yields no items but still reports the real totals.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> (Vec<T>, Pagination) {
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);

    let start = page.saturating_sub(1).saturating_mul(page_size).min(total_items);
    let end = start.saturating_add(page_size).min(total_items);

    let page_items = items.into_iter().skip(start).take(end - start).collect();
    (
        page_items,
        Pagination {
            page,
            page_size,
            total_items,
            total_pages,
        },
    )
}
