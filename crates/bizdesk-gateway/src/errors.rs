use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bizdesk_core::DeskError;
use chrono::Utc;
use tracing::{error, warn};

pub(crate) fn desk_error(err: DeskError) -> (StatusCode, String) {
    let status = match &err {
        DeskError::Validation(_) | DeskError::InvalidPeriod { .. } => StatusCode::BAD_REQUEST,
        DeskError::DuplicateCode { .. } | DeskError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        DeskError::NotFound { .. } => StatusCode::NOT_FOUND,
        DeskError::ConfirmationRequired(_) => StatusCode::PRECONDITION_REQUIRED,
        DeskError::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("request failed: {err}");
    } else {
        warn!("request rejected ({status}): {err}");
    }
    (status, err.to_string())
}

pub(crate) fn internal_error<E: std::fmt::Display>(err: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// CSV body served as a download named `<kind>_<YYYY-MM-DD>.csv`.
pub(crate) fn csv_attachment(kind: &str, body: String) -> Response {
    let filename = format!("{kind}_{}.csv", Utc::now().date_naive().format("%Y-%m-%d"));
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
