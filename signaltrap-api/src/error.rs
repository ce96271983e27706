use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use signaltrap_core::TrapError;

/// Handler error. Renders as `{"error": "..."}` with the mapped status.
#[derive(Debug)]
pub struct ApiError(pub TrapError);

impl From<TrapError> for ApiError {
    fn from(err: TrapError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        tracing::error!(error = %self.0, status = status.as_u16(), "request failed");
        (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            self.0.to_json_body(),
        )
            .into_response()
    }
}
