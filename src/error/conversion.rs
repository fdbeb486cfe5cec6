/**
 * Error Conversion
 *
 * `IntoResponse` implementation for `ApiError`, so handlers can return it
 * directly with `?`.
 *
 * # Response Format
 *
 * Error responses are JSON with the following structure:
 * ```json
 * {
 *   "error": "Error message",
 *   "status": 400
 * }
 * ```
 *
 * Server-side failures (5xx) are logged with full detail here and surfaced
 * to the client with a generic message only.
 */

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::types::ApiError;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("request failed: {:?}", self);
        } else {
            tracing::debug!("request rejected ({}): {}", status, self);
        }

        let message = self.public_message();
        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap_or_else(
                |_| format!(r#"{{"error":"{}","status":{}}}"#, message, status.as_u16()),
            )))
            .unwrap_or_else(|_| {
                Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(Body::from("Internal Server Error"))
                    .unwrap()
            })
    }
}
