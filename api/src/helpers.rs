use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};

use crate::errors::ApiError;

/// Logs a failed request and turns it into a bodiless status response.
///
/// Client-input errors are logged at `warn`, storage failures at `error`.
pub(crate) fn error_response(action: &str, err: ApiError) -> Response {
    let status = err.status();
    if err.is_client_error() {
        warn!("{} rejected ({}): {}", action, status.as_u16(), err);
    } else {
        error!("{} failed: {}", action, err);
    }
    status.into_response()
}

/// Status for a request whose query string or body could not be decoded.
pub(crate) fn malformed_request(action: &str, detail: impl std::fmt::Display) -> Response {
    warn!("{} rejected: malformed request: {}", action, detail);
    StatusCode::BAD_REQUEST.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RepositoryError;
    use players_core::PlayerError;

    #[test]
    fn error_response_uses_error_status() {
        let response = error_response("Get player", PlayerError::NotFound(3).into());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = error_response("Get player", RepositoryError::LockPoisoned.into());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_request_is_bad_request() {
        let response = malformed_request("Create player", "expected value at line 1");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
