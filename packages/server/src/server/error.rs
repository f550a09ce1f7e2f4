use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use verification::VerifyError;

/// Error body returned by the JSON endpoints: `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Verify(#[from] VerifyError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Verify(e) if e.is_input_error() => StatusCode::BAD_REQUEST,
            ApiError::Verify(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verification::SearchError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(VerifyError::invalid_query("too short")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(VerifyError::Search(SearchError::Timeout)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::BadRequest("bad json".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(VerifyError::Cancelled).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
