use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nakshatra_core::NarrationError;
use serde_json::json;

/// A failed request as the browser sees it.
#[derive(Debug)]
pub struct HttpError(pub NarrationError);

impl From<NarrationError> for HttpError {
    fn from(e: NarrationError) -> Self {
        Self(e)
    }
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            NarrationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            NarrationError::NotFound(_) => StatusCode::NOT_FOUND,
            NarrationError::CredentialUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            NarrationError::GenerationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            NarrationError::DownloadFailed(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self.0 {
            NarrationError::InvalidInput(_) => "invalid-argument",
            NarrationError::NotFound(_) => "not-found",
            NarrationError::CredentialUnavailable(_) => "unavailable",
            NarrationError::GenerationFailed(_) => "internal",
            NarrationError::DownloadFailed(_) => "bad-gateway",
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        // Caller mistakes carry their own message; upstream failures get a
        // fixed summary with the upstream text in `details`.
        let (message, details) = match self.0 {
            NarrationError::InvalidInput(m) | NarrationError::NotFound(m) => (m, None),
            NarrationError::CredentialUnavailable(d) => {
                ("The narration service is not configured correctly.".to_string(), Some(d))
            }
            NarrationError::GenerationFailed(d) => ("Failed to generate narration.".to_string(), Some(d)),
            NarrationError::DownloadFailed(d) => ("Failed to fetch generated audio.".to_string(), Some(d)),
        };

        if status.is_server_error() {
            tracing::error!(code, status = status.as_u16(), details = ?details, "{message}");
        } else {
            tracing::warn!(code, status = status.as_u16(), "{message}");
        }

        (
            status,
            Json(json!({
                "error": code,
                "message": message,
                "details": details,
            })),
        )
            .into_response()
    }
}
