use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use blogsift_core::SiftError;
use serde::Serialize;
use tracing::{error, warn};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Serialize)]
struct ErrorPayload {
    error: String,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Missing 'url' field")]
    MissingUrl,
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Extraction(#[from] SiftError),
    #[error("Extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingUrl | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Extraction(SiftError::NoContent) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Extraction(e) if e.is_fetch_error() => StatusCode::BAD_GATEWAY,
            Error::Extraction(_) | Error::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, %status, "Request failed");
        } else {
            warn!(error = %self, %status, "Request rejected");
        }

        (status, Json(ErrorPayload { error: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::MissingUrl.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::from(SiftError::NoContent).status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(Error::from(SiftError::Timeout { timeout: 20 }).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(Error::from(SiftError::HttpStatus { status: 404 }).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            Error::from(SiftError::InvalidSelector { selector: "a >".into(), reason: "x".into() }).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_message_passthrough() {
        assert_eq!(Error::from(SiftError::HttpStatus { status: 404 }).to_string(), "Upstream returned HTTP status 404");
    }
}
