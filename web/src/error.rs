use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

/// Errors that abort a request. Problems with the uploaded data or the database
/// are reported inside the rendered page instead.
#[derive(thiserror::Error, Debug)]
pub(crate) enum Error {
    #[error("Resource Not Found: {0}")]
    NotFound(String),
    #[error("Required parameter '{0}' is missing")]
    RequiredParameterMissing(String),
    #[error(transparent)]
    Multipart(#[from] MultipartError),
}

impl Error {
    pub(crate) fn to_client_status(&self) -> (StatusCode, String) {
        match self {
            Error::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            Error::RequiredParameterMissing(param) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Missing parameter '{param}'"),
            ),
            Error::Multipart(e) => (e.status(), e.body_text()),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        warn!("Got error for response: {self:?}");
        self.to_client_status().into_response()
    }
}
