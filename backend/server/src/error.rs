use axum::{
    Json,
    body::Bytes,
    http::{
        HeaderValue, Method, StatusCode,
        header::{ALLOW, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub const REQUIRED_FILE_FIELDS: &str = "Required fields: login, password, metod, number";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Missing or invalid Basic authorization")]
    Unauthorized,

    #[error("Method not allowed, use {allow}")]
    MethodNotAllowed { allow: Method },

    /// Upstream answered outside 2xx. Relayed as is, never rewritten.
    #[error("Upstream responded with {status}")]
    UpstreamHttp {
        status: StatusCode,
        content_type: Option<HeaderValue>,
        body: Bytes,
    },

    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(#[from] reqwest::Error),

    /// Only ever yielded from inside a response body stream, where it makes
    /// hyper drop the connection.
    #[error("Upstream stream failed after headers were sent: {0}")]
    StreamingFailure(reqwest::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::UpstreamHttp { status, .. } => *status,
            Self::UpstreamUnreachable(_) | Self::StreamingFailure(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            AppError::UpstreamHttp {
                content_type, body, ..
            } => {
                let mut response = (status, body).into_response();
                if let Some(content_type) = content_type {
                    response.headers_mut().insert(CONTENT_TYPE, content_type);
                }
                response
            }
            AppError::MethodNotAllowed { ref allow } => {
                let mut response =
                    (status, Json(json!({ "message": self.to_string() }))).into_response();
                if let Ok(allow) = HeaderValue::from_str(allow.as_str()) {
                    response.headers_mut().insert(ALLOW, allow);
                }
                response
            }
            _ => (status, Json(json!({ "message": self.to_string() }))).into_response(),
        }
    }
}
