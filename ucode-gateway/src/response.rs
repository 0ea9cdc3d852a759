//! Response sink.
//!
//! Every handler outcome, success or failure, leaves the gateway through
//! [`handle_response`] as a `{status, description, data, custom_message}`
//! envelope. Non-success outcomes are logged here and nowhere else.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::cache::CacheError;
use crate::status::Status;

/// The uniform response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T = Value> {
    pub status: String,
    pub description: String,
    pub data: T,
    #[serde(default)]
    pub custom_message: Option<String>,
}

/// Render a handler outcome.
pub fn handle_response<T: Serialize>(status: Status, data: T) -> Response {
    handle_response_with_message(status, data, None)
}

/// Render a handler outcome carrying an opaque client-facing tag.
pub fn handle_response_with_message<T: Serialize>(
    status: Status,
    data: T,
    custom_message: Option<String>,
) -> Response {
    let data = match serde_json::to_value(data) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response payload");
            return handle_response_with_message(
                Status::InternalServerError,
                Value::String(format!("failed to serialize response: {e}")),
                None,
            );
        }
    };

    if !status.is_success() {
        log_failure(status, &data);
    }

    let http_status = status.http();
    if status == Status::NoContent {
        return http_status.into_response();
    }

    let envelope = ApiResponse {
        status: status.label().to_string(),
        description: status.description().to_string(),
        data,
        custom_message,
    };

    match serde_json::to_vec(&envelope) {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = http_status;
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            response
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode response envelope");
            http_status.into_response()
        }
    }
}

fn log_failure(status: Status, data: &Value) {
    let message = match data {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    match status {
        Status::InternalServerError | Status::GrpcError | Status::BadEnvironment => {
            tracing::error!(
                status = status.label(),
                description = status.description(),
                error = %message,
                "Request failed"
            );
        }
        _ => {
            tracing::warn!(
                status = status.label(),
                description = status.description(),
                error = %message,
                "Request rejected"
            );
        }
    }
}

// ============================================================================
// Handler errors
// ============================================================================

/// Result alias used by every handler and helper on the request path.
pub type ApiResult<T> = Result<T, ApiError>;

/// A failed handler outcome. Rendered through the sink.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    status: Status,
    message: String,
    custom_message: Option<String>,
}

impl ApiError {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            custom_message: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(Status::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(Status::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(Status::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Status::NotFound, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(Status::InvalidArgument, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Status::InternalServerError, message)
    }

    pub fn grpc(message: impl Into<String>) -> Self {
        Self::new(Status::GrpcError, message)
    }

    pub fn bad_environment(message: impl Into<String>) -> Self {
        Self::new(Status::BadEnvironment, message)
    }

    /// Attach an opaque tag for the client.
    pub fn with_custom_message(mut self, tag: impl Into<String>) -> Self {
        self.custom_message = Some(tag.into());
        self
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn custom_message(&self) -> Option<&str> {
        self.custom_message.as_deref()
    }
}

/// Downstream gRPC failures surface with the status message verbatim.
impl From<tonic::Status> for ApiError {
    fn from(status: tonic::Status) -> Self {
        Self::grpc(status.message())
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        Self::internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        handle_response_with_message(
            self.status,
            Value::String(self.message),
            self.custom_message,
        )
    }
}

// ============================================================================
// Body extractor
// ============================================================================

/// JSON body extractor whose rejection goes through the sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::bad_request(rejection.body_text())
}
