//! Gateway status codes.
//!
//! The closed set of outcomes a handler can report. Each maps to one HTTP
//! status, a stable label and a human description used in the envelope.

use axum::http::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Created,
    NoContent,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    InvalidArgument,
    InternalServerError,
    GrpcError,
    BadEnvironment,
}

impl Status {
    /// HTTP status sent to the client.
    pub const fn http(self) -> StatusCode {
        match self {
            Self::Ok => StatusCode::OK,
            Self::Created => StatusCode::CREATED,
            Self::NoContent => StatusCode::NO_CONTENT,
            Self::BadRequest | Self::InvalidArgument => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalServerError | Self::GrpcError | Self::BadEnvironment => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Label written to the envelope's `status` field.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Created => "CREATED",
            Self::NoContent => "NO_CONTENT",
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
            Self::GrpcError => "GRPC_ERROR",
            Self::BadEnvironment => "BAD_ENVIRONMENT",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Ok => "The request has succeeded",
            Self::Created => {
                "The request has succeeded and a new resource has been created as a result"
            }
            Self::NoContent => "There is no content to send for this request",
            Self::BadRequest => "The server could not understand the request due to invalid syntax",
            Self::Unauthorized => "The client must authenticate itself to get the requested response",
            Self::Forbidden => "The client does not have access rights to the content",
            Self::NotFound => "The server can not find the requested resource",
            Self::InvalidArgument => "Invalid argument value passed",
            Self::InternalServerError => {
                "The server has encountered a situation it doesn't know how to handle"
            }
            Self::GrpcError => "Error while calling a downstream gRPC service",
            Self::BadEnvironment => "Wrong environment value passed",
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::Ok | Self::Created | Self::NoContent)
    }
}
