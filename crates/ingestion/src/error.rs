//! Ingestion 错误类型
//!
//! 每个错误映射为一个 HTTP 状态码和 JSON 错误体：
//! `{"error": {"code": "...", "message": "..."}}`

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dispatcher::DispatchError;
use serde::Serialize;
use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 请求体读取失败
    #[error("failed to read request body: {message}")]
    BodyRead {
        /// 错误消息
        message: String,
    },

    /// 请求体超过上限
    #[error("request body exceeds the configured limit")]
    PayloadTooLarge,

    /// 编码失败 (schema 不匹配或 registry 不可用)
    #[error("failed to encode event: {message}")]
    Encode {
        /// 错误消息
        message: String,
    },

    /// 服务正在关闭，队列已关闭
    #[error("service is shutting down")]
    ShuttingDown,

    /// 并发提交数已达上限
    #[error("too many requests waiting for the publish loop")]
    Overloaded,

    /// 其他内部错误
    #[error("internal error: {message}")]
    Internal {
        /// 错误消息
        message: String,
    },
}

impl IngestionError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BodyRead { .. } => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Encode { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ShuttingDown | Self::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code for the JSON body
    pub fn code(&self) -> &'static str {
        match self {
            Self::BodyRead { .. } => "BODY_READ_FAILED",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::Encode { .. } => "ENCODE_FAILED",
            Self::ShuttingDown => "SHUTTING_DOWN",
            Self::Overloaded => "OVERLOADED",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<BytesRejection> for IngestionError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            Self::BodyRead {
                message: rejection.body_text(),
            }
        }
    }
}

impl From<DispatchError> for IngestionError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::QueueClosed => Self::ShuttingDown,
            DispatchError::Encode(e) => Self::Encode {
                message: e.to_string(),
            },
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}

/// Error response with code and message.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details including code and message
    pub error: ErrorDetail,
}

/// Detailed error information.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for IngestionError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ContractError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            IngestionError::BodyRead {
                message: "reset".into()
            }
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            IngestionError::PayloadTooLarge.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            IngestionError::ShuttingDown.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(IngestionError::Overloaded.code(), "OVERLOADED");
    }

    #[test]
    fn test_from_dispatch_error() {
        let err: IngestionError = DispatchError::QueueClosed.into();
        assert!(matches!(err, IngestionError::ShuttingDown));

        let err: IngestionError =
            DispatchError::Encode(ContractError::encode("avro", "missing field")).into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.to_string().contains("missing field"));

        let err: IngestionError =
            DispatchError::Contract(ContractError::Other("x".into())).into();
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }
}
