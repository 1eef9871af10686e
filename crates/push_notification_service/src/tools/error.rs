/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{
    http::{header::ContentType, StatusCode},
    HttpResponse, ResponseError,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    error_message: String,
    pub error_code: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("InternalError: {0}")]
    InternalError(String),
    #[error("InvalidRequest: {0}")]
    InvalidRequest(String),
    #[error("UnprocessibleRequest: {0}")]
    UnprocessibleRequest(String),
    #[error("LargePayloadSize: {0} > {1}")]
    LargePayloadSize(usize, usize),
    #[error("RequestTimeout")]
    RequestTimeout,
    #[error("No valid push tokens found")]
    NoValidPushTokens,
    #[error("AuthFailed")]
    AuthFailed,
    #[error("ExternalAPICallError: {0}")]
    ExternalAPICallError(String),
    #[error("SerializationError: {0}")]
    SerializationError(String),
    #[error("DeserializationError: {0}")]
    DeserializationError(String),
    #[error("InvalidConfiguration: {0}")]
    InvalidConfiguration(String),
    #[error("RedisConnectionError: {0}")]
    RedisConnectionError(String),
    #[error("Failed to set key value in Redis")]
    SetFailed,
    #[error("Failed to set expiry for key value in Redis")]
    SetExpiryFailed,
    #[error("Failed to get key value in Redis")]
    GetFailed,
    #[error("Failed to set hash field in Redis")]
    SetHashFieldFailed,
    #[error("Failed to get hash fields in Redis")]
    GetHashFieldFailed,
    #[error("Failed to append entry to Redis list")]
    RPushFailed,
    #[error("Failed to read entries from Redis list")]
    LRangeFailed,
}

impl AppError {
    fn error_message(&self) -> ErrorBody {
        ErrorBody {
            error_message: self.message(),
            error_code: self.code(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::InternalError(err) => err.to_string(),
            AppError::InvalidRequest(err) => err.to_string(),
            // Parser details stay in the server logs, clients get a generic body
            AppError::UnprocessibleRequest(_) => {
                "Failed to send push notifications".to_string()
            }
            AppError::LargePayloadSize(length, limit) => {
                format!("Content length ({length} Bytes) greater than allowed maximum limit : ({limit} Bytes)")
            }
            AppError::NoValidPushTokens => "No valid push tokens found".to_string(),
            AppError::AuthFailed => "Authentication failed".to_string(),
            AppError::ExternalAPICallError(err) => err.to_string(),
            AppError::SerializationError(err) => err.to_string(),
            AppError::DeserializationError(err) => err.to_string(),
            AppError::InvalidConfiguration(err) => err.to_string(),
            AppError::RedisConnectionError(err) => err.to_string(),
            _ => self.to_string(),
        }
    }

    fn code(&self) -> String {
        match self {
            AppError::InternalError(_) => "INTERNAL_ERROR",
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::UnprocessibleRequest(_) => "UNPROCESSIBLE_REQUEST",
            AppError::LargePayloadSize(_, _) => "LARGE_PAYLOAD_SIZE",
            AppError::RequestTimeout => "REQUEST_TIMEOUT",
            AppError::NoValidPushTokens => "NO_VALID_PUSH_TOKENS",
            AppError::AuthFailed => "AUTH_FAILED",
            AppError::ExternalAPICallError(_) => "EXTERNAL_API_CALL_ERROR",
            AppError::SerializationError(_) => "SERIALIZATION_ERROR",
            AppError::DeserializationError(_) => "DESERIALIZATION_ERROR",
            AppError::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            AppError::RedisConnectionError(_) => "REDIS_CONNECTION_ERROR",
            AppError::SetFailed => "SET_FAILED",
            AppError::SetExpiryFailed => "SET_EXPIRY_FAILED",
            AppError::GetFailed => "GET_FAILED",
            AppError::SetHashFieldFailed => "SET_HASH_FIELD_FAILED",
            AppError::GetHashFieldFailed => "GET_HASH_FIELD_FAILED",
            AppError::RPushFailed => "RPUSH_FAILED",
            AppError::LRangeFailed => "LRANGE_FAILED",
        }
        .to_string()
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(self.error_message())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnprocessibleRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::LargePayloadSize(_, _) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            AppError::NoValidPushTokens => StatusCode::BAD_REQUEST,
            AppError::AuthFailed => StatusCode::UNAUTHORIZED,
            AppError::ExternalAPICallError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DeserializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RedisConnectionError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SetFailed => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SetExpiryFailed => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::GetFailed => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SetHashFieldFailed => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::GetHashFieldFailed => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RPushFailed => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::LRangeFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_body_yields_generic_500() {
        let err = AppError::UnprocessibleRequest(
            "Json deserialize error: invalid type: integer `1`, expected a string".to_string(),
        );

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Failed to send push notifications");
        // Parser internals must not leak into the response body
        assert!(!err.message().contains("deserialize"));
        // but stay available for server-side logging
        assert!(err.to_string().contains("invalid type: integer"));
    }
}
