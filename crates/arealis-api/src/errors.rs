// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    InvalidQueryParameter,
    MissingQueryParameter,
    InvalidCombination,
    NotFound,
    Internal,
}

impl ApiErrorCode {
    /// HTTP status the code maps to at the handler boundary.
    #[must_use]
    pub fn http_status(self) -> u16 {
        match self {
            Self::InvalidQueryParameter
            | Self::MissingQueryParameter
            | Self::InvalidCombination => 400,
            Self::NotFound => 404,
            Self::Internal => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
    pub request_id: String,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            request_id: "req-unknown".to_string(),
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    #[must_use]
    pub fn invalid_param(name: &str, value: &str, reason: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidQueryParameter,
            format!("invalid query parameter: {name}"),
            json!({"parameter": name, "value": value, "reason": reason}),
        )
    }

    #[must_use]
    pub fn missing_param(name: &str) -> Self {
        Self::new(
            ApiErrorCode::MissingQueryParameter,
            format!("missing required query parameter: {name}"),
            json!({"parameter": name}),
        )
    }

    #[must_use]
    pub fn invalid_combination(geography: &str, level: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidCombination,
            "invalid combination",
            json!({"geography": geography, "level": level}),
        )
    }

    #[must_use]
    pub fn not_found(id: &str) -> Self {
        Self::new(
            ApiErrorCode::NotFound,
            "boundary not found",
            json!({"id": id}),
        )
    }

    /// Datastore-class failure. The message stays generic; the correlation
    /// id is what operators grep for.
    #[must_use]
    pub fn internal() -> Self {
        Self::new(ApiErrorCode::Internal, "internal error", json!({}))
    }

    /// The JSON envelope every error response uses.
    #[must_use]
    pub fn envelope(&self) -> Value {
        json!({"error": self})
    }
}
