//! Uniform response envelope.

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Result code carried by every envelope (HTTP-equivalent).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum ResponseCode {
    Ok,
    BadRequest,
    Unauthorized,
    NotFound,
    TooManyRequests,
    Internal,
}

impl ResponseCode {
    pub fn as_u16(self) -> u16 {
        match self {
            ResponseCode::Ok => 200,
            ResponseCode::BadRequest => 400,
            ResponseCode::Unauthorized => 401,
            ResponseCode::NotFound => 404,
            ResponseCode::TooManyRequests => 429,
            ResponseCode::Internal => 500,
        }
    }
}

impl From<ResponseCode> for u16 {
    fn from(code: ResponseCode) -> u16 {
        code.as_u16()
    }
}

impl TryFrom<u16> for ResponseCode {
    type Error = ValidationError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Ok(match value {
            200 => ResponseCode::Ok,
            400 => ResponseCode::BadRequest,
            401 => ResponseCode::Unauthorized,
            404 => ResponseCode::NotFound,
            429 => ResponseCode::TooManyRequests,
            500 => ResponseCode::Internal,
            other => return Err(ValidationError::UnknownCode(other)),
        })
    }
}

/// `{ code, message, data }` returned by every service operation.
///
/// `data` is present only on success.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct ApiResponse<T> {
    #[ts(type = "200 | 400 | 401 | 404 | 429 | 500")]
    pub code: ResponseCode,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: ResponseCode::Ok,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn failure(code: ResponseCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == ResponseCode::Ok
    }
}

impl ApiResponse<()> {
    /// Success without payload (`data: null`).
    pub fn empty() -> Self {
        Self {
            code: ResponseCode::Ok,
            message: "success".to_string(),
            data: None,
        }
    }
}
