//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::LinkpulseError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证错误
/// - 3000-3099: 链接错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    ServiceUnavailable = 1030,

    // 认证错误 2000-2099
    TokenInvalid = 2002,

    // 链接错误 3000-3099
    LinkNotFound = 3000,
    LinkAlreadyExists = 3001,
    LinkInvalidRequest = 3002,
    LinkExpired = 3003,
    LinkDatabaseError = 3005,
    LinkCodeExhausted = 3006,
}

impl From<&LinkpulseError> for ErrorCode {
    fn from(err: &LinkpulseError) -> Self {
        match err {
            LinkpulseError::Validation(_) => ErrorCode::LinkInvalidRequest,
            LinkpulseError::NotFound(_) => ErrorCode::LinkNotFound,
            LinkpulseError::Expired(_) => ErrorCode::LinkExpired,
            LinkpulseError::Conflict(_) => ErrorCode::LinkAlreadyExists,
            LinkpulseError::Exhausted(_) => ErrorCode::LinkCodeExhausted,
            LinkpulseError::Store(_) => ErrorCode::LinkDatabaseError,
            LinkpulseError::Unauthorized(_) => ErrorCode::TokenInvalid,
            LinkpulseError::Config(_) => ErrorCode::InternalServerError,
        }
    }
}
