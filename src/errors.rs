use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum LinkpulseError {
    Validation(String),
    NotFound(String),
    Expired(String),
    Conflict(String),
    Exhausted(String),
    Store(String),
    Unauthorized(String),
    Config(String),
}

impl LinkpulseError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkpulseError::Validation(_) => "E001",
            LinkpulseError::NotFound(_) => "E002",
            LinkpulseError::Expired(_) => "E003",
            LinkpulseError::Conflict(_) => "E004",
            LinkpulseError::Exhausted(_) => "E005",
            LinkpulseError::Store(_) => "E006",
            LinkpulseError::Unauthorized(_) => "E007",
            LinkpulseError::Config(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkpulseError::Validation(_) => "Validation Error",
            LinkpulseError::NotFound(_) => "Resource Not Found",
            LinkpulseError::Expired(_) => "Resource Expired",
            LinkpulseError::Conflict(_) => "Conflict",
            LinkpulseError::Exhausted(_) => "Retry Budget Exhausted",
            LinkpulseError::Store(_) => "Store Error",
            LinkpulseError::Unauthorized(_) => "Unauthorized",
            LinkpulseError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkpulseError::Validation(msg)
            | LinkpulseError::NotFound(msg)
            | LinkpulseError::Expired(msg)
            | LinkpulseError::Conflict(msg)
            | LinkpulseError::Exhausted(msg)
            | LinkpulseError::Store(msg)
            | LinkpulseError::Unauthorized(msg)
            | LinkpulseError::Config(msg) => msg,
        }
    }

    /// HTTP status the API layer answers with
    pub fn http_status(&self) -> StatusCode {
        match self {
            LinkpulseError::Validation(_) => StatusCode::BAD_REQUEST,
            LinkpulseError::NotFound(_) => StatusCode::NOT_FOUND,
            LinkpulseError::Expired(_) => StatusCode::GONE,
            LinkpulseError::Conflict(_) => StatusCode::CONFLICT,
            LinkpulseError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            LinkpulseError::Exhausted(_) | LinkpulseError::Store(_) | LinkpulseError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 格式化为彩色输出（用于启动失败时的终端提示）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkpulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkpulseError {}

// 便捷的构造函数
impl LinkpulseError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::NotFound(msg.into())
    }

    pub fn expired<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Expired(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Conflict(msg.into())
    }

    pub fn exhausted<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Exhausted(msg.into())
    }

    pub fn store<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Store(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Unauthorized(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Config(msg.into())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, LinkpulseError::Conflict(_))
    }
}

impl From<sea_orm::DbErr> for LinkpulseError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) => LinkpulseError::Conflict(msg),
            _ => LinkpulseError::Store(err.to_string()),
        }
    }
}

impl From<std::io::Error> for LinkpulseError {
    fn from(err: std::io::Error) -> Self {
        LinkpulseError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for LinkpulseError {
    fn from(err: serde_json::Error) -> Self {
        LinkpulseError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkpulseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            LinkpulseError::validation("x").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LinkpulseError::not_found("x").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(LinkpulseError::expired("x").http_status(), StatusCode::GONE);
        assert_eq!(
            LinkpulseError::exhausted("x").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            LinkpulseError::store("x").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_format_simple() {
        let err = LinkpulseError::not_found("link 42");
        assert_eq!(err.format_simple(), "Resource Not Found: link 42");
        assert_eq!(err.to_string(), err.format_simple());
        assert_eq!(err.code(), "E002");
    }

    #[test]
    fn test_is_conflict() {
        assert!(LinkpulseError::conflict("dup").is_conflict());
        assert!(!LinkpulseError::store("io").is_conflict());
    }
}
