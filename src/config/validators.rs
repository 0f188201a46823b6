//! 启动时配置校验
//!
//! 校验失败直接拒绝启动，避免运行期才暴露问题（如短码长度为奇数）。

use super::StaticConfig;
use crate::errors::{LinkpulseError, Result};

/// 去重窗口上限（1 天）
pub const MAX_DEDUP_WINDOW_SECONDS: u64 = 86_400;
/// Token 有效期上限（1 年）
pub const MAX_TOKEN_TTL_MINUTES: u64 = 525_600;

/// Validate the loaded configuration
pub fn validate_config(config: &StaticConfig) -> Result<()> {
    let links = &config.links;

    if links.base_url.trim().is_empty() {
        return Err(LinkpulseError::config("links.base_url must not be empty"));
    }
    if url::Url::parse(&links.base_url).is_err() {
        return Err(LinkpulseError::config(format!(
            "links.base_url is not a valid URL: {}",
            links.base_url
        )));
    }

    // 每个随机字节渲染为两个十六进制字符
    if !(4..=32).contains(&links.code_length) || links.code_length % 2 != 0 {
        return Err(LinkpulseError::config(format!(
            "links.code_length must be an even number between 4 and 32, got {}",
            links.code_length
        )));
    }

    if links.max_generation_attempts == 0 {
        return Err(LinkpulseError::config(
            "links.max_generation_attempts must be at least 1",
        ));
    }

    if links.dedup_window_seconds > MAX_DEDUP_WINDOW_SECONDS {
        return Err(LinkpulseError::config(format!(
            "links.dedup_window_seconds must be at most {}, got {}",
            MAX_DEDUP_WINDOW_SECONDS, links.dedup_window_seconds
        )));
    }

    if config.dedup.max_entries == 0 {
        return Err(LinkpulseError::config("dedup.max_entries must be at least 1"));
    }
    if config.dedup.sweep_interval_secs == 0 {
        return Err(LinkpulseError::config(
            "dedup.sweep_interval_secs must be at least 1",
        ));
    }

    if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&config.auth.token_ttl_minutes) {
        return Err(LinkpulseError::config(format!(
            "auth.token_ttl_minutes must be between 1 and {}, got {}",
            MAX_TOKEN_TTL_MINUTES, config.auth.token_ttl_minutes
        )));
    }

    if !matches!(config.logging.format.as_str(), "text" | "json") {
        return Err(LinkpulseError::config(format!(
            "logging.format must be 'text' or 'json', got '{}'",
            config.logging.format
        )));
    }

    Ok(())
}
