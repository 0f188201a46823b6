//! User agent parsing for visit events

use woothee::parser::Parser;

/// Parsed device fields stored with each visit event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub device_type: Option<String>,
    pub os_name: Option<String>,
    pub browser_name: Option<String>,
}

pub trait DeviceParser: Send + Sync {
    /// 无法识别的字段保持为 None
    fn parse(&self, user_agent: &str) -> DeviceInfo;
}

/// woothee 解析器
#[derive(Debug, Default, Clone, Copy)]
pub struct WootheeDeviceParser;

fn known(value: &str) -> Option<String> {
    if value.is_empty() || value == "UNKNOWN" {
        None
    } else {
        Some(value.to_string())
    }
}

impl DeviceParser for WootheeDeviceParser {
    fn parse(&self, user_agent: &str) -> DeviceInfo {
        if user_agent.trim().is_empty() {
            return DeviceInfo::default();
        }

        match Parser::new().parse(user_agent) {
            Some(result) => DeviceInfo {
                device_type: known(result.category),
                os_name: known(result.os),
                browser_name: known(result.name),
            },
            None => DeviceInfo::default(),
        }
    }
}

/// 不解析，全部字段为空
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDeviceParser;

impl DeviceParser for NoopDeviceParser {
    fn parse(&self, _user_agent: &str) -> DeviceInfo {
        DeviceInfo::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
    const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";

    #[test]
    fn test_desktop_chrome() {
        let info = WootheeDeviceParser.parse(CHROME_WINDOWS);
        assert_eq!(info.device_type.as_deref(), Some("pc"));
        assert_eq!(info.browser_name.as_deref(), Some("Chrome"));
        assert!(info.os_name.is_some());
    }

    #[test]
    fn test_iphone() {
        let info = WootheeDeviceParser.parse(SAFARI_IPHONE);
        assert_eq!(info.device_type.as_deref(), Some("smartphone"));
        assert_eq!(info.os_name.as_deref(), Some("iPhone"));
    }

    #[test]
    fn test_garbage_and_empty() {
        assert_eq!(WootheeDeviceParser.parse(""), DeviceInfo::default());
        let info = WootheeDeviceParser.parse("???");
        assert!(info.browser_name.is_none());
    }

    #[test]
    fn test_noop() {
        assert_eq!(NoopDeviceParser.parse(CHROME_WINDOWS), DeviceInfo::default());
    }
}
