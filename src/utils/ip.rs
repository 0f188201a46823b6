//! 客户端 IP 提取
//!
//! 默认使用连接对端地址；`server.trust_proxy = true` 时信任
//! X-Forwarded-For / X-Real-IP（部署在反向代理之后）。

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::trace;

/// 从 HttpRequest 提取客户端 IP
pub fn extract_client_ip(req: &HttpRequest, trust_proxy: bool) -> Option<String> {
    let peer_ip = req.peer_addr().map(|addr| addr.ip().to_string());

    if trust_proxy && let Some(forwarded) = extract_forwarded_ip_from_headers(req.headers()) {
        trace!("Forwarded client IP {} (peer {:?})", forwarded, peer_ip);
        return Some(forwarded);
    }

    peer_ip
}

/// 从 HeaderMap 提取转发的 IP
pub fn extract_forwarded_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    // 优先 X-Forwarded-For（取第一个，即原始客户端 IP）
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_peer_ip_used_without_trust() {
        let req = TestRequest::default()
            .peer_addr("9.9.9.9:5555".parse().unwrap())
            .insert_header(("x-forwarded-for", "1.2.3.4"))
            .to_http_request();
        assert_eq!(extract_client_ip(&req, false).as_deref(), Some("9.9.9.9"));
    }

    #[test]
    fn test_forwarded_first_hop_when_trusted() {
        let req = TestRequest::default()
            .peer_addr("10.0.0.1:5555".parse().unwrap())
            .insert_header(("x-forwarded-for", "1.2.3.4, 10.0.0.1"))
            .to_http_request();
        assert_eq!(extract_client_ip(&req, true).as_deref(), Some("1.2.3.4"));
    }

    #[test]
    fn test_real_ip_fallback() {
        let req = TestRequest::default()
            .insert_header(("x-real-ip", "5.6.7.8"))
            .to_http_request();
        assert_eq!(
            extract_forwarded_ip_from_headers(req.headers()).as_deref(),
            Some("5.6.7.8")
        );
    }

    #[test]
    fn test_trusted_without_headers_falls_back_to_peer() {
        let req = TestRequest::default()
            .peer_addr("9.9.9.9:5555".parse().unwrap())
            .to_http_request();
        assert_eq!(extract_client_ip(&req, true).as_deref(), Some("9.9.9.9"));
    }
}
