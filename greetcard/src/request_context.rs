use axum::http::{HeaderMap, HeaderName};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// 请求上下文
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub header: HeaderMap,
}

impl RequestContext {
    pub fn from_headers(header: HeaderMap) -> Self {
        let request_id = header
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        RequestContext { request_id, header }
    }
}
