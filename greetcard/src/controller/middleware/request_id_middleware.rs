use axum::{
    body::Body,
    http::{HeaderValue, Request},
    response::IntoResponse,
};

use crate::request_context::X_REQUEST_ID;

/// 生成或沿用请求ID，并写回响应头
pub async fn request_id_middleware(
    mut req: Request<Body>,
    next: axum::middleware::Next,
) -> impl IntoResponse {
    let req_id = match req.headers().get(X_REQUEST_ID) {
        Some(id) if !id.is_empty() => id.clone(),
        _ => {
            let id = HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
            req.headers_mut().insert(X_REQUEST_ID, id.clone());
            id
        }
    };

    let mut rsp = next.run(req).await;
    rsp.headers_mut().insert(X_REQUEST_ID, req_id);
    rsp
}
