use axum::{body::Body, http::Request, response::IntoResponse};

use crate::request_context::RequestContext;

/// 存储请求上下文
pub async fn request_ctx_middleware(
    mut req: Request<Body>,
    next: axum::middleware::Next,
) -> impl IntoResponse {
    let ctx = RequestContext::from_headers(req.headers().clone());
    req.extensions_mut().insert(ctx);

    next.run(req).await
}
