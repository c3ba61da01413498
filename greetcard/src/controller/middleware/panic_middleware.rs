use std::panic::AssertUnwindSafe;

use axum::{body::Body, http::Request, middleware::Next, response::IntoResponse};
use futures::FutureExt;

use crate::app::{AppResponse, app_err::ERR_SYSTEM};

pub async fn panic_handler(req: Request<Body>, next: Next) -> impl IntoResponse {
    let uri = req.uri().to_string();
    let future = AssertUnwindSafe(next.run(req)).catch_unwind();
    match future.await {
        Ok(rsp) => rsp,
        Err(err) => {
            if let Some(s) = err.downcast_ref::<String>() {
                tracing::error!(uri = uri.as_str(), "Request handler panicked: {}", s);
            } else if let Some(s) = err.downcast_ref::<&str>() {
                tracing::error!(uri = uri.as_str(), "Request handler panicked: {}", s);
            } else {
                tracing::error!(uri = uri.as_str(), "Request handler panicked");
            }

            AppResponse::<()>::fail(ERR_SYSTEM, "system error".to_string()).into_response()
        }
    }
}
