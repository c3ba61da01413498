use std::sync::Arc;

use axum::{Extension, Router, http::Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::app::AppContext;

mod card_controller;
mod health_controller;
pub mod middleware;
mod page_controller;
mod registry;

/// 控制器 trait，所有控制器都需要实现此 trait
trait Controller {
    /// 返回控制器的路由
    fn routes() -> Router;
}

/// 注册控制器的宏
#[macro_export]
macro_rules! register_controller {
    ($controller:ty) => {
        inventory::submit! {
            $crate::controller::registry::ControllerRegistration {
                routes: <$controller>::routes,
            }
        }
    };
}

/// 自动收集所有控制器的路由
pub fn collect_routes() -> Router {
    registry::collect_routes()
}

/// 组装完整的应用路由
pub fn build_router(ctx: Arc<AppContext>) -> Router {
    collect_routes()
        .layer(Extension(ctx))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::any())
                .allow_headers(AllowHeaders::any())
                .allow_methods([Method::OPTIONS, Method::HEAD, Method::GET]),
        )
        .layer(axum::middleware::from_fn(middleware::request_ctx_middleware))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(axum::middleware::from_fn(middleware::panic_handler))
}

#[cfg(test)]
mod test;
