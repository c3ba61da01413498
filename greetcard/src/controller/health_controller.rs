use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use serde::Serialize;

use crate::{
    app::{AppContext, AppError, AppResponse},
    controller::Controller,
};

/// 健康检查
struct HealthController;

impl Controller for HealthController {
    fn routes() -> Router {
        Router::new().route("/health", get(health_handler))
    }
}

crate::register_controller!(HealthController);

#[derive(Serialize)]
struct Health {
    name: String,
    profile: String,
    fallback_font: bool,
}

async fn health_handler(
    Extension(ctx): Extension<Arc<AppContext>>,
) -> Result<AppResponse<Health>, AppError> {
    Ok(AppResponse::new(Health {
        name: ctx.config.server.name.clone(),
        profile: ctx.config.profile.clone(),
        fallback_font: ctx.card.font().is_fallback(),
    }))
}
