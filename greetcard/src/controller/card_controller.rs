use std::sync::Arc;

use axum::{
    Extension, Router,
    extract::Query,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    app::{
        AppContext, AppError, AppResponse,
        app_err::{ERR_LINK, ERR_NAME_REQUIRED, ERR_RENDER},
    },
    commonapi::drawer::{limit_input_lines, safe_text},
    controller::Controller,
    model::modelimpl::draw::TextAlign,
    request_context::RequestContext,
    service::{CardService, ShareLink, share_link},
};

/// 未输入名字时的提示
pub const MSG_NAME_REQUIRED: &str = "اكتب الاسم أولاً.";
/// 链接生成失败时的提示
pub const MSG_COPY_MANUALLY: &str = "انسخ الرابط يدويًا";
const FALLBACK_FILENAME: &str = "card.png";

/// 卡片控制器
struct CardController;

impl Controller for CardController {
    fn routes() -> Router {
        Router::new()
            .route("/card.png", get(preview_handler))
            .route("/card/download", get(download_handler))
            .route("/card/data", get(data_url_handler))
            .route("/card/link", get(link_handler))
    }
}

crate::register_controller!(CardController);

#[derive(Debug, Default, Deserialize)]
pub struct CardQuery {
    pub name: Option<String>,
    pub align: Option<String>,
}

impl CardQuery {
    /// 输入框规则：最多两行，去空白，最多80字符
    pub fn name(&self) -> String {
        safe_text(&limit_input_lines(self.name.as_deref().unwrap_or_default()))
    }

    pub fn align(&self) -> TextAlign {
        TextAlign::parse(self.align.as_deref())
    }
}

fn png_response(png: Vec<u8>, disposition: Option<HeaderValue>) -> Response {
    let mut rsp = (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/png")),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        png,
    )
        .into_response();
    if let Some(disposition) = disposition {
        rsp.headers_mut()
            .insert(header::CONTENT_DISPOSITION, disposition);
    }
    rsp
}

/// attachment 头，非ASCII文件名使用 RFC 5987 filename*
pub fn content_disposition(filename: &str) -> anyhow::Result<HeaderValue> {
    let ascii = if filename.is_ascii() && !filename.contains(['"', '\\']) {
        filename
    } else {
        FALLBACK_FILENAME
    };
    let encoded = utf8_percent_encode(filename, NON_ALPHANUMERIC);
    let value = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii, encoded
    );
    Ok(HeaderValue::from_str(&value)?)
}

/// 渲染是CPU密集操作，放到阻塞线程池执行
pub(crate) async fn render_blocking<T, F>(ctx: &Arc<AppContext>, render: F) -> Option<T>
where
    F: FnOnce(&CardService) -> Option<T> + Send + 'static,
    T: Send + 'static,
{
    let ctx = Arc::clone(ctx);
    match tokio::task::spawn_blocking(move || render(&ctx.card)).await {
        Ok(out) => out,
        Err(e) => {
            warn!(error = %e, "render task failed");
            None
        }
    }
}

/// 预览图
async fn preview_handler(
    Extension(ctx): Extension<Arc<AppContext>>,
    Query(query): Query<CardQuery>,
) -> Response {
    let (name, align) = (query.name(), query.align());
    match render_blocking(&ctx, move |card| card.export_png(&name, align)).await {
        Some(png) => png_response(png, None),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// 下载图片，文件名固定
async fn download_handler(
    Extension(ctx): Extension<Arc<AppContext>>,
    Extension(req_ctx): Extension<RequestContext>,
    Query(query): Query<CardQuery>,
) -> Result<Response, AppError> {
    let name = query.name();
    if name.is_empty() {
        return Err(AppError::new_with_errcode(ERR_NAME_REQUIRED, MSG_NAME_REQUIRED));
    }

    let align = query.align();
    let Some(png) = render_blocking(&ctx, move |card| card.export_png(&name, align)).await else {
        warn!(request_id = req_ctx.request_id.as_str(), "download skipped, no image");
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let user_agent = req_ctx
        .header
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    info!(
        request_id = req_ctx.request_id.as_str(),
        user_agent,
        bytes = png.len(),
        "card downloaded"
    );
    let disposition = content_disposition(&ctx.card.export().filename)?;
    Ok(png_response(png, Some(disposition)))
}

/// base64 预览
async fn data_url_handler(
    Extension(ctx): Extension<Arc<AppContext>>,
    Query(query): Query<CardQuery>,
) -> Result<AppResponse<String>, AppError> {
    let (name, align) = (query.name(), query.align());
    render_blocking(&ctx, move |card| card.export_data_url(&name, align))
        .await
        .map(AppResponse::new)
        .ok_or_else(|| AppError::new_with_errcode(ERR_RENDER, "image export failed"))
}

/// 生成可复制的链接
async fn link_handler(
    Extension(ctx): Extension<Arc<AppContext>>,
    Query(query): Query<CardQuery>,
) -> Result<AppResponse<ShareLink>, AppError> {
    match share_link(&ctx.config.link.public_url, &query.name()) {
        Ok(link) => Ok(AppResponse::new(link)),
        Err(e) => {
            warn!(error = %e, "share link failed");
            Err(AppError::new_with_errcode(ERR_LINK, MSG_COPY_MANUALLY))
        }
    }
}
