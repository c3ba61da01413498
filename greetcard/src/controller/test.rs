use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use image::{Rgba, RgbaImage};
use tower::ServiceExt;

use crate::{
    app::{
        AppContext,
        app_config::{AppConfig, Export, Link, Logger, Server},
    },
    commonapi::drawer::CardFont,
    controller::{build_router, card_controller::render_blocking},
    model::modelimpl::draw::{TemplateModel, TextAlign},
    request_context::X_REQUEST_ID,
    service::CardService,
};

fn app_config(public_url: &str) -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        server: Server {
            name: "greetcard".to_string(),
            port: 0,
        },
        logger: Logger {
            default: "console".to_string(),
        },
        link: Link {
            public_url: public_url.to_string(),
        },
        export: Export {
            filename: "تهنئة.png".to_string(),
            title: "تهنئة".to_string(),
        },
        template: TemplateModel {
            src: String::new(),
            width: 300,
            height: 200,
            x: 150.0,
            y: 100.0,
            max_width: 240.0,
            font_family: "BrandFont".to_string(),
            font_weight: 700,
            font_path: None,
            base_font_size: 30.0,
            color: "#F26D21".to_string(),
            shadow: None,
            allow_two_lines: true,
            line_height: 50.0,
        },
    }
}

fn context_with(public_url: &str) -> Arc<AppContext> {
    let config = app_config(public_url);
    let background = RgbaImage::from_pixel(300, 200, Rgba([255, 255, 255, 255]));
    let card = CardService::new(
        config.template.clone(),
        background,
        CardFont::Fallback,
        config.export.clone(),
    )
    .unwrap();
    Arc::new(AppContext { config, card })
}

fn router_with(public_url: &str) -> Router {
    build_router(context_with(public_url))
}

fn router() -> Router {
    router_with("https://greeting.example.com/eid/")
}

async fn get(app: Router, uri: &str) -> axum::response::Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_string(rsp: axum::response::Response) -> String {
    let bytes = to_bytes(rsp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(rsp: axum::response::Response) -> serde_json::Value {
    serde_json::from_str(&body_string(rsp).await).unwrap()
}

#[tokio::test]
async fn page_round_trips_name() {
    let rsp = get(router(), "/?name=Sara").await;
    assert_eq!(rsp.status(), StatusCode::OK);
    let html = body_string(rsp).await;
    assert!(html.contains(">Sara</textarea>"));
}

#[tokio::test]
async fn page_round_trips_arabic_name() {
    let rsp = get(router(), "/?name=%D9%86%D9%88%D8%B1%D8%A9").await;
    assert_eq!(rsp.status(), StatusCode::OK);
    assert!(body_string(rsp).await.contains(">نورة</textarea>"));
}

#[tokio::test]
async fn page_without_name_is_empty() {
    let rsp = get(router(), "/").await;
    assert_eq!(rsp.status(), StatusCode::OK);
    assert!(body_string(rsp).await.contains("></textarea>"));
}

#[tokio::test]
async fn page_redirects_to_canonical_name() {
    let long = "a".repeat(100);
    let rsp = get(router(), &format!("/?name=++{}", long)).await;
    assert_eq!(rsp.status(), StatusCode::SEE_OTHER);
    let location = rsp.headers()[header::LOCATION].to_str().unwrap();
    assert_eq!(location, format!("/?name={}", "a".repeat(80)));

    let rsp = get(router(), "/?name=a%0Ab%0Ac").await;
    assert_eq!(rsp.headers()[header::LOCATION], "/?name=a%0Ab");

    let rsp = get(router(), "/?name=").await;
    assert_eq!(rsp.status(), StatusCode::SEE_OTHER);
    assert_eq!(rsp.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn redirect_keeps_alignment() {
    let rsp = get(router(), "/?name=Sara%20&align=left").await;
    assert_eq!(rsp.status(), StatusCode::SEE_OTHER);
    assert_eq!(rsp.headers()[header::LOCATION], "/?name=Sara&align=left");

    let rsp = get(router(), "/?name=&align=right").await;
    assert_eq!(rsp.headers()[header::LOCATION], "/?align=right");

    let rsp = get(router(), "/?name=Sara&align=left").await;
    assert_eq!(rsp.status(), StatusCode::OK);
    let html = body_string(rsp).await;
    assert!(html.contains(r#"<option value="left" selected>"#));
}

#[tokio::test]
async fn page_checks_name_before_download() {
    let html = body_string(get(router(), "/").await).await;
    assert!(html.contains(r#"data-required="اكتب الاسم أولاً.""#));
    assert!(html.contains(r#"data-filename="تهنئة.png""#));
    assert!(html.contains("navigator.share"));
}

#[tokio::test]
async fn rendering_runs_off_the_async_worker() {
    let ctx = context_with("https://greeting.example.com/");
    let caller = std::thread::current().id();
    let worker = render_blocking(&ctx, |_| Some(std::thread::current().id())).await;
    assert!(worker.is_some_and(|id| id != caller));

    let png = render_blocking(&ctx, |card| card.export_png("Sara", TextAlign::Center)).await;
    assert!(png.is_some());
}

#[tokio::test]
async fn failed_render_task_yields_nothing() {
    let ctx = context_with("https://greeting.example.com/");
    let out: Option<Vec<u8>> = render_blocking(&ctx, |_| panic!("render crashed")).await;
    assert!(out.is_none());
}

#[tokio::test]
async fn preview_returns_png() {
    let rsp = get(router(), "/card.png?name=Sara&align=left").await;
    assert_eq!(rsp.status(), StatusCode::OK);
    assert_eq!(rsp.headers()[header::CONTENT_TYPE], "image/png");
    assert!(rsp.headers().get(X_REQUEST_ID).is_some());

    let bytes = to_bytes(rsp.into_body(), usize::MAX).await.unwrap();
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (300, 200));
}

#[tokio::test]
async fn download_requires_name() {
    let rsp = get(router(), "/card/download?name=%20%20").await;
    let body = body_json(rsp).await;
    assert_eq!(body["IsSuccess"], false);
    assert_eq!(body["ErrorCode"], 1001);
    assert_eq!(body["ErrorMsg"], "اكتب الاسم أولاً.");
}

#[tokio::test]
async fn download_is_attachment() {
    let rsp = get(router(), "/card/download?name=Sara").await;
    assert_eq!(rsp.status(), StatusCode::OK);
    assert_eq!(rsp.headers()[header::CONTENT_TYPE], "image/png");
    let disposition = rsp.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment;"));
    assert!(disposition.contains("filename*=UTF-8''"));
}

#[tokio::test]
async fn data_url_is_wrapped() {
    let body = body_json(get(router(), "/card/data?name=Sara").await).await;
    assert_eq!(body["IsSuccess"], true);
    assert!(
        body["Result"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,")
    );
}

#[tokio::test]
async fn link_uses_public_url() {
    let body = body_json(get(router(), "/card/link?name=Sara").await).await;
    assert_eq!(body["IsSuccess"], true);
    assert_eq!(body["Result"]["link"], "https://greeting.example.com/eid/");
    assert_eq!(
        body["Result"]["named_link"],
        "https://greeting.example.com/eid/?name=Sara"
    );
}

#[tokio::test]
async fn link_failure_surfaces_status() {
    let body = body_json(get(router_with("not a url"), "/card/link?name=Sara").await).await;
    assert_eq!(body["IsSuccess"], false);
    assert_eq!(body["ErrorCode"], 1002);
    assert_eq!(body["ErrorMsg"], "انسخ الرابط يدويًا");
}

#[tokio::test]
async fn request_id_is_kept() {
    let rsp = router()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(X_REQUEST_ID, "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(rsp.headers()[X_REQUEST_ID], "abc-123");

    let body = body_json(rsp).await;
    assert_eq!(body["Result"]["profile"], "test");
    assert_eq!(body["Result"]["fallback_font"], true);
}
