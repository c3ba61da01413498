use std::sync::Arc;

use axum::{
    Extension, Router,
    extract::Query,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};

use crate::{
    app::{AppContext, app_config::Export},
    commonapi::drawer::text_helper::MAX_NAME_CHARS,
    controller::{
        Controller,
        card_controller::{CardQuery, MSG_NAME_REQUIRED},
    },
    model::modelimpl::draw::TextAlign,
    service::canonical_query,
};

/// 页面控制器
struct PageController;

impl Controller for PageController {
    fn routes() -> Router {
        Router::new().route("/", get(index_handler))
    }
}

crate::register_controller!(PageController);

/// 首页
///
/// 地址栏里的名字与规范化后的不一致时重定向，保证链接里只保留规范化的名字。
async fn index_handler(
    Extension(ctx): Extension<Arc<AppContext>>,
    Query(query): Query<CardQuery>,
) -> Response {
    let name = query.name();
    if let Some(raw) = query.name.as_deref() {
        if raw != name || name.is_empty() {
            let align = query
                .align
                .as_deref()
                .filter(|a| !a.is_empty())
                .map(|_| query.align());
            return Redirect::to(&canonical_location(&name, align)).into_response();
        }
    }

    Html(render_page(&ctx.config.export, &name, query.align())).into_response()
}

/// 规范化后的地址，保留对齐方式
fn canonical_location(name: &str, align: Option<TextAlign>) -> String {
    let mut location = format!("/{}", canonical_query(name));
    if let Some(align) = align {
        location.push(if location.contains('?') { '&' } else { '?' });
        location.push_str("align=");
        location.push_str(align.as_str());
    }
    location
}

/// HTML转义
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn preview_src(name: &str, align: TextAlign) -> String {
    let qs = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("name", name)
        .append_pair("align", align.as_str())
        .finish();
    format!("/card.png?{}", qs)
}

fn align_option(value: TextAlign, selected: TextAlign, label: &str) -> String {
    let attr = if value == selected { " selected" } else { "" };
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        value.as_str(),
        attr,
        label
    )
}

pub fn render_page(export: &Export, name: &str, align: TextAlign) -> String {
    let title = escape_html(&export.title);
    let filename = escape_html(&export.filename);
    let value = escape_html(name);
    let src = escape_html(&preview_src(name, align));
    let options = [
        align_option(TextAlign::Right, align, "يمين"),
        align_option(TextAlign::Center, align, "وسط"),
        align_option(TextAlign::Left, align, "يسار"),
    ]
    .join("");

    format!(
        r#"<!doctype html>
<html lang="ar" dir="rtl">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<form id="form" method="get" action="/">
<textarea id="nameInput" name="name" rows="2" maxlength="{max}">{value}</textarea>
<select id="alignSelect" name="align">{options}</select>
<button type="submit">معاينة</button>
</form>
<img id="preview" src="{src}" alt="{title}" style="max-width:100%">
<p>
<button id="downloadBtn" type="button" data-filename="{filename}" data-title="{title}" data-required="{required}">تحميل</button>
<button id="copyLinkBtn" type="button">نسخ الرابط</button>
<span id="status"></span>
</p>
<script>
const input = document.getElementById("nameInput");
const align = document.getElementById("alignSelect");
const preview = document.getElementById("preview");
const status = document.getElementById("status");
function params() {{
  const lines = (input.value || "").replace(/\r\n/g, "\n").split("\n");
  if (lines.length > 2) input.value = lines.slice(0, 2).join("\n");
  return new URLSearchParams({{ name: input.value.trim(), align: align.value }});
}}
function refresh() {{
  const p = params();
  preview.src = "/card.png?" + p.toString();
  const q = new URLSearchParams();
  if (p.get("name")) q.set("name", p.get("name"));
  if (p.get("align") !== "center") q.set("align", p.get("align"));
  const qs = q.toString() ? "?" + q.toString() : "";
  window.history.replaceState({{}}, "", window.location.pathname + qs);
}}
input.addEventListener("input", refresh);
align.addEventListener("change", refresh);
const downloadBtn = document.getElementById("downloadBtn");
downloadBtn.addEventListener("click", async () => {{
  const p = params();
  if (!p.get("name")) {{
    alert(downloadBtn.dataset.required);
    return;
  }}
  let blob;
  try {{
    const rsp = await fetch("/card/download?" + p.toString());
    if (rsp.status !== 200 || rsp.headers.get("Content-Type") !== "image/png") return;
    blob = await rsp.blob();
  }} catch (e) {{
    return;
  }}
  const filename = downloadBtn.dataset.filename;
  const file = new File([blob], filename, {{ type: "image/png" }});
  if (navigator.canShare && navigator.canShare({{ files: [file] }})) {{
    try {{
      await navigator.share({{ files: [file], title: downloadBtn.dataset.title }});
      return;
    }} catch (e) {{
      console.log("share cancelled");
    }}
  }}
  const url = URL.createObjectURL(blob);
  const a = document.createElement("a");
  a.href = url;
  a.download = filename;
  document.body.appendChild(a);
  a.click();
  a.remove();
  URL.revokeObjectURL(url);
}});
document.getElementById("copyLinkBtn").addEventListener("click", async () => {{
  try {{
    const rsp = await fetch("/card/link?" + params().toString());
    const body = await rsp.json();
    if (!body.IsSuccess) throw new Error(body.ErrorMsg);
    await navigator.clipboard.writeText(body.Result.link);
    status.textContent = "تم نسخ الرابط";
  }} catch (e) {{
    status.textContent = "انسخ الرابط يدويًا";
  }}
}});
</script>
</body>
</html>
"#,
        title = title,
        filename = filename,
        required = MSG_NAME_REQUIRED,
        max = MAX_NAME_CHARS,
        value = value,
        options = options,
        src = src,
    )
}
