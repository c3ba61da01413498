use serde::{Deserialize, Serialize};
use url::Url;

/// 可复制的链接
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareLink {
    /// 不带名字的基础链接
    pub link: String,
    /// 打开后自动填入名字的链接
    pub named_link: String,
}

/// 规范化后的查询串，名字为空时为空串
pub fn canonical_query(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    let qs = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("name", name)
        .finish();
    format!("?{}", qs)
}

/// 生成分享链接
pub fn share_link(public_url: &str, name: &str) -> anyhow::Result<ShareLink> {
    let mut base = Url::parse(public_url)?;
    if base.cannot_be_a_base() {
        anyhow::bail!("public url cannot be a base: {}", public_url);
    }
    base.set_query(None);
    base.set_fragment(None);

    let mut named = base.clone();
    if !name.is_empty() {
        named.query_pairs_mut().append_pair("name", name);
    }

    Ok(ShareLink {
        link: base.to_string(),
        named_link: named.to_string(),
    })
}
