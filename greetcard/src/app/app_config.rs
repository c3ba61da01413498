use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::commonapi::drawer::resolve_asset;
use crate::model::modelimpl::draw::TemplateModel;

/// 配置目录环境变量，未设置时使用crate下的config目录
pub const CONFIG_DIR_ENV: &str = "GREETCARD_CONFIG_DIR";
/// 资源目录环境变量，未设置时使用配置目录的上级目录
pub const ASSET_DIR_ENV: &str = "GREETCARD_ASSET_DIR";
/// 环境变量覆盖前缀，例如 GREETCARD_SERVER__PORT=9000
const ENV_PREFIX: &str = "GREETCARD";

#[derive(Clone, Deserialize)]
struct Common {
    profile: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub name: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logger {
    /// console / json
    pub default: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    /// 对外访问地址，复制链接时使用
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Export {
    /// 下载文件名
    pub filename: String,
    /// 分享标题
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub profile: String,
    pub server: Server,
    pub logger: Logger,
    pub link: Link,
    pub export: Export,
    pub template: TemplateModel,
}

impl AppConfig {
    /// 从默认配置目录加载
    pub fn load() -> anyhow::Result<Self> {
        let dir = std::env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Path::new(env!("CARGO_MANIFEST_DIR")).join("config"));
        Self::load_from(&dir)
    }

    /// 先读 application.toml 得到profile，再叠加 application-{profile}.toml
    pub fn load_from(dir: &Path) -> anyhow::Result<Self> {
        let base = dir.join("application.toml");

        let common = config::Config::builder()
            .add_source(config::File::from(base.as_path()))
            .add_source(env_source())
            .build()?
            .try_deserialize::<Common>()?;

        let profile = match common.profile.as_str() {
            "dev" | "prod" | "test" => dir.join(format!("application-{}.toml", common.profile)),
            other => anyhow::bail!("invalid profile {}", other),
        };

        let cfg = config::Config::builder()
            .add_source(config::File::from(base.as_path()))
            .add_source(config::File::from(profile.as_path()))
            .add_source(env_source())
            .build()?;

        let mut cfg = cfg.try_deserialize::<AppConfig>()?;
        let assets = std::env::var(ASSET_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| asset_dir(dir));
        cfg.resolve_assets(&assets);
        Ok(cfg)
    }

    /// 模板和字体的相对路径改为以资源目录为基准
    fn resolve_assets(&mut self, assets: &Path) {
        self.template.src = resolve_asset(assets, &self.template.src);
        self.template.font_path = self
            .template
            .font_path
            .as_deref()
            .map(|p| resolve_asset(assets, p));
    }
}

/// 部署目录结构为 <home>/config 与 <home>/assets
fn asset_dir(config_dir: &Path) -> PathBuf {
    config_dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
