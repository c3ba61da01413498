use crate::app::app_config::AppConfig;
use crate::service::CardService;

/// 运行期共享状态，启动后只读
pub struct AppContext {
    pub config: AppConfig,
    pub card: CardService,
}

impl AppContext {
    /// 加载模板资源，背景图失败时启动失败
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let card = CardService::load(config.template.clone(), config.export.clone()).await?;
        Ok(AppContext { config, card })
    }
}
