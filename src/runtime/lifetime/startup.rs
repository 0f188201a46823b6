use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::analytics::{DedupCache, WootheeDeviceParser};
use crate::api::JwtService;
use crate::config::StaticConfig;
use crate::services::{AnalyticsService, LinkService, RandomHexGenerator, RedirectService};
use crate::storage::{StorageFactory, Stores};

/// 服务器运行所需的全部组件
pub struct StartupContext {
    pub stores: Stores,
    pub dedup: Arc<DedupCache>,
    pub link_service: Arc<LinkService>,
    pub redirect_service: Arc<RedirectService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub jwt_service: Arc<JwtService>,
}

impl StartupContext {
    /// 基于已创建的存储组装服务（不访问网络，不启动后台任务）
    pub fn from_stores(stores: Stores, config: &StaticConfig) -> Self {
        let settings = config.links.clone();
        let dedup = Arc::new(DedupCache::new(config.dedup.max_entries));

        let link_service = Arc::new(LinkService::new(
            stores.links.clone(),
            stores.analytics.clone(),
            Arc::new(RandomHexGenerator::new(settings.code_length)),
            settings.clone(),
        ));
        let redirect_service = Arc::new(RedirectService::new(
            stores.links.clone(),
            stores.analytics.clone(),
            dedup.clone(),
            Arc::new(WootheeDeviceParser),
            settings,
        ));
        let analytics_service = Arc::new(AnalyticsService::new(
            stores.links.clone(),
            stores.analytics.clone(),
        ));
        let jwt_service = Arc::new(JwtService::from_config(&config.auth));

        Self {
            stores,
            dedup,
            link_service,
            redirect_service,
            analytics_service,
            jwt_service,
        }
    }

    /// 启动去重缓存的后台清理任务
    pub fn start_background_tasks(&self, config: &StaticConfig) -> JoinHandle<()> {
        let every = Duration::from_secs(config.dedup.sweep_interval_secs);
        debug!("DedupCache sweeper every {:?}", every);
        self.dedup
            .start_sweeper(every, config.links.dedup_window())
    }
}

/// 准备服务器启动的上下文
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    crate::config::validate_config(config).context("Invalid configuration")?;

    let stores = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;

    let context = StartupContext::from_stores(stores, config);

    info!(
        "Pre-startup completed in {} ms (code length {}, dedup window {}s)",
        start_time.elapsed().as_millis(),
        config.links.code_length,
        config.links.dedup_window_seconds
    );
    Ok(context)
}
