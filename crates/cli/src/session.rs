use crate::bridge::BridgeProcess;
use crate::config::AppConfig;
use crate::loading::{LoadKind, LoadingFlags, LoadingGuard};
use anyhow::Result;
use locview_resolver::{
    AssetLocator, ExtractionRequestBuilder, ExtractionService, NameLookupCache, NameResolver,
    QueryService, StoreLayout,
};
use std::sync::Arc;

/// Everything one inspector session owns: collaborators, the name cache and
/// the loading flags. Dropping the session drops the cache.
pub struct Session {
    pub(crate) config: AppConfig,
    pub(crate) layout: StoreLayout,
    pub(crate) query: Arc<dyn QueryService>,
    pub(crate) extraction: Arc<dyn ExtractionService>,
    pub(crate) locator: AssetLocator,
    pub(crate) names: NameResolver,
    pub(crate) requests: ExtractionRequestBuilder,
    loading: LoadingFlags,
}

impl Session {
    pub fn new(
        config: AppConfig,
        query: Arc<dyn QueryService>,
        extraction: Arc<dyn ExtractionService>,
    ) -> Self {
        let layout = StoreLayout::new(&config.game_path);
        let cache = Arc::new(NameLookupCache::new());
        Self {
            locator: AssetLocator::new(query.clone(), layout.clone()),
            names: NameResolver::new(query.clone(), layout.clone(), cache),
            requests: ExtractionRequestBuilder::new(layout.clone()),
            config,
            layout,
            query,
            extraction,
            loading: LoadingFlags::new(),
        }
    }

    /// Session talking to the configured helper process.
    pub fn with_bridge(config: AppConfig) -> Self {
        let bridge = Arc::new(BridgeProcess::new(config.bridge_command.clone()));
        if !bridge.is_configured() {
            log::debug!("No bridge command configured; database commands will fail");
        }
        Self::new(config, bridge.clone(), bridge)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn locator(&self) -> &AssetLocator {
        &self.locator
    }

    pub fn names(&self) -> &NameResolver {
        &self.names
    }

    pub fn is_loading(&self, kind: LoadKind) -> bool {
        self.loading.is_loading(kind)
    }

    pub(crate) fn begin(&self, kind: LoadKind) -> LoadingGuard<'_> {
        self.loading.begin(kind)
    }

    /// Fails early when no game path is configured.
    pub(crate) fn require_game(&self) -> Result<()> {
        self.config.game_path().map(|_| ())
    }
}
