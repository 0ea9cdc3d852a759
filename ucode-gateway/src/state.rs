//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use ucode_common::Config;

use crate::cache::{CacheBridge, CacheStore, InMemoryCacheStore, RedisCacheStore};
use crate::history::HistoryRecorder;
use crate::proxy::N8nProxy;
use crate::resolver::ResourceResolver;
use crate::services::{AuthService, CompanyService, ServiceBundle, ServiceNodes, SharedServices};
use crate::storage::{ObjectStorage, S3Storage};

/// Everything a handler may reach. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub shared: SharedServices,
    pub nodes: Arc<ServiceNodes>,
    pub resolver: ResourceResolver,
    pub history: HistoryRecorder,
    pub cache: CacheBridge,
    pub storage: Option<Arc<dyn ObjectStorage>>,
    pub n8n: N8nProxy,
}

/// Pre-built collaborators for [`AppState::new`].
pub struct StateParts {
    pub auth: Arc<dyn AuthService>,
    pub company: Arc<dyn CompanyService>,
    pub bundles: Vec<ServiceBundle>,
    pub cache_store: Arc<dyn CacheStore>,
    pub storage: Option<Arc<dyn ObjectStorage>>,
}

impl AppState {
    /// Assemble state from already-connected collaborators.
    ///
    /// Spawns the history writer, so it must run inside a Tokio runtime.
    pub fn new(config: Config, parts: StateParts) -> Self {
        let StateParts {
            auth,
            company,
            bundles,
            cache_store,
            storage,
        } = parts;

        let nodes = ServiceNodes::new(config.default_namespace.clone(), bundles);
        let resolver = ResourceResolver::new(Arc::clone(&company), &config.resolver);
        let history = HistoryRecorder::spawn(config.history.queue_capacity);
        let cache = CacheBridge::new(
            cache_store,
            config.redis.realm.clone(),
            Duration::from_secs(config.redis.default_ttl_secs),
        );
        let n8n = N8nProxy::new(&config.n8n);

        Self {
            config: Arc::new(config),
            shared: SharedServices { auth, company },
            nodes: Arc::new(nodes),
            resolver,
            history,
            cache,
            storage,
            n8n,
        }
    }

    /// Connect every collaborator named in the configuration.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let SharedServices { auth, company } = SharedServices::connect(&config)?;
        let bundles = config
            .service_nodes
            .iter()
            .map(|node| ServiceBundle::connect(node, &config.grpc))
            .collect::<Result<Vec<_>, _>>()?;

        let cache_store: Arc<dyn CacheStore> = if config.redis.url.is_empty() {
            tracing::warn!("No Redis URL configured, cache is process-local");
            Arc::new(InMemoryCacheStore::new())
        } else {
            Arc::new(RedisCacheStore::connect(&config.redis.url).await?)
        };

        let storage = if config.minio.endpoint.is_empty() {
            None
        } else {
            Some(Arc::new(S3Storage::connect(&config.minio).await) as Arc<dyn ObjectStorage>)
        };

        let state = Self::new(
            config,
            StateParts {
                auth,
                company,
                bundles,
                cache_store,
                storage,
            },
        );

        if state.resolver.is_cached() {
            tracing::info!(
                ttl_secs = state.config.resolver.cache_ttl_secs,
                "Service-resource cache enabled"
            );
        }
        tracing::info!(
            namespaces = ?state.nodes.namespaces().collect::<Vec<_>>(),
            default_namespace = %state.nodes.default_namespace(),
            "Backend bundles ready"
        );

        Ok(state)
    }
}
