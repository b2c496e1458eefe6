use crate::config::AppConfig;
use entity_service::{CacheProvider, MokaCacheProvider, NotificationDispatcher, UnitOfWork};
use std::sync::Arc;
use std::time::Duration;

/// Collaborators shared by every entity service of one system.
#[derive(Clone)]
pub struct Infrastructure {
    pub unit_of_work: Arc<dyn UnitOfWork>,
    pub dispatcher: Arc<dyn NotificationDispatcher>,
    pub config: AppConfig,
}

impl Infrastructure {
    pub fn new(
        unit_of_work: Arc<dyn UnitOfWork>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        config: AppConfig,
    ) -> Self {
        Self {
            unit_of_work,
            dispatcher,
            config,
        }
    }

    /// A fresh moka cache sized from the configuration.
    pub fn model_cache<M>(&self) -> Arc<dyn CacheProvider<u32, M>>
    where
        M: Clone + Send + Sync + 'static,
    {
        Arc::new(MokaCacheProvider::<u32, M>::new(
            self.config.cache.capacity,
            self.cache_ttl(),
        ))
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.config.cache.ttl()
    }
}
