//! # Generic Entity Service
//!
//! [`EntityService`] provides uniform create/read/update/delete/list operations
//! for one entity type. It is a stateless orchestrator: it owns no data, only
//! handles to its collaborators, and is cheap to clone.
//!
//! ## Write path
//!
//! Every write follows the same sequence:
//!
//! 1. Map the request model to an entity. `update` first begins the
//!    transaction and confirms the key exists, so an absent key is reported
//!    as `NotFound` even when the model is invalid.
//! 2. Begin a transaction and apply the write through the repository.
//!    [`Mapper::validate`] runs once the entity carries its final key.
//! 3. Map the stored entity back to a model.
//! 4. Commit. Any failure up to here rolls the transaction back, is logged
//!    and is returned to the caller; nothing below runs.
//! 5. Invalidate the cache entry for the key (if a cache is configured).
//!    A create then stores the new model, so the first read is a hit.
//! 6. Publish one [`ChangeNotification`].
//!
//! Steps 5 and 6 are side channels. Their failures are logged (if a logger is
//! configured) and swallowed, so success is reported if and only if the
//! transaction committed.
//!
//! ## Read path
//!
//! `get_by_id` is read-through: a cache hit returns without touching the
//! repository; a miss loads, maps and populates the cache. `get_all` never uses
//! the single-key cache.

use crate::cache::CacheProvider;
use crate::entity::{Entity, Mapper};
use crate::error::ServiceError;
use crate::logger::Logger;
use crate::notification::{ChangeNotification, NotificationDispatcher, Operation};
use crate::query::ListQuery;
use crate::repository::Repository;
use crate::unit_of_work::{Transaction, UnitOfWork};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

/// Construction-time configuration for an [`EntityService`].
///
/// The four required collaborators are passed to [`ServiceConfig::new`]; the
/// cache and logger are opt-in.
///
/// ```rust,ignore
/// let config = ServiceConfig::new(mapper, repository, unit_of_work, dispatcher)
///     .with_cache(cache, Some(Duration::from_secs(300)))
///     .with_logger(Arc::new(TracingLogger));
/// let service = EntityService::new(config);
/// ```
pub struct ServiceConfig<M, E: Entity> {
    pub mapper: Arc<dyn Mapper<M, E>>,
    pub repository: Arc<dyn Repository<E>>,
    pub unit_of_work: Arc<dyn UnitOfWork>,
    pub dispatcher: Arc<dyn NotificationDispatcher>,
    pub cache: Option<Arc<dyn CacheProvider<E::Key, M>>>,
    /// TTL passed with every cache population; `None` defers to the provider.
    pub cache_ttl: Option<Duration>,
    pub logger: Option<Arc<dyn Logger>>,
}

impl<M, E: Entity> ServiceConfig<M, E> {
    pub fn new(
        mapper: Arc<dyn Mapper<M, E>>,
        repository: Arc<dyn Repository<E>>,
        unit_of_work: Arc<dyn UnitOfWork>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            mapper,
            repository,
            unit_of_work,
            dispatcher,
            cache: None,
            cache_ttl: None,
            logger: None,
        }
    }

    pub fn with_cache(
        mut self,
        cache: Arc<dyn CacheProvider<E::Key, M>>,
        ttl: Option<Duration>,
    ) -> Self {
        self.cache = Some(cache);
        self.cache_ttl = ttl;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }
}

/// Generic CRUD orchestrator for entity type `E` exposed as model type `M`.
pub struct EntityService<M, E: Entity> {
    mapper: Arc<dyn Mapper<M, E>>,
    repository: Arc<dyn Repository<E>>,
    unit_of_work: Arc<dyn UnitOfWork>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    cache: Option<Arc<dyn CacheProvider<E::Key, M>>>,
    cache_ttl: Option<Duration>,
    logger: Option<Arc<dyn Logger>>,
}

impl<M, E: Entity> Clone for EntityService<M, E> {
    fn clone(&self) -> Self {
        Self {
            mapper: self.mapper.clone(),
            repository: self.repository.clone(),
            unit_of_work: self.unit_of_work.clone(),
            dispatcher: self.dispatcher.clone(),
            cache: self.cache.clone(),
            cache_ttl: self.cache_ttl,
            logger: self.logger.clone(),
        }
    }
}

impl<M, E> EntityService<M, E>
where
    E: Entity,
    M: Clone + Serialize + Send + Sync + 'static,
{
    pub fn new(config: ServiceConfig<M, E>) -> Self {
        Self {
            mapper: config.mapper,
            repository: config.repository,
            unit_of_work: config.unit_of_work,
            dispatcher: config.dispatcher,
            cache: config.cache,
            cache_ttl: config.cache_ttl,
            logger: config.logger,
        }
    }

    pub fn entity_type(&self) -> &'static str {
        E::ENTITY_TYPE
    }

    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Fetches one model, serving it from the cache when possible.
    pub async fn get_by_id(&self, key: E::Key) -> Result<M, ServiceError> {
        if let Some(model) = self.cache_get(&key).await {
            self.log(Level::DEBUG, || format!("Cache hit for {key}"));
            return Ok(model);
        }

        let entity = self
            .repository
            .find(&key)
            .await?
            .ok_or_else(|| self.not_found(&key))?;
        let model = self.mapper.to_model(&entity)?;
        self.cache_set(key, model.clone()).await;
        Ok(model)
    }

    /// Lists models in repository order. `None` returns every row.
    pub async fn get_all(&self, query: Option<ListQuery>) -> Result<Vec<M>, ServiceError> {
        let entities = self.repository.find_all(query.as_ref()).await?;
        let models = entities
            .iter()
            .map(|entity| self.mapper.to_model(entity))
            .collect::<Result<Vec<_>, _>>()?;
        self.log(Level::DEBUG, || format!("Listed {} rows", models.len()));
        Ok(models)
    }

    pub async fn exists(&self, key: E::Key) -> Result<bool, ServiceError> {
        Ok(self.repository.find(&key).await?.is_some())
    }

    pub async fn count(&self) -> Result<usize, ServiceError> {
        Ok(self.repository.count().await?)
    }

    /// Persists a new entity and returns its model, including the generated key.
    pub async fn create(&self, model: M) -> Result<M, ServiceError> {
        let entity = self.mapper.to_entity(&model)?;

        let mut tx = self.unit_of_work.begin_transaction().await?;
        let stored = match self.repository.insert(tx.as_mut(), entity).await {
            Ok(stored) => stored,
            Err(e) => return Err(self.abort(tx, Operation::Created, e.into()).await),
        };
        if let Err(e) = self.mapper.validate(&stored) {
            return Err(self.abort(tx, Operation::Created, e.into()).await);
        }
        let created = match self.mapper.to_model(&stored) {
            Ok(model) => model,
            Err(e) => return Err(self.abort(tx, Operation::Created, e.into()).await),
        };
        self.commit(tx, Operation::Created).await?;

        let key = stored.key();
        self.log(Level::INFO, || format!("Created {key}"));
        // stores may recycle keys
        self.cache_invalidate(&key).await;
        self.cache_set(key.clone(), created.clone()).await;
        self.notify(Operation::Created, &key, Some(&created)).await;
        Ok(created)
    }

    /// Replaces the entity stored under `key` with `model`.
    ///
    /// An absent key is reported as `NotFound` before the model is mapped.
    pub async fn update(&self, key: E::Key, model: M) -> Result<M, ServiceError> {
        let mut tx = self.unit_of_work.begin_transaction().await?;
        match self.repository.find(&key).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(self.abort(tx, Operation::Updated, self.not_found(&key)).await),
            Err(e) => return Err(self.abort(tx, Operation::Updated, e.into()).await),
        }
        let entity = match self.mapper.to_entity(&model).and_then(|mut entity| {
            entity.set_key(key.clone());
            self.mapper.validate(&entity)?;
            Ok(entity)
        }) {
            Ok(entity) => entity,
            Err(e) => return Err(self.abort(tx, Operation::Updated, e.into()).await),
        };
        let stored = match self.repository.update(tx.as_mut(), entity).await {
            Ok(stored) => stored,
            Err(e) => return Err(self.abort(tx, Operation::Updated, e.into()).await),
        };
        let updated = match self.mapper.to_model(&stored) {
            Ok(model) => model,
            Err(e) => return Err(self.abort(tx, Operation::Updated, e.into()).await),
        };
        self.commit(tx, Operation::Updated).await?;

        self.log(Level::INFO, || format!("Updated {key}"));
        self.cache_invalidate(&key).await;
        self.notify(Operation::Updated, &key, Some(&updated)).await;
        Ok(updated)
    }

    pub async fn delete(&self, key: E::Key) -> Result<(), ServiceError> {
        let mut tx = self.unit_of_work.begin_transaction().await?;
        match self.repository.find(&key).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(self.abort(tx, Operation::Deleted, self.not_found(&key)).await),
            Err(e) => return Err(self.abort(tx, Operation::Deleted, e.into()).await),
        }
        match self.repository.remove(tx.as_mut(), &key).await {
            Ok(true) => {}
            Ok(false) => return Err(self.abort(tx, Operation::Deleted, self.not_found(&key)).await),
            Err(e) => return Err(self.abort(tx, Operation::Deleted, e.into()).await),
        }
        self.commit(tx, Operation::Deleted).await?;

        self.log(Level::INFO, || format!("Deleted {key}"));
        self.cache_invalidate(&key).await;
        self.notify(Operation::Deleted, &key, None).await;
        Ok(())
    }

    // --- Internals ---

    fn not_found(&self, key: &E::Key) -> ServiceError {
        ServiceError::NotFound {
            entity_type: E::ENTITY_TYPE,
            key: key.to_string(),
        }
    }

    async fn commit(
        &self,
        tx: Box<dyn Transaction>,
        operation: Operation,
    ) -> Result<(), ServiceError> {
        if let Err(e) = tx.commit().await {
            self.log(Level::WARN, || format!("{operation} commit failed: {e}"));
            return Err(e.into());
        }
        Ok(())
    }

    /// Rolls `tx` back and hands `error` back for the caller to return.
    async fn abort(
        &self,
        tx: Box<dyn Transaction>,
        operation: Operation,
        error: ServiceError,
    ) -> ServiceError {
        if let Err(e) = tx.rollback().await {
            self.log(Level::ERROR, || format!("Rollback after failed {operation} failed: {e}"));
        }
        if error.is_not_found() {
            self.log(Level::DEBUG, || error.to_string());
        } else {
            self.log(Level::WARN, || format!("{operation} rolled back: {error}"));
        }
        error
    }

    async fn cache_get(&self, key: &E::Key) -> Option<M> {
        let cache = self.cache.as_ref()?;
        match cache.get(key).await {
            Ok(hit) => hit,
            Err(e) => {
                self.log(Level::WARN, || format!("Cache read for {key} failed: {e}"));
                None
            }
        }
    }

    async fn cache_set(&self, key: E::Key, model: M) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        let label = key.to_string();
        if let Err(e) = cache.set(key, model, self.cache_ttl).await {
            self.log(Level::WARN, || format!("Cache population for {label} failed: {e}"));
        }
    }

    async fn cache_invalidate(&self, key: &E::Key) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };
        if let Err(e) = cache.invalidate(key).await {
            self.log(Level::WARN, || format!("Cache invalidation for {key} failed: {e}"));
        }
    }

    async fn notify(&self, operation: Operation, key: &E::Key, model: Option<&M>) {
        let payload = match model.map(serde_json::to_value).transpose() {
            Ok(payload) => payload,
            Err(e) => {
                self.log(Level::WARN, || format!("Payload for {key} not serializable: {e}"));
                None
            }
        };
        let notification = ChangeNotification::new(E::ENTITY_TYPE, operation, key, payload);
        if let Err(e) = self.dispatcher.publish(notification).await {
            self.log(Level::WARN, || format!("Notification {operation} for {key} not delivered: {e}"));
        }
    }

    fn log(&self, level: Level, message: impl FnOnce() -> String) {
        if let Some(logger) = &self.logger {
            logger.log(level, E::ENTITY_TYPE, &message());
        }
    }
}
