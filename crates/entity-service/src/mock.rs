//! # Test Doubles
//!
//! In-memory stand-ins for every collaborator of
//! [`EntityService`](crate::EntityService), for fast, deterministic tests of
//! the service contract.
//!
//! | Double | Stands in for | Use it to |
//! |--------|---------------|-----------|
//! | [`MockRepository`] | [`Repository`] | Count calls, inject storage failures |
//! | [`RecordingDispatcher`] | [`NotificationDispatcher`] | Assert on published notifications |
//! | [`FailingDispatcher`] | [`NotificationDispatcher`] | Prove dispatch failures are non-fatal |
//! | [`FailingCache`] | [`CacheProvider`] | Prove cache failures are non-fatal |
//! | [`RejectingUnitOfWork`] | [`UnitOfWork`] | Fail every commit after rolling back |
//! | [`RecordingLogger`] | [`Logger`] | Assert on diagnostics |
//!
//! ## Failure injection
//!
//! `MockRepository` keeps a queue of expected failures. The next call whose
//! kind matches the front of the queue consumes it and returns the error:
//!
//! ```rust
//! use entity_service::mock::{MockRepository, RepositoryCall};
//! use entity_service::{Entity, Repository, RepositoryError};
//!
//! #[derive(Clone, Debug)]
//! struct Room { id: u32 }
//! impl Entity for Room {
//!     type Key = u32;
//!     const ENTITY_TYPE: &'static str = "Room";
//!     fn key(&self) -> u32 { self.id }
//!     fn set_key(&mut self, key: u32) { self.id = key; }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut repo = MockRepository::<Room>::new();
//!     repo.expect_failure(RepositoryCall::Find)
//!         .return_err(RepositoryError::Connection("timeout".into()));
//!
//!     assert!(repo.find(&1).await.is_err());
//!     assert!(repo.find(&1).await.unwrap().is_none());
//!     assert_eq!(repo.calls(RepositoryCall::Find), 2);
//!     repo.verify();
//! }
//! ```

use crate::cache::CacheProvider;
use crate::entity::Entity;
use crate::error::{CacheError, DispatchError, RepositoryError};
use crate::logger::Logger;
use crate::notification::{ChangeNotification, NotificationDispatcher, Operation};
use crate::query::ListQuery;
use crate::repository::{InMemoryRepository, Repository};
use crate::unit_of_work::{Compensation, Transaction, UnitOfWork};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::Level;

// =============================================================================
// REPOSITORY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryCall {
    Find,
    FindAll,
    Insert,
    Update,
    Remove,
    Count,
}

struct Failure {
    call: RepositoryCall,
    error: RepositoryError,
}

/// Counting, failure-injecting wrapper around an [`InMemoryRepository`].
pub struct MockRepository<E: Entity> {
    inner: InMemoryRepository<E>,
    calls: Arc<Mutex<Vec<RepositoryCall>>>,
    failures: Arc<Mutex<VecDeque<Failure>>>,
}

impl<E: Entity> Default for MockRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> MockRepository<E> {
    pub fn new() -> Self {
        Self {
            inner: InMemoryRepository::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            failures: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Stores a row directly, bypassing call counting.
    pub fn seed(&self, entity: E) -> Result<E, RepositoryError> {
        self.inner.seed(entity)
    }

    /// Number of calls of the given kind made so far.
    pub fn calls(&self, call: RepositoryCall) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == call)
            .count()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Expects a failure on the next call of the given kind.
    pub fn expect_failure(&mut self, call: RepositoryCall) -> FailureBuilder {
        FailureBuilder {
            call,
            failures: self.failures.clone(),
        }
    }

    /// Verifies that every expected failure was consumed.
    pub fn verify(&self) {
        let failures = self.failures.lock().unwrap();
        if !failures.is_empty() {
            panic!("Not all expected failures were triggered. {} remaining", failures.len());
        }
    }

    fn record(&self, call: RepositoryCall) -> Result<(), RepositoryError> {
        self.calls.lock().unwrap().push(call);
        let mut failures = self.failures.lock().unwrap();
        match failures.front() {
            Some(failure) if failure.call == call => {
                let failure = failures.pop_front().expect("front checked above");
                Err(failure.error)
            }
            _ => Ok(()),
        }
    }
}

/// Builder for an expected repository failure.
pub struct FailureBuilder {
    call: RepositoryCall,
    failures: Arc<Mutex<VecDeque<Failure>>>,
}

impl FailureBuilder {
    pub fn return_err(self, error: RepositoryError) {
        self.failures.lock().unwrap().push_back(Failure {
            call: self.call,
            error,
        });
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for MockRepository<E> {
    async fn find(&self, key: &E::Key) -> Result<Option<E>, RepositoryError> {
        self.record(RepositoryCall::Find)?;
        self.inner.find(key).await
    }

    async fn find_all(&self, query: Option<&ListQuery>) -> Result<Vec<E>, RepositoryError> {
        self.record(RepositoryCall::FindAll)?;
        self.inner.find_all(query).await
    }

    async fn insert(&self, tx: &mut dyn Transaction, entity: E) -> Result<E, RepositoryError> {
        self.record(RepositoryCall::Insert)?;
        self.inner.insert(tx, entity).await
    }

    async fn update(&self, tx: &mut dyn Transaction, entity: E) -> Result<E, RepositoryError> {
        self.record(RepositoryCall::Update)?;
        self.inner.update(tx, entity).await
    }

    async fn remove(
        &self,
        tx: &mut dyn Transaction,
        key: &E::Key,
    ) -> Result<bool, RepositoryError> {
        self.record(RepositoryCall::Remove)?;
        self.inner.remove(tx, key).await
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        self.record(RepositoryCall::Count)?;
        self.inner.count().await
    }
}

// =============================================================================
// UNIT OF WORK
// =============================================================================

/// Unit of work whose commits always fail. A rejected commit undoes the
/// transaction's writes before returning the error.
#[derive(Default)]
pub struct RejectingUnitOfWork {
    commits: Arc<AtomicUsize>,
}

impl RejectingUnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commits attempted so far.
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UnitOfWork for RejectingUnitOfWork {
    async fn begin_transaction(&self) -> Result<Box<dyn Transaction>, RepositoryError> {
        Ok(Box::new(RejectingTransaction {
            commits: self.commits.clone(),
            compensations: Vec::new(),
        }))
    }
}

struct RejectingTransaction {
    commits: Arc<AtomicUsize>,
    compensations: Vec<Compensation>,
}

impl RejectingTransaction {
    fn undo(&mut self) {
        while let Some(compensation) = self.compensations.pop() {
            compensation();
        }
    }
}

#[async_trait]
impl Transaction for RejectingTransaction {
    fn on_rollback(&mut self, compensation: Compensation) {
        self.compensations.push(compensation);
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let mut this = self;
        this.commits.fetch_add(1, Ordering::SeqCst);
        this.undo();
        Err(RepositoryError::Transaction("commit rejected".into()))
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        let mut this = self;
        this.undo();
        Ok(())
    }
}

impl Drop for RejectingTransaction {
    fn drop(&mut self) {
        self.undo();
    }
}

// =============================================================================
// DISPATCHERS
// =============================================================================

/// Dispatcher that keeps every published notification.
#[derive(Clone, Default)]
pub struct RecordingDispatcher {
    published: Arc<Mutex<Vec<ChangeNotification>>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<ChangeNotification> {
        self.published.lock().unwrap().clone()
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.published
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.operation == operation)
            .count()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn publish(&self, notification: ChangeNotification) -> Result<(), DispatchError> {
        self.published.lock().unwrap().push(notification);
        Ok(())
    }
}

/// Dispatcher whose every publish fails.
#[derive(Default)]
pub struct FailingDispatcher {
    attempts: AtomicUsize,
}

impl FailingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationDispatcher for FailingDispatcher {
    async fn publish(&self, _notification: ChangeNotification) -> Result<(), DispatchError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DispatchError::Closed)
    }
}

// =============================================================================
// CACHE & LOGGER
// =============================================================================

/// Cache whose every operation fails.
#[derive(Default)]
pub struct FailingCache {
    attempts: AtomicUsize,
}

impl FailingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn fail(&self) -> CacheError {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        CacheError::Unavailable("cache offline".into())
    }
}

#[async_trait]
impl<K, M> CacheProvider<K, M> for FailingCache
where
    K: Send + Sync + 'static,
    M: Send + Sync + 'static,
{
    async fn get(&self, _key: &K) -> Result<Option<M>, CacheError> {
        Err(self.fail())
    }

    async fn set(&self, _key: K, _model: M, _ttl: Option<Duration>) -> Result<(), CacheError> {
        Err(self.fail())
    }

    async fn invalidate(&self, _key: &K) -> Result<(), CacheError> {
        Err(self.fail())
    }
}

/// Logger that keeps every entry.
#[derive(Default)]
pub struct RecordingLogger {
    entries: Mutex<Vec<(Level, String)>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().unwrap().clone()
    }

    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: Level, entity_type: &str, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((level, format!("{entity_type}: {message}")));
    }
}
