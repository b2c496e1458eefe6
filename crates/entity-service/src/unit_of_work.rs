//! # Unit of Work
//!
//! A [`UnitOfWork`] opens [`Transaction`]s. A transaction ends in exactly one of
//! three ways:
//!
//! 1. **Commit** - [`Transaction::commit`] makes every write permanent.
//! 2. **Rollback** - [`Transaction::rollback`] undoes every write.
//! 3. **Drop** - a transaction dropped without commit (an early `return`, a `?`,
//!    or a cancelled future) rolls back. There is no exit path that leaves
//!    writes half applied.
//!
//! Storage adapters join the active transaction by registering a
//! [`Compensation`] with [`Transaction::on_rollback`] for every write they
//! apply. Rollback runs the compensations in reverse order.
//!
//! ## InMemoryUnitOfWork
//!
//! The in-memory implementation serializes writers: each transaction holds an
//! owned `tokio::sync::Mutex` guard until it finishes, so two write
//! transactions never interleave. Readers are not gated and may observe rows
//! written by a transaction that has not committed yet.

use crate::error::RepositoryError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

/// Undo work registered by a storage adapter for a single write.
pub type Compensation = Box<dyn FnOnce() + Send>;

/// An open transaction. See the [module docs](self) for the lifecycle.
#[async_trait]
pub trait Transaction: Send {
    /// Registers undo work to run if this transaction does not commit.
    fn on_rollback(&mut self, compensation: Compensation);

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// Transaction boundary coordinator.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn begin_transaction(&self) -> Result<Box<dyn Transaction>, RepositoryError>;
}

/// Unit of work for in-process repositories.
#[derive(Clone, Default)]
pub struct InMemoryUnitOfWork {
    gate: Arc<Mutex<()>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryUnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn begin_transaction(&self) -> Result<Box<dyn Transaction>, RepositoryError> {
        let guard = self.gate.clone().lock_owned().await;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(tx = id, "Transaction started");
        Ok(Box::new(InMemoryTransaction {
            id,
            compensations: Vec::new(),
            finished: false,
            _guard: guard,
        }))
    }
}

struct InMemoryTransaction {
    id: u64,
    compensations: Vec<Compensation>,
    finished: bool,
    _guard: OwnedMutexGuard<()>,
}

impl InMemoryTransaction {
    fn undo(&mut self) -> usize {
        let undone = self.compensations.len();
        while let Some(compensation) = self.compensations.pop() {
            compensation();
        }
        self.finished = true;
        undone
    }
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    fn on_rollback(&mut self, compensation: Compensation) {
        self.compensations.push(compensation);
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let mut this = self;
        let writes = this.compensations.len();
        this.compensations.clear();
        this.finished = true;
        debug!(tx = this.id, writes, "Transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), RepositoryError> {
        let mut this = self;
        let undone = this.undo();
        debug!(tx = this.id, undone, "Transaction rolled back");
        Ok(())
    }
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if !self.finished {
            let undone = self.undo();
            warn!(tx = self.id, undone, "Transaction dropped without commit, rolled back");
        }
    }
}
