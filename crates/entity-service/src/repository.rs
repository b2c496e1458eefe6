//! # Repository
//!
//! The [`Repository`] trait is the storage accessor the service orchestrates.
//! Reads run outside any transaction. Writes take the active
//! [`Transaction`] and register a [`Compensation`](crate::Compensation) for
//! every change they apply, so a rollback restores the previous state.
//!
//! ## InMemoryRepository
//!
//! Rows are kept in a `HashMap` keyed by `E::Key`, each tagged with an
//! insertion sequence number. Listing sorts by that number, so `find_all`
//! returns rows in insertion order. Keys come from an internal `u32` counter
//! starting at 1; like a database sequence, the counter is not rewound when an
//! insert is rolled back.

use crate::entity::Entity;
use crate::error::RepositoryError;
use crate::query::ListQuery;
use crate::unit_of_work::Transaction;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Key-addressed CRUD against durable storage.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn find(&self, key: &E::Key) -> Result<Option<E>, RepositoryError>;

    /// Returns rows in the repository's natural order, windowed by `query`.
    async fn find_all(&self, query: Option<&ListQuery>) -> Result<Vec<E>, RepositoryError>;

    /// Persists a new row and returns it with its generated key.
    async fn insert(&self, tx: &mut dyn Transaction, entity: E) -> Result<E, RepositoryError>;

    /// Replaces the row with the same key.
    async fn update(&self, tx: &mut dyn Transaction, entity: E) -> Result<E, RepositoryError>;

    /// Removes a row. Returns `false` if no row had this key.
    async fn remove(&self, tx: &mut dyn Transaction, key: &E::Key)
        -> Result<bool, RepositoryError>;

    async fn count(&self) -> Result<usize, RepositoryError>;
}

struct Row<E> {
    seq: u64,
    entity: E,
}

struct Table<E: Entity> {
    rows: HashMap<E::Key, Row<E>>,
    /// `None` once every `u32` key has been issued.
    next_id: Option<u32>,
    next_seq: u64,
}

impl<E: Entity> Table<E> {
    fn ordered(&self) -> Vec<E> {
        let mut rows: Vec<&Row<E>> = self.rows.values().collect();
        rows.sort_by_key(|row| row.seq);
        rows.into_iter().map(|row| row.entity.clone()).collect()
    }

    fn allocate(&mut self, entity: &mut E) -> Result<E::Key, RepositoryError> {
        let id = self.next_id.ok_or_else(|| {
            RepositoryError::ConstraintViolation(format!("{} keys exhausted", E::ENTITY_TYPE))
        })?;
        self.next_id = id.checked_add(1);
        let key = E::Key::from(id);
        entity.set_key(key.clone());
        Ok(key)
    }

    fn push(&mut self, key: E::Key, entity: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.rows.insert(key, Row { seq, entity });
    }
}

/// In-process [`Repository`] backed by a shared table.
///
/// Cloning yields another handle to the same table.
pub struct InMemoryRepository<E: Entity> {
    table: Arc<Mutex<Table<E>>>,
}

impl<E: Entity> Clone for InMemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
        }
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(Table {
                rows: HashMap::new(),
                next_id: Some(1),
                next_seq: 0,
            })),
        }
    }

    /// An empty repository whose first generated key is `first_key`.
    pub fn starting_at(first_key: u32) -> Self {
        let repo = Self::new();
        lock(&repo.table).next_id = Some(first_key);
        repo
    }

    /// Inserts a row outside any transaction, assigning the next key.
    /// Used to load fixtures at startup.
    pub fn seed(&self, mut entity: E) -> Result<E, RepositoryError> {
        let mut table = self.table()?;
        let key = table.allocate(&mut entity)?;
        table.push(key, entity.clone());
        Ok(entity)
    }

    fn table(&self) -> Result<MutexGuard<'_, Table<E>>, RepositoryError> {
        self.table
            .lock()
            .map_err(|_| RepositoryError::Connection("storage lock poisoned".into()))
    }
}

// Compensations cannot report errors, so they recover a poisoned lock.
fn lock<E: Entity>(table: &Mutex<Table<E>>) -> MutexGuard<'_, Table<E>> {
    table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn find(&self, key: &E::Key) -> Result<Option<E>, RepositoryError> {
        let table = self.table()?;
        Ok(table.rows.get(key).map(|row| row.entity.clone()))
    }

    async fn find_all(&self, query: Option<&ListQuery>) -> Result<Vec<E>, RepositoryError> {
        let rows = self.table()?.ordered();
        Ok(match query {
            Some(query) => query.apply(rows),
            None => rows,
        })
    }

    async fn insert(&self, tx: &mut dyn Transaction, mut entity: E) -> Result<E, RepositoryError> {
        let key = {
            let mut table = self.table()?;
            let key = table.allocate(&mut entity)?;
            table.push(key.clone(), entity.clone());
            key
        };
        debug!(entity_type = E::ENTITY_TYPE, %key, "Row inserted");

        let table = self.table.clone();
        tx.on_rollback(Box::new(move || {
            lock(&table).rows.remove(&key);
        }));
        Ok(entity)
    }

    async fn update(&self, tx: &mut dyn Transaction, entity: E) -> Result<E, RepositoryError> {
        let key = entity.key();
        let previous = {
            let mut table = self.table()?;
            let row = table.rows.get_mut(&key).ok_or_else(|| {
                RepositoryError::ConstraintViolation(format!(
                    "{} {} does not exist",
                    E::ENTITY_TYPE,
                    key
                ))
            })?;
            std::mem::replace(&mut row.entity, entity.clone())
        };
        debug!(entity_type = E::ENTITY_TYPE, %key, "Row updated");

        let table = self.table.clone();
        tx.on_rollback(Box::new(move || {
            if let Some(row) = lock(&table).rows.get_mut(&key) {
                row.entity = previous;
            }
        }));
        Ok(entity)
    }

    async fn remove(
        &self,
        tx: &mut dyn Transaction,
        key: &E::Key,
    ) -> Result<bool, RepositoryError> {
        let removed = self.table()?.rows.remove(key);
        let Some(row) = removed else {
            return Ok(false);
        };
        debug!(entity_type = E::ENTITY_TYPE, %key, "Row removed");

        let table = self.table.clone();
        let key = key.clone();
        tx.on_rollback(Box::new(move || {
            lock(&table).rows.insert(key, row);
        }));
        Ok(true)
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.table()?.rows.len())
    }
}
