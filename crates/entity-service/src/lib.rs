//! # Entity Service
//!
//! This crate provides a generic, transactional CRUD engine for persistence
//! entities. One implementation, [`EntityService`], serves every entity type;
//! each entity supplies type arguments, a mapper, and its own caching policy.
//!
//! ## Architecture Overview
//!
//! The engine composes six collaborators, each behind a trait:
//!
//! 1. **[`Mapper`]** - converts between transport models and entities
//! 2. **[`Repository`]** - key-addressed storage
//! 3. **[`UnitOfWork`]** - transaction boundaries
//! 4. **[`NotificationDispatcher`]** - real-time change events
//! 5. **[`CacheProvider`]** (optional) - read-through cache
//! 6. **[`Logger`]** (optional) - operation diagnostics
//!
//! Optional collaborators are plain `Option`s checked at runtime, so a cached
//! and an uncached entity run exactly the same code.
//!
//! ## Guarantees
//!
//! - A write reports success iff its transaction committed.
//! - A committed write invalidates its cache entry and publishes exactly one
//!   [`ChangeNotification`].
//! - A failed write leaves storage, cache and subscribers untouched.
//! - Cache and dispatch failures are logged, never returned.
//!
//! ## Example
//!
//! ```rust
//! use entity_service::{
//!     BroadcastDispatcher, Entity, EntityService, InMemoryRepository, InMemoryUnitOfWork,
//!     Mapper, MappingError, MokaCacheProvider, ServiceConfig,
//! };
//! use serde::Serialize;
//! use std::sync::Arc;
//!
//! // 1. Define the entity and its transport model
//! #[derive(Clone, Debug)]
//! struct Room { id: u32, name: String }
//!
//! impl Entity for Room {
//!     type Key = u32;
//!     const ENTITY_TYPE: &'static str = "Room";
//!     fn key(&self) -> u32 { self.id }
//!     fn set_key(&mut self, key: u32) { self.id = key; }
//! }
//!
//! #[derive(Clone, Debug, PartialEq, Serialize)]
//! struct RoomModel { id: u32, name: String }
//!
//! // 2. Define the mapping
//! struct RoomMapper;
//! impl Mapper<RoomModel, Room> for RoomMapper {
//!     fn to_model(&self, e: &Room) -> Result<RoomModel, MappingError> {
//!         Ok(RoomModel { id: e.id, name: e.name.clone() })
//!     }
//!     fn to_entity(&self, m: &RoomModel) -> Result<Room, MappingError> {
//!         if m.name.is_empty() {
//!             return Err(MappingError::invalid("name", "must not be empty"));
//!         }
//!         Ok(Room { id: m.id, name: m.name.clone() })
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     // 3. Wire the service
//!     let dispatcher = BroadcastDispatcher::new(16);
//!     let mut events = dispatcher.subscribe();
//!     let config: ServiceConfig<RoomModel, Room> = ServiceConfig::new(
//!         Arc::new(RoomMapper),
//!         Arc::new(InMemoryRepository::<Room>::new()),
//!         Arc::new(InMemoryUnitOfWork::new()),
//!         Arc::new(dispatcher),
//!     )
//!     .with_cache(Arc::new(MokaCacheProvider::<u32, RoomModel>::new(100, None)), None);
//!     let rooms = EntityService::new(config);
//!
//!     // 4. Use it
//!     let created = rooms
//!         .create(RoomModel { id: 0, name: "Lab".into() })
//!         .await
//!         .unwrap();
//!     assert_eq!(created.id, 1);
//!     assert_eq!(rooms.get_by_id(1).await.unwrap(), created);
//!     assert_eq!(events.recv().await.unwrap().key, "1");
//! }
//! ```
//!
//! ## Testing
//!
//! The [`mock`] module provides counting and failure-injecting doubles for
//! every collaborator.

pub mod cache;
pub mod entity;
pub mod error;
pub mod logger;
pub mod mock;
pub mod notification;
pub mod query;
pub mod repository;
pub mod service;
pub mod telemetry;
pub mod unit_of_work;

// Re-export core types for convenience
pub use cache::{CacheProvider, MokaCacheProvider};
pub use entity::{Entity, Mapper};
pub use error::{CacheError, DispatchError, MappingError, RepositoryError, ServiceError};
pub use logger::{Logger, TracingLogger};
pub use notification::{BroadcastDispatcher, ChangeNotification, NotificationDispatcher, Operation};
pub use query::ListQuery;
pub use repository::{InMemoryRepository, Repository};
pub use service::{EntityService, ServiceConfig};
pub use unit_of_work::{Compensation, InMemoryUnitOfWork, Transaction, UnitOfWork};
