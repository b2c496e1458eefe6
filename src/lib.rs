//! # School Admin
//!
//! > **One generic CRUD service, five school entities.**
//!
//! This crate wires the [`entity_service`] engine into the entities of a
//! school administration backend: expenses, fee types, incomes, navigation
//! menus and class sections.
//!
//! ## Design
//!
//! ### One service, many entities
//! Every entity is served by [`EntityService<M, E>`](entity_service::EntityService).
//! The read path, the transactional write path, cache invalidation and change
//! notifications are written once. An entity module contributes only:
//! - a model/entity pair ([`model`])
//! - a [`Mapper`](entity_service::Mapper) with its validation rules ([`services`])
//! - a factory choosing whether the service is cached and logged
//!
//! ### Caching policy
//! Fee types and sections are read on nearly every page and change rarely, so
//! their services get a moka cache and a tracing logger. The others go
//! straight to storage.
//!
//! ### Notifications
//! Each committed write is broadcast as a
//! [`ChangeNotification`](entity_service::ChangeNotification). The
//! [`SchoolSystem`](lifecycle::SchoolSystem) runs one subscriber that logs them;
//! call [`subscribe`](lifecycle::SchoolSystem::subscribe) to add your own.
//!
//! ## Module Tour
//!
//! - [`config`]: [`AppConfig`](config::AppConfig), loaded from defaults, TOML and env
//! - [`model`]: entities and transport models
//! - [`services`]: mappers, service aliases and factories
//! - [`lifecycle`]: [`SchoolSystem`](lifecycle::SchoolSystem) startup and shutdown
//!
//! ## Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```
//!
//! ```bash
//! cargo test
//! ```

pub mod config;
pub mod lifecycle;
pub mod model;
pub mod services;
