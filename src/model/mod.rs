//! Persistence entities and their transport models.
//!
//! Each entity implements [`Entity`](entity_service::Entity) so it can be stored
//! by a repository and served by an [`EntityService`](entity_service::EntityService).
//! Models are what callers send and receive; amounts are integer cents.

pub mod expense;
pub mod fee_type;
pub mod income;
pub mod menu;
pub mod section;

pub use expense::*;
pub use fee_type::*;
pub use income::*;
pub use menu::*;
pub use section::*;
