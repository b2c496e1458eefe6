//! # Entity and Mapper Traits
//!
//! [`Entity`] is the contract every persistence record implements to be managed
//! by the generic [`EntityService`](crate::EntityService). [`Mapper`] converts
//! between an entity and the transport model callers work with.
//!
//! # Architecture Note
//! The key type is an associated type rather than a third generic parameter on
//! the service. A `FeeType` entity is always keyed by its own key type, so the
//! compiler can refuse a `Section` key passed to the `FeeType` service.

use crate::error::MappingError;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any persistence record must implement to be stored by a
/// [`Repository`](crate::Repository) and served by an
/// [`EntityService`](crate::EntityService).
pub trait Entity: Clone + Send + Sync + 'static {
    /// The unique identifier for this entity.
    /// Must be convertible from u32 so repositories can generate keys.
    type Key: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u32> + 'static;

    /// Name used in change notifications and log fields (e.g. `"FeeType"`).
    const ENTITY_TYPE: &'static str;

    fn key(&self) -> Self::Key;

    fn set_key(&mut self, key: Self::Key);
}

/// Bidirectional Model <-> Entity converter.
///
/// Implementations validate while converting; an invalid field is reported as
/// [`MappingError::InvalidField`].
pub trait Mapper<M, E>: Send + Sync {
    fn to_model(&self, entity: &E) -> Result<M, MappingError>;

    fn to_entity(&self, model: &M) -> Result<E, MappingError>;

    /// Rules that depend on the entity's final key. Called inside the write
    /// transaction once the key is set: after `insert` on create, after
    /// `set_key` on update.
    fn validate(&self, _entity: &E) -> Result<(), MappingError> {
        Ok(())
    }
}
