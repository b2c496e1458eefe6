//! System wiring and lifecycle.

pub mod infrastructure;
pub mod school_system;

pub use infrastructure::Infrastructure;
pub use school_system::{Repositories, SchoolSystem, SystemError};
