//! # Observability
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate.
//!
//! ## Configuration
//!
//! The subscriber uses a compact format that hides the crate/module prefix
//! (`with_target(false)`); every event carries an `entity_type` field instead.
//! Levels come from the `RUST_LOG` environment variable.
//!
//! ```bash
//! # Writes, startup and shutdown
//! RUST_LOG=info cargo run
//!
//! # Cache hits, transactions and row-level storage events
//! RUST_LOG=debug cargo run
//!
//! # Storage events only
//! RUST_LOG=entity_service::repository=debug cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! - **Service operations**: creates, updates, deletes, cache hits, rollbacks
//!   (only for services configured with a [`Logger`](crate::Logger))
//! - **Transactions**: begin, commit, rollback, rollback-on-drop
//! - **Storage**: row inserts, updates and removals
//!
//! **With `RUST_LOG=debug`**:
//!
//! ```text
//! DEBUG Transaction started tx=1
//! DEBUG Row inserted entity_type="FeeType" key=1
//! DEBUG Transaction committed tx=1 writes=1
//!  INFO Created 1 entity_type="FeeType"
//! DEBUG Cache hit for 1 entity_type="FeeType"
//! ```

/// Installs the global `tracing` subscriber. Call once, at startup.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
