//! # Storage Module
//!
//! Persistence for the per-user aggregate.
//!
//! Every profile, the notification schedule and both rotating logs for a user
//! live in one document. Writes are compare-and-swap on a version counter, so a
//! service that loads, mutates and saves either lands its whole change or gets a
//! [`StorageError::VersionConflict`] and leaves nothing behind. No operation
//! ever spans two users.
//!
//! - **connection**: SQLite pool and schema setup
//! - **traits**: [`AggregateStorage`], the contract the domain depends on
//! - **repositories**: the SQLx implementation of that contract

pub mod connection;
pub mod repositories;
pub mod traits;

pub use connection::DbConnection;
pub use repositories::AggregateRepository;
pub use traits::{AggregateStorage, StorageError, VersionedAggregate};
