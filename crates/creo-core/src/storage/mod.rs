//! Persistence port for Creo.
//!
//! Defines the key-value backend interface the durable stores write
//! through. Implementations live in `creo-infra`; an in-memory
//! implementation ships here so the core is testable without any runtime
//! environment.

pub mod memory;

pub use memory::MemoryStorage;

use creo_types::error::StorageError;

/// Trait for durable key-value persistence of JSON payloads.
///
/// Keys are bare names (no path separators); values are JSON-encoded
/// strings. Every `set` and `remove` must be flushed to durable storage
/// before the call returns -- callers rely on this to survive abrupt
/// process termination.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait StorageBackend: Send + Sync {
    /// Get the payload for a key. Returns None if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Set the payload for a key (upsert), durably.
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// Remove a key. No-op if the key does not exist.
    fn remove(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}
