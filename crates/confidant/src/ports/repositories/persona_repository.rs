//! Persona Repository Port
//!
//! Abstract interface for Persona persistence operations.

use async_trait::async_trait;

use crate::domain::{errors::DomainError, Persona};

/// Repository interface for the persona collection.
///
/// The collection is read once at startup and rewritten in full after every
/// mutation, so the port only deals in whole snapshots.
#[async_trait]
pub trait PersonaRepository: Send + Sync {
    /// Load the stored collection in insertion order.
    ///
    /// An absent record yields an empty collection. Unreadable or undecodable
    /// data yields [`DomainError::PersistenceDegraded`].
    async fn load_all(&self) -> Result<Vec<Persona>, DomainError>;

    /// Replace the stored collection
    async fn save_all(&self, personas: &[Persona]) -> Result<(), DomainError>;
}
