use crate::error::StoreError;
use crate::types::RoleRecord;
use async_trait::async_trait;

/// Store interface for role definitions.
///
/// The hierarchy is small (tens to low hundreds of roles), so the contract
/// is one wholesale fetch with no filtering or pagination. Storage failures
/// propagate unchanged; retry policy belongs to the storage client, not
/// this layer.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Returns every role row.
    async fn load_all(&self) -> std::result::Result<Vec<RoleRecord>, StoreError>;
}
