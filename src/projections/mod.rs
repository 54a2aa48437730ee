//! Value-stream map projections

pub mod snapshot;
pub mod summary;

pub use snapshot::*;
pub use summary::*;

use crate::events::VsmEvent;
use async_trait::async_trait;

/// Trait for read models built from workspace events
#[async_trait]
pub trait VsmProjection: Send + Sync {
    /// Handle an event to update the projection
    async fn handle_event(&mut self, event: &VsmEvent) -> Result<(), String>;

    /// Drop everything the projection has accumulated
    async fn clear(&mut self) -> Result<(), String>;

    /// Sequence number of the last handled event
    async fn get_checkpoint(&self) -> Option<u64>;

    /// Record the sequence number of the last handled event
    async fn save_checkpoint(&mut self, sequence: u64) -> Result<(), String>;
}
