use async_trait::async_trait;

use meshbridge_core::error::Result;

/// Outbound publish capability. Implemented by the MQTT transport and by
/// in-memory buses in tests.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()>;
}
