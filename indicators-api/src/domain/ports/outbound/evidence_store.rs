use async_trait::async_trait;
use time::Duration;

use crate::domain::EvidenceError;

/// Outbound port for the object store holding evidence files.
#[async_trait]
pub trait EvidenceStore: Send + Sync + 'static {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), EvidenceError>;

    /// A URL granting read access to the object for `ttl`.
    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String, EvidenceError>;
}
