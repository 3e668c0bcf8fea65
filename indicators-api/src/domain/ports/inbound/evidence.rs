use async_trait::async_trait;

use crate::domain::{Actor, EvidenceError};

#[async_trait]
pub trait EvidenceService: Send + Sync + 'static {
    /// Store a file under the actor's primary area and return its object path.
    async fn upload(
        &self,
        actor: &Actor,
        file_name: &str,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Result<String, EvidenceError>;

    /// A short-lived URL for reading the object at `path`.
    ///
    /// Members may only read objects stored under one of their areas.
    async fn signed_url(&self, actor: &Actor, path: &str) -> Result<String, EvidenceError>;
}
