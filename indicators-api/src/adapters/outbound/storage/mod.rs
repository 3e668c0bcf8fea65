//! Evidence files kept in a bucket of an HTTP object-storage service.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use time::Duration;
use url::Url;

use crate::{config::StorageSettings, domain::ports::outbound::EvidenceStore, domain::EvidenceError};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignRequest {
    expires_in: i64,
}

#[derive(Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

/// Adapter that talks to the storage REST API with the service key.
#[derive(Debug, Clone)]
pub struct HttpEvidenceStore {
    http_client: Client,
    base_url: Url,
    bucket: String,
    service_key: String,
}

impl HttpEvidenceStore {
    pub fn new(settings: &StorageSettings) -> Result<Self, url::ParseError> {
        let base = settings.base_url.trim_end_matches('/');
        let base_url = Url::parse(&format!("{base}/"))?;

        Ok(Self {
            http_client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url,
            bucket: settings.bucket.clone(),
            service_key: settings.service_key.clone(),
        })
    }

    /// Each object path segment is percent-encoded on its own.
    fn object_url(&self, action: &str, path: &str) -> Result<Url, EvidenceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| EvidenceError::InvalidPath)?
            .pop_if_empty()
            .extend(action.split('/'))
            .push(&self.bucket)
            .extend(path.split('/'));
        Ok(url)
    }

    /// The signing endpoint answers with a path relative to the API base.
    fn absolute_signed_url(&self, signed: &str) -> Result<String, EvidenceError> {
        let url = self
            .base_url
            .join(signed.trim_start_matches('/'))
            .map_err(|e| EvidenceError::Signing(e.to_string()))?;
        Ok(url.to_string())
    }
}

#[async_trait]
impl EvidenceStore for HttpEvidenceStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), EvidenceError> {
        let url = self.object_url("object", path)?;
        let response = self
            .http_client
            .post(url)
            .bearer_auth(&self.service_key)
            .header(
                header::CONTENT_TYPE,
                content_type.unwrap_or(DEFAULT_CONTENT_TYPE),
            )
            .body(bytes)
            .send()
            .await
            .map_err(|e| EvidenceError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, %body, "evidence upload rejected");
            return Err(EvidenceError::Upload(format!("storage answered {status}")));
        }

        Ok(())
    }

    async fn signed_url(&self, path: &str, ttl: Duration) -> Result<String, EvidenceError> {
        let url = self.object_url("object/sign", path)?;
        let response = self
            .http_client
            .post(url)
            .bearer_auth(&self.service_key)
            .json(&SignRequest {
                expires_in: ttl.whole_seconds(),
            })
            .send()
            .await
            .map_err(|e| EvidenceError::Signing(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => {
                return Err(EvidenceError::NotFound);
            }
            status => {
                tracing::warn!(%status, %path, "signing evidence url failed");
                return Err(EvidenceError::Signing(format!("storage answered {status}")));
            }
        }

        let signed = response
            .json::<SignResponse>()
            .await
            .map_err(|e| EvidenceError::Signing(e.to_string()))?;

        self.absolute_signed_url(&signed.signed_url)
    }
}
