use std::sync::Arc;

use async_trait::async_trait;
use time::Duration;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::{
    models::AreaId,
    ports::{
        inbound::EvidenceService,
        outbound::{AreaRepository, EvidenceStore},
    },
    Actor, EvidenceError, TrackingError,
};

use super::reporting::{area_scope, AreaScope};

pub const MAX_EVIDENCE_SIZE: usize = 10 * 1024 * 1024;

const FALLBACK_FILE_NAME: &str = "evidence";

/// Keep a client file name usable as a single object path segment.
fn sanitize_file_name(name: &str) -> String {
    let cleaned = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '#' | '?' | '%' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Object paths are relative and never climb out of the bucket.
pub(crate) fn validate_object_path(path: &str) -> Result<&str, EvidenceError> {
    let path = path.trim();
    let valid = !path.is_empty()
        && !path.starts_with('/')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");

    if valid {
        Ok(path)
    } else {
        Err(EvidenceError::InvalidPath)
    }
}

/// Uploads are stored as `{area_id}/{uuid}/{file}`.
fn evidence_area(path: &str) -> Option<AreaId> {
    path.split('/')
        .next()
        .and_then(|segment| Uuid::parse_str(segment).ok())
        .map(AreaId::from)
}

pub(crate) fn evidence_in_scope(scope: &AreaScope, path: &str) -> bool {
    match scope {
        None => true,
        Some(area_ids) => evidence_area(path).is_some_and(|area| area_ids.contains(&area)),
    }
}

pub struct EvidenceServiceImpl<S, A> {
    store: Arc<S>,
    areas: Arc<A>,
    signed_url_ttl: Duration,
}

impl<S, A> EvidenceServiceImpl<S, A>
where
    S: EvidenceStore,
    A: AreaRepository,
{
    pub fn new(store: Arc<S>, areas: Arc<A>, signed_url_ttl: Duration) -> Self {
        Self {
            store,
            areas,
            signed_url_ttl,
        }
    }
}

#[async_trait]
impl<S, A> EvidenceService for EvidenceServiceImpl<S, A>
where
    S: EvidenceStore,
    A: AreaRepository,
{
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        actor: &Actor,
        file_name: &str,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Result<String, EvidenceError> {
        if bytes.is_empty() {
            return Err(EvidenceError::EmptyPayload);
        }
        if bytes.len() > MAX_EVIDENCE_SIZE {
            return Err(EvidenceError::PayloadTooLarge);
        }

        let primary = self
            .areas
            .memberships(&actor.profile_id)
            .await
            .map_err(|err| EvidenceError::Upload(err.to_string()))?
            .into_iter()
            .next()
            .ok_or(EvidenceError::NoAreaAssigned)?;

        let path = format!(
            "{}/{}/{}",
            primary.area.id,
            Uuid::new_v4(),
            sanitize_file_name(file_name)
        );

        self.store
            .upload(&path, bytes, content_type.as_deref())
            .await?;
        tracing::info!(%path, "evidence uploaded");

        Ok(path)
    }

    #[instrument(skip(self))]
    async fn signed_url(&self, actor: &Actor, path: &str) -> Result<String, EvidenceError> {
        let path = validate_object_path(path)?;

        let scope = area_scope(self.areas.as_ref(), actor)
            .await
            .map_err(|err| match err {
                TrackingError::NoAreaAssigned => EvidenceError::NoAreaAssigned,
                err => EvidenceError::Signing(err.to_string()),
            })?;
        if !evidence_in_scope(&scope, path) {
            return Err(EvidenceError::Forbidden);
        }

        self.store.signed_url(path, self.signed_url_ttl).await
    }
}
