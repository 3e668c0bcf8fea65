use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    adapters::inbound::http::EvidenceUploadResponse,
    app_state::AppState,
    auth::MemberUser,
    domain::services::MAX_EVIDENCE_SIZE,
    routes::ApiError,
};

// Leave room for the multipart framing around the file itself.
const EVIDENCE_UPLOAD_BODY_LIMIT: usize = MAX_EVIDENCE_SIZE + 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(upload_evidence))
        .route_layer(DefaultBodyLimit::max(EVIDENCE_UPLOAD_BODY_LIMIT))
        .route("/*path", get(evidence_redirect))
}

struct EvidenceFile {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

#[instrument(name = "POST /evidence", skip(user, app_state, multipart), fields(profile_id = %user.id))]
async fn upload_evidence(
    user: MemberUser,
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<EvidenceUploadResponse>), ApiError> {
    let file = extract_file_from_multipart(&mut multipart).await?;

    let path = app_state
        .evidence_service
        .upload(&user.actor(), &file.file_name, file.content_type, file.bytes)
        .await?;

    Ok((StatusCode::CREATED, Json(EvidenceUploadResponse { path })))
}

/// Redirect to a short-lived signed URL for the stored file.
#[instrument(name = "GET /evidence/*path", skip(user, app_state), fields(profile_id = %user.id))]
async fn evidence_redirect(
    user: MemberUser,
    State(app_state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Redirect, ApiError> {
    let url = app_state
        .evidence_service
        .signed_url(&user.actor(), &path)
        .await?;

    Ok(Redirect::temporary(&url))
}

async fn extract_file_from_multipart(multipart: &mut Multipart) -> Result<EvidenceFile, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("failed to parse multipart field"))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::bad_request("failed to read evidence payload"))?;

        return Ok(EvidenceFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::bad_request("missing file field"))
}
