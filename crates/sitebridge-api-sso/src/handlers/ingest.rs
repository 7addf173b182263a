//! Partner ingestion endpoint.

use axum::{extract::State, http::StatusCode, Form};

use crate::error::SsoResult;
use crate::models::IngestForm;
use crate::SsoState;

/// `POST /auth/sso/ingest` with form field `sso_data`.
pub async fn ingest(
    State(state): State<SsoState>,
    Form(form): Form<IngestForm>,
) -> SsoResult<StatusCode> {
    state.ingest.ingest(&form.token).await?;
    Ok(StatusCode::NO_CONTENT)
}
