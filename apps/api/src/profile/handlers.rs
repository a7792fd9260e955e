use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::extract::extract_text;
use crate::models::profile::{CandidateProfile, ExtractedResume};
use crate::profile::prompts::{PROFILE_EXTRACT_PROMPT, PROFILE_EXTRACT_SYSTEM};
use crate::profile::{build_profile, ProfileFields};
use crate::resilience::ResilienceError;
use crate::state::AppState;
use crate::upload::{validate_upload, ValidationReport};

#[derive(Serialize)]
pub struct ProfileResponse {
    pub profile: CandidateProfile,
    /// Soft validation findings are surfaced to the caller even when the
    /// profile was generated; the UI decides whether to warn.
    pub validation: ValidationReport,
}

struct UploadParts {
    file: Bytes,
    filename: Option<String>,
    fields: ProfileFields,
}

async fn read_multipart(mut multipart: Multipart) -> Result<UploadParts, AppError> {
    let mut file: Option<Bytes> = None;
    let mut filename: Option<String> = None;
    let mut fields = ProfileFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        let text_err = |e| AppError::Validation(format!("unreadable multipart field: {e}"));
        match field.name() {
            Some("file") => {
                filename = field.file_name().map(str::to_string);
                file = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(format!("failed to read file: {e}")))?,
                );
            }
            Some("name") => fields.name = Some(field.text().await.map_err(text_err)?),
            Some("email") => fields.email = Some(field.text().await.map_err(text_err)?),
            Some("headline") => fields.headline = Some(field.text().await.map_err(text_err)?),
            _ => {} // unknown parts are ignored
        }
    }

    let file = file.ok_or_else(|| AppError::Validation("missing 'file' part".to_string()))?;
    Ok(UploadParts {
        file,
        filename,
        fields,
    })
}

/// POST /api/v1/profiles
///
/// Validates the uploaded résumé, extracts its text and asks the LLM
/// (through the circuit breaker) for a structured profile.
pub async fn handle_create_profile(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ProfileResponse>, AppError> {
    let parts = read_multipart(multipart).await?;

    let report = validate_upload(
        &parts.file,
        parts.filename.as_deref(),
        &state.config.validation_options(),
    )?;
    info!(
        size = report.size,
        mime = ?report.mime_type,
        valid = report.is_valid,
        "resume upload validated"
    );

    let text = extract_text(&parts.file, report.mime_type.as_deref())?;
    let prompt = PROFILE_EXTRACT_PROMPT.replace("{resume_text}", &text);

    let extracted: ExtractedResume = state
        .breaker
        .execute(|| {
            let llm = state.llm.clone();
            let prompt = prompt.clone();
            async move { llm.call_json(&prompt, PROFILE_EXTRACT_SYSTEM).await }
        })
        .await
        .map_err(|e| match e {
            ResilienceError::CircuitOpen { .. } => AppError::Unavailable(e.to_string()),
            ResilienceError::Timeout { .. } | ResilienceError::Upstream(_) => {
                AppError::Llm(e.to_string())
            }
        })?;

    let profile = build_profile(extracted, parts.fields);
    Ok(Json(ProfileResponse {
        profile,
        validation: report,
    }))
}

/// POST /api/v1/uploads/validate
///
/// Validation-only pre-flight so the UI can reject a bad file before the
/// expensive extraction and AI calls.
pub async fn handle_validate_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ValidationReport>, AppError> {
    let parts = read_multipart(multipart).await?;
    let report = validate_upload(
        &parts.file,
        parts.filename.as_deref(),
        &state.config.validation_options(),
    )?;
    Ok(Json(report))
}
