use super::errors::{self, sub_codes};
use crate::api::ItemResponse;
use crate::api::models::FileUploadType;
use crate::core::simulator::{Built, RequestContext};
use crate::core::store::ServerState;
use crate::error::SimulationError;
use log::debug;

/// Multipart part carrying one appended chunk.
pub const FILE_PART: &str = "tableau_file";

pub fn initiate_file_upload(
    ctx: &RequestContext<'_>,
    _state: &mut ServerState,
) -> Result<Built, SimulationError> {
    let session = ctx.uploads.initiate();
    debug!("Opened upload session {}", session);
    Ok(Built::created(ItemResponse::new(FileUploadType {
        upload_session_id: session,
        file_size: 0,
    })))
}

pub fn append_to_file_upload(
    ctx: &RequestContext<'_>,
    _state: &mut ServerState,
) -> Result<Built, SimulationError> {
    let session = ctx.param("upload-session-id")?;
    if !ctx.uploads.contains(session) {
        return Err(errors::not_found(
            sub_codes::UPLOAD_SESSION_NOT_FOUND,
            "Upload session",
            session,
        )
        .into());
    }

    let chunk = ctx
        .form
        .as_ref()
        .and_then(|form| form.part(FILE_PART))
        .ok_or_else(|| {
            errors::bad_request(format!("The request has no '{}' multipart part", FILE_PART))
        })?;
    let file_size = ctx.uploads.append(session, &chunk.data).ok_or_else(|| {
        errors::not_found(sub_codes::UPLOAD_SESSION_NOT_FOUND, "Upload session", session)
    })?;

    Ok(Built::ok(ItemResponse::new(FileUploadType {
        upload_session_id: session.to_string(),
        file_size,
    })))
}
