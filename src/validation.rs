use crate::error::ApiError;
use crate::models::{DocumentDraft, EventDraft, JoinRequest};

pub fn validate_event(draft: &EventDraft) -> Result<(), ApiError> {
    if draft.title.trim().is_empty() || draft.date.trim().is_empty() {
        return Err(ApiError::BadRequest("Title and date are required".into()));
    }
    Ok(())
}

pub fn validate_document(draft: &DocumentDraft) -> Result<(), ApiError> {
    if draft.title.trim().is_empty() || draft.url.trim().is_empty() {
        return Err(ApiError::BadRequest("Title and URL are required".into()));
    }
    Ok(())
}

pub fn validate_join_request(request: &JoinRequest) -> Result<(), ApiError> {
    if request.name.trim().is_empty() || request.email.trim().is_empty() {
        return Err(ApiError::BadRequest("Name and email are required".into()));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ApiError::BadRequest("Email is required".into()));
    }
    Ok(email)
}
