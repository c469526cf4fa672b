use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::AppState;
use crate::error::ApiError;

/// Signed-in user and whether the whitelist lets them manage content.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminSession {
    #[serde(skip)]
    pub token: String,
    pub email: String,
    pub allowed: bool,
    /// `admin_emails` is not created yet; only the configured list applies.
    pub missing_table: bool,
    #[serde(skip)]
    pub admins: Option<Vec<String>>,
}

pub fn bearer_token(auth: Option<Authorization<Bearer>>) -> Result<String, ApiError> {
    match auth {
        Some(a) if !a.token().is_empty() => Ok(a.token().to_string()),
        _ => Err(ApiError::Unauthorized("Missing access token".into())),
    }
}

/// Case-insensitive membership in either the table list or the configured list.
pub fn is_allowed(email: &str, table_admins: Option<&[String]>, static_admins: &[String]) -> bool {
    let email = email.to_lowercase();
    table_admins.is_some_and(|list| list.iter().any(|a| a.to_lowercase() == email))
        || static_admins.iter().any(|a| a.to_lowercase() == email)
}

/// Resolves the bearer token into a session, checking the admin whitelist.
pub async fn resolve_session(
    state: &AppState,
    auth: Option<Authorization<Bearer>>,
) -> Result<AdminSession, ApiError> {
    let token = bearer_token(auth)?;
    let user = state.backend.get_user(&token).await?;
    let email = user
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Session has no email".into()))?;

    let static_admins = state.settings.static_admins();
    let (admins, missing_table) = match state.backend.list_admins(Some(&token)).await {
        Ok(rows) => (
            Some(rows.into_iter().map(|r| r.email.to_lowercase()).collect::<Vec<_>>()),
            false,
        ),
        Err(err) if err.is_missing_table() => {
            warn!("admin_emails table missing, using configured whitelist");
            (None, true)
        }
        Err(err) => return Err(err.into()),
    };

    let allowed = is_allowed(&email, admins.as_deref(), &static_admins);
    Ok(AdminSession {
        token,
        email,
        allowed,
        missing_table,
        admins,
    })
}

/// Like [`resolve_session`] but rejects users outside the whitelist.
pub async fn require_admin(
    state: &AppState,
    auth: Option<Authorization<Bearer>>,
) -> Result<AdminSession, ApiError> {
    let session = resolve_session(state, auth).await?;
    if !session.allowed {
        warn!(email = %session.email, "admin access denied");
        return Err(ApiError::Forbidden(
            "Your account isn't whitelisted yet. Ask an existing admin to add your email.".into(),
        ));
    }
    Ok(session)
}
