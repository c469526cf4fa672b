use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::{BackendError, SupabaseClient};

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl SupabaseClient {
    /// Emails a one-time sign-in link that lands on `redirect_to`.
    pub async fn send_magic_link(&self, email: &str, redirect_to: &str) -> Result<(), BackendError> {
        let mut url = self.endpoint("auth/v1/otp")?;
        url.query_pairs_mut().append_pair("redirect_to", redirect_to);
        info!(email, "sending magic link");
        let request = self
            .authorize(self.http().post(url), None)
            .json(&json!({ "email": email, "create_user": true }));
        Self::check(request.send().await?).await?;
        Ok(())
    }

    /// Resolves the user behind an access token.
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, BackendError> {
        let url = self.endpoint("auth/v1/user")?;
        debug!("resolving session user");
        let request = self.authorize(self.http().get(url), Some(access_token));
        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let url = self.endpoint("auth/v1/logout")?;
        let request = self.authorize(self.http().post(url), Some(access_token));
        Self::check(request.send().await?).await?;
        Ok(())
    }
}
