use chrono_tz::Tz;
use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub port: u16,
    pub debug: bool,
    pub enable_swagger: bool,
    pub supabase_url: Url,
    pub supabase_anon_key: String,
    pub storage_bucket: String,
    /// Public origin of the website; magic links redirect to `<site_url>/admin`.
    pub site_url: Url,
    pub organization_name: String,
    pub uid_domain: String,
    pub calendar_file_name: String,
    pub timezone: String,
    pub contact_email: String,
    #[serde(default)]
    pub resend_api_key: Option<String>,
    pub resend_base_url: Url,
    pub join_request_to: String,
    pub join_request_from: String,
    #[serde(default)]
    pub admin_whitelist: Vec<String>,
    pub announcement_count: usize,
    #[serde(default)]
    pub static_announcements: Vec<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // Load from environment variables with APP_ prefix, `__` for nesting
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("admin_whitelist")
                    .with_list_parse_key("static_announcements"),
            )
            .set_default("port", 8080)?
            .set_default("debug", false)?
            .set_default("enable_swagger", true)?
            .set_default("supabase_url", "http://localhost:54321")?
            .set_default("supabase_anon_key", "")?
            .set_default("storage_bucket", "gallery")?
            .set_default("site_url", "http://localhost:8080")?
            .set_default("organization_name", "Girard Music & Drama Boosters")?
            .set_default("uid_domain", "girard-boosters")?
            .set_default("calendar_file_name", "girard-events.ics")?
            .set_default("timezone", "America/New_York")?
            .set_default("contact_email", "girardmusicboosters@gmail.com")?
            .set_default("resend_base_url", "https://api.resend.com")?
            .set_default("join_request_to", "girardmusicboosters@gmail.com")?
            .set_default(
                "join_request_from",
                "Boosters Website <onboarding@resend.dev>",
            )?
            .set_default("announcement_count", 3)?
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.tz()?;
        Ok(settings)
    }

    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| ConfigError::Message(format!("invalid timezone '{}': {e}", self.timezone)))
    }

    /// Lowercased static admin list.
    pub fn static_admins(&self) -> Vec<String> {
        self.admin_whitelist
            .iter()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }

    pub fn magic_link_redirect(&self) -> String {
        format!("{}/admin", self.site_url.as_str().trim_end_matches('/'))
    }
}
