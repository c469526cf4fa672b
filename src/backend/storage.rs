use serde_json::json;
use tracing::debug;
use url::Url;

use super::{BackendError, SupabaseClient};

impl SupabaseClient {
    /// Uploads `bytes` under `path` in the gallery bucket. Existing objects are not overwritten.
    pub async fn upload_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
        session: Option<&str>,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("storage/v1/object/{}/{path}", self.bucket()))?;
        debug!(path, size = bytes.len(), "uploading object");
        let request = self
            .authorize(self.http().post(url), session)
            .header("x-upsert", "false")
            .header(
                "content-type",
                content_type.unwrap_or("application/octet-stream"),
            )
            .body(bytes);
        Self::check(request.send().await?).await?;
        Ok(())
    }

    pub async fn remove_objects(
        &self,
        paths: &[String],
        session: Option<&str>,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(&format!("storage/v1/object/{}", self.bucket()))?;
        debug!(count = paths.len(), "removing objects");
        let request = self
            .authorize(self.http().delete(url), session)
            .json(&json!({ "prefixes": paths }));
        Self::check(request.send().await?).await?;
        Ok(())
    }

    /// URL a browser can load without credentials. Pure: no request is made.
    pub fn public_url(&self, path: &str) -> Result<Url, BackendError> {
        self.endpoint(&format!(
            "storage/v1/object/public/{}/{}",
            self.bucket(),
            path.trim_start_matches('/')
        ))
    }
}

/// Object name for a new upload: a fresh UUID keeping the original extension.
pub fn object_path(filename: &str) -> String {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "jpg".to_string());
    format!("{}.{ext}", uuid::Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url() {
        let client = SupabaseClient::new(Url::parse("https://abc.supabase.co").unwrap(), "anon", "gallery")
            .unwrap();
        assert_eq!(
            client.public_url("171_x.png").unwrap().as_str(),
            "https://abc.supabase.co/storage/v1/object/public/gallery/171_x.png"
        );
    }

    #[test]
    fn test_object_path_extension() {
        assert!(object_path("Concert.PNG").ends_with(".png"));
        assert!(object_path("noext").ends_with(".jpg"));
        assert!(object_path("weird.").ends_with(".jpg"));
        assert_ne!(object_path("a.jpg"), object_path("a.jpg"));
    }
}
