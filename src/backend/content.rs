use tracing::warn;

use super::{BackendError, Order, SupabaseClient, TableQuery};
use crate::models::{
    AdminEmail, DocumentDraft, DocumentRow, EventDraft, EventRow, NewPhoto, PhotoRow, PhotoUpdate,
};

pub const EVENT_COLUMNS: &str = "id,title,date,calendar,location,description,published";
pub const PHOTO_COLUMNS: &str = "id,path,alt,order_index,published";
pub const DOCUMENT_COLUMNS: &str = "id,title,description,url,order_index,published";

fn first_or_not_found<T>(rows: Vec<T>, what: &str, id: &str) -> Result<T, BackendError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| BackendError::NotFound(format!("{what} {id} not found")))
}

impl SupabaseClient {
    pub async fn list_events(
        &self,
        published_only: bool,
        session: Option<&str>,
    ) -> Result<Vec<EventRow>, BackendError> {
        let mut query = TableQuery::new("events").select(EVENT_COLUMNS);
        if published_only {
            query = query.eq("published", true);
        }
        self.select(&query.order("date", Order::Asc), session).await
    }

    pub async fn get_event(&self, id: &str, session: Option<&str>) -> Result<EventRow, BackendError> {
        let query = TableQuery::new("events").select(EVENT_COLUMNS).eq("id", id);
        first_or_not_found(self.select(&query, session).await?, "event", id)
    }

    pub async fn create_events(
        &self,
        drafts: &[EventDraft],
        session: Option<&str>,
    ) -> Result<Vec<EventRow>, BackendError> {
        self.insert("events", drafts, session).await
    }

    pub async fn update_event(
        &self,
        id: &str,
        draft: &EventDraft,
        session: Option<&str>,
    ) -> Result<EventRow, BackendError> {
        let query = TableQuery::new("events").eq("id", id);
        first_or_not_found(self.update(&query, draft, session).await?, "event", id)
    }

    pub async fn delete_event(&self, id: &str, session: Option<&str>) -> Result<(), BackendError> {
        self.delete(&TableQuery::new("events").eq("id", id), session)
            .await
    }

    pub async fn list_photos(
        &self,
        published_only: bool,
        session: Option<&str>,
    ) -> Result<Vec<PhotoRow>, BackendError> {
        let mut query = TableQuery::new("photos").select(PHOTO_COLUMNS);
        if published_only {
            query = query.eq("published", true);
        }
        let query = query
            .order("order_index", Order::Asc)
            .order("created_at", Order::Asc);
        self.select(&query, session).await
    }

    pub async fn create_photo(
        &self,
        photo: &NewPhoto,
        session: Option<&str>,
    ) -> Result<PhotoRow, BackendError> {
        let rows = self.insert("photos", photo, session).await?;
        first_or_not_found(rows, "photo", &photo.path)
    }

    pub async fn update_photo(
        &self,
        id: &str,
        update: &PhotoUpdate,
        session: Option<&str>,
    ) -> Result<PhotoRow, BackendError> {
        let query = TableQuery::new("photos").eq("id", id);
        first_or_not_found(self.update(&query, update, session).await?, "photo", id)
    }

    /// Deletes the row, then its stored file. A failed file removal only logs.
    pub async fn delete_photo(&self, id: &str, session: Option<&str>) -> Result<(), BackendError> {
        let query = TableQuery::new("photos").select(PHOTO_COLUMNS).eq("id", id);
        let photo: PhotoRow = first_or_not_found(self.select(&query, session).await?, "photo", id)?;

        self.delete(&TableQuery::new("photos").eq("id", id), session)
            .await?;
        if let Err(err) = self.remove_objects(&[photo.path.clone()], session).await {
            warn!(path = %photo.path, error = %err, "failed to remove photo from storage");
        }
        Ok(())
    }

    pub async fn list_documents(
        &self,
        published_only: bool,
        session: Option<&str>,
    ) -> Result<Vec<DocumentRow>, BackendError> {
        let mut query = TableQuery::new("documents").select(DOCUMENT_COLUMNS);
        if published_only {
            query = query.eq("published", true);
        }
        self.select(&query.order("order_index", Order::Asc), session)
            .await
    }

    pub async fn create_document(
        &self,
        draft: &DocumentDraft,
        session: Option<&str>,
    ) -> Result<DocumentRow, BackendError> {
        let rows = self.insert("documents", draft, session).await?;
        first_or_not_found(rows, "document", &draft.title)
    }

    pub async fn update_document(
        &self,
        id: &str,
        draft: &DocumentDraft,
        session: Option<&str>,
    ) -> Result<DocumentRow, BackendError> {
        let query = TableQuery::new("documents").eq("id", id);
        first_or_not_found(self.update(&query, draft, session).await?, "document", id)
    }

    pub async fn delete_document(&self, id: &str, session: Option<&str>) -> Result<(), BackendError> {
        self.delete(&TableQuery::new("documents").eq("id", id), session)
            .await
    }

    pub async fn list_admins(&self, session: Option<&str>) -> Result<Vec<AdminEmail>, BackendError> {
        let query = TableQuery::new("admin_emails")
            .select("email")
            .order("email", Order::Asc);
        self.select(&query, session).await
    }
}
