use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{BackendError, SupabaseClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn as_str(&self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

/// PostgREST request description: table, projection, equality filters and ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    table: String,
    columns: Option<String>,
    filters: Vec<(String, String)>,
    order: Vec<(String, Order)>,
}

impl TableQuery {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: None,
            filters: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn select(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_string());
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    pub fn order(mut self, column: &str, direction: Order) -> Self {
        self.order.push((column.to_string(), direction));
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Appends the query string PostgREST expects to `url`.
    pub fn apply(&self, url: &mut Url) {
        if self.columns.is_none() && self.filters.is_empty() && self.order.is_empty() {
            return;
        }
        let mut pairs = url.query_pairs_mut();
        if let Some(columns) = &self.columns {
            pairs.append_pair("select", columns);
        }
        for (column, filter) in &self.filters {
            pairs.append_pair(column, filter);
        }
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|(column, dir)| format!("{column}.{}", dir.as_str()))
                .collect::<Vec<_>>()
                .join(",");
            pairs.append_pair("order", &order);
        }
    }
}

const RETURN_REPRESENTATION: &str = "return=representation";

impl SupabaseClient {
    fn table_url(&self, query: &TableQuery) -> Result<Url, BackendError> {
        let mut url = self.endpoint(&format!("rest/v1/{}", query.table()))?;
        query.apply(&mut url);
        Ok(url)
    }

    pub async fn select<T: DeserializeOwned>(
        &self,
        query: &TableQuery,
        session: Option<&str>,
    ) -> Result<Vec<T>, BackendError> {
        let url = self.table_url(query)?;
        debug!(table = query.table(), "select");
        let request = self.authorize(self.http().get(url), session);
        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Inserts one row (an object) or many (an array) and returns what was stored.
    pub async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
        session: Option<&str>,
    ) -> Result<Vec<T>, BackendError> {
        let url = self.table_url(&TableQuery::new(table))?;
        debug!(table, "insert");
        let request = self
            .authorize(self.http().post(url), session)
            .header("prefer", RETURN_REPRESENTATION)
            .json(body);
        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Updates the rows matching `query`; an empty result means nothing matched.
    pub async fn update<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        query: &TableQuery,
        body: &B,
        session: Option<&str>,
    ) -> Result<Vec<T>, BackendError> {
        let url = self.table_url(query)?;
        debug!(table = query.table(), "update");
        let request = self
            .authorize(self.http().patch(url), session)
            .header("prefer", RETURN_REPRESENTATION)
            .json(body);
        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn delete(&self, query: &TableQuery, session: Option<&str>) -> Result<(), BackendError> {
        let url = self.table_url(query)?;
        debug!(table = query.table(), "delete");
        let request = self.authorize(self.http().delete(url), session);
        Self::check(request.send().await?).await?;
        Ok(())
    }
}
