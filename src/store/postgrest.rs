use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use tracing::{debug, warn};

use super::dto::PostgrestErrorBody;
use super::{RemoteStore, Row, StoreError, check_identifier, escape_like, writable_columns};
use crate::models::RecordId;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";

#[derive(Clone, Debug)]
pub struct PostgrestConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Client for a hosted PostgREST endpoint (e.g. Supabase). Authorization is
/// left entirely to the server's row-level security.
pub struct PostgrestStore {
    client: Client,
    config: PostgrestConfig,
}

impl PostgrestStore {
    pub fn new(config: PostgrestConfig) -> Result<Self, StoreError> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    fn rest_url(&self, path: &str) -> Result<Url, StoreError> {
        let base = self.config.base_url.trim_end_matches('/');
        Url::parse(&format!("{}/rest/v1/{}", base, path))
            .map_err(|e| StoreError::InvalidUrl(e.to_string()))
    }

    fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        self.rest_url(check_identifier(table)?)
    }

    fn row_url(&self, table: &str, id: RecordId) -> Result<Url, StoreError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{}", id));
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
    }

    async fn error_from(response: Response, table: &str) -> StoreError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        warn!("store error on {} ({}): {}", table, status, body);

        match serde_json::from_str::<PostgrestErrorBody>(&body) {
            Ok(parsed) => parsed.into_store_error(status, table),
            Err(_) => StoreError::Api {
                status,
                code: None,
                message: if body.is_empty() {
                    format!("store responded with HTTP {}", status)
                } else {
                    body
                },
            },
        }
    }

    async fn rows(response: Response, table: &str) -> Result<Vec<Row>, StoreError> {
        if !response.status().is_success() {
            return Err(Self::error_from(response, table).await);
        }
        Ok(response.json::<Vec<Row>>().await?)
    }

    async fn single(response: Response, table: &str) -> Result<Row, StoreError> {
        Self::rows(response, table)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound)
    }
}

/// One `col.ilike."*term*"` clause per column, OR-combined. LIKE wildcards in
/// the term are escaped first, then the whole value is quoted for PostgREST.
pub(crate) fn or_filter(columns: &[&str], term: &str) -> Result<String, StoreError> {
    let quoted = escape_like(term)
        .replace('\\', "\\\\")
        .replace('"', "\\\"");
    let clauses = columns
        .iter()
        .map(|c| Ok(format!("{}.ilike.\"*{}*\"", check_identifier(c)?, quoted)))
        .collect::<Result<Vec<_>, StoreError>>()?;
    Ok(format!("({})", clauses.join(",")))
}

#[async_trait]
impl RemoteStore for PostgrestStore {
    async fn list(&self, table: &str, order_by: &str) -> Result<Vec<Row>, StoreError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", &format!("{}.asc", check_identifier(order_by)?));

        let response = self.request(Method::GET, url).send().await?;
        Self::rows(response, table).await
    }

    async fn search(
        &self,
        table: &str,
        columns: &[&str],
        term: &str,
        order_by: &str,
    ) -> Result<Vec<Row>, StoreError> {
        if columns.is_empty() {
            return self.list(table, order_by).await;
        }

        let mut url = self.table_url(table)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("or", &or_filter(columns, term)?)
            .append_pair("order", &format!("{}.asc", check_identifier(order_by)?));

        let response = self.request(Method::GET, url).send().await?;
        Self::rows(response, table).await
    }

    async fn insert(&self, table: &str, row: &Row) -> Result<Row, StoreError> {
        let url = self.table_url(table)?;
        let response = self
            .request(Method::POST, url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&writable_columns(row))
            .send()
            .await?;

        Self::single(response, table).await.map_err(|e| match e {
            StoreError::NotFound => StoreError::Api {
                status: 200,
                code: None,
                message: "insert returned no row".to_string(),
            },
            other => other,
        })
    }

    async fn update(&self, table: &str, id: RecordId, row: &Row) -> Result<Row, StoreError> {
        let url = self.row_url(table, id)?;
        let response = self
            .request(Method::PATCH, url)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&writable_columns(row))
            .send()
            .await?;
        Self::single(response, table).await
    }

    async fn delete(&self, table: &str, id: RecordId) -> Result<(), StoreError> {
        let url = self.row_url(table, id)?;
        let response = self
            .request(Method::DELETE, url)
            .header("Prefer", RETURN_REPRESENTATION)
            .send()
            .await?;
        Self::single(response, table).await.map(|_| ())
    }

    async fn get(&self, table: &str, id: RecordId) -> Result<Row, StoreError> {
        let mut url = self.row_url(table, id)?;
        url.query_pairs_mut().append_pair("select", "*");

        let response = self
            .request(Method::GET, url)
            .header("Accept", SINGLE_OBJECT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, table).await);
        }
        Ok(response.json::<Row>().await?)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let url = self.rest_url("")?;
        let response = self.request(Method::GET, url).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response, "health").await);
        }
        Ok(())
    }
}
