//! NCBI Entrez E-utilities client.

use serde_json::Value;
use tracing::{debug, info};

use crate::config::NcbiSettings;
use crate::error::AnalyzerError;

#[derive(Debug, Clone)]
pub struct EntrezClient {
    client: reqwest::Client,
    base_url: String,
    database: String,
}

impl EntrezClient {
    pub fn new(settings: &NcbiSettings) -> Self {
        Self::with_client(reqwest::Client::new(), settings)
    }

    pub fn with_client(client: reqwest::Client, settings: &NcbiSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            database: settings.database.clone(),
        }
    }

    /// Database searched when the caller does not name one.
    pub fn default_database(&self) -> &str {
        &self.database
    }

    pub fn search_url(&self, query: &str, database: &str) -> String {
        format!(
            "{}/esearch.fcgi?db={}&term={}&retmode=json",
            self.base_url,
            urlencoding::encode(database),
            urlencoding::encode(query)
        )
    }

    /// Run an `esearch` and return the JSON document untouched.
    ///
    /// Non-2xx statuses, transport errors and non-JSON bodies all surface as
    /// [`AnalyzerError::NetworkFailure`].
    pub async fn fetch_database_record(
        &self,
        query: &str,
        database: &str,
    ) -> Result<Value, AnalyzerError> {
        let url = self.search_url(query, database);
        debug!(%url, "querying NCBI");

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let record: Value = response.json().await?;

        info!(database, "NCBI record fetched");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
    use serde_json::json;
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    async fn spawn_server(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client_for(base_url: String) -> EntrezClient {
        EntrezClient::new(&NcbiSettings {
            base_url,
            database: "protein".to_string(),
        })
    }

    #[test]
    fn test_search_url_encodes_query() {
        let client = client_for("https://example.org/eutils/".to_string());
        assert_eq!(
            client.search_url("tumor protein p53", "protein"),
            "https://example.org/eutils/esearch.fcgi?db=protein&term=tumor%20protein%20p53&retmode=json"
        );
    }

    #[tokio::test]
    async fn test_fetch_returns_document() {
        let app = Router::new().route(
            "/esearch.fcgi",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "esearchresult": {
                        "count": "1",
                        "idlist": ["42"],
                        "echo": params
                    }
                }))
            }),
        );
        let client = client_for(spawn_server(app).await);

        let record = client.fetch_database_record("EGFR", "protein").await.unwrap();

        assert_eq!(record["esearchresult"]["idlist"][0], "42");
        assert_eq!(record["esearchresult"]["echo"]["term"], "EGFR");
        assert_eq!(record["esearchresult"]["echo"]["db"], "protein");
        assert_eq!(record["esearchresult"]["echo"]["retmode"], "json");
    }

    #[tokio::test]
    async fn test_server_error_is_network_failure() {
        let app = Router::new().route(
            "/esearch.fcgi",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let client = client_for(spawn_server(app).await);

        let err = client.fetch_database_record("EGFR", "protein").await.unwrap_err();
        assert!(matches!(err, AnalyzerError::NetworkFailure(_)));
    }

    #[tokio::test]
    async fn test_non_json_body_is_network_failure() {
        let app = Router::new().route("/esearch.fcgi", get(|| async { "<html>oops</html>" }));
        let client = client_for(spawn_server(app).await);

        let err = client.fetch_database_record("EGFR", "protein").await.unwrap_err();
        assert!(matches!(err, AnalyzerError::NetworkFailure(_)));
    }
}
