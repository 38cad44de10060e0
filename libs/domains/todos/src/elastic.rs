//! Elasticsearch-compatible implementation of SearchIndex.
//!
//! Talks plain HTTP to the configured cluster: documents are written with
//! `PUT {index}/_doc/{id}`, removed with `DELETE`, and queried through
//! `_search` with the configured query template.

use async_trait::async_trait;
use core_config::search::SearchConfig;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{TodoError, TodoResult};
use crate::index::{IndexDoc, SearchIndex};

/// Search index backed by an Elasticsearch-compatible HTTP API
#[derive(Clone)]
pub struct ElasticIndex {
    client: Client,
    config: SearchConfig,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_id")]
    id: String,
}

impl ElasticIndex {
    /// Create a new ElasticIndex with the request timeout from config
    pub fn new(config: SearchConfig) -> TodoResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TodoError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn doc_url(&self, id: Uuid) -> String {
        format!(
            "{}/{}/_doc/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.index,
            id
        )
    }

    fn search_url(&self) -> String {
        format!(
            "{}/{}/_search",
            self.config.endpoint.trim_end_matches('/'),
            self.config.index
        )
    }

    /// Check that the cluster answers at all. Used by the readiness probe.
    pub async fn ping(&self) -> TodoResult<()> {
        let response = self
            .client
            .get(self.config.endpoint.trim_end_matches('/'))
            .send()
            .await
            .map_err(|e| TodoError::Indexing(format!("Search cluster unreachable: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(TodoError::Indexing(format!(
                "Search cluster returned status {}",
                response.status()
            )))
        }
    }
}

/// Escape caller input as a JSON string literal (without the surrounding
/// quotes) so it can be spliced into the query template safely.
fn sanitize(input: &str) -> String {
    let quoted = serde_json::to_string(input).unwrap_or_default();
    if quoted.len() >= 2 {
        quoted[1..quoted.len() - 1].to_string()
    } else {
        String::new()
    }
}

/// Substitute the caller's query string into the template.
///
/// The template carries a single `{QUERY_STRING}` marker; the input is
/// JSON-escaped first so it cannot break out of the string literal.
fn render_query(template: &str, input: &str) -> String {
    template.replace("{QUERY_STRING}", &sanitize(input))
}

#[async_trait]
impl SearchIndex for ElasticIndex {
    #[instrument(skip(self, doc))]
    async fn put(&self, id: Uuid, doc: &IndexDoc) -> TodoResult<()> {
        let response = self
            .client
            .put(self.doc_url(id))
            .json(doc)
            .send()
            .await
            .map_err(|e| TodoError::Indexing(format!("Index write failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!("Index document written");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(TodoError::Indexing(format!(
                "Index write returned status {}: {}",
                status, body
            )))
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> TodoResult<()> {
        let response = self
            .client
            .delete(self.doc_url(id))
            .send()
            .await
            .map_err(|e| TodoError::Indexing(format!("Index delete failed: {}", e)))?;

        let status = response.status();
        // A document that was never indexed is fine to "delete"
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(TodoError::Indexing(format!(
                "Index delete returned status {}: {}",
                status, body
            )))
        }
    }

    #[instrument(skip(self))]
    async fn query(&self, query: &str) -> TodoResult<Vec<Uuid>> {
        let body = render_query(&self.config.query_template, query);

        let response = self
            .client
            .post(self.search_url())
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| TodoError::Indexing(format!("Search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            // The index rejecting a query (e.g. unparsable syntax) means
            // "no matches", not a failure
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "Search query rejected by index: {}", detail);
            return Ok(Vec::new());
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| TodoError::Indexing(format!("Malformed search response: {}", e)))?;

        let ids = parsed
            .hits
            .hits
            .into_iter()
            .filter_map(|hit| match Uuid::parse_str(&hit.id) {
                Ok(id) => Some(id),
                Err(_) => {
                    tracing::warn!(hit_id = %hit.id, "Skipping hit with non-UUID id");
                    None
                }
            })
            .collect();

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::search::DEFAULT_QUERY_TEMPLATE;

    #[test]
    fn test_sanitize_plain_input() {
        assert_eq!(sanitize("groceries"), "groceries");
    }

    #[test]
    fn test_sanitize_escapes_quotes_and_backslashes() {
        assert_eq!(sanitize(r#"a"b"#), r#"a\"b"#);
        assert_eq!(sanitize(r"a\b"), r"a\\b");
    }

    #[test]
    fn test_render_query_substitutes_marker() {
        let rendered = render_query(DEFAULT_QUERY_TEMPLATE, "milk");
        assert!(rendered.contains(r#""query":"milk""#));
        assert!(!rendered.contains("{QUERY_STRING}"));
    }

    #[test]
    fn test_render_query_stays_valid_json_with_hostile_input() {
        let rendered = render_query(DEFAULT_QUERY_TEMPLATE, r#""},"malicious":{"x":""#);
        let parsed: Result<serde_json::Value, _> = serde_json::from_str(&rendered);
        assert!(parsed.is_ok());
        // The hostile input is confined to the query string literal
        assert!(parsed.unwrap().get("malicious").is_none());
    }

    #[tokio::test]
    async fn test_query_rejected_by_index_means_no_matches() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Answer one request with the 400 a real cluster returns for
        // unparsable query syntax
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let body = r#"{"error":{"type":"parse_exception"}}"#;
            let response = format!(
                "HTTP/1.1 400 Bad Request\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        let index = ElasticIndex::new(SearchConfig::new(
            format!("http://{}", addr),
            "todo-items".to_string(),
        ))
        .unwrap();

        let ids = index.query("((unbalanced").await.unwrap();
        assert!(ids.is_empty());

        server.await.unwrap();
    }

    #[test]
    fn test_doc_url_layout() {
        let index = ElasticIndex::new(SearchConfig::new(
            "http://localhost:9200/".to_string(),
            "todo-items".to_string(),
        ))
        .unwrap();
        let id = Uuid::nil();
        assert_eq!(
            index.doc_url(id),
            format!("http://localhost:9200/todo-items/_doc/{}", id)
        );
        assert_eq!(
            index.search_url(),
            "http://localhost:9200/todo-items/_search"
        );
    }
}
