//! Open Library HTTP client.
//!
//! Three endpoints are used:
//! - `/subjects/{subject}.json?limit=N` for the base listing
//! - `/search.json?q=TITLE` for per-work details (rating)
//! - `/search/authors.json?q=NAME` for per-author details
//!
//! The [`CatalogSource`] trait is the seam the aggregator talks to, so it
//! can be driven by an in-memory source in tests.

use crate::catalog::error::LookupError;
use crate::models::{CatalogItem, NOT_AVAILABLE, UNKNOWN_OWNER};
use async_trait::async_trait;
use reqwest::{header, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Connection settings for [`OpenLibraryClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openlibrary.org".to_string(),
            timeout_seconds: 30,
            user_agent: concat!("bookboard/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Whether `subject` can be used as a subject key.
///
/// Keys are a single path segment: non-blank and free of `/`.
pub fn is_valid_subject(subject: &str) -> bool {
    !subject.trim().is_empty() && !subject.contains('/')
}

/// Source of catalog data.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch up to `limit` works listed under `subject`.
    async fn subject_works(
        &self,
        subject: &str,
        limit: usize,
    ) -> Result<Vec<CatalogItem>, LookupError>;

    /// Search works by free-text title; candidates in response order.
    async fn search_works(&self, title: &str) -> Result<Vec<WorkDoc>, LookupError>;

    /// Search authors by free-text name; candidates in response order.
    async fn search_authors(&self, name: &str) -> Result<Vec<AuthorDoc>, LookupError>;
}

/// Subject listing response.
#[derive(Debug, Deserialize)]
struct SubjectResponse {
    #[serde(default)]
    works: Vec<SubjectWork>,
}

#[derive(Debug, Deserialize)]
struct SubjectWork {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    authors: Option<Vec<AuthorRef>>,
    #[serde(default)]
    first_publish_year: Option<i32>,
    #[serde(default)]
    subject: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct AuthorRef {
    #[serde(default)]
    name: Option<String>,
}

impl From<SubjectWork> for CatalogItem {
    fn from(work: SubjectWork) -> Self {
        let title = work
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let primary_owner_name = work
            .authors
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|a| a.name)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_OWNER.to_string());

        CatalogItem {
            title,
            primary_owner_name,
            first_publish_year: work.first_publish_year,
            subject_tags: work.subject.unwrap_or_default(),
        }
    }
}

/// Search response shared by the work and author endpoints.
#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    #[serde(default = "Vec::new")]
    docs: Vec<T>,
}

/// Candidate document from the work search.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WorkDoc {
    #[serde(default)]
    pub ratings_average: Option<f64>,
}

/// Candidate document from the author search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthorDoc {
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub top_work: Option<String>,
}

/// Client for the public Open Library API.
pub struct OpenLibraryClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl OpenLibraryClient {
    /// Create a new client.
    pub fn new(config: ClientConfig) -> Result<Self, LookupError> {
        let mut headers = header::HeaderMap::new();
        let agent = header::HeaderValue::from_str(&config.user_agent)
            .map_err(|e| LookupError::Network(format!("Invalid user agent: {}", e)))?;
        headers.insert(header::USER_AGENT, agent);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()
            .map_err(|e| LookupError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Build an endpoint URL under the base URL.
    ///
    /// Each segment is percent-encoded, so a segment can never add path
    /// components of its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, LookupError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| LookupError::InvalidRequest(format!("Invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                LookupError::InvalidRequest(format!(
                    "Base URL cannot have a path: {}",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET a JSON document and decode it.
    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, LookupError> {
        let url = self.endpoint(segments)?;
        debug!(url = %url, ?query, "GET");

        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    LookupError::Connect(self.config.base_url.clone())
                } else {
                    LookupError::Network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Status { status, body });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| LookupError::Parse(e.to_string()))
    }
}

#[async_trait]
impl CatalogSource for OpenLibraryClient {
    async fn subject_works(
        &self,
        subject: &str,
        limit: usize,
    ) -> Result<Vec<CatalogItem>, LookupError> {
        if !is_valid_subject(subject) {
            return Err(LookupError::InvalidRequest(format!(
                "Invalid subject key: '{}'",
                subject
            )));
        }

        let file = format!("{}.json", subject);
        let response: SubjectResponse = self
            .get_json(&["subjects", &file], &[("limit", limit.to_string())])
            .await?;
        Ok(parse_works(response))
    }

    async fn search_works(&self, title: &str) -> Result<Vec<WorkDoc>, LookupError> {
        let response: SearchResponse<WorkDoc> = self
            .get_json(&["search.json"], &[("q", title.to_string())])
            .await?;
        Ok(response.docs)
    }

    async fn search_authors(&self, name: &str) -> Result<Vec<AuthorDoc>, LookupError> {
        let response: SearchResponse<AuthorDoc> = self
            .get_json(&["search", "authors.json"], &[("q", name.to_string())])
            .await?;
        Ok(response.docs)
    }
}

fn parse_works(response: SubjectResponse) -> Vec<CatalogItem> {
    response.works.into_iter().map(CatalogItem::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subject_listing() {
        let json = r#"{
            "key": "/subjects/science_fiction",
            "name": "science_fiction",
            "work_count": 2,
            "works": [
                {
                    "title": "Frankenstein",
                    "authors": [{"key": "/authors/OL25342A", "name": "Mary Shelley"}],
                    "first_publish_year": 1818,
                    "subject": ["Horror", "Science fiction"]
                },
                {
                    "title": "Anonymous Tales",
                    "authors": [],
                    "first_publish_year": null
                }
            ]
        }"#;

        let response: SubjectResponse = serde_json::from_str(json).unwrap();
        let items = parse_works(response);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Frankenstein");
        assert_eq!(items[0].primary_owner_name, "Mary Shelley");
        assert_eq!(items[0].first_publish_year, Some(1818));
        assert_eq!(items[0].subject_tags, vec!["Horror", "Science fiction"]);

        assert_eq!(items[1].primary_owner_name, UNKNOWN_OWNER);
        assert_eq!(items[1].first_publish_year, None);
        assert!(items[1].subject_tags.is_empty());
    }

    #[test]
    fn test_parse_listing_without_works() {
        let response: SubjectResponse = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert!(parse_works(response).is_empty());
    }

    #[test]
    fn test_parse_work_search() {
        let json = r#"{"numFound": 2, "docs": [
            {"title": "Dune", "ratings_average": 4.2},
            {"title": "Dune Messiah"}
        ]}"#;
        let response: SearchResponse<WorkDoc> = serde_json::from_str(json).unwrap();
        assert_eq!(response.docs.len(), 2);
        assert_eq!(response.docs[0].ratings_average, Some(4.2));
        assert_eq!(response.docs[1].ratings_average, None);
    }

    #[test]
    fn test_parse_author_search() {
        let json = r#"{"docs": [
            {"name": "Frank Herbert", "birth_date": "8 October 1920", "top_work": "Dune"},
            {"name": "Frank Herbert Jr."}
        ]}"#;
        let response: SearchResponse<AuthorDoc> = serde_json::from_str(json).unwrap();
        assert_eq!(response.docs[0].birth_date.as_deref(), Some("8 October 1920"));
        assert_eq!(response.docs[0].top_work.as_deref(), Some("Dune"));
        assert_eq!(response.docs[1], AuthorDoc::default());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = OpenLibraryClient::new(ClientConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.endpoint(&["search.json"]).unwrap().as_str(),
            "http://localhost:8080/search.json"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = OpenLibraryClient::new(ClientConfig {
            base_url: "http://localhost:8080/mirror".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.endpoint(&["search", "authors.json"]).unwrap().path(),
            "/mirror/search/authors.json"
        );
    }

    #[test]
    fn test_subject_segment_is_encoded() {
        let client = OpenLibraryClient::new(ClientConfig::default()).unwrap();
        let url = client.endpoint(&["subjects", "../search.json"]).unwrap();
        assert_eq!(url.path(), "/subjects/..%2Fsearch.json");

        let url = client.endpoint(&["subjects", "sci fi?.json"]).unwrap();
        assert_eq!(url.path(), "/subjects/sci%20fi%3F.json");
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_subject_key_validation() {
        assert!(is_valid_subject("science_fiction"));
        assert!(is_valid_subject("place:london"));
        assert!(!is_valid_subject(""));
        assert!(!is_valid_subject("   "));
        assert!(!is_valid_subject("../search"));
    }

    #[tokio::test]
    async fn test_invalid_subject_is_rejected_before_request() {
        let client = OpenLibraryClient::new(ClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2,
            ..ClientConfig::default()
        })
        .unwrap();

        let result = client.subject_works("../search", 5).await;
        assert!(matches!(result, Err(LookupError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_a_lookup_error() {
        let client = OpenLibraryClient::new(ClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 2,
            ..ClientConfig::default()
        })
        .unwrap();

        let result = client.search_works("Dune").await;
        assert!(result.is_err());
    }
}
