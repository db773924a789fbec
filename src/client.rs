// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP transport to the heline search API.

use async_trait::async_trait;
use std::time::Duration;

use crate::api::{
    CodeSearchResponse, DocDetail, DocDetailResponse, DocSearchResponse, ErrorBody, SearchResults,
};
use crate::errors::ClientError;
use crate::filters::FilterState;
use crate::location::{SearchParams, Tab};

/// Path of the single search endpoint.
pub const SEARCH_ENDPOINT: &str = "/api/search";

/// Operations the session needs from a search service.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search_code(
        &self,
        query: &str,
        filter: &FilterState,
    ) -> Result<SearchResults, ClientError>;

    async fn search_docs(&self, query: &str) -> Result<SearchResults, ClientError>;

    async fn document(&self, id: &str) -> Result<DocDetail, ClientError>;
}

/// One outgoing call, built by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Code { query: String, filter: FilterState },
    Docs { query: String },
    Document { id: String },
}

impl Request {
    /// Query string sent to [`SEARCH_ENDPOINT`].
    pub fn to_query_string(&self) -> String {
        match self {
            Request::Code { query, filter } => SearchParams {
                query: query.clone(),
                filter: filter.clone(),
                ..SearchParams::default()
            }
            .to_query_string(),
            Request::Docs { query } => SearchParams {
                query: query.clone(),
                tab: Tab::Docs,
                ..SearchParams::default()
            }
            .to_query_string(),
            Request::Document { id } => {
                format!("tbm=docs&id={}", urlencoding::encode(id))
            }
        }
    }

    pub fn is_search(&self) -> bool {
        !matches!(self, Request::Document { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Results(SearchResults),
    Document(DocDetail),
}

/// Run `request` against `backend`.
pub async fn execute<B>(backend: &B, request: &Request) -> Result<Response, ClientError>
where
    B: SearchBackend + ?Sized,
{
    match request {
        Request::Code { query, filter } => backend
            .search_code(query, filter)
            .await
            .map(Response::Results),
        Request::Docs { query } => backend.search_docs(query).await.map(Response::Results),
        Request::Document { id } => backend.document(id).await.map(Response::Document),
    }
}

/// reqwest-backed [`SearchBackend`].
#[derive(Clone, Debug)]
pub struct HttpSearchClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSearchClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let parsed = reqwest::Url::parse(&base_url).map_err(|e| ClientError::InvalidUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl {
                url: base_url,
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("heline/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn search_url(&self, query_string: &str) -> String {
        format!("{}{}?{}", self.base_url, SEARCH_ENDPOINT, query_string)
    }

    async fn fetch(&self, request: &Request) -> Result<String, ClientError> {
        let url = self.search_url(&request.to_query_string());
        tracing::debug!(%url, "GET");
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| body.trim().to_string());
            if status == reqwest::StatusCode::NOT_FOUND {
                if let Request::Document { id } = request {
                    return Err(ClientError::DocumentNotFound(id.clone()));
                }
            }
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl SearchBackend for HttpSearchClient {
    async fn search_code(
        &self,
        query: &str,
        filter: &FilterState,
    ) -> Result<SearchResults, ClientError> {
        let request = Request::Code {
            query: query.to_string(),
            filter: filter.clone(),
        };
        let body = self.fetch(&request).await?;
        let response: CodeSearchResponse = serde_json::from_str(&body)?;
        Ok(response.into())
    }

    async fn search_docs(&self, query: &str) -> Result<SearchResults, ClientError> {
        let request = Request::Docs {
            query: query.to_string(),
        };
        let body = self.fetch(&request).await?;
        let response: DocSearchResponse = serde_json::from_str(&body)?;
        Ok(response.into())
    }

    async fn document(&self, id: &str) -> Result<DocDetail, ClientError> {
        let request = Request::Document { id: id.to_string() };
        let body = self.fetch(&request).await?;
        let response: Option<DocDetailResponse> = serde_json::from_str(&body)?;
        response
            .map(DocDetail::from)
            .ok_or_else(|| ClientError::DocumentNotFound(id.to_string()))
    }
}
