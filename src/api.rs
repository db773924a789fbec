// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire envelopes of the search API and the internal result model.
//!
//! JSON from the backend is decoded into the tagged envelope types here and
//! converted once into [`SearchResults`] / [`DocDetail`]; nothing past this
//! module sees the raw shapes.

use serde::{Deserialize, Serialize};

use crate::filters::{FacetBucket, FacetKind, Facets};

/// `{ "raw": "..." }` wrapper the backend puts around every hit field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawField {
    #[serde(default)]
    pub raw: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireBuckets {
    #[serde(default)]
    pub buckets: Vec<FacetBucket>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireContent {
    #[serde(default)]
    pub snippet: Option<Vec<String>>,
}

// Code search

/// `GET /api/search?q=...` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CodeSearchResponse {
    pub hits: CodeHits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodeHits {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub facets: CodeFacets,
    #[serde(default)]
    pub hits: Option<Vec<WireCodeHit>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodeFacets {
    #[serde(default)]
    pub repo: WireBuckets,
    #[serde(default)]
    pub path: WireBuckets,
    #[serde(default)]
    pub lang: WireBuckets,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireCodeHit {
    #[serde(default)]
    pub repo: RawField,
    #[serde(default)]
    pub branch: RawField,
    #[serde(default)]
    pub file_id: RawField,
    #[serde(default)]
    pub owner_id: RawField,
    #[serde(default)]
    pub content: WireContent,
}

// Document search

/// `GET /api/search?q=...&tbm=docs` response.
#[derive(Debug, Clone, Deserialize)]
pub struct DocSearchResponse {
    pub docs: DocHits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocHits {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub facets: DocFacets,
    #[serde(default)]
    pub hits: Option<Vec<WireDocHit>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocFacets {
    #[serde(default)]
    pub document: WireBuckets,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireDocHit {
    #[serde(default)]
    pub id: RawField,
    #[serde(default)]
    pub title: RawField,
    #[serde(default)]
    pub file_name: RawField,
    #[serde(default)]
    pub document: RawField,
    #[serde(default)]
    pub link: Option<RawField>,
    #[serde(default)]
    pub content: WireContent,
}

/// `GET /api/search?tbm=docs&id=...` response (a bare document object).
#[derive(Debug, Clone, Deserialize)]
pub struct DocDetailResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub document: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub content: Vec<String>,
}

/// `{ "error": "..." }` body sent with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// Internal model

/// One decoded search response, code or documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub total: u64,
    pub facets: Facets,
    pub hits: Vec<Hit>,
}

impl SearchResults {
    /// A `null` or empty hit list counts as "not found".
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Hit {
    Code(CodeHit),
    Doc(DocHit),
}

impl Hit {
    pub fn snippets(&self) -> Option<&[String]> {
        match self {
            Hit::Code(hit) => hit.snippets.as_deref(),
            Hit::Doc(hit) => hit.snippets.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CodeHit {
    pub repo: String,
    pub branch: String,
    /// `host/owner/repo/path/to/file`
    pub file_id: String,
    pub owner_id: String,
    pub snippets: Option<Vec<String>>,
}

impl CodeHit {
    /// Git host, the first segment of `file_id`.
    pub fn git_host(&self) -> &str {
        self.file_id.split('/').next().unwrap_or_default()
    }

    /// File path inside the repository.
    pub fn file_path(&self) -> String {
        let skip = 1 + self.repo.split('/').filter(|s| !s.is_empty()).count();
        self.file_id
            .split('/')
            .skip(skip)
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn repo_url(&self) -> String {
        format!("https://{}/{}", self.git_host(), self.repo)
    }

    pub fn file_url(&self) -> String {
        format!(
            "https://{}/{}/blob/{}/{}",
            self.git_host(),
            self.repo,
            self.branch,
            self.file_path()
        )
    }

    /// GitHub avatar of the repository owner; other hosts have none.
    pub fn avatar_url(&self) -> Option<String> {
        if self.git_host() == "github.com" && !self.owner_id.is_empty() {
            Some(format!(
                "https://avatars.githubusercontent.com/u/{}?s=60&v=4",
                self.owner_id
            ))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocHit {
    pub id: String,
    pub title: String,
    pub file_name: String,
    pub document: String,
    pub link: Option<String>,
    pub snippets: Option<Vec<String>>,
}

/// Full document shown by the detail view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocDetail {
    pub id: String,
    pub title: String,
    pub file_name: String,
    pub document: String,
    pub link: Option<String>,
    pub content: Vec<String>,
}

impl DocDetail {
    pub fn full_text(&self) -> String {
        self.content.join("\n")
    }
}

fn non_empty(value: Option<RawField>) -> Option<String> {
    value.map(|f| f.raw).filter(|raw| !raw.is_empty())
}

impl From<CodeSearchResponse> for SearchResults {
    fn from(response: CodeSearchResponse) -> Self {
        let CodeHits {
            total,
            facets,
            hits,
        } = response.hits;
        let facets = Facets::new()
            .with(FacetKind::Repo, facets.repo.buckets)
            .with(FacetKind::Path, facets.path.buckets)
            .with(FacetKind::Lang, facets.lang.buckets);
        let hits = hits
            .unwrap_or_default()
            .into_iter()
            .map(|hit| {
                Hit::Code(CodeHit {
                    repo: hit.repo.raw,
                    branch: hit.branch.raw,
                    file_id: hit.file_id.raw,
                    owner_id: hit.owner_id.raw,
                    snippets: hit.content.snippet,
                })
            })
            .collect();
        Self {
            total,
            facets,
            hits,
        }
    }
}

impl From<DocSearchResponse> for SearchResults {
    fn from(response: DocSearchResponse) -> Self {
        let DocHits {
            total,
            facets,
            hits,
        } = response.docs;
        let facets = Facets::new().with(FacetKind::Document, facets.document.buckets);
        let hits = hits
            .unwrap_or_default()
            .into_iter()
            .map(|hit| {
                Hit::Doc(DocHit {
                    id: hit.id.raw,
                    title: hit.title.raw,
                    file_name: hit.file_name.raw,
                    document: hit.document.raw,
                    link: non_empty(hit.link),
                    snippets: hit.content.snippet,
                })
            })
            .collect();
        Self {
            total,
            facets,
            hits,
        }
    }
}

impl From<DocDetailResponse> for DocDetail {
    fn from(response: DocDetailResponse) -> Self {
        Self {
            id: response.id,
            title: response.title,
            file_name: response.file_name,
            document: response.document,
            link: response.link.filter(|link| !link.is_empty()),
            content: response.content,
        }
    }
}
