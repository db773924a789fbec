// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search page state machine.
//!
//! [`SearchSession`] performs no IO. Every user action returns the
//! [`Request`] to send (if any); the caller registers it with
//! [`SearchSession::begin`] and feeds the outcome back through
//! [`SearchSession::complete`]. Requests are numbered in issue order and a
//! response older than the last one applied to the same target is dropped.

use serde::Serialize;

use crate::api::{DocDetail, SearchResults};
use crate::client::{Request, Response};
use crate::errors::{ClientError, SessionError};
use crate::filters::{FacetBucket, FacetKind, FilterState, Toggle};
use crate::location::{SearchParams, Tab};

/// What a dispatched request will fill in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Code,
    Docs,
    Document,
}

impl Target {
    fn of(request: &Request) -> Self {
        match request {
            Request::Code { .. } => Target::Code,
            Request::Docs { .. } => Target::Docs,
            Request::Document { .. } => Target::Document,
        }
    }

    fn slot(self) -> usize {
        match self {
            Target::Code => 0,
            Target::Docs => 1,
            Target::Document => 2,
        }
    }
}

/// Handle for one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub seq: u64,
    pub target: Target,
}

/// Result of [`SearchSession::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

/// Immutable view of the session handed to renderers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub query: String,
    pub tab: Tab,
    pub filter: FilterState,
    /// Results of the active tab
    pub results: Option<SearchResults>,
    pub document: Option<DocDetail>,
    pub loading: bool,
    pub not_found: bool,
    pub location: Option<String>,
    pub notice: Option<String>,
    /// The last failure never reached the API
    pub unreachable: bool,
}

#[derive(Debug, Default)]
pub struct SearchSession {
    query: String,
    tab: Tab,
    filter: FilterState,
    code: Option<SearchResults>,
    docs: Option<SearchResults>,
    document: Option<DocDetail>,
    in_flight: usize,
    not_found: bool,
    issued_seq: u64,
    /// Last applied sequence number, per [`Target`]
    applied_seq: [u64; 3],
    location: Option<String>,
    notice: Option<String>,
    unreachable: bool,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn tab(&self) -> &Tab {
        &self.tab
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Results cached for `tab`.
    pub fn results(&self, tab: &Tab) -> Option<&SearchResults> {
        match tab {
            Tab::Code => self.code.as_ref(),
            Tab::Docs => self.docs.as_ref(),
            Tab::ComingSoon(_) => None,
        }
    }

    /// Initial load from a location.
    ///
    /// `tbm=docs&id=...` opens a document. Otherwise the location seeds the
    /// query, tab and filters when it carries `q` and the tab has no results
    /// yet.
    pub fn load(&mut self, params: SearchParams) -> Option<Request> {
        if let Some(id) = params.id.filter(|_| params.tab == Tab::Docs) {
            self.tab = Tab::Docs;
            return Some(Request::Document { id });
        }
        if params.query.trim().is_empty() || self.results(&params.tab).is_some() {
            self.tab = params.tab;
            return None;
        }
        self.query = params.query;
        self.tab = params.tab;
        self.filter = params.filter;
        if !self.tab.has_backend() {
            self.location = Some(self.params().to_location());
        }
        self.search_request()
    }

    /// Record an edit of the query text. The request comes later from
    /// [`Self::debounced_request`].
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
    }

    /// Request for the query once the debounce period elapsed.
    pub fn debounced_request(&self) -> Option<Request> {
        self.search_request()
    }

    /// Re-issue the current query and filters, even when unchanged.
    pub fn submit(&self) -> Option<Request> {
        self.search_request()
    }

    /// Toggle the `index`-th bucket (0-based) of `kind` in the current results.
    pub fn toggle_bucket(
        &mut self,
        kind: FacetKind,
        index: usize,
    ) -> Result<Option<Request>, SessionError> {
        if !kind.is_filterable() {
            return Err(SessionError::NotFilterable(kind));
        }
        let buckets = self.facet_buckets(kind)?;
        let value = buckets
            .get(index)
            .map(|bucket| bucket.val.clone())
            .ok_or(SessionError::BucketOutOfRange {
                kind,
                index,
                len: buckets.len(),
            })?;
        self.apply_toggle(kind, &value)
    }

    /// Toggle `value` of `kind`. The value must be a bucket of the current
    /// results or already selected.
    pub fn toggle_value(
        &mut self,
        kind: FacetKind,
        value: &str,
    ) -> Result<Option<Request>, SessionError> {
        if !kind.is_filterable() {
            return Err(SessionError::NotFilterable(kind));
        }
        if !self.filter.contains(kind, value) {
            let buckets = self.facet_buckets(kind)?;
            if !buckets.iter().any(|bucket| bucket.val == value) {
                return Err(SessionError::UnknownFacetValue {
                    kind,
                    value: value.to_string(),
                });
            }
        }
        self.apply_toggle(kind, value)
    }

    fn apply_toggle(
        &mut self,
        kind: FacetKind,
        value: &str,
    ) -> Result<Option<Request>, SessionError> {
        let outcome = self.filter.toggle(kind, value)?;
        tracing::debug!(%kind, value, added = outcome == Toggle::Added, "filter toggled");
        Ok(self.search_request())
    }

    fn facet_buckets(&self, kind: FacetKind) -> Result<&[FacetBucket], SessionError> {
        let buckets = self
            .results(&self.tab)
            .map(|results| results.facets.buckets(kind))
            .unwrap_or_default();
        if buckets.is_empty() {
            return Err(SessionError::NoFacetData(kind));
        }
        Ok(buckets)
    }

    /// Switch the result-type tab. Fetches only when the tab has a backend and
    /// nothing cached; otherwise just re-routes.
    pub fn select_tab(&mut self, tab: Tab) -> Option<Request> {
        self.tab = tab;
        self.document = None;
        self.not_found = false;
        if self.tab.has_backend() && self.results(&self.tab).is_none() {
            if let Some(request) = self.search_request() {
                return Some(request);
            }
        }
        self.location = Some(self.params().to_location());
        None
    }

    pub fn open_document(&mut self, id: impl Into<String>) -> Request {
        self.tab = Tab::Docs;
        Request::Document { id: id.into() }
    }

    /// Register a dispatched request. Searches push their location.
    pub fn begin(&mut self, request: &Request) -> Ticket {
        self.issued_seq += 1;
        self.in_flight += 1;
        if request.is_search() {
            self.location = Some(self.params().to_location());
        }
        tracing::debug!(seq = self.issued_seq, query = %request.to_query_string(), "request issued");
        Ticket {
            seq: self.issued_seq,
            target: Target::of(request),
        }
    }

    /// Apply the outcome of a request unless a newer one was applied first.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        result: Result<Response, ClientError>,
    ) -> Completion {
        self.in_flight = self.in_flight.saturating_sub(1);
        let applied = &mut self.applied_seq[ticket.target.slot()];
        if ticket.seq <= *applied {
            tracing::debug!(
                seq = ticket.seq,
                applied = *applied,
                "discarding stale response"
            );
            return Completion::Stale;
        }
        *applied = ticket.seq;

        match result {
            Ok(Response::Results(results)) if results.is_empty() => {
                tracing::info!(seq = ticket.seq, "no hits");
                self.fail(ticket.target, None, false);
            }
            Ok(Response::Results(results)) => {
                tracing::debug!(seq = ticket.seq, total = results.total, "results applied");
                self.clear_failure();
                match ticket.target {
                    Target::Docs => self.docs = Some(results),
                    _ => self.code = Some(results),
                }
            }
            Ok(Response::Document(detail)) => {
                self.clear_failure();
                self.document = Some(detail);
            }
            Err(err) => {
                tracing::warn!(seq = ticket.seq, error = %err, "search request failed");
                let unreachable = matches!(err, ClientError::Transport(_));
                self.fail(ticket.target, Some(err.to_string()), unreachable);
            }
        }
        Completion::Applied
    }

    fn fail(&mut self, target: Target, notice: Option<String>, unreachable: bool) {
        self.not_found = true;
        self.notice = notice;
        self.unreachable = unreachable;
        match target {
            Target::Code => self.code = None,
            Target::Docs => self.docs = None,
            Target::Document => self.document = None,
        }
    }

    fn clear_failure(&mut self) {
        self.not_found = false;
        self.notice = None;
        self.unreachable = false;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            query: self.query.clone(),
            tab: self.tab.clone(),
            filter: self.filter.clone(),
            results: self.results(&self.tab).cloned(),
            document: self.document.clone(),
            loading: self.is_loading(),
            not_found: self.not_found,
            location: self.location.clone(),
            notice: self.notice.clone(),
            unreachable: self.unreachable,
        }
    }

    fn params(&self) -> SearchParams {
        SearchParams {
            query: self.query.clone(),
            tab: self.tab.clone(),
            filter: self.filter.clone(),
            id: None,
        }
    }

    /// The query is sent as typed, matching what [`Self::params`] puts in the
    /// location.
    fn search_request(&self) -> Option<Request> {
        if self.query.trim().is_empty() {
            return None;
        }
        match &self.tab {
            Tab::Code => Some(Request::Code {
                query: self.query.clone(),
                filter: self.filter.clone(),
            }),
            Tab::Docs => Some(Request::Docs {
                query: self.query.clone(),
            }),
            Tab::ComingSoon(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CodeHit, Hit};
    use crate::filters::Facets;

    fn code_results(repos: &[&str]) -> SearchResults {
        SearchResults {
            total: repos.len() as u64,
            facets: Facets::new().with(
                FacetKind::Repo,
                repos.iter().map(|r| FacetBucket::new(*r, 1)).collect(),
            ),
            hits: vec![Hit::Code(CodeHit {
                repo: "a".to_string(),
                branch: "main".to_string(),
                file_id: "github.com/o/a/x.rs".to_string(),
                owner_id: "1".to_string(),
                snippets: Some(vec!["<mark>x</mark>".to_string()]),
            })],
        }
    }

    fn run(session: &mut SearchSession, request: &Request, response: SearchResults) -> Completion {
        let ticket = session.begin(request);
        session.complete(ticket, Ok(Response::Results(response)))
    }

    #[test]
    fn load_seeds_query_and_filters() {
        let mut session = SearchSession::new();
        let request = session
            .load(SearchParams::parse("search?q=rea&filter[lang]=Rust,Go"))
            .expect("initial search");
        assert_eq!(request.to_query_string(), "q=rea&filter[lang]=Rust,Go");
        assert_eq!(session.filter().lang, vec!["Rust", "Go"]);
    }

    #[test]
    fn load_without_query_issues_nothing() {
        let mut session = SearchSession::new();
        assert!(session.load(SearchParams::parse("search?filter[repo]=a")).is_none());
        assert!(session.filter().is_empty());
    }

    #[test]
    fn load_skips_tab_with_results() {
        let mut session = SearchSession::new();
        let request = session.load(SearchParams::new("x")).expect("initial");
        run(&mut session, &request, code_results(&["a"]));
        assert!(session.load(SearchParams::new("y")).is_none());
        assert_eq!(session.query(), "x");
    }

    #[test]
    fn load_document_detail() {
        let mut session = SearchSession::new();
        let request = session
            .load(SearchParams::parse("search?tbm=docs&id=intro"))
            .expect("document");
        assert_eq!(
            request,
            Request::Document {
                id: "intro".to_string()
            }
        );
        assert_eq!(session.tab(), &Tab::Docs);
    }

    #[test]
    fn empty_query_is_noop() {
        let mut session = SearchSession::new();
        session.set_query("   ");
        assert!(session.debounced_request().is_none());
        assert!(session.submit().is_none());
    }

    #[test]
    fn toggling_last_repo_omits_filter_key() {
        let mut session = SearchSession::new();
        let request = session
            .load(SearchParams::parse("search?q=x&filter[repo]=a"))
            .expect("initial");
        run(&mut session, &request, code_results(&["a", "b"]));

        let request = session
            .toggle_bucket(FacetKind::Repo, 0)
            .expect("toggle")
            .expect("request");
        assert!(session.filter().is_empty());
        assert!(!request.to_query_string().contains("filter[repo]"));
        session.begin(&request);
        assert_eq!(session.location(), Some("search?q=x"));
    }

    #[test]
    fn toggle_requires_facet_data() {
        let mut session = SearchSession::new();
        assert_eq!(
            session.toggle_bucket(FacetKind::Lang, 0),
            Err(SessionError::NoFacetData(FacetKind::Lang))
        );

        let request = session.load(SearchParams::new("x")).expect("initial");
        run(&mut session, &request, code_results(&["a"]));
        assert_eq!(
            session.toggle_bucket(FacetKind::Repo, 3),
            Err(SessionError::BucketOutOfRange {
                kind: FacetKind::Repo,
                index: 3,
                len: 1
            })
        );
        assert_eq!(
            session.toggle_bucket(FacetKind::Document, 0),
            Err(SessionError::NotFilterable(FacetKind::Document))
        );
        assert!(matches!(
            session.toggle_value(FacetKind::Repo, "zzz"),
            Err(SessionError::UnknownFacetValue { .. })
        ));
    }

    #[test]
    fn toggle_value_pushes_filter_into_location() {
        let mut session = SearchSession::new();
        let request = session.load(SearchParams::new("x")).expect("initial");
        run(&mut session, &request, code_results(&["o/a", "o/b"]));

        let request = session
            .toggle_value(FacetKind::Repo, "o/b")
            .expect("toggle")
            .expect("request");
        session.begin(&request);
        assert_eq!(session.location(), Some("search?q=x&filter[repo]=o%2Fb"));
        assert!(session.is_loading());
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut session = SearchSession::new();
        session.set_query("re");
        let older = session.debounced_request().expect("request");
        let older_ticket = session.begin(&older);
        session.set_query("rea");
        let newer = session.debounced_request().expect("request");
        let newer_ticket = session.begin(&newer);

        assert_eq!(
            session.complete(newer_ticket, Ok(Response::Results(code_results(&["new"])))),
            Completion::Applied
        );
        assert!(session.is_loading());
        assert_eq!(
            session.complete(older_ticket, Ok(Response::Results(code_results(&["old"])))),
            Completion::Stale
        );
        assert!(!session.is_loading());

        let snapshot = session.snapshot();
        let results = snapshot.results.expect("results");
        assert_eq!(results.facets.buckets(FacetKind::Repo)[0].val, "new");
    }

    #[test]
    fn docs_completion_does_not_stale_pending_code_search() {
        let mut session = SearchSession::new();
        let request = session.load(SearchParams::new("a")).expect("initial");
        run(&mut session, &request, code_results(&["for-a"]));

        session.set_query("b");
        let code = session.debounced_request().expect("code search");
        let code_ticket = session.begin(&code);
        let docs = session.select_tab(Tab::Docs).expect("docs search");
        let docs_ticket = session.begin(&docs);

        assert_eq!(
            session.complete(docs_ticket, Ok(Response::Results(code_results(&["docs-b"])))),
            Completion::Applied
        );
        assert_eq!(
            session.complete(code_ticket, Ok(Response::Results(code_results(&["for-b"])))),
            Completion::Applied
        );

        assert!(session.select_tab(Tab::Code).is_none());
        let snapshot = session.snapshot();
        assert_eq!(snapshot.query, "b");
        assert_eq!(snapshot.location.as_deref(), Some("search?q=b"));
        let results = snapshot.results.expect("code results");
        assert_eq!(results.facets.buckets(FacetKind::Repo)[0].val, "for-b");
    }

    #[test]
    fn query_is_sent_as_it_appears_in_location() {
        let mut session = SearchSession::new();
        session.set_query("foo ");
        let request = session.submit().expect("request");
        assert_eq!(request.to_query_string(), "q=foo%20");
        session.begin(&request);
        assert_eq!(session.location(), Some("search?q=foo%20"));
    }

    #[test]
    fn transport_failure_is_marked_unreachable() {
        let mut session = SearchSession::new();
        let request = session.load(SearchParams::new("x")).expect("initial");
        let err = reqwest::Client::new()
            .get("not a url")
            .build()
            .expect_err("relative url");

        let ticket = session.begin(&request);
        session.complete(ticket, Err(ClientError::Transport(err)));
        let snapshot = session.snapshot();
        assert!(snapshot.not_found);
        assert!(snapshot.unreachable);

        let ticket = session.begin(&request);
        session.complete(
            ticket,
            Err(ClientError::Status {
                status: 502,
                message: "bad gateway".to_string(),
            }),
        );
        assert!(!session.snapshot().unreachable);

        run(&mut session, &request, code_results(&["a"]));
        assert!(!session.snapshot().unreachable);
    }

    #[test]
    fn failure_and_empty_results_set_not_found() {
        let mut session = SearchSession::new();
        let request = session.load(SearchParams::new("x")).expect("initial");
        run(&mut session, &request, code_results(&["a"]));

        let ticket = session.begin(&request);
        session.complete(
            ticket,
            Err(ClientError::Status {
                status: 500,
                message: "boom".to_string(),
            }),
        );
        let snapshot = session.snapshot();
        assert!(snapshot.not_found);
        assert!(snapshot.results.is_none());
        assert!(!snapshot.loading);
        assert!(snapshot.notice.as_deref().is_some_and(|n| n.contains("boom")));

        run(&mut session, &request, SearchResults::default());
        let snapshot = session.snapshot();
        assert!(snapshot.not_found);
        assert_eq!(snapshot.notice, None);

        run(&mut session, &request, code_results(&["a"]));
        assert!(!session.snapshot().not_found);
    }

    #[test]
    fn tab_switch_uses_cache() {
        let mut session = SearchSession::new();
        let request = session.load(SearchParams::new("hooks")).expect("initial");
        run(&mut session, &request, code_results(&["a"]));

        let request = session.select_tab(Tab::Docs).expect("docs fetch");
        assert_eq!(
            request,
            Request::Docs {
                query: "hooks".to_string()
            }
        );
        session.begin(&request);
        assert_eq!(session.location(), Some("search?q=hooks&tbm=docs"));

        assert!(session.select_tab(Tab::Code).is_none());
        assert_eq!(session.location(), Some("search?q=hooks"));
        assert!(session.snapshot().results.is_some());
    }

    #[test]
    fn coming_soon_tab_makes_no_request() {
        let mut session = SearchSession::new();
        session.set_query("x");
        assert!(session
            .select_tab(Tab::ComingSoon("stf".to_string()))
            .is_none());
        assert_eq!(session.location(), Some("search?q=x&tbm=stf"));
        assert!(session.load(SearchParams::parse("q=y&tbm=blog")).is_none());
    }
}
