// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query-string contract shared by the address bar and the search API.
//!
//! `q`, `tbm`, `id`, `filter[repo]`, `filter[lang]` and `filter[path]` are the
//! only recognised keys. Filter lists are comma-joined; every value is
//! percent-encoded on its own, so a comma inside a value survives a round trip.

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

use crate::filters::{FacetKind, FilterState};

/// Path of the search page in the location string.
pub const SEARCH_PAGE: &str = "search";

/// Result-type tab selected by `tbm`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Code,
    Docs,
    /// Tabs without a backend yet (`stf`, `blog`, ...)
    ComingSoon(String),
}

impl Tab {
    pub fn from_tbm(tbm: &str) -> Self {
        match tbm.trim() {
            "" | "code" => Tab::Code,
            "docs" => Tab::Docs,
            other => Tab::ComingSoon(other.to_string()),
        }
    }

    /// Value for `tbm`; the code tab is the default and is left out.
    pub fn tbm(&self) -> Option<&str> {
        match self {
            Tab::Code => None,
            Tab::Docs => Some("docs"),
            Tab::ComingSoon(name) => Some(name.as_str()),
        }
    }

    pub fn has_backend(&self) -> bool {
        !matches!(self, Tab::ComingSoon(_))
    }
}

impl Serialize for Tab {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tbm().unwrap_or("code"))
    }
}

/// Parsed form of a search location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchParams {
    pub query: String,
    pub tab: Tab,
    pub filter: FilterState,
    pub id: Option<String>,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Parse a full URL, a `search?...` location, or a bare query string.
    pub fn parse(input: &str) -> Self {
        let raw = input.trim();
        let query_part = match raw.split_once('?') {
            Some((_, rest)) => rest,
            None if raw.contains('=') => raw,
            None => "",
        };
        let query_part = query_part.split('#').next().unwrap_or_default();

        let mut params = SearchParams::default();
        for pair in query_part.split('&').filter(|p| !p.is_empty()) {
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(raw_key);
            match key.as_ref() {
                "q" => params.query = decode_component(raw_value).into_owned(),
                "tbm" => params.tab = Tab::from_tbm(&decode_component(raw_value)),
                "id" => {
                    let id = decode_component(raw_value);
                    params.id = (!id.is_empty()).then(|| id.into_owned());
                }
                other => {
                    if let Some(kind) = filter_key(other) {
                        // Filter keys only ever name filterable facets.
                        let _ = params.filter.set(kind, decode_list(raw_value));
                    }
                }
            }
        }
        params
    }

    /// Serialize to `q=...[&tbm=...][&id=...][&filter[...]=...]`.
    pub fn to_query_string(&self) -> String {
        let mut out = format!("q={}", encode_component(&self.query));
        if let Some(tbm) = self.tab.tbm() {
            out.push_str("&tbm=");
            out.push_str(&encode_component(tbm));
        }
        if let Some(id) = &self.id {
            out.push_str("&id=");
            out.push_str(&encode_component(id));
        }
        out.push_str(&filter_query(&self.filter));
        out
    }

    /// Address-bar form, e.g. `search?q=foo&filter[lang]=Rust`.
    pub fn to_location(&self) -> String {
        format!("{}?{}", SEARCH_PAGE, self.to_query_string())
    }
}

/// `&filter[kind]=v1,v2` segments for every non-empty selection.
pub fn filter_query(filter: &FilterState) -> String {
    let mut out = String::new();
    for (kind, values) in filter.active() {
        let encoded: Vec<Cow<'_, str>> = values
            .iter()
            .filter(|v| !v.is_empty())
            .map(|v| encode_component(v))
            .collect();
        if encoded.is_empty() {
            continue;
        }
        out.push('&');
        out.push_str(&kind.param_key());
        out.push('=');
        out.push_str(&encoded.join(","));
    }
    out
}

fn filter_key(key: &str) -> Option<FacetKind> {
    let name = key.strip_prefix("filter[")?.strip_suffix(']')?;
    name.parse::<FacetKind>()
        .ok()
        .filter(|kind| kind.is_filterable())
}

fn decode_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(decode_component)
        .filter(|v| !v.is_empty())
        .map(Cow::into_owned)
        .collect()
}

fn encode_component(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Decode a query component, treating `+` as a space. Invalid UTF-8 falls
/// back to the raw text.
fn decode_component(raw: &str) -> Cow<'_, str> {
    if raw.contains('+') {
        let spaced = raw.replace('+', " ");
        let decoded = urlencoding::decode(&spaced).map(Cow::into_owned);
        return Cow::Owned(decoded.unwrap_or(spaced));
    }
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}
