// SPDX-License-Identifier: MIT OR Apache-2.0

//! Facet buckets and the active filter selection.
//!
//! The backend returns aggregate counts per facet dimension; the client keeps
//! the selected values for the filterable dimensions (`repo`, `lang`, `path`)
//! and flips them with [`FilterState::toggle`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::SessionError;

/// A categorical dimension the backend aggregates over.
///
/// Variant order is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetKind {
    Repo,
    Path,
    Lang,
    Document,
}

impl FacetKind {
    /// Dimensions that can narrow a code search.
    pub const FILTERABLE: [FacetKind; 3] = [FacetKind::Repo, FacetKind::Lang, FacetKind::Path];

    pub fn as_str(self) -> &'static str {
        match self {
            FacetKind::Repo => "repo",
            FacetKind::Path => "path",
            FacetKind::Lang => "lang",
            FacetKind::Document => "document",
        }
    }

    /// Heading used by the renderer
    pub fn label(self) -> &'static str {
        match self {
            FacetKind::Repo => "Repository",
            FacetKind::Path => "Path",
            FacetKind::Lang => "Language",
            FacetKind::Document => "Document",
        }
    }

    pub fn is_filterable(self) -> bool {
        !matches!(self, FacetKind::Document)
    }

    /// Query-string key carrying this facet's selection, e.g. `filter[repo]`.
    pub fn param_key(self) -> String {
        format!("filter[{}]", self.as_str())
    }
}

impl fmt::Display for FacetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "repo" | "repository" => Ok(FacetKind::Repo),
            "path" => Ok(FacetKind::Path),
            "lang" | "language" => Ok(FacetKind::Lang),
            "document" | "doc" => Ok(FacetKind::Document),
            other => Err(format!("unknown facet '{}'", other)),
        }
    }
}

/// One value-count pair of a facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetBucket {
    pub val: String,
    pub count: u64,
}

impl FacetBucket {
    pub fn new(val: impl Into<String>, count: u64) -> Self {
        Self {
            val: val.into(),
            count,
        }
    }
}

/// Bucket lists per facet, in the order the backend returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Facets(BTreeMap<FacetKind, Vec<FacetBucket>>);

impl Facets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: FacetKind, buckets: Vec<FacetBucket>) {
        self.0.insert(kind, buckets);
    }

    pub fn with(mut self, kind: FacetKind, buckets: Vec<FacetBucket>) -> Self {
        self.insert(kind, buckets);
        self
    }

    /// Buckets for `kind`; empty when the backend sent none.
    pub fn buckets(&self, kind: FacetKind) -> &[FacetBucket] {
        self.0.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (FacetKind, &[FacetBucket])> {
        self.0.iter().map(|(kind, buckets)| (*kind, buckets.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}

/// Outcome of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

/// Currently selected values per filterable facet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub repo: Vec<String>,
    pub lang: Vec<String>,
    pub path: Vec<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection for `kind`, or `None` for facets that cannot filter.
    pub fn selection(&self, kind: FacetKind) -> Option<&[String]> {
        match kind {
            FacetKind::Repo => Some(&self.repo),
            FacetKind::Lang => Some(&self.lang),
            FacetKind::Path => Some(&self.path),
            FacetKind::Document => None,
        }
    }

    fn selection_mut(&mut self, kind: FacetKind) -> Option<&mut Vec<String>> {
        match kind {
            FacetKind::Repo => Some(&mut self.repo),
            FacetKind::Lang => Some(&mut self.lang),
            FacetKind::Path => Some(&mut self.path),
            FacetKind::Document => None,
        }
    }

    pub fn contains(&self, kind: FacetKind, value: &str) -> bool {
        self.selection(kind)
            .is_some_and(|values| values.iter().any(|v| v == value))
    }

    /// Remove `value` if selected, otherwise append it.
    pub fn toggle(&mut self, kind: FacetKind, value: &str) -> Result<Toggle, SessionError> {
        let values = self
            .selection_mut(kind)
            .ok_or(SessionError::NotFilterable(kind))?;
        Ok(toggle_value(values, value))
    }

    /// Replace the selection for `kind`, dropping duplicates and keeping first-seen order.
    pub fn set(&mut self, kind: FacetKind, values: Vec<String>) -> Result<(), SessionError> {
        let slot = self
            .selection_mut(kind)
            .ok_or(SessionError::NotFilterable(kind))?;
        slot.clear();
        for value in values {
            if !slot.contains(&value) {
                slot.push(value);
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.repo.is_empty() && self.lang.is_empty() && self.path.is_empty()
    }

    /// Non-empty selections in query-string order (repo, lang, path).
    pub fn active(&self) -> impl Iterator<Item = (FacetKind, &[String])> {
        FacetKind::FILTERABLE.into_iter().filter_map(move |kind| {
            self.selection(kind)
                .filter(|values| !values.is_empty())
                .map(|values| (kind, values))
        })
    }
}

/// Toggle `value` inside one selection list.
pub fn toggle_value(values: &mut Vec<String>, value: &str) -> Toggle {
    if let Some(pos) = values.iter().position(|v| v == value) {
        values.remove(pos);
        Toggle::Removed
    } else {
        values.push(value.to_string());
        Toggle::Added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    #[test]
    fn toggle_removes_present_value() {
        let mut filter = FilterState {
            repo: vec!["a".to_string()],
            ..FilterState::default()
        };
        let outcome = filter.toggle(FacetKind::Repo, "a").expect("toggle");
        assert_eq!(outcome, Toggle::Removed);
        assert_eq!(filter, FilterState::default());
    }

    #[test]
    fn toggle_appends_missing_value_in_insertion_order() {
        let mut filter = FilterState::new();
        filter.toggle(FacetKind::Lang, "Rust").expect("toggle");
        filter.toggle(FacetKind::Lang, "Go").expect("toggle");
        assert_eq!(filter.lang, vec!["Rust", "Go"]);
    }

    #[test]
    fn document_facet_is_not_filterable() {
        let mut filter = FilterState::new();
        let err = filter
            .toggle(FacetKind::Document, "react")
            .expect_err("document facet");
        assert_eq!(err, SessionError::NotFilterable(FacetKind::Document));
    }

    #[test]
    fn set_drops_duplicates() {
        let mut filter = FilterState::new();
        filter
            .set(
                FacetKind::Path,
                vec!["src".to_string(), "docs".to_string(), "src".to_string()],
            )
            .expect("set");
        assert_eq!(filter.path, vec!["src", "docs"]);
    }

    #[test]
    fn facets_keep_backend_order() {
        let facets = Facets::new().with(
            FacetKind::Repo,
            vec![FacetBucket::new("zeta/z", 1), FacetBucket::new("alpha/a", 9)],
        );
        let vals: Vec<&str> = facets
            .buckets(FacetKind::Repo)
            .iter()
            .map(|b| b.val.as_str())
            .collect();
        assert_eq!(vals, vec!["zeta/z", "alpha/a"]);
        assert!(facets.buckets(FacetKind::Lang).is_empty());
    }

    #[test]
    fn facet_kind_parses_aliases() {
        assert_eq!("Language".parse::<FacetKind>(), Ok(FacetKind::Lang));
        assert_eq!("repository".parse::<FacetKind>(), Ok(FacetKind::Repo));
        assert!("owner".parse::<FacetKind>().is_err());
    }

    proptest! {
        #[test]
        fn double_toggle_restores_selection(
            initial in proptest::collection::btree_set("[a-z]{1,6}", 0..6),
            value in "[a-z]{1,6}",
        ) {
            let initial: Vec<String> = initial.into_iter().collect();
            let mut values = initial.clone();
            toggle_value(&mut values, &value);
            toggle_value(&mut values, &value);
            let before: BTreeSet<_> = initial.iter().collect();
            let after: BTreeSet<_> = values.iter().collect();
            prop_assert_eq!(before, after);
            prop_assert_eq!(values.len(), initial.len());
        }

        #[test]
        fn toggle_never_duplicates(ops in proptest::collection::vec("[a-c]", 0..20)) {
            let mut values = Vec::new();
            for op in &ops {
                toggle_value(&mut values, op);
            }
            let unique: BTreeSet<_> = values.iter().collect();
            prop_assert_eq!(unique.len(), values.len());
        }
    }
}
