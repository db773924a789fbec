// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text and JSON views of a [`Snapshot`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::Write as _;

use crate::api::{DocDetail, Hit, SearchResults};
use crate::filters::{FacetBucket, FacetKind, Facets, FilterState};
use crate::location::Tab;
use crate::output::{colorize_dim, colorize_heading, colorize_match, colorize_path, colorize_repo};
use crate::session::Snapshot;
use crate::snippet::{ChunkOptions, HitChunks, HIGHLIGHT_MARKER, HIGHLIGHT_MARKER_END};

static ROW_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</tr>|<br\s*/?>").expect("valid regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid regex"));

const MARK_OPEN: char = '\u{1}';
const MARK_CLOSE: char = '\u{2}';

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub color: bool,
    pub chunk: ChunkOptions,
}

/// Convert highlighted snippet HTML to terminal text.
///
/// Row ends become newlines, tags are dropped, entities decoded and
/// `<mark>` spans highlighted.
pub fn html_to_text(html: &str, color: bool) -> String {
    let text = ROW_END.replace_all(html, "\n");
    let text = text
        .replace(HIGHLIGHT_MARKER, &MARK_OPEN.to_string())
        .replace(HIGHLIGHT_MARKER_END, &MARK_CLOSE.to_string());
    let text = TAG.replace_all(&text, "");
    let text = decode_entities(&text);

    let mut out = String::with_capacity(text.len());
    let mut rest = text.as_str();
    while let Some(start) = rest.find(MARK_OPEN) {
        out.push_str(&rest[..start]);
        let after = &rest[start + MARK_OPEN.len_utf8()..];
        let (marked, tail) = match after.find(MARK_CLOSE) {
            Some(end) => (&after[..end], &after[end + MARK_CLOSE.len_utf8()..]),
            None => (after, ""),
        };
        out.push_str(&colorize_match(marked, color));
        rest = tail;
    }
    out.push_str(&rest.replace(MARK_CLOSE, ""));
    out.trim_end_matches('\n').to_string()
}

fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            let decoded = match name {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => numeric_entity(name),
            };
            decoded
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn numeric_entity(name: &str) -> Option<char> {
    let digits = name.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

/// Facet value as shown next to its checkbox. Long paths keep their last two
/// segments.
pub fn display_facet_value(kind: FacetKind, value: &str) -> String {
    if kind != FacetKind::Path || !value.contains('/') {
        return value.to_string();
    }
    let segments: Vec<&str> = value.split('/').collect();
    if segments.len() <= 2 {
        return value.to_string();
    }
    let start = segments.len().saturating_sub(2).max(1);
    segments[start..].join("/")
}

/// Hits worth showing with their chunks; code hits without a highlighted
/// chunk and hits without snippets are dropped.
pub fn visible_hits<'a>(
    results: &'a SearchResults,
    options: &ChunkOptions,
) -> Vec<(&'a Hit, HitChunks)> {
    results
        .hits
        .iter()
        .filter_map(|hit| match hit {
            Hit::Code(code) => {
                let chunks = HitChunks::from_snippets(code.snippets.as_deref(), options);
                chunks.is_displayable().then_some((hit, chunks))
            }
            Hit::Doc(doc) => {
                let snippets = doc.snippets.as_ref()?;
                Some((
                    hit,
                    HitChunks {
                        groups: vec![snippets.clone()],
                    },
                ))
            }
        })
        .collect()
}

/// Full text rendering of a snapshot.
pub fn render_text(snapshot: &Snapshot, options: &RenderOptions) -> String {
    let color = options.color;
    let mut out = String::new();

    if let Some(detail) = &snapshot.document {
        render_document(&mut out, detail, color);
    } else if let Tab::ComingSoon(name) = &snapshot.tab {
        let _ = writeln!(out, "'{}' search is coming soon.", name);
    } else if snapshot.not_found {
        let _ = writeln!(out, "Can not find matching query: '{}'", snapshot.query);
        if let Some(notice) = &snapshot.notice {
            let _ = writeln!(out, "{}", colorize_dim(notice, color));
        }
    } else if let Some(results) = &snapshot.results {
        render_facets(&mut out, &results.facets, &snapshot.filter, color);
        render_hits(&mut out, results, options);
    } else if snapshot.loading {
        let _ = writeln!(out, "Searching...");
    }

    if let Some(location) = &snapshot.location {
        let _ = writeln!(out, "{}", colorize_dim(&format!("location: {}", location), color));
    }
    out
}

/// Facet sidebar: numbered buckets with a checkbox and count.
pub fn render_facets(out: &mut String, facets: &Facets, filter: &FilterState, color: bool) {
    for (kind, buckets) in facets.iter() {
        if buckets.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{}", colorize_heading(kind.label(), color));
        for (index, bucket) in buckets.iter().enumerate() {
            let _ = writeln!(out, "  {}", facet_line(kind, index, bucket, filter));
        }
        out.push('\n');
    }
}

fn facet_line(kind: FacetKind, index: usize, bucket: &FacetBucket, filter: &FilterState) -> String {
    let mark = if filter.contains(kind, &bucket.val) {
        "[x]"
    } else {
        "[ ]"
    };
    format!(
        "{} {:>2}. {} ({})",
        mark,
        index + 1,
        display_facet_value(kind, &bucket.val),
        bucket.count
    )
}

fn render_hits(out: &mut String, results: &SearchResults, options: &RenderOptions) {
    let color = options.color;
    let _ = writeln!(out, "{} results\n", results.total);
    for (hit, chunks) in visible_hits(results, &options.chunk) {
        match hit {
            Hit::Code(code) => {
                let _ = writeln!(
                    out,
                    "{} {}",
                    colorize_repo(&code.repo, color),
                    colorize_path(&code.file_path(), color)
                );
                let _ = writeln!(out, "{}", colorize_dim(&code.file_url(), color));
                for chunk in chunks.groups.iter().flatten() {
                    out.push_str(&indent(&html_to_text(chunk, color)));
                    let _ = writeln!(out, "  {}", colorize_dim("...", color));
                }
            }
            Hit::Doc(doc) => {
                let _ = writeln!(out, "{}", colorize_repo(&doc.title, color));
                let _ = writeln!(
                    out,
                    "{}",
                    colorize_path(&format!("{} / {}", doc.document, doc.file_name), color)
                );
                if let Some(link) = &doc.link {
                    let _ = writeln!(out, "{}", colorize_dim(link, color));
                }
                let _ = writeln!(out, "{}", colorize_dim(&format!("id: {}", doc.id), color));
                for snippet in chunks.groups.iter().flatten() {
                    out.push_str(&indent(&html_to_text(snippet, color)));
                }
            }
        }
        out.push('\n');
    }
}

fn render_document(out: &mut String, detail: &DocDetail, color: bool) {
    let _ = writeln!(out, "{}", colorize_heading(&detail.title, color));
    if let Some(link) = &detail.link {
        let _ = writeln!(out, "{}", colorize_dim(link, color));
    }
    out.push('\n');
    let _ = writeln!(out, "{}", detail.full_text());
}

fn indent(text: &str) -> String {
    let mut out = String::new();
    for line in text.lines() {
        let _ = writeln!(out, "  {}", line);
    }
    out
}

/// JSON view of one rendered hit.
#[derive(Debug, Serialize)]
pub struct HitView<'a> {
    #[serde(flatten)]
    pub hit: &'a Hit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub chunks: Vec<String>,
}

/// JSON view of a snapshot.
#[derive(Debug, Serialize)]
pub struct SnapshotView<'a> {
    pub query: &'a str,
    pub tab: &'a Tab,
    pub filter: &'a FilterState,
    pub location: Option<&'a str>,
    pub loading: bool,
    pub not_found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<&'a Facets>,
    pub hits: Vec<HitView<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<&'a DocDetail>,
}

pub fn snapshot_view<'a>(snapshot: &'a Snapshot, options: &ChunkOptions) -> SnapshotView<'a> {
    let hits: Vec<HitView<'a>> = snapshot
        .results
        .as_ref()
        .map(|results| {
            visible_hits(results, options)
                .into_iter()
                .map(|(hit, chunks)| {
                    let (url, avatar_url) = match hit {
                        Hit::Code(code) => (Some(code.file_url()), code.avatar_url()),
                        Hit::Doc(doc) => (doc.link.clone(), None),
                    };
                    HitView {
                        hit,
                        url,
                        avatar_url,
                        chunks: chunks.groups.into_iter().flatten().collect(),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    SnapshotView {
        query: &snapshot.query,
        tab: &snapshot.tab,
        filter: &snapshot.filter,
        location: snapshot.location.as_deref(),
        loading: snapshot.loading,
        not_found: snapshot.not_found,
        notice: snapshot.notice.as_deref(),
        total: snapshot.results.as_ref().map(|r| r.total),
        facets: snapshot.results.as_ref().map(|r| &r.facets),
        hits,
        document: snapshot.document.as_ref(),
    }
}
