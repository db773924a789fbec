// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snippet chunking for highlighted search excerpts.
//!
//! The backend returns each snippet as highlighted HTML rows joined by
//! newlines, with matched terms wrapped in `<mark>`. Only short runs that
//! actually carry a highlight are worth showing.

use serde::Serialize;

/// Opening tag the backend wraps matched terms with.
pub const HIGHLIGHT_MARKER: &str = "<mark>";
/// Closing counterpart of [`HIGHLIGHT_MARKER`].
pub const HIGHLIGHT_MARKER_END: &str = "</mark>";
pub const DEFAULT_LINES_PER_CHUNK: usize = 4;
pub const DEFAULT_MAX_CHUNKS: usize = 3;

/// Tunables for [`chunk_snippet_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkOptions {
    pub lines_per_chunk: usize,
    pub max_chunks: usize,
    pub marker: String,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            lines_per_chunk: DEFAULT_LINES_PER_CHUNK,
            max_chunks: DEFAULT_MAX_CHUNKS,
            marker: HIGHLIGHT_MARKER.to_string(),
        }
    }
}

/// Split a snippet into at most 3 marker-carrying chunks of 4 lines.
pub fn chunk_snippet(snippet: &str) -> Vec<String> {
    chunk_snippet_with(snippet, &ChunkOptions::default())
}

/// Split `snippet` into runs of `lines_per_chunk` lines, keep the runs that
/// contain the marker, and return the first `max_chunks` of them.
///
/// Lines inside a run are concatenated without a separator. The last run may
/// be shorter than `lines_per_chunk` and is still considered. Returns an empty
/// vector when nothing qualifies, which callers treat as "nothing to display".
pub fn chunk_snippet_with(snippet: &str, options: &ChunkOptions) -> Vec<String> {
    if snippet.is_empty() || options.max_chunks == 0 {
        return Vec::new();
    }
    let per_chunk = options.lines_per_chunk.max(1);

    let lines: Vec<&str> = snippet.split('\n').collect();
    lines
        .chunks(per_chunk)
        .map(|run| run.concat())
        .filter(|chunk| chunk.contains(options.marker.as_str()))
        .take(options.max_chunks)
        .collect()
}

/// Displayable chunks of one hit, grouped per source snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HitChunks {
    pub groups: Vec<Vec<String>>,
}

impl HitChunks {
    /// Chunk every snippet of a hit. `None` (no snippet list) yields no groups.
    pub fn from_snippets(snippets: Option<&[String]>, options: &ChunkOptions) -> Self {
        let groups = snippets
            .unwrap_or_default()
            .iter()
            .map(|snippet| chunk_snippet_with(snippet, options))
            .filter(|chunks| !chunks.is_empty())
            .collect();
        Self { groups }
    }

    pub fn is_displayable(&self) -> bool {
        !self.groups.is_empty()
    }
}
