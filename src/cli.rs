// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing using clap

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

/// heline - search code and documentation from the terminal
///
/// Queries a heline search API, renders facets, hits and highlighted
/// snippets, and prints the shareable search location.
#[derive(Parser, Debug)]
#[command(name = "heline")]
#[command(
    author,
    version,
    about,
    long_about = None,
    override_usage = "heline [OPTIONS] <COMMAND>",
    after_help = "Search quickstart:\n  heline s useDebounce\n  heline search \"fn main\" --lang Rust --repo rust-lang/cargo\n  heline open 'https://heline.dev/search?q=useState&filter[lang]=JavaScript'\n  heline interactive"
)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Compact JSON output (no pretty formatting)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Base URL of the search API (overrides HELINE_API_URL and config)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search code (or another result tab) once and print the results
    #[command(
        visible_aliases = ["s", "q"],
        after_help = "Examples:\n  heline s useState\n  heline search useState --tab docs\n  heline search debounce --repo ahmadrosid/heline --path ui/lib"
    )]
    Search {
        /// Search query
        query: String,

        /// Result tab: code, docs, or any other tbm value
        #[arg(short, long, default_value = "code")]
        tab: String,

        /// Restrict to repository (repeatable)
        #[arg(short, long = "repo", value_name = "OWNER/REPO")]
        repo: Vec<String>,

        /// Restrict to language (repeatable)
        #[arg(short, long = "lang", value_name = "LANG")]
        lang: Vec<String>,

        /// Restrict to path (repeatable)
        #[arg(short, long = "path", value_name = "PATH")]
        path: Vec<String>,
    },

    /// Restore a search from a shared URL or query string
    #[command(visible_aliases = ["o"])]
    Open {
        /// Full URL, `search?...` location or bare query string
        url: String,
    },

    /// Show the full text of a document
    #[command(visible_aliases = ["d"])]
    Doc {
        /// Document id from a docs search
        id: String,
    },

    /// Line-driven search session with debounced queries
    #[command(
        visible_aliases = ["i"],
        after_help = "Commands inside the session:\n  <text>          edit the query (sent after the debounce period)\n  <empty line>    re-submit the current query\n  :submit         same as an empty line\n  :repo N         toggle the N-th repository bucket\n  :lang N         toggle the N-th language bucket\n  :path N         toggle the N-th path bucket\n  :repo =VALUE    toggle a bucket by name (also :lang, :path)\n  :tab NAME       switch result tab (code, docs, ...)\n  :doc ID         open a document\n  :open URL       load a shared search location\n  :quit           leave the session"
    )]
    Interactive {
        /// Optional initial location or query string
        #[arg(value_name = "URL")]
        initial: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
