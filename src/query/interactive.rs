// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive session driven by stdin lines
//!
//! Plain text edits the query and is sent after the debounce period. Lines
//! starting with `:` are commands (see `heline interactive --help`).

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::search::print_snapshot;
use super::Context;
use heline::controller::{Controller, ControllerHandle};
use heline::errors::{suggestions, ControllerError, SessionError};
use heline::filters::FacetKind;
use heline::location::{SearchParams, Tab};
use heline::session::Snapshot;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Query(String),
    Submit,
    Toggle(FacetKind, usize),
    ToggleValue(FacetKind, String),
    Tab(Tab),
    Doc(String),
    Open(String),
    Quit,
}

/// Parse one line of the session. Bucket numbers are 1-based on input and
/// 0-based in the result; `=value` names the bucket instead.
pub fn parse_line(line: &str) -> Result<Input, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(command) = line.strip_prefix(':') else {
        if line.trim().is_empty() {
            return Ok(Input::Submit);
        }
        return Ok(Input::Query(line.to_string()));
    };

    let (name, arg) = command
        .trim()
        .split_once(char::is_whitespace)
        .map(|(name, arg)| (name, arg.trim()))
        .unwrap_or((command.trim(), ""));

    match name {
        "q" | "quit" | "exit" => Ok(Input::Quit),
        "submit" | "s" => Ok(Input::Submit),
        "tab" | "t" if !arg.is_empty() => Ok(Input::Tab(Tab::from_tbm(arg))),
        "doc" | "d" if !arg.is_empty() => Ok(Input::Doc(arg.to_string())),
        "open" | "o" if !arg.is_empty() => Ok(Input::Open(arg.to_string())),
        other => {
            let kind = other
                .parse::<FacetKind>()
                .map_err(|_| format!("unknown command ':{}'", other))?;
            if let Some(value) = arg.strip_prefix('=').filter(|v| !v.is_empty()) {
                return Ok(Input::ToggleValue(kind, value.to_string()));
            }
            let number: usize = arg
                .parse()
                .map_err(|_| suggestions::toggle_usage_message(&["repo", "lang", "path"]))?;
            if number == 0 {
                return Err("bucket numbers start at 1".to_string());
            }
            Ok(Input::Toggle(kind, number - 1))
        }
    }
}

/// Run `heline interactive`.
pub async fn run(ctx: &Context, initial: Option<&str>) -> Result<()> {
    let handle = Controller::spawn(ctx.client.clone(), ctx.debounce);
    let mut snapshots = handle.subscribe();

    if let Some(initial) = initial {
        handle.load(SearchParams::parse(initial))?;
    }
    eprintln!("Type a query, an empty line to re-submit, or :quit. See `heline interactive --help`.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Ok(Input::Quit) => break,
                    Ok(input) => apply(&handle, input).await?,
                    Err(message) => eprintln!("{}", message),
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                show(ctx, &snapshot)?;
            }
        }
    }
    Ok(())
}

async fn apply(handle: &ControllerHandle, input: Input) -> Result<()> {
    let sent = match input {
        Input::Query(text) => handle.input(text),
        Input::Submit => handle.submit(),
        Input::Tab(tab) => handle.select_tab(tab),
        Input::Doc(id) => handle.open_document(id),
        Input::Open(url) => handle.load(SearchParams::parse(&url)),
        Input::Toggle(kind, index) => handle.toggle(kind, index).await,
        Input::ToggleValue(kind, value) => handle.toggle_value(kind, value).await,
        Input::Quit => Ok(()),
    };
    match sent {
        Ok(()) => Ok(()),
        Err(ControllerError::Session(err)) => {
            report(&err);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn report(err: &SessionError) {
    eprintln!("{}", err);
    if matches!(err, SessionError::BucketOutOfRange { .. }) {
        eprintln!("{}", suggestions::toggle_usage_message(&["repo", "lang", "path"]));
    }
}

fn show(ctx: &Context, snapshot: &Snapshot) -> Result<()> {
    if snapshot.loading {
        eprintln!("Searching...");
        return Ok(());
    }
    print_snapshot(ctx, snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_query_edit() {
        assert_eq!(parse_line("use state"), Ok(Input::Query("use state".to_string())));
        assert_eq!(parse_line(""), Ok(Input::Submit));
        assert_eq!(parse_line("   \n"), Ok(Input::Submit));
    }

    #[test]
    fn toggle_numbers_are_one_based() {
        assert_eq!(parse_line(":repo 1"), Ok(Input::Toggle(FacetKind::Repo, 0)));
        assert_eq!(parse_line(":language 3"), Ok(Input::Toggle(FacetKind::Lang, 2)));
        assert!(parse_line(":path 0").is_err());
        assert!(parse_line(":repo =").is_err());
        assert!(parse_line(":path x").is_err());
    }

    #[test]
    fn toggle_by_name() {
        assert_eq!(
            parse_line(":repo =facebook/react"),
            Ok(Input::ToggleValue(FacetKind::Repo, "facebook/react".to_string()))
        );
    }

    #[test]
    fn commands_parse() {
        assert_eq!(parse_line(":quit"), Ok(Input::Quit));
        assert_eq!(parse_line(":submit"), Ok(Input::Submit));
        assert_eq!(parse_line(":tab docs"), Ok(Input::Tab(Tab::Docs)));
        assert_eq!(parse_line(":doc react/hooks"), Ok(Input::Doc("react/hooks".to_string())));
        assert_eq!(
            parse_line(":open search?q=x"),
            Ok(Input::Open("search?q=x".to_string()))
        );
        assert!(parse_line(":bogus").is_err());
    }
}
