// SPDX-License-Identifier: MIT OR Apache-2.0

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn heline(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("heline"));
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("NO_COLOR", "1")
        .env_remove("HELINE_API_URL");
    cmd
}

#[test]
fn help_lists_quickstart() {
    let dir = TempDir::new().expect("tempdir");
    heline(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Search quickstart:"))
        .stdout(predicate::str::contains("interactive"));
}

#[test]
fn completions_generate_for_bash() {
    let dir = TempDir::new().expect("tempdir");
    heline(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_heline"));
}

#[test]
fn empty_query_is_rejected_without_request() {
    let dir = TempDir::new().expect("tempdir");
    heline(&dir)
        .args(["--api-url", "http://127.0.0.1:9", "search", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Search query cannot be empty"));
}

#[test]
fn open_without_query_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    heline(&dir)
        .args(["--api-url", "http://127.0.0.1:9", "open", "search?filter[repo]=a/b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("carries no query"));
}

#[test]
fn open_with_id_but_no_docs_tab_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    heline(&dir)
        .args(["--api-url", "http://127.0.0.1:9", "open", "search?id=react/hooks"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("carries no query"));
}

#[test]
fn unreachable_api_prints_hint() {
    let dir = TempDir::new().expect("tempdir");
    heline(&dir)
        .args(["--api-url", "http://127.0.0.1:9", "search", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("did not answer"))
        .stderr(predicate::str::contains("Can not find matching query: 'x'"));
}

#[test]
fn invalid_api_url_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    heline(&dir)
        .args(["--api-url", "ftp://example.com", "search", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot create search client"));
}

#[test]
fn env_api_url_is_used_when_flag_missing() {
    let dir = TempDir::new().expect("tempdir");
    heline(&dir)
        .env("HELINE_API_URL", "ftp://from-env.example")
        .args(["search", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ftp://from-env.example"));
}

#[test]
fn interactive_reports_unknown_commands_and_quits() {
    let dir = TempDir::new().expect("tempdir");
    heline(&dir)
        .args(["--api-url", "http://127.0.0.1:9", "interactive"])
        .write_stdin(":bogus\n:repo 1\n:quit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("unknown command ':bogus'"))
        .stderr(predicate::str::contains("no repo facet data yet"));
}
