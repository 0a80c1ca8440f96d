//! Behaviour-driven step definitions driving the search CLI scenarios.

use super::helpers::{FixedClock, seed_store, timestamp, write_utf8};
use super::*;
use crate::search::run_search_with;
use camino::Utf8PathBuf;
use clap::Parser;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use std::cell::RefCell;
use tempfile::TempDir;

#[derive(Debug)]
struct SearchWorld {
    _tmp: TempDir,
    root: Utf8PathBuf,
    request_path: Utf8PathBuf,
    include_request: RefCell<bool>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl SearchWorld {
    fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        let request_path = root.join("request.json");
        Self {
            _tmp: tmp,
            root,
            request_path,
            include_request: RefCell::new(true),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["haunt".to_owned(), "search".to_owned()];
        if *self.include_request.borrow() {
            argv.push(self.request_path.as_str().to_owned());
        }
        argv.extend([
            format!("--{ARG_SEARCH_VENUES_DB}"),
            self.root.join("venues.db").as_str().to_owned(),
        ]);
        argv
    }

    fn write_request(&self, request: &Value) {
        write_utf8(&self.request_path, request.to_string().as_bytes());
    }

    fn printed_ids(&self) -> Vec<String> {
        let stdout = String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8");
        let response: Value = serde_json::from_str(&stdout).expect("output should be JSON");
        response["results"]
            .as_array()
            .expect("results array")
            .iter()
            .map(|entry| {
                entry["venue"]["id"]
                    .as_str()
                    .expect("venue id")
                    .to_owned()
            })
            .collect()
    }

    fn error(&self) -> String {
        let borrowed = self.result.borrow();
        let error = borrowed
            .as_ref()
            .expect("result recorded")
            .as_ref()
            .expect_err("expected error");
        format!("{error:?}")
    }
}

#[fixture]
fn world() -> SearchWorld {
    SearchWorld::new()
}

#[given("a venue store seeded with the sample catalogue")]
fn seeded_store(#[from(world)] world: &SearchWorld) {
    seed_store(&world.root);
}

#[given("a search request for indoor venues downtown")]
fn downtown_request(#[from(world)] world: &SearchWorld) {
    world.write_request(&serde_json::json!({
        "filters": { "area": "Downtown", "tags": ["indoor"] },
        "evaluated_at": "2024-07-01T12:00:00",
    }));
}

#[given("a search request for venues open now without a timestamp")]
fn open_now_request(#[from(world)] world: &SearchWorld) {
    world.write_request(&serde_json::json!({ "filters": { "open_now": true } }));
}

#[given("the search request contains invalid JSON")]
fn invalid_json_request(#[from(world)] world: &SearchWorld) {
    write_utf8(&world.request_path, b"{ not valid json");
}

#[given("I omit the search request path")]
fn omit_request_path(#[from(world)] world: &SearchWorld) {
    *world.include_request.borrow_mut() = false;
}

#[when("I run the search command")]
fn run_search_command(#[from(world)] world: &SearchWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Search(args) => {
            let clock = FixedClock(timestamp(2024, 7, 1, 12));
            let mut buffer = world.stdout.borrow_mut();
            run_search_with(args, &clock, &mut *buffer)
        }
        Command::Import(_) => panic!("expected search command"),
    });
    world.result.replace(Some(outcome));
}

#[then("the command succeeds and prints the quiet table first")]
fn prints_quiet_table(#[from(world)] world: &SearchWorld) {
    world
        .result
        .borrow()
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect("expected success");
    assert_eq!(world.printed_ids(), ["quiet"]);
}

#[then("only the venue open around the clock is printed")]
fn prints_open_venue(#[from(world)] world: &SearchWorld) {
    assert_eq!(world.printed_ids(), ["rooftop"]);
}

#[then("the command fails because the request JSON is invalid")]
fn fails_invalid_json(#[from(world)] world: &SearchWorld) {
    assert!(world.error().starts_with("ParseSearchRequest"));
}

#[then("the command fails because the request path is missing")]
fn fails_missing_request(#[from(world)] world: &SearchWorld) {
    let borrowed = world.result.borrow();
    let error = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect_err("expected error");
    match error {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_SEARCH_REQUEST),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

macro_rules! register_search_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/search_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: SearchWorld) {
            let _ = world;
        }
    };
}

register_search_scenario!(search_happy_path, "searching a seeded store from JSON");
register_search_scenario!(
    search_open_now_uses_clock,
    "evaluating open-now requests at the current time"
);
register_search_scenario!(search_invalid_json, "rejecting invalid JSON input");
register_search_scenario!(search_missing_request, "rejecting missing request paths");
