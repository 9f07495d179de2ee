use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::{Matcher, Server};
use predicates::prelude::*;

const REPOS_PATH: &str = "/users/alice/repos?sort=updated&direction=desc&per_page=100";

const LISTING: &str = r#"[
    {
        "id": 1,
        "name": "pharmup",
        "description": null,
        "html_url": "https://github.com/alice/pharmup",
        "language": null,
        "stargazers_count": 0,
        "updated_at": "2020-01-01T00:00:00Z",
        "topics": [],
        "homepage": null,
        "fork": false
    },
    {
        "id": 2,
        "name": "foo",
        "description": "bar",
        "html_url": "https://github.com/alice/foo",
        "language": "Rust",
        "stargazers_count": 50,
        "updated_at": "2020-01-01T00:00:00Z",
        "topics": ["cli"],
        "homepage": null,
        "fork": false
    },
    {
        "id": 3,
        "name": "baz",
        "description": "x",
        "html_url": "https://github.com/alice/baz",
        "language": "Go",
        "stargazers_count": 100,
        "updated_at": "2020-01-01T00:00:00Z",
        "topics": [],
        "homepage": null,
        "fork": true
    }
]"#;

fn repofolio(api_url: &str) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("repofolio"));
    cmd.env_remove("GITHUB_TOKEN").arg("--api-url").arg(api_url);
    cmd
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_pinned_live_listing() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", REPOS_PATH)
        .match_header("User-Agent", "repofolio")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(LISTING)
        .create();

    let output = repofolio(&url)
        .arg("pinned")
        .arg("alice")
        .assert()
        .success()
        .get_output()
        .clone();

    mock.assert();
    let json = stdout_json(&output);
    assert_eq!(json["source"], "live");

    let repos = json["repositories"].as_array().unwrap();
    let names: Vec<&str> = repos.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["pharmup", "foo"]);
    assert_eq!(repos[0]["description"], "No description available");
    assert_eq!(repos[0]["language"], "Unknown");
    assert_eq!(repos[1]["starCount"], 50);
    assert!(repos[0].get("isFork").is_none());
}

#[test]
fn test_pinned_falls_back_on_server_error() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", REPOS_PATH)
        .with_status(502)
        .expect(1)
        .create();

    let output = repofolio(&url)
        .arg("pinned")
        .arg("alice")
        .assert()
        .success()
        .get_output()
        .clone();

    mock.assert();
    let json = stdout_json(&output);
    assert_eq!(json["source"], "fallback");
    let names: Vec<&str> = json["repositories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["pharmup", "seculearn", "portfolio"]);
}

#[test]
fn test_pinned_falls_back_on_malformed_body() {
    let mut server = Server::new();
    let url = server.url();

    let _mock = server
        .mock("GET", REPOS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Not a list"}"#)
        .create();

    repofolio(&url)
        .arg("pinned")
        .arg("alice")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""source": "fallback""#))
        .stdout(predicate::str::contains("seculearn"));
}

#[test]
fn test_pinned_stats_on_stderr() {
    let mut server = Server::new();
    let url = server.url();

    let _mock = server
        .mock("GET", REPOS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(LISTING)
        .create();

    repofolio(&url)
        .arg("pinned")
        .arg("alice")
        .arg("--stats")
        .assert()
        .success()
        .stderr(predicate::str::contains("pinned_repos_alice"))
        .stderr(predicate::str::contains(r#""ttl": 1800"#));
}

#[test]
fn test_custom_featured_names() {
    let mut server = Server::new();
    let url = server.url();

    let _mock = server
        .mock("GET", REPOS_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(LISTING)
        .create();

    let output = repofolio(&url)
        .arg("pinned")
        .arg("alice")
        .arg("--featured")
        .arg("foo")
        .assert()
        .success()
        .get_output()
        .clone();

    let json = stdout_json(&output);
    let names: Vec<&str> = json["repositories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    // pharmup is no longer featured and is unremarkable, so only foo remains.
    assert_eq!(names, vec!["foo"]);
}

#[test]
fn test_token_sent_as_bearer() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", REPOS_PATH)
        .match_header(
            "Authorization",
            Matcher::Exact("Bearer secret-token".to_string()),
        )
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create();

    repofolio(&url)
        .env("GITHUB_TOKEN", "secret-token")
        .arg("pinned")
        .arg("alice")
        .assert()
        .success();

    mock.assert();
}

#[test]
fn test_profile_success() {
    let mut server = Server::new();
    let url = server.url();

    let _mock = server
        .mock("GET", "/users/alice")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"login": "alice", "id": 7, "name": "Alice", "public_repos": 3}"#)
        .create();

    repofolio(&url)
        .arg("profile")
        .arg("alice")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""login": "alice""#))
        .stdout(predicate::str::contains(r#""public_repos": 3"#));
}

#[test]
fn test_profile_unavailable_fails() {
    let mut server = Server::new();
    let url = server.url();

    let _mock = server
        .mock("GET", "/users/alice")
        .with_status(404)
        .create();

    repofolio(&url)
        .arg("profile")
        .arg("alice")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Upstream unavailable"));
}
