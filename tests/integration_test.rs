use assert_cmd::Command;
use mockito::Server;
use predicates::prelude::*;

fn refetch() -> Command {
    Command::cargo_bin("refetch").unwrap()
}

#[test]
fn test_get_prints_body() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", "/hello")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("hello from server")
        .create();

    refetch()
        .args(["GET", &format!("{}/hello", url)])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello from server"));

    mock.assert();
}

#[test]
fn test_post_forwards_header_and_body() {
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("POST", "/submit")
        .match_header("x-token", "secret")
        .match_body("payload")
        .with_status(200)
        .with_body("accepted")
        .create();

    refetch()
        .args([
            "POST",
            &format!("{}/submit", url),
            "-H",
            "x-token: secret",
            "-d",
            "payload",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("accepted"));

    mock.assert();
}

#[test]
fn test_non_2xx_body_is_passed_through() {
    // Statuses are the transport's concern; the executor and CLI surface
    // whatever response the single successful attempt produced.
    let mut server = Server::new();
    let url = server.url();

    let mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .with_body("not here")
        .create();

    refetch()
        .args(["GET", &format!("{}/missing", url)])
        .assert()
        .success()
        .stdout(predicate::str::contains("not here"));

    mock.assert();
}

#[test]
fn test_connection_failure_exhausts_retries() {
    // Bind then drop a listener so the port is known to be closed.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    refetch()
        .args([
            "GET",
            &format!("http://127.0.0.1:{}/", port),
            "--max-retries",
            "2",
            "--initial-delay",
            "0",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("request failed after 2 attempts"));
}

#[test]
fn test_zero_attempt_budget_is_rejected() {
    refetch()
        .args(["GET", "http://example.test/", "--max-retries", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_retries"));
}

#[test]
fn test_unknown_method_is_rejected() {
    refetch()
        .args(["FETCH", "http://example.test/"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown HTTP method"));
}
