//! Integration tests for login/logout and the session-expiry flow, driven
//! through the binary against a mock backend.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a temp REDRAFT_HOME directory for test isolation.
fn temp_home() -> TempDir {
    TempDir::new().expect("create temp redraft home")
}

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn write_session(home: &TempDir, access: &str, refresh: &str) {
    fs::write(
        home.path().join("session.json"),
        format!(r#"{{"access": "{access}", "refresh": "{refresh}"}}"#),
    )
    .unwrap();
}

/// Test: login stores the token pair and caches the profile.
#[tokio::test]
async fn test_login_stores_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users/login/"))
        .and(body_json(
            serde_json::json!({"username": "nia", "password": "hunter2"}),
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"access": "A1", "refresh": "R1"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/user/"))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"id": 1, "username": "nia", "email": "nia@example.com"}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("redraft")
        .env("REDRAFT_HOME", home.path())
        .env("REDRAFT_BASE_URL", server.uri())
        .args(["login", "--username", "nia", "--password", "hunter2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as nia"));

    let session = fs::read_to_string(home.path().join("session.json")).unwrap();
    assert!(session.contains("A1"));
    assert!(session.contains("R1"));

    let profile = fs::read_to_string(home.path().join("profile.json")).unwrap();
    assert!(profile.contains("nia@example.com"));
}

/// Test: rejected credentials fail with the backend detail and store nothing.
#[tokio::test]
async fn test_login_rejected_credentials() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users/login/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(
            serde_json::json!({"detail": "No active account found with the given credentials"}),
        ))
        .mount(&server)
        .await;

    cargo_bin_cmd!("redraft")
        .env("REDRAFT_HOME", home.path())
        .env("REDRAFT_BASE_URL", server.uri())
        .args(["login", "--username", "nia", "--password", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No active account"));

    assert!(!home.path().join("session.json").exists());
}

/// Test: the password is prompted from stdin when the flag is omitted.
#[tokio::test]
async fn test_login_prompts_for_password() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users/login/"))
        .and(body_json(
            serde_json::json!({"username": "nia", "password": "hunter2"}),
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"access": "A1", "refresh": "R1"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/user/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"id": 1, "username": "nia", "email": "nia@example.com"}),
        ))
        .mount(&server)
        .await;

    cargo_bin_cmd!("redraft")
        .env("REDRAFT_HOME", home.path())
        .env("REDRAFT_BASE_URL", server.uri())
        .args(["login", "--username", "nia"])
        .write_stdin("hunter2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as nia"));
}

/// Test: logout clears the stored session even if the server errors.
#[tokio::test]
async fn test_logout_clears_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;
    write_session(&home, "A1", "R1");

    Mock::given(method("POST"))
        .and(path("/api/users/logout/"))
        .and(header("Authorization", "Bearer A1"))
        .and(body_json(serde_json::json!({"refresh": "R1"})))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("redraft")
        .env("REDRAFT_HOME", home.path())
        .env("REDRAFT_BASE_URL", server.uri())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));

    assert!(!home.path().join("session.json").exists());
}

/// Test: logout when not logged in says so and succeeds.
#[tokio::test]
async fn test_logout_when_not_logged_in() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;

    cargo_bin_cmd!("redraft")
        .env("REDRAFT_HOME", home.path())
        .env("REDRAFT_BASE_URL", server.uri())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

/// Test: session.json has restricted permissions on Unix.
#[cfg(unix)]
#[tokio::test]
async fn test_session_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/users/login/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"access": "A1", "refresh": "R1"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/user/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({"id": 1, "username": "nia", "email": "nia@example.com"}),
        ))
        .mount(&server)
        .await;

    cargo_bin_cmd!("redraft")
        .env("REDRAFT_HOME", home.path())
        .env("REDRAFT_BASE_URL", server.uri())
        .args(["login", "--username", "nia", "--password", "hunter2"])
        .assert()
        .success();

    let mode = fs::metadata(home.path().join("session.json"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600, "session.json should have 0600 permissions");
}

/// Test: an authenticated command with no session fails fast.
#[tokio::test]
async fn test_command_without_session_fails_fast() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    cargo_bin_cmd!("redraft")
        .env("REDRAFT_HOME", home.path())
        .env("REDRAFT_BASE_URL", server.uri())
        .args(["posts", "fetched"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no authentication token found"));
}

/// Test: an expired session that cannot be refreshed is torn down once,
/// with the login hint carrying the return destination.
#[tokio::test]
async fn test_expired_session_is_torn_down() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;
    write_session(&home, "A1", "R1");

    Mock::given(method("GET"))
        .and(path("/api/fetched"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/users/token/refresh/"))
        .and(body_json(serde_json::json!({"refresh": "R1"})))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("redraft")
        .env("REDRAFT_HOME", home.path())
        .env("REDRAFT_BASE_URL", server.uri())
        .args(["posts", "fetched"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Session expired"))
        .stderr(predicate::str::contains("redraft login"))
        .stderr(predicate::str::contains("returnUrl=%2Ffetched-posts"));

    assert!(!home.path().join("session.json").exists());
}

/// Test: a 401 recovered by refresh is invisible to the user.
#[tokio::test]
async fn test_refresh_recovers_transparently() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;
    write_session(&home, "A1", "R1");

    Mock::given(method("GET"))
        .and(path("/api/fetched"))
        .and(header("Authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/users/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"access": "A2"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/fetched"))
        .and(header("Authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 7, "title": "Baking rye bread", "source": "https://blog.example/rye",
             "created_at": "2025-03-01T08:30:00Z", "user": 3},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("redraft")
        .env("REDRAFT_HOME", home.path())
        .env("REDRAFT_BASE_URL", server.uri())
        .args(["posts", "fetched"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Baking rye bread"))
        .stderr(predicate::str::contains("Session expired").not());

    // The refreshed access token is persisted, the refresh token kept.
    let session = fs::read_to_string(home.path().join("session.json")).unwrap();
    assert!(session.contains("A2"));
    assert!(session.contains("R1"));
}
