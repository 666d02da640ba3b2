//! Wire-level coverage for `ApiClient` against a stub HTTP server.
#![expect(clippy::expect_used, reason = "tests fail fast on broken fixtures")]

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use admin_client::domain::ports::KeyValueStore;
use admin_client::domain::{ErrorCode, LEGACY_TOKEN_KEY, TOKEN_KEY, TokenStore};
use admin_client::outbound::http::{ApiClient, RequestOptions};
use admin_client::outbound::storage::MemoryStore;
use admin_client::session::ClientSignal;
use reqwest::Client;
use rstest::rstest;
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    server: MockServer,
    durable: Arc<MemoryStore>,
    session: Arc<MemoryStore>,
    tokens: Arc<TokenStore>,
    client: ApiClient,
}

async fn harness() -> Harness {
    let server = MockServer::start().await;
    let durable = Arc::new(MemoryStore::new());
    let session = Arc::new(MemoryStore::new());
    let tokens = Arc::new(TokenStore::new(durable.clone(), session.clone()));
    let client = ApiClient::with_client(Client::new(), server.uri(), tokens.clone());
    Harness {
        server,
        durable,
        session,
        tokens,
        client,
    }
}

async fn only_request(server: &MockServer) -> wiremock::Request {
    let mut requests = server
        .received_requests()
        .await
        .expect("request recording enabled");
    assert_eq!(requests.len(), 1, "expected exactly one request");
    requests.remove(0)
}

fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

#[rstest]
#[tokio::test]
async fn get_decodes_json_and_sends_credential() {
    let h = harness().await;
    h.tokens.write("abc123", true).expect("store credential");
    Mock::given(method("GET"))
        .and(path("/forms/"))
        .and(header("authorization", "Token abc123"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "forms": [1, 2] })))
        .expect(1)
        .mount(&h.server)
        .await;

    let body = h
        .client
        .get("/forms/", RequestOptions::new())
        .await
        .expect("request succeeds");
    assert_eq!(body, Some(json!({ "forms": [1, 2] })));
}

#[rstest]
#[tokio::test]
async fn requests_without_credential_omit_authorization() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/public/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&h.server)
        .await;

    h.client
        .get("/public/", RequestOptions::new())
        .await
        .expect("request succeeds");
    let request = only_request(&h.server).await;
    assert!(request.headers.get("authorization").is_none());
}

#[rstest]
#[tokio::test]
async fn session_credential_is_used_when_no_durable_one_exists() {
    let h = harness().await;
    h.tokens.write("session-only", false).expect("store credential");
    Mock::given(method("GET"))
        .and(header("authorization", "Token session-only"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&h.server)
        .await;

    let body = h
        .client
        .get("/ping/", RequestOptions::new())
        .await
        .expect("request succeeds");
    assert_eq!(body, None);
}

#[rstest]
#[tokio::test]
async fn stored_credential_overrides_caller_authorization() {
    let h = harness().await;
    h.tokens.write("stored", true).expect("store credential");
    Mock::given(method("GET"))
        .and(header("authorization", "Token stored"))
        .and(header("x-request-id", "r-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&h.server)
        .await;

    let options = RequestOptions::new()
        .header("Authorization", "Bearer caller")
        .header("X-Request-Id", "r-1");
    h.client
        .get("/forms/", options)
        .await
        .expect("request succeeds");
}

#[rstest]
#[tokio::test]
async fn post_and_put_send_json_bodies() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/forms/"))
        .and(body_json(json!({ "name": "Survey" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 7 })))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/forms/7/"))
        .and(body_json(json!({ "name": "Renamed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 7 })))
        .expect(1)
        .mount(&h.server)
        .await;

    let created = h
        .client
        .post("/forms/", &json!({ "name": "Survey" }), RequestOptions::new())
        .await
        .expect("post succeeds");
    assert_eq!(created, Some(json!({ "id": 7 })));

    let updated = h
        .client
        .put("/forms/7/", &json!({ "name": "Renamed" }), RequestOptions::new())
        .await
        .expect("put succeeds");
    assert_eq!(updated, Some(json!({ "id": 7 })));
}

#[rstest]
#[case(ResponseTemplate::new(200).set_body_string("plain text"))]
#[case(ResponseTemplate::new(200).set_body_raw("{not json", "application/json"))]
#[case(ResponseTemplate::new(200).set_body_raw("null", "application/json"))]
#[tokio::test]
async fn non_json_success_bodies_yield_none(#[case] response: ResponseTemplate) {
    let h = harness().await;
    Mock::given(method("GET"))
        .respond_with(response)
        .mount(&h.server)
        .await;

    let body = h
        .client
        .get("/export/", RequestOptions::new())
        .await
        .expect("request succeeds");
    assert_eq!(body, None);
}

#[rstest]
#[tokio::test]
async fn content_type_with_charset_is_json() {
    let h = harness().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"ok":true}"#, "application/json; charset=utf-8"),
        )
        .mount(&h.server)
        .await;

    let body = h
        .client
        .get("/forms/", RequestOptions::new())
        .await
        .expect("request succeeds");
    assert_eq!(body, Some(json!({ "ok": true })));
}

#[rstest]
#[tokio::test]
async fn unauthorized_clears_credentials_and_signals() {
    let h = harness().await;
    h.tokens.write("stale", true).expect("store durable credential");
    h.tokens.write("stale", false).expect("store session credential");
    h.durable
        .set(LEGACY_TOKEN_KEY, "older")
        .expect("seed legacy credential");
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": "authentication_failed", "message": "Invalid token." }
        })))
        .mount(&h.server)
        .await;

    let failure = h
        .client
        .get("/dashboard/", RequestOptions::new())
        .await
        .expect_err("401 is a failure");

    assert_eq!(failure.signal(), Some(ClientSignal::Unauthorized));
    assert_eq!(failure.error().code(), &ErrorCode::AuthenticationFailed);
    assert_eq!(failure.error().message(), "Invalid token.");
    assert_eq!(failure.error().status(), 401);
    assert!(h.tokens.read().is_none());
    for store in [&h.durable, &h.session] {
        assert_eq!(store.get(TOKEN_KEY).expect("get"), None);
        assert_eq!(store.get(LEGACY_TOKEN_KEY).expect("get"), None);
    }
}

#[rstest]
#[tokio::test]
async fn other_failures_keep_credentials_and_carry_no_signal() {
    let h = harness().await;
    h.tokens.write("valid", true).expect("store credential");
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": "forbidden", "message": "Admins only" }
        })))
        .mount(&h.server)
        .await;

    let failure = h
        .client
        .get("/admin/", RequestOptions::new())
        .await
        .expect_err("403 is a failure");
    assert_eq!(failure.signal(), None);
    assert_eq!(failure.error().code(), &ErrorCode::Forbidden);
    assert!(h.tokens.read().is_some());
}

#[rstest]
#[tokio::test]
async fn field_errors_are_normalized() {
    let h = harness().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "mobile": ["This field is required."] })),
        )
        .mount(&h.server)
        .await;

    let failure = h
        .client
        .post("/users/", &json!({}), RequestOptions::new())
        .await
        .expect_err("400 is a failure");
    let error = failure.into_error();
    assert_eq!(error.code(), &ErrorCode::ValidationError);
    assert_eq!(
        error.details().get("mobile"),
        Some(&vec!["This field is required.".to_owned()])
    );
}

#[rstest]
#[tokio::test]
async fn html_error_pages_are_parse_errors() {
    let h = harness().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<h1>Server Error</h1>"))
        .mount(&h.server)
        .await;

    let failure = h
        .client
        .get("/forms/", RequestOptions::new())
        .await
        .expect_err("500 is a failure");
    assert_eq!(failure.error().code(), &ErrorCode::ParseError);
    assert_eq!(failure.error().message(), "HTTP 500: Internal Server Error");
}

#[rstest]
#[tokio::test]
async fn unreachable_servers_are_network_errors() {
    let tokens = Arc::new(TokenStore::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
    ));
    let client = ApiClient::with_client(Client::new(), closed_port_url(), tokens);

    let failure = client
        .get("/forms/", RequestOptions::new())
        .await
        .expect_err("nothing is listening");
    assert_eq!(failure.error().code(), &ErrorCode::NetworkError);
    assert_eq!(failure.error().status(), 0);
    assert!(!failure.error().message().is_empty());
    assert_eq!(failure.signal(), None);
}

/// Serve one connection with a fixed raw HTTP/1.1 response.
fn raw_response_server(response: &'static str) -> (String, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept connection");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
        let mut line = String::new();
        while reader.read_line(&mut line).expect("read request") > 2 {
            line.clear();
        }
        stream
            .write_all(response.as_bytes())
            .expect("write response");
    });
    (format!("http://{addr}"), handle)
}

#[rstest]
#[tokio::test]
async fn server_reason_phrase_is_kept_in_parse_errors() {
    let (base_url, server) = raw_response_server(
        "HTTP/1.1 520 Origin Error\r\ncontent-length: 4\r\nconnection: close\r\n\r\noops",
    );
    let tokens = Arc::new(TokenStore::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
    ));
    let client = ApiClient::with_client(Client::new(), base_url, tokens);

    let failure = client
        .get("/forms/", RequestOptions::new())
        .await
        .expect_err("non-2xx status");
    server.join().expect("server thread");
    assert_eq!(failure.error().code(), &ErrorCode::ParseError);
    assert_eq!(failure.error().status(), 520);
    assert_eq!(failure.error().message(), "HTTP 520: Origin Error");
}

#[derive(Debug, Deserialize, PartialEq)]
struct Form {
    id: u32,
    name: String,
}

#[rstest]
#[tokio::test]
async fn get_json_decodes_typed_bodies() {
    let h = harness().await;
    Mock::given(method("GET"))
        .and(path("/forms/7/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 7, "name": "Survey" })))
        .mount(&h.server)
        .await;

    let form: Form = h.client.get_json("/forms/7/").await.expect("decodes");
    assert_eq!(
        form,
        Form {
            id: 7,
            name: "Survey".to_owned()
        }
    );
}

#[rstest]
#[tokio::test]
async fn get_json_reports_shape_mismatch_as_parse_error() {
    let h = harness().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "seven" })))
        .mount(&h.server)
        .await;

    let failure = h
        .client
        .get_json::<Form>("/forms/7/")
        .await
        .expect_err("shape mismatch");
    assert_eq!(failure.error().code(), &ErrorCode::ParseError);
    assert_eq!(failure.error().status(), 200);
}

#[rstest]
#[tokio::test]
async fn raw_request_returns_the_response() {
    let h = harness().await;
    Mock::given(method("DELETE"))
        .and(path("/forms/7/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&h.server)
        .await;

    let response = h
        .client
        .request(
            "/forms/7/",
            RequestOptions::new().method(reqwest::Method::DELETE),
        )
        .await
        .expect("delete succeeds");
    assert_eq!(response.status().as_u16(), 204);
}
