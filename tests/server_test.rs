//! Document server driven through the full axum stack.

use axum::body::Body;
use axum::http::{self, header, StatusCode};
use tower::ServiceExt;

use resource_engine::Shutdown;

mod common;

use common::document_server;

async fn send(server: &resource_engine::HttpServer, request: http::Request<Body>) -> http::Response<Body> {
    server.router().oneshot(request).await.unwrap()
}

fn build(method: &str, uri: &str) -> http::request::Builder {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, "example.com")
}

async fn body_text(response: http::Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_put_then_get() {
    let (server, store) = document_server();

    let response = send(
        &server,
        build("PUT", "/notes/first")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("remember the milk"))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers()[header::LOCATION],
        "http://example.com/notes/first"
    );
    assert_eq!(store.get("/notes/first").unwrap().content, "remember the milk");

    let response = send(
        &server,
        build("GET", "/notes/first")
            .header(header::ACCEPT, "text/plain")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain"
    );
    assert_eq!(body_text(response).await, "remember the milk");

    let response = send(
        &server,
        build("GET", "/notes/first").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["path"], "/notes/first");
    assert_eq!(json["content"], "remember the milk");
}

#[tokio::test]
async fn test_json_put_updates_revision() {
    let (server, store) = document_server();
    store.put("/doc", "old");

    let response = send(
        &server,
        build("PUT", "/doc")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"content":"new"}"#))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.get("/doc").unwrap().content, "new");

    let response = send(
        &server,
        build("PUT", "/doc")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_etag_revalidation() {
    let (server, store) = document_server();
    let doc = store.put("/cached", "stable");
    let etag = format!("\"r{}\"", doc.revision);

    let response = send(&server, build("GET", "/cached").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ETAG], etag.as_str());
    assert!(response.headers().contains_key(header::LAST_MODIFIED));

    let response = send(
        &server,
        build("GET", "/cached")
            .header(header::IF_NONE_MATCH, &etag)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert!(body_text(response).await.is_empty());
}

#[tokio::test]
async fn test_delete_leaves_gone() {
    let (server, store) = document_server();
    store.put("/tmp/scratch", "x");

    let response = send(&server, build("DELETE", "/tmp/scratch").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&server, build("GET", "/tmp/scratch").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::GONE);

    let response = send(&server, build("GET", "/never").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_post_to_collection_creates() {
    let (server, store) = document_server();

    let response = send(
        &server,
        build("POST", "/inbox/")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("hello"))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let location = response.headers()[header::LOCATION].to_str().unwrap();
    let path = location.strip_prefix("http://example.com").unwrap();
    assert!(path.starts_with("/inbox/"));
    assert_eq!(store.get(path).unwrap().content, "hello");

    let response = send(
        &server,
        build("GET", "/inbox/")
            .header(header::ACCEPT, "text/plain")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(body_text(response).await, format!("{path}\n"));
}

#[tokio::test]
async fn test_method_and_path_rules() {
    let (server, _store) = document_server();

    let response = send(&server, build("PUT", "/inbox/").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[header::ALLOW], "GET,HEAD,POST,OPTIONS");

    let response = send(&server, build("GET", "/a/../b").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let (server, store) = document_server();

    let response = send(
        &server,
        build("PUT", "/big")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from(vec![b'a'; 2048]))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(store.get("/big").is_none());
}

#[tokio::test]
async fn test_request_id_propagated() {
    let (server, _store) = document_server();

    let response = send(&server, build("GET", "/").body(Body::empty()).unwrap()).await;
    assert!(response.headers().contains_key("x-request-id"));

    let response = send(
        &server,
        build("GET", "/")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_serves_over_socket() {
    let (server, store) = document_server();
    store.put("/live", "over the wire");

    let listener = server.bind().await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.clone()));

    let response = reqwest::get(format!("http://{addr}/live")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response
        .headers()
        .get("server")
        .is_some_and(|v| v.to_str().unwrap().starts_with("resource-engine/")));
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["content"], "over the wire");

    shutdown.trigger();
    handle.await.unwrap().unwrap();
}
