// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Wire-format tests for the hosted search client against a one-shot
//! loopback HTTP/1.1 server.

use askbox_config::SearchConfig;
use askbox_search::{SearchAugmenter, SearchError, SerpApiSearch};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Accept one GET request, send back `status` + `resp_body`, and report the
/// request target (path plus query string).
async fn mock_server_once(
    status: u16,
    resp_body: &'static str,
) -> (u16, tokio::sync::oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = tokio::sync::oneshot::channel::<String>();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let mut request_line = String::new();
        reader.read_line(&mut request_line).await.unwrap();
        let target = request_line.split(' ').nth(1).unwrap_or("").to_string();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            if line.trim().is_empty() {
                break;
            }
        }
        let _ = tx.send(target);

        let http_resp = format!(
            "HTTP/1.1 {status} OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            resp_body.len(),
            resp_body,
        );
        let _ = write_half.write_all(http_resp.as_bytes()).await;
    });

    (port, rx)
}

fn client_for(port: u16) -> SerpApiSearch {
    SerpApiSearch::from_config(&SearchConfig {
        base_url: format!("http://127.0.0.1:{port}"),
        api_key: Some("serp-test".into()),
        ..SearchConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn query_is_url_encoded_with_engine_and_key() {
    let (port, target_rx) = mock_server_once(200, r#"{"organic_results":[]}"#).await;
    client_for(port).search("rust & tokio?").await.unwrap();

    let target = target_rx.await.unwrap();
    assert!(target.starts_with("/search.json?"), "target: {target}");
    assert!(target.contains("q=rust+%26+tokio%3F"), "target: {target}");
    assert!(target.contains("engine=google"));
    assert!(target.contains("api_key=serp-test"));
}

#[tokio::test]
async fn decodes_answer_and_results() {
    let (port, _rx) = mock_server_once(
        200,
        r#"{"knowledge_graph":{"description":"Capital of France."},
            "organic_results":[{"title":"Paris","snippet":"City","link":"https://paris.example"}]}"#,
    )
    .await;
    let out = client_for(port).search("paris").await.unwrap();
    assert_eq!(out.direct_answer.as_deref(), Some("Capital of France."));
    assert_eq!(out.results.len(), 1);
    assert_eq!(out.results[0].link, "https://paris.example");
}

#[tokio::test]
async fn non_success_status_fails() {
    let (port, _rx) = mock_server_once(401, r#"{"error":"Invalid API key."}"#).await;
    assert_eq!(client_for(port).search("x").await, Err(SearchError::Status(401)));
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let (port, _rx) = mock_server_once(200, "<html>oops</html>").await;
    assert!(matches!(client_for(port).search("x").await, Err(SearchError::Decode(_))));
}
