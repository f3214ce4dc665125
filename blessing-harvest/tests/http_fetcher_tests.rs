//! HttpFetcher against a local HTTP listener

use blessing_harvest::config::HttpConfig;
use blessing_harvest::services::HttpFetcher;
use blessing_harvest::types::{FetchError, PageFetcher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const BLESSING: &str = "祝您新春快乐万事如意";

/// Serve `body` with `content_type` to every connection, counting requests
async fn serve(content_type: &'static str, status: &'static str, body: Vec<u8>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&requests);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            let body = body.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let head = format!(
                    "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    content_type,
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{}/page", addr), requests)
}

fn gbk(text: &str) -> Vec<u8> {
    let (bytes, _, _) = encoding_rs::GBK.encode(text);
    bytes.into_owned()
}

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(&HttpConfig::default()).unwrap()
}

#[tokio::test]
async fn test_unlabelled_gbk_page_is_decoded() {
    // Given: GBK bytes with no charset anywhere
    let (url, requests) = serve("text/html", "200 OK", gbk(&format!("<p>{}</p>", BLESSING))).await;

    // When
    let body = fetcher().fetch(&url).await.unwrap();

    // Then
    assert!(body.contains(BLESSING), "decoded as {:?}", body);
    assert_eq!(requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_meta_charset_page_is_fetched_once() {
    // Given: GBK bytes labelled only by a <meta> tag
    let html = format!(
        r#"<html><head><meta charset="gbk"></head><body><p>{}</p></body></html>"#,
        BLESSING
    );
    let (url, requests) = serve("text/html", "200 OK", gbk(&html)).await;

    // When
    let body = fetcher().fetch(&url).await.unwrap();

    // Then
    assert!(body.contains(BLESSING));
    assert_eq!(requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_declared_charset_in_header_is_honoured() {
    let (url, _) = serve("text/html; Charset=GB2312", "200 OK", gbk(BLESSING)).await;

    let body = fetcher().fetch(&url).await.unwrap();

    assert_eq!(body, BLESSING);
}

#[tokio::test]
async fn test_rate_limit_status_is_blocked() {
    let (url, _) = serve("text/html", "429 Too Many Requests", Vec::new()).await;

    let result = fetcher().fetch(&url).await;

    assert!(matches!(result, Err(FetchError::Blocked)));
}
