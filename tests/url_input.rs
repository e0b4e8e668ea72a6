//! URL input channel against a local HTTP server.

#![cfg(feature = "server")]

mod common;

use axum::http::header::CONTENT_TYPE;
use axum::routing::get;
use axum::Router;
use common::*;
use edgequake_ocr::{InputSource, OcrError, ServiceConfig, SourceFormat, SourceResolver};
use std::net::SocketAddr;
use std::time::Duration;

async fn spawn_fixture_server() -> SocketAddr {
    let app = Router::new()
        .route(
            "/scan.png",
            get(|| async { ([(CONTENT_TYPE, "image/png")], png_bytes()) }),
        )
        .route(
            "/download",
            get(|| async { ([(CONTENT_TYPE, "text/plain")], two_page_pdf()) }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn image_url_end_to_end() {
    let addr = spawn_fixture_server().await;
    let svc = service(CONTRACT_LINES);
    let url = format!("http://{addr}/scan.png");

    let resp = svc
        .extract_markdown(InputSource::Url(url.clone()), Some("fr"))
        .await
        .unwrap();
    assert_eq!(resp.source, url);
    assert_eq!(resp.page_count, 1);
    assert!(!resp.is_pdf);
    assert_eq!(resp.structure_stats.h1_count, 1);
}

#[tokio::test]
async fn not_found_is_fetch_error() {
    let addr = spawn_fixture_server().await;
    let svc = service(CONTRACT_LINES);
    let err = svc
        .extract_text(InputSource::Url(format!("http://{addr}/missing.png")), None)
        .await
        .unwrap_err();
    match err {
        OcrError::FetchError { reason, .. } => assert!(reason.contains("404"), "{reason}"),
        other => panic!("expected FetchError, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_host_is_fetch_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = {
        let l = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        l.local_addr().unwrap()
    };
    let resolver = SourceResolver::new(&ServiceConfig::default()).unwrap();
    let err = resolver
        .fetch(&format!("http://{addr}/x.png"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "FetchError");
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn non_http_scheme_is_rejected() {
    let svc = service(CONTRACT_LINES);
    let err = svc
        .extract_text(InputSource::Url("ftp://example.com/scan.png".into()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, OcrError::InvalidInput { .. }));
    assert!(err.is_client_error());
}

#[tokio::test]
async fn pdf_detected_by_magic_despite_content_type() {
    let addr = spawn_fixture_server().await;
    let resolver = SourceResolver::new(&ServiceConfig::default()).unwrap();
    let fetched = resolver
        .fetch(&format!("http://{addr}/download"))
        .await
        .unwrap();
    assert_eq!(fetched.content_type.as_deref(), Some("text/plain"));
    assert_eq!(fetched.filename, None, "no extension, no filename");
    assert_eq!(fetched.format(), SourceFormat::Pdf);

    if !pdfium_enabled() {
        println!("SKIP — set PDFIUM_TESTS=1 to rasterise the fetched PDF");
        return;
    }
    let mut builder = ServiceConfig::builder().dpi(72);
    if let Ok(dir) = std::env::var("PDFIUM_LIB_PATH") {
        builder = builder.pdfium_lib_path(dir);
    }
    let (svc, _) = service_with(&[("Texte", 0.9)], builder.build().unwrap());
    let resp = svc
        .extract_markdown(InputSource::Url(format!("http://{addr}/download")), None)
        .await
        .unwrap();
    assert!(resp.is_pdf);
    assert_eq!(resp.page_count, 2);
    assert_eq!(resp.text.matches("---").count(), 1);
}

#[tokio::test]
async fn slow_download_times_out() {
    let addr = spawn_fixture_server().await;
    let config = ServiceConfig::builder()
        .download_timeout_secs(1)
        .build()
        .unwrap();
    let resolver = SourceResolver::new(&config).unwrap();
    let err = resolver
        .fetch(&format!("http://{addr}/slow"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, OcrError::FetchTimeout { secs: 1, .. }),
        "got {err:?}"
    );
    assert_eq!(err.kind(), "FetchError");
}
