//! Link discovery against a mock HTTP server

use scroll_scribe::config::FetchConfig;
use scroll_scribe::discovery::{read_urls_from_file, save_links, LinkDiscoverer};
use scroll_scribe::fetch::HttpFetcher;
use scroll_scribe::{ScribeError, UrlError};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn discoverer() -> LinkDiscoverer {
    let config = FetchConfig {
        timeout_ms: 5_000,
        ..FetchConfig::default()
    };
    let fetcher = Arc::new(HttpFetcher::new(&config).expect("client builds"));
    LinkDiscoverer::new(fetcher, config)
}

async fn serve_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_discovery_filters_fragments_externals_and_duplicates() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve_html(
        &server,
        "/",
        format!(
            r##"<html><body>
                <a href="/a">A</a>
                <a href="/a#frag">A again</a>
                <a href="http://other.com/x">Elsewhere</a>
                <a href="{base}/a">A absolute</a>
                <a href="#justfrag">Jump</a>
                <a href="">Empty</a>
            </body></html>"##
        ),
    )
    .await;

    let links = discoverer().discover(&format!("{}/", base)).await.unwrap();

    assert_eq!(links, vec![format!("{}/a", base)]);
}

#[tokio::test]
async fn test_discovery_keeps_document_order() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve_html(
        &server,
        "/docs/",
        r#"<html><body>
            <nav><a href="/docs/">Docs home</a><a href="install">Install</a></nav>
            <a href="usage">Usage</a>
            <a href="../blog/">Blog</a>
            <a href="install">Install again</a>
            <a href="mailto:team@example.com">Mail</a>
        </body></html>"#
            .to_string(),
    )
    .await;

    let links = discoverer()
        .discover(&format!("{}/docs/", base))
        .await
        .unwrap();

    assert_eq!(
        links,
        vec![
            format!("{}/docs/install", base),
            format!("{}/docs/usage", base),
            format!("{}/blog/", base),
        ]
    );
}

#[tokio::test]
async fn test_page_without_links() {
    let server = MockServer::start().await;
    serve_html(&server, "/", "<html><body><p>Nothing here</p></body></html>".to_string()).await;

    let links = discoverer().discover(&server.uri()).await.unwrap();
    assert!(links.is_empty());
}

#[tokio::test]
async fn test_malformed_start_url_fails_fast() {
    let error = discoverer().discover("://missing-scheme").await.unwrap_err();
    assert!(matches!(error, ScribeError::Url(UrlError::Parse { .. })));
}

#[tokio::test]
async fn test_discovered_links_round_trip_through_file() {
    let server = MockServer::start().await;
    let base = server.uri();
    serve_html(
        &server,
        "/",
        r#"<a href="/z">Z</a><a href="/a">A</a>"#.to_string(),
    )
    .await;

    let links = discoverer().discover(&base).await.unwrap();
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("links.txt");

    save_links(&links, &file).unwrap();

    assert_eq!(read_urls_from_file(&file).unwrap(), links);
    assert_eq!(links[0], format!("{}/z", base));
}
