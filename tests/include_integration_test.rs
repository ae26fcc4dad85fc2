use httpmock::prelude::*;
use scraper::{Html, Selector};
use static_scaffold::domain::model::FragmentOutcome;
use static_scaffold::{Document, FragmentIncluder, HttpFragmentSource};
use std::time::{Duration, Instant};
use url::Url;

fn includer() -> FragmentIncluder {
    FragmentIncluder::new(HttpFragmentSource::new().unwrap())
}

#[tokio::test]
async fn test_includes_are_fetched_concurrently() {
    let server = MockServer::start_async().await;
    let nav = server
        .mock_async(|when, then| {
            when.method(GET).path("/nav.html");
            then.status(200)
                .delay(Duration::from_millis(400))
                .body(r#"<nav><a class="nav-link" href="index.html">Home</a></nav>"#);
        })
        .await;
    let footer = server
        .mock_async(|when, then| {
            when.method(GET).path("/footer.html");
            then.status(200)
                .delay(Duration::from_millis(400))
                .body("<small>footer</small>");
        })
        .await;

    let mut document = Document::parse(concat!(
        "<body>",
        r#"<header data-include="nav"></header>"#,
        r#"<main id="app"></main>"#,
        r#"<footer data-include="/footer"></footer>"#,
        "</body>"
    ));
    let base = Url::parse(&server.url("/index.html")).unwrap();

    let started = Instant::now();
    let report = includer().include_all(&mut document, &base).await;
    let elapsed = started.elapsed();

    nav.assert_async().await;
    footer.assert_async().await;
    assert_eq!(report.injected(), 2);
    assert!(report.is_clean());
    // 兩個 400ms 請求同時發出，總時間應明顯小於 800ms
    assert!(elapsed < Duration::from_millis(750), "took {:?}", elapsed);

    let parsed = Html::parse_document(&document.html());
    let header_nav = Selector::parse("header > nav > a.nav-link").unwrap();
    let footer_small = Selector::parse("footer > small").unwrap();
    assert_eq!(parsed.select(&header_nav).count(), 1);
    assert_eq!(
        parsed.select(&footer_small).next().unwrap().inner_html(),
        "footer"
    );
}

#[tokio::test]
async fn test_failed_include_leaves_diagnostic_and_others_succeed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/docs/sidebar.html");
            then.status(404).body("Not Found");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/docs/nav.html");
            then.status(200).body("<nav>docs</nav>");
        })
        .await;

    let mut document = Document::parse(concat!(
        r#"<div id="nav" data-include="nav.html"></div>"#,
        r#"<aside data-include="sidebar">old</aside>"#,
    ));
    let base = Url::parse(&server.url("/docs/guide.html")).unwrap();

    let report = includer().include_all(&mut document, &base).await;

    assert_eq!(report.injected(), 1);
    assert_eq!(report.failed(), 1);
    let failure = report.first_failure().unwrap();
    assert_eq!(failure.url, server.url("/docs/sidebar.html"));
    assert!(matches!(
        failure.outcome(),
        Some(FragmentOutcome::FailedStatus { status: 404 })
    ));

    let html = document.html();
    assert!(html.contains("<nav>docs</nav>"));
    assert!(html.contains("<!-- include failed: "));
    assert!(html.contains("(404) -->"));
    assert!(!html.contains(">old<"));
}

#[tokio::test]
async fn test_fetch_and_inject_into_named_container() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/footer.html").header("pragma", "no-cache");
            then.status(200).body(r#"<p id="site-year"></p>"#);
        })
        .await;

    let mut document = Document::parse(r#"<body><footer id="footer">loading</footer></body>"#);
    let outcome = includer()
        .fetch_and_inject(&mut document, &server.url("/footer.html"), "#footer")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(outcome, FragmentOutcome::Injected { bytes: 22 });
    assert!(document
        .html()
        .contains(r#"<body><footer id="footer"><p id="site-year"></p></footer></body>"#));
}

#[tokio::test]
async fn test_unreachable_origin_is_reported_not_raised() {
    let mut document = Document::parse(r#"<div data-include="nav"></div>"#);
    let base = Url::parse("http://127.0.0.1:9/index.html").unwrap();

    let report = includer().include_all(&mut document, &base).await;

    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.first_failure().and_then(|r| r.outcome()),
        Some(FragmentOutcome::FailedNetwork { .. })
    ));
    assert!(document.html().contains("<!-- include error: "));
}
