//! End-to-end tests over real HTTP using wiremock and the reqwest client.

mod helpers;

use favicon_extract::{
    aggregate, download, from_url, init_client, Config, DownloadOptions, FetchFailureKind,
    ImageFormat, InvalidReason, SourceKind,
};
use helpers::{encode_image, favicon, svg};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount(server: &MockServer, at: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(template)
        .mount(server)
        .await;
}

fn image_response(body: Vec<u8>, mime: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, mime)
}

#[tokio::test]
async fn test_from_url_discovers_and_download_validates() {
    let server = MockServer::start().await;
    let page = r#"<!doctype html><html><head>
        <link rel="icon" type="image/png" sizes="32x32" href="/icons/favicon-32.png">
        <link rel="apple-touch-icon" href="/icons/apple-touch-icon.png">
        <link rel="icon" href="/icons/logo.svg">
        <link rel="manifest" href="/site.webmanifest">
    </head><body>hello</body></html>"#;
    let manifest = r#"{"icons": [{"src": "/icons/android-192.png", "sizes": "192x192", "type": "image/png"}]}"#;

    mount(&server, "/", ResponseTemplate::new(200).set_body_raw(page, "text/html")).await;
    mount(
        &server,
        "/site.webmanifest",
        ResponseTemplate::new(200).set_body_raw(manifest, "application/manifest+json"),
    )
    .await;
    mount(
        &server,
        "/icons/favicon-32.png",
        image_response(encode_image(32, 32, image::ImageFormat::Png), "image/png"),
    )
    .await;
    mount(
        &server,
        "/icons/apple-touch-icon.png",
        image_response(encode_image(180, 180, image::ImageFormat::Png), "image/png"),
    )
    .await;
    mount(
        &server,
        "/icons/android-192.png",
        image_response(encode_image(192, 192, image::ImageFormat::Png), "image/png"),
    )
    .await;
    mount(&server, "/icons/logo.svg", image_response(svg(900, 600), "image/svg+xml")).await;
    // Every fallback path other than the ones above answers 404

    let config = Config {
        resolve_manifests: true,
        ..Default::default()
    };
    let client = init_client(&config).expect("client builds");

    let favicons = from_url(&client, &server.uri(), &config)
        .await
        .expect("valid url");
    assert_eq!(favicons[0].absolute_url, format!("{}/icons/favicon-32.png", server.uri()));
    assert!(favicons
        .iter()
        .any(|f| f.source_kind == SourceKind::ManifestIcon && f.width == 192));
    assert!(!favicons.iter().any(|f| f.is_manifest_marker()));
    assert!(favicons.iter().any(|f| f.source_kind == SourceKind::Fallback));

    let results = download(&client, &favicons, &config.download_options())
        .await
        .expect("valid concurrency");
    assert_eq!(results.len(), favicons.len());

    let ranked = aggregate(results);
    let valid: Vec<_> = ranked.iter().filter(|r| r.valid).collect();
    let sizes: Vec<(u32, u32)> = valid.iter().map(|r| (r.width, r.height)).collect();
    assert_eq!(sizes, vec![(900, 600), (192, 192), (180, 180), (32, 32)]);
    assert_eq!(valid[0].format, ImageFormat::Svg);

    // Only the conventional fallback paths are missing on this site
    for record in ranked.iter().filter(|r| !r.valid) {
        assert_eq!(record.original.source_kind, SourceKind::Fallback);
        assert_eq!(record.invalid_reason, Some(InvalidReason::Unreachable(404)));
    }
}

#[tokio::test]
async fn test_from_url_uses_final_url_as_base() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        ResponseTemplate::new(301).insert_header("Location", format!("{}/en/home", server.uri())),
    )
    .await;
    mount(
        &server,
        "/en/home",
        ResponseTemplate::new(200)
            .set_body_raw(r#"<link rel="icon" href="img/icon.png">"#, "text/html"),
    )
    .await;

    let config = Config::default();
    let client = init_client(&config).expect("client builds");
    let favicons = from_url(&client, &server.uri(), &config)
        .await
        .expect("valid url");
    assert_eq!(favicons[0].absolute_url, format!("{}/en/img/icon.png", server.uri()));
}

#[tokio::test]
async fn test_from_url_unreachable_page_is_empty() {
    let server = MockServer::start().await;
    mount(&server, "/", ResponseTemplate::new(503)).await;

    let config = Config::default();
    let client = init_client(&config).expect("client builds");
    let favicons = from_url(&client, &server.uri(), &config)
        .await
        .expect("unreachable page is not an error");
    assert!(favicons.is_empty());
}

#[tokio::test]
async fn test_download_follows_redirects() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/favicon.ico",
        ResponseTemplate::new(302)
            .insert_header("Location", format!("{}/static/favicon.ico", server.uri())),
    )
    .await;
    mount(
        &server,
        "/static/favicon.ico",
        image_response(encode_image(48, 48, image::ImageFormat::Ico), "image/x-icon"),
    )
    .await;

    let client = init_client(&Config::default()).expect("client builds");
    let requested = format!("{}/favicon.ico", server.uri());
    let results = download(&client, &[favicon(&requested)], &DownloadOptions::default())
        .await
        .expect("valid concurrency");

    let record = &results[0];
    assert!(record.valid, "{:?}", record.invalid_reason);
    assert!(record.url.redirected);
    assert_eq!(record.url.requested_url, requested);
    assert_eq!(record.url.final_url, format!("{}/static/favicon.ico", server.uri()));
    assert_eq!(record.url.status_code, Some(200));
    assert_eq!(record.format, ImageFormat::Ico);
    assert_eq!((record.width, record.height), (48, 48));
}

#[tokio::test]
async fn test_download_probes_large_resources_partially() {
    let server = MockServer::start().await;
    // Trailing padding the prober never needs to read
    let mut body = encode_image(300, 200, image::ImageFormat::Png);
    body.extend(std::iter::repeat(0u8).take(512 * 1024));
    mount(&server, "/big.png", image_response(body, "image/png")).await;

    let client = init_client(&Config::default()).expect("client builds");
    let url = format!("{}/big.png", server.uri());
    let results = download(&client, &[favicon(&url)], &DownloadOptions::default())
        .await
        .expect("valid concurrency");

    assert!(results[0].valid);
    assert_eq!((results[0].width, results[0].height), (300, 200));
    assert!(results[0].image.is_none(), "early stop skips the codec");
}

#[tokio::test]
async fn test_download_html_masquerading_as_icon() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/favicon.ico",
        ResponseTemplate::new(200).set_body_raw("<html><body>Welcome</body></html>", "text/html"),
    )
    .await;

    let client = init_client(&Config::default()).expect("client builds");
    let url = format!("{}/favicon.ico", server.uri());
    let results = download(&client, &[favicon(&url)], &DownloadOptions::default())
        .await
        .expect("valid concurrency");
    assert!(!results[0].valid);
    assert_eq!(results[0].invalid_reason, Some(InvalidReason::UnsupportedImageFormat));
    assert!(results[0].url.reachable);
}

#[tokio::test]
async fn test_download_closed_ports_fail_individually() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/ok.gif",
        image_response(encode_image(500, 200, image::ImageFormat::Gif), "image/gif"),
    )
    .await;

    let client = init_client(&Config::default()).expect("client builds");
    let favicons = vec![
        favicon("http://127.0.0.1:1/favicon.ico"),
        favicon(&format!("{}/ok.gif", server.uri())),
        favicon("http://127.0.0.1:1/apple-touch-icon.png"),
    ];
    let results = download(&client, &favicons, &DownloadOptions::default())
        .await
        .expect("valid concurrency");

    assert_eq!(
        results[0].invalid_reason,
        Some(InvalidReason::FetchFailed(FetchFailureKind::Connect))
    );
    assert!(results[1].valid);
    assert_eq!((results[1].width, results[1].height), (500, 200));
    assert_eq!(
        results[2].invalid_reason,
        Some(InvalidReason::FetchFailed(FetchFailureKind::Connect))
    );
}
