//! Integration tests for the crawl pipeline
//!
//! These tests use wiremock to stand in for real sites and exercise the
//! fetch/decode/classify/pricing flow end-to-end.

use sitescout::config::Config;
use sitescout::limiter::RateLimiter;
use sitescout::pipeline::{Orchestrator, SiteStatus};
use sitescout::pricing::{Confidence, PricingPageSelector};
use sitescout::{FetchOutcome, Fetcher, LinkClassifier, UnavailableReason};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test configuration with politeness delays shrunk to keep tests fast
fn test_config() -> Config {
    let mut config = Config::default();
    config.http.max_retries = 3;
    config.http.retry_delay_secs = 0.05;
    config.http.request_gap_secs = 0.0;
    config.http.domain_gap_secs = 0.0;
    config.rate_limit.requests_per_second = 100;
    config
}

fn test_fetcher(config: &Config) -> Arc<Fetcher> {
    let limiter = Arc::new(RateLimiter::new(&config.rate_limit).unwrap());
    Arc::new(Fetcher::new(&config.http, limiter).unwrap())
}

fn html_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/html; charset=utf-8")
}

#[tokio::test]
async fn test_fetch_and_classify_accounts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><body>
            <a href="https://www.instagram.com/acme_spa">Instagram</a>
            <a href="https://www.facebook.com/AcmeSpa">Facebook</a>
            <a href="/about">About</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    let config = test_config();
    let fetcher = test_fetcher(&config);
    let classifier = LinkClassifier::new(&config.platforms).unwrap();

    let page = fetcher.fetch(&server.uri(), None).await.page().unwrap();
    let accounts = classifier.classify(&page.text, &page.url);

    assert_eq!(accounts["instagram"][0].username, "acme_spa");
    assert_eq!(accounts["facebook"][0].username, "AcmeSpa");
}

#[tokio::test]
async fn test_client_error_is_never_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config();
    let outcome = test_fetcher(&config).fetch(&server.uri(), None).await;

    match outcome {
        FetchOutcome::Unavailable { reason, .. } => {
            assert_eq!(reason, UnavailableReason::HttpStatus(404));
        }
        other => panic!("expected Unavailable, got {:?}", other),
    }
    // expect(1) on the mock verifies no retry happened
}

#[tokio::test]
async fn test_timeout_retried_then_succeeds() {
    let server = MockServer::start().await;

    // First attempt hangs past the request deadline; the mock then stops
    // matching and the fallback below answers the retry.
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            html_response("<html><body>slow</body></html>")
                .set_delay(Duration::from_secs(10)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            "<html><body>recovered after a slow start</body></html>",
        ))
        .mount(&server)
        .await;

    let config = test_config();
    let outcome = test_fetcher(&config)
        .fetch(&server.uri(), Some(Duration::from_millis(500)))
        .await;

    let page = outcome.page().expect("retry should have recovered");
    assert!(page.text.contains("recovered"));
}

#[tokio::test]
async fn test_binary_content_type_rejected_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x89, 0x50, 0x4e, 0x47])
                .insert_header("content-type", "image/png"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config();
    let outcome = test_fetcher(&config).fetch(&server.uri(), None).await;

    match outcome {
        FetchOutcome::Unavailable { reason, .. } => {
            assert_eq!(reason, UnavailableReason::UnusableContentType);
        }
        other => panic!("expected Unavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_garbage_body_reported_undecodable() {
    let server = MockServer::start().await;

    let garbage: Vec<u8> = (0..500).map(|i| (i % 31) as u8).collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(garbage)
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;

    let config = test_config();
    let outcome = test_fetcher(&config).fetch(&server.uri(), None).await;

    match outcome {
        FetchOutcome::Unavailable { reason, .. } => {
            assert_eq!(reason, UnavailableReason::Undecodable);
        }
        other => panic!("expected Unavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_mislabeled_gzip_body_recovered() {
    let server = MockServer::start().await;

    // Gzip body served without a Content-Encoding header: the client cannot
    // decompress it, so the decode fallback chain has to.
    let html = r#"<html><body>
        <a href="https://www.instagram.com/hidden_account">IG</a>
        </body></html>"#;
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(html.as_bytes()).unwrap();
    let compressed = encoder.finish().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(compressed)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let config = test_config();
    let fetcher = test_fetcher(&config);
    let classifier = LinkClassifier::new(&config.platforms).unwrap();

    let page = fetcher.fetch(&server.uri(), None).await.page().unwrap();
    let accounts = classifier.classify(&page.text, &page.url);
    assert_eq!(accounts["instagram"][0].username, "hidden_account");
}

#[tokio::test]
async fn test_pricing_candidate_confirmed_high_confidence() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><body>
            <a href="/pricing">Our Pricing</a>
            <a href="/about-us">About us</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pricing"))
        .respond_with(html_response(
            r#"<html><head><title>Pricing - Acme Spa</title></head>
            <body><p>Swedish massage $99</p><p>Facial from $45</p></body></html>"#,
        ))
        .mount(&server)
        .await;

    let config = test_config();
    let selector = PricingPageSelector::new(test_fetcher(&config), &config.pricing);

    let report = selector.select(&server.uri()).await.unwrap();
    assert_eq!(report.pages.len(), 1);
    assert_eq!(report.pages[0].confidence, Confidence::High);
    assert_eq!(report.pages[0].title, "Pricing - Acme Spa");
    assert!(report.pages[0].url.ends_with("/pricing"));
}

#[tokio::test]
async fn test_pricing_falls_back_to_root_at_low_confidence() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><head><title>Acme Spa</title></head><body>
            <p>All massages are $80 this month</p>
            <a href="/location">Find us</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    let config = test_config();
    let selector = PricingPageSelector::new(test_fetcher(&config), &config.pricing);

    let report = selector.select(&server.uri()).await.unwrap();
    assert_eq!(report.pages.len(), 1);
    assert_eq!(report.pages[0].confidence, Confidence::Low);
    assert_eq!(report.pages[0].title, "Acme Spa");
}

#[tokio::test]
async fn test_unreachable_root_is_a_pricing_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = test_config();
    let selector = PricingPageSelector::new(test_fetcher(&config), &config.pricing);

    assert!(selector.select(&server.uri()).await.is_err());
}

#[tokio::test]
async fn test_orchestrator_contains_per_site_failures() {
    let live = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><body>
            <a href="https://twitter.com/acmespa">Twitter</a>
            </body></html>"#,
        ))
        .mount(&live)
        .await;

    let dead = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&dead)
        .await;

    let orchestrator = Orchestrator::new(test_config(), false).unwrap();
    let seeds = vec![dead.uri(), live.uri()];
    let results = orchestrator.run(&seeds).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].status, SiteStatus::Failed);
    assert_eq!(results[1].status, SiteStatus::Success);
    assert_eq!(results[1].accounts["twitter"][0].username, "acmespa");
}

#[tokio::test]
async fn test_orchestrator_with_pricing_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<html><body>
            <a href="https://www.instagram.com/acme_spa">Instagram</a>
            <a href="/services">Services and rates</a>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/services"))
        .respond_with(html_response(
            r#"<html><head><title>Services</title></head>
            <body><p>Deep tissue massage: $120</p></body></html>"#,
        ))
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(test_config(), true).unwrap();
    let results = orchestrator.run(&[server.uri()]).await;

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.status, SiteStatus::Success);
    assert_eq!(result.accounts["instagram"][0].username, "acme_spa");
    assert_eq!(result.pricing.pages.len(), 1);
    assert!(result.pricing.pages[0].url.ends_with("/services"));
}
