//! Integration tests for the source collectors using wiremock HTTP mocks.

use std::time::Duration;

use chrono::Utc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trendwatch_sources::collect::{collect_keywords, CollectOptions};
use trendwatch_sources::{BingNewsSource, GoogleNewsSource, MentionSource, RedditSource};

fn rss_body(titles: &[&str]) -> String {
    let items: String = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            format!(
                "<item><title>{title}</title><link>https://example.com/{i}/{}</link>\
                 <description>{title} in the news.</description></item>",
                title.replace(' ', "-").to_lowercase()
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel>{items}</channel></rss>"#
    )
}

fn reddit_body(titles: &[&str]) -> serde_json::Value {
    let children: Vec<serde_json::Value> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            serde_json::json!({
                "data": {
                    "title": title,
                    "selftext": "discussion thread",
                    "permalink": format!("/r/kpop/comments/{i}/post"),
                    "created_utc": 1_756_000_000.0
                }
            })
        })
        .collect();
    serde_json::json!({ "data": { "children": children } })
}

fn sources_against(server_uri: &str) -> Vec<MentionSource> {
    let client = reqwest::Client::new();
    vec![
        MentionSource::GoogleNews(GoogleNewsSource::with_base_url(client.clone(), server_uri)),
        MentionSource::BingNews(BingNewsSource::with_base_url(client.clone(), server_uri)),
        MentionSource::Reddit(RedditSource::with_base_url(client, server_uri)),
    ]
}

fn options() -> CollectOptions {
    CollectOptions {
        fetch_timeout: Duration::from_secs(2),
        max_concurrent_keywords: 2,
    }
}

#[tokio::test]
async fn collects_from_all_sources_for_a_keyword() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rss/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss_body(&["Huntrix debut"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/news/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss_body(&["Huntrix single"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reddit_body(&["Huntrix thread"])))
        .mount(&server)
        .await;

    let sources = sources_against(&server.uri());
    let keywords = vec!["Huntrix".to_string()];
    let result = collect_keywords(&sources, &keywords, options(), Utc::now()).await;

    assert_eq!(result.records.len(), 3, "one record per source");
    assert!(result.failed_sources.is_empty());
    let total: u64 = result.records.iter().map(|r| r.count).sum();
    assert_eq!(total, 3);

    let samples = result.samples.get("huntrix").expect("samples keyed by canonical keyword");
    assert_eq!(samples.len(), 3);
}

#[tokio::test]
async fn one_failing_source_does_not_abort_the_cycle() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rss/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss_body(&["BTS tour", "BTS album"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/news/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reddit_body(&["BTS thread"])))
        .mount(&server)
        .await;

    let sources = sources_against(&server.uri());
    let keywords = vec!["BTS".to_string()];
    let result = collect_keywords(&sources, &keywords, options(), Utc::now()).await;

    assert_eq!(result.records.len(), 2, "two healthy sources still contribute");
    assert_eq!(result.failed_sources, vec!["bing_news"]);
    assert!(result
        .records
        .iter()
        .all(|r| r.source == "google_news" || r.source == "reddit"));
}

#[tokio::test]
async fn slow_source_times_out_and_is_reported_as_failed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rss/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(rss_body(&["aespa comeback"]))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/news/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss_body(&["aespa news"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reddit_body(&["aespa thread"])))
        .mount(&server)
        .await;

    let sources = sources_against(&server.uri());
    let keywords = vec!["aespa".to_string()];
    let opts = CollectOptions {
        fetch_timeout: Duration::from_millis(500),
        max_concurrent_keywords: 1,
    };
    let result = collect_keywords(&sources, &keywords, opts, Utc::now()).await;

    assert_eq!(result.failed_sources, vec!["google_news"]);
    assert_eq!(result.records.len(), 2);
}

#[tokio::test]
async fn google_news_query_carries_the_keyword() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rss/search"))
        .and(query_param("q", "new jeans"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss_body(&["New Jeans"])))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let sources = vec![MentionSource::GoogleNews(GoogleNewsSource::with_base_url(
        client,
        &server.uri(),
    ))];
    let keywords = vec!["new jeans".to_string()];
    let result = collect_keywords(&sources, &keywords, options(), Utc::now()).await;

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].keyword, "new jeans");
}

#[tokio::test]
async fn duplicate_urls_within_a_source_are_counted_once() {
    let server = MockServer::start().await;

    let duplicated = r#"<?xml version="1.0"?><rss version="2.0"><channel>
        <item><title>IVE event</title><link>https://example.com/same</link></item>
        <item><title>IVE event repost</title><link>https://example.com/same</link></item>
    </channel></rss>"#;

    Mock::given(method("GET"))
        .and(path("/rss/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(duplicated))
        .mount(&server)
        .await;

    let client = reqwest::Client::new();
    let sources = vec![MentionSource::GoogleNews(GoogleNewsSource::with_base_url(
        client,
        &server.uri(),
    ))];
    let keywords = vec!["IVE".to_string()];
    let result = collect_keywords(&sources, &keywords, options(), Utc::now()).await;

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].count, 1, "duplicate URL folded away");
}
