use async_trait::async_trait;
use murmur_common::{FailureKind, ScraperConfig};
use murmur_social::{Pacer, ThreadScraper};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Default)]
struct CountingPacer {
    calls: AtomicUsize,
}

#[async_trait]
impl Pacer for CountingPacer {
    async fn pause(&self, delay: Duration) {
        assert_eq!(delay, Duration::from_millis(1000));
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn scraper_for(server: &MockServer) -> (ThreadScraper, Arc<CountingPacer>) {
    let pacer = Arc::new(CountingPacer::default());
    let cfg = ScraperConfig {
        base_url: server.uri(),
        ..ScraperConfig::default()
    };
    let scraper = ThreadScraper::new(&cfg).unwrap().with_pacer(pacer.clone());
    (scraper, pacer)
}

fn post(id: &str, title: &str, score: i64) -> Value {
    json!({
        "kind": "t3",
        "data": {
            "id": id,
            "title": title,
            "selftext": format!("body of {id}"),
            "score": score,
            "permalink": format!("/r/python/comments/{id}/slug/")
        }
    })
}

fn listing(children: Vec<Value>) -> Value {
    json!({"kind": "Listing", "data": {"after": null, "children": children}})
}

fn thread(id: &str, bodies: &[&str]) -> Value {
    let children: Vec<Value> = bodies
        .iter()
        .map(|b| json!({"kind": "t1", "data": {"body": b}}))
        .collect();
    json!([listing(vec![post(id, "op", 1)]), listing(children)])
}

#[tokio::test]
async fn search_attaches_filtered_comments_and_paces_each_item() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/python/search.json"))
        .and(query_param("q", "packaging"))
        .and(query_param("restrict_sr", "on"))
        .and(query_param("sort", "relevance"))
        .and(query_param("limit", "50"))
        .and(query_param("t", "year"))
        .and(header("user-agent", UA))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![
            post("aaa", "pip is confusing", 42),
            post("bbb", "poetry vs uv", 7),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    for id in ["aaa", "bbb"] {
        Mock::given(method("GET"))
            .and(path(format!("/r/python/comments/{id}.json")))
            .and(header("user-agent", UA))
            .respond_with(ResponseTemplate::new(200).set_body_json(thread(
                id,
                &[&format!("{id} one"), "[deleted]", &format!("{id} two")],
            )))
            .expect(1)
            .mount(&server)
            .await;
    }

    let (scraper, pacer) = scraper_for(&server);
    let posts = scraper.search_subreddit("python", "packaging", 50).await;

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].title, "pip is confusing");
    assert_eq!(posts[0].score, 42);
    assert_eq!(posts[0].body, "body of aaa");
    assert_eq!(
        posts[0].url,
        format!("{}/r/python/comments/aaa/slug/", server.uri())
    );
    assert_eq!(
        posts[0].comments.as_deref(),
        Some(&["aaa one".to_string(), "aaa two".to_string()][..])
    );
    assert_eq!(posts[1].title, "poetry vs uv");
    assert_eq!(posts[1].comments.as_ref().map(Vec::len), Some(2));
    assert_eq!(pacer.calls.load(Ordering::SeqCst), 2);
}

type EventLog = Arc<Mutex<Vec<String>>>;

/// Records its pauses in a log shared with the mock server.
struct RecordingPacer {
    log: EventLog,
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, _delay: Duration) {
        self.log.lock().unwrap().push("pause".into());
    }
}

/// Serves a fixed body and records each hit under `label`.
struct Logged {
    log: EventLog,
    label: String,
    body: Value,
}

impl Respond for Logged {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.log.lock().unwrap().push(self.label.clone());
        ResponseTemplate::new(200).set_body_json(self.body.clone())
    }
}

#[tokio::test]
async fn each_pause_follows_that_items_comment_fetch() {
    let server = MockServer::start().await;
    let log: EventLog = Arc::default();
    Mock::given(method("GET"))
        .and(path("/r/python/search.json"))
        .respond_with(Logged {
            log: log.clone(),
            label: "search".into(),
            body: listing(vec![post("aaa", "first", 1), post("bbb", "second", 2)]),
        })
        .mount(&server)
        .await;
    for id in ["aaa", "bbb"] {
        Mock::given(method("GET"))
            .and(path(format!("/r/python/comments/{id}.json")))
            .respond_with(Logged {
                log: log.clone(),
                label: format!("comments({id})"),
                body: thread(id, &["hi"]),
            })
            .mount(&server)
            .await;
    }

    let cfg = ScraperConfig {
        base_url: server.uri(),
        ..ScraperConfig::default()
    };
    let scraper = ThreadScraper::new(&cfg)
        .unwrap()
        .with_pacer(Arc::new(RecordingPacer { log: log.clone() }));
    let posts = scraper.search_subreddit("python", "anything", 10).await;

    assert_eq!(posts.len(), 2);
    assert_eq!(
        *log.lock().unwrap(),
        ["search", "comments(aaa)", "pause", "comments(bbb)", "pause"]
    );
}

#[tokio::test]
async fn failed_listing_returns_empty_without_comment_fetches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/python/search.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/python/comments/aaa.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(thread("aaa", &["x"])))
        .expect(0)
        .mount(&server)
        .await;

    let (scraper, pacer) = scraper_for(&server);
    assert!(scraper.search_subreddit("python", "packaging", 50).await.is_empty());
    assert_eq!(pacer.calls.load(Ordering::SeqCst), 0);

    let err = scraper
        .try_search_subreddit("python", "packaging", 50)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(FailureKind::Status));

    let received = server.received_requests().await.unwrap();
    assert!(received.iter().all(|r| r.url.path() == "/r/python/search.json"));
}

#[tokio::test]
async fn comment_failure_does_not_abort_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/python/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![
            post("aaa", "first", 1),
            post("bbb", "second", 2),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/python/comments/aaa.json"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"message": "Too Many Requests", "error": 429})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/python/comments/bbb.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            listing(vec![post("bbb", "op", 1)]),
            {"kind": "Listing"}
        ])))
        .mount(&server)
        .await;

    let (scraper, pacer) = scraper_for(&server);
    let posts = scraper.search_subreddit("python", "packaging", 10).await;

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].comments, Some(vec![]));
    assert_eq!(posts[1].comments, Some(vec![]));
    assert_eq!(pacer.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn comment_limit_counts_raw_children() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/python/search.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing(vec![post("aaa", "first", 1)])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/python/comments/aaa.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(thread(
            "aaa",
            &["1", "[removed]", "", "4", "5", "6", "7"],
        )))
        .mount(&server)
        .await;

    let (scraper, _) = scraper_for(&server);
    let posts = scraper.search_subreddit("python", "x", 10).await;

    assert_eq!(
        posts[0].comments,
        Some(vec!["1".to_string(), "4".to_string(), "5".to_string()])
    );
}

#[tokio::test]
async fn search_limit_is_capped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/python/search.json"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let (scraper, pacer) = scraper_for(&server);
    assert!(scraper.search_subreddit("python", "x", 500).await.is_empty());
    assert_eq!(pacer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn hot_posts_have_no_comments_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/python/hot.json"))
        .and(query_param("limit", "25"))
        .and(header("user-agent", UA))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(vec![
            post("aaa", "hot one", 900),
            json!({"kind": "t3", "data": {"id": "bbb"}}),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (scraper, pacer) = scraper_for(&server);
    let posts = scraper.get_hot_posts("python", 25).await;

    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(|p| p.comments.is_none()));
    assert_eq!(posts[1].title, "");
    assert_eq!(posts[1].score, 0);
    assert_eq!(pacer.calls.load(Ordering::SeqCst), 0);

    let as_json = serde_json::to_value(&posts).unwrap();
    assert!(as_json[0].get("comments").is_none());
    assert_eq!(as_json[0]["title"], "hot one");

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
}

#[tokio::test]
async fn search_posts_serialize_with_comments_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/python/search.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(listing(vec![post("aaa", "first", 1)])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/python/comments/aaa.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(thread("aaa", &[])))
        .mount(&server)
        .await;

    let (scraper, _) = scraper_for(&server);
    let posts = scraper.search_subreddit("python", "x", 10).await;

    let as_json = serde_json::to_value(&posts).unwrap();
    assert_eq!(as_json[0]["comments"], json!([]));
}

#[tokio::test]
async fn malformed_hot_listing_returns_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/python/hot.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .mount(&server)
        .await;

    let (scraper, _) = scraper_for(&server);
    assert!(scraper.get_hot_posts("python", 25).await.is_empty());

    let err = scraper.try_get_hot_posts("python", 25).await.unwrap_err();
    assert_eq!(err.kind(), Some(FailureKind::Malformed));
}
