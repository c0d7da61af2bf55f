//! Tests for the front → middle → backend chain.

mod common;

use common::{client, local_config, sample, scrape, start_tier};

#[tokio::test]
async fn test_chain_walks_every_tier() {
    let backend = start_tier(local_config("backend", None)).await;
    let middle = start_tier(local_config("middle", Some(backend.base_url()))).await;
    let front = start_tier(local_config("front", Some(middle.base_url()))).await;
    let client = client();

    let res = client.get(front.url("/chain")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    let report: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        report,
        serde_json::json!({
            "tier": "front",
            "downstream": {
                "tier": "middle",
                "downstream": { "tier": "backend", "downstream": null }
            }
        })
    );

    for tier in [&front, &middle, &backend] {
        let exposition = scrape(&client, tier).await;
        assert_eq!(
            sample(&exposition, r#"http_requests_total{method="GET",route="/chain"}"#),
            Some(1)
        );
    }

    front.stop().await;
    middle.stop().await;
    backend.stop().await;
}

#[tokio::test]
async fn test_unreachable_downstream_is_bad_gateway_but_counted() {
    let dead = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead_url = format!("http://{}", dead.local_addr().unwrap());
    drop(dead);

    let front = start_tier(local_config("front", Some(dead_url))).await;
    let client = client();

    let res = client.get(front.url("/chain")).send().await.unwrap();
    assert_eq!(res.status(), 502);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["tier"], "front");
    assert!(body["error"].as_str().unwrap().contains("unreachable"));

    let exposition = scrape(&client, &front).await;
    assert_eq!(
        sample(&exposition, r#"http_requests_total{method="GET",route="/chain"}"#),
        Some(1)
    );

    front.stop().await;
}

#[tokio::test]
async fn test_failing_downstream_tier_propagates_as_bad_gateway() {
    let dead = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead_url = format!("http://{}", dead.local_addr().unwrap());
    drop(dead);

    let middle = start_tier(local_config("middle", Some(dead_url))).await;
    let front = start_tier(local_config("front", Some(middle.base_url()))).await;
    let client = client();

    let res = client.get(front.url("/chain")).send().await.unwrap();
    assert_eq!(res.status(), 502);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["tier"], "front");
    assert!(body["error"].as_str().unwrap().contains("502"));

    front.stop().await;
    middle.stop().await;
}

#[tokio::test]
async fn test_tiers_keep_separate_counters() {
    let backend = start_tier(local_config("backend", None)).await;
    let front = start_tier(local_config("front", Some(backend.base_url()))).await;
    let client = client();

    client.get(front.url("/")).send().await.unwrap();
    client.get(front.url("/chain")).send().await.unwrap();

    let front_metrics = scrape(&client, &front).await;
    let backend_metrics = scrape(&client, &backend).await;

    assert_eq!(sample(&front_metrics, r#"http_requests_total{method="GET",route="/"}"#), Some(1));
    assert_eq!(sample(&backend_metrics, r#"http_requests_total{method="GET",route="/"}"#), None);
    assert_eq!(
        sample(&backend_metrics, r#"http_requests_total{method="GET",route="/chain"}"#),
        Some(1)
    );

    front.stop().await;
    backend.stop().await;
}
