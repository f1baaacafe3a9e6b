use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use serde_json::json;
use serde_json::Value;
use tokio::sync::mpsc;

use super::client_key;
use super::router;
use super::AppState;
use crate::domain::models::Backend;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;
use crate::domain::models::BackendPrompt;
use crate::domain::models::BackendResponse;
use crate::domain::services::datasets::DatasetStore;
use crate::domain::services::orchestrator::ChatOrchestrator;
use crate::domain::services::rate_limiter::RateLimiter;

struct ScriptedBackend {}

#[async_trait]
impl Backend for ScriptedBackend {
    fn name(&self) -> BackendName {
        return BackendName::Gemini;
    }

    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        return Ok(vec![]);
    }

    async fn get_completion<'a>(
        &self,
        prompt: BackendPrompt,
        tx: &'a mpsc::UnboundedSender<BackendResponse>,
    ) -> Result<()> {
        let text = if prompt.system.contains("fabricated") {
            "I've been reading bad things."
        } else {
            "I'm keeping an open mind."
        };
        tx.send(BackendResponse {
            text: text.to_string(),
            done: false,
        })?;
        tx.send(BackendResponse {
            text: String::new(),
            done: true,
        })?;
        return Ok(());
    }
}

async fn spawn_server(limit: u32) -> Result<SocketAddr> {
    let state = Arc::new(AppState {
        datasets: DatasetStore::load()?,
        orchestrator: ChatOrchestrator::new(
            Arc::new(Box::new(ScriptedBackend {}) as BackendBox),
            RateLimiter::new(limit, 600),
        ),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router(state)).await;
    });

    return Ok(addr);
}

#[test]
fn it_resolves_client_keys_from_forwarding_headers() {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
    );
    headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
    assert_eq!(client_key(&headers), "203.0.113.7");

    let mut headers = HeaderMap::new();
    headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
    assert_eq!(client_key(&headers), "198.51.100.4");

    assert_eq!(client_key(&HeaderMap::new()), "127.0.0.1");
}

#[tokio::test]
async fn it_serves_the_persona_roster() -> Result<()> {
    let addr = spawn_server(10).await?;

    let res = reqwest::get(format!("http://{addr}/api/personas")).await?;
    assert_eq!(res.status().as_u16(), 200);

    let personas: Vec<Value> = res.json().await?;
    assert_eq!(personas.len(), 6);
    assert!(personas
        .iter()
        .any(|persona| return persona["name"] == "David"));

    return Ok(());
}

#[tokio::test]
async fn it_serves_a_single_persona_or_404() -> Result<()> {
    let addr = spawn_server(10).await?;

    let res = reqwest::get(format!("http://{addr}/api/personas/107")).await?;
    assert_eq!(res.status().as_u16(), 200);
    let persona: Value = res.json().await?;
    assert_eq!(persona["personality"]["archetype"], "Guarded Provider");

    let res = reqwest::get(format!("http://{addr}/api/personas/9999")).await?;
    assert_eq!(res.status().as_u16(), 404);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], true);

    return Ok(());
}

#[tokio::test]
async fn it_serves_chart_data_per_source() -> Result<()> {
    let addr = spawn_server(10).await?;

    let res = reqwest::get(format!("http://{addr}/api/charts/final-ratings?source=fake")).await?;
    assert_eq!(res.status().as_u16(), 200);
    let ratings: Vec<Value> = res.json().await?;
    assert!(!ratings.is_empty());

    let res = reqwest::get(format!("http://{addr}/api/charts/stance")).await?;
    assert_eq!(res.status().as_u16(), 200);
    let stance: Value = res.json().await?;
    let total = stance["unsupportive"]["count"].as_u64().unwrap()
        + stance["neutral"]["count"].as_u64().unwrap()
        + stance["supportive"]["count"].as_u64().unwrap();
    assert_eq!(total, 6);

    let res =
        reqwest::get(format!("http://{addr}/api/charts/final-ratings?source=tabloid")).await?;
    assert_eq!(res.status().as_u16(), 400);

    return Ok(());
}

#[tokio::test]
async fn it_rejects_chat_for_an_unknown_persona() -> Result<()> {
    let addr = spawn_server(10).await?;

    let res = reqwest::Client::new()
        .post(format!("http://{addr}/api/chat/9999"))
        .json(&json!({ "messages": [{ "role": "user", "content": "Hi" }] }))
        .send()
        .await?;

    assert_eq!(res.status().as_u16(), 404);
    return Ok(());
}

#[tokio::test]
async fn it_rejects_chat_with_an_empty_history() -> Result<()> {
    let addr = spawn_server(10).await?;

    let res = reqwest::Client::new()
        .post(format!("http://{addr}/api/chat/107"))
        .json(&json!({ "messages": [] }))
        .send()
        .await?;

    assert_eq!(res.status().as_u16(), 422);
    return Ok(());
}

#[tokio::test]
async fn it_rejects_chat_when_rate_limited() -> Result<()> {
    let addr = spawn_server(0).await?;

    let res = reqwest::Client::new()
        .post(format!("http://{addr}/api/chat/107"))
        .json(&json!({ "messages": [{ "role": "user", "content": "Hi" }] }))
        .send()
        .await?;

    assert_eq!(res.status().as_u16(), 429);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["remaining"], 0);
    assert!(body["reset"].as_u64().unwrap() > 0);

    return Ok(());
}

#[tokio::test]
async fn it_streams_both_panes_over_sse() -> Result<()> {
    let addr = spawn_server(10).await?;

    let res = reqwest::Client::new()
        .post(format!("http://{addr}/api/chat/107"))
        .json(&json!({ "messages": [{ "role": "user", "content": "How do you feel about the vaccine?" }] }))
        .send()
        .await?;

    assert_eq!(res.status().as_u16(), 200);
    let body = res.text().await?;

    assert!(body.contains("event: ratelimit"));
    assert!(body.contains("event: response1"));
    assert!(body.contains("I'm keeping an open mind."));
    assert!(body.contains("event: response2"));
    assert!(body.contains("I've been reading bad things."));
    assert!(body.contains("event: loading1"));
    assert!(body.contains("event: loading2"));

    return Ok(());
}
