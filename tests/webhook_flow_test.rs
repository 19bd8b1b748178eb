//! End-to-end webhook tests against mocked LINE, wttr.in and Gemini servers
//! Run with: cargo test --test webhook_flow_test

use std::sync::{Arc, Once};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use mockito::{Matcher, ServerGuard};
use tower::ServiceExt;

use tczc_bot::application::messaging::Gatekeeper;
use tczc_bot::application::services::reply_service::{LLM_OVERLOADED, STICKERS_REPLY, WEATHER_UNAVAILABLE};
use tczc_bot::application::services::{MessageService, ReplyService};
use tczc_bot::infrastructure::adapters::line::{sign, LineAdapter};
use tczc_bot::infrastructure::config::WeatherConfig;
use tczc_bot::infrastructure::llm::{GeminiProvider, LLMConfig, LLM};
use tczc_bot::infrastructure::server::{router, AppState};
use tczc_bot::infrastructure::weather::WttrClient;

static INIT: Once = Once::new();

const SECRET: &str = "flow-secret";

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Full app wired to one mock server standing in for all three upstreams
fn app_for(server: &ServerGuard) -> axum::Router {
    let bot = LineAdapter::new("access-token").with_api_base(server.url());
    let weather = Arc::new(WttrClient::new(&WeatherConfig {
        base_url: server.url(),
        ..WeatherConfig::default()
    }));
    let llm: Arc<dyn LLM> = Arc::new(GeminiProvider::new("gemini-key", Some("gemini-test")).with_base_url(server.url()));

    let replies = ReplyService::new(weather, Some(llm), LLMConfig::default());
    let service = MessageService::new(bot, Gatekeeper::default(), replies);
    let state = Arc::new(AppState {
        service: Arc::new(service),
        channel_secret: SECRET.to_string(),
    });
    router(state, "/callback")
}

fn text_events(events: &[(&str, &str)]) -> String {
    let events: Vec<serde_json::Value> = events
        .iter()
        .map(|(token, text)| {
            serde_json::json!({
                "type": "message",
                "mode": "active",
                "timestamp": 1700000000000u64,
                "replyToken": token,
                "source": { "type": "group", "groupId": "C1", "userId": "U1" },
                "message": { "type": "text", "id": "1", "text": text }
            })
        })
        .collect();
    serde_json::json!({ "destination": "U0", "events": events }).to_string()
}

fn webhook(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/callback")
        .header("content-type", "application/json")
        .header("x-line-signature", sign(body.as_bytes(), SECRET).unwrap())
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn reply_body(token: &str, text: &str) -> Matcher {
    Matcher::Json(serde_json::json!({
        "replyToken": token,
        "messages": [{ "type": "text", "text": text }]
    }))
}

#[tokio::test]
async fn test_weather_command_proxied_and_replied() {
    ensure_init();
    let mut server = mockito::Server::new_async().await;

    let weather = server
        .mock("GET", "/%E5%8F%B0%E4%B8%AD")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("format".into(), "3".into()),
            Matcher::UrlEncoded("lang".into(), "zh-tw".into()),
        ]))
        .with_status(200)
        .with_body("台中: ⛅️ +22°C")
        .create_async()
        .await;
    let reply = server
        .mock("POST", "/v2/bot/message/reply")
        .match_header("authorization", "Bearer access-token")
        .match_body(reply_body("r1", "🌤️ 【台中】天氣報告：\n台中: ⛅️ +22°C"))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let body = text_events(&[("r1", "#台中天氣？")]);
    let response = app_for(&server).oneshot(webhook(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    weather.assert_async().await;
    reply.assert_async().await;
}

#[tokio::test]
async fn test_weather_outage_replies_unavailable() {
    ensure_init();
    let mut server = mockito::Server::new_async().await;

    let _weather = server
        .mock("GET", Matcher::Regex("^/%E5%8F%B0".to_string()))
        .with_status(502)
        .create_async()
        .await;
    let reply = server
        .mock("POST", "/v2/bot/message/reply")
        .match_body(reply_body("r1", WEATHER_UNAVAILABLE))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let body = text_events(&[("r1", "#台北天氣")]);
    let response = app_for(&server).oneshot(webhook(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    reply.assert_async().await;
}

#[tokio::test]
async fn test_weather_bare_not_found_replies_unavailable() {
    ensure_init();
    let mut server = mockito::Server::new_async().await;

    let _weather = server
        .mock("GET", Matcher::Regex("^/%E5%8F%B0".to_string()))
        .with_status(404)
        .with_body("<html>Page Not Found</html>")
        .create_async()
        .await;
    let reply = server
        .mock("POST", "/v2/bot/message/reply")
        .match_body(reply_body("r1", WEATHER_UNAVAILABLE))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let body = text_events(&[("r1", "#台北天氣")]);
    let response = app_for(&server).oneshot(webhook(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    reply.assert_async().await;
}

#[tokio::test]
async fn test_fallback_goes_to_gemini() {
    ensure_init();
    let mut server = mockito::Server::new_async().await;

    let gemini = server
        .mock("POST", "/v1beta/models/gemini-test:generateContent")
        .match_header("x-goog-api-key", "gemini-key")
        .match_body(Matcher::Regex("推薦機油".to_string()))
        .with_status(200)
        .with_body(r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"原廠 5W-30 就很好"}]}}]}"#)
        .create_async()
        .await;
    let reply = server
        .mock("POST", "/v2/bot/message/reply")
        .match_body(reply_body("r1", "原廠 5W-30 就很好"))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let body = text_events(&[("r1", "# 推薦 機油?")]);
    let response = app_for(&server).oneshot(webhook(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    gemini.assert_async().await;
    reply.assert_async().await;
}

#[tokio::test]
async fn test_gemini_failure_replies_overloaded() {
    ensure_init();
    let mut server = mockito::Server::new_async().await;

    let _gemini = server
        .mock("POST", "/v1beta/models/gemini-test:generateContent")
        .with_status(500)
        .create_async()
        .await;
    let reply = server
        .mock("POST", "/v2/bot/message/reply")
        .match_body(reply_body("r1", LLM_OVERLOADED))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let body = text_events(&[("r1", "#今天要去哪")]);
    let response = app_for(&server).oneshot(webhook(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    reply.assert_async().await;
}

#[tokio::test]
async fn test_group_chatter_never_reaches_line() {
    ensure_init();
    let mut server = mockito::Server::new_async().await;

    let reply = server
        .mock("POST", "/v2/bot/message/reply")
        .expect(0)
        .create_async()
        .await;

    let body = text_events(&[("r1", "晚上吃什麼"), ("r2", "台中天氣不錯")]);
    let response = app_for(&server).oneshot(webhook(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    reply.assert_async().await;
}

#[tokio::test]
async fn test_failed_delivery_does_not_block_other_events() {
    ensure_init();
    let mut server = mockito::Server::new_async().await;

    let rejected = server
        .mock("POST", "/v2/bot/message/reply")
        .match_body(Matcher::PartialJson(serde_json::json!({ "replyToken": "expired" })))
        .with_status(400)
        .with_body(r#"{"message":"Invalid reply token"}"#)
        .create_async()
        .await;
    let delivered = server
        .mock("POST", "/v2/bot/message/reply")
        .match_body(reply_body("fresh", STICKERS_REPLY))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let body = text_events(&[("expired", "#大會師"), ("fresh", "購買貼紙")]);
    let response = app_for(&server).oneshot(webhook(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    rejected.assert_async().await;
    delivered.assert_async().await;
}
