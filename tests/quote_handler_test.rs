mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{admin_cookie, get, json_request, send, setup_app, with_cookie, RecordingMailer, TestOptions};
use cpf_backend::model::quote::{NewQuote, QuoteChannel};
use cpf_backend::service::submission::{ChannelAttempt, ChannelError, ChannelSuccess, WhatsAppChannel};
use serde_json::json;
use std::sync::Arc;

/// Channel that always fails, standing in for an unreachable quote API.
struct DownChannel;

#[async_trait]
impl ChannelAttempt for DownChannel {
    fn channel(&self) -> QuoteChannel {
        QuoteChannel::Api
    }

    async fn attempt(&self, _quote: &NewQuote) -> Result<ChannelSuccess, ChannelError> {
        Err(ChannelError::Transport("connection refused".to_string()))
    }
}

fn quote_form() -> serde_json::Value {
    json!({
        "form": "hero",
        "name": "Luc Martin",
        "phone": "06 12 34 56 78",
        "vehicleId": "K9K 832",
        "message": "Clio 3 de 2008"
    })
}

#[tokio::test]
async fn test_submit_falls_back_to_whatsapp_and_records_the_channel() {
    let app = setup_app(TestOptions {
        attempts: vec![
            Arc::new(DownChannel),
            Arc::new(WhatsAppChannel::new("https://wa.me/33600000000".to_string())),
        ],
        ..TestOptions::default()
    });

    let (status, body) = send(&app.router, json_request("POST", "/api/quotes/submit", quote_form())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["channel"], "whatsapp");
    assert!(body["whatsappUrl"].as_str().unwrap().starts_with("https://wa.me/33600000000?text="));
    assert_eq!(body["quote"]["status"], "nouveau");

    let stored = app.quotes.get_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].channel, QuoteChannel::Whatsapp);
    assert_eq!(stored[0].vehicle_id, "K9K 832");
}

#[tokio::test]
async fn test_submit_with_every_channel_down_is_still_recorded() {
    let app = setup_app(TestOptions { attempts: vec![Arc::new(DownChannel)], ..TestOptions::default() });

    let (status, body) = send(&app.router, json_request("POST", "/api/quotes/submit", quote_form())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["channel"], "unknown");
    assert!(body.get("whatsappUrl").is_none());
    assert_eq!(app.quotes.get_all().await.unwrap()[0].channel, QuoteChannel::Unknown);
}

#[tokio::test]
async fn test_submit_rejects_missing_contact() {
    let app = setup_app(TestOptions::default());
    let form = json!({ "name": "Luc", "vehicleId": "K9K" });

    let (status, _) = send(&app.router, json_request("POST", "/api/quotes/submit", form)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.quotes.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_quote_request_mails_the_inbox_without_recording() {
    let mailer = Arc::new(RecordingMailer::default());
    let app = setup_app(TestOptions { mailer: Some(mailer.clone()), ..TestOptions::default() });

    let form = json!({ "name": "Luc", "email": "luc@example.com", "vehicleId": "M9R" });
    let (status, body) = send(&app.router, json_request("POST", "/api/public/quote-request", form)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "atelier@example.com");
    assert_eq!(sent[0].reply_to.as_deref(), Some("luc@example.com"));
    assert!(app.quotes.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_quote_request_without_mailer_is_unavailable() {
    let app = setup_app(TestOptions::default());
    let form = json!({ "email": "luc@example.com", "vehicleId": "M9R" });

    let (status, _) = send(&app.router, json_request("POST", "/api/public/quote-request", form)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_admin_quote_workflow() {
    let app = setup_app(TestOptions::default());
    for vehicle in ["K9K 832", "M9R 700", "F4R 774"] {
        let mut form = quote_form();
        form["vehicleId"] = json!(vehicle);
        let (status, _) = send(&app.router, json_request("POST", "/api/quotes/submit", form)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = send(&app.router, get("/api/quotes")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let cookie = admin_cookie(&app.router).await;
    let (status, page) = send(&app.router, with_cookie(get("/api/quotes?limit=2"), &cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 3);
    assert_eq!(page["pages"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    // Newest first.
    assert_eq!(page["items"][0]["vehicleId"], "F4R 774");

    let (_, page) = send(&app.router, with_cookie(get("/api/quotes?q=m9r"), &cookie)).await;
    assert_eq!(page["total"], 1);
    let id = page["items"][0]["id"].as_str().unwrap().to_string();

    let req = with_cookie(
        json_request("PUT", &format!("/api/quotes/{id}/status"), json!({ "status": "en_cours" })),
        &cookie,
    );
    let (status, quote) = send(&app.router, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["status"], "en_cours");

    let (_, page) = send(&app.router, with_cookie(get("/api/quotes?status=en_cours"), &cookie)).await;
    assert_eq!(page["total"], 1);

    let req = with_cookie(
        json_request("PATCH", &format!("/api/quotes/{id}"), json!({ "name": "Luc M." })),
        &cookie,
    );
    let (status, quote) = send(&app.router, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["name"], "Luc M.");
    assert_eq!(quote["status"], "en_cours");

    let req = with_cookie(
        json_request("PATCH", &format!("/api/quotes/{id}"), json!({ "vehicleId": "" })),
        &cookie,
    );
    let (status, _) = send(&app.router, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let delete = |uri: String| {
        with_cookie(
            axum::http::Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(axum::body::Body::empty())
                .unwrap(),
            &cookie,
        )
    };
    let (status, _) = send(&app.router, delete(format!("/api/quotes/{id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app.router, delete(format!("/api/quotes/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.quotes.get_all().await.unwrap().len(), 2);

    let (status, _) = send(&app.router, delete("/api/quotes".to_string())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.quotes.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_quote_is_not_found() {
    let app = setup_app(TestOptions::default());
    let cookie = admin_cookie(&app.router).await;
    let (status, body) = send(&app.router, with_cookie(get("/api/quotes/nope"), &cookie)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}
