//! Adapter behavior against mocked channel providers

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pondguard::channels::{ChannelAdapter, EmailAdapter, MessengerAdapter, PushAdapter, SendError, SmsAdapter};
use pondguard::config::{EmailConfig, MessengerConfig, PushConfig, SmsConfig};
use pondguard::render::RenderedMessage;

const TIMEOUT: Duration = Duration::from_millis(500);

fn sms_adapter(server: &MockServer) -> SmsAdapter {
    SmsAdapter::new(
        SmsConfig {
            url: format!("{}/messages", server.uri()),
            sender: String::from("PondGuard"),
            token: Some(String::from("test-token")),
            default_country_code: String::from("+213"),
        },
        TIMEOUT,
    )
}

#[tokio::test]
async fn sms_adapter_posts_normalized_number_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({
            "from": "PondGuard",
            "to": "+213550123456",
            "body": "low oxygen",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg-42" })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = sms_adapter(&server)
        .send(
            "0550 123-456",
            &RenderedMessage::Sms {
                text: String::from("low oxygen"),
            },
        )
        .await
        .unwrap();

    assert_eq!(ack.provider_id.as_deref(), Some("msg-42"));
}

#[tokio::test]
async fn provider_error_status_becomes_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = sms_adapter(&server)
        .send(
            "0550123456",
            &RenderedMessage::Sms {
                text: String::from("low oxygen"),
            },
        )
        .await;

    assert!(matches!(result, Err(SendError::Rejected(_))));
}

#[tokio::test]
async fn slow_provider_becomes_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let result = sms_adapter(&server)
        .send(
            "0550123456",
            &RenderedMessage::Sms {
                text: String::from("low oxygen"),
            },
        )
        .await;

    assert!(matches!(result, Err(SendError::Timeout)));
}

#[tokio::test]
async fn invalid_address_is_rejected_without_calling_the_provider() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = sms_adapter(&server)
        .send(
            "not-a-number",
            &RenderedMessage::Sms {
                text: String::from("low oxygen"),
            },
        )
        .await;

    assert!(matches!(result, Err(SendError::InvalidAddress(_))));
}

#[tokio::test]
async fn email_adapter_posts_subject_and_html() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/send"))
        .and(body_json(json!({
            "from": "alerts@pondguard.example",
            "to": "manager@example.com",
            "subject": "🔥 HIGH - Dissolved Oxygen Alert",
            "html": "<p>too low</p>",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "mail-7" })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = EmailAdapter::new(
        EmailConfig {
            url: format!("{}/send", server.uri()),
            from: String::from("alerts@pondguard.example"),
            token: None,
        },
        TIMEOUT,
    );

    let ack = adapter
        .send(
            "manager@example.com",
            &RenderedMessage::Email {
                subject: String::from("🔥 HIGH - Dissolved Oxygen Alert"),
                html: String::from("<p>too low</p>"),
            },
        )
        .await
        .unwrap();

    assert_eq!(ack.provider_id.as_deref(), Some("mail-7"));
}

#[tokio::test]
async fn push_adapter_posts_notification_envelope_with_ttl() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sub/abc"))
        .and(header("TTL", "86400"))
        .and(body_json(json!({
            "notification": {
                "title": "🚨 CRITICAL - Dissolved Oxygen Alert",
                "body": "too low",
                "data": { "alertId": 1 },
                "requireInteraction": true,
            }
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = PushAdapter::new(
        PushConfig {
            token: None,
            ttl_secs: 86400,
        },
        TIMEOUT,
    );

    adapter
        .send(
            &format!("{}/sub/abc", server.uri()),
            &RenderedMessage::Push {
                title: String::from("🚨 CRITICAL - Dissolved Oxygen Alert"),
                body: String::from("too low"),
                data: json!({ "alertId": 1 }),
                require_interaction: true,
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn messenger_adapter_posts_text_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("authorization", "Bearer access-token"))
        .and(body_json(json!({
            "messaging_product": "whatsapp",
            "to": "213550123456",
            "type": "text",
            "text": { "body": "detailed alert text" },
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = MessengerAdapter::new(
        MessengerConfig {
            url: format!("{}/messages", server.uri()),
            access_token: String::from("access-token"),
        },
        TIMEOUT,
    );

    adapter
        .send(
            "213550123456",
            &RenderedMessage::Messenger {
                text: String::from("detailed alert text"),
            },
        )
        .await
        .unwrap();
}
