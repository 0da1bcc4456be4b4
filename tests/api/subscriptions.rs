use std::time::Duration;

use engineers_hub::form::ALREADY_SUBSCRIBED_MESSAGE;
use engineers_hub::form::FALLBACK_MESSAGE;
use engineers_hub::form::INVALID_EMAIL_MESSAGE;
use engineers_hub::form::SUBSCRIBED_MESSAGE;
use serde_json::json;
use wiremock::matchers::body_json;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::ResponseTemplate;

use crate::helpers::spawn_app;
use crate::helpers::STORE_TIMEOUT_MS;

const TABLE_PATH: &str = "/rest/v1/subscribers";

#[tokio::test]
async fn subscribe_ok() {
    let app = spawn_app().await;

    // exactly one write per submission; checked when the mock server drops
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .and(body_json(json!([{ "email": "a@example.com" }])))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!([{ "id": 1, "email": "a@example.com" }])),
        )
        .expect(1)
        .mount(&app.store_server)
        .await;

    let resp = app.subscribe("a@example.com").await;
    assert_eq!(resp.status().as_u16(), 200);

    let html = resp.text().await.unwrap();
    assert!(html.contains(SUBSCRIBED_MESSAGE));
    // hidden again after 3s
    assert!(html.contains("animation-delay: 3000ms"));
    // input cleared
    assert!(html.contains(r#"value="""#));
    assert!(html.contains(r#"data-busy="false""#));
}

#[tokio::test]
async fn subscribe_duplicate() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint \"subscribers_email_key\"",
            "details": "Key (email)=(dup@example.com) already exists.",
            "hint": null,
        })))
        .expect(1)
        .mount(&app.store_server)
        .await;

    let resp = app.subscribe("dup@example.com").await;
    assert_eq!(resp.status().as_u16(), 409);

    let html = resp.text().await.unwrap();
    assert!(html.contains(ALREADY_SUBSCRIBED_MESSAGE));
    assert!(!html.contains(SUBSCRIBED_MESSAGE));
    // unlike success, the input keeps its value
    assert!(html.contains(r#"value="dup@example.com""#));
    assert!(html.contains(r#"data-busy="false""#));
}

#[tokio::test]
async fn subscribe_rejected_echoes_store_message() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "42501",
            "message": "permission denied for table subscribers",
            "details": null,
            "hint": null,
        })))
        .expect(1)
        .mount(&app.store_server)
        .await;

    let resp = app.subscribe("a@example.com").await;
    assert_eq!(resp.status().as_u16(), 502);

    let html = resp.text().await.unwrap();
    assert!(html.contains("Error: permission denied for table subscribers"));
}

#[tokio::test]
async fn subscribe_transport_failure() {
    let app = spawn_app().await;

    // slower than the client timeout, so the call fails in transport
    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(STORE_TIMEOUT_MS * 10)),
        )
        .expect(1)
        .mount(&app.store_server)
        .await;

    let resp = app.subscribe("a@example.com").await;
    assert_eq!(resp.status().as_u16(), 500);

    let html = resp.text().await.unwrap();
    assert!(html.contains(FALLBACK_MESSAGE));
    assert!(html.contains(r#"data-busy="false""#));
}

#[tokio::test]
async fn subscribe_garbled_store_response() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream connect error"))
        .expect(1)
        .mount(&app.store_server)
        .await;

    let resp = app.subscribe("a@example.com").await;
    assert_eq!(resp.status().as_u16(), 500);
    assert!(resp.text().await.unwrap().contains(FALLBACK_MESSAGE));
}

#[tokio::test]
async fn subscribe_invalid_email() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.store_server)
        .await;

    for (email, msg) in [
        ("", "empty email"),
        ("not-an-email", "no at"),
        ("@example.com", "no subject"),
    ] {
        let resp = app.subscribe(email).await;
        assert_eq!(resp.status().as_u16(), 400, "{msg}");
        assert!(resp.text().await.unwrap().contains(INVALID_EMAIL_MESSAGE), "{msg}");
    }
}

#[tokio::test]
async fn subscribe_missing_field() {
    let app = spawn_app().await;

    for (body, msg) in [("", "null"), ("name=john", "no email")] {
        let resp = app.post_subscriptions(body.to_owned()).await;
        assert_eq!(resp.status().as_u16(), 400, "{msg}");
    }
}
