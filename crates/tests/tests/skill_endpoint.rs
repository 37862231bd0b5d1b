use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use subway_api::{build_app, ApiConfig};
use subway_skill::SkillConfig;
use subway_status::StatusClientConfig;
use subway_tests::{
    intent_event, launch_event, session_ended_event, FakeStatusEndpoint, StatusPage,
};
use tower::ServiceExt;

const APP_ID: &str = "amzn1.echo-sdk-ams.app.test";

fn app_for(endpoint: &FakeStatusEndpoint, application_id: Option<&str>) -> Router {
    let skill = SkillConfig::new(
        StatusClientConfig {
            endpoint: endpoint.url.clone(),
            timeout: Duration::from_millis(300),
            ..StatusClientConfig::default()
        },
        Duration::from_secs(2),
    )
    .expect("valid skill config");

    build_app(ApiConfig {
        skill,
        application_id: application_id.map(ToString::to_string),
    })
    .expect("app should build")
}

async fn post_event(app: Router, event: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/skill")
        .header("content-type", "application/json")
        .body(Body::from(event.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, parsed)
}

#[tokio::test]
async fn launch_returns_welcome_envelope() {
    let endpoint = FakeStatusEndpoint::spawn(StatusPage::Status("Good Service".into()))
        .await
        .unwrap();
    let (status, body) = post_event(app_for(&endpoint, None), launch_event(APP_ID)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], "1.0");
    assert_eq!(body["response"]["shouldEndSession"], false);
    assert_eq!(body["response"]["outputSpeech"]["type"], "PlainText");
    assert_eq!(body["response"]["card"]["title"], "Welcome");
    assert!(body["response"]["reprompt"]["outputSpeech"]["text"]
        .as_str()
        .is_some_and(|text| !text.is_empty()));
    assert!(endpoint.forms().is_empty());
}

#[tokio::test]
async fn absent_session_attributes_come_back_empty() {
    let endpoint = FakeStatusEndpoint::spawn(StatusPage::Status("Good Service".into()))
        .await
        .unwrap();
    let event = launch_event(APP_ID);
    assert!(event["session"].get("attributes").is_none());

    let (status, body) = post_event(app_for(&endpoint, None), event).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionAttributes"], serde_json::json!({}));
}

#[tokio::test]
async fn session_attributes_are_handed_back_unchanged() {
    let endpoint = FakeStatusEndpoint::spawn(StatusPage::Status("Good Service".into()))
        .await
        .unwrap();
    let mut event = intent_event(APP_ID, "GetTrainStatus", Some("one"));
    event["session"]["attributes"] = serde_json::json!({ "favorite": "one", "visits": 3 });

    let (status, body) = post_event(app_for(&endpoint, None), event).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["sessionAttributes"],
        serde_json::json!({ "favorite": "one", "visits": 3 })
    );
}

#[tokio::test]
async fn status_intent_speaks_scraped_status() {
    let endpoint = FakeStatusEndpoint::spawn(StatusPage::Status("Good Service".into()))
        .await
        .unwrap();
    let (status, body) = post_event(
        app_for(&endpoint, None),
        intent_event(APP_ID, "GetTrainStatus", Some("d")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let text = "The status of the d train line is Good Service";
    assert_eq!(body["response"]["outputSpeech"]["text"], text);
    assert_eq!(body["response"]["card"]["content"], text);
    assert_eq!(body["response"]["card"]["title"], "Train Line Status");
    assert!(body["response"]["reprompt"]["outputSpeech"]["text"].is_null());
    assert_eq!(body["response"]["shouldEndSession"], true);

    let forms = endpoint.forms();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].get("lineName").map(String::as_str), Some("BDFM"));
    assert_eq!(forms[0].get("mode").map(String::as_str), Some("Subways"));
}

#[tokio::test]
async fn unrecognized_line_asks_again_without_fetching() {
    let endpoint = FakeStatusEndpoint::spawn(StatusPage::Status("Good Service".into()))
        .await
        .unwrap();
    let (status, body) = post_event(
        app_for(&endpoint, None),
        intent_event(APP_ID, "GetTrainStatus", Some("purple")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["shouldEndSession"], false);
    assert!(body["response"]["outputSpeech"]["text"]
        .as_str()
        .is_some_and(|text| text.contains("the one train or the D. train")));
    assert!(endpoint.forms().is_empty());
}

#[tokio::test]
async fn missing_slot_value_asks_again() {
    let endpoint = FakeStatusEndpoint::spawn(StatusPage::Status("Good Service".into()))
        .await
        .unwrap();
    let (status, body) = post_event(
        app_for(&endpoint, None),
        intent_event(APP_ID, "GetTrainStatus", None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["shouldEndSession"], false);
    assert!(endpoint.forms().is_empty());
}

#[tokio::test]
async fn upstream_failures_are_spoken_as_unavailable() {
    for page in [
        StatusPage::Error(StatusCode::INTERNAL_SERVER_ERROR),
        StatusPage::NoContainer,
        StatusPage::Slow(Duration::from_secs(1)),
    ] {
        let endpoint = FakeStatusEndpoint::spawn(page.clone()).await.unwrap();
        let (status, body) = post_event(
            app_for(&endpoint, None),
            intent_event(APP_ID, "GetTrainStatus", Some("a.")),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "page {page:?}");
        assert_eq!(body["response"]["shouldEndSession"], false, "page {page:?}");
        assert!(
            body["response"]["outputSpeech"]["text"]
                .as_str()
                .is_some_and(|text| text.contains("a train line is temporarily unavailable")),
            "page {page:?}"
        );
        assert_eq!(endpoint.forms()[0].get("lineName").map(String::as_str), Some("ACE"));
    }
}

#[tokio::test]
async fn session_ended_is_acknowledged() {
    let endpoint = FakeStatusEndpoint::spawn(StatusPage::Status("Good Service".into()))
        .await
        .unwrap();
    let (status, body) =
        post_event(app_for(&endpoint, None), session_ended_event(APP_ID)).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
}

#[tokio::test]
async fn unknown_intent_is_a_host_failure() {
    let endpoint = FakeStatusEndpoint::spawn(StatusPage::Status("Good Service".into()))
        .await
        .unwrap();
    let (status, body) = post_event(
        app_for(&endpoint, None),
        intent_event(APP_ID, "AMAZON.PizzaIntent", Some("d")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unrecognized_intent");
    assert!(endpoint.forms().is_empty());
}

#[tokio::test]
async fn unknown_request_type_is_a_host_failure() {
    let endpoint = FakeStatusEndpoint::spawn(StatusPage::Status("Good Service".into()))
        .await
        .unwrap();
    let mut event = launch_event(APP_ID);
    event["request"]["type"] = Value::from("Connections.Response");

    let (status, body) = post_event(app_for(&endpoint, None), event).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unrecognized_request_type");
}

#[tokio::test]
async fn foreign_application_is_refused_before_dispatch() {
    let endpoint = FakeStatusEndpoint::spawn(StatusPage::Status("Good Service".into()))
        .await
        .unwrap();
    let app = app_for(&endpoint, Some(APP_ID));

    let (status, body) = post_event(
        app.clone(),
        intent_event("amzn1.echo-sdk-ams.app.other", "GetTrainStatus", Some("d")),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "invalid_application_id");
    assert!(endpoint.forms().is_empty());

    let (status, _) = post_event(app, intent_event(APP_ID, "GetTrainStatus", Some("d"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(endpoint.forms().len(), 1);
}

#[tokio::test]
async fn health_reports_metrics() {
    let endpoint = FakeStatusEndpoint::spawn(StatusPage::Status("Good Service".into()))
        .await
        .unwrap();
    let app = app_for(&endpoint, None);
    let _ = post_event(app.clone(), launch_event(APP_ID)).await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let parsed: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["metrics"]["launches_total"], 1);
}
