// Integration tests for `HttpSession` using wiremock.
#![allow(clippy::unwrap_used)]

use std::time::{Duration, Instant};

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use glowkit_api::types::{PowerValue, ResultStatus, StateChangeRequest};
use glowkit_api::{Error, HttpSession, LightsApi, SessionConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, HttpSession) {
    let server = MockServer::start().await;
    let config = SessionConfig::new(SecretString::from("s3cret".to_string()))
        .with_base_url(format!("{}/v1/", server.uri()));
    let session = HttpSession::new(&config).unwrap();
    (server, session)
}

fn light_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "power": "on",
        "brightness": 0.8,
        "color": { "hue": 120.0, "saturation": 1.0, "kelvin": 3500 },
        "label": "Kitchen",
        "connected": true,
        "group": { "id": "g1", "name": "Downstairs" },
        "location": { "id": "l1", "name": "Home" }
    })
}

// ── Happy paths ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_lights_sends_bearer_token() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/lights/all"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([light_json("a"), light_json("b")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let lights = session.list_lights("all").await.unwrap();
    assert_eq!(lights.len(), 2);
    assert_eq!(lights[0].id, "a");
    assert!(lights[0].is_on());
    assert_eq!(lights[1].group.as_ref().unwrap().id, "g1");
}

#[tokio::test]
async fn test_list_scenes_skips_incomplete_entries() {
    let (server, session) = setup().await;

    let body = json!([
        {
            "uuid": "7a3b",
            "name": "Evening",
            "states": [
                { "selector": "group_id:g1", "power": "on", "brightness": 0.4 },
                { "selector": "id:d073d5", "color": { "hue": 30.0, "saturation": 0.6, "kelvin": 2700 } }
            ]
        },
        { "name": "no uuid here", "states": [] }
    ]);

    Mock::given(method("GET"))
        .and(path("/v1/scenes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let scenes = session.list_scenes().await.unwrap();
    assert_eq!(scenes.len(), 1);
    assert_eq!(scenes[0].name, "Evening");
    assert_eq!(scenes[0].states.len(), 2);
    assert_eq!(scenes[0].states[0].power.as_deref(), Some("on"));
    assert!(scenes[0].states[1].color.is_some());
}

#[tokio::test]
async fn test_set_state_accepts_multi_status() {
    let (server, session) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/v1/lights/group_id:g1/state"))
        .and(body_json(json!({ "power": "off", "brightness": 0.25, "duration": 2.0 })))
        .respond_with(ResponseTemplate::new(207).set_body_json(json!({
            "results": [
                { "id": "a", "label": "Kitchen", "status": "ok" },
                { "id": "b", "label": "Hall", "status": "offline" }
            ]
        })))
        .mount(&server)
        .await;

    let change = StateChangeRequest {
        power: Some(PowerValue::Off),
        color: None,
        brightness: Some(0.25),
        duration: 2.0,
    };
    let results = session.set_state("group_id:g1", &change).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].status, ResultStatus::Ok);
    assert_eq!(results[1].status, ResultStatus::Offline);
}

#[tokio::test]
async fn test_activate_scene_sends_duration() {
    let (server, session) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/v1/scenes/scene_id:7a3b/activate"))
        .and(body_json(json!({ "duration": 1.0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let results = session.activate_scene("scene_id:7a3b", 1.0).await.unwrap();
    assert!(results.is_empty());
}

// ── Error paths ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/lights/all"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = session.list_lights("all").await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized));
    assert!(err.is_auth_error());
}

#[tokio::test]
async fn test_rate_limited_and_server_error() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/scenes"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/lights/all"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(matches!(
        session.list_scenes().await.unwrap_err(),
        Error::RateLimited
    ));
    assert!(matches!(
        session.list_lights("all").await.unwrap_err(),
        Error::ServerError { status: 503 }
    ));
}

#[tokio::test]
async fn test_unexpected_status() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/lights/id:zzz"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = session.list_lights("id:zzz").await.unwrap_err();
    match err {
        Error::UnexpectedStatus { expected, got } => {
            assert_eq!(expected, vec![200]);
            assert_eq!(got, 404);
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_light_missing_required_field_is_malformed() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/lights/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "a", "power": "on", "label": "No color", "connected": true, "brightness": 1.0 }
        ])))
        .mount(&server)
        .await;

    let err = session.list_lights("all").await.unwrap_err();
    match err {
        Error::MalformedResponse { body, .. } => assert!(body.contains("No color")),
        other => panic!("expected MalformedResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn test_result_missing_id_is_malformed() {
    let (server, session) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/v1/lights/all/state"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "results": [{ "status": "ok" }] })),
        )
        .mount(&server)
        .await;

    let change = StateChangeRequest {
        power: Some(PowerValue::On),
        color: None,
        brightness: None,
        duration: 0.0,
    };
    let err = session.set_state("all", &change).await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));
}

// ── Wire details ────────────────────────────────────────────────────

#[tokio::test]
async fn test_selector_is_one_encoded_segment() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/lights/label:Living%20Room%2FEast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([light_json("a")])))
        .expect(1)
        .mount(&server)
        .await;

    let lights = session.list_lights("label:Living Room/East").await.unwrap();
    assert_eq!(lights.len(), 1);
}

#[tokio::test]
async fn test_missing_results_array_is_empty() {
    let (server, session) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/v1/scenes/scene_id:7a3b/activate"))
        .respond_with(ResponseTemplate::new(207).set_body_json(json!({})))
        .mount(&server)
        .await;

    let results = session.activate_scene("scene_id:7a3b", 0.0).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_requests_are_sent_one_at_a_time() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/lights/id:slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([light_json("slow")]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/lights/id:fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([light_json("fast")])))
        .mount(&server)
        .await;

    let started = Instant::now();
    let slow = session.list_lights("id:slow");
    let fast = async {
        // Submitted while the slow request is still in flight.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let lights = session.list_lights("id:fast").await;
        (lights, started.elapsed())
    };
    let (slow, (fast, fast_done)) = tokio::join!(slow, fast);

    assert_eq!(slow.unwrap()[0].id, "slow");
    assert_eq!(fast.unwrap()[0].id, "fast");
    assert!(
        fast_done >= Duration::from_millis(300),
        "second request completed after {fast_done:?}, before the first one finished"
    );

    let order: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_owned())
        .collect();
    assert_eq!(order, ["/v1/lights/id:slow", "/v1/lights/id:fast"]);
}
