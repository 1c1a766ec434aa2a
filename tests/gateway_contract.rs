//! Advisory Gateway Contract Tests
//!
//! Verify the HTTP contract against a mock generateContent endpoint:
//! request format (model path, key query parameter, declared response
//! schemas), reply parsing (fence stripping, missing-field defaults),
//! failure degradation, cache population, and demo toggles.

use kisan::cache::ResponseCache;
use kisan::config::{DemoConfig, GatewayConfig};
use kisan::gateway::AdvisoryGateway;
use kisan::messages::ChatMessage;
use kisan::profile::{FarmProfile, Language};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Gateway config pointed at the mock server with all demo toggles off.
fn live_config(server: &MockServer) -> GatewayConfig {
    GatewayConfig {
        api_key: "test-key".to_owned(),
        base_url: server.uri(),
        demo: DemoConfig {
            weather: false,
            fertilizer: false,
            schemes: false,
            crops: false,
        },
        ..Default::default()
    }
}

fn gateway_with_cache(server: &MockServer, cache: ResponseCache) -> AdvisoryGateway {
    AdvisoryGateway::new(&live_config(server), cache).expect("gateway")
}

fn gateway(server: &MockServer, dir: &tempfile::TempDir) -> AdvisoryGateway {
    gateway_with_cache(server, ResponseCache::open(dir.path()))
}

/// A generateContent reply whose first part is `text`.
fn text_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}]
    })
}

// ── Request format ────────────────────────────────────────────

#[tokio::test]
async fn request_targets_model_path_with_key_param() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("hello")))
        .expect(1)
        .mount(&server)
        .await;

    let reply = gateway(&server, &dir)
        .chat(&[], "hello", None, Language::En)
        .await;
    assert_eq!(reply, "hello");
}

#[tokio::test]
async fn chat_maps_history_roles_and_system_instruction() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "hello"}]},
                {"role": "model", "parts": [{"text": "hi there"}]},
                {"role": "user", "parts": [{"text": "what next"}]},
            ],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("sow wheat")))
        .expect(1)
        .mount(&server)
        .await;

    let history = vec![
        ChatMessage::user("hello"),
        ChatMessage::assistant("hi there"),
    ];
    let reply = gateway(&server, &dir)
        .chat(&history, "what next", None, Language::En)
        .await;
    assert_eq!(reply, "sow wheat");
}

#[tokio::test]
async fn chat_attaches_image_as_inline_data() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "contents": [{"parts": [
                {"text": "diagnose this"},
                {"inlineData": {"mimeType": "image/jpeg", "data": "QUJD"}},
            ]}],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("looks like blight")))
        .expect(1)
        .mount(&server)
        .await;

    // The data-URL prefix must be stripped before upload.
    let reply = gateway(&server, &dir)
        .chat(
            &[],
            "diagnose this",
            Some("data:image/jpeg;base64,QUJD"),
            Language::En,
        )
        .await;
    assert_eq!(reply, "looks like blight");
}

#[tokio::test]
async fn disease_analysis_declares_required_schema() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .and(body_partial_json(json!({
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "required": ["diseaseName", "severity"],
                },
            },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
            r#"{"diseaseName": "Early Blight", "severity": "Moderate"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let report = gateway(&server, &dir)
        .analyze_disease("QUJD", Language::En)
        .await
        .expect("disease report");
    assert_eq!(report.disease_name, "Early Blight");
    assert_eq!(report.severity, "Moderate");
    // Fields the model omitted default to empty.
    assert_eq!(report.organic_steps, "");
}

// ── Reply parsing ─────────────────────────────────────────────

#[tokio::test]
async fn fenced_json_reply_is_parsed() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
            "```json\n{\"isRainExpected\": true, \"intensity\": \"Heavy\"}\n```",
        )))
        .mount(&server)
        .await;

    let outlook = gateway(&server, &dir)
        .check_upcoming_rain("Ludhiana")
        .await
        .expect("rain outlook");
    assert!(outlook.is_rain_expected);
    assert_eq!(outlook.intensity, "Heavy");
}

#[tokio::test]
async fn unparsable_reply_defaults_to_empty_shape() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("no json here")))
        .mount(&server)
        .await;

    let advice = gateway(&server, &dir)
        .irrigation_advice("Wheat", 42.0, 3.5, Language::En)
        .await
        .expect("irrigation advice");
    assert_eq!(advice.water_amount, "");
    assert!(advice.tips.is_empty());
}

#[tokio::test]
async fn tips_list_is_extracted_from_wrapper() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
            r#"{"tips": ["Mulch the beds", "Irrigate at dusk"]}"#,
        )))
        .mount(&server)
        .await;

    let tips = gateway(&server, &dir)
        .weather_advice(32.0, 65.0, "Sunny", Language::En)
        .await
        .expect("tips");
    assert_eq!(tips, vec!["Mulch the beds", "Irrigate at dusk"]);
}

// ── Failure handling ──────────────────────────────────────────

#[tokio::test]
async fn chat_degrades_to_apology_on_server_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let gw = gateway(&server, &dir);
    let english = gw.chat(&[], "help", None, Language::En).await;
    assert!(english.contains("offline mode"));

    let hindi = gw.chat(&[], "help", None, Language::Hi).await;
    assert!(hindi.contains("ऑफ़लाइन"));
}

#[tokio::test]
async fn chat_with_no_text_part_returns_generic_apology() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let reply = gateway(&server, &dir)
        .chat(&[], "help", None, Language::En)
        .await;
    assert_eq!(reply, "I'm sorry, I couldn't process that.");
}

#[tokio::test]
async fn structured_operation_surfaces_server_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = gateway(&server, &dir)
        .analyze_growth("QUJD", "Wheat", Language::En)
        .await;
    assert!(result.is_err());
}

// ── Caching ───────────────────────────────────────────────────

#[tokio::test]
async fn live_weather_is_cached_for_subsequent_calls() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
            r#"{"current": {"temp": 31, "humidity": 58, "condition": "Hazy", "wind": 6, "uv": "High"}, "forecast": []}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway(&server, &dir);
    let first = gw
        .realtime_weather("Ludhiana", Language::En)
        .await
        .expect("weather");
    let second = gw
        .realtime_weather("Ludhiana", Language::En)
        .await
        .expect("weather");
    assert_eq!(first, second);
    assert_eq!(first.current.condition, "Hazy");

    // The entry lands under the documented key format.
    assert!(dir.path().join("weather_Ludhiana_en.json").exists());
}

#[tokio::test]
async fn weather_alerts_are_cached_by_location() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
            r#"{"alerts": [{"title": "Hailstorm watch", "severity": "severe", "description": "Net orchards", "action": "Delay harvest"}]}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway(&server, &dir);
    let first = gw
        .weather_alerts("Nashik", Language::En)
        .await
        .expect("alerts");
    let second = gw
        .weather_alerts("Nashik", Language::En)
        .await
        .expect("alerts");
    assert_eq!(first.len(), 1);
    assert_eq!(second[0].severity, "severe");
    assert!(dir.path().join("weather_alerts_Nashik.json").exists());
}

#[tokio::test]
async fn growth_analysis_parses_declared_fields() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
            r#"{"stage": "Tillering", "health": "Healthy", "analysis": "Uniform stand", "nextSteps": "Top-dress urea"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let analysis = gateway(&server, &dir)
        .analyze_growth("QUJD", "Wheat", Language::En)
        .await
        .expect("growth analysis");
    assert_eq!(analysis.stage, "Tillering");
    assert_eq!(analysis.next_steps, "Top-dress urea");
}

#[tokio::test]
async fn proactive_alerts_hit_network_once() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
            r#"{"alerts": [{"title": "Frost warning", "type": "weather", "description": "Cover seedlings", "urgency": "high"}]}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway(&server, &dir);
    let profile = FarmProfile {
        location: "Pune".to_owned(),
        language: Language::En,
        ..Default::default()
    };
    let first = gw.proactive_alerts(&profile).await.expect("alerts");
    let second = gw.proactive_alerts(&profile).await.expect("alerts");
    assert_eq!(first.len(), 1);
    assert_eq!(second[0].title, "Frost warning");
}

// ── Demo toggles ──────────────────────────────────────────────

#[tokio::test]
async fn demo_operations_never_touch_the_network() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    // Any request at all is a failure.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("{}")))
        .expect(0)
        .mount(&server)
        .await;

    let config = GatewayConfig {
        api_key: "test-key".to_owned(),
        base_url: server.uri(),
        ..Default::default() // demo toggles default on
    };
    let gw = AdvisoryGateway::new(&config, ResponseCache::open(dir.path())).expect("gateway");

    let weather = gw
        .realtime_weather("Ludhiana", Language::En)
        .await
        .expect("weather");
    assert_eq!(weather.forecast.len(), 5);

    let advice = gw
        .fertilizer_advice("Wheat", "Loamy", "Tillering", Language::Hi)
        .await
        .expect("fertilizer");
    assert!(advice.kind.contains("यूरिया"));

    let schemes = gw.schemes(Language::En).await.expect("schemes");
    assert_eq!(schemes.len(), 4);
    assert_eq!(schemes[0].name, "PM Kisan Samman Nidhi");

    let crops = gw
        .crop_recommendations("Ludhiana", "Rabi", "Loamy", Language::En)
        .await
        .expect("crops");
    assert_eq!(crops.len(), 4);
}

#[tokio::test]
async fn live_schemes_parse_and_cache_for_a_day() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
            r#"{"schemes": [{"name": "Kisan Credit Card", "category": "Credit", "description": "Short-term credit", "eligibility": "All farmers", "benefits": "4% interest"}]}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let gw = gateway(&server, &dir);
    let first = gw.schemes(Language::En).await.expect("schemes");
    let second = gw.schemes(Language::En).await.expect("schemes");
    assert_eq!(first, second);
    assert_eq!(first[0].name, "Kisan Credit Card");
    assert!(dir.path().join("schemes_en.json").exists());
}

// ── Speech synthesis ──────────────────────────────────────────

#[tokio::test]
async fn generate_speech_decodes_inline_audio() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    // Four bytes of PCM16: two samples.
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "generationConfig": {"responseModalities": ["AUDIO"]},
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{
                "inlineData": {"mimeType": "audio/pcm;rate=24000", "data": "AAD/fw=="}
            }]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let bytes = gateway(&server, &dir)
        .generate_speech("Namaste", "hi")
        .await
        .expect("audio");
    assert_eq!(bytes, vec![0x00, 0x00, 0xff, 0x7f]);
}

#[tokio::test]
async fn generate_speech_without_audio_is_an_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().expect("tempdir");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("no audio")))
        .mount(&server)
        .await;

    assert!(
        gateway(&server, &dir)
            .generate_speech("hello", "en")
            .await
            .is_err()
    );
}
