//! Advisory gateway to the generative-AI provider.
//!
//! One async operation per advisory category. Each operation builds a
//! natural-language prompt embedding its parameters and a language
//! directive, declares the expected reply shape as a response schema,
//! POSTs to a `models/{model}:generateContent` endpoint, and parses the
//! raw text reply as the declared shape. Missing fields default to empty
//! values; a failed network call on the chat path degrades to a static
//! bilingual apology instead of surfacing an error.
//!
//! Weather, alert, and scheme lookups populate the response cache with
//! category-specific TTLs and consult it before calling out. Four
//! operations can be switched to fixed demonstration payloads via
//! [`DemoConfig`](crate::config::DemoConfig); both paths are first-class.

pub mod demo;
pub mod types;

use crate::cache::{
    ALERTS_CACHE_TIME_MS, ResponseCache, SCHEMES_CACHE_TIME_MS, WEATHER_CACHE_TIME_MS,
};
use crate::config::GatewayConfig;
use crate::error::{AdvisoryError, Result};
use crate::messages::{ChatMessage, Role};
use crate::profile::{FarmProfile, Language};
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, warn};
use types::{
    Alert, CropRecommendation, DiseaseReport, FertilizerAdvice, GrowthAnalysis, IrrigationAdvice,
    RainOutlook, Scheme, WeatherAlert, WeatherReport,
};

/// Gateway to the generative-AI advisory endpoint.
pub struct AdvisoryGateway {
    config: GatewayConfig,
    api_key: String,
    client: reqwest::Client,
    cache: ResponseCache,
}

impl AdvisoryGateway {
    /// Create a gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when no API credential is configured.
    pub fn new(config: &GatewayConfig, cache: ResponseCache) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        info!("advisory gateway configured: {}", config.base_url);
        Ok(Self {
            config: config.clone(),
            api_key,
            client: reqwest::Client::new(),
            cache,
        })
    }

    /// The resolved API key (used by the live voice session).
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Gateway configuration (used by the live voice session).
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    // ── Conversation ──────────────────────────────────────────

    /// Free-form chat with conversation history and an optional image.
    ///
    /// Never fails from the caller's perspective: a network failure
    /// returns the static offline-mode apology in the user's language, and
    /// a reply with no text returns a generic apology.
    pub async fn chat(
        &self,
        history: &[ChatMessage],
        message: &str,
        image_base64: Option<&str>,
        language: Language,
    ) -> String {
        let mut contents: Vec<serde_json::Value> = history
            .iter()
            .map(|msg| {
                json!({
                    "role": match msg.role {
                        Role::User => "user",
                        Role::Assistant => "model",
                    },
                    "parts": [{"text": msg.content}],
                })
            })
            .collect();

        let mut parts: Vec<serde_json::Value> = Vec::new();
        if !message.trim().is_empty() {
            parts.push(json!({"text": message}));
        }
        if let Some(image) = image_base64 {
            parts.push(json!({
                "inlineData": {
                    "mimeType": "image/jpeg",
                    "data": strip_data_url(image),
                }
            }));
        }
        contents.push(json!({"role": "user", "parts": parts}));

        let body = json!({
            "contents": contents,
            "systemInstruction": {
                "parts": [{
                    "text": format!(
                        "You are Kisan-Bhai, the friendly AI Farmer advisor. {} Help with diseases, irrigation, and crop planning.",
                        language_directive(language),
                    )
                }]
            },
        });

        match self.generate(&self.config.flash_model, body).await {
            Ok(response) => extract_text(&response)
                .map(str::to_owned)
                .unwrap_or_else(|| "I'm sorry, I couldn't process that.".to_owned()),
            Err(e) => {
                warn!("chat request failed, degrading to offline apology: {e}");
                connection_apology(language).to_owned()
            }
        }
    }

    /// Synthesize speech for `text`, returning raw signed 16-bit
    /// little-endian PCM, mono, 24000 Hz.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the reply carries no audio.
    pub async fn generate_speech(&self, text: &str, lang_code: &str) -> Result<Vec<u8>> {
        let voice = voice_name(lang_code);
        let body = json!({
            "contents": [{"parts": [{"text": format!("Say in {lang_code}: {text}")}]}],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {"prebuiltVoiceConfig": {"voiceName": voice}},
                },
            },
        });

        let response = self.generate(&self.config.flash_model, body).await?;
        let encoded = extract_inline_data(&response)
            .ok_or_else(|| AdvisoryError::Gateway("reply carried no audio data".to_owned()))?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| AdvisoryError::Gateway(format!("audio payload is not base64: {e}")))
    }

    // ── Image analysis ────────────────────────────────────────

    /// Diagnose a crop disease from a leaf photo.
    ///
    /// # Errors
    ///
    /// Returns an error if the network call fails.
    pub async fn analyze_disease(
        &self,
        image_base64: &str,
        language: Language,
    ) -> Result<DiseaseReport> {
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "diseaseName": {"type": "STRING"},
                "severity": {"type": "STRING"},
                "organicSteps": {"type": "STRING"},
                "chemicalSteps": {"type": "STRING"},
            },
            "required": ["diseaseName", "severity"],
        });
        let body = image_request(
            image_base64,
            &format!("Analyze crop disease in {}.", language.code()),
            schema,
        );
        let response = self.generate(&self.config.pro_model, body).await?;
        Ok(as_shape(reply_json(&response)))
    }

    /// Analyze growth stage and health from a crop photo.
    ///
    /// # Errors
    ///
    /// Returns an error if the network call fails.
    pub async fn analyze_growth(
        &self,
        image_base64: &str,
        crop_type: &str,
        language: Language,
    ) -> Result<GrowthAnalysis> {
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "stage": {"type": "STRING"},
                "health": {"type": "STRING"},
                "analysis": {"type": "STRING"},
                "nextSteps": {"type": "STRING"},
            },
        });
        let body = image_request(
            image_base64,
            &format!("Growth analysis for {crop_type} in {}.", language.code()),
            schema,
        );
        let response = self.generate(&self.config.pro_model, body).await?;
        Ok(as_shape(reply_json(&response)))
    }

    // ── Weather ───────────────────────────────────────────────

    /// Current weather plus a 5-day forecast.
    ///
    /// Demo-toggled. The live path consults the cache first and stores
    /// fresh results for 15 minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the live network call fails.
    pub async fn realtime_weather(
        &self,
        location: &str,
        language: Language,
    ) -> Result<WeatherReport> {
        if self.config.demo.weather {
            return Ok(demo::weather_report(language));
        }

        let key = format!("{location}_{}", language.code());
        if let Some(cached) = self.cache.get("weather", &key) {
            return Ok(as_shape(cached));
        }

        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "current": {
                    "type": "OBJECT",
                    "properties": {
                        "temp": {"type": "NUMBER"},
                        "humidity": {"type": "NUMBER"},
                        "condition": {"type": "STRING"},
                        "wind": {"type": "NUMBER"},
                        "uv": {"type": "STRING"},
                    },
                },
                "forecast": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "day": {"type": "STRING"},
                            "high": {"type": "NUMBER"},
                            "low": {"type": "NUMBER"},
                            "condition": {"type": "STRING"},
                        },
                    },
                },
            },
        });
        let prompt = format!(
            "Current weather and 5-day forecast for {location} in {}. JSON format.",
            language.code()
        );
        let body = search_grounded_request(&prompt, schema);
        let response = self.generate(&self.config.flash_model, body).await?;
        let report: WeatherReport = as_shape(reply_json(&response));
        self.store("weather", &key, &report, WEATHER_CACHE_TIME_MS);
        Ok(report)
    }

    /// Short-horizon heavy-rain outlook for the next 24 hours.
    ///
    /// # Errors
    ///
    /// Returns an error if the network call fails.
    pub async fn check_upcoming_rain(&self, location: &str) -> Result<RainOutlook> {
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "isRainExpected": {"type": "BOOLEAN"},
                "intensity": {"type": "STRING"},
                "timing": {"type": "STRING"},
                "recommendation": {"type": "STRING"},
            },
            "required": ["isRainExpected"],
        });
        let prompt = format!("Is heavy rain predicted in {location} next 24h? Respond JSON.");
        let body = search_grounded_request(&prompt, schema);
        let response = self.generate(&self.config.flash_model, body).await?;
        Ok(as_shape(reply_json(&response)))
    }

    /// Critical weather alerts for the given location, cached 15 minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the network call fails.
    pub async fn weather_alerts(
        &self,
        location: &str,
        language: Language,
    ) -> Result<Vec<WeatherAlert>> {
        if let Some(cached) = self.cache.get("weather_alerts", location) {
            return Ok(as_shape(cached));
        }

        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "alerts": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "title": {"type": "STRING"},
                            "severity": {"type": "STRING"},
                            "description": {"type": "STRING"},
                            "action": {"type": "STRING"},
                        },
                    },
                },
            },
        });
        let prompt = format!(
            "Critical weather alerts for farmers in {location} in {}.",
            language.code()
        );
        let body = search_grounded_request(&prompt, schema);
        let response = self.generate(&self.config.flash_model, body).await?;
        let mut reply = reply_json(&response);
        let alerts: Vec<WeatherAlert> = as_shape(take_field(&mut reply, "alerts"));
        self.store("weather_alerts", location, &alerts, WEATHER_CACHE_TIME_MS);
        Ok(alerts)
    }

    /// General growing tips for the given conditions.
    ///
    /// # Errors
    ///
    /// Returns an error if the network call fails.
    pub async fn weather_advice(
        &self,
        temp: f64,
        humidity: f64,
        condition: &str,
        language: Language,
    ) -> Result<Vec<String>> {
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "tips": {"type": "ARRAY", "items": {"type": "STRING"}},
            },
        });
        let prompt = format!(
            "Tips for {temp}C, {humidity}%, {condition} in {}.",
            language.code()
        );
        let body = schema_request(&prompt, schema);
        let response = self.generate(&self.config.flash_model, body).await?;
        let mut reply = reply_json(&response);
        Ok(as_shape(take_field(&mut reply, "tips")))
    }

    // ── Advisory lookups ──────────────────────────────────────

    /// Two proactive alerts for the profile's location, cached 30 minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the network call fails.
    pub async fn proactive_alerts(&self, profile: &FarmProfile) -> Result<Vec<Alert>> {
        let key = format!("{}_{}", profile.location, profile.language.code());
        if let Some(cached) = self.cache.get("alerts", &key) {
            return Ok(as_shape(cached));
        }

        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "alerts": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "title": {"type": "STRING"},
                            "type": {"type": "STRING"},
                            "description": {"type": "STRING"},
                            "urgency": {"type": "STRING"},
                        },
                    },
                },
            },
        });
        let prompt = format!(
            "Generate 2 proactive alerts for {} in {}.",
            profile.location,
            profile.language.code()
        );
        let body = schema_request(&prompt, schema);
        let response = self.generate(&self.config.flash_model, body).await?;
        let mut reply = reply_json(&response);
        let alerts: Vec<Alert> = as_shape(take_field(&mut reply, "alerts"));
        self.store("alerts", &key, &alerts, ALERTS_CACHE_TIME_MS);
        Ok(alerts)
    }

    /// Fertilizer guidance for a crop at a growth stage in a soil type.
    ///
    /// Demo-toggled.
    ///
    /// # Errors
    ///
    /// Returns an error if the live network call fails.
    pub async fn fertilizer_advice(
        &self,
        crop: &str,
        soil: &str,
        stage: &str,
        language: Language,
    ) -> Result<FertilizerAdvice> {
        if self.config.demo.fertilizer {
            return Ok(demo::fertilizer_advice(language));
        }

        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "type": {"type": "STRING"},
                "quantity": {"type": "STRING"},
                "timing": {"type": "STRING"},
                "applicationMethod": {"type": "STRING"},
                "precautions": {"type": "STRING"},
            },
        });
        let prompt = format!(
            "Fertilizer advice for {crop} at {stage} in {soil} soil in {}.",
            language.code()
        );
        let body = schema_request(&prompt, schema);
        let response = self.generate(&self.config.pro_model, body).await?;
        Ok(as_shape(reply_json(&response)))
    }

    /// Irrigation guidance from soil moisture and recent rainfall.
    ///
    /// # Errors
    ///
    /// Returns an error if the network call fails.
    pub async fn irrigation_advice(
        &self,
        crop: &str,
        moisture_pct: f64,
        rain_mm: f64,
        language: Language,
    ) -> Result<IrrigationAdvice> {
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "waterAmount": {"type": "STRING"},
                "duration": {"type": "STRING"},
                "urgency": {"type": "STRING"},
                "tips": {"type": "ARRAY", "items": {"type": "STRING"}},
            },
        });
        let prompt = format!(
            "Irrigation for {crop}, {moisture_pct}% moisture, {rain_mm}mm rain in {}.",
            language.code()
        );
        let body = schema_request(&prompt, schema);
        let response = self.generate(&self.config.pro_model, body).await?;
        Ok(as_shape(reply_json(&response)))
    }

    /// Government support schemes, cached 24 hours on the live path.
    ///
    /// Demo-toggled.
    ///
    /// # Errors
    ///
    /// Returns an error if the live network call fails.
    pub async fn schemes(&self, language: Language) -> Result<Vec<Scheme>> {
        if self.config.demo.schemes {
            return Ok(demo::schemes(language));
        }

        if let Some(cached) = self.cache.get("schemes", language.code()) {
            return Ok(as_shape(cached));
        }

        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "schemes": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "name": {"type": "STRING"},
                            "category": {"type": "STRING"},
                            "description": {"type": "STRING"},
                            "eligibility": {"type": "STRING"},
                            "benefits": {"type": "STRING"},
                        },
                    },
                },
            },
        });
        let prompt = format!("Indian agri schemes in {}.", language.code());
        let body = search_grounded_request(&prompt, schema);
        let response = self.generate(&self.config.flash_model, body).await?;
        let mut reply = reply_json(&response);
        let schemes: Vec<Scheme> = as_shape(take_field(&mut reply, "schemes"));
        self.store("schemes", language.code(), &schemes, SCHEMES_CACHE_TIME_MS);
        Ok(schemes)
    }

    /// Crop recommendations for a location, season, and soil type.
    ///
    /// Demo-toggled.
    ///
    /// # Errors
    ///
    /// Returns an error if the live network call fails.
    pub async fn crop_recommendations(
        &self,
        location: &str,
        season: &str,
        soil: &str,
        language: Language,
    ) -> Result<Vec<CropRecommendation>> {
        if self.config.demo.crops {
            return Ok(demo::crop_recommendations(language));
        }

        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "crops": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "name": {"type": "STRING"},
                            "risk": {"type": "STRING"},
                            "profitPotential": {"type": "STRING"},
                            "waterNeed": {"type": "STRING"},
                        },
                    },
                },
            },
        });
        let prompt = format!(
            "Recommend crops for {location}, {season}, {soil} in {}.",
            language.code()
        );
        let body = search_grounded_request(&prompt, schema);
        let response = self.generate(&self.config.pro_model, body).await?;
        let mut reply = reply_json(&response);
        Ok(as_shape(take_field(&mut reply, "crops")))
    }

    // ── Transport ─────────────────────────────────────────────

    /// POST a generateContent request and return the parsed reply envelope.
    async fn generate(&self, model: &str, body: serde_json::Value) -> Result<serde_json::Value> {
        let base = self.config.base_url.trim_end_matches('/');
        let url = format!("{base}/v1beta/models/{model}:generateContent");
        debug!("gateway request: {model}");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| AdvisoryError::Gateway(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AdvisoryError::Gateway(format!(
                "API returned {status}: {detail}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AdvisoryError::Gateway(format!("invalid JSON reply: {e}")))
    }

    /// Cache a successful lookup; storage failures are logged, not raised.
    fn store<T: serde::Serialize>(&self, namespace: &str, key: &str, value: &T, ttl_ms: u64) {
        match serde_json::to_value(value) {
            Ok(value) => {
                if let Err(e) = self.cache.set(namespace, key, value, ttl_ms) {
                    warn!("failed to cache {namespace} entry: {e}");
                }
            }
            Err(e) => warn!("failed to serialize {namespace} entry for cache: {e}"),
        }
    }
}

// ── Request builders ──────────────────────────────────────────

/// Text prompt with a declared JSON response schema.
fn schema_request(prompt: &str, schema: serde_json::Value) -> serde_json::Value {
    json!({
        "contents": [{"parts": [{"text": prompt}]}],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": schema,
        },
    })
}

/// Like [`schema_request`], with search grounding enabled for lookups
/// that need fresh real-world data.
fn search_grounded_request(prompt: &str, schema: serde_json::Value) -> serde_json::Value {
    let mut body = schema_request(prompt, schema);
    body["tools"] = json!([{"googleSearch": {}}]);
    body
}

/// Image part plus a text prompt, with a declared JSON response schema.
fn image_request(image_base64: &str, prompt: &str, schema: serde_json::Value) -> serde_json::Value {
    json!({
        "contents": [{"parts": [
            {"inlineData": {"mimeType": "image/jpeg", "data": strip_data_url(image_base64)}},
            {"text": prompt},
        ]}],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": schema,
        },
    })
}

// ── Reply parsing ─────────────────────────────────────────────

/// First text part of the first candidate, if any.
fn extract_text(response: &serde_json::Value) -> Option<&str> {
    response["candidates"][0]["content"]["parts"][0]["text"].as_str()
}

/// First inline-data payload of the first candidate (synthesized audio).
fn extract_inline_data(response: &serde_json::Value) -> Option<&str> {
    response["candidates"][0]["content"]["parts"][0]["inlineData"]["data"].as_str()
}

/// Parse the reply text as JSON after stripping any markdown fences.
/// Returns `Value::Null` when there is no parsable JSON, so downstream
/// shapes fall back to their defaults.
fn reply_json(response: &serde_json::Value) -> serde_json::Value {
    let Some(text) = extract_text(response) else {
        return serde_json::Value::Null;
    };
    serde_json::from_str(strip_code_fences(text.trim())).unwrap_or(serde_json::Value::Null)
}

/// Deserialize into the declared shape, defaulting on any mismatch.
fn as_shape<T: DeserializeOwned + Default>(value: serde_json::Value) -> T {
    serde_json::from_value(value).unwrap_or_default()
}

/// Take a named field out of a reply object, `Null` when absent or when
/// the reply is not an object at all.
fn take_field(value: &mut serde_json::Value, field: &str) -> serde_json::Value {
    value
        .get_mut(field)
        .map(serde_json::Value::take)
        .unwrap_or(serde_json::Value::Null)
}

/// Remove a surrounding ```json fence, if present.
fn strip_code_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    rest.strip_suffix("```")
        .map_or(rest, |r| r.strip_suffix('\n').unwrap_or(r))
}

/// Drop a `data:image/jpeg;base64,` style prefix if present.
fn strip_data_url(image: &str) -> &str {
    image.split_once(',').map_or(image, |(_, data)| data)
}

/// Language directive embedded in prompts.
fn language_directive(language: Language) -> String {
    format!(
        "The user's preferred language is {}. Please respond in that language.",
        language.display_name()
    )
}

/// Prebuilt synthesis voice per language: Indic languages use Kore.
fn voice_name(lang_code: &str) -> &'static str {
    match lang_code {
        "hi" | "pa" | "mr" => "Kore",
        _ => "Puck",
    }
}

/// Static offline-mode apology shown when the chat network call fails.
fn connection_apology(language: Language) -> &'static str {
    match language {
        Language::Hi => {
            "मैं अभी ऑफ़लाइन मोड में हूँ या नेटवर्क त्रुटि है। लेकिन मैं मौसम, आज के बाज़ार भाव (जैसे- चावल), या फसल बोने की सलाह के बारे में सवालों के जवाब दे सकता हूँ।"
        }
        _ => {
            "I am currently operating in offline mode due to an API quota error. However, you can still ask me about today's market prices (like Rice), crop planting seasons, or weather forecasts!"
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn data_url_prefix_is_dropped() {
        assert_eq!(strip_data_url("data:image/jpeg;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_url("QUJD"), "QUJD");
    }

    #[test]
    fn indic_languages_use_kore_voice() {
        assert_eq!(voice_name("hi"), "Kore");
        assert_eq!(voice_name("pa"), "Kore");
        assert_eq!(voice_name("mr"), "Kore");
        assert_eq!(voice_name("en"), "Puck");
    }

    #[test]
    fn reply_text_extraction() {
        let response = json!({
            "candidates": [{"content": {"parts": [{"text": "hello"}]}}]
        });
        assert_eq!(extract_text(&response), Some("hello"));
        assert_eq!(extract_text(&json!({})), None);
    }

    #[test]
    fn unparsable_reply_becomes_default_shape() {
        let response = json!({
            "candidates": [{"content": {"parts": [{"text": "not json"}]}}]
        });
        let report: DiseaseReport = as_shape(reply_json(&response));
        assert_eq!(report.disease_name, "");
    }

    #[test]
    fn directive_names_the_language() {
        assert!(language_directive(Language::Mr).contains("Marathi"));
        assert!(language_directive(Language::En).contains("English"));
    }

    #[test]
    fn search_grounding_adds_tools() {
        let body = search_grounded_request("q", json!({"type": "OBJECT"}));
        assert_eq!(body["tools"][0]["googleSearch"], json!({}));
    }
}
