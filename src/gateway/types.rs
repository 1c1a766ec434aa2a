//! Declared response shapes for advisory operations.
//!
//! Each operation declares a fixed set of named string/array fields and
//! parses the raw model reply as that shape. Every field is
//! `#[serde(default)]` so a missing field becomes an empty value rather
//! than a parse error — the caller-declared shape is the invariant, not
//! the provider's exact output.

use serde::{Deserialize, Serialize};

/// Crop disease diagnosis from a leaf image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiseaseReport {
    pub disease_name: String,
    pub severity: String,
    pub organic_steps: String,
    pub chemical_steps: String,
}

/// Current conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CurrentWeather {
    pub temp: f64,
    pub humidity: f64,
    pub condition: String,
    pub wind: f64,
    pub uv: String,
}

/// One forecast day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForecastDay {
    pub day: String,
    pub high: f64,
    pub low: f64,
    pub condition: String,
}

/// Current weather plus a 5-day forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeatherReport {
    pub current: CurrentWeather,
    pub forecast: Vec<ForecastDay>,
}

/// A proactive advisory alert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Alert {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub urgency: String,
}

/// A critical weather alert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeatherAlert {
    pub title: String,
    pub severity: String,
    pub description: String,
    pub action: String,
}

/// Fertilizer guidance for a crop/soil/stage combination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FertilizerAdvice {
    #[serde(rename = "type")]
    pub kind: String,
    pub quantity: String,
    pub timing: String,
    pub application_method: String,
    pub precautions: String,
}

/// Irrigation guidance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IrrigationAdvice {
    pub water_amount: String,
    pub duration: String,
    pub urgency: String,
    pub tips: Vec<String>,
}

/// Short-horizon rain outlook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RainOutlook {
    pub is_rain_expected: bool,
    pub intensity: String,
    pub timing: String,
    pub recommendation: String,
}

/// Growth-stage analysis of a crop photo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrowthAnalysis {
    pub stage: String,
    pub health: String,
    pub analysis: String,
    pub next_steps: String,
}

/// A government support scheme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scheme {
    pub name: String,
    pub category: String,
    pub description: String,
    pub eligibility: String,
    pub benefits: String,
}

/// A recommended crop with its risk/return profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CropRecommendation {
    pub name: String,
    pub risk: String,
    pub profit_potential: String,
    pub water_need: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn missing_fields_default_to_empty() {
        let report: DiseaseReport =
            serde_json::from_str(r#"{"diseaseName": "Early Blight"}"#).unwrap();
        assert_eq!(report.disease_name, "Early Blight");
        assert_eq!(report.severity, "");
        assert_eq!(report.organic_steps, "");
    }

    #[test]
    fn empty_object_parses_to_defaults() {
        let advice: IrrigationAdvice = serde_json::from_str("{}").unwrap();
        assert!(advice.tips.is_empty());
        assert_eq!(advice.urgency, "");
    }

    #[test]
    fn renamed_fields_round_trip() {
        let advice = FertilizerAdvice {
            kind: "Urea".to_owned(),
            ..Default::default()
        };
        let value = serde_json::to_value(&advice).unwrap();
        assert_eq!(value["type"], "Urea");
        assert!(value["applicationMethod"].is_string());
    }
}
