//! Demonstration payloads for operations that can run without the network.
//!
//! These fixtures mirror the live operations' declared shapes exactly, so
//! callers cannot tell the two paths apart. Hindi gets localized values;
//! other languages receive the English fixture.

use super::types::{
    CropRecommendation, CurrentWeather, FertilizerAdvice, ForecastDay, Scheme, WeatherReport,
};
use crate::profile::Language;

fn pick(language: Language, hi: &str, en: &str) -> String {
    match language {
        Language::Hi => hi.to_owned(),
        _ => en.to_owned(),
    }
}

/// Fixed weather report: clear and mild today, rain midweek.
pub fn weather_report(language: Language) -> WeatherReport {
    WeatherReport {
        current: CurrentWeather {
            temp: 15.0,
            humidity: 45.0,
            condition: pick(language, "साफ", "Clear"),
            wind: 8.0,
            uv: "Low".to_owned(),
        },
        forecast: vec![
            ForecastDay {
                day: pick(language, "आज", "Today"),
                high: 34.0,
                low: 22.0,
                condition: pick(language, "धूप", "Sunny"),
            },
            ForecastDay {
                day: pick(language, "कल", "Tomorrow"),
                high: 33.0,
                low: 21.0,
                condition: pick(language, "बादल", "Cloudy"),
            },
            ForecastDay {
                day: pick(language, "बुधवार", "Wed"),
                high: 31.0,
                low: 20.0,
                condition: pick(language, "बारिश", "Rain"),
            },
            ForecastDay {
                day: pick(language, "गुरुवार", "Thu"),
                high: 32.0,
                low: 19.0,
                condition: pick(language, "साफ", "Clear"),
            },
            ForecastDay {
                day: pick(language, "शुक्रवार", "Fri"),
                high: 35.0,
                low: 23.0,
                condition: pick(language, "धूप", "Sunny"),
            },
        ],
    }
}

/// Fixed fertilizer guidance: urea/DAP mix for the default crop plan.
pub fn fertilizer_advice(language: Language) -> FertilizerAdvice {
    FertilizerAdvice {
        kind: pick(language, "यूरिया और डीएपी (DAP) मिश्रण", "Urea & DAP Mixture"),
        quantity: pick(language, "50 किलो प्रति एकड़", "50 kg per acre"),
        timing: pick(
            language,
            "सुबह या शाम के समय, मिट्टी में नमी होने पर",
            "Morning or evening, when soil has proper moisture",
        ),
        application_method: pick(
            language,
            "छिड़काव विधि (Broadcasting) या जड़ के पास देना (Band Placement)",
            "Broadcasting or Band Placement near roots",
        ),
        precautions: pick(
            language,
            "समान रूप से छिड़काव करें, तेज धूप में प्रयोग से बचें, और दस्ताने पहनें।",
            "Apply evenly, avoid application in strong sunlight, and wear gloves.",
        ),
    }
}

/// Fixed list of central government schemes.
pub fn schemes(language: Language) -> Vec<Scheme> {
    vec![
        Scheme {
            name: pick(language, "पीएम किसान सम्मान निधि", "PM Kisan Samman Nidhi"),
            category: "Financial Support".to_owned(),
            description: pick(
                language,
                "किसानों को प्रति वर्ष ₹6000 की वित्तीय सहायता।",
                "Financial assistance of ₹6000 per year to farmers.",
            ),
            eligibility: pick(
                language,
                "सभी छोटे और सीमांत किसान परिवार",
                "All small and marginal farming families",
            ),
            benefits: "₹6000 / year".to_owned(),
        },
        Scheme {
            name: pick(language, "पीएम फसल बीमा योजना", "PM Fasal Bima Yojana"),
            category: "Insurance".to_owned(),
            description: pick(
                language,
                "प्राकृतिक आपदाओं से फसल के नुकसान के लिए बीमा कवर।",
                "Insurance cover for crop loss due to natural calamities.",
            ),
            eligibility: pick(
                language,
                "अधिसूचित क्षेत्र में फसल उगाने वाले किसान",
                "Farmers growing crops in notified areas",
            ),
            benefits: "Crop Loss Coverage".to_owned(),
        },
        Scheme {
            name: pick(language, "कृषि अवसंरचना कोष", "Agriculture Infrastructure Fund"),
            category: "Infrastructure".to_owned(),
            description: pick(
                language,
                "फसल कटाई के बाद के प्रबंधन के लिए मध्यम लंबी अवधि के ऋण।",
                "Medium-long term debt financing facility for post-harvest management.",
            ),
            eligibility: pick(
                language,
                "प्राथमिक कृषि ऋण समितियां (PACS), विपणन सहकारी समितियां",
                "PACS, Marketing Cooperative Societies",
            ),
            benefits: "3% Interest Subvention".to_owned(),
        },
        Scheme {
            name: pick(language, "मृदा स्वास्थ्य कार्ड योजना", "Soil Health Card Scheme"),
            category: "Soil Health".to_owned(),
            description: pick(
                language,
                "मिट्टी की पोषक स्थिति का आकलन करने के लिए।",
                "To assess the nutrient status of the soil.",
            ),
            eligibility: pick(language, "सभी किसान", "All Farmers"),
            benefits: "Free Soil Testing".to_owned(),
        },
    ]
}

/// Fixed Rabi-season crop recommendations.
pub fn crop_recommendations(language: Language) -> Vec<CropRecommendation> {
    vec![
        CropRecommendation {
            name: pick(language, "गेहूं (एचडी 2967)", "Wheat (HD 2967)"),
            risk: pick(language, "मध्यम", "Medium"),
            profit_potential: pick(language, "उच्च", "High"),
            water_need: pick(language, "मध्यम (3-4 सिंचाई)", "Med (3-4 irrigations)"),
        },
        CropRecommendation {
            name: pick(language, "चना (देसी)", "Chickpea (Desi)"),
            risk: pick(language, "कम", "Low"),
            profit_potential: pick(language, "मध्यम", "Medium"),
            water_need: pick(language, "बहुत कम (1-2 सिंचाई)", "Low (1-2 irrigations)"),
        },
        CropRecommendation {
            name: pick(language, "सरसों (पूसा बोल्ड)", "Mustard (Pusa Bold)"),
            risk: pick(language, "कम", "Low"),
            profit_potential: pick(language, "उच्च", "High"),
            water_need: pick(language, "कम (2 सिंचाई)", "Low (2 irrigations)"),
        },
        CropRecommendation {
            name: pick(language, "लहसुन", "Garlic"),
            risk: pick(language, "उच्च (बाजार जोखिम)", "High (Market Volatile)"),
            profit_potential: pick(language, "बहुत उच्च", "Very High"),
            water_need: pick(language, "उच्च", "High"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_has_five_forecast_days() {
        let report = weather_report(Language::En);
        assert_eq!(report.forecast.len(), 5);
        assert_eq!(report.current.condition, "Clear");
    }

    #[test]
    fn hindi_fixtures_are_localized() {
        assert_eq!(weather_report(Language::Hi).current.condition, "साफ");
        assert_eq!(schemes(Language::Hi)[0].name, "पीएम किसान सम्मान निधि");
        // Punjabi has no dedicated fixture and gets English.
        assert_eq!(weather_report(Language::Pa).current.condition, "Clear");
    }

    #[test]
    fn four_schemes_and_four_crops() {
        assert_eq!(schemes(Language::En).len(), 4);
        assert_eq!(crop_recommendations(Language::En).len(), 4);
    }
}
