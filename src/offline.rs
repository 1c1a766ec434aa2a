//! Deterministic offline responder.
//!
//! Maps free-text queries to canned advisory strings without touching the
//! network, so the most common intents get zero-latency answers in
//! low-connectivity use. Matching is an explicit ordered rule table:
//! the query is lower-cased, rules are tested in order, first match wins.
//! Each rule combines OR'd substrings across English and transliterated
//! or native-script Hindi, Punjabi, and Marathi keywords, and carries
//! per-language replies defaulting to English.
//!
//! `resolve` returning `None` signals the caller to escalate to the
//! advisory gateway.

use crate::profile::Language;

/// How a rule matches the lower-cased query.
enum Predicate {
    /// Whole-query equality against any listed word, or any listed
    /// substring occurring anywhere.
    ExactOrContains {
        exact: &'static [&'static str],
        contains: &'static [&'static str],
    },
    /// Any listed substring occurs.
    Contains(&'static [&'static str]),
    /// Every group has at least one substring hit.
    AllGroups(&'static [&'static [&'static str]]),
}

impl Predicate {
    fn matches(&self, query: &str) -> bool {
        match self {
            Self::ExactOrContains { exact, contains } => {
                exact.iter().any(|w| query == *w)
                    || contains.iter().any(|s| query.contains(s))
            }
            Self::Contains(subs) => subs.iter().any(|s| query.contains(s)),
            Self::AllGroups(groups) => groups
                .iter()
                .all(|group| group.iter().any(|s| query.contains(s))),
        }
    }
}

/// Per-language canned replies; absent languages fall back to English.
struct Replies {
    en: &'static str,
    hi: Option<&'static str>,
    pa: Option<&'static str>,
    mr: Option<&'static str>,
}

impl Replies {
    fn for_language(&self, language: Language) -> &'static str {
        match language {
            Language::En => self.en,
            Language::Hi => self.hi.unwrap_or(self.en),
            Language::Pa => self.pa.unwrap_or(self.en),
            Language::Mr => self.mr.unwrap_or(self.en),
        }
    }
}

struct Rule {
    /// Intent name, for logging only.
    name: &'static str,
    predicate: Predicate,
    replies: Replies,
}

/// Ordered intent table. Order matters: a query mentioning both a price
/// keyword and a weather keyword resolves as market-price, because that
/// rule comes first.
static RULES: &[Rule] = &[
    Rule {
        name: "greeting",
        predicate: Predicate::ExactOrContains {
            exact: &["hi", "hello", "namaste"],
            contains: &["namaste", "hello"],
        },
        replies: Replies {
            en: "Hello! I am Kisan-Bhai. How can I assist you with your farming today?",
            hi: Some("नमस्ते! मैं किसान-भाई हूँ। मैं आज आपकी खेती में कैसे मदद कर सकता हूँ?"),
            pa: Some("ਸਤਿ ਸ੍ਰੀ ਅਕਾਲ! ਮੈਂ ਕਿਸਾਨ-ਭਾਈ ਹਾਂ। ਅੱਜ ਮੈਂ ਤੁਹਾਡੀ ਖੇਤੀ ਵਿੱਚ ਕਿਵੇਂ ਮਦਦ ਕਰ ਸਕਦਾ ਹਾਂ?"),
            mr: Some("नमस्कार! मी किसान-भाई आहे. आज मी तुमच्या शेतीमध्ये कशी मदत करू शकतो?"),
        },
    },
    Rule {
        name: "thanks",
        predicate: Predicate::Contains(&["thank", "dhanyawad", "shukriya"]),
        replies: Replies {
            en: "You're welcome! Feel free to ask if you have any more questions.",
            hi: Some("आपका स्वागत है! यदि आपके कोई और प्रश्न हैं, तो बेझिझक पूछें।"),
            pa: Some("ਤੁਹਾਡਾ ਸੁਆਗਤ ਹੈ! ਜੇ ਤੁਹਾਡੇ ਕੋਈ ਹੋਰ ਸਵਾਲ ਹਨ, ਤਾਂ ਬੇਝਿਜਕ ਪੁੱਛੋ।"),
            mr: Some("तुमचे स्वागत आहे! जर तुमचे आणखी काही प्रश्न असतील तर नक्की विचारा."),
        },
    },
    Rule {
        name: "identity",
        predicate: Predicate::Contains(&["who are you", "tum kaun ho", "kisan-bhai", "kisan bhai"]),
        replies: Replies {
            en: "I am Kisan-Bhai, your personal AI farming advisor. I can help you with crop diseases, weather forecasts, and market prices.",
            hi: Some("मैं किसान-भाई हूँ, आपका व्यक्तिगत एआई (AI) कृषि सलाहकार। मैं आपको फसल की बीमारियों, मौसम, और बाजार के बारे में जानकारी दे सकता हूँ।"),
            pa: Some("ਮੈਂ ਕਿਸਾਨ-ਭਾਈ ਹਾਂ, ਤੁਹਾਡਾ ਨਿੱਜੀ ਏਅਾਈ (AI) ਖੇਤੀ ਸਲਾਹਕਾਰ। ਮੈਂ ਤੁਹਾਨੂੰ ਫਸਲਾਂ ਦੀਆਂ ਬਿਮਾਰੀਆਂ, ਮੌਸਮ ਅਤੇ ਬਾਜ਼ਾਰ ਬਾਰੇ ਜਾਣਕਾਰੀ ਦੇ ਸਕਦਾ ਹਾਂ।"),
            mr: Some("मी किसान-भाई आहे, तुमचा वैयक्तिक एआय (AI) कृषी सल्लागार. मी तुम्हाला पिकांचे आजार, हवामान आणि बाजारपेठेबद्दल माहिती देऊ शकतो."),
        },
    },
    Rule {
        name: "crop-season",
        predicate: Predicate::AllGroups(&[&["crop"], &["season", "plant"]]),
        replies: Replies {
            en: "For the current Rabi season, I recommend planting Wheat (HD 2967 variety) or Mustard (Pusa Bold) for optimal yields based on your soil type.",
            hi: Some("रबी के मौसम के लिए, मैं उच्च उपज के लिए गेहूं (HD 2967) या सरसों (Pusa Bold) लगाने की सलाह देता हूं।"),
            pa: Some("ਹਾੜੀ ਦੇ ਮੌਸਮ ਲਈ, ਮੈਂ ਵੱਧ ਝਾੜ ਲਈ ਕਣਕ (HD 2967) ਜਾਂ ਸਰ੍ਹੋਂ (Pusa Bold) ਬੀਜਣ ਦੀ ਸਲਾਹ ਦਿੰਦਾ ਹਾਂ।"),
            mr: Some("रब्बी हंगामासाठी, मी जास्त उत्पादनासाठी गहू (HD 2967) किंवा मोहरी (Pusa Bold) लावण्याची शिफारस करतो."),
        },
    },
    Rule {
        name: "disease-symptom",
        predicate: Predicate::AllGroups(&[&["tomato"], &["yellow"]]),
        replies: Replies {
            en: "Yellowing tomato leaves often indicate Nitrogen deficiency or early blight. I recommend applying a balanced NPK fertilizer or a basic copper fungicide spray if spots appear.",
            hi: Some("टमाटर के पीले पत्ते नाइट्रोजन की कमी या शुरुआती ब्लाइट का संकेत हो सकते हैं। कृपया फफूंदनाशक का छिड़काव करें या यूरिया डालें।"),
            pa: None,
            mr: None,
        },
    },
    Rule {
        name: "irrigation",
        predicate: Predicate::Contains(&["water", "irrigate", "irrigation"]),
        replies: Replies {
            en: "Soil moisture is currently at 42%. Based on weather forecasts, hold off on watering your wheat crop for the next 3 days as scattered rain is expected.",
            hi: Some("मिट्टी की नमी वर्तमान में 42% है। अपनी गेहूं की फसल को अगले 3 दिनों तक पानी न दें क्योंकि बारिश की संभावना है।"),
            pa: None,
            mr: None,
        },
    },
    Rule {
        name: "government-scheme",
        predicate: Predicate::Contains(&["scheme", "government"]),
        replies: Replies {
            en: "Based on your profile, you are eligible for the 'PM Kisan Samman Nidhi' (₹6,000/year) and the 'PM Fasal Bima Yojana' for crop insurance. Check the Schemes tab for details.",
            hi: Some("आप 'पीएम किसान सम्मान निधि' (6,000 रुपये प्रति वर्ष) और 'पीएम फसल बीमा योजना' (फसल बीमा) के लिए पात्र हैं।"),
            pa: None,
            mr: None,
        },
    },
    Rule {
        name: "market-price",
        predicate: Predicate::Contains(&["rice", "price", "mandi", "rate", "bhav"]),
        replies: Replies {
            en: "Today, the APMC Mandi price for Rice (Paddy) is ₹2,040/qtl, but Direct FPOs are offering ₹2,100/qtl. I strongly recommend selling to the FPO today.",
            hi: Some("आज धान (चावल) का मंडी भाव ₹2,040/क्विंटल है, लेकिन FPO ₹2,100/क्विंटल दे रहे हैं। मैं FPO को बेचने की सलाह देता हूं।"),
            pa: Some("ਅੱਜ ਝੋਨੇ (ਚੌਲ) ਦਾ ਮੰਡੀ ਭਾਅ ₹2,040/ਕੁਇੰਟਲ ਹੈ, ਪਰ FPO ₹2,100/ਕੁਇੰਟਲ ਦੇ ਰਹੇ ਹਨ। ਮੈਂ FPO ਨੂੰ ਵੇਚਣ ਦੀ ਸਲਾਹ ਦਿੰਦਾ ਹਾਂ।"),
            mr: Some("आज धान (तांदूळ) चा बाजार भाव ₹2,040/क्विंटल आहे, परंतु FPO ₹2,100/क्विंटल देत आहेत. मी FPO ला विकण्याची शिफारस करतो."),
        },
    },
    Rule {
        name: "weather",
        predicate: Predicate::Contains(&[
            "weather",
            "forecast",
            "rain",
            "baarish",
            "mausam",
            "temperature",
        ]),
        replies: Replies {
            en: "Currently, it is 32°C with 65% humidity. Expect partly cloudy skies today with a 40% chance of light showers tomorrow evening.",
            hi: Some("आज 65% नमी के साथ 32°C तापमान है। अगले दो दिनों में हल्की बारिश की संभावना है।"),
            pa: Some("ਅੱਜ 65% ਨਮੀ ਦੇ ਨਾਲ 32°C ਤਾਪਮਾਨ ਹੈ। ਅਗਲੇ ਦੋ ਦਿਨਾਂ ਵਿੱਚ ਹਲਕੀ ਬਾਰਿਸ਼ ਹੋਣ ਦੀ ਸੰਭਾਵਨਾ ਹੈ।"),
            mr: Some("आज 65% आर्द्रतेसह 32°C तापमान आहे. पुढील दोन दिवसांत हलक्या पावसाची शक्यता आहे."),
        },
    },
];

/// Resolve a query against the rule table.
///
/// Returns the canned reply for the first matching rule, or `None` when no
/// rule matches and the caller should escalate to the gateway.
#[must_use]
pub fn resolve(query: &str, language: Language) -> Option<&'static str> {
    let q = query.to_lowercase();
    let rule = RULES.iter().find(|rule| rule.predicate.matches(&q))?;
    tracing::debug!(intent = rule.name, "offline rule matched");
    Some(rule.replies.for_language(language))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_matches_exact_and_substring() {
        assert!(resolve("hi", Language::En).is_some());
        assert!(resolve("Namaste ji", Language::En).is_some());
        // "hi" as a substring alone must not match (e.g. inside other words).
        assert!(resolve("shipment", Language::En).is_none());
    }

    #[test]
    fn resolve_is_deterministic() {
        let a = resolve("What is the weather", Language::Hi);
        let b = resolve("What is the weather", Language::Hi);
        assert_eq!(a, b);
        assert!(a.is_some());
    }

    #[test]
    fn weather_query_in_hindi_returns_hindi_string() {
        let reply = resolve("What is the weather", Language::Hi).expect("weather rule");
        assert!(reply.contains("32°C"));
        assert!(reply.contains("नमी"));
    }

    #[test]
    fn missing_language_falls_back_to_english() {
        // The tomato rule has no Punjabi entry.
        let reply = resolve("my tomato leaves are yellow", Language::Pa).expect("tomato rule");
        assert!(reply.starts_with("Yellowing tomato leaves"));
    }

    #[test]
    fn crop_needs_both_keyword_groups() {
        assert!(resolve("which crop this season", Language::En).is_some());
        assert!(resolve("what to plant this season", Language::En).is_none());
    }

    #[test]
    fn market_price_precedes_weather() {
        // "rate" hits market-price even though the query also mentions rain.
        let reply = resolve("rate today, will it rain?", Language::En).expect("price rule");
        assert!(reply.contains("Mandi"));
    }

    #[test]
    fn unmatched_query_escalates() {
        assert!(resolve("how do I rotate sugarcane with pulses", Language::En).is_none());
    }

    #[test]
    fn case_is_ignored() {
        assert!(resolve("THANK YOU", Language::En).is_some());
    }
}
