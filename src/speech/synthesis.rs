//! One-shot speech synthesis with local-voice preference.
//!
//! `speak` is a two-state toggle: Idle → Speaking → Idle, at most one
//! utterance audible at a time. The text's script and the user's
//! language preference pick a target locale; a local voice backend is
//! preferred when it can serve that locale, otherwise audio is
//! synthesized over the network and played back as 24 kHz PCM. Every
//! failure path resets state to Idle without raising.

use crate::gateway::AdvisoryGateway;
use crate::profile::Language;
use crate::speech::output::SpeechSink;
use crate::speech::pcm;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// A locally installed synthesis voice.
#[derive(Debug, Clone)]
pub struct VoiceInfo {
    pub name: String,
    /// BCP-47 locale tag, e.g. `hi-IN`.
    pub locale: String,
}

/// Local platform synthesis backend.
///
/// The default [`NoLocalVoices`] reports no engine, which routes all
/// synthesis through the network; a platform integration implements this
/// to serve matching locales on-device.
pub trait VoiceBackend: Send + Sync {
    /// Whether a local synthesis engine exists at all.
    fn available(&self) -> bool;

    /// Installed voices.
    fn voices(&self) -> Vec<VoiceInfo>;

    /// Synthesize `text` for `locale`, returning samples and their rate.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot synthesize the text.
    fn synthesize(&self, text: &str, locale: &str) -> crate::error::Result<(Vec<f32>, u32)>;
}

/// Absent local engine: every locale goes to the network.
pub struct NoLocalVoices;

impl VoiceBackend for NoLocalVoices {
    fn available(&self) -> bool {
        false
    }

    fn voices(&self) -> Vec<VoiceInfo> {
        Vec::new()
    }

    fn synthesize(&self, _text: &str, locale: &str) -> crate::error::Result<(Vec<f32>, u32)> {
        Err(crate::error::AdvisoryError::Speech(format!(
            "no local voice for {locale}"
        )))
    }
}

/// One-shot speech pipeline.
pub struct SpeechPipeline {
    gateway: Arc<AdvisoryGateway>,
    sink: Arc<dyn SpeechSink>,
    voices: Arc<dyn VoiceBackend>,
    speaking: Arc<AtomicBool>,
    output_sample_rate: u32,
}

impl SpeechPipeline {
    /// Build a pipeline over the given sink and local voice backend.
    pub fn new(
        gateway: Arc<AdvisoryGateway>,
        sink: Arc<dyn SpeechSink>,
        voices: Arc<dyn VoiceBackend>,
        output_sample_rate: u32,
    ) -> Self {
        Self {
            gateway,
            sink,
            voices,
            speaking: Arc::new(AtomicBool::new(false)),
            output_sample_rate,
        }
    }

    /// Whether an utterance is currently audible.
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    /// Speak `text`, or stop the active utterance if one is playing.
    ///
    /// Empty text is ignored. All failures reset state to Idle.
    pub async fn speak(&self, text: &str, language: Language) {
        if text.trim().is_empty() {
            return;
        }

        // Acts as a stop toggle while speaking.
        if self.speaking.swap(true, Ordering::SeqCst) {
            self.sink.stop();
            self.speaking.store(false, Ordering::SeqCst);
            return;
        }

        let locale = target_locale(text, language);
        debug!("speaking via locale {locale}");

        if self.use_local_voice(locale) {
            match self.voices.synthesize(text, locale) {
                Ok((samples, rate)) => self.play(samples, rate),
                Err(e) => {
                    warn!("local synthesis failed: {e}");
                    self.speaking.store(false, Ordering::SeqCst);
                }
            }
            return;
        }

        // Fall back to network synthesis for the base language code.
        let base = locale.split('-').next().unwrap_or("en");
        match self.gateway.generate_speech(text, base).await {
            Ok(bytes) => {
                let samples = pcm::pcm16_to_f32(&bytes);
                if samples.is_empty() {
                    self.speaking.store(false, Ordering::SeqCst);
                    return;
                }
                self.play(samples, self.output_sample_rate);
            }
            Err(e) => {
                warn!("network synthesis failed: {e}");
                self.speaking.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Local synthesis is used when an engine exists and either the target
    /// is the base locale or a voice matches the target's language.
    fn use_local_voice(&self, locale: &str) -> bool {
        if !self.voices.available() {
            return false;
        }
        if locale == "en-IN" {
            return true;
        }
        let prefix = locale.split('-').next().unwrap_or(locale);
        self.voices
            .voices()
            .iter()
            .any(|v| v.locale.to_lowercase().contains(prefix))
    }

    fn play(&self, samples: Vec<f32>, sample_rate: u32) {
        let speaking = Arc::clone(&self.speaking);
        self.sink.play(
            samples,
            sample_rate,
            Box::new(move || speaking.store(false, Ordering::SeqCst)),
        );
    }
}

/// Pick the target locale from the text's script and the user's language.
///
/// Devanagari and Gurmukhi are detected by character range; Devanagari is
/// read as Marathi only when the user prefers Marathi.
#[must_use]
pub fn target_locale(text: &str, language: Language) -> &'static str {
    let devanagari = text.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c));
    let gurmukhi = text.chars().any(|c| ('\u{0A00}'..='\u{0A7F}').contains(&c));

    if devanagari {
        if language == Language::Mr {
            "mr-IN"
        } else {
            "hi-IN"
        }
    } else if gurmukhi || language == Language::Pa {
        "pa-IN"
    } else if language == Language::Hi {
        "hi-IN"
    } else if language == Language::Mr {
        "mr-IN"
    } else {
        "en-IN"
    }
}
