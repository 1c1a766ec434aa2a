//! Conversation orchestration.
//!
//! Decides, per user message, whether the offline responder or the
//! advisory gateway produces the reply, owns the append-only message
//! history, and hands every assistant reply to the speech pipeline.
//!
//! State machine: Idle → Sending → Idle. A submit is rejected while a
//! send is in flight or when there is neither text nor an image.

use crate::gateway::AdvisoryGateway;
use crate::messages::ChatMessage;
use crate::offline;
use crate::profile::{FarmProfile, Language};
use crate::speech::SpeechPipeline;
use std::sync::Arc;
use tracing::{debug, info};

/// One-time welcome message seeding an empty conversation.
fn welcome_message(language: Language) -> &'static str {
    match language {
        Language::En => {
            "Namaste! I am Kisan-Bhai, your Digital Farmer Advisor. How can I help your fields flourish today?"
        }
        Language::Hi => {
            "नमस्ते! मैं किसान-भाई हूँ, आपका डिजिटल किसान सलाहकार। आज मैं आपकी खेती में कैसे मदद कर सकता हूँ?"
        }
        Language::Pa => {
            "ਸਤਿ ਸ੍ਰੀ ਅਕਾਲ! ਮੈਂ ਕਿਸਾਨ-ਭਾਈ ਹਾਂ, ਤੁਹਾਡਾ ਡਿਜੀਟਲ ਕਿਸਾਨ ਸਲਾਹਕਾਰ। ਅੱਜ ਮੈਂ ਤੁਹਾਡੀ ਖੇਤੀ ਵਿੱਚ ਕਿਵੇਂ ਮਦਦ ਕਰ ਸਕਦਾ ਹਾਂ?"
        }
        Language::Mr => {
            "नमस्कार! मी किसान-भाई आहे, तुमचा डिजिटल शेतकरी सल्लागार. आज मी तुमच्या शेतीमध्ये कशी मदत करू शकतो?"
        }
    }
}

/// A single chat conversation, sole owner of its message history.
pub struct Conversation {
    profile: FarmProfile,
    gateway: Arc<AdvisoryGateway>,
    speech: SpeechPipeline,
    messages: Vec<ChatMessage>,
    sending: bool,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new(profile: FarmProfile, gateway: Arc<AdvisoryGateway>, speech: SpeechPipeline) -> Self {
        Self {
            profile,
            gateway,
            speech,
            messages: Vec::new(),
            sending: false,
        }
    }

    /// Seed an empty conversation with the language-specific welcome.
    ///
    /// Does nothing once any message exists.
    pub fn welcome(&mut self) -> Option<&ChatMessage> {
        if !self.messages.is_empty() {
            return None;
        }
        self.messages
            .push(ChatMessage::assistant(welcome_message(self.profile.language)));
        self.messages.last()
    }

    /// Message history, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether a submit is currently in flight.
    #[must_use]
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// The profile driving language and location choices.
    #[must_use]
    pub fn profile(&self) -> &FarmProfile {
        &self.profile
    }

    /// Submit a user message and produce the assistant reply.
    ///
    /// Returns `None` when the submit is rejected: no text and no image,
    /// or a send already in flight. Offline answers are text-only, so an
    /// attached image always escalates to the gateway chat operation.
    /// The reply is appended to history and spoken before returning.
    pub async fn submit(&mut self, text: &str, image: Option<String>) -> Option<&ChatMessage> {
        if self.sending || (text.trim().is_empty() && image.is_none()) {
            debug!("submit rejected (sending={}, empty input)", self.sending);
            return None;
        }
        self.sending = true;

        let content = if text.trim().is_empty() {
            "Analyze this."
        } else {
            text
        };
        let language = self.profile.language;

        // History as it stood before this turn; the current message goes
        // to the gateway separately.
        let history = self.messages.clone();

        let mut user = ChatMessage::user(content);
        if let Some(ref img) = image {
            user = user.with_image(img.clone());
        }
        self.messages.push(user);

        let reply = match (image.is_none()).then(|| offline::resolve(content, language)).flatten() {
            Some(canned) => {
                info!("answered offline");
                canned.to_owned()
            }
            None => {
                self.gateway
                    .chat(&history, content, image.as_deref(), language)
                    .await
            }
        };

        self.messages.push(ChatMessage::assistant(reply.clone()));
        self.speech.speak(&reply, language).await;

        self.sending = false;
        self.messages.last()
    }

    /// The speech pipeline, for direct listen/stop controls.
    #[must_use]
    pub fn speech(&self) -> &SpeechPipeline {
        &self.speech
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_is_language_specific_and_seeds_once() {
        assert!(welcome_message(Language::Hi).contains("किसान-भाई"));
        assert!(welcome_message(Language::En).starts_with("Namaste!"));
    }
}
