//! Speech round-trip: one-shot synthesis playback and the live
//! bidirectional voice session.

pub mod capture;
pub mod live;
pub mod output;
pub mod pcm;
pub mod scheduler;
pub mod synthesis;

pub use live::LiveVoiceSession;
pub use output::{PlaybackWorker, SpeechSink};
pub use scheduler::PlaybackScheduler;
pub use synthesis::{NoLocalVoices, SpeechPipeline, VoiceBackend, VoiceInfo};
