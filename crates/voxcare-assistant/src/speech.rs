//! Speech output channel.
//!
//! At most one utterance is in flight: starting a new one aborts the previous
//! synthesis/playback task. Failures are best-effort: they are logged and
//! published as events, never returned to the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;
use voxcare_core::config::SpeechConfig;
use voxcare_core::AssistantEvent;

use crate::error::SpeechError;

/// Turns text into an audio blob.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError>;
}

/// Plays an audio blob to completion.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, audio: Vec<u8>) -> Result<(), SpeechError>;
}

/// Client for the `POST /api/tts/{voice}` synthesis endpoint.
pub struct HttpSynthesizer {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpSynthesizer {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!(
                "{}/api/tts/{}",
                config.endpoint.trim_end_matches('/'),
                config.voice
            ),
            timeout: Duration::from_millis(config.request_timeout_ms),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Synthesizer for HttpSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SpeechError::Status(response.status().as_u16()));
        }

        let audio = response.bytes().await?;
        Ok(audio.to_vec())
    }
}

/// Discards audio. For hosts where the UI layer does its own playback.
pub struct SilentPlayer;

#[async_trait]
impl AudioPlayer for SilentPlayer {
    async fn play(&self, audio: Vec<u8>) -> Result<(), SpeechError> {
        debug!(bytes = audio.len(), "Discarding synthesized audio");
        Ok(())
    }
}

struct InFlight {
    id: Uuid,
    handle: JoinHandle<()>,
}

pub struct SpeechChannel {
    synthesizer: Arc<dyn Synthesizer>,
    player: Arc<dyn AudioPlayer>,
    events: broadcast::Sender<AssistantEvent>,
    enabled: AtomicBool,
    current: Mutex<Option<InFlight>>,
}

impl SpeechChannel {
    pub fn new(
        synthesizer: Arc<dyn Synthesizer>,
        player: Arc<dyn AudioPlayer>,
        events: broadcast::Sender<AssistantEvent>,
    ) -> Self {
        Self {
            synthesizer,
            player,
            events,
            enabled: AtomicBool::new(true),
            current: Mutex::new(None),
        }
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start speaking `text`, cutting off anything still in flight.
    ///
    /// Must be called from within a tokio runtime.
    pub fn speak(&self, text: &str) -> Result<Uuid, SpeechError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SpeechError::EmptyText);
        }
        if !self.is_enabled() {
            return Err(SpeechError::Disabled);
        }

        // Held across abort, spawn and store: at most one utterance in flight.
        let mut current = self.lock_current();
        if let Some(previous) = current.take() {
            self.abort_in_flight(previous);
        }

        let id = Uuid::new_v4();
        let _ = self.events.send(AssistantEvent::SpeechStarted {
            utterance_id: id,
            text: text.to_string(),
            timestamp: Utc::now(),
        });

        let synthesizer = Arc::clone(&self.synthesizer);
        let player = Arc::clone(&self.player);
        let events = self.events.clone();
        let owned = text.to_string();

        let handle = tokio::spawn(async move {
            let result = match synthesizer.synthesize(&owned).await {
                Ok(audio) => player.play(audio).await,
                Err(e) => Err(e),
            };
            let event = match result {
                Ok(()) => {
                    debug!(utterance_id = %id, "Speech completed");
                    AssistantEvent::SpeechCompleted {
                        utterance_id: id,
                        timestamp: Utc::now(),
                    }
                }
                Err(e) => {
                    warn!(utterance_id = %id, error = %e, "Speech output failed");
                    AssistantEvent::SpeechFailed {
                        utterance_id: id,
                        reason: e.to_string(),
                        timestamp: Utc::now(),
                    }
                }
            };
            let _ = events.send(event);
        });

        *current = Some(InFlight { id, handle });
        Ok(id)
    }

    /// Abort the in-flight utterance, if any. Returns whether one was cut off.
    pub fn cancel(&self) -> bool {
        match self.lock_current().take() {
            Some(previous) => self.abort_in_flight(previous),
            None => false,
        }
    }

    fn abort_in_flight(&self, previous: InFlight) -> bool {
        if previous.handle.is_finished() {
            return false;
        }
        previous.handle.abort();
        debug!(utterance_id = %previous.id, "Speech cancelled");
        let _ = self.events.send(AssistantEvent::SpeechCancelled {
            utterance_id: previous.id,
            timestamp: Utc::now(),
        });
        true
    }

    pub fn is_speaking(&self) -> bool {
        self.lock_current()
            .as_ref()
            .is_some_and(|f| !f.handle.is_finished())
    }

    /// Id of the utterance currently being synthesized or played.
    pub fn current_utterance(&self) -> Option<Uuid> {
        self.lock_current()
            .as_ref()
            .filter(|f| !f.handle.is_finished())
            .map(|f| f.id)
    }

    /// Disabling also cuts off anything in flight.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        if !enabled {
            self.cancel();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

impl Drop for SpeechChannel {
    fn drop(&mut self) {
        if let Some(previous) = self.lock_current().take() {
            previous.handle.abort();
        }
    }
}
