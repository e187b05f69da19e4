//! Idle-time follow-up suggestions.
//!
//! One debounced timer per session. Every completed turn re-arms it; when it
//! fires it looks at the newest memory entry and either offers exactly one
//! suggestion or stays silent. It never re-arms itself.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use voxcare_core::AssistantEvent;

use crate::memory::{IntentLogEntry, SessionMemory};
use crate::speech::SpeechChannel;

/// Default inactivity delay before a suggestion fires.
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_millis(4_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionState {
    /// A timer is pending.
    Armed,
    Idle,
}

/// A predicate over the last interaction and the suggestion it earns.
#[derive(Clone, Copy)]
pub struct SuggestionRule {
    pub name: &'static str,
    pub applies: fn(&IntentLogEntry) -> bool,
    pub text: &'static str,
}

fn route_mentions_invoices(entry: &IntentLogEntry) -> bool {
    entry
        .route
        .as_deref()
        .is_some_and(|r| r.to_lowercase().contains("invoices"))
}

fn prompt_mentions_backup(entry: &IntentLogEntry) -> bool {
    entry.prompt.to_lowercase().contains("backup")
}

fn prompt_mentions_employer(entry: &IntentLogEntry) -> bool {
    entry.prompt.to_lowercase().contains("employer")
}

/// Checked in order; the first rule that applies wins.
pub fn default_rules() -> Vec<SuggestionRule> {
    vec![
        SuggestionRule {
            name: "payment_reminder",
            applies: route_mentions_invoices,
            text: "Would you like me to send a payment reminder to the overdue accounts?",
        },
        SuggestionRule {
            name: "download_backup",
            applies: prompt_mentions_backup,
            text: "Do you want to download the latest backup?",
        },
        SuggestionRule {
            name: "employer_report",
            applies: prompt_mentions_employer,
            text: "I can generate a summary report for your employers. Should I do that?",
        },
    ]
}

fn first_match(rules: &[SuggestionRule], entry: &IntentLogEntry) -> Option<&'static str> {
    rules
        .iter()
        .find(|rule| (rule.applies)(entry))
        .map(|rule| {
            debug!(rule = rule.name, "Suggestion rule matched");
            rule.text
        })
}

pub struct SuggestionEngine {
    delay: Duration,
    rules: Arc<Vec<SuggestionRule>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_DELAY)
    }
}

impl SuggestionEngine {
    pub fn new(delay: Duration) -> Self {
        Self::with_rules(delay, default_rules())
    }

    pub fn with_rules(delay: Duration, rules: Vec<SuggestionRule>) -> Self {
        Self {
            delay,
            rules: Arc::new(rules),
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The suggestion the given interaction would earn, if any.
    pub fn suggest_for(&self, entry: &IntentLogEntry) -> Option<String> {
        first_match(&self.rules, entry).map(str::to_string)
    }

    /// Start (or restart) the idle timer. Any previously pending timer is
    /// cancelled first, so at most one is ever pending.
    pub fn arm(
        &self,
        memory: Arc<Mutex<SessionMemory>>,
        speech: Arc<SpeechChannel>,
        events: broadcast::Sender<AssistantEvent>,
    ) {
        let delay = self.delay;
        let rules = Arc::clone(&self.rules);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let suggestion = {
                let memory = memory.lock().unwrap_or_else(PoisonError::into_inner);
                memory
                    .most_recent()
                    .and_then(|entry| first_match(&rules, entry))
            };
            let Some(text) = suggestion else {
                debug!("Idle timer fired with nothing to suggest");
                return;
            };

            info!(suggestion = text, "Offering follow-up suggestion");
            let _ = events.send(AssistantEvent::SuggestionOffered {
                text: text.to_string(),
                timestamp: Utc::now(),
            });
            if let Err(e) = speech.speak(text) {
                debug!(error = %e, "Suggestion not spoken");
            }
        });

        if let Some(previous) = self.lock_pending().replace(handle) {
            previous.abort();
        }
        debug!(delay_ms = delay.as_millis() as u64, "Idle timer armed");
    }

    /// Cancel the pending timer, if any.
    pub fn disarm(&self) {
        if let Some(previous) = self.lock_pending().take() {
            previous.abort();
        }
    }

    pub fn state(&self) -> SuggestionState {
        match self.lock_pending().as_ref() {
            Some(handle) if !handle.is_finished() => SuggestionState::Armed,
            _ => SuggestionState::Idle,
        }
    }
}

impl Drop for SuggestionEngine {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::SpeechError;
    use crate::speech::{SilentPlayer, Synthesizer};

    struct EchoSynthesizer;

    #[async_trait]
    impl Synthesizer for EchoSynthesizer {
        async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
            Ok(text.as_bytes().to_vec())
        }
    }

    fn setup() -> (
        Arc<Mutex<SessionMemory>>,
        Arc<SpeechChannel>,
        broadcast::Sender<AssistantEvent>,
        broadcast::Receiver<AssistantEvent>,
    ) {
        let (tx, rx) = broadcast::channel(32);
        let speech = Arc::new(SpeechChannel::new(
            Arc::new(EchoSynthesizer),
            Arc::new(SilentPlayer),
            tx.clone(),
        ));
        (Arc::new(Mutex::new(SessionMemory::default())), speech, tx, rx)
    }

    async fn next_suggestion(rx: &mut broadcast::Receiver<AssistantEvent>) -> String {
        loop {
            if let AssistantEvent::SuggestionOffered { text, .. } = rx.recv().await.unwrap() {
                return text;
            }
        }
    }

    #[test]
    fn test_rules_in_order() {
        let engine = SuggestionEngine::default();

        let invoices = IntentLogEntry::new(
            "show me invoices",
            "Opening invoices.",
            true,
            Some("/admin/invoices"),
        );
        assert!(engine.suggest_for(&invoices).unwrap().contains("payment reminder"));

        let backup = IntentLogEntry::new("run a backup", "Starting a backup.", true, None);
        assert!(engine.suggest_for(&backup).unwrap().contains("latest backup"));

        let employer = IntentLogEntry::new("employer summary", "Here it is.", true, None);
        assert!(engine.suggest_for(&employer).unwrap().contains("summary report"));

        // Route rule outranks the prompt rules.
        let both = IntentLogEntry::new("backup invoices", "ok", true, Some("/admin/invoices"));
        assert!(engine.suggest_for(&both).unwrap().contains("payment reminder"));
    }

    #[test]
    fn test_no_rule_is_silent() {
        let engine = SuggestionEngine::default();
        let entry = IntentLogEntry::new("hello", "hi", false, Some("/patient"));
        assert!(engine.suggest_for(&entry).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let (memory, speech, tx, mut rx) = setup();
        memory.lock().unwrap().record(
            "show me invoices",
            "Opening invoices.",
            true,
            Some("/admin/invoices"),
        );

        let engine = SuggestionEngine::new(Duration::from_millis(4_000));
        engine.arm(memory, speech, tx);
        assert_eq!(engine.state(), SuggestionState::Armed);

        let text = next_suggestion(&mut rx).await;
        assert!(text.contains("payment reminder"));
        tokio::task::yield_now().await;
        assert_eq!(engine.state(), SuggestionState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_does_not_fire_early() {
        let (memory, speech, tx, mut rx) = setup();
        memory
            .lock()
            .unwrap()
            .record("run a backup", "Starting a backup.", true, None);

        let engine = SuggestionEngine::new(Duration::from_millis(4_000));
        engine.arm(memory, speech, tx);

        tokio::time::sleep(Duration::from_millis(3_999)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(engine.state(), SuggestionState::Armed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_pending_timer() {
        let (memory, speech, tx, mut rx) = setup();
        memory
            .lock()
            .unwrap()
            .record("run a backup", "Starting a backup.", true, None);

        let engine = SuggestionEngine::new(Duration::from_millis(4_000));
        engine.arm(Arc::clone(&memory), Arc::clone(&speech), tx.clone());
        tokio::time::sleep(Duration::from_millis(3_000)).await;
        engine.arm(Arc::clone(&memory), Arc::clone(&speech), tx.clone());

        // The first timer would have fired here.
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(3_000)).await;
        let offered: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|e| e.event_name() == "suggestion_offered")
            .collect();
        assert_eq!(offered.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm() {
        let (memory, speech, tx, mut rx) = setup();
        memory
            .lock()
            .unwrap()
            .record("run a backup", "Starting a backup.", true, None);

        let engine = SuggestionEngine::new(Duration::from_millis(100));
        engine.arm(memory, speech, tx);
        engine.disarm();
        assert_eq!(engine.state(), SuggestionState::Idle);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_memory_is_silent() {
        let (memory, speech, tx, mut rx) = setup();
        let engine = SuggestionEngine::new(Duration::from_millis(100));
        engine.arm(memory, speech, tx);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(engine.state(), SuggestionState::Idle);
    }
}
