//! Per-user assistant session: the one object a UI layer talks to.
//!
//! Owns the classifier, parser, dispatcher, memory, speech channel, and idle
//! timer. Nothing is process-wide; two sessions never share state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{Local, NaiveDate, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info};
use voxcare_core::{AssistantConfig, AssistantEvent, Role, RouteTable};
use voxcare_intent::{CommandParser, IntentClassifier, ParsedCommand};

use crate::dispatcher::{DispatchInput, Dispatcher};
use crate::handler::{DomainHandler, HandlerRegistry, HandlerRequest, Outcome};
use crate::memory::{IntentLogEntry, SessionMemory};
use crate::speech::{AudioPlayer, HttpSynthesizer, SilentPlayer, SpeechChannel, Synthesizer};
use crate::suggestion::{SuggestionEngine, SuggestionState};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Everything one utterance produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub outcome: Outcome,
    pub success: bool,
    /// Intent tag or command kind that handled the turn.
    pub intent: Option<String>,
    /// The parsed command, when that is what was dispatched.
    pub command: Option<ParsedCommand>,
}

impl Turn {
    pub fn text(&self) -> &str {
        self.outcome.text()
    }

    pub fn route(&self) -> Option<&str> {
        self.outcome.route()
    }
}

pub struct VoiceAssistant {
    config: AssistantConfig,
    classifier: IntentClassifier,
    parser: CommandParser,
    dispatcher: Dispatcher,
    memory: Arc<Mutex<SessionMemory>>,
    speech: Arc<SpeechChannel>,
    suggestions: SuggestionEngine,
    events: broadcast::Sender<AssistantEvent>,
    active: AtomicBool,
}

impl VoiceAssistant {
    pub fn new(
        config: AssistantConfig,
        synthesizer: Arc<dyn Synthesizer>,
        player: Arc<dyn AudioPlayer>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let routes = config.routes.clone();

        let speech = SpeechChannel::new(synthesizer, player, events.clone());
        speech.set_enabled(config.speech.enabled);

        Self {
            classifier: IntentClassifier::new(),
            parser: CommandParser::new(routes.clone()),
            dispatcher: Dispatcher::new(HandlerRegistry::with_portal_defaults(&routes)),
            memory: Arc::new(Mutex::new(SessionMemory::with_capacity(
                config.memory.capacity,
            ))),
            speech: Arc::new(speech),
            suggestions: SuggestionEngine::new(Duration::from_millis(
                config.suggestions.idle_delay_ms,
            )),
            events,
            active: AtomicBool::new(false),
            config,
        }
    }

    /// Session that synthesizes over HTTP and leaves playback to the host.
    pub fn with_portal_defaults(config: AssistantConfig) -> Self {
        let synthesizer = Arc::new(HttpSynthesizer::new(&config.speech));
        Self::new(config, synthesizer, Arc::new(SilentPlayer))
    }

    /// Add or replace a domain handler.
    pub fn register_handler(&mut self, handler: Arc<dyn DomainHandler>) {
        let domain = handler.domain();
        if self.dispatcher.registry_mut().register(handler).is_some() {
            info!(domain, "Replaced domain handler");
        }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn routes(&self) -> &RouteTable {
        self.parser.routes()
    }

    fn lock_memory(&self) -> MutexGuard<'_, SessionMemory> {
        self.memory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Begin speaking, recording, and suggesting. Idempotent.
    pub fn start(&self) {
        if self.active.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Voice assistant session started");
        let _ = self.events.send(AssistantEvent::SessionStarted {
            timestamp: Utc::now(),
        });
    }

    /// Stop the session: cuts off speech, cancels the idle timer, and forgets
    /// the session's history.
    pub fn dispose(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        self.speech.cancel();
        self.suggestions.disarm();
        self.lock_memory().clear();
        info!("Voice assistant session disposed");
        let _ = self.events.send(AssistantEvent::SessionDisposed {
            timestamp: Utc::now(),
        });
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Turns
    // =========================================================================

    pub async fn handle_utterance(
        &self,
        text: &str,
        context: Option<&str>,
        role: Option<Role>,
    ) -> Turn {
        self.handle_utterance_on(text, context, role, Local::now().date_naive())
            .await
    }

    /// Like [`handle_utterance`](Self::handle_utterance) with relative dates
    /// resolved against `today`.
    pub async fn handle_utterance_on(
        &self,
        text: &str,
        context: Option<&str>,
        role: Option<Role>,
        today: NaiveDate,
    ) -> Turn {
        let parsed = self.parser.parse_on(text, role, today);

        let (input, command) = match parsed {
            Some(command) if command.command.is_task() => {
                (DispatchInput::Command(command.clone()), Some(command))
            }
            parsed => {
                let tag = self.classifier.classify(text, context);
                if !tag.is_unclassified() {
                    (DispatchInput::Intent(tag), None)
                } else if let Some(command) = parsed {
                    (DispatchInput::Command(command.clone()), Some(command))
                } else {
                    (DispatchInput::Unrecognized, None)
                }
            }
        };

        let last_route = self.lock_memory().most_recent_route().map(str::to_string);
        let request = HandlerRequest::new(text)
            .with_context(context)
            .with_role(role)
            .with_last_route(last_route.as_deref());

        let dispatch = self
            .dispatcher
            .dispatch(input, &request, self.parser.routes())
            .await;

        debug!(
            intent = dispatch.intent_label.as_deref().unwrap_or("none"),
            success = dispatch.success,
            "Utterance resolved"
        );

        let turn = Turn {
            outcome: dispatch.outcome,
            success: dispatch.success,
            intent: dispatch.intent_label,
            command,
        };

        if self.is_active() {
            self.complete_turn(text, &turn);
        }
        turn
    }

    /// Record, announce, speak, then re-arm, in that order.
    fn complete_turn(&self, prompt: &str, turn: &Turn) {
        let mut entry = IntentLogEntry::new(prompt, turn.text(), turn.success, turn.route());
        if let Some(intent) = &turn.intent {
            entry = entry.with_intent(intent.clone());
        }
        self.lock_memory().record_entry(entry);

        info!(
            intent = turn.intent.as_deref().unwrap_or("none"),
            success = turn.success,
            route = turn.route().unwrap_or(""),
            "Turn completed"
        );
        let _ = self.events.send(AssistantEvent::TurnCompleted {
            prompt: prompt.to_string(),
            intent: turn.intent.clone(),
            success: turn.success,
            route: turn.route().map(str::to_string),
            timestamp: Utc::now(),
        });

        if let Err(e) = self.speech.speak(turn.text()) {
            debug!(error = %e, "Response not spoken");
        }

        if self.config.suggestions.enabled {
            self.suggestions.arm(
                Arc::clone(&self.memory),
                Arc::clone(&self.speech),
                self.events.clone(),
            );
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Copy of the session log, newest first.
    pub fn memory_snapshot(&self) -> Vec<IntentLogEntry> {
        self.lock_memory().iter().cloned().collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AssistantEvent> {
        self.events.subscribe()
    }

    pub fn suggestion_state(&self) -> SuggestionState {
        self.suggestions.state()
    }

    pub fn is_speaking(&self) -> bool {
        self.speech.is_speaking()
    }

    /// Turn spoken output on or off without ending the session.
    pub fn set_speech_enabled(&self, enabled: bool) {
        self.speech.set_enabled(enabled);
    }
}

impl Drop for VoiceAssistant {
    fn drop(&mut self) {
        self.dispose();
    }
}
