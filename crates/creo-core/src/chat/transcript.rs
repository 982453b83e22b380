//! Streaming transcript controller.
//!
//! Owns the in-memory message list for the active session. A submission
//! appends the user message and a streaming placeholder, then patches the
//! placeholder as fragments arrive from the remote exchange. Visible
//! patches are throttled; accumulation is not. The controller never
//! persists anything itself -- persistence is the caller's responsibility
//! after finalization.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use creo_types::chat::{Message, MessageRole};
use creo_types::error::ChatError;

use crate::chat::exchange::{ChatExchange, ExchangeFactory};
use crate::prompts::ERROR_NOTICE;

/// Minimum wall-clock gap between externally visible transcript patches.
const PATCH_INTERVAL: Duration = Duration::from_millis(75);

/// Why a submission was rejected without any transcript change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The input was empty or whitespace-only.
    EmptyInput,
    /// Another submission is already in flight on this controller.
    Busy,
}

/// Result of a submission that did not fail in transport.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The stream closed naturally; the finalized transcript is returned.
    Completed(Vec<Message>),
    /// The submission was a no-op.
    Rejected(RejectReason),
    /// The session was reset or replaced while streaming; the stale
    /// continuation dropped its result instead of touching the new
    /// session's transcript.
    Abandoned,
}

struct TranscriptState<X> {
    messages: Vec<Message>,
    active_session: Option<Uuid>,
    exchange: Arc<X>,
    /// Bumped by reset/load. A submission captures the epoch it started
    /// under and no-ops once it no longer matches.
    epoch: u64,
    in_flight: bool,
}

/// Controller for one conversation's in-memory transcript.
///
/// State sits behind a mutex (never held across an await) so hosts can
/// share the controller across tasks; single-flight is enforced per
/// controller instance.
pub struct TranscriptController<F: ExchangeFactory> {
    factory: F,
    welcome: String,
    state: Mutex<TranscriptState<F::Exchange>>,
}

impl<F: ExchangeFactory> TranscriptController<F> {
    /// Create a controller with a fresh exchange and a welcome-only
    /// transcript.
    pub fn new(factory: F, welcome: impl Into<String>) -> Self {
        let welcome = welcome.into();
        let exchange = Arc::new(factory.create(&[]));
        let state = Mutex::new(TranscriptState {
            messages: vec![Message::model(welcome.clone())],
            active_session: None,
            exchange,
            epoch: 0,
            in_flight: false,
        });
        Self {
            factory,
            welcome,
            state,
        }
    }

    fn state(&self) -> MutexGuard<'_, TranscriptState<F::Exchange>> {
        self.state.lock().expect("transcript state poisoned")
    }

    /// Snapshot of the current transcript.
    pub fn transcript(&self) -> Vec<Message> {
        self.state().messages.clone()
    }

    /// Number of messages currently in the transcript.
    pub fn message_count(&self) -> usize {
        self.state().messages.len()
    }

    /// Id of the saved session this transcript belongs to, if any.
    pub fn active_session(&self) -> Option<Uuid> {
        self.state().active_session
    }

    /// Bind the transcript to a saved session id (after first persist).
    pub fn set_active_session(&self, id: Uuid) {
        self.state().active_session = Some(id);
    }

    /// Replace the text of a finalized message in place.
    ///
    /// Used for display-copy edits (e.g. stripping an embedded proposal);
    /// returns false when the id is not present.
    pub fn set_message_text(&self, id: Uuid, text: &str) -> bool {
        let mut state = self.state();
        match state.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.text = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Reset to a fresh, unsaved session with the canonical welcome.
    ///
    /// Abandons any in-flight submission: its continuation will observe the
    /// epoch change and drop its result.
    pub fn reset(&self) {
        let welcome = self.welcome.clone();
        self.reset_with_welcome(&welcome);
    }

    /// Reset with a one-off opening line instead of the canonical welcome.
    pub fn reset_with_welcome(&self, welcome: &str) {
        let exchange = Arc::new(self.factory.create(&[]));
        let mut state = self.state();
        state.messages = vec![Message::model(welcome)];
        state.active_session = None;
        state.exchange = exchange;
        state.epoch += 1;
        state.in_flight = false;
    }

    /// Load a saved session: adopt its transcript and seed a fresh
    /// exchange with it.
    ///
    /// Leading model messages (the welcome line) are stripped from the
    /// seed so the exchange history starts with a user turn.
    pub fn load(&self, record: &creo_types::chat::SessionRecord) {
        let seed: Vec<Message> = record
            .messages
            .iter()
            .skip_while(|m| m.role == MessageRole::Model)
            .cloned()
            .collect();
        let exchange = Arc::new(self.factory.create(&seed));

        let mut state = self.state();
        state.messages = record.messages.clone();
        state.active_session = Some(record.id);
        state.exchange = exchange;
        state.epoch += 1;
        state.in_flight = false;
    }

    /// Submit a user message and stream the reply into the transcript.
    pub async fn submit(&self, text: &str) -> Result<SubmitOutcome, ChatError> {
        self.submit_with(text, |_| {}).await
    }

    /// Submit with a patch observer.
    ///
    /// `on_patch` receives the accumulated reply text on every visible
    /// update, throttled to one call per [`PATCH_INTERVAL`] of wall clock.
    /// The first fragment patches immediately; finalization always carries
    /// the exact full accumulator.
    pub async fn submit_with<P>(&self, text: &str, mut on_patch: P) -> Result<SubmitOutcome, ChatError>
    where
        P: FnMut(&str) + Send,
    {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(SubmitOutcome::Rejected(RejectReason::EmptyInput));
        }

        let (exchange, epoch, placeholder_id) = {
            let mut state = self.state();
            if state.in_flight {
                return Ok(SubmitOutcome::Rejected(RejectReason::Busy));
            }
            state.in_flight = true;
            state.messages.push(Message::user(trimmed));
            let placeholder = Message::streaming_placeholder();
            let placeholder_id = placeholder.id;
            state.messages.push(placeholder);
            (Arc::clone(&state.exchange), state.epoch, placeholder_id)
        };

        let mut stream = exchange.send_message_stream(trimmed);
        let mut accumulator = String::new();
        let mut last_patch: Option<Instant> = None;

        loop {
            match stream.next().await {
                Some(Ok(fragment)) => {
                    accumulator.push_str(&fragment);
                    let due = last_patch.is_none_or(|at| at.elapsed() >= PATCH_INTERVAL);
                    if due {
                        {
                            let mut state = self.state();
                            if state.epoch != epoch {
                                debug!("dropping stale stream patch after session switch");
                                return Ok(SubmitOutcome::Abandoned);
                            }
                            if let Some(m) =
                                state.messages.iter_mut().find(|m| m.id == placeholder_id)
                            {
                                m.text = accumulator.clone();
                            }
                        }
                        on_patch(&accumulator);
                        last_patch = Some(Instant::now());
                    }
                }
                Some(Err(e)) => {
                    let mut state = self.state();
                    if state.epoch != epoch {
                        debug!("dropping stale stream failure after session switch");
                        return Ok(SubmitOutcome::Abandoned);
                    }
                    // Finalize the placeholder with whatever arrived, then
                    // surface the failure as its own transcript entry.
                    if let Some(m) = state.messages.iter_mut().find(|m| m.id == placeholder_id) {
                        m.text = accumulator.clone();
                        m.is_streaming = false;
                    }
                    state.messages.push(Message::model(ERROR_NOTICE));
                    state.in_flight = false;
                    drop(state);
                    warn!(error = %e, "streaming exchange failed");
                    return Err(ChatError::Exchange(e));
                }
                None => {
                    let transcript = {
                        let mut state = self.state();
                        if state.epoch != epoch {
                            debug!("dropping stale stream completion after session switch");
                            return Ok(SubmitOutcome::Abandoned);
                        }
                        if let Some(m) =
                            state.messages.iter_mut().find(|m| m.id == placeholder_id)
                        {
                            m.text = accumulator.clone();
                            m.is_streaming = false;
                        }
                        state.in_flight = false;
                        state.messages.clone()
                    };
                    on_patch(&accumulator);
                    return Ok(SubmitOutcome::Completed(transcript));
                }
            }
        }
    }
}
