// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use askbox_config::{ConversationConfig, EmptySearchPolicy};
use askbox_model::{Message, Responder};
use askbox_search::SearchAugmenter;
use askbox_store::PersistenceStore;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{ControllerEvent, ConversationEvent, ConversationState, Phase, TurnError};

/// Why a submission was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Input was empty or whitespace only.
    Blank,
    /// A previous submission is still awaiting its response.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Ignored(IgnoreReason),
    /// The turn ran to completion; `appended` counts every message it added,
    /// including the user's own.
    Completed { appended: usize },
}

/// Owns the conversation log and sequences one submission at a time.
///
/// The `Idle`/`AwaitingResponse` phase is the re-entrancy guard: a
/// submission arriving mid-turn is rejected, never queued.  The state mutex
/// is only held for the duration of a single transition and never across an
/// `.await`.
pub struct ConversationController {
    state: Mutex<ConversationState>,
    responder: Arc<dyn Responder>,
    search: Option<Arc<dyn SearchAugmenter>>,
    store: PersistenceStore,
    settings: ConversationConfig,
}

impl ConversationController {
    /// Build a controller, resuming the persisted log when one is available
    /// and otherwise starting from the greeting.
    pub fn new(
        settings: ConversationConfig,
        responder: Arc<dyn Responder>,
        search: Option<Arc<dyn SearchAugmenter>>,
        store: PersistenceStore,
    ) -> Self {
        let state = match store.load() {
            Some(snapshot) if !snapshot.messages.is_empty() => {
                debug!(messages = snapshot.messages.len(), "resuming saved conversation");
                ConversationState::restored(snapshot.messages)
            }
            _ => ConversationState::seeded(Message::assistant(&settings.greeting)),
        };
        Self { state: Mutex::new(state), responder, search, store, settings }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.lock().messages().to_vec()
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase()
    }

    pub fn state(&self) -> ConversationState {
        self.lock().clone()
    }

    /// Process one user submission: ask the responder, fall back to web
    /// search when the answer is a non-answer, append the results, persist.
    ///
    /// Progress is reported through `tx`; the caller drops the receiver when
    /// it is no longer interested.
    pub async fn submit(&self, input: &str, tx: mpsc::Sender<ControllerEvent>) -> SubmitOutcome {
        let query = input.trim();
        if query.is_empty() {
            return SubmitOutcome::Ignored(IgnoreReason::Blank);
        }

        let user = Message::user(query);
        {
            let mut state = self.lock();
            if !state.is_idle() {
                debug!("submission rejected: awaiting response");
                return SubmitOutcome::Ignored(IgnoreReason::Busy);
            }
            let prior = std::mem::take(&mut *state);
            *state = prior.apply(ConversationEvent::Submitted(user.clone()));
        }
        let _ = tx.send(ControllerEvent::MessageAppended(user)).await;
        let _ = tx.send(ControllerEvent::PhaseChanged(Phase::AwaitingResponse)).await;

        let appended = 1 + self.run_turn(query, &tx).await;

        self.transition(ConversationEvent::Settled);
        let _ = tx.send(ControllerEvent::PhaseChanged(Phase::Idle)).await;

        if self.persist() {
            let _ = tx.send(ControllerEvent::Persisted).await;
        }
        let _ = tx.send(ControllerEvent::TurnComplete).await;
        SubmitOutcome::Completed { appended }
    }

    /// Reset the log to the greeting and remove the persisted snapshot.
    /// Returns `false` (and changes nothing) while a turn is in flight.
    pub fn clear_history(&self) -> bool {
        {
            let mut state = self.lock();
            if !state.is_idle() {
                return false;
            }
            let greeting = Message::assistant(&self.settings.greeting);
            let prior = std::mem::take(&mut *state);
            *state = prior.apply(ConversationEvent::Cleared { greeting });
        }
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "could not remove conversation snapshot");
        }
        info!("conversation history cleared");
        true
    }

    /// Flip short/expanded timestamp display for message `index`.
    /// Returns `false` when there is no such message.
    ///
    /// Mid-turn the flag changes in memory only; the turn's own save at
    /// settle time picks it up.
    pub fn toggle_time(&self, index: usize) -> bool {
        let idle = {
            let mut state = self.lock();
            if index >= state.messages().len() {
                return false;
            }
            let prior = std::mem::take(&mut *state);
            *state = prior.apply(ConversationEvent::TimeToggled(index));
            state.is_idle()
        };
        if idle {
            self.persist();
        }
        true
    }

    // ── Turn ──────────────────────────────────────────────────────────────────

    /// Append the assistant messages for one turn and return how many were
    /// added.  Always at least one; failures become a single `Error: ...`
    /// message.
    async fn run_turn(&self, query: &str, tx: &mpsc::Sender<ControllerEvent>) -> usize {
        let answer = match self.responder.complete(query).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(responder = self.responder.name(), error = %e, "generation failed");
                self.append(TurnError::from(e).to_message(), tx).await;
                return 1;
            }
        };

        let wants_search = self.is_fallback_answer(&answer);
        // The answer lands in the log before any search request goes out.
        self.append(Message::assistant(answer), tx).await;
        if !wants_search {
            return 1;
        }

        let extra = match self.augment(query).await {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "search augmentation failed");
                Some(e.to_message())
            }
        };
        match extra {
            Some(msg) => {
                self.append(msg, tx).await;
                2
            }
            None => 1,
        }
    }

    async fn augment(&self, query: &str) -> Result<Option<Message>, TurnError> {
        let Some(search) = &self.search else {
            debug!("fallback answer but search is disabled");
            return Ok(None);
        };

        let outcome = search.search(query).await?;
        if outcome.results.is_empty() {
            return match self.settings.on_empty_search {
                EmptySearchPolicy::Error => Err(TurnError::NoResults { query: query.to_string() }),
                EmptySearchPolicy::Silent => Ok(None),
            };
        }

        let caption = outcome
            .direct_answer
            .unwrap_or_else(|| format!("Here are results for \"{query}\""));
        Ok(Some(Message::assistant(caption).with_results(outcome.results)))
    }

    fn is_fallback_answer(&self, answer: &str) -> bool {
        let answer = answer.to_lowercase();
        self.settings
            .fallback_markers
            .iter()
            .filter(|m| !m.trim().is_empty())
            .any(|m| answer.contains(&m.to_lowercase()))
    }

    // ── State plumbing ────────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, ConversationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, event: ConversationEvent) {
        let mut state = self.lock();
        let prior = std::mem::take(&mut *state);
        *state = prior.apply(event);
    }

    async fn append(&self, msg: Message, tx: &mpsc::Sender<ControllerEvent>) {
        self.transition(ConversationEvent::Replied(msg.clone()));
        let _ = tx.send(ControllerEvent::MessageAppended(msg)).await;
    }

    fn persist(&self) -> bool {
        let messages = self.messages();
        match self.store.save(&messages) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "could not save conversation snapshot");
                false
            }
        }
    }
}
