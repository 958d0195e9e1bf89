// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Conversation state as a pure reducer.
//!
//! Every change to the log is a [`ConversationEvent`] applied to the prior
//! state by [`ConversationState::apply`], which consumes the old state and
//! returns the next one.  Events that are not valid in the current phase
//! leave the state untouched.

use askbox_model::{Message, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingResponse,
}

#[derive(Debug, Clone)]
pub enum ConversationEvent {
    /// A non-blank user message opens a turn.
    Submitted(Message),
    /// An assistant message produced by the in-flight turn.
    Replied(Message),
    /// The in-flight turn finished, whatever its outcome.
    Settled,
    /// Reset the log to a single greeting.
    Cleared { greeting: Message },
    /// Flip short/expanded timestamp display of the message at this index.
    TimeToggled(usize),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    messages: Vec<Message>,
    phase: Phase,
}

impl ConversationState {
    /// A fresh conversation holding only `greeting`.
    pub fn seeded(greeting: Message) -> Self {
        Self { messages: vec![greeting], phase: Phase::Idle }
    }

    /// Resume a persisted log in the idle phase.
    pub fn restored(messages: Vec<Message>) -> Self {
        Self { messages, phase: Phase::Idle }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn apply(mut self, event: ConversationEvent) -> Self {
        match event {
            ConversationEvent::Submitted(msg) => {
                if self.is_idle() && msg.role == Role::User && !msg.content.trim().is_empty() {
                    self.messages.push(msg);
                    self.phase = Phase::AwaitingResponse;
                }
            }
            ConversationEvent::Replied(msg) => {
                if self.phase == Phase::AwaitingResponse && msg.role == Role::Assistant {
                    self.messages.push(msg);
                }
            }
            ConversationEvent::Settled => self.phase = Phase::Idle,
            ConversationEvent::Cleared { greeting } => {
                if self.is_idle() {
                    self.messages = vec![greeting];
                }
            }
            ConversationEvent::TimeToggled(index) => {
                if let Some(msg) = self.messages.get_mut(index) {
                    msg.time_display_expanded = !msg.time_display_expanded;
                }
            }
        }
        self
    }
}
