// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
mod state;
mod error;
mod events;
mod controller;

pub use state::{ConversationEvent, ConversationState, Phase};
pub use error::TurnError;
pub use events::ControllerEvent;
pub use controller::{ConversationController, IgnoreReason, SubmitOutcome};
