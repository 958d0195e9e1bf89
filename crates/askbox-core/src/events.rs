// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
use askbox_model::Message;

use crate::Phase;

/// Events emitted by the controller during a single submission.
/// Renderers subscribe to these to drive their output.
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// The controller moved between `Idle` and `AwaitingResponse`
    PhaseChanged(Phase),
    /// A message was appended to the log
    MessageAppended(Message),
    /// The full log was written to the snapshot store
    Persisted,
    /// The submission has been fully processed
    TurnComplete,
}
