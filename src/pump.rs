// Copyright 2023 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! The platform event pump interface.

use crate::display::{Delivery, Display};
use crate::error::Error;

/// How many native events one [`EventPump::pump`] call handles at most.
pub const DEFAULT_BATCH_LIMIT: usize = 100;

/// Pump tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpConfig {
    pub batch_limit: usize,
}

impl Default for PumpConfig {
    fn default() -> Self {
        PumpConfig {
            batch_limit: DEFAULT_BATCH_LIMIT,
        }
    }
}

/// The outcome of one pump call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpStatus {
    /// Native events taken off the queue.
    pub processed: usize,
    /// `false` if a sink asked to stop; the rest of the queue was left alone.
    pub continue_dispatch: bool,
}

impl PumpStatus {
    pub(crate) fn new() -> PumpStatus {
        PumpStatus {
            processed: 0,
            continue_dispatch: true,
        }
    }

    /// Account for one native event. Returns `true` if the pump may go on.
    pub(crate) fn record(&mut self, delivery: Delivery) -> bool {
        self.processed += 1;
        if !delivery.should_continue() {
            self.continue_dispatch = false;
        }
        self.continue_dispatch
    }
}

/// Drains one native event source into a [`Display`].
///
/// A pump runs on the thread that opened its connection and nowhere else.
pub trait EventPump {
    /// Handle up to the configured batch limit of pending native events.
    ///
    /// Events for unknown windows are dropped. A sink returning `false` ends
    /// the batch early with `continue_dispatch == false`. Errors mean the
    /// native connection itself failed; closing it is the caller's business.
    fn pump(&mut self, display: &mut Display) -> Result<PumpStatus, Error>;
}
