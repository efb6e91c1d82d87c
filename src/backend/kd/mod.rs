// Copyright 2023 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! OpenKODE (KD) event pump.
//!
//! KD platforms show a single window. Its events carry the `userptr` given at
//! creation; the pump only accepts events whose `userptr` matches the
//! currently registered window.

mod event;
mod pump;

pub use event::{KdEvent, KdEventKind, KdPointerIndex, KdWindowProperty};
pub use pump::KdPump;

use std::time::Duration;

use crate::geometry::Size;

/// The KD event queue and window property getters.
pub trait KdEventSource {
    /// Wait up to `timeout` for the next event. A zero timeout never blocks.
    fn wait_event(&mut self, timeout: Duration) -> anyhow::Result<Option<KdEvent>>;

    fn window_size(&mut self) -> anyhow::Result<Size>;

    fn window_visible(&mut self) -> anyhow::Result<bool>;

    fn window_focused(&mut self) -> anyhow::Result<bool>;
}
