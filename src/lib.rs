// Copyright 2018 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Native window event reconciliation.
//!
//! Each platform backend drains its native event queue, feeds the decoded
//! signals into a per-window state reconciler, and delivers the resulting
//! canonical [`WindowEvent`]s to an [`EventSink`]. Repeated or stale platform
//! signals never reach the sink.
//!
//! Everything hangs off a [`Display`]: it owns the side table binding native
//! window handles to their reconciled state, and is driven from one thread
//! by an [`EventPump`].

#![warn(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod backend;
pub mod display;
pub mod error;
pub mod event;
pub mod geometry;
pub mod handle;
pub mod keyboard;
pub mod mouse;
pub mod plane;
pub mod pump;
pub mod reconcile;
pub mod sink;
pub mod state;
pub mod window;

#[cfg(test)]
mod test_util;

pub use display::{deliver, Delivery, Display};
pub use error::Error;
pub use event::{PointerEvent, PointerKind, TouchEvent, TouchKind, WindowEvent};
pub use geometry::{Geometry, Insets, Point, Rect, Size};
pub use handle::{UserDataKey, WindowRegistry};
pub use keyboard::KeyEvent;
pub use mouse::{MouseButton, MouseButtons};
pub use plane::{PlaneId, PlanePool, DEFAULT_PLANES};
pub use pump::{EventPump, PumpConfig, PumpStatus, DEFAULT_BATCH_LIMIT};
pub use reconcile::Events;
pub use sink::{dispatch_event, EventSink};
pub use state::{Lifecycle, PointerState, TouchTracker, UserData, DEFAULT_TOUCH_SLOTS};
pub use window::{WindowBuilder, WindowFlags, WindowHandle, WindowLevel};
