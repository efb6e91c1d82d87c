// Copyright 2019 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Errors at the window shell level.

use std::fmt;
use std::sync::Arc;

use crate::window::WindowHandle;

/// Shell errors.
///
/// Only the registry misuse variants and [`Error::PlanesExhausted`] are ever
/// returned to callers. The others name outcomes that are logged and turned
/// into "nothing to deliver" inside the event pumps.
#[derive(Debug, Clone)]
pub enum Error {
    /// The handle already has user data bound to it.
    AlreadyBound(WindowHandle),
    /// The handle was destroyed twice.
    DoubleFree(WindowHandle),
    /// An event or request named a handle with no live user data.
    UnknownHandle(WindowHandle),
    /// Every touch slot is in use.
    TouchCapacityExceeded { capacity: usize },
    /// The sink for a window has been dropped or is busy.
    SinkUnavailable,
    /// A window asked for a compositor plane but none is free.
    PlanesExhausted,
    /// Other miscellaneous error, usually from the platform connection.
    Other(Arc<anyhow::Error>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Error::AlreadyBound(handle) => {
                write!(f, "Window {handle:?} already has user data bound to it.")
            }
            Error::DoubleFree(handle) => {
                write!(f, "Window {handle:?} has already been destroyed.")
            }
            Error::UnknownHandle(handle) => write!(f, "Window {handle:?} is not known."),
            Error::TouchCapacityExceeded { capacity } => {
                write!(f, "All {capacity} touch slots are in use.")
            }
            Error::SinkUnavailable => write!(f, "The event sink is no longer available."),
            Error::PlanesExhausted => write!(f, "No free compositor plane."),
            Error::Other(s) => write!(f, "{s}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<anyhow::Error> for Error {
    fn from(src: anyhow::Error) -> Error {
        Error::Other(Arc::new(src))
    }
}
