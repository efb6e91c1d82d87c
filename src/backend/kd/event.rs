// Copyright 2023 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

/// `KD_WINDOWPROPERTY_*` values reported by property change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdWindowProperty {
    Size,
    Visibility,
    Focus,
    Other(i32),
}

/// `KD_INPUT_POINTER_*` indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdPointerIndex {
    X,
    Y,
    Select,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdEventKind {
    WindowPropertyChange(KdWindowProperty),
    WindowClose,
    Pointer { index: KdPointerIndex, value: i32 },
    Other,
}

/// One event off the KD queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdEvent {
    /// The `userptr` the window was created with.
    pub userptr: u64,
    pub kind: KdEventKind,
}

impl KdEvent {
    pub fn new(userptr: u64, kind: KdEventKind) -> KdEvent {
        KdEvent { userptr, kind }
    }
}
