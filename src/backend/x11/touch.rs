// Copyright 2023 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! XInput2 touch id remapping.
//!
//! XI2 touch ids (`detail`) are large, device-assigned and keep increasing.
//! Before they reach the reconciler they are remapped to the smallest unused
//! small integer, which stays put for the life of the contact.

use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct TouchIdMap {
    active: BTreeMap<u32, u32>,
}

impl TouchIdMap {
    pub fn new() -> TouchIdMap {
        TouchIdMap::default()
    }

    /// Start tracking `detail`, returning its logical id.
    pub fn begin(&mut self, detail: u32) -> u32 {
        if let Some(id) = self.active.get(&detail) {
            return *id;
        }
        let mut used: Vec<u32> = self.active.values().copied().collect();
        used.sort_unstable();
        let mut id = 0;
        for taken in used {
            if taken != id {
                break;
            }
            id += 1;
        }
        self.active.insert(detail, id);
        id
    }

    pub fn get(&self, detail: u32) -> Option<u32> {
        self.active.get(&detail).copied()
    }

    /// Stop tracking `detail`, returning the id it had.
    pub fn end(&mut self, detail: u32) -> Option<u32> {
        self.active.remove(&detail)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}
