// Copyright 2023 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! The native handle wrapper: binds each platform window to its user data.
//!
//! Native APIs give us one pointer-sized slot per window (an X11 property,
//! `GWLP_USERDATA`, a KD `userptr`) and hand back whatever integer was put
//! there. The registry never stores pointers in those slots. It stores a
//! [`UserDataKey`]: an arena index plus a generation, tagged with a magic
//! value. A stale or corrupted value is a lookup miss, never a dangling
//! pointer.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::error::Error;
use crate::state::{Lifecycle, UserData};
use crate::window::{WindowBuilder, WindowHandle};

/// Tag in the top 16 bits of a raw key.
const KEY_MAGIC: u64 = 0x4e57 << 48;
const KEY_MAGIC_MASK: u64 = 0xffff << 48;

/// A generation-checked reference to a window's user data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserDataKey {
    index: u32,
    generation: u16,
}

impl UserDataKey {
    /// Encode this key as a tagged integer for a native user-data slot.
    pub fn to_raw(self) -> u64 {
        KEY_MAGIC | (u64::from(self.generation) << 32) | u64::from(self.index)
    }

    /// Decode a value read back from a native slot.
    ///
    /// Returns `None` if the magic tag is missing, which is what arbitrary
    /// integers left by other code look like.
    pub fn from_raw(raw: u64) -> Option<UserDataKey> {
        if raw & KEY_MAGIC_MASK != KEY_MAGIC {
            return None;
        }
        Some(UserDataKey {
            index: (raw & 0xffff_ffff) as u32,
            generation: ((raw >> 32) & 0xffff) as u16,
        })
    }
}

struct Slot {
    generation: u16,
    data: Option<UserData>,
    /// The handle that last lived here, while the slot is free.
    retired: Option<WindowHandle>,
}

/// The side table from native handles to user data.
///
/// This is owned by one [`Display`](crate::Display) and only touched from
/// the thread that drives that display's pump.
#[derive(Default)]
pub struct WindowRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    by_handle: HashMap<WindowHandle, UserDataKey>,
    /// Handles whose slot is still free, for double-free reports.
    retired: HashMap<WindowHandle, UserDataKey>,
}

impl WindowRegistry {
    pub fn new() -> WindowRegistry {
        WindowRegistry::default()
    }

    /// Bind fresh user data to `handle`.
    ///
    /// Fails with [`Error::AlreadyBound`] if `handle` already has data, even
    /// if that data is mid-destruction.
    pub fn create(
        &mut self,
        handle: WindowHandle,
        builder: &WindowBuilder,
    ) -> Result<UserDataKey, Error> {
        if self.by_handle.contains_key(&handle) {
            return Err(Error::AlreadyBound(handle));
        }
        let data = UserData::new(handle, builder);
        let key = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.data = Some(data);
                if let Some(previous) = slot.retired.take() {
                    if self.retired.get(&previous).map(|k| k.index) == Some(index) {
                        self.retired.remove(&previous);
                    }
                }
                UserDataKey {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    data: Some(data),
                    retired: None,
                });
                UserDataKey {
                    index,
                    generation: 0,
                }
            }
        };
        self.retired.remove(&handle);
        self.by_handle.insert(handle, key);
        debug!("bound {:?} to {:?}", handle, key);
        Ok(key)
    }

    /// The key for a live window.
    ///
    /// Windows being destroyed are not live.
    pub fn lookup(&self, handle: WindowHandle) -> Option<UserDataKey> {
        let key = *self.by_handle.get(&handle)?;
        match self.get(key) {
            Some(data) if data.lifecycle != Lifecycle::Destroying => Some(key),
            _ => None,
        }
    }

    /// The key stored in a native slot, if it still names a live window.
    pub fn lookup_raw(&self, raw: u64) -> Option<UserDataKey> {
        let key = UserDataKey::from_raw(raw)?;
        match self.get(key) {
            Some(data) if data.lifecycle != Lifecycle::Destroying => Some(key),
            _ => {
                trace!("stale user data key 0x{raw:x}");
                None
            }
        }
    }

    pub fn get(&self, key: UserDataKey) -> Option<&UserData> {
        let slot = self.slots.get(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.data.as_ref()
    }

    pub fn get_mut(&mut self, key: UserDataKey) -> Option<&mut UserData> {
        let slot = self.slots.get_mut(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        slot.data.as_mut()
    }

    /// The user data for `handle`, including a window being destroyed.
    pub(crate) fn data_mut_any(&mut self, handle: WindowHandle) -> Option<&mut UserData> {
        let key = *self.by_handle.get(&handle)?;
        self.get_mut(key)
    }

    /// Unbind `handle` and free its user data.
    ///
    /// Calling this twice for one handle is [`Error::DoubleFree`].
    pub fn destroy(&mut self, handle: WindowHandle) -> Result<UserData, Error> {
        let key = match self.by_handle.remove(&handle) {
            Some(key) => key,
            None if self.retired.contains_key(&handle) => return Err(Error::DoubleFree(handle)),
            None => return Err(Error::UnknownHandle(handle)),
        };
        let slot = &mut self.slots[key.index as usize];
        let data = slot.data.take().ok_or(Error::DoubleFree(handle))?;
        slot.generation = slot.generation.wrapping_add(1);
        slot.retired = Some(handle);
        self.free.push(key.index);
        self.retired.insert(handle, key);
        debug!("unbound {:?}", handle);
        Ok(data)
    }

    /// Number of bound windows, including ones being destroyed.
    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }

    /// Handles of all live windows.
    pub fn handles(&self) -> impl Iterator<Item = WindowHandle> + '_ {
        self.by_handle
            .keys()
            .copied()
            .filter(move |h| self.lookup(*h).is_some())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_log::test;

    const W1: WindowHandle = WindowHandle::from_raw(0x100);
    const W2: WindowHandle = WindowHandle::from_raw(0x200);

    #[test]
    fn bind_lookup_destroy() {
        let mut reg = WindowRegistry::new();
        let key = reg.create(W1, &WindowBuilder::new()).unwrap();
        assert_eq!(reg.lookup(W1), Some(key));
        assert!(matches!(
            reg.create(W1, &WindowBuilder::new()),
            Err(Error::AlreadyBound(h)) if h == W1
        ));

        assert!(reg.destroy(W1).is_ok());
        assert_eq!(reg.lookup(W1), None);
        assert!(reg.get(key).is_none());
        assert!(matches!(reg.destroy(W1), Err(Error::DoubleFree(h)) if h == W1));
        assert!(matches!(reg.destroy(W2), Err(Error::UnknownHandle(_))));
    }

    #[test]
    fn reused_slot_rejects_old_key() {
        let mut reg = WindowRegistry::new();
        let old = reg.create(W1, &WindowBuilder::new()).unwrap();
        reg.destroy(W1).unwrap();
        let new = reg.create(W2, &WindowBuilder::new()).unwrap();
        assert_ne!(old, new);
        assert!(reg.get(old).is_none());
        assert_eq!(reg.get(new).map(|d| d.handle()), Some(W2));
        assert_eq!(reg.lookup_raw(old.to_raw()), None);
        assert_eq!(reg.lookup_raw(new.to_raw()), Some(new));
    }

    #[test]
    fn retired_handles_are_forgotten_when_slots_are_reused() {
        let mut reg = WindowRegistry::new();
        for raw in 1..=1000 {
            let handle = WindowHandle::from_raw(raw);
            reg.create(handle, &WindowBuilder::new()).unwrap();
            reg.destroy(handle).unwrap();
        }
        assert_eq!(reg.slots.len(), 1);
        assert_eq!(reg.retired.len(), 1);
        // The most recent handle still reports a double free.
        let last = WindowHandle::from_raw(1000);
        assert!(matches!(reg.destroy(last), Err(Error::DoubleFree(h)) if h == last));
        assert!(matches!(
            reg.destroy(WindowHandle::from_raw(1)),
            Err(Error::UnknownHandle(_))
        ));
    }

    #[test]
    fn reused_handle_keeps_its_own_retirement() {
        let mut reg = WindowRegistry::new();
        reg.create(W1, &WindowBuilder::new()).unwrap();
        reg.create(W2, &WindowBuilder::new()).unwrap();
        reg.destroy(W1).unwrap();
        reg.destroy(W2).unwrap();
        // W1 comes back in W2's old slot while its first slot is still free.
        reg.create(W1, &WindowBuilder::new()).unwrap();
        reg.create(WindowHandle::from_raw(0x300), &WindowBuilder::new())
            .unwrap();
        reg.destroy(W1).unwrap();
        assert!(matches!(reg.destroy(W1), Err(Error::DoubleFree(_))));
        assert_eq!(reg.retired.len(), 1);
    }

    #[test]
    fn raw_keys_need_the_tag() {
        assert_eq!(UserDataKey::from_raw(0), None);
        assert_eq!(UserDataKey::from_raw(0xdead_beef), None);
        let key = UserDataKey {
            index: 3,
            generation: 9,
        };
        assert_eq!(UserDataKey::from_raw(key.to_raw()), Some(key));
    }

    #[test]
    fn destroying_windows_are_not_live() {
        let mut reg = WindowRegistry::new();
        let key = reg.create(W1, &WindowBuilder::new()).unwrap();
        reg.get_mut(key).unwrap().on_destroy_confirmed();
        assert_eq!(reg.lookup(W1), None);
        assert!(reg.data_mut_any(W1).is_some());
        assert_eq!(reg.handles().count(), 0);
    }
}
