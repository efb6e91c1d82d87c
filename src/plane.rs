// Copyright 2023 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! A bounded pool of compositor planes.
//!
//! Fixed-function display controllers have a handful of hardware planes and
//! every window that wants one must hold it exclusively. Unlike the rest of
//! the crate this table may be shared between displays, so it sits behind a
//! mutex.

use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use tracing::{debug, error};

use crate::error::Error;
use crate::window::WindowHandle;

/// Planes in the process-wide pool.
pub const DEFAULT_PLANES: usize = 5;

static GLOBAL: Lazy<Arc<PlanePool>> = Lazy::new(|| Arc::new(PlanePool::new(DEFAULT_PLANES)));

/// Identifies one hardware plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaneId(u8);

impl PlaneId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Maps planes to the windows holding them.
pub struct PlanePool {
    planes: Mutex<Vec<Option<WindowHandle>>>,
}

impl PlanePool {
    pub fn new(count: usize) -> PlanePool {
        PlanePool {
            planes: Mutex::new(vec![None; count.min(u8::MAX as usize + 1)]),
        }
    }

    /// The process-wide pool.
    pub fn global() -> Arc<PlanePool> {
        GLOBAL.clone()
    }

    /// Give the first free plane to `window`.
    pub fn acquire(&self, window: WindowHandle) -> Result<PlaneId, Error> {
        let mut planes = match self.planes.lock() {
            Ok(planes) => planes,
            Err(e) => {
                error!("plane pool poisoned: {}", e);
                return Err(Error::PlanesExhausted);
            }
        };
        match planes.iter().position(Option::is_none) {
            Some(idx) => {
                planes[idx] = Some(window);
                debug!("plane {} -> {:?}", idx, window);
                Ok(PlaneId(idx as u8))
            }
            None => Err(Error::PlanesExhausted),
        }
    }

    /// Return every plane `window` holds.
    pub fn release(&self, window: WindowHandle) {
        match self.planes.lock() {
            Ok(mut planes) => planes
                .iter_mut()
                .filter(|p| **p == Some(window))
                .for_each(|p| *p = None),
            Err(e) => error!("plane pool poisoned: {}", e),
        }
    }

    /// The window holding `plane`, if any.
    pub fn owner(&self, plane: PlaneId) -> Option<WindowHandle> {
        self.planes
            .lock()
            .ok()
            .and_then(|planes| planes.get(plane.index()).copied().flatten())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::display::Display;
    use crate::test_util::Recorder;
    use crate::window::WindowBuilder;
    use static_assertions as sa;
    use test_log::test;

    sa::assert_impl_all!(PlanePool: Send, Sync);

    #[test]
    fn global_pool_is_shared() {
        let pool = PlanePool::global();
        assert!(Arc::ptr_eq(&pool, &PlanePool::global()));

        let mut display = Display::with_plane_pool(PlanePool::global());
        let sink = Recorder::new();
        let window = WindowHandle::from_raw(0x91_0001);
        let mut builder = WindowBuilder::new();
        builder.request_plane(true);
        display.create_window(window, &builder, &sink).unwrap();
        let plane = display.plane(window).unwrap();
        assert!(plane.index() < DEFAULT_PLANES);
        assert_eq!(pool.owner(plane), Some(window));

        display.destroy_window(window).unwrap();
        assert_eq!(pool.owner(plane), None);
    }

    #[test]
    fn exhausts_and_recycles() {
        let pool = PlanePool::new(2);
        let a = WindowHandle::from_raw(1);
        let b = WindowHandle::from_raw(2);
        let c = WindowHandle::from_raw(3);
        let pa = pool.acquire(a).unwrap();
        pool.acquire(b).unwrap();
        assert!(matches!(pool.acquire(c), Err(Error::PlanesExhausted)));

        pool.release(a);
        assert_eq!(pool.owner(pa), None);
        assert_eq!(pool.acquire(c).unwrap(), pa);
        assert_eq!(pool.owner(pa), Some(c));
    }
}
