// Copyright 2020 the Druid Authors
// SPDX-License-Identifier: Apache-2.0

//! Platform event pumps.
//!
//! Each pump is generic over a source of decoded native events, so every pump
//! builds and is tested on every platform. The sources that talk to a real
//! windowing system are only built where that system exists.

pub mod appkit;
pub mod kd;
pub(crate) mod shared;
pub mod windows;
pub mod x11;

cfg_if::cfg_if! {
    if #[cfg(target_os = "windows")] {
        /// The pump for this platform's native windowing system.
        pub type NativePump = windows::Win32Pump<windows::Win32Source>;

        /// Create the pump for the calling thread's message queue.
        pub fn native_pump() -> Result<NativePump, crate::Error> {
            Ok(windows::Win32Pump::new(windows::Win32Source::new()))
        }
    } else if #[cfg(all(
        feature = "x11",
        any(target_os = "freebsd", target_os = "linux", target_os = "openbsd")
    ))] {
        /// The pump for this platform's native windowing system.
        pub type NativePump = x11::X11Pump<x11::XcbSource>;

        /// Connect to `$DISPLAY` and create a pump for it.
        pub fn native_pump() -> Result<NativePump, crate::Error> {
            Ok(x11::X11Pump::new(x11::XcbSource::connect()?))
        }
    }
}
