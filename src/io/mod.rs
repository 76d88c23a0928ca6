//! Byte-level collaborators the driver is generic over.
//!
//! The modem and the GNSS receiver each sit behind a [`SerialChannel`].
//! Timeouts are measured against a [`Clock`], and the power key and GNSS
//! enable line are abstracted by [`PowerControl`] and [`GnssEnable`] so the
//! protocol layers can run against real hardware or scripted test doubles.

pub mod std_port;

pub use std_port::{AlwaysOn, SerialPortChannel, StdClock};

use core::convert::Infallible;

/// One direction-agnostic UART. Reads never block.
pub trait SerialChannel {
    /// Next received byte, or `WouldBlock` when the receive buffer is empty.
    fn read(&mut self) -> nb::Result<u8, Infallible>;

    fn write(&mut self, bytes: &[u8]);

    /// Drop everything already received.
    fn clear(&mut self);
}

/// Monotonic millisecond clock plus a blocking delay.
pub trait Clock {
    fn now_ms(&self) -> u64;
    fn delay_ms(&mut self, ms: u32);
}

/// Power key output and power-status readback of the modem.
pub trait PowerControl {
    /// Hardware status line: `true` while the modem is powered.
    fn is_powered(&mut self) -> bool;

    /// Drive the power key. A high pulse toggles the modem between off and on.
    fn set_power_key(&mut self, high: bool);
}

/// Enable line of the GNSS receiver.
pub trait GnssEnable {
    fn set_gnss_enabled(&mut self, enabled: bool);
}

impl<T: SerialChannel + ?Sized> SerialChannel for &mut T {
    fn read(&mut self) -> nb::Result<u8, Infallible> {
        (**self).read()
    }

    fn write(&mut self, bytes: &[u8]) {
        (**self).write(bytes);
    }

    fn clear(&mut self) {
        (**self).clear();
    }
}
