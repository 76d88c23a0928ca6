use super::{Clock, GnssEnable, PowerControl, SerialChannel};
use core::convert::Infallible;
use serialport::{ClearBuffer, SerialPort};
use std::io::{Read, Write};
use std::time::{Duration, Instant};
use tracing::warn;

const PORT_READ_TIMEOUT_MS: u64 = 10;

/// [`SerialChannel`] over a host serial device.
pub struct SerialPortChannel {
    port: Box<dyn SerialPort>,
}

impl SerialPortChannel {
    pub fn open(path: &str, baud_rate: u32) -> serialport::Result<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(Duration::from_millis(PORT_READ_TIMEOUT_MS))
            .data_bits(serialport::DataBits::Eight)
            .open()?;

        Ok(Self { port })
    }
}

impl SerialChannel for SerialPortChannel {
    fn read(&mut self) -> nb::Result<u8, Infallible> {
        match self.port.bytes_to_read() {
            Ok(0) => return Err(nb::Error::WouldBlock),
            Ok(_) => {}
            Err(e) => {
                warn!("serial status query failed: {}", e);
                return Err(nb::Error::WouldBlock);
            }
        }

        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(1) => Ok(byte[0]),
            Ok(_) => Err(nb::Error::WouldBlock),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::TimedOut {
                    warn!("serial read failed: {}", e);
                }
                Err(nb::Error::WouldBlock)
            }
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        if let Err(e) = self.port.write_all(bytes) {
            warn!("serial write failed: {}", e);
        }
    }

    fn clear(&mut self) {
        if let Err(e) = self.port.clear(ClearBuffer::Input) {
            warn!("serial input flush failed: {}", e);
        }
    }
}

/// Wall-clock [`Clock`] backed by [`Instant`] and `thread::sleep`.
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: Instant,
}

impl StdClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}

/// Stand-in for boards that give the host no power key or status line
/// (USB dongles, always-on HATs). The modem reads as permanently powered.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOn;

impl PowerControl for AlwaysOn {
    fn is_powered(&mut self) -> bool {
        true
    }

    fn set_power_key(&mut self, _high: bool) {}
}

impl GnssEnable for AlwaysOn {
    fn set_gnss_enabled(&mut self, _enabled: bool) {}
}
