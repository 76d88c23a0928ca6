#![allow(dead_code)]

use sim868::io::{Clock, GnssEnable, PowerControl, SerialChannel};
use std::collections::VecDeque;
use std::convert::Infallible;

/// Serial double that answers each CRLF-terminated command with the next
/// scripted reply. Replies are framed as `\r\n<reply>\r\n`; an empty reply
/// means the modem stays silent.
#[derive(Debug, Default)]
pub struct MockSerial {
    replies: VecDeque<String>,
    rx: VecDeque<u8>,
    stream: VecDeque<u8>,
    tx: Vec<u8>,
    sent: Vec<String>,
}

impl MockSerial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: &[&str]) -> Self {
        let mut serial = Self::new();
        for reply in replies {
            serial.push_reply(reply);
        }
        serial
    }

    /// Bytes that arrive after any `clear()`, like a free-running NMEA feed.
    pub fn streaming(bytes: &[u8]) -> Self {
        let mut serial = Self::new();
        serial.stream.extend(bytes);
        serial
    }

    pub fn push_reply(&mut self, reply: &str) {
        self.replies.push_back(reply.to_string());
    }

    /// Bytes already waiting in the receive buffer.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    pub fn count_sent(&self, command: &str) -> usize {
        self.sent.iter().filter(|c| c.as_str() == command).count()
    }

    pub fn pending_replies(&self) -> usize {
        self.replies.len()
    }
}

impl SerialChannel for MockSerial {
    fn read(&mut self) -> nb::Result<u8, Infallible> {
        self.rx
            .pop_front()
            .or_else(|| self.stream.pop_front())
            .ok_or(nb::Error::WouldBlock)
    }

    fn write(&mut self, bytes: &[u8]) {
        self.tx.extend_from_slice(bytes);
        if !self.tx.ends_with(b"\r\n") {
            return;
        }

        let line = String::from_utf8_lossy(&self.tx[..self.tx.len() - 2]).into_owned();
        self.tx.clear();
        self.sent.push(line);

        if let Some(reply) = self.replies.pop_front() {
            if !reply.is_empty() {
                self.rx.extend(format!("\r\n{}\r\n", reply).bytes());
            }
        }
    }

    fn clear(&mut self) {
        self.rx.clear();
    }
}

/// Virtual clock: delays advance time, nothing sleeps.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockClock {
    now: u64,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now += u64::from(ms);
    }
}

/// Power key whose rising edge toggles the readback, unless the modem is
/// set up to ignore it.
#[derive(Debug, Clone, Copy)]
pub struct MockPower {
    pub powered: bool,
    pub responsive: bool,
    pub pulses: usize,
    key_high: bool,
}

impl MockPower {
    pub fn off() -> Self {
        Self {
            powered: false,
            responsive: true,
            pulses: 0,
            key_high: false,
        }
    }

    pub fn on() -> Self {
        Self {
            powered: true,
            ..Self::off()
        }
    }

    pub fn unresponsive(powered: bool) -> Self {
        Self {
            powered,
            responsive: false,
            ..Self::off()
        }
    }
}

impl PowerControl for MockPower {
    fn is_powered(&mut self) -> bool {
        self.powered
    }

    fn set_power_key(&mut self, high: bool) {
        if high && !self.key_high {
            self.pulses += 1;
            if self.responsive {
                self.powered = !self.powered;
            }
        }
        self.key_high = high;
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MockGnssEnable {
    pub enabled: bool,
}

impl GnssEnable for MockGnssEnable {
    fn set_gnss_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}
