use super::line::{read_line, LineMode, LineStatus};
use super::reply::parse_reply;
use super::ReplyBuffer;
use crate::error::{ModemError, Result};
use crate::io::{Clock, SerialChannel};
use arrayvec::ArrayString;
use tracing::debug;

/// The only path by which higher layers talk to the modem: write a command,
/// capture the reply into the session buffer, compare or parse it.
#[derive(Debug)]
pub struct Transceiver<S, C> {
    serial: S,
    clock: C,
    buffer: ReplyBuffer,
}

impl<S: SerialChannel, C: Clock> Transceiver<S, C> {
    pub fn new(serial: S, clock: C) -> Self {
        Self {
            serial,
            clock,
            buffer: ArrayString::new(),
        }
    }

    /// Latest captured reply.
    pub fn reply(&self) -> &str {
        &self.buffer
    }

    pub fn reply_buffer(&self) -> &ReplyBuffer {
        &self.buffer
    }

    pub fn read_line(&mut self, timeout_ms: u32, mode: LineMode) -> LineStatus {
        let status = read_line(
            &mut self.serial,
            &mut self.clock,
            &mut self.buffer,
            timeout_ms,
            mode,
        );
        debug!("<--- {} ({:?})", self.buffer.as_str(), status);
        status
    }

    /// Discard pending input, send `cmd` + CRLF and capture one reply line.
    pub fn get_reply(&mut self, cmd: &str, timeout_ms: u32) -> LineStatus {
        self.serial.clear();
        self.buffer.clear();

        debug!("---> {}", cmd);
        self.serial.write(cmd.as_bytes());
        self.serial.write(b"\r\n");

        self.read_line(timeout_ms, LineMode::Single)
    }

    /// Send `cmd` and require the reply to equal `expected` exactly.
    pub fn send_check_reply(&mut self, cmd: &str, expected: &str, timeout_ms: u32) -> Result<()> {
        self.get_reply(cmd, timeout_ms);
        if self.buffer.as_str() == expected {
            Ok(())
        } else {
            Err(ModemError::Reply)
        }
    }

    /// Send `cmd` and extract field `field_index` after `token`.
    pub fn send_parse_reply(
        &mut self,
        cmd: &str,
        token: &str,
        divider: char,
        field_index: usize,
        timeout_ms: u32,
    ) -> Result<u16> {
        self.get_reply(cmd, timeout_ms);
        self.parse_reply(token, divider, field_index)
    }

    /// Parse the reply already sitting in the session buffer.
    pub fn parse_reply(&self, token: &str, divider: char, field_index: usize) -> Result<u16> {
        parse_reply(&self.buffer, token, divider, field_index)
    }

    /// Drain and drop whatever the modem has sent so far.
    pub fn flush_input(&mut self) {
        while self.serial.read().is_ok() {}
    }

    pub fn delay_ms(&mut self, ms: u32) {
        self.clock.delay_ms(ms);
    }

    pub fn serial(&self) -> &S {
        &self.serial
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
