use super::{ReplyBuffer, POLL_TICK_MS};
use crate::io::{Clock, SerialChannel};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMode {
    /// Stop at the first line feed that follows captured content.
    Single,
    /// Keep capturing (line feeds included) until timeout or capacity.
    Multi,
}

/// How a capture ended. None of these is an error at this layer; callers
/// compare the captured text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    Complete,
    TimedOut,
    Overflow,
}

/// Bytes above 0x7F are captured as this, one byte each.
pub const NON_ASCII_PLACEHOLDER: char = '?';

/// Map a received byte to the character stored in a capture buffer.
pub fn ascii_char(byte: u8) -> char {
    if byte.is_ascii() {
        char::from(byte)
    } else {
        NON_ASCII_PLACEHOLDER
    }
}

/// Capture one reply into `buffer`, replacing its contents.
///
/// Carriage returns are discarded and line feeds before any content are
/// skipped. Whatever was captured stays in `buffer` when the deadline passes
/// or the buffer fills, possibly nothing.
pub fn read_line<S, C>(
    serial: &mut S,
    clock: &mut C,
    buffer: &mut ReplyBuffer,
    timeout_ms: u32,
    mode: LineMode,
) -> LineStatus
where
    S: SerialChannel + ?Sized,
    C: Clock + ?Sized,
{
    buffer.clear();
    let deadline = clock.now_ms().saturating_add(u64::from(timeout_ms));

    loop {
        while let Ok(byte) = serial.read() {
            match byte {
                b'\r' => continue,
                b'\n' if buffer.is_empty() => continue,
                b'\n' if mode == LineMode::Single => return LineStatus::Complete,
                _ => {}
            }

            if buffer.try_push(ascii_char(byte)).is_err() {
                warn!(
                    "reply exceeds {} bytes, keeping truncated capture",
                    buffer.capacity()
                );
                return LineStatus::Overflow;
            }
        }

        if clock.now_ms() >= deadline {
            return LineStatus::TimedOut;
        }

        clock.delay_ms(POLL_TICK_MS);
    }
}
