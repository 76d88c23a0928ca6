//! AT command/response plumbing shared by every modem flow.
//!
//! - [`line`] frames raw serial bytes into reply lines
//! - [`reply`] matches and extracts fields from `+CMD: v0,v1,...` replies
//! - [`transceiver`] sends a command and captures its reply

pub mod line;
pub mod reply;
pub mod transceiver;

pub use line::{ascii_char, read_line, LineMode, LineStatus};
pub use reply::{parse_reply, reply_text};
pub use transceiver::Transceiver;

use arrayvec::ArrayString;
use static_assertions::const_assert;

/// Capacity of the session reply buffer and the HTTP payload buffer.
pub const REPLY_BUFFER_LENGTH: usize = 255;
pub const APN_BUFFER_LENGTH: usize = 50;
pub const URL_BUFFER_LENGTH: usize = 55;
pub const UA_BUFFER_LENGTH: usize = 30;
pub const CONTENT_BUFFER_LENGTH: usize = 42;
pub const UD_BUFFER_LENGTH: usize = 52;
pub const JSON_BUFFER_LENGTH: usize = REPLY_BUFFER_LENGTH;

/// Default wait for a single-line reply.
pub const DEFAULT_TIMEOUT_MS: u32 = 500;

/// Granularity of the reply polling loop.
pub const POLL_TICK_MS: u32 = 1;

// The modem's own line buffer is indexed with a byte.
const_assert!(REPLY_BUFFER_LENGTH <= u8::MAX as usize);
const_assert!(JSON_BUFFER_LENGTH <= REPLY_BUFFER_LENGTH);

pub type ReplyBuffer = ArrayString<REPLY_BUFFER_LENGTH>;
