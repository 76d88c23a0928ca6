//! # SIM868 Driver
//!
//! A synchronous AT-command engine for the SIM868 cellular + GNSS module,
//! driving one modem over one serial channel.
//!
//! ## Features
//!
//! - **Command transceiver**: CRLF line framing, exact reply matching and
//!   `+CMD: v0,v1,...` field extraction
//! - **Bring-up**: power key control, autobaud handshake, SIM checks
//! - **Network**: operator selection, signal report, registration polling,
//!   GPRS attach and bearer lifecycle
//! - **HTTP**: GET/POST sessions with JSON upload and bounded retries
//! - **GNSS**: RMC sentence capture with position, speed and local date/time
//! - **Bounded memory**: replies and header fields live in fixed-capacity buffers
//!
//! ## Quick Start
//!
//! ```no_run
//! use sim868::io::{AlwaysOn, SerialPortChannel, StdClock};
//! use sim868::modem::{Carrier, HttpMethod, Sim868};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let port = SerialPortChannel::open("/dev/ttyS0", 115200)?;
//! let mut modem = Sim868::new(port, AlwaysOn, StdClock::new());
//!
//! modem.init()?;
//! modem.sim_card_init()?;
//! modem.gprs_set_apn(Carrier::Telcel);
//! modem.gprs_gsm_init()?;
//!
//! modem.http_set_root("http://example.com")?;
//! modem.http_set_web_service("/api/ping")?;
//! modem.http_send_request(HttpMethod::Get, 3)?;
//! println!("{}", modem.http_response());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`io`] - serial, clock and GPIO collaborator traits plus std adapters
//! - [`protocol`] - line reader, reply parser and command transceiver
//! - [`modem`] - the [`Sim868`] session and its bring-up/network/HTTP flows
//! - [`gnss`] - GNSS receiver and RMC decoding
//! - [`config`] - JSON configuration
//! - [`error`] - the [`ModemError`] taxonomy

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod config;
pub mod error;
pub mod gnss;
pub mod io;
pub mod modem;
pub mod protocol;

pub use config::ModemConfig;
pub use error::{ModemError, Result};
pub use gnss::GnssReceiver;
pub use modem::Sim868;
