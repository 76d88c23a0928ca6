//! The modem session and the flows built on the [`Transceiver`].
//!
//! [`Sim868`] owns everything the driver remembers between calls: the
//! transceiver with its reply buffer, the power line, the selected bearer
//! profile, the HTTP header and the last HTTP payload. Each flow lives in its
//! own file as an `impl` block on the session:
//!
//! - [`power`] - power key, autobaud handshake
//! - [`sim_card`] - SIM detect, presence and PIN checks
//! - [`network`] - selection mode, RSSI, registration polling
//! - [`bearer`] - GPRS attach and bearer context lifecycle
//! - [`http`] - HTTP session state machine with bounded retries

pub mod bearer;
pub mod http;
pub mod network;
pub mod power;
pub mod sim_card;

pub use bearer::{BearerConfig, Carrier, ConnectionState};
pub use http::{HttpHeader, HttpMethod};
pub use network::{RegistrationStatus, SignalQuality};
pub use power::{PowerLevel, PowerState};

use crate::config::{ModemConfig, RegistrationPolicy, Timeouts};
use crate::error::Result;
use crate::io::{Clock, PowerControl, SerialChannel};
use crate::protocol::{ReplyBuffer, Transceiver};
use arrayvec::ArrayString;

/// One modem on one serial channel.
pub struct Sim868<S, P, C> {
    link: Transceiver<S, C>,
    power: P,
    timeouts: Timeouts,
    registration: RegistrationPolicy,
    bearer: Option<BearerConfig>,
    http_header: HttpHeader,
    http_buffer: ReplyBuffer,
    last_http_status: Option<u16>,
}

impl<S, P, C> Sim868<S, P, C>
where
    S: SerialChannel,
    P: PowerControl,
    C: Clock,
{
    pub fn new(serial: S, power: P, clock: C) -> Self {
        Self {
            link: Transceiver::new(serial, clock),
            power,
            timeouts: Timeouts::default(),
            registration: RegistrationPolicy::default(),
            bearer: None,
            http_header: HttpHeader::default(),
            http_buffer: ArrayString::new(),
            last_http_status: None,
        }
    }

    /// Session preloaded with timeouts, carrier profile and HTTP header.
    pub fn with_config(serial: S, power: P, clock: C, config: &ModemConfig) -> Result<Self> {
        let mut modem = Self::new(serial, power, clock);
        modem.timeouts = config.timeouts;
        modem.registration = config.registration;
        modem.gprs_set_apn(config.carrier);

        let http = &config.http;
        modem.http_set_root(&http.root)?;
        modem.http_set_web_service(&http.web_service)?;
        modem.http_set_user_agent(&http.user_agent)?;
        modem.http_set_user_data(&http.user_data)?;
        modem.http_set_content_type(&http.content_type)?;

        Ok(modem)
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    pub fn set_timeouts(&mut self, timeouts: Timeouts) {
        self.timeouts = timeouts;
    }

    pub fn registration_policy(&self) -> &RegistrationPolicy {
        &self.registration
    }

    pub fn set_registration_policy(&mut self, policy: RegistrationPolicy) {
        self.registration = policy;
    }

    pub fn transceiver(&self) -> &Transceiver<S, C> {
        &self.link
    }

    pub fn power_control(&self) -> &P {
        &self.power
    }
}
