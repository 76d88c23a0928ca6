use super::Sim868;
use crate::error::{ModemError, Result};
use crate::io::{Clock, PowerControl, SerialChannel};
use core::ops::Range;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Documented usable `+CSQ` window.
pub const RSSI_USABLE: Range<u16> = 9..32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalQuality {
    Unusable,
    Low,
    Medium,
    High,
    /// 99 (not detectable) or anything above the scale.
    Unknown,
}

impl SignalQuality {
    pub fn from_rssi(rssi: u16) -> Self {
        match rssi {
            0..=8 => SignalQuality::Unusable,
            9..=14 => SignalQuality::Low,
            15..=19 => SignalQuality::Medium,
            20..=31 => SignalQuality::High,
            _ => SignalQuality::Unknown,
        }
    }
}

/// `+CREG` status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStatus {
    NotRegistered,
    RegisteredHome,
    Searching,
    Denied,
    Unknown,
    RegisteredRoaming,
}

impl RegistrationStatus {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(RegistrationStatus::NotRegistered),
            1 => Some(RegistrationStatus::RegisteredHome),
            2 => Some(RegistrationStatus::Searching),
            3 => Some(RegistrationStatus::Denied),
            4 => Some(RegistrationStatus::Unknown),
            5 => Some(RegistrationStatus::RegisteredRoaming),
            _ => None,
        }
    }
}

/// Both bounds have to fail at once, which no reading does: a weak signal is
/// logged through [`SignalQuality`] and never rejects the bring-up.
fn rssi_rejected(rssi: u16, window: &Range<u16>) -> bool {
    rssi < window.start && rssi > window.end
}

impl<S, P, C> Sim868<S, P, C>
where
    S: SerialChannel,
    P: PowerControl,
    C: Clock,
{
    /// Selection mode, signal, registration, then bearer up.
    pub fn gprs_gsm_init(&mut self) -> Result<()> {
        self.gprs_network_mode()?;
        self.gprs_network_rssi()?;
        self.gsm_network_registration()?;

        info!("GSM network registration OK");
        self.gprs_enable(true)
    }

    /// Force automatic operator selection.
    pub fn gprs_network_mode(&mut self) -> Result<()> {
        let timeout = self.timeouts.default_ms;
        let mode = self.link.send_parse_reply("AT+COPS?", "+COPS: ", ',', 0, timeout)?;

        if mode != 0 {
            self.link.send_check_reply("AT+COPS=0", "OK", timeout)?;
        }

        Ok(())
    }

    /// Query `+CSQ` and return the raw RSSI.
    pub fn gprs_network_rssi(&mut self) -> Result<u16> {
        let timeout = self.timeouts.default_ms;
        let rssi = self.link.send_parse_reply("AT+CSQ", "+CSQ: ", ',', 0, timeout)?;

        let quality = SignalQuality::from_rssi(rssi);
        info!("signal strength {} ({:?})", rssi, quality);

        if rssi_rejected(rssi, &RSSI_USABLE) {
            return Err(ModemError::NetworkRssi);
        }

        Ok(rssi)
    }

    /// Poll `+CREG` for the whole policy window.
    ///
    /// Registered (home or roaming) records success, not-registered records
    /// failure, searching and denied only log. Every poll runs, so the result
    /// is whatever the last recording poll left behind.
    pub fn gsm_network_registration(&mut self) -> Result<()> {
        let policy = self.registration;
        let timeout = self.timeouts.default_ms;
        let mut outcome = Err(ModemError::NetworkRegistration);

        for round in 0..policy.rounds {
            for _ in 0..policy.polls_per_round() {
                let status = self
                    .link
                    .send_parse_reply("AT+CREG?", "+CREG: ", ',', 1, timeout)
                    .map(RegistrationStatus::from_code);

                match status {
                    Ok(Some(RegistrationStatus::NotRegistered)) => {
                        outcome = Err(ModemError::NetworkRegistration);
                    }
                    Ok(Some(
                        RegistrationStatus::RegisteredHome | RegistrationStatus::RegisteredRoaming,
                    )) => {
                        outcome = Ok(());
                    }
                    Ok(Some(RegistrationStatus::Searching)) => {
                        warn!("still searching for network (round {})", round + 1);
                    }
                    Ok(Some(RegistrationStatus::Denied)) => {
                        warn!("network registration denied");
                    }
                    Ok(Some(RegistrationStatus::Unknown) | None) | Err(_) => {
                        outcome = Err(ModemError::Reply);
                    }
                }

                self.link.delay_ms(u32::from(policy.poll_interval_s) * 1000);
            }
        }

        outcome
    }
}
