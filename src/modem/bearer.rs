use super::Sim868;
use crate::error::{ModemError, Result};
use crate::io::{Clock, PowerControl, SerialChannel};
use crate::protocol::APN_BUFFER_LENGTH;
use arrayvec::ArrayString;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Carriers with a known bearer profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Carrier {
    #[default]
    M2m,
    Att,
    Iusacell,
    Telcel,
    Movistar,
}

impl Carrier {
    /// `(apn, user, password)` for the carrier.
    pub fn profile(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Carrier::M2m => ("m2m.amx", "jasper", "jasper"),
            Carrier::Att | Carrier::Iusacell => ("modem.nexteldata.com.mx", " ", " "),
            Carrier::Movistar => ("internet.movistar.mx", "movistar", "movistar"),
            Carrier::Telcel => ("internet.itelcel.com", "webgprs", "webgprs2003"),
        }
    }
}

type ProfileField = ArrayString<APN_BUFFER_LENGTH>;

/// GPRS bearer profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BearerConfig {
    pub apn: ProfileField,
    pub user: ProfileField,
    pub password: ProfileField,
}

impl BearerConfig {
    pub fn new(apn: &str, user: &str, password: &str) -> Result<Self> {
        Ok(Self {
            apn: profile_field(apn)?,
            user: profile_field(user)?,
            password: profile_field(password)?,
        })
    }

    pub fn for_carrier(carrier: Carrier) -> Self {
        let (apn, user, password) = carrier.profile();
        // Table entries are far below the field ceiling.
        Self {
            apn: ArrayString::from(apn).unwrap_or_default(),
            user: ArrayString::from(user).unwrap_or_default(),
            password: ArrayString::from(password).unwrap_or_default(),
        }
    }
}

fn profile_field(value: &str) -> Result<ProfileField> {
    ArrayString::from(value).map_err(|_| ModemError::MessageTooLarge {
        limit: APN_BUFFER_LENGTH,
    })
}

/// `+SAPBR` bearer status. Always queried, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Closing,
    Closed,
}

impl ConnectionState {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(ConnectionState::Connecting),
            1 => Some(ConnectionState::Connected),
            2 => Some(ConnectionState::Closing),
            3 => Some(ConnectionState::Closed),
            _ => None,
        }
    }
}

impl<S, P, C> Sim868<S, P, C>
where
    S: SerialChannel,
    P: PowerControl,
    C: Clock,
{
    /// Select the bearer profile used by the next [`Self::gprs_enable`].
    pub fn gprs_set_apn(&mut self, carrier: Carrier) {
        self.bearer = Some(BearerConfig::for_carrier(carrier));
    }

    pub fn gprs_set_bearer(&mut self, config: BearerConfig) {
        self.bearer = Some(config);
    }

    pub fn bearer_config(&self) -> Option<&BearerConfig> {
        self.bearer.as_ref()
    }

    /// Current bearer state from `AT+SAPBR=2,1`.
    pub fn gprs_query(&mut self) -> Result<ConnectionState> {
        let code = self.link.send_parse_reply(
            "AT+SAPBR=2,1",
            "+SAPBR: ",
            ',',
            1,
            self.timeouts.bearer_param_ms,
        )?;

        ConnectionState::from_code(code).ok_or(ModemError::Reply)
    }

    /// Bring the GPRS attachment and bearer to the wanted state.
    ///
    /// Steps already in the wanted state are skipped. When tearing down, a
    /// bearer that fails to close does not stop the detach; its error is
    /// reported after the detach ran.
    pub fn gprs_enable(&mut self, connect: bool) -> Result<()> {
        let attach_ms = self.timeouts.attach_ms;

        let attached = self
            .link
            .send_parse_reply("AT+CGATT?", "+CGATT: ", ',', 0, attach_ms)?
            != 0;

        if connect && !attached {
            self.link
                .send_check_reply("AT+CGATT=1", "OK", attach_ms)
                .map_err(|_| ModemError::GprsService)?;
        }

        let bearer = self.gprs_query()?;
        let mut teardown = Ok(());

        if connect && bearer == ConnectionState::Closed {
            self.open_bearer()?;
            info!("bearer connected");
        } else if !connect && bearer == ConnectionState::Connected {
            teardown = self.close_bearer();
        }

        if !connect && attached {
            self.link
                .send_check_reply("AT+CGATT=0", "OK", attach_ms)
                .map_err(|_| ModemError::GprsService)?;
        }

        teardown
    }

    fn open_bearer(&mut self) -> Result<()> {
        let config = self.bearer.ok_or(ModemError::NotConfigured("bearer profile"))?;
        let param_ms = self.timeouts.bearer_param_ms;

        let commands = [
            "AT+SAPBR=3,1,\"CONTYPE\",\"GPRS\"".to_string(),
            format!("AT+SAPBR=3,1,\"APN\",\"{}\"", config.apn),
            format!("AT+SAPBR=3,1,\"USER\",\"{}\"", config.user),
            format!("AT+SAPBR=3,1,\"PWD\",\"{}\"", config.password),
        ];
        for command in &commands {
            self.link.send_check_reply(command, "OK", param_ms)?;
        }

        self.link
            .send_check_reply("AT+SAPBR=1,1", "OK", self.timeouts.bearer_switch_ms)
            .map_err(|_| ModemError::GprsContext)?;

        match self.gprs_query() {
            Ok(ConnectionState::Connected) => Ok(()),
            _ => Err(ModemError::GprsContext),
        }
    }

    fn close_bearer(&mut self) -> Result<()> {
        self.link
            .send_check_reply("AT+SAPBR=0,1", "OK", self.timeouts.bearer_switch_ms)
            .map_err(|_| ModemError::GprsContext)?;

        match self.gprs_query() {
            Ok(ConnectionState::Closed) => {
                info!("bearer closed");
                Ok(())
            }
            other => {
                warn!("bearer close not confirmed: {:?}", other);
                Err(ModemError::GprsContext)
            }
        }
    }
}
