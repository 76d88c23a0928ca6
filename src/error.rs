use thiserror::Error;

/// Failure of one protocol step. Composite operations stop at the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ModemError {
    #[error("autobaud handshake failed, modem still echoing")]
    Autobaud,
    #[error("SIM card not inserted")]
    SimCardStatus,
    #[error("SIM card requires a PIN")]
    SimCardPin,
    #[error("signal strength outside usable window")]
    NetworkRssi,
    #[error("network registration failed")]
    NetworkRegistration,
    #[error("GPRS attach/detach failed")]
    GprsService,
    #[error("GPRS bearer context failed")]
    GprsContext,
    #[error("unexpected reply from modem")]
    Reply,
    #[error("HTTP service could not be initialized")]
    HttpService,
    #[error("HTTP request failed")]
    HttpRequest,
    #[error("HTTP server answered with status {0}")]
    HttpStatusCode(u16),
    #[error("JSON payload rejected by modem")]
    JsonStructure,
    #[error("no valid GNSS fix")]
    GnssFix,
    #[error("modem did not reach requested power state")]
    PowerState,
    #[error("{0} not configured")]
    NotConfigured(&'static str),
    #[error("value exceeds {limit} byte limit")]
    MessageTooLarge { limit: usize },
}

impl ModemError {
    /// Numeric code used by the module's legacy firmware logs. Additions
    /// without a legacy counterpart report 0.
    pub fn code(&self) -> u8 {
        match self {
            ModemError::Autobaud => 1,
            ModemError::SimCardStatus => 2,
            ModemError::SimCardPin => 3,
            ModemError::NetworkRssi => 4,
            ModemError::NetworkRegistration => 5,
            ModemError::GprsService => 6,
            ModemError::GprsContext => 7,
            ModemError::Reply => 8,
            ModemError::HttpService => 9,
            ModemError::HttpRequest => 10,
            ModemError::HttpStatusCode(_) => 11,
            ModemError::JsonStructure => 12,
            ModemError::GnssFix => 13,
            ModemError::PowerState => 14,
            ModemError::NotConfigured(_) | ModemError::MessageTooLarge { .. } => 0,
        }
    }
}

pub type Result<T> = core::result::Result<T, ModemError>;
