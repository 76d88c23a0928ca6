use super::Sim868;
use crate::error::{ModemError, Result};
use crate::io::{Clock, PowerControl, SerialChannel};
use crate::protocol::reply_text;
use tracing::{info, warn};

impl<S, P, C> Sim868<S, P, C>
where
    S: SerialChannel,
    P: PowerControl,
    C: Clock,
{
    /// Card-detect mode on, card inserted, no PIN pending. Stops at the
    /// first failing step.
    pub fn sim_card_init(&mut self) -> Result<()> {
        self.sim_card_enable()?;
        self.sim_card_status()?;
        self.sim_card_pin()?;

        info!("SIM card ready");
        Ok(())
    }

    /// [`Self::sim_card_init`] repeated up to `max_attempts` times. Returns
    /// the error of the last attempt when the budget runs out.
    pub fn sim_card_init_retrying(&mut self, max_attempts: u8) -> Result<()> {
        let mut last = Err(ModemError::SimCardStatus);

        for attempt in 1..=max_attempts {
            last = self.sim_card_init();
            match last {
                Ok(()) => return Ok(()),
                Err(e) => warn!("SIM init attempt {}/{} failed: {}", attempt, max_attempts, e),
            }
        }

        last
    }

    fn sim_card_enable(&mut self) -> Result<()> {
        let timeout = self.timeouts.default_ms;
        let mode = self.link.send_parse_reply("AT+CSDT?", "+CSDT: ", ',', 0, timeout)?;

        if mode != 1 {
            self.link.send_check_reply("AT+CSDT=1", "OK", timeout)?;
        }

        Ok(())
    }

    fn sim_card_status(&mut self) -> Result<()> {
        let timeout = self.timeouts.default_ms;
        let inserted = self
            .link
            .send_parse_reply("AT+CSMINS?", "+CSMINS: ", ',', 1, timeout)?;

        if inserted != 1 {
            return Err(ModemError::SimCardStatus);
        }

        Ok(())
    }

    fn sim_card_pin(&mut self) -> Result<()> {
        self.link.get_reply("AT+CPIN?", self.timeouts.pin_query_ms);

        let state = reply_text(self.link.reply(), "+CPIN: ")?;
        if state != "READY" {
            warn!("SIM card PIN state: {}", state);
            return Err(ModemError::SimCardPin);
        }

        Ok(())
    }
}
