use super::Sim868;
use crate::error::{ModemError, Result};
use crate::io::{Clock, PowerControl, SerialChannel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const POWER_KEY_PULSE_MS: u32 = 2000;
const POWER_KEY_SETTLE_MS: u32 = 100;
const POWER_STATE_WAIT_MS: u64 = 1000;
const RESET_OFF_DWELL_MS: u32 = 2000;

const AUTOBAUD_WINDOW_MS: u32 = 2000;
const AUTOBAUD_ROUND_MS: u32 = 500;
const ECHO_OFF_SETTLE_MS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerState {
    Off,
    On,
}

/// Requested power transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerLevel {
    Off,
    On,
    /// Power down (when on), then power back up.
    Reset,
}

impl<S, P, C> Sim868<S, P, C>
where
    S: SerialChannel,
    P: PowerControl,
    C: Clock,
{
    /// Power readback straight from the status line.
    pub fn get_state(&mut self) -> PowerState {
        if self.power.is_powered() {
            PowerState::On
        } else {
            PowerState::Off
        }
    }

    /// Drive the modem to `level`. Requests matching the current state are
    /// no-ops. A modem that does not confirm the new state within a second is
    /// reported, never retried.
    pub fn set_power_level(&mut self, level: PowerLevel) -> Result<()> {
        let current = self.get_state();

        match (level, current) {
            (PowerLevel::On, PowerState::Off) => self.power_up(),
            (PowerLevel::Off, PowerState::On) => self.power_down(),
            (PowerLevel::On, PowerState::On) | (PowerLevel::Off, PowerState::Off) => Ok(()),
            (PowerLevel::Reset, PowerState::On) => {
                self.power_down()?;
                self.link.delay_ms(RESET_OFF_DWELL_MS);
                self.power_up()
            }
            (PowerLevel::Reset, PowerState::Off) => self.power_up(),
        }
    }

    fn power_up(&mut self) -> Result<()> {
        self.toggle_power_key();
        self.await_power_state(PowerState::On)?;
        info!("modem powered on");
        Ok(())
    }

    fn power_down(&mut self) -> Result<()> {
        self.toggle_power_key();
        self.await_power_state(PowerState::Off)?;
        info!("modem powered off");
        Ok(())
    }

    fn toggle_power_key(&mut self) {
        self.power.set_power_key(true);
        self.link.delay_ms(POWER_KEY_PULSE_MS);
        self.power.set_power_key(false);
        self.link.delay_ms(POWER_KEY_SETTLE_MS);
    }

    fn await_power_state(&mut self, wanted: PowerState) -> Result<()> {
        let deadline = self.link.clock().now_ms().saturating_add(POWER_STATE_WAIT_MS);

        loop {
            if self.get_state() == wanted {
                return Ok(());
            }
            if self.link.clock().now_ms() >= deadline {
                warn!("modem did not reach {:?}", wanted);
                return Err(ModemError::PowerState);
            }
            self.link.delay_ms(1);
        }
    }

    /// Autobaud handshake followed by disabling command echo.
    ///
    /// Each round flushes input and sends `AT`, first expecting `OK` then the
    /// echoed `AT`. The first match ends the rounds, which run until the
    /// autobaud window has elapsed on the clock, reply timeouts included.
    /// A window with no match is not itself an error: the echo-off check
    /// that follows decides the result.
    pub fn init(&mut self) -> Result<()> {
        info!("initializing modem");
        let timeout = self.timeouts.default_ms;

        let deadline = self
            .link
            .clock()
            .now_ms()
            .saturating_add(u64::from(AUTOBAUD_WINDOW_MS));
        while self.link.clock().now_ms() < deadline {
            self.link.flush_input();
            if self.link.send_check_reply("AT", "OK", timeout).is_ok() {
                break;
            }

            self.link.flush_input();
            if self.link.send_check_reply("AT", "AT", timeout).is_ok() {
                break;
            }

            debug!("no autobaud answer, retrying");
            self.link.delay_ms(AUTOBAUD_ROUND_MS);
        }

        // First ATE0 may still be echoed; only the second one is judged.
        let _ = self.link.send_check_reply("ATE0", "OK", timeout);
        self.link.delay_ms(ECHO_OFF_SETTLE_MS);

        self.link
            .send_check_reply("ATE0", "OK", timeout)
            .map_err(|_| ModemError::Autobaud)?;

        info!("modem autobaud OK");
        Ok(())
    }
}
