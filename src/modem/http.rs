use super::Sim868;
use crate::error::{ModemError, Result};
use crate::io::{Clock, PowerControl, SerialChannel};
use crate::protocol::{
    LineMode, CONTENT_BUFFER_LENGTH, JSON_BUFFER_LENGTH, UA_BUFFER_LENGTH, UD_BUFFER_LENGTH,
    URL_BUFFER_LENGTH,
};
use arrayvec::ArrayString;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const HTTP_OK: u16 = 200;
const HTTP_CREATED: u16 = 201;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Method code of `AT+HTTPACTION`.
    pub fn code(self) -> u8 {
        match self {
            HttpMethod::Get => 0,
            HttpMethod::Post => 1,
        }
    }
}

/// Request parameters. The URL is `root` followed by `web_service`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpHeader {
    pub root: ArrayString<URL_BUFFER_LENGTH>,
    pub web_service: ArrayString<URL_BUFFER_LENGTH>,
    pub user_agent: ArrayString<UA_BUFFER_LENGTH>,
    pub user_data: ArrayString<UD_BUFFER_LENGTH>,
    pub content_type: ArrayString<CONTENT_BUFFER_LENGTH>,
    pub json_payload: ArrayString<JSON_BUFFER_LENGTH>,
}

fn bounded<const N: usize>(value: &str) -> Result<ArrayString<N>> {
    ArrayString::from(value).map_err(|_| ModemError::MessageTooLarge { limit: N })
}

impl<S, P, C> Sim868<S, P, C>
where
    S: SerialChannel,
    P: PowerControl,
    C: Clock,
{
    pub fn http_set_root(&mut self, root: &str) -> Result<()> {
        self.http_header.root = bounded(root)?;
        Ok(())
    }

    pub fn http_set_web_service(&mut self, web_service: &str) -> Result<()> {
        self.http_header.web_service = bounded(web_service)?;
        Ok(())
    }

    pub fn http_set_user_agent(&mut self, user_agent: &str) -> Result<()> {
        self.http_header.user_agent = bounded(user_agent)?;
        Ok(())
    }

    pub fn http_set_user_data(&mut self, user_data: &str) -> Result<()> {
        self.http_header.user_data = bounded(user_data)?;
        Ok(())
    }

    pub fn http_set_content_type(&mut self, content_type: &str) -> Result<()> {
        self.http_header.content_type = bounded(content_type)?;
        Ok(())
    }

    pub fn http_set_json_payload(&mut self, json: &str) -> Result<()> {
        self.http_header.json_payload = bounded(json)?;
        Ok(())
    }

    pub fn http_header(&self) -> &HttpHeader {
        &self.http_header
    }

    /// Server payload captured by the last successful read.
    pub fn http_response(&self) -> &str {
        &self.http_buffer
    }

    /// Status code of the last completed `AT+HTTPACTION`.
    pub fn last_http_status(&self) -> Option<u16> {
        self.last_http_status
    }

    /// Run a full request: the init phase and the action phase each get up
    /// to `max_attempts` tries. An init phase that never succeeds fails with
    /// [`ModemError::HttpService`] before any action is sent; an action phase
    /// that never succeeds fails with [`ModemError::HttpRequest`] and leaves
    /// the last status code in [`Self::last_http_status`].
    pub fn http_send_request(&mut self, method: HttpMethod, max_attempts: u8) -> Result<()> {
        let mut initialized = false;
        for attempt in 1..=max_attempts {
            match self.http_init() {
                Ok(()) => {
                    initialized = true;
                    break;
                }
                Err(e) => warn!("HTTP init attempt {}/{} failed: {}", attempt, max_attempts, e),
            }
        }
        if !initialized {
            return Err(ModemError::HttpService);
        }

        for attempt in 1..=max_attempts {
            // The previous session was terminated; the service needs a fresh init.
            if attempt > 1 {
                if let Err(e) = self.http_init() {
                    warn!("HTTP re-init before attempt {} failed: {}", attempt, e);
                    continue;
                }
            }

            match self.http_session(method) {
                Ok(()) => return Ok(()),
                Err(e) => warn!("HTTP attempt {}/{} failed: {}", attempt, max_attempts, e),
            }
        }

        Err(ModemError::HttpRequest)
    }

    /// Terminate any pending session, start the service and set every
    /// header parameter.
    pub fn http_init(&mut self) -> Result<()> {
        let header = self.http_header;
        if header.root.is_empty() {
            return Err(ModemError::NotConfigured("HTTP root"));
        }
        if header.root.len() + header.web_service.len() > URL_BUFFER_LENGTH {
            return Err(ModemError::MessageTooLarge {
                limit: URL_BUFFER_LENGTH,
            });
        }

        let timeout = self.timeouts.default_ms;

        let _ = self.link.send_check_reply("AT+HTTPTERM", "OK", timeout);

        self.link
            .send_check_reply("AT+HTTPINIT", "OK", timeout)
            .map_err(|_| ModemError::HttpService)?;

        let parameters = [
            "AT+HTTPPARA=\"CID\",1".to_string(),
            format!("AT+HTTPPARA=\"UA\",\"{}\"", header.user_agent),
            format!("AT+HTTPPARA=\"CONTENT\",\"{}\"", header.content_type),
            format!("AT+HTTPPARA=\"USERDATA\",\"{}\"", header.user_data),
            format!(
                "AT+HTTPPARA=\"URL\",\"{}{}\"",
                header.root, header.web_service
            ),
        ];
        for parameter in &parameters {
            self.link.send_check_reply(parameter, "OK", timeout)?;
        }

        Ok(())
    }

    /// Action, read and terminate. Termination is attempted even when an
    /// earlier step failed; the first error wins.
    pub fn http_session(&mut self, method: HttpMethod) -> Result<()> {
        let exchange = self
            .http_action(method)
            .and_then(|()| self.http_read_all());
        let teardown = self.http_terminate();

        exchange.and(teardown)?;

        info!("HTTP request done");
        Ok(())
    }

    /// Send the request (uploading the JSON payload first for POST) and
    /// check the status the modem reports back.
    pub fn http_action(&mut self, method: HttpMethod) -> Result<()> {
        let timeouts = self.timeouts;

        if method == HttpMethod::Post {
            let payload = self.http_header.json_payload;
            if payload.is_empty() {
                return Err(ModemError::JsonStructure);
            }

            let declare = format!(
                "AT+HTTPDATA={},{}",
                payload.len(),
                timeouts.http_upload_window_ms
            );
            self.link
                .send_check_reply(&declare, "DOWNLOAD", timeouts.default_ms)?;

            self.link
                .send_check_reply(&payload, "OK", timeouts.json_upload_ms)
                .map_err(|_| ModemError::JsonStructure)?;
        }

        let action = format!("AT+HTTPACTION={}", method.code());
        self.link
            .send_check_reply(&action, "OK", timeouts.http_action_ms)
            .map_err(|_| ModemError::HttpRequest)?;

        self.link.read_line(timeouts.http_action_ms, LineMode::Single);
        let status = self.link.parse_reply("+HTTPACTION: ", ',', 1)?;

        info!("HTTP status code {}", status);
        self.last_http_status = Some(status);

        match status {
            HTTP_OK | HTTP_CREATED => Ok(()),
            code => Err(ModemError::HttpStatusCode(code)),
        }
    }

    /// Fetch the server payload into the HTTP buffer.
    pub fn http_read_all(&mut self) -> Result<()> {
        self.link.get_reply("AT+HTTPREAD", self.timeouts.default_ms);
        if !self.link.reply().contains("+HTTPREAD: ") {
            return Err(ModemError::Reply);
        }

        self.link.read_line(self.timeouts.http_read_ms, LineMode::Single);

        // Both buffers share one capacity.
        self.http_buffer = *self.link.reply_buffer();

        Ok(())
    }

    pub fn http_terminate(&mut self) -> Result<()> {
        self.link
            .send_check_reply("AT+HTTPTERM", "OK", self.timeouts.default_ms)
    }
}
