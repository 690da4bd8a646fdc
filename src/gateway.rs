use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tracing::debug;

use crate::logger::{MessageLogMode, MessageLogger};
use crate::protocol::{DEFAULT_SENDER_ID, control_message, parse_state_response};
use crate::Result;
use crate::types::{ControlRequest, DeviceSnapshot};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The device-control boundary. One implementation talks to the vendor LAN
/// bridge; tests substitute recording doubles.
pub trait DeviceGateway: Send + Sync + 'static {
    /// Poll actual device state.
    fn get_state(&self) -> impl Future<Output = Result<DeviceSnapshot>> + Send;

    /// Send one control command. A single attempt; callers do not retry.
    fn set_state(&self, request: ControlRequest) -> impl Future<Output = Result<()>> + Send;
}

pub struct HttpGatewayBuilder {
    ip: String,
    device_id: String,
    protocol: String,
    sender_id: Option<String>,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
}

impl HttpGatewayBuilder {
    pub fn new(ip: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            device_id: device_id.into(),
            protocol: "https".to_string(),
            sender_id: None,
            log_mode: None,
            log_path: None,
        }
    }

    pub fn protocol(mut self, proto: &str) -> Self {
        self.protocol = proto.to_string();
        self
    }

    pub fn sender_id(mut self, id: impl Into<String>) -> Self {
        self.sender_id = Some(id.into());
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    pub fn build(self) -> HttpGateway {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => Some(Mutex::new(
                MessageLogger::new(mode, &path).expect("failed to open log file"),
            )),
            _ => None,
        };

        HttpGateway {
            http,
            base_url: format!("{}://{}", self.protocol, self.ip),
            device_id: self.device_id,
            sender_id: self.sender_id.unwrap_or_else(|| DEFAULT_SENDER_ID.to_string()),
            logger,
        }
    }
}

/// Adapter for the vendor LAN bridge: state polls via GET, control commands
/// via POSTed JSON envelopes. Requests carry a bounded timeout; expiry
/// surfaces as `Error::Timeout`.
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    device_id: String,
    sender_id: String,
    logger: Option<Mutex<MessageLogger>>,
}

impl HttpGateway {
    pub fn builder(ip: impl Into<String>, device_id: impl Into<String>) -> HttpGatewayBuilder {
        HttpGatewayBuilder::new(ip, device_id)
    }
}

impl DeviceGateway for HttpGateway {
    fn get_state(&self) -> impl Future<Output = Result<DeviceSnapshot>> + Send {
        async move {
            let url = format!("{}/Devices/{}/State", self.base_url, self.device_id);
            debug!(url = %url, "querying device state");

            let body = self
                .http
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;
            let snapshot = parse_state_response(&body)?;

            if let Some(ref logger) = self.logger {
                logger
                    .lock()
                    .expect("log mutex poisoned")
                    .log_state_poll(&snapshot);
            }

            Ok(snapshot)
        }
    }

    fn set_state(&self, request: ControlRequest) -> impl Future<Output = Result<()>> + Send {
        async move {
            let url = format!("{}/Devices/{}/Control", self.base_url, self.device_id);
            debug!(url = %url, power_on = request.power_on, mode = %request.mode, "sending control command");

            if let Some(ref logger) = self.logger {
                logger
                    .lock()
                    .expect("log mutex poisoned")
                    .log_control(&request);
            }

            let msg = control_message(&self.sender_id, &self.device_id, &request);
            self.http
                .post(&url)
                .json(&msg)
                .send()
                .await?
                .error_for_status()?;
            Ok(())
        }
    }
}
