use crate::{
    ChildState, ControlError, ControlResult, Request, Response, read_message, write_message,
};

use std::panic::Location;
use std::time::Duration;

use error_location::ErrorLocation;
use log::debug;
use tokio::net::TcpStream;
use tokio::time::timeout;
use wp_config::{ConfigStore, ControlConfig, load_port};

/// Talks to a running control server. Each request uses a fresh connection.
#[derive(Debug, Clone)]
pub struct ControlClient {
    host: String,
    port: u16,
    timeout: Duration,
}

impl ControlClient {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// Client for the port recorded by the last `run-server`.
    pub fn from_store<S: ConfigStore + ?Sized>(
        store: &S,
        control: &ControlConfig,
    ) -> ControlResult<Self> {
        let port = load_port(store)?;
        Ok(Self::new(control.host.clone(), port, control.request_timeout()))
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn start(&self) -> ControlResult<()> {
        self.send(Request::Start).await.map(|_| ())
    }

    /// Returns once the server has torn the child group down.
    pub async fn stop(&self) -> ControlResult<()> {
        self.send(Request::Stop).await.map(|_| ())
    }

    pub async fn status(&self) -> ControlResult<ChildState> {
        match self.send(Request::Status).await? {
            Some(detail) => detail.parse(),
            None => Err(ControlError::protocol("status reply carried no state")),
        }
    }

    /// Send one request and return the detail of an `ok` reply.
    pub async fn send(&self, request: Request) -> ControlResult<Option<String>> {
        debug!("Sending '{request}' to {}:{}", self.host, self.port);

        let line = match timeout(self.timeout, self.exchange(request)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(ControlError::Timeout {
                    port: self.port,
                    timeout_ms: self.timeout.as_millis(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        let Some(line) = line else {
            return Err(ControlError::protocol(
                "connection closed without a response",
            ));
        };

        match Response::parse(&line)? {
            Response::Ok(detail) => Ok(detail),
            Response::Err(message) => Err(ControlError::remote(message)),
        }
    }

    async fn exchange(&self, request: Request) -> ControlResult<Option<String>> {
        let mut stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::ConnectionRefused => ControlError::ConnectionRefused {
                    port: self.port,
                    location: ErrorLocation::from(Location::caller()),
                },
                _ => ControlError::from(e),
            })?;

        write_message(&mut stream, &request.encode()).await?;
        read_message(&mut stream).await
    }
}
