//! The control server: one listener, one renderer, one request per connection.

use crate::{
    ChildProcess, ControlError, ControlResult, Request, Response, read_message, shutdown_signal,
    write_message,
};

use std::future::Future;
use std::panic::Location;
use std::time::Duration;

use error_location::ErrorLocation;
use log::{debug, error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Shutdown,
}

pub struct ControlServer {
    listener: TcpListener,
    port: u16,
    child: ChildProcess,
    request_timeout: Duration,
}

impl ControlServer {
    /// Bind an ephemeral port on `host`. The child is not started.
    pub async fn bind(
        host: &str,
        child: ChildProcess,
        request_timeout: Duration,
    ) -> ControlResult<Self> {
        let bind_error = |source: std::io::Error| ControlError::Bind {
            host: host.to_string(),
            source,
            location: ErrorLocation::from(Location::caller()),
        };

        let listener = TcpListener::bind((host, 0)).await.map_err(bind_error)?;
        let port = listener.local_addr().map_err(bind_error)?.port();

        info!("Control server listening on {host}:{port}");

        Ok(Self {
            listener,
            port,
            child,
            request_timeout,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn start_child(&mut self) -> ControlResult<()> {
        self.child.start().await
    }

    /// Serve until a `stop` request or a termination signal.
    pub async fn serve(self) -> ControlResult<()> {
        self.serve_until(shutdown_signal()).await
    }

    /// Serve until a `stop` request or until `shutdown` resolves. Either way
    /// the child group is gone when this returns.
    pub async fn serve_until<F>(mut self, shutdown: F) -> ControlResult<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down control server on port {}", self.port);
                    return self.child.stop().await;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!("Control connection from {peer}");
                        if self.handle_connection(stream).await == Flow::Shutdown {
                            info!("Control server on port {} stopped", self.port);
                            return Ok(());
                        }
                    }
                    Err(e) => {
                        warn!("Failed to accept control connection: {e}");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                }
            }
        }
    }

    async fn handle_connection(&mut self, mut stream: TcpStream) -> Flow {
        let line = match timeout(self.request_timeout, read_message(&mut stream)).await {
            Ok(Ok(Some(line))) => line,
            Ok(Ok(None)) => {
                debug!("Control connection closed without a request");
                return Flow::Continue;
            }
            Ok(Err(e)) => {
                warn!("Unreadable control request: {e}");
                return Flow::Continue;
            }
            Err(_) => {
                warn!(
                    "No control request within {}ms, dropping connection",
                    self.request_timeout.as_millis()
                );
                return Flow::Continue;
            }
        };

        let (response, flow) = match line.parse::<Request>() {
            Ok(request) => self.dispatch(request).await,
            Err(_) => {
                let verb = line.trim();
                warn!("Unknown control request: {verb:?}");
                (
                    Response::error(format!("unknown request: {verb}")),
                    Flow::Continue,
                )
            }
        };

        match timeout(
            self.request_timeout,
            write_message(&mut stream, &response.encode()),
        )
        .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Failed to send control response: {e}"),
            Err(_) => warn!("Timed out sending control response"),
        }

        flow
    }

    async fn dispatch(&mut self, request: Request) -> (Response, Flow) {
        info!("Control request: {request}");

        match request {
            Request::Start => match self.child.start().await {
                Ok(()) => (Response::ok(), Flow::Continue),
                Err(e) => {
                    error!("Failed to start wallpaper process: {e}");
                    (Response::error(Self::describe(&e)), Flow::Continue)
                }
            },
            // The server exits after a stop whatever its outcome.
            Request::Stop => match self.child.stop().await {
                Ok(()) => (Response::ok(), Flow::Shutdown),
                Err(e) => {
                    error!("Failed to stop wallpaper process: {e}");
                    (Response::error(Self::describe(&e)), Flow::Shutdown)
                }
            },
            Request::Status => (
                Response::ok_with(self.child.state().as_str()),
                Flow::Continue,
            ),
        }
    }

    /// Error text for the wire, without source locations.
    fn describe(e: &ControlError) -> String {
        match e {
            ControlError::Launch {
                program, source, ..
            } => format!("failed to launch '{program}': {source}"),
            ControlError::Signal { pgid, source, .. } => {
                format!("failed to signal process group {pgid}: {source}")
            }
            ControlError::Io { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }
}
