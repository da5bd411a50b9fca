use std::future::Future;

use log::{error, info};
use tokio::signal::unix::{Signal, SignalKind, signal};

/// Registers SIGINT, SIGTERM and SIGHUP handlers right away and returns a
/// future that resolves on the first of them.
///
/// Signals delivered before the future is first polled are not lost. A
/// signal that cannot be registered is logged and never fires; the others
/// still work. Must be called inside a tokio runtime.
pub fn shutdown_signal() -> impl Future<Output = ()> + Send + 'static {
    let interrupt = listen(SignalKind::interrupt(), "SIGINT");
    let terminate = listen(SignalKind::terminate(), "SIGTERM");
    let hangup = listen(SignalKind::hangup(), "SIGHUP");

    async move {
        tokio::select! {
            _ = recv(interrupt) => {}
            _ = recv(terminate) => {}
            _ = recv(hangup) => {}
        }
    }
}

fn listen(kind: SignalKind, name: &'static str) -> Option<(Signal, &'static str)> {
    match signal(kind) {
        Ok(stream) => Some((stream, name)),
        Err(e) => {
            error!("Failed to listen for {name}: {e}");
            None
        }
    }
}

async fn recv(listener: Option<(Signal, &'static str)>) {
    match listener {
        Some((mut stream, name)) => {
            stream.recv().await;
            info!("Received {name}, shutting down");
        }
        None => std::future::pending::<()>().await,
    }
}
