//! Control server and client talking over a real loopback socket.

#![cfg(target_os = "linux")]

mod common;

use common::{HOST, REQUEST_TIMEOUT, STOP_GRACE, dead_port, echo_loop, is_alive, read_pid};

use std::time::Duration;

use googletest::assert_that;
use googletest::prelude::{contains_substring, eq, err, pat};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use wp_config::CommandSpec;
use wp_control::{
    ChildProcess, ChildState, ControlClient, ControlError, ControlServer, read_message,
};

async fn bind(command: CommandSpec) -> ControlServer {
    let child = ChildProcess::new(command, STOP_GRACE);
    ControlServer::bind(HOST, child, REQUEST_TIMEOUT)
        .await
        .unwrap()
}

fn client(port: u16) -> ControlClient {
    ControlClient::new(HOST, port, REQUEST_TIMEOUT)
}

// =========================================================================
// Binding
// =========================================================================

#[tokio::test]
async fn given_server_when_bound_then_port_is_ephemeral_and_reachable() {
    let temp = TempDir::new().unwrap();
    let server = bind(echo_loop(&temp.path().join("child.pid"))).await;
    let port = server.port();
    let serving = tokio::spawn(server.serve_until(std::future::pending()));

    assert!(port > 0);
    assert_that!(client(port).status().await.unwrap(), eq(ChildState::NotStarted));

    client(port).stop().await.unwrap();
    serving.await.unwrap().unwrap();
}

#[tokio::test]
async fn given_foreign_address_when_bind_then_bind_error() {
    let child = ChildProcess::new(
        CommandSpec::new("true", std::iter::empty::<String>()),
        STOP_GRACE,
    );

    // TEST-NET-1, never assigned to a local interface.
    let result = ControlServer::bind("192.0.2.1", child, REQUEST_TIMEOUT).await;

    assert!(matches!(result, Err(ControlError::Bind { .. })));
}

// =========================================================================
// Start / Stop
// =========================================================================

#[tokio::test]
async fn given_start_then_stop_when_sent_in_order_then_child_launched_then_terminated() {
    // Given
    let temp = TempDir::new().unwrap();
    let pid_file = temp.path().join("child.pid");
    let server = bind(echo_loop(&pid_file)).await;
    let port = server.port();
    let serving = tokio::spawn(server.serve_until(std::future::pending()));

    // When
    client(port).start().await.unwrap();
    let pid = read_pid(&pid_file).await;
    assert!(is_alive(pid));
    assert_that!(client(port).status().await.unwrap(), eq(ChildState::Running));
    client(port).stop().await.unwrap();

    // Then
    assert!(!is_alive(pid));
    serving.await.unwrap().unwrap();
}

#[tokio::test]
async fn given_running_child_when_start_again_then_same_process() {
    let temp = TempDir::new().unwrap();
    let pid_file = temp.path().join("child.pid");
    let server = bind(echo_loop(&pid_file)).await;
    let port = server.port();
    let serving = tokio::spawn(server.serve_until(std::future::pending()));

    client(port).start().await.unwrap();
    let first = read_pid(&pid_file).await;
    client(port).start().await.unwrap();
    let second = read_pid(&pid_file).await;

    assert_eq!(first, second);
    client(port).stop().await.unwrap();
    serving.await.unwrap().unwrap();
}

#[tokio::test]
async fn given_never_started_when_stop_then_ok_and_server_exits() {
    let temp = TempDir::new().unwrap();
    let server = bind(echo_loop(&temp.path().join("child.pid"))).await;
    let port = server.port();
    let serving = tokio::spawn(server.serve_until(std::future::pending()));

    client(port).stop().await.unwrap();
    serving.await.unwrap().unwrap();

    let after = client(port).start().await;
    assert!(matches!(after, Err(ControlError::ConnectionRefused { .. })));
}

#[tokio::test]
async fn given_missing_executable_when_start_then_remote_error_and_server_survives() {
    // Given
    let server = bind(CommandSpec::new(
        "/nonexistent/wp-renderer",
        std::iter::empty::<String>(),
    ))
    .await;
    let port = server.port();
    let serving = tokio::spawn(server.serve_until(std::future::pending()));

    // When
    let result = client(port).start().await;

    // Then
    assert_that!(
        result,
        err(pat!(ControlError::Remote {
            message: contains_substring("failed to launch '/nonexistent/wp-renderer'"),
            ..
        }))
    );
    assert_that!(client(port).status().await.unwrap(), eq(ChildState::NotStarted));
    client(port).stop().await.unwrap();
    serving.await.unwrap().unwrap();
}

// =========================================================================
// Protocol Robustness
// =========================================================================

#[tokio::test]
async fn given_unknown_verb_when_sent_then_err_reply_and_server_keeps_serving() {
    let temp = TempDir::new().unwrap();
    let server = bind(echo_loop(&temp.path().join("child.pid"))).await;
    let port = server.port();
    let serving = tokio::spawn(server.serve_until(std::future::pending()));

    let mut stream = TcpStream::connect((HOST, port)).await.unwrap();
    stream.write_all(b"restart\n").await.unwrap();
    let reply = read_message(&mut stream).await.unwrap();

    assert_eq!(reply.as_deref(), Some("err unknown request: restart\n"));
    assert_that!(client(port).status().await.unwrap(), eq(ChildState::NotStarted));
    client(port).stop().await.unwrap();
    serving.await.unwrap().unwrap();
}

#[tokio::test]
async fn given_silent_connection_when_request_timeout_then_server_moves_on() {
    let temp = TempDir::new().unwrap();
    let child = ChildProcess::new(echo_loop(&temp.path().join("child.pid")), STOP_GRACE);
    let server = ControlServer::bind(HOST, child, Duration::from_millis(200))
        .await
        .unwrap();
    let port = server.port();
    let serving = tokio::spawn(server.serve_until(std::future::pending()));

    let _idle = TcpStream::connect((HOST, port)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_that!(client(port).status().await.unwrap(), eq(ChildState::NotStarted));
    client(port).stop().await.unwrap();
    serving.await.unwrap().unwrap();
}

// =========================================================================
// Client Failures
// =========================================================================

#[tokio::test]
async fn given_nothing_listening_when_start_then_connection_refused() {
    let port = dead_port();

    let result = client(port).start().await;

    assert_that!(
        result,
        err(pat!(ControlError::ConnectionRefused {
            port: eq(&port),
            ..
        }))
    );
}

#[tokio::test]
async fn given_listener_that_never_replies_when_send_then_timeout() {
    let listener = tokio::net::TcpListener::bind((HOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let client = ControlClient::new(HOST, port, Duration::from_millis(200));

    let result = client.stop().await;

    assert_that!(
        result,
        err(pat!(ControlError::Timeout {
            port: eq(&port),
            ..
        }))
    );
    drop(listener);
}

#[tokio::test]
async fn given_peer_speaking_another_protocol_when_send_then_protocol_error() {
    let listener = tokio::net::TcpListener::bind((HOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let peer = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_message(&mut stream).await.unwrap();
        stream.write_all(b"SSH-2.0-OpenSSH_9.6\r\n").await.unwrap();
    });

    let result = client(port).start().await;

    assert!(matches!(result, Err(ControlError::Protocol { .. })));
    peer.await.unwrap();
}

// =========================================================================
// Shutdown
// =========================================================================

#[tokio::test]
async fn given_running_child_when_shutdown_resolves_then_child_group_killed() {
    // Given
    let temp = TempDir::new().unwrap();
    let pid_file = temp.path().join("child.pid");
    let mut server = bind(echo_loop(&pid_file)).await;
    server.start_child().await.unwrap();
    let pid = read_pid(&pid_file).await;
    let (trigger, shutdown) = oneshot::channel::<()>();
    let serving = tokio::spawn(server.serve_until(async {
        shutdown.await.ok();
    }));

    // When
    trigger.send(()).unwrap();
    serving.await.unwrap().unwrap();

    // Then
    assert!(!is_alive(pid));
}
