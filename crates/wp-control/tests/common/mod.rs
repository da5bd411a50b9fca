#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use wp_config::{CommandSpec, ConfigStore, ControlConfig, KEY_PORT};

pub const HOST: &str = "127.0.0.1";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);
pub const STOP_GRACE: Duration = Duration::from_millis(500);

/// Control settings with short timeouts and a private lock directory.
pub fn control_config(lock_dir: &Path) -> ControlConfig {
    ControlConfig {
        host: HOST.to_string(),
        request_timeout_ms: REQUEST_TIMEOUT.as_millis() as u64,
        stop_grace_ms: STOP_GRACE.as_millis() as u64,
        lock_dir: Some(lock_dir.to_string_lossy().into_owned()),
    }
}

/// Long-running stand-in renderer that writes its pid to `pid_file` and then
/// becomes `sleep`.
pub fn echo_loop(pid_file: &Path) -> CommandSpec {
    CommandSpec::new(
        "sh",
        [
            "-c",
            r#"echo $$ > "$0"; exec sleep 30"#,
            pid_file.to_str().unwrap(),
        ],
    )
}

pub fn echo_loop_json(pid_file: &Path) -> String {
    echo_loop(pid_file).to_json()
}

/// Alive and not a zombie.
pub fn is_alive(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.trim_start().chars().next())
            .is_some_and(|state| state != 'Z'),
        Err(_) => false,
    }
}

pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}

pub async fn read_pid(pid_file: &Path) -> u32 {
    let written = wait_until(Duration::from_secs(5), || {
        std::fs::read_to_string(pid_file).is_ok_and(|s| s.ends_with('\n'))
    })
    .await;
    assert!(written, "pid file {} never written", pid_file.display());

    std::fs::read_to_string(pid_file)
        .unwrap()
        .trim()
        .parse()
        .unwrap()
}

/// Port a supervisor has published, once it differs from `previous`.
pub async fn wait_for_port<S: ConfigStore>(store: &S, previous: Option<u16>) -> u16 {
    let read = || {
        store
            .get(KEY_PORT)
            .unwrap()
            .and_then(|raw| raw.parse::<u16>().ok())
    };

    let published = wait_until(Duration::from_secs(5), || {
        read().is_some_and(|port| Some(port) != previous)
    })
    .await;
    assert!(published, "port was never published");

    read().unwrap()
}

/// A port nothing listens on.
pub fn dead_port() -> u16 {
    let listener = std::net::TcpListener::bind((HOST, 0)).unwrap();
    listener.local_addr().unwrap().port()
}
