use crate::ControlError;

use std::panic::Location;
use std::path::PathBuf;

use error_location::ErrorLocation;
use googletest::assert_that;
use googletest::prelude::{contains_substring, eq};

fn already_running() -> ControlError {
    ControlError::AlreadyRunning {
        name: "live-wallpaper-server".into(),
        path: PathBuf::from("/run/user/1000/live-wallpaper-server.lock"),
        location: ErrorLocation::from(Location::caller()),
    }
}

fn refused() -> ControlError {
    ControlError::ConnectionRefused {
        port: 54321,
        location: ErrorLocation::from(Location::caller()),
    }
}

#[test]
fn given_already_running_when_is_benign_then_true() {
    assert_that!(already_running().is_benign(), eq(true));
}

#[test]
fn given_failures_when_is_benign_then_false() {
    assert_that!(refused().is_benign(), eq(false));
    assert_that!(ControlError::protocol("garbage").is_benign(), eq(false));
    assert_that!(ControlError::remote("nope").is_benign(), eq(false));
}

#[test]
fn given_already_running_when_display_then_informational_message() {
    assert_that!(
        already_running().to_string(),
        contains_substring("A 'live-wallpaper-server' server instance is already running")
    );
}

#[test]
fn given_connection_refused_when_recovery_hint_then_says_not_running() {
    assert_that!(refused().recovery_hint(), contains_substring("not running"));
    assert_that!(refused().to_string(), contains_substring("54321"));
}

#[test]
fn given_config_error_when_converted_then_hint_mentions_init() {
    let error = ControlError::from(wp_config::ConfigError::missing("port"));

    assert_that!(error.recovery_hint(), contains_substring("init"));
}

#[test]
fn given_io_error_when_converted_then_io_variant() {
    let error = ControlError::from(std::io::Error::other("boom"));

    assert!(matches!(error, ControlError::Io { .. }));
}
