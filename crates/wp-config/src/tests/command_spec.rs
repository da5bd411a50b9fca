use crate::{CommandSpec, ConfigError};

use googletest::assert_that;
use googletest::prelude::{contains_substring, eq, err, pat};

#[test]
fn given_json_array_when_from_json_then_program_and_args_split() {
    let spec = CommandSpec::from_json("command", r#"["mpv", "--loop", "a b.mp4"]"#).unwrap();

    assert_that!(spec.program(), eq("mpv"));
    assert_eq!(spec.args(), ["--loop".to_string(), "a b.mp4".to_string()]);
}

#[test]
fn given_single_program_when_from_json_then_no_args() {
    let spec = CommandSpec::from_json("command", r#"["echo-loop"]"#).unwrap();

    assert_that!(spec.program(), eq("echo-loop"));
    assert!(spec.args().is_empty());
}

#[test]
fn given_empty_array_when_from_json_then_invalid() {
    let result = CommandSpec::from_json("command", "[]");

    assert_that!(
        result,
        err(pat!(ConfigError::Invalid {
            key: eq("command"),
            message: contains_substring("must not be empty"),
            ..
        }))
    );
}

#[test]
fn given_blank_program_when_from_json_then_invalid() {
    let result = CommandSpec::from_json("command", r#"["  ", "x"]"#);

    assert_that!(
        result,
        err(pat!(ConfigError::Invalid {
            message: contains_substring("blank"),
            ..
        }))
    );
}

#[test]
fn given_shell_string_when_from_json_then_invalid() {
    let result = CommandSpec::from_json("command", "mpv --loop video.mp4");

    assert_that!(
        result,
        err(pat!(ConfigError::Invalid {
            message: contains_substring("JSON string array"),
            ..
        }))
    );
}

#[test]
fn given_spec_when_to_json_then_parses_back_to_same_spec() {
    let spec = CommandSpec::new("xwinwrap", ["-fs", "--", "mpv"]);

    let reparsed = CommandSpec::from_json("command", &spec.to_json()).unwrap();

    assert_that!(reparsed, eq(&spec));
    assert_that!(spec.to_string(), eq("xwinwrap -fs -- mpv"));
}
