use crate::{ControlError, InstanceLock};

use googletest::assert_that;
use googletest::prelude::{eq, err, pat};
use tempfile::TempDir;

const NAME: &str = "live-wallpaper-server";

#[test]
fn given_free_lock_when_acquire_then_file_records_holder() {
    let temp = TempDir::new().unwrap();

    let lock = InstanceLock::acquire(temp.path(), NAME).unwrap();

    assert_eq!(lock.path(), temp.path().join("live-wallpaper-server.lock"));
    assert_eq!(
        InstanceLock::holder_pid(lock.path()),
        Some(std::process::id())
    );
}

#[test]
fn given_held_lock_when_acquire_again_then_already_running() {
    let temp = TempDir::new().unwrap();
    let _held = InstanceLock::acquire(temp.path(), NAME).unwrap();

    let result = InstanceLock::acquire(temp.path(), NAME);

    assert_that!(
        result,
        err(pat!(ControlError::AlreadyRunning {
            name: eq(NAME),
            ..
        }))
    );
}

#[test]
fn given_held_lock_when_try_acquire_then_none() {
    let temp = TempDir::new().unwrap();
    let _held = InstanceLock::acquire(temp.path(), NAME).unwrap();

    let second = InstanceLock::try_acquire(temp.path(), NAME).unwrap();

    assert!(second.is_none());
}

#[test]
fn given_failed_attempt_when_holder_pid_then_record_intact() {
    let temp = TempDir::new().unwrap();
    let held = InstanceLock::acquire(temp.path(), NAME).unwrap();

    let _ = InstanceLock::acquire(temp.path(), NAME);

    assert_eq!(
        InstanceLock::holder_pid(held.path()),
        Some(std::process::id())
    );
}

#[test]
fn given_released_lock_when_acquire_then_succeeds_and_file_kept() {
    let temp = TempDir::new().unwrap();
    let mut first = InstanceLock::acquire(temp.path(), NAME).unwrap();
    first.release();
    assert!(first.path().exists());

    let second = InstanceLock::try_acquire(temp.path(), NAME).unwrap();

    assert!(second.is_some());
}

#[test]
fn given_dropped_lock_when_acquire_then_succeeds() {
    let temp = TempDir::new().unwrap();
    drop(InstanceLock::acquire(temp.path(), NAME).unwrap());

    assert!(InstanceLock::acquire(temp.path(), NAME).is_ok());
}

#[test]
fn given_different_names_when_acquire_both_then_independent() {
    let temp = TempDir::new().unwrap();
    let _live = InstanceLock::acquire(temp.path(), NAME).unwrap();

    let dynamic = InstanceLock::acquire(temp.path(), "dynamic-wallpaper-server");

    assert!(dynamic.is_ok());
}

#[test]
fn given_missing_lock_dir_when_acquire_then_created() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("run").join("wp");

    let lock = InstanceLock::acquire(&dir, NAME).unwrap();

    assert!(lock.path().starts_with(&dir));
}

#[test]
fn given_garbage_lock_file_when_holder_pid_then_none() {
    let temp = TempDir::new().unwrap();
    let path = InstanceLock::lock_path(temp.path(), NAME);
    std::fs::write(&path, "not json").unwrap();

    assert!(InstanceLock::holder_pid(&path).is_none());
}
