use std::fs;

use a3em_config::{
    read_config, write_config, ConfigError, DeploymentWindow, LocalDateTime, Schedule,
    StorageError, CONFIG_FILE_NAME,
};
use chrono::NaiveDate;
use chrono_tz::Europe::Berlin;
use tempfile::tempdir;

fn berlin_week() -> Schedule {
    let mut schedule = Schedule::new(Berlin, NaiveDate::from_ymd_opt(2024, 4, 1).expect("date"));
    schedule.settings.label = "POND".to_string();
    schedule.set_deployment(DeploymentWindow::new(
        LocalDateTime::parse("2024-04-01", "08:00", "Europe/Berlin").expect("start"),
        LocalDateTime::parse("2024-04-08", "08:00", "Europe/Berlin").expect("end"),
    ));
    schedule
}

#[test]
fn write_then_read_restores_schedule() {
    let dir = tempdir().expect("temp dir");
    let schedule = berlin_week();

    let path = write_config(dir.path(), &schedule).expect("write");
    assert_eq!(path, dir.path().join(CONFIG_FILE_NAME));

    let restored = read_config(dir.path()).expect("read");
    assert_eq!(restored, schedule);

    let entries: Vec<_> = fs::read_dir(dir.path())
        .expect("list dir")
        .map(|entry| entry.expect("entry").file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from(CONFIG_FILE_NAME)]);
}

#[test]
fn write_replaces_existing_file() {
    let dir = tempdir().expect("temp dir");
    fs::write(dir.path().join(CONFIG_FILE_NAME), "DEVICE_LABEL = \"OLD\"\n").expect("seed");

    write_config(dir.path(), &berlin_week()).expect("write");
    let text = fs::read_to_string(dir.path().join(CONFIG_FILE_NAME)).expect("read back");
    assert!(text.starts_with("DEVICE_LABEL = \"POND\"\nDEVICE_TIMEZONE = \"Europe/Berlin\"\n"));
}

#[test]
fn invalid_schedule_is_not_written() {
    let dir = tempdir().expect("temp dir");
    let mut schedule = berlin_week();
    schedule.set_deployment_end(schedule.deployment().start);

    let err = write_config(dir.path(), &schedule).expect_err("invalid schedule");
    assert!(matches!(err, ConfigError::Validation(_)));
    assert!(fs::read_dir(dir.path()).expect("list dir").next().is_none());
}

#[test]
fn missing_file_is_a_storage_error() {
    let dir = tempdir().expect("temp dir");
    let err = read_config(dir.path()).expect_err("no config file");
    assert!(matches!(err, ConfigError::Storage(StorageError::Read { .. })));
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = tempdir().expect("temp dir");
    fs::write(dir.path().join(CONFIG_FILE_NAME), "garbage\n").expect("seed");
    let err = read_config(dir.path()).expect_err("malformed");
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn unwritable_directory_is_a_storage_error() {
    let dir = tempdir().expect("temp dir");
    let missing = dir.path().join("missing");
    let err = write_config(&missing, &berlin_week()).expect_err("missing dir");
    assert!(matches!(err, ConfigError::Storage(StorageError::Write { .. })));
}
