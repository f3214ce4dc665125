//! Harvest configuration loading
//!
//! Tests touching BLESSING_QUOTA_PER_BUCKET are #[serial].

use blessing_harvest::config::{HarvestFileConfig, QUOTA_ENV};
use blessing_harvest::models::CountRange;
use blessing_harvest::services::DelayRange;
use serial_test::serial;
use std::env;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("blessing-harvest.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_missing_file_yields_defaults() {
    env::remove_var(QUOTA_ENV);
    let dir = TempDir::new().unwrap();

    let config = HarvestFileConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();

    assert_eq!(config.harvest.quota_per_bucket, 10);
    assert_eq!(config.harvest.similarity_threshold, 0.85);
    assert_eq!(config.harvest.length_ranges.medium, CountRange::new(51, 240));
    assert_eq!(config.harvest.throttle.max_retries, 3);
    assert!(config.base.root_folder.is_none());
}

#[test]
#[serial]
fn test_file_values_are_applied() {
    env::remove_var(QUOTA_ENV);
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
            root_folder = "/tmp/blessings"

            [logging]
            level = "debug"

            [harvest]
            quota_per_bucket = 5
            similarity_threshold = 0.9

            [harvest.throttle]
            search_delay = { min_ms = 2000, max_ms = 4000 }
            max_retries = 2
        "#,
    );

    let config = HarvestFileConfig::load(Some(&path)).unwrap();

    assert_eq!(config.base.logging.level, "debug");
    assert_eq!(config.harvest.quota_per_bucket, 5);
    assert_eq!(config.harvest.similarity_threshold, 0.9);
    assert_eq!(config.harvest.throttle.search_delay, DelayRange::new(2000, 4000));
    assert_eq!(config.harvest.throttle.max_retries, 2);
    // Untouched tables keep their defaults
    assert_eq!(config.harvest.throttle.fetch_delay, DelayRange::new(1000, 3000));
    assert_eq!(config.harvest.quality.min_keyword_hits, 2);
}

#[test]
#[serial]
fn test_env_quota_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[harvest]\nquota_per_bucket = 5\n");
    env::set_var(QUOTA_ENV, "7");

    let config = HarvestFileConfig::load(Some(&path)).unwrap();
    env::remove_var(QUOTA_ENV);

    assert_eq!(config.harvest.quota_per_bucket, 7);
}

#[test]
#[serial]
fn test_invalid_env_quota_is_an_error() {
    let dir = TempDir::new().unwrap();
    env::set_var(QUOTA_ENV, "lots");

    let result = HarvestFileConfig::load(Some(&dir.path().join("absent.toml")));
    env::remove_var(QUOTA_ENV);

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_zero_env_quota_is_rejected() {
    let dir = TempDir::new().unwrap();
    env::set_var(QUOTA_ENV, "0");

    let result = HarvestFileConfig::load(Some(&dir.path().join("absent.toml")));
    env::remove_var(QUOTA_ENV);

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_overlapping_length_ranges_are_rejected() {
    env::remove_var(QUOTA_ENV);
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
            [harvest.length_ranges]
            short = { min = 0, max = 60 }
            medium = { min = 51, max = 240 }
            long = { min = 241, max = 600 }
        "#,
    );

    assert!(HarvestFileConfig::load(Some(&path)).is_err());
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    env::remove_var(QUOTA_ENV);
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[harvest\nquota_per_bucket = ");

    assert!(HarvestFileConfig::load(Some(&path)).is_err());
}
