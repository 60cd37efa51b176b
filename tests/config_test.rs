use lanegraph::config::{Config, ConfigError, CONFIG_FILE};
use std::fs;
use tracing::Level;

fn valid() -> Config {
    Config {
        region: "us1".to_string(),
        account_id: "123e4567-e89b-12d3-a456-426614174000".to_string(),
        access_token: "x".repeat(64),
        log_level: "debug".to_string(),
    }
}

#[test]
fn test_save_and_load() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let config = valid();
    config.save(temp_dir.path()).expect("Failed to save config");
    assert!(temp_dir.path().join(CONFIG_FILE).exists());

    let loaded = Config::load(temp_dir.path()).expect("Failed to load config");
    assert_eq!(loaded, config);
    assert_eq!(loaded.fqdn(), "us1.swimlane.app");
    assert_eq!(loaded.level(), Ok(Level::DEBUG));
}

#[test]
fn test_missing_file_and_partial_file() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    assert!(Config::load(temp_dir.path()).is_err());
    let config = Config::load_or_default(temp_dir.path()).expect("Defaults expected");
    assert_eq!(config, Config::default());
    assert_eq!(config.log_level, "info");
    assert!(config.validate().is_ok());

    fs::write(temp_dir.path().join(CONFIG_FILE), "region: de1\n").expect("Failed to write config");
    let config = Config::load_or_default(temp_dir.path()).expect("Failed to load config");
    assert_eq!(config.region, "de1");
    assert_eq!(config.log_level, "info");
}

#[test]
fn test_validate() {
    assert_eq!(valid().validate(), Ok(()));

    let config = Config { region: "usa".to_string(), ..valid() };
    assert_eq!(config.validate(), Err(ConfigError::InvalidRegion("usa".to_string())));

    let config = Config { account_id: "not-a-uuid".to_string(), ..valid() };
    assert_eq!(config.validate(), Err(ConfigError::InvalidAccountId("not-a-uuid".to_string())));

    let config = Config { access_token: "short".to_string(), ..valid() };
    assert_eq!(config.validate(), Err(ConfigError::InvalidToken(5)));

    let config = Config { log_level: "loud".to_string(), ..valid() };
    assert_eq!(config.validate(), Err(ConfigError::InvalidLogLevel("loud".to_string())));
}
